use crate::{error::SmoothingError, parameters::SmoothingParameters, template_matching::Real};
use gait_common::Sample;
use tracing::instrument;

/// Savitzky-Golay filter, fitting a polynomial by least squares over each window of samples
/// and taking the value (or a derivative) of the fit at the centre of the window.
#[derive(Debug, Clone)]
pub(crate) struct SavitzkyGolay {
    coefficients: Vec<Real>,
    half_window: usize,
}

impl SavitzkyGolay {
    pub(crate) fn new(parameters: &SmoothingParameters) -> Result<Self, SmoothingError> {
        parameters.validate()?;
        let half_window = parameters.half_window();
        let terms = parameters.order + 1;

        // Positions within the window are scaled to [-1, 1] to keep the normal matrix well conditioned.
        let scale = half_window as Real;
        let abscissae: Vec<Real> = (0..parameters.window)
            .map(|k| (k as Real - scale) / scale)
            .collect();

        let normal: Vec<Vec<Real>> = (0..terms)
            .map(|i| {
                (0..terms)
                    .map(|j| abscissae.iter().map(|u| u.powi((i + j) as i32)).sum::<Real>())
                    .collect()
            })
            .collect();
        let inverse = invert(normal)?;

        // Row `derivative` of the pseudo-inverse (B^T B)^-1 B^T, in units of samples.
        let deriv = parameters.derivative as i32;
        let factor = parameters.rate.powi(deriv) * factorial(parameters.derivative)
            / scale.powi(deriv);
        let row = &inverse[parameters.derivative];
        let coefficients = abscissae
            .iter()
            .map(|u| {
                row.iter()
                    .zip(0..)
                    .map(|(g, j)| g * u.powi(j))
                    .sum::<Real>()
                    * factor
            })
            .collect();

        Ok(Self {
            coefficients,
            half_window,
        })
    }

    #[cfg(test)]
    pub(crate) fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    /// Filters `signal`, the output has the same length as the input.
    /// The signal is extended at each end by reflecting it about its end value.
    #[instrument(skip_all, level = "debug", fields(len = signal.len()))]
    pub(crate) fn apply(&self, signal: &[Sample]) -> Result<Vec<Sample>, SmoothingError> {
        let half = self.half_window;
        let len = signal.len();
        let (first, last) = match (signal.first(), signal.last()) {
            (Some(first), Some(last)) if len > half => (*first, *last),
            _ => {
                return Err(SmoothingError::SignalTooShort {
                    len,
                    window: self.coefficients.len(),
                });
            }
        };

        let head = signal[1..=half]
            .iter()
            .rev()
            .map(|y| first - (y - first).abs());
        let tail = signal[len - half - 1..len - 1]
            .iter()
            .rev()
            .map(|y| last + (y - last).abs());
        let padded: Vec<Real> = head.chain(signal.iter().copied()).chain(tail).collect();

        Ok(padded
            .windows(self.coefficients.len())
            .map(|window| {
                window
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(y, c)| y * c)
                    .sum()
            })
            .collect())
    }
}

fn factorial(n: usize) -> Real {
    (1..=n).map(|i| i as Real).product()
}

/// Gauss-Jordan elimination with partial pivoting.
fn invert(mut matrix: Vec<Vec<Real>>) -> Result<Vec<Vec<Real>>, SmoothingError> {
    let n = matrix.len();
    let mut inverse: Vec<Vec<Real>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .ok_or(SmoothingError::SingularDesign)?;
        matrix.swap(col, pivot_row);
        inverse.swap(col, pivot_row);

        let pivot = matrix[col][col];
        if !(pivot.abs() > 1e-12) {
            return Err(SmoothingError::SingularDesign);
        }
        for j in 0..n {
            matrix[col][j] /= pivot;
            inverse[col][j] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = matrix[row][col];
                for j in 0..n {
                    matrix[row][j] -= factor * matrix[col][j];
                    inverse[row][j] -= factor * inverse[col][j];
                }
            }
        }
    }
    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn filter(window: usize, order: usize, derivative: usize) -> SavitzkyGolay {
        SavitzkyGolay::new(&SmoothingParameters {
            window,
            order,
            derivative,
            rate: 1.0,
        })
        .expect("parameters are valid")
    }

    #[test]
    fn invalid_parameters() {
        let parameters = SmoothingParameters {
            window: 4,
            ..Default::default()
        };
        assert_eq!(
            SavitzkyGolay::new(&parameters).err(),
            Some(SmoothingError::WindowNotPositiveOdd(4))
        );
    }

    #[test]
    fn quadratic_coefficients() {
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|c| c / 35.0);
        let filter = filter(5, 2, 0);
        assert_eq!(filter.coefficients().len(), 5);
        for (c, e) in filter.coefficients().iter().zip(expected) {
            assert_approx_eq!(c, e, 1e-12);
        }
    }

    #[test]
    fn reflected_padding() {
        let output = filter(3, 0, 0)
            .apply(&[1.0, 3.0, 2.0, 5.0])
            .expect("signal is long enough");
        let expected = [1.0, 2.0, 10.0 / 3.0, 5.0];
        assert_eq!(output.len(), expected.len());
        for (o, e) in output.iter().zip(expected) {
            assert_approx_eq!(o, e, 1e-12);
        }
    }

    #[test]
    fn constant_signal() {
        let filter = SavitzkyGolay::new(&SmoothingParameters::default()).expect("defaults are valid");
        let output = filter.apply(&[4.5; 300]).expect("signal is long enough");
        assert_eq!(output.len(), 300);
        for value in output {
            assert_approx_eq!(value, 4.5, 1e-9);
        }
    }

    #[test]
    fn polynomial_preserved_away_from_ends() {
        let signal: Vec<Real> = (0..40)
            .map(|i| i as Real)
            .map(|x| 0.02 * x * x * x - x * x + 3.0)
            .collect();
        let output = filter(11, 3, 0).apply(&signal).expect("signal is long enough");
        for (o, s) in output.iter().zip(&signal).skip(5).take(30) {
            assert_approx_eq!(o, s, 1e-6);
        }
    }

    #[test]
    fn first_derivative() {
        let signal: Vec<Real> = (0..20).map(|i| 2.0 * i as Real - 7.0).collect();
        let output = filter(7, 2, 1).apply(&signal).expect("signal is long enough");
        for value in output.iter().skip(3).take(14) {
            assert_approx_eq!(value, 2.0, 1e-9);
        }
    }

    #[test]
    fn derivative_above_order_rejected() {
        let parameters = SmoothingParameters {
            window: 9,
            order: 2,
            derivative: 3,
            rate: 1.0,
        };
        assert_eq!(
            SavitzkyGolay::new(&parameters).err(),
            Some(SmoothingError::DerivativeTooHigh { deriv: 3, order: 2 })
        );
    }

    #[test]
    fn second_derivative_scaled_by_rate() {
        let signal: Vec<Real> = (0..30).map(|i| 3.0 * (i * i) as Real).collect();
        let filter = SavitzkyGolay::new(&SmoothingParameters {
            window: 9,
            order: 3,
            derivative: 2,
            rate: 0.5,
        })
        .expect("parameters are valid");
        let output = filter.apply(&signal).expect("signal is long enough");
        // 6 per sample squared, at half a sample per unit
        for value in output.iter().skip(4).take(22) {
            assert_approx_eq!(value, 1.5, 1e-9);
        }
    }

    #[test]
    fn signal_too_short() {
        assert_eq!(
            filter(7, 2, 0).apply(&[1.0, 2.0, 3.0]),
            Err(SmoothingError::SignalTooShort { len: 3, window: 7 })
        );
        assert_eq!(
            filter(7, 2, 0).apply(&[]),
            Err(SmoothingError::SignalTooShort { len: 0, window: 7 })
        );
    }
}
