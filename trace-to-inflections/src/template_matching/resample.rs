use crate::{error::ResampleError, template_matching::Real};
use gait_common::{Sample, SampleIndex};
use tracing::{debug, instrument};

const MIN_SAMPLES: usize = 4;

/// Not-a-knot cubic spline through a set of knots.
/// On the interval starting at knot `i` the spline is `a + b*t + c*t^2 + d*t^3`, where `t = x - x_i`.
#[derive(Debug, Clone)]
pub(crate) struct CubicSpline {
    knots: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
    d: Vec<Real>,
}

impl CubicSpline {
    /// The third derivative is continuous at the second and penultimate knots,
    /// so the first two and the last two intervals each share a single cubic.
    pub(crate) fn not_a_knot(x: &[Real], y: &[Real]) -> Result<Self, ResampleError> {
        let n = x.len().min(y.len());
        if n < MIN_SAMPLES {
            return Err(ResampleError::InsufficientSamples(n));
        }
        let h: Vec<Real> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|h| !(*h > 0.0)) {
            return Err(ResampleError::NonIncreasingKnots);
        }
        let slopes: Vec<Real> = y
            .windows(2)
            .zip(&h)
            .map(|(w, h)| (w[1] - w[0]) / h)
            .collect();

        // Continuity of the first derivative at the interior knots, in c_1..c_{n-2}.
        let m = n - 2;
        let mut lower = vec![0.0; m];
        let mut diag = vec![0.0; m];
        let mut upper = vec![0.0; m];
        let mut rhs = vec![0.0; m];
        for k in 0..m {
            lower[k] = h[k];
            diag[k] = 2.0 * (h[k] + h[k + 1]);
            upper[k] = h[k + 1];
            rhs[k] = 3.0 * (slopes[k + 1] - slopes[k]);
        }

        // Substitute c_0 = ((h_0 + h_1) c_1 - h_0 c_2) / h_1
        let (h0, h1) = (h[0], h[1]);
        lower[0] = 0.0;
        diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
        upper[0] = (h1 * h1 - h0 * h0) / h1;

        // Substitute c_{n-1} = ((h_{n-3} + h_{n-2}) c_{n-2} - h_{n-2} c_{n-3}) / h_{n-3}
        let (hp, hl) = (h[n - 3], h[n - 2]);
        lower[m - 1] = (hp * hp - hl * hl) / hp;
        diag[m - 1] = (hp + hl) * (2.0 * hp + hl) / hp;
        upper[m - 1] = 0.0;

        let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;

        let mut c = Vec::with_capacity(n);
        c.push(((h0 + h1) * interior[0] - h0 * interior[1]) / h1);
        c.extend_from_slice(&interior);
        c.push(((hp + hl) * interior[m - 1] - hl * interior[m - 2]) / hp);

        let b = (0..n - 1)
            .map(|i| slopes[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0)
            .collect();
        let d = (0..n - 1)
            .map(|i| (c[i + 1] - c[i]) / (3.0 * h[i]))
            .collect();
        c.truncate(n - 1);

        Ok(Self {
            knots: x[..n].to_vec(),
            a: y[..n - 1].to_vec(),
            b,
            c,
            d,
        })
    }

    /// Evaluates the spline at `x`, extrapolating the end cubics outside the knots.
    pub(crate) fn evaluate(&self, x: Real) -> Real {
        let interval = self
            .knots
            .partition_point(|knot| *knot <= x)
            .saturating_sub(1)
            .min(self.a.len() - 1);
        let t = x - self.knots[interval];
        self.a[interval]
            + t * (self.b[interval] + t * (self.c[interval] + t * self.d[interval]))
    }
}

/// Solves a tridiagonal system with the Thomas algorithm.
/// `lower[k]` multiplies `x[k - 1]` and `upper[k]` multiplies `x[k + 1]`.
fn solve_tridiagonal(
    lower: &[Real],
    diag: &[Real],
    upper: &[Real],
    rhs: &[Real],
) -> Result<Vec<Real>, ResampleError> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    for k in 0..n {
        let (c_prev, d_prev) = if k == 0 {
            (0.0, 0.0)
        } else {
            (c_prime[k - 1], d_prime[k - 1])
        };
        let denom = diag[k] - lower[k] * c_prev;
        if !(denom.abs() > 1e-14) {
            return Err(ResampleError::SingularSystem);
        }
        c_prime[k] = upper[k] / denom;
        d_prime[k] = (rhs[k] - lower[k] * d_prev) / denom;
    }

    let mut x = d_prime;
    for k in (0..n - 1).rev() {
        x[k] -= c_prime[k] * x[k + 1];
    }
    Ok(x)
}

/// A signal resampled at a higher rate, with its labels moved to the new positions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UpsampledSignal {
    samples: Vec<Sample>,
    labels: Vec<SampleIndex>,
}

impl UpsampledSignal {
    pub(crate) fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub(crate) fn labels(&self) -> &[SampleIndex] {
        &self.labels
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Resampler {
    factor: usize,
}

impl Resampler {
    pub(crate) fn new(factor: usize) -> Result<Self, ResampleError> {
        if factor == 0 {
            Err(ResampleError::UpsampleFactor(factor))
        } else {
            Ok(Self { factor })
        }
    }

    /// Interpolates `signal` onto `len * factor` evenly spaced positions spanning the original
    /// samples, and moves each label to the nearest new position.
    /// The value at each moved label is set to the original labelled sample.
    #[instrument(skip_all, level = "debug", fields(len = signal.len(), factor = self.factor))]
    pub(crate) fn upsample(
        &self,
        signal: &[Sample],
        labels: &[SampleIndex],
    ) -> Result<UpsampledSignal, ResampleError> {
        let len = signal.len();
        if len < MIN_SAMPLES {
            return Err(ResampleError::InsufficientSamples(len));
        }

        let mut labels = labels.to_vec();
        labels.sort_unstable();
        labels.dedup();
        if let Some(&label) = labels.last().filter(|label| **label >= len) {
            return Err(ResampleError::LabelOutOfBounds { label, len });
        }

        let new_len = len
            .checked_mul(self.factor)
            .ok_or(ResampleError::LengthOverflow {
                len,
                factor: self.factor,
            })?;

        let knots: Vec<Real> = (0..len).map(|i| i as Real).collect();
        let spline = CubicSpline::not_a_knot(&knots, signal)?;

        let last = (len - 1) as Real;
        let step = last / (new_len - 1) as Real;
        let mut samples: Vec<Sample> = (0..new_len)
            .map(|j| {
                let position = if j + 1 == new_len { last } else { j as Real * step };
                spline.evaluate(position)
            })
            .collect();

        let labels = labels
            .into_iter()
            .map(|label| {
                let index = (label as Real * (new_len - 1) as Real / last).round() as SampleIndex;
                let index = index.min(new_len - 1);
                samples[index] = signal[label];
                index
            })
            .collect::<Vec<_>>();
        debug!("Upsampled to {new_len} samples with {} labels", labels.len());

        Ok(UpsampledSignal { samples, labels })
    }
}
