use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Error, Write},
    path::Path,
};

pub(crate) trait SavablePoint {
    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error>;
}

impl<T, E> SavablePoint for (T, E)
where
    T: Display,
    E: Display,
{
    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error> {
        writeln!(file, "{0},{1}", self.0, self.1)
    }
}

pub(crate) trait SaveToFileFilter<I>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(path)?);
        for item in self {
            item.write_to_file(&mut file)?;
        }
        file.flush()
    }
}
