//! On-disk fixtures in the RAMSES output layout.
//!
//! - [`write_info_file`] writes an `info_XXXXX.txt` key/value file.
//! - [`write_rt_info_file`] writes an `info_rt_XXXXX.txt` file.
//! - [`write_cooling_table`] writes a `cooling_XXXXX.out` Fortran table.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;

/// Number of 2-D tables preceding the abundance stack.
pub const TABLES_BEFORE_ABUNDANCES: usize = 11;

/// Number of species in the abundance stack.
pub const ABUNDANCE_SPECIES: usize = 6;

/// Contents of a cooling table, with every array stored in Fortran order
/// (first index fastest), exactly as it lands on disk.
#[derive(Clone, Debug)]
pub struct CoolingTableFixture {
    pub lognh: Vec<f64>,
    pub logt: Vec<f64>,
    /// The 11 tables from `cooling_primordial` to `mu`, in file order.
    pub tables: Vec<Vec<f64>>,
    /// `n1 * n2 * 6` abundance values.
    pub abundances: Vec<f64>,
    /// Write the pre-2010 layout whose first table has only `n1` entries.
    pub legacy: bool,
}

fn fortran_order(a: &Array2<f64>) -> Vec<f64> {
    a.t().iter().copied().collect()
}

impl CoolingTableFixture {
    /// A table with the given `mu` grid and every cooling term set to the
    /// constant `log_rate` (the file stores log10 values).
    pub fn with_mu(lognh: Vec<f64>, logt: Vec<f64>, mu: &Array2<f64>, log_rate: f64) -> Self {
        let n = lognh.len() * logt.len();
        let mut tables = vec![vec![log_rate; n]; TABLES_BEFORE_ABUNDANCES - 1];
        tables.push(fortran_order(mu));
        Self {
            lognh,
            logt,
            tables,
            abundances: vec![-2.0; n * ABUNDANCE_SPECIES],
            legacy: false,
        }
    }

    /// A two-by-two table with `lognH = [0, 1]`, `logT = [4, 5]`,
    /// `mu = [[1.0, 1.0], [1.2, 1.2]]`.
    pub fn two_by_two() -> Self {
        let mu = ndarray::arr2(&[[1.0, 1.0], [1.2, 1.2]]);
        Self::with_mu(vec![0.0, 1.0], vec![4.0, 5.0], &mu, -23.0)
    }

    /// Replace one table (index in file order) from a row-major grid.
    pub fn set_table(&mut self, index: usize, values: &Array2<f64>) {
        self.tables[index] = fortran_order(values);
    }

    /// Switch to the legacy layout.
    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }
}

/// Write one Fortran unformatted sequential record.
pub fn write_record(w: &mut impl Write, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "record too long"))?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(payload)?;
    w.write_all(&len.to_le_bytes())
}

fn f64_record(w: &mut impl Write, values: &[f64]) -> io::Result<()> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    write_record(w, &bytes)
}

/// Write `cooling_{output:05}.out` into `dir` and return its path.
pub fn write_cooling_table(
    dir: &Path,
    output: u32,
    table: &CoolingTableFixture,
) -> io::Result<PathBuf> {
    let path = dir.join(format!("cooling_{output:05}.out"));
    let mut w = BufWriter::new(File::create(&path)?);
    let n1 = table.lognh.len() as i32;
    let n2 = table.logt.len() as i32;
    let header: Vec<u8> = [n1, n2].iter().flat_map(|v| v.to_le_bytes()).collect();
    write_record(&mut w, &header)?;
    f64_record(&mut w, &table.lognh)?;
    f64_record(&mut w, &table.logt)?;
    if table.legacy {
        f64_record(&mut w, &vec![0.0; table.lognh.len()])?;
    } else {
        for t in &table.tables {
            f64_record(&mut w, t)?;
        }
        f64_record(&mut w, &table.abundances)?;
    }
    w.flush()?;
    Ok(path)
}

fn write_key_values(path: &Path, entries: &[(&str, String)]) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for (k, v) in entries {
        writeln!(w, "{k:<12}= {v}")?;
    }
    w.flush()
}

/// Write `info_{output:05}.txt` into `dir` and return its path.
pub fn write_info_file(dir: &Path, output: u32, entries: &[(&str, String)]) -> io::Result<PathBuf> {
    let path = dir.join(format!("info_{output:05}.txt"));
    write_key_values(&path, entries)?;
    Ok(path)
}

/// Write `info_rt_{output:05}.txt` into `dir` and return its path.
pub fn write_rt_info_file(
    dir: &Path,
    output: u32,
    entries: &[(&str, String)],
) -> io::Result<PathBuf> {
    let path = dir.join(format!("info_rt_{output:05}.txt"));
    write_key_values(&path, entries)?;
    Ok(path)
}
