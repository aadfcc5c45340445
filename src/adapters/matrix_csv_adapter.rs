//! CSV export of a QUBO matrix.

use crate::domain::error::QuboError;
use ndarray::Array2;
use std::io::Write;
use std::path::Path;

/// Writes a header of variable names followed by one row per matrix row.
pub fn write_matrix<W: Write>(
    writer: W,
    matrix: &Array2<f64>,
    names: &[String],
) -> Result<(), QuboError> {
    if names.len() != matrix.ncols() {
        return Err(QuboError::ShapeMismatch {
            left: matrix.dim(),
            right: (names.len(), names.len()),
        });
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(names).map_err(csv_error)?;
    for row in matrix.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_matrix_file<P: AsRef<Path>>(
    path: P,
    matrix: &Array2<f64>,
    names: &[String],
) -> Result<(), QuboError> {
    let file = std::fs::File::create(path)?;
    write_matrix(file, matrix, names)
}

fn csv_error(e: csv::Error) -> QuboError {
    QuboError::Io(std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::NamedTempFile;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("x{}", i)).collect()
    }

    #[test]
    fn writes_header_and_rows() {
        let mut out = Vec::new();
        write_matrix(&mut out, &array![[-10.0, 10.0], [10.0, -9.5]], &names(2)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "x1,x2\n-10,10\n10,-9.5\n");
    }

    #[test]
    fn rejects_name_count_mismatch() {
        let mut out = Vec::new();
        let err = write_matrix(&mut out, &Array2::zeros((2, 2)), &names(3)).unwrap_err();
        assert!(matches!(err, QuboError::ShapeMismatch { .. }));
    }

    #[test]
    fn writes_to_file() {
        let file = NamedTempFile::new().unwrap();
        write_matrix_file(file.path(), &array![[1.5]], &names(1)).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "x1\n1.5\n");
    }
}
