use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Dense `size x size` similarity matrix in row-major order
///
/// Its dimension reflects the catalog snapshot it was built from, which may
/// differ from the catalog currently loaded. Callers must check
/// [`SimilarityMatrix::covers`] before reading a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    pub fn new(size: usize, values: Vec<f32>) -> AppResult<Self> {
        let matrix = Self { size, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Builds a matrix from row vectors, which must all be `rows.len()` long
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let size = rows.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != size) {
            return Err(AppError::Index(format!(
                "row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                size
            )));
        }
        Self::new(size, rows.into_iter().flatten().collect())
    }

    fn validate(&self) -> AppResult<()> {
        let expected = self
            .size
            .checked_mul(self.size)
            .ok_or_else(|| AppError::Index(format!("matrix size {} overflows", self.size)))?;
        if self.values.len() != expected {
            return Err(AppError::Index(format!(
                "matrix of size {} holds {} values, expected {}",
                self.size,
                self.values.len(),
                expected
            )));
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `row` was part of the snapshot this matrix was built from
    pub fn covers(&self, row: usize) -> bool {
        row < self.size
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if !self.covers(row) {
            return None;
        }
        let start = row * self.size;
        Some(&self.values[start..start + self.size])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.row(row).and_then(|r| r.get(col).copied())
    }

    pub fn write_to<W: Write>(&self, writer: W) -> AppResult<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> AppResult<Self> {
        let matrix: SimilarityMatrix = bincode::deserialize_from(reader)?;
        matrix.validate()?;
        Ok(matrix)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), size = self.size, "Similarity matrix saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let matrix = Self::read_from(BufReader::new(File::open(path)?))?;
        tracing::info!(path = %path.display(), size = matrix.size, "Similarity matrix loaded");
        Ok(matrix)
    }
}
