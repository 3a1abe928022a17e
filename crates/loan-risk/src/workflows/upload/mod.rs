mod mapping;
mod normalizer;
mod parser;

use crate::workflows::assessment::domain::{ApplicantTable, InvalidInputError};
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub use mapping::canonical_column;

#[derive(Debug)]
pub enum UploadError {
    Io(std::io::Error),
    Csv(csv::Error),
    Empty,
    Invalid(InvalidInputError),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::Io(err) => write!(f, "failed to read upload: {}", err),
            UploadError::Csv(err) => write!(f, "invalid delimited data: {}", err),
            UploadError::Empty => write!(f, "upload contains a header but no applicant rows"),
            UploadError::Invalid(err) => write!(f, "upload is not a valid applicant table: {}", err),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Io(err) => Some(err),
            UploadError::Csv(err) => Some(err),
            UploadError::Empty => None,
            UploadError::Invalid(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for UploadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<InvalidInputError> for UploadError {
    fn from(err: InvalidInputError) -> Self {
        Self::Invalid(err)
    }
}

/// Reads uploaded spreadsheets of loan applications into applicant tables.
pub struct ApplicantImporter;

impl ApplicantImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ApplicantTable, UploadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ApplicantTable, UploadError> {
        Self::from_reader_with_delimiter(reader, b',')
    }

    pub fn from_reader_with_delimiter<R: Read>(
        reader: R,
        delimiter: u8,
    ) -> Result<ApplicantTable, UploadError> {
        let upload = parser::read_upload(reader, delimiter)?;
        if upload.rows.is_empty() {
            return Err(UploadError::Empty);
        }

        let table = ApplicantTable::from_rows(upload.columns, upload.rows)?;
        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            "parsed applicant upload"
        );
        Ok(table)
    }
}
