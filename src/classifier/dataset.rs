//! Reading and growing the labelled CSV dataset the classifier is trained on.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;

const DESCRIPTION_COLUMN: &str = "description";
const CATEGORY_COLUMN: &str = "category";

/// One row of the dataset: a description and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDescription {
    pub description: String,
    pub category: String,
}

fn read_error(path: &Path, error: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::ReadDataset {
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}

fn column_position(headers: &csv::StringRecord, column: &str) -> Result<usize, ClassifierError> {
    headers
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| ClassifierError::MissingColumn(column.to_owned()))
}

/// Load every labelled row from the CSV file at `path`.
///
/// The file must have a header row naming `description` and `category`
/// columns. Any other columns are ignored.
///
/// # Errors
/// Returns a [ClassifierError] if the file cannot be read, a column is missing, or a row is malformed.
pub fn load_dataset(path: &Path) -> Result<Vec<LabeledDescription>, ClassifierError> {
    let mut reader = csv::Reader::from_path(path).map_err(|error| read_error(path, error))?;

    let headers = reader
        .headers()
        .map_err(|error| ClassifierError::MalformedDataset(error.to_string()))?
        .clone();
    let description_position = column_position(&headers, DESCRIPTION_COLUMN)?;
    let category_position = column_position(&headers, CATEGORY_COLUMN)?;

    reader
        .records()
        .map(|record| {
            let record =
                record.map_err(|error| ClassifierError::MalformedDataset(error.to_string()))?;

            match (
                record.get(description_position),
                record.get(category_position),
            ) {
                (Some(description), Some(category)) => Ok(LabeledDescription {
                    description: description.to_owned(),
                    category: category.to_owned(),
                }),
                _ => Err(ClassifierError::MalformedDataset(format!(
                    "row {} is missing the description or category",
                    record.position().map_or(0, |position| position.line())
                ))),
            }
        })
        .collect()
}

/// Append `example` as a new row of the CSV file at `path`.
///
/// A new file gets a `description,category` header. For an existing file the
/// row follows the existing header's column order, leaving extra columns blank.
///
/// # Errors
/// Returns a [ClassifierError] if the file cannot be read or written, or its header lacks a
/// required column.
pub fn append_example(path: &Path, example: &LabeledDescription) -> Result<(), ClassifierError> {
    let write_error = |error: &dyn std::fmt::Display| ClassifierError::WriteDataset {
        path: path.display().to_string(),
        reason: error.to_string(),
    };

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|error| write_error(&error))?;

    let length = file.metadata().map_err(|error| write_error(&error))?.len();

    let record = if length == 0 {
        let mut writer = csv::Writer::from_writer(&mut file);
        writer
            .write_record([DESCRIPTION_COLUMN, CATEGORY_COLUMN])
            .map_err(|error| write_error(&error))?;
        writer.flush().map_err(|error| write_error(&error))?;

        vec![example.description.as_str(), example.category.as_str()]
    } else {
        ensure_trailing_newline(&mut file, length).map_err(|error| write_error(&error))?;

        let headers = read_headers(path)?;
        let description_position = column_position(&headers, DESCRIPTION_COLUMN)?;
        let category_position = column_position(&headers, CATEGORY_COLUMN)?;

        let mut record = vec![""; headers.len()];
        record[description_position] = example.description.as_str();
        record[category_position] = example.category.as_str();
        record
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(&mut file);
    writer
        .write_record(&record)
        .map_err(|error| write_error(&error))?;
    writer.flush().map_err(|error| write_error(&error))?;

    Ok(())
}

fn read_headers(path: &Path) -> Result<csv::StringRecord, ClassifierError> {
    let mut reader = csv::Reader::from_path(path).map_err(|error| read_error(path, error))?;

    reader
        .headers()
        .cloned()
        .map_err(|error| ClassifierError::MalformedDataset(error.to_string()))
}

fn ensure_trailing_newline(file: &mut File, length: u64) -> std::io::Result<()> {
    let mut last_byte = [0u8; 1];
    file.seek(SeekFrom::Start(length - 1))?;
    file.read_exact(&mut last_byte)?;

    if last_byte[0] != b'\n' {
        file.write_all(b"\n")?;
    }

    Ok(())
}
