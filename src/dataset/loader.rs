//! CSV loading for the two raw input tables.
//!
//! The message table has the header `id,message,original,genre`; the
//! category table has `id,categories`. Columns are matched by header name,
//! so their order in the file does not matter. An empty `original` field is
//! read as a missing original.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;

use crate::dataset::record::{Genre, RawCategoryRecord, RawMessageRecord};
use crate::error::{Result, TriageError};

#[derive(Debug, Deserialize)]
struct MessageRow {
    id: i64,
    message: String,
    original: Option<String>,
    genre: String,
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: i64,
    categories: String,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(input)
}

/// Read message records from CSV data.
pub fn read_messages<R: Read>(input: R) -> Result<Vec<RawMessageRecord>> {
    let mut records = Vec::new();

    for (line, row) in reader(input).deserialize::<MessageRow>().enumerate() {
        let row = row?;
        let genre: Genre = row.genre.parse().map_err(|e| {
            TriageError::invalid_argument(format!("Message row {}: {e}", line + 1))
        })?;
        records.push(RawMessageRecord {
            id: row.id,
            message: row.message,
            original: row.original.filter(|s| !s.is_empty()),
            genre,
        });
    }

    Ok(records)
}

/// Read category records from CSV data.
pub fn read_categories<R: Read>(input: R) -> Result<Vec<RawCategoryRecord>> {
    reader(input)
        .deserialize::<CategoryRow>()
        .map(|row| {
            let row = row?;
            Ok(RawCategoryRecord::new(row.id, row.categories))
        })
        .collect()
}

/// Load the message table from a CSV file.
pub fn load_messages_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawMessageRecord>> {
    let path = path.as_ref();
    let records = read_messages(File::open(path)?)?;
    debug!("Loaded {} messages from {}", records.len(), path.display());
    Ok(records)
}

/// Load the category table from a CSV file.
pub fn load_categories_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawCategoryRecord>> {
    let path = path.as_ref();
    let records = read_categories(File::open(path)?)?;
    debug!("Loaded {} category rows from {}", records.len(), path.display());
    Ok(records)
}
