//! JSON loaders for profile and scheme exports.
//!
//! Exports are arrays of records. A record that does not deserialize is set aside in
//! [`CatalogLoad::rejected`] so one bad entry never blocks the rest of the population.

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::domain::{Profile, Scheme};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAnArray,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogError::Json(err) => write!(f, "catalog export is not valid JSON: {}", err),
            CatalogError::NotAnArray => {
                write!(f, "catalog export must be a JSON array of records")
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            CatalogError::NotAnArray => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Record that was skipped during a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLoad<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRecord>,
}

pub fn load_profiles<R: Read>(reader: R) -> Result<CatalogLoad<Profile>, CatalogError> {
    load_records(reader)
}

pub fn load_schemes<R: Read>(reader: R) -> Result<CatalogLoad<Scheme>, CatalogError> {
    load_records(reader)
}

pub fn load_profiles_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<CatalogLoad<Profile>, CatalogError> {
    let file = std::fs::File::open(path)?;
    load_profiles(std::io::BufReader::new(file))
}

pub fn load_schemes_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<CatalogLoad<Scheme>, CatalogError> {
    let file = std::fs::File::open(path)?;
    load_schemes(std::io::BufReader::new(file))
}

fn load_records<T, R>(reader: R) -> Result<CatalogLoad<T>, CatalogError>
where
    T: DeserializeOwned,
    R: Read,
{
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(CatalogError::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(err) => rejected.push(RejectedRecord {
                index,
                reason: err.to_string(),
            }),
        }
    }

    Ok(CatalogLoad { records, rejected })
}
