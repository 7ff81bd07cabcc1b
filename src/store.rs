use chrono::Local;
use serde::{de::DeserializeOwned, Serialize, Serializer};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::models::{DetailRecord, JobListing, MatchResult};

pub const FILTERED_JOBS: &str = "filtered_jobs";
pub const JOB_DETAILS: &str = "job_details";
pub const RESUME_MATCHES: &str = "resume_matches";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no {prefix}_*.json file in {dir}")]
    NotFound { dir: PathBuf, prefix: String },
}

/// Timestamp used in every saved file name, e.g. `20240102_153000`.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Writes `value` as pretty JSON to `{dir}/{prefix}_{stamp}.json`.
pub fn save_json<T: Serialize + ?Sized>(
    dir: &Path,
    prefix: &str,
    stamp: &str,
    value: &T,
) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{prefix}_{stamp}.json"));
    let io_err = |source| StoreError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StoreError::Json {
        path: path.clone(),
        source,
    })?;
    writer.flush().map_err(io_err)?;

    info!(path = %path.display(), "saved {prefix}");
    Ok(path)
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Most recent `{prefix}_*.json` in `dir`. The timestamp format sorts
/// lexically, so the greatest file name is the newest.
pub fn latest(dir: &Path, prefix: &str) -> Result<PathBuf, StoreError> {
    let entries = fs::read_dir(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let head = format!("{prefix}_");

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "json")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&head))
        })
        .max()
        .ok_or_else(|| StoreError::NotFound {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        })
}

/// Paths of one "save filtered jobs and details" action.
#[derive(Debug, Clone)]
pub struct SavedJobs {
    pub filtered_jobs: PathBuf,
    pub job_details: PathBuf,
}

/// Detail records written as one JSON object with keys in the given order.
struct OrderedDetails<'a>(&'a [(&'a str, &'a DetailRecord)]);

impl Serialize for OrderedDetails<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().copied())
    }
}

/// Saves the filtered listing and its details under one timestamp. The
/// details object keeps the order it is given.
pub fn save_job_data(
    dir: &Path,
    filtered: &[JobListing],
    details: &[(&str, &DetailRecord)],
) -> Result<SavedJobs, StoreError> {
    let stamp = timestamp();
    Ok(SavedJobs {
        filtered_jobs: save_json(dir, FILTERED_JOBS, &stamp, filtered)?,
        job_details: save_json(dir, JOB_DETAILS, &stamp, &OrderedDetails(details))?,
    })
}

pub fn save_matches(dir: &Path, matches: &[MatchResult]) -> Result<PathBuf, StoreError> {
    save_json(dir, RESUME_MATCHES, &timestamp(), matches)
}
