// CSV log of generated application packages, read back by the dashboard.

use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const APPLICATIONS_CSV: &str = "applications.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "TrackingNumber")]
    pub tracking_number: String,
    #[serde(rename = "ItemNumber")]
    pub item_number: String,
    #[serde(rename = "JobTitle")]
    pub job_title: String,
    #[serde(rename = "Agency")]
    pub agency: String,
    #[serde(rename = "MatchLevel")]
    pub match_level: String,
    #[serde(rename = "GeneratedAt")]
    pub generated_at: String,
    #[serde(rename = "CoverLetterPath")]
    pub cover_letter_path: String,
    #[serde(rename = "ResumePath")]
    pub resume_path: String,
    #[serde(rename = "InstructionsPath")]
    pub instructions_path: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Appends one row, writing the header only when the file is new.
pub fn append_application(csv_path: &Path, record: &ApplicationRecord) -> anyhow::Result<()> {
    let file_exists = csv_path.exists();

    let csv_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)
        .with_context(|| format!("opening {}", csv_path.display()))?;

    let mut wtr = WriterBuilder::new().has_headers(!file_exists).from_writer(csv_file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

pub fn read_applications(csv_path: &Path) -> anyhow::Result<Vec<ApplicationRecord>> {
    let file = File::open(csv_path).with_context(|| format!("opening {}", csv_path.display()))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: ApplicationRecord = result?;
        records.push(record);
    }
    Ok(records)
}
