//! Scrapes NY StateJobs vacancies, narrows them by county, classifies each
//! against a resume with a language model and drafts application documents.

pub mod applications;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod documents;
pub mod filter;
pub mod llm;
pub mod matching;
pub mod models;
pub mod resume;
pub mod scrape;
pub mod store;
pub mod telemetry;

pub use catalog::JobCatalog;
pub use models::{CandidateProfile, DetailRecord, JobDetail, JobListing, MatchLevel, MatchResult};
