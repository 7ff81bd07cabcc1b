//! Scraping of the StateJobs vacancy table and the printable detail pages.

pub mod detail;
pub mod html;
pub mod http;
pub mod listing;

pub use detail::{detail_url, parse_job_details, scrape_job_details, LabelMap};
pub use http::{FetchError, HttpClient, PageSource};
pub use listing::{parse_vacancy_table, scrape_vacancy_table};
