use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, info, warn};

use crate::filter::{available_counties, filter_by_county};
use crate::models::{DetailRecord, JobListing};
use crate::scrape::{scrape_job_details, scrape_vacancy_table, FetchError, PageSource};

/// Everything one scraping session knows about: the full listing, the subset
/// left after the county filter, and the detail records scraped for that
/// subset.
///
/// The filtered subset is always derived from `listings` and `counties`;
/// replacing either recomputes it.
#[derive(Debug, Default, Clone)]
pub struct JobCatalog {
    listings: Vec<JobListing>,
    counties: BTreeSet<String>,
    filtered: Vec<JobListing>,
    details: BTreeMap<String, DetailRecord>,
}

/// Outcome counts of one detail-scrape pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetailSummary {
    pub scraped: usize,
    pub failed: usize,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a catalog from saved blobs. The listings double as the
    /// filtered set since only the filtered jobs are ever persisted.
    pub fn restore(listings: Vec<JobListing>, details: BTreeMap<String, DetailRecord>) -> Self {
        Self {
            filtered: listings.clone(),
            listings,
            counties: BTreeSet::new(),
            details,
        }
    }

    /// Swaps in a fresh listing. Details from the previous scrape no longer
    /// apply and are dropped.
    pub fn replace_listings(&mut self, listings: Vec<JobListing>) {
        self.listings = listings;
        self.details.clear();
        self.refilter();
    }

    /// Fetches the vacancy table into the catalog. On failure the catalog is
    /// left with an empty listing and the error is handed back for
    /// reporting.
    pub fn refresh_listings(&mut self, source: &impl PageSource, url: &str) -> Result<usize, FetchError> {
        match scrape_vacancy_table(source, url) {
            Ok(jobs) => {
                let count = jobs.len();
                self.replace_listings(jobs);
                Ok(count)
            }
            Err(e) => {
                error!("Error fetching the vacancy table: {e}");
                self.replace_listings(Vec::new());
                Err(e)
            }
        }
    }

    pub fn set_county_filter(&mut self, counties: BTreeSet<String>) {
        self.counties = counties;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter_by_county(&self.listings, &self.counties);
    }

    pub fn listings(&self) -> &[JobListing] {
        &self.listings
    }

    pub fn filtered(&self) -> &[JobListing] {
        &self.filtered
    }

    pub fn available_counties(&self) -> Vec<String> {
        available_counties(&self.listings)
    }

    pub fn listing(&self, item_number: &str) -> Option<&JobListing> {
        self.listings.iter().find(|job| job.item_number == item_number)
    }

    pub fn details(&self) -> &BTreeMap<String, DetailRecord> {
        &self.details
    }

    /// Detail records in the order of the filtered listing. Records whose key
    /// is not in the listing come last, by key.
    pub fn details_in_order(&self) -> Vec<(&str, &DetailRecord)> {
        let mut seen = BTreeSet::new();
        let mut ordered: Vec<(&str, &DetailRecord)> = self
            .filtered
            .iter()
            .filter_map(|job| self.details.get_key_value(&job.item_number))
            .filter(|&(key, _)| seen.insert(key.as_str()))
            .map(|(key, record)| (key.as_str(), record))
            .collect();
        ordered.extend(
            self.details
                .iter()
                .filter(|&(key, _)| !seen.contains(key.as_str()))
                .map(|(key, record)| (key.as_str(), record)),
        );
        ordered
    }

    pub fn detail(&self, item_number: &str) -> Option<&DetailRecord> {
        self.details.get(item_number)
    }

    /// Looks an item up by catalog key, falling back to the vacancy id a
    /// detail page reported. Returns the catalog key with the record.
    pub fn find_detail(&self, item_number: &str) -> Option<(&str, &DetailRecord)> {
        if let Some((key, record)) = self.details.get_key_value(item_number) {
            return Some((key.as_str(), record));
        }
        self.details
            .iter()
            .find(|(_, record)| record.item_number() == item_number)
            .map(|(key, record)| (key.as_str(), record))
    }

    /// Agency of an item as shown in the vacancy table; the detail page does
    /// not carry it.
    pub fn agency(&self, item_number: &str) -> &str {
        self.listing(item_number).map(|job| job.agency.as_str()).unwrap_or("")
    }

    /// Scrapes the detail page of every filtered job, one after another.
    ///
    /// Results are keyed by the listing's item number even when the page
    /// reports a different vacancy id. A failed fetch is stored as
    /// [`DetailRecord::Failed`] and the pass moves on to the next job. The
    /// previous detail map is replaced wholesale.
    pub fn scrape_details(
        &mut self,
        source: &impl PageSource,
        detail_base: &str,
        mut progress: impl FnMut(usize, usize, &str),
    ) -> DetailSummary {
        let total = self.filtered.len();
        let mut results = BTreeMap::new();
        let mut summary = DetailSummary::default();

        for (i, job) in self.filtered.iter().enumerate() {
            progress(i + 1, total, &job.item_number);
            let item_id = job.item_number.clone();
            let record = match scrape_job_details(source, detail_base, &item_id) {
                Ok(detail) => {
                    summary.scraped += 1;
                    DetailRecord::Detail(detail)
                }
                Err(e) => {
                    warn!(item_number = %item_id, "detail scrape failed: {e}");
                    summary.failed += 1;
                    DetailRecord::Failed {
                        item_number: item_id.clone(),
                        error: e.to_string(),
                    }
                }
            };
            results.insert(item_id, record);
        }

        info!(scraped = summary.scraped, failed = summary.failed, "detail scrape finished");
        self.details = results;
        summary
    }
}
