use std::collections::BTreeSet;

use crate::models::JobListing;

/// Listings whose county is in `counties`, in their original order.
/// An empty set means no filter.
pub fn filter_by_county(jobs: &[JobListing], counties: &BTreeSet<String>) -> Vec<JobListing> {
    if counties.is_empty() {
        return jobs.to_vec();
    }
    jobs.iter()
        .filter(|job| counties.contains(&job.county))
        .cloned()
        .collect()
}

/// Distinct county names, sorted.
pub fn available_counties(jobs: &[JobListing]) -> Vec<String> {
    jobs.iter()
        .map(|job| job.county.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
