use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use statejobs_matcher::scrape::{FetchError, PageSource};
use statejobs_matcher::store;
use statejobs_matcher::{DetailRecord, JobCatalog};

const TABLE_URL: &str = "https://jobs.test/vacancyTable.cfm";
const DETAIL_BASE: &str = "https://jobs.test/vacancyDetailsPrint.cfm";
const TABLE: &str = include_str!("fixtures/vacancy_table.html");
const DETAIL: &str = include_str!("fixtures/vacancy_detail.html");

/// Serves canned pages by URL and records what was requested. Unknown URLs
/// answer with a 404.
#[derive(Default)]
struct CannedPages {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl CannedPages {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

impl PageSource for CannedPages {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn counties(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn failed_listing_fetch_leaves_catalog_empty() {
    let mut catalog = JobCatalog::new();
    catalog.replace_listings(vec![Default::default()]);

    let err = catalog.refresh_listings(&CannedPages::default(), TABLE_URL).unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert!(catalog.listings().is_empty());
    assert!(catalog.filtered().is_empty());
}

#[test]
fn details_scraped_only_for_filtered_jobs() {
    let source = CannedPages::default()
        .with(TABLE_URL, TABLE)
        .with(&format!("{DETAIL_BASE}?id=12345"), DETAIL);
    let mut catalog = JobCatalog::new();

    assert_eq!(catalog.refresh_listings(&source, TABLE_URL).unwrap(), 3);
    assert_eq!(catalog.available_counties(), vec!["Albany", "Erie"]);

    catalog.set_county_filter(counties(&["Albany"]));
    assert_eq!(catalog.filtered().len(), 2);

    let mut seen = Vec::new();
    let summary = catalog.scrape_details(&source, DETAIL_BASE, |i, total, item| {
        seen.push((i, total, item.to_string()));
    });
    assert_eq!(summary.scraped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(seen, vec![(1, 2, "12345".to_string()), (2, 2, "22222".to_string())]);

    // Erie's job was never requested.
    assert!(!source.requested.borrow().iter().any(|u| u.ends_with("id=33333")));

    let ok = catalog.detail("12345").and_then(DetailRecord::as_detail).unwrap();
    assert_eq!(ok.job_title, "Nurse I");

    match catalog.detail("22222").unwrap() {
        DetailRecord::Failed { item_number, error } => {
            assert_eq!(item_number, "22222");
            assert!(error.contains("404"));
        }
        other => panic!("expected failure record, got {other:?}"),
    }
}

#[test]
fn details_are_keyed_by_listing_id_even_when_page_disagrees() {
    let detail = DETAIL.replace("Vacancy ID: 12345", "Vacancy ID: 99999");
    let source = CannedPages::default()
        .with(TABLE_URL, TABLE)
        .with(&format!("{DETAIL_BASE}?id=12345"), &detail);
    let mut catalog = JobCatalog::new();
    catalog.refresh_listings(&source, TABLE_URL).unwrap();
    catalog.set_county_filter(counties(&["Albany"]));
    catalog.scrape_details(&source, DETAIL_BASE, |_, _, _| {});

    let record = catalog.detail("12345").unwrap();
    assert_eq!(record.item_number(), "99999");

    let (key, _) = catalog.find_detail("99999").unwrap();
    assert_eq!(key, "12345");
    assert_eq!(catalog.agency(key), "Health Dept");
}

#[test]
fn new_listing_drops_old_details() {
    let source = CannedPages::default()
        .with(TABLE_URL, TABLE)
        .with(&format!("{DETAIL_BASE}?id=12345"), DETAIL);
    let mut catalog = JobCatalog::new();
    catalog.refresh_listings(&source, TABLE_URL).unwrap();
    catalog.scrape_details(&source, DETAIL_BASE, |_, _, _| {});
    assert_eq!(catalog.details().len(), 3);

    catalog.refresh_listings(&source, TABLE_URL).unwrap();
    assert!(catalog.details().is_empty());
}

#[test]
fn saved_session_restores() {
    let dir = tempfile::tempdir().unwrap();
    let source = CannedPages::default()
        .with(TABLE_URL, TABLE)
        .with(&format!("{DETAIL_BASE}?id=33333"), DETAIL);
    let mut catalog = JobCatalog::new();
    catalog.refresh_listings(&source, TABLE_URL).unwrap();
    catalog.set_county_filter(counties(&["Erie"]));
    catalog.scrape_details(&source, DETAIL_BASE, |_, _, _| {});

    let saved = store::save_job_data(dir.path(), catalog.filtered(), &catalog.details_in_order()).unwrap();
    let restored = JobCatalog::restore(
        store::load_json(&saved.filtered_jobs).unwrap(),
        store::load_json(&saved.job_details).unwrap(),
    );

    assert_eq!(restored.filtered(), catalog.filtered());
    assert_eq!(restored.details(), catalog.details());
    assert_eq!(restored.agency("33333"), "DOCCS");
}
