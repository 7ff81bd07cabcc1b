use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::html::joined_text;
use super::http::{FetchError, PageSource};
use crate::models::JobListing;

/// Cells a data row needs; anything shorter is a header/footer/spacer row.
pub const LISTING_COLUMNS: usize = 7;

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tbody tr").expect("row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("cell selector"));

/// Fetches the vacancy table at `url` and parses every data row.
///
/// A failed fetch is returned as-is; there is no partial listing.
pub fn scrape_vacancy_table(
    source: &impl PageSource,
    url: &str,
) -> Result<Vec<JobListing>, FetchError> {
    let body = source.fetch(url)?;
    let jobs = parse_vacancy_table(&body);
    info!(count = jobs.len(), "parsed vacancy table");
    Ok(jobs)
}

/// One listing per `<tr>` with at least seven cells and an item number, in
/// document order.
pub fn parse_vacancy_table(html: &str) -> Vec<JobListing> {
    let document = Html::parse_document(html);
    let mut jobs = Vec::new();

    for row in document.select(&ROW) {
        let cols: Vec<String> = row.select(&CELL).map(|td| joined_text(td, "")).collect();
        if cols.len() < LISTING_COLUMNS {
            debug!(cells = cols.len(), "skipping non-data row");
            continue;
        }
        if cols[0].is_empty() {
            debug!("skipping row without an item number");
            continue;
        }

        let mut cols = cols.into_iter();
        let mut next = || cols.next().unwrap_or_default();
        jobs.push(JobListing {
            item_number: next(),
            job_title: next(),
            salary_grade: next(),
            posting_date: next(),
            application_deadline: next(),
            agency: next(),
            county: next(),
        });
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_skipped() {
        let html = r#"<table><tbody>
            <tr><td colspan="7">No more results</td></tr>
            <tr><td>1</td><td>Clerk</td><td>SG-6</td><td>01/01/24</td><td>01/15/24</td><td>DMV</td><td>Kings</td></tr>
            <tr><td>a</td><td>b</td><td>c</td></tr>
        </tbody></table>"#;
        let jobs = parse_vacancy_table(html);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].county, "Kings");
    }

    #[test]
    fn extra_cells_are_ignored() {
        let html = "<table><tbody><tr><td>9</td><td>T</td><td>G</td><td>P</td><td>D</td><td>A</td><td>C</td><td>extra</td></tr></tbody></table>";
        let jobs = parse_vacancy_table(html);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].county, "C");
    }

    #[test]
    fn rows_without_item_number_are_skipped() {
        let html = r#"<table><tbody>
            <tr><td> </td><td>T</td><td>G</td><td>P</td><td>D</td><td>A</td><td>C</td></tr>
            <tr><td>42</td><td>T</td><td>G</td><td>P</td><td>D</td><td>A</td><td>C</td></tr>
        </tbody></table>"#;
        let ids: Vec<_> = parse_vacancy_table(html).into_iter().map(|j| j.item_number).collect();
        assert_eq!(ids, vec!["42"]);
    }

    #[test]
    fn page_without_table_yields_nothing() {
        assert!(parse_vacancy_table("<html><body><p>Maintenance</p></body></html>").is_empty());
    }
}
