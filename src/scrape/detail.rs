use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use super::html::{
    following_siblings, has_class, is_heading, is_tag, joined_text, next_in_document, normalized_text,
    trailing_text,
};
use super::http::{FetchError, PageSource};
use crate::models::JobDetail;

static HEADER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("h2 selector"));
static DETAILS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#vacancyDetails").expect("details selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.row").expect("row selector"));
static SECTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3").expect("h3 selector"));
static LEFT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.leftCol").expect("label selector"));
static RIGHT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.rightCol").expect("value selector"));

static DATE_POSTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Date Posted:\s*(\d{1,2}/\d{1,2}/\d{2,4})").expect("date regex"));
static APPLICATIONS_DUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Applications Due:\s*(\d{1,2}/\d{1,2}/\d{2,4})").expect("deadline regex")
});
static VACANCY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Vacancy ID:\s*(\d+)").expect("vacancy id regex"));

const REVIEW_HEADING: &str = "Review Vacancy";
const CONTACT_HEADING: &str = "Contact Information";

/// URL of the printable detail page for `item_number`.
pub fn detail_url(base: &str, item_number: &str) -> String {
    format!("{base}?id={item_number}")
}

/// Fetches and parses one vacancy. Only the fetch can fail; a page that
/// parses badly still comes back as a (mostly empty) record.
pub fn scrape_job_details(
    source: &impl PageSource,
    base: &str,
    item_number: &str,
) -> Result<JobDetail, FetchError> {
    let body = source.fetch(&detail_url(base, item_number))?;
    Ok(parse_job_details(&body, item_number))
}

/// Label → value pairs read off `<p class="row">` elements.
///
/// Rows are inserted in document order and a label seen again overwrites the
/// earlier value. The detail page repeats "City", "State" and "Zip Code"
/// under both the job location and the contact address, so a map built over
/// the whole page holds the contact values for those labels.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelMap {
    fields: HashMap<String, String>,
}

impl LabelMap {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = ElementRef<'a>>) -> Self {
        let mut map = LabelMap::default();
        for row in rows {
            if let Some((label, value)) = label_value(row) {
                map.insert(label, value);
            }
        }
        map
    }

    pub fn insert(&mut self, label: String, value: String) {
        self.fields.insert(label, value);
    }

    /// Value for `label`, or `""` when the page did not have it.
    pub fn get(&self, label: &str) -> &str {
        self.lookup(label).unwrap_or("")
    }

    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn is_row(element: ElementRef<'_>) -> bool {
    is_tag(element, "p") && has_class(element, "row")
}

/// Label and value of one row. Block content inside the value (lists,
/// divs) is parsed out of the `<p>` and follows it as siblings, so the value
/// also takes in everything up to the next row or heading.
fn label_value(row: ElementRef<'_>) -> Option<(String, String)> {
    let left = row.select(&LEFT).next()?;
    let right = row.select(&RIGHT).next()?;

    let mut value: Vec<&str> = right.text().map(str::trim).filter(|t| !t.is_empty()).collect();
    value.extend(trailing_text(row, |el| is_row(el) || is_heading(el)));
    Some((joined_text(left, ""), value.join(" ")))
}

/// Non-blank parts joined with ", ".
fn join_address(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default)]
struct ReviewHeader {
    posting_date: Option<String>,
    application_deadline: Option<String>,
    vacancy_id: Option<String>,
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Dates and canonical id from the paragraph under "Review Vacancy".
fn parse_review_header(document: &Html) -> ReviewHeader {
    let Some(heading) = document
        .select(&HEADER)
        .find(|h| normalized_text(*h) == REVIEW_HEADING)
    else {
        return ReviewHeader::default();
    };
    let Some(paragraph) = next_in_document(document, heading, "p") else {
        return ReviewHeader::default();
    };

    let text = joined_text(paragraph, " ");
    ReviewHeader {
        posting_date: capture(&DATE_POSTED, &text),
        application_deadline: capture(&APPLICATIONS_DUE, &text),
        vacancy_id: capture(&VACANCY_ID, &text),
    }
}

/// Rows between the "Contact Information" heading and the next `<h3>`.
/// Only direct siblings are considered, matching how the page lays the
/// section out.
fn contact_section(details: ElementRef<'_>) -> Option<LabelMap> {
    let heading = details
        .select(&SECTION)
        .find(|h| normalized_text(*h) == CONTACT_HEADING)?;

    let rows = following_siblings(heading)
        .take_while(|el| !is_tag(*el, "h3"))
        .filter(|el| is_row(*el));
    Some(LabelMap::from_rows(rows))
}

fn contact_information(fields: &LabelMap, section: Option<&LabelMap>) -> String {
    let name = fields.get("Name");
    let phone = fields.get("Telephone");
    let fax = fields.get("Fax");
    let email = fields.get("Email Address");
    let street = fields.get("Street");

    let address = match section {
        Some(section) => join_address(&[
            section.lookup("Street").unwrap_or(street),
            section.get("City"),
            section.get("State"),
            section.get("Zip Code"),
        ]),
        None => String::new(),
    };

    [
        ("Name", name),
        ("Phone", phone),
        ("Fax", fax),
        ("Email", email),
        ("Address", address.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Parses a printable vacancy page into a [`JobDetail`].
///
/// `item_number` is what the caller fetched; a "Vacancy ID" on the page
/// replaces it. Missing sections leave the corresponding fields empty.
pub fn parse_job_details(html: &str, item_number: &str) -> JobDetail {
    let document = Html::parse_document(html);
    let header = parse_review_header(&document);

    let details = document.select(&DETAILS).next();
    let fields = details
        .map(|d| LabelMap::from_rows(d.select(&ROW)))
        .unwrap_or_default();
    let section = details.and_then(contact_section);
    debug!(
        item_number,
        labels = fields.len(),
        contact_section = section.is_some(),
        "parsed vacancy details"
    );

    let location = join_address(&[
        fields.get("Street Address"),
        fields.get("City"),
        fields.get("State"),
        fields.get("Zip Code"),
    ]);

    JobDetail {
        item_number: header.vacancy_id.unwrap_or_else(|| item_number.to_string()),
        posting_date: header.posting_date.unwrap_or_default(),
        application_deadline: header.application_deadline.unwrap_or_default(),
        job_title: fields.get("Title").to_string(),
        minimum_qualifications: fields.get("Minimum Qualifications").to_string(),
        preferred_qualifications: String::new(),
        duties_description: fields.get("Duties Description").to_string(),
        salary_range: fields.get("Salary Range").to_string(),
        location,
        application_procedure: fields.get("Notes on Applying").to_string(),
        contact_information: contact_information(&fields, section.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, value: &str) -> String {
        format!(r#"<p class="row"><span class="leftCol">{label}</span><span class="rightCol">{value}</span></p>"#)
    }

    #[test]
    fn later_label_overwrites_earlier() {
        let html = format!("<div>{}{}</div>", row("City", "Albany"), row("City", "Troy"));
        let doc = Html::parse_fragment(&html);
        let map = LabelMap::from_rows(doc.select(&ROW));
        assert_eq!(map.get("City"), "Troy");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn rows_missing_a_column_are_ignored() {
        let html = r#"<div><p class="row"><span class="leftCol">Title</span></p></div>"#;
        let doc = Html::parse_fragment(html);
        assert!(LabelMap::from_rows(doc.select(&ROW)).is_empty());
    }

    #[test]
    fn address_skips_blank_parts() {
        assert_eq!(join_address(&["", "Albany", " ", "12207"]), "Albany, 12207");
        assert_eq!(join_address(&["", ""]), "");
    }

    #[test]
    fn four_digit_years_are_captured_whole() {
        let html = "<h2>Review Vacancy</h2><p>Date Posted: 01/02/2024 Applications Due: 2/1/24</p>";
        let detail = parse_job_details(html, "1");
        assert_eq!(detail.posting_date, "01/02/2024");
        assert_eq!(detail.application_deadline, "2/1/24");
    }

    #[test]
    fn contact_street_falls_back_to_whole_page() {
        let html = format!(
            r#"<div id="vacancyDetails">{}<h3>Contact Information</h3>{}{}</div>"#,
            row("Street", "1 Main St"),
            row("Name", "Pat Doe"),
            row("City", "Utica"),
        );
        let detail = parse_job_details(&html, "5");
        assert_eq!(detail.contact_information, "Name: Pat Doe\nAddress: 1 Main St, Utica");
    }

    #[test]
    fn detail_url_appends_id() {
        assert_eq!(detail_url("https://x/vacancyDetailsPrint.cfm", "42"), "https://x/vacancyDetailsPrint.cfm?id=42");
    }
}
