use statejobs_matcher::scrape::{parse_job_details, parse_vacancy_table};
use statejobs_matcher::{DetailRecord, JobDetail, JobListing};

const TABLE: &str = include_str!("fixtures/vacancy_table.html");
const DETAIL: &str = include_str!("fixtures/vacancy_detail.html");

#[test]
fn table_rows_map_positionally() {
    let jobs = parse_vacancy_table(TABLE);
    assert_eq!(
        jobs[0],
        JobListing {
            item_number: "12345".into(),
            job_title: "Nurse I".into(),
            salary_grade: "SG-18".into(),
            posting_date: "01/02/24".into(),
            application_deadline: "02/01/24".into(),
            agency: "Health Dept".into(),
            county: "Albany".into(),
        }
    );
}

#[test]
fn table_skips_short_rows_and_keeps_order() {
    let ids: Vec<_> = parse_vacancy_table(TABLE)
        .into_iter()
        .map(|j| j.item_number)
        .collect();
    assert_eq!(ids, vec!["12345", "22222", "33333"]);
}

#[test]
fn detail_page_is_normalized() {
    let detail = parse_job_details(DETAIL, "12345");

    assert_eq!(detail.item_number, "12345");
    assert_eq!(detail.posting_date, "01/02/24");
    assert_eq!(detail.application_deadline, "02/01/24");
    assert_eq!(detail.job_title, "Nurse I");
    assert_eq!(detail.salary_range, "From $42,939 to $52,989 Annually");
    assert!(detail.minimum_qualifications.starts_with("Licensed and currently registered"));
    assert!(detail.duties_description.ends_with("and supervise LPNs."));
    assert!(detail.application_procedure.starts_with("Email your resume to jobs@health.ny.gov"));
    assert_eq!(detail.preferred_qualifications, "");
}

#[test]
fn contact_address_comes_from_contact_section() {
    let detail = parse_job_details(DETAIL, "12345");

    assert_eq!(
        detail.contact_information,
        "Name: Pat Smith\nPhone: 518-555-0100\nEmail: jobs@health.ny.gov\nAddress: ESP Room 2050, Menands, NY, 12204"
    );
    // Location reads the whole-page map, where the contact section's City and
    // Zip Code were written last; only "Street Address" is position-specific.
    assert_eq!(detail.location, "Corning Tower, Menands, NY, 12204");
    assert!(!detail.contact_information.contains(&detail.location));
}

#[test]
fn vacancy_id_on_page_overrides_requested_id() {
    let html = DETAIL.replace("Vacancy ID: 12345", "Vacancy ID: 99999");
    let detail = parse_job_details(&html, "12345");
    assert_eq!(detail.item_number, "99999");
}

#[test]
fn requested_id_kept_without_review_header() {
    let html = DETAIL.replace("<h2>Review Vacancy</h2>", "<h2>Printable View</h2>");
    let detail = parse_job_details(&html, "12345");
    assert_eq!(detail.item_number, "12345");
    assert_eq!(detail.posting_date, "");
    assert_eq!(detail.application_deadline, "");
}

#[test]
fn missing_contact_heading_gives_empty_contact() {
    let html = r#"<html><body>
        <h2>Review Vacancy</h2><p>Date Posted: 03/04/24</p>
        <div id="vacancyDetails">
          <h3>Basics</h3>
          <p class="row"><span class="leftCol">Title</span><span class="rightCol">Clerk 1</span></p>
          <p class="row"><span class="leftCol">City</span><span class="rightCol">Buffalo</span></p>
        </div>
    </body></html>"#;
    let detail = parse_job_details(html, "555");
    assert_eq!(detail.contact_information, "");
    assert_eq!(detail.location, "Buffalo");
    assert_eq!(detail.job_title, "Clerk 1");
}

#[test]
fn unrelated_page_degrades_to_empty_record() {
    let detail = parse_job_details("<html><body><h1>Service Unavailable</h1></body></html>", "777");
    assert_eq!(
        detail,
        JobDetail {
            item_number: "777".into(),
            ..Default::default()
        }
    );
}

#[test]
fn reparsing_is_identical() {
    let first = serde_json::to_string(&parse_job_details(DETAIL, "12345")).unwrap();
    let second = serde_json::to_string(&parse_job_details(DETAIL, "12345")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn detail_survives_json_round_trip() {
    let record = DetailRecord::Detail(parse_job_details(DETAIL, "12345"));
    let json = serde_json::to_string_pretty(&record).unwrap();
    let back: DetailRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn block_content_in_values_is_kept() {
    let html = r#"<html><body>
        <div id="vacancyDetails">
          <h3>Job Specifics</h3>
          <p class="row"><span class="leftCol">Duties Description</span><span class="rightCol">Intro<ul><li>Patient care</li><li>Charting</li></ul></span></p>
          <p class="row"><span class="leftCol">Minimum Qualifications</span><span class="rightCol"><div>RN license</div></span></p>
          <p class="row"><span class="leftCol">Salary Range</span><span class="rightCol">$50,000</span></p>
          <h3>Contact Information</h3>
          <p class="row"><span class="leftCol">Name</span><span class="rightCol">Pat Smith</span></p>
          <p class="row"><span class="leftCol">Street</span><span class="rightCol"><div>ESP Room 2050</div></span></p>
        </div>
    </body></html>"#;
    let detail = parse_job_details(html, "1");

    assert_eq!(detail.duties_description, "Intro Patient care Charting");
    assert_eq!(detail.minimum_qualifications, "RN license");
    assert_eq!(detail.salary_range, "$50,000");
    assert_eq!(detail.contact_information, "Name: Pat Smith\nAddress: ESP Room 2050");
}
