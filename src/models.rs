use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the vacancy table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobListing {
    pub item_number: String,
    pub job_title: String,
    pub salary_grade: String,
    pub posting_date: String,
    pub application_deadline: String,
    pub agency: String,
    pub county: String,
}

/// Normalized contents of a vacancy detail page.
///
/// Every field is total: anything the page does not provide is an empty
/// string, both when parsed from HTML and when read back from a JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDetail {
    pub item_number: String,
    pub posting_date: String,
    pub application_deadline: String,
    pub job_title: String,
    pub minimum_qualifications: String,
    pub preferred_qualifications: String,
    pub duties_description: String,
    pub salary_range: String,
    pub location: String,
    pub application_procedure: String,
    pub contact_information: String,
}

/// What the catalog stores per scraped item: either the parsed page or the
/// reason it could not be fetched.
///
/// Untagged so the saved JSON is either the plain detail object or
/// `{"item_number": ..., "error": ...}`. `Failed` must stay first: a
/// `JobDetail` would happily accept the failure shape since all its fields
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailRecord {
    Failed { item_number: String, error: String },
    Detail(JobDetail),
}

impl DetailRecord {
    pub fn item_number(&self) -> &str {
        match self {
            DetailRecord::Failed { item_number, .. } => item_number,
            DetailRecord::Detail(detail) => &detail.item_number,
        }
    }

    pub fn as_detail(&self) -> Option<&JobDetail> {
        match self {
            DetailRecord::Detail(detail) => Some(detail),
            DetailRecord::Failed { .. } => None,
        }
    }
}

/// Candidate domain and salary band inferred from a resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub candidate_domain: String,
    pub candidate_salary_range: String,
}

impl CandidateProfile {
    pub fn is_complete(&self) -> bool {
        !self.candidate_domain.trim().is_empty() && !self.candidate_salary_range.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchLevel {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "minimum")]
    Minimum,
    #[default]
    #[serde(rename = "no match")]
    NoMatch,
}

impl MatchLevel {
    /// Lenient parse of a label coming back from the model. Anything that is
    /// not recognisably "good" or "minimum" counts as no match.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "good" => MatchLevel::Good,
            "minimum" => MatchLevel::Minimum,
            _ => MatchLevel::NoMatch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLevel::Good => "good",
            MatchLevel::Minimum => "minimum",
            MatchLevel::NoMatch => "no match",
        }
    }

    /// Whether documents are worth generating for this level.
    pub fn is_applicable(&self) -> bool {
        matches!(self, MatchLevel::Good | MatchLevel::Minimum)
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub item_number: String,
    pub job_title: String,
    pub resume_match_level: MatchLevel,
    pub match_explanation: String,
}

impl MatchResult {
    pub fn no_match(item_number: &str, job_title: &str, explanation: impl Into<String>) -> Self {
        Self {
            item_number: item_number.to_string(),
            job_title: job_title.to_string(),
            resume_match_level: MatchLevel::NoMatch,
            match_explanation: explanation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_record_keeps_its_shape() {
        let json = r#"{"item_number":"123","error":"HTTP 404"}"#;
        let record: DetailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record,
            DetailRecord::Failed {
                item_number: "123".into(),
                error: "HTTP 404".into()
            }
        );
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn detail_with_missing_keys_defaults_to_empty() {
        let record: DetailRecord =
            serde_json::from_str(r#"{"item_number":"7","job_title":"Clerk"}"#).unwrap();
        let detail = record.as_detail().expect("detail shape");
        assert_eq!(detail.job_title, "Clerk");
        assert_eq!(detail.location, "");
        assert_eq!(detail.contact_information, "");
    }

    #[test]
    fn match_level_serializes_with_spaces() {
        assert_eq!(serde_json::to_string(&MatchLevel::NoMatch).unwrap(), "\"no match\"");
        let level: MatchLevel = serde_json::from_str("\"minimum\"").unwrap();
        assert_eq!(level, MatchLevel::Minimum);
    }

    #[test]
    fn unknown_labels_degrade_to_no_match() {
        assert_eq!(MatchLevel::from_label(" Good "), MatchLevel::Good);
        assert_eq!(MatchLevel::from_label("MINIMUM"), MatchLevel::Minimum);
        assert_eq!(MatchLevel::from_label("excellent"), MatchLevel::NoMatch);
    }
}
