use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::JobCatalog;
use crate::llm::{Completion, LanguageModel, LlmError};
use crate::models::{CandidateProfile, DetailRecord, MatchLevel, MatchResult};

const MATCH_MAX_TOKENS: u32 = 300;

fn profile_prompt(resume_text: &str) -> String {
    format!(
        r#"You are an expert career advisor. Read the candidate's resume below. Infer the candidate's professional domain (for example "Nursing", "Data Engineering", "Accounting", "Teaching") and a realistic current salary range for their role and experience level.

Resume:
{resume_text}

Respond in JSON with exactly this format:
{{
  "candidate_domain": "string describing the domain",
  "candidate_salary_range": "approximate current salary range, e.g. '$70,000-$90,000'"
}}
"#
    )
}

fn match_prompt(
    profile: &CandidateProfile,
    job_title: &str,
    salary_range: &str,
    minimum_qualifications: &str,
    duties: &str,
    agency: &str,
    resume_text: &str,
) -> String {
    format!(
        r#"You are a professional career advisor. Classify how well this candidate matches the job below.

Candidate Domain: {domain}
Candidate Current Salary Range: {salary}

Job Details:
Title: {job_title}
Salary Range: {salary_range}
Minimum Qualifications: {minimum_qualifications}
Duties: {duties}
Agency: {agency}

The candidate's resume:
{resume_text}

Criteria:
- "no match": the candidate does not meet the minimum qualifications.
- "minimum": the candidate meets the minimum qualifications, but the domain or the salary range is not well aligned.
- "good": the candidate meets the minimum qualifications, the domain aligns with the job, and the job's salary range is reasonably close to the candidate's current range.

Return only a JSON object, without code fences, in this structure:
{{
  "resume_match_level": "minimum" | "good" | "no match",
  "match_explanation": "A brief explanation here."
}}
"#,
        domain = profile.candidate_domain,
        salary = profile.candidate_salary_range,
    )
}

/// The JSON object inside a model reply: everything from the first `{` to
/// the last `}`. Code fences and any chatter around the object fall away. A
/// reply without braces is returned trimmed, for the parser to reject.
fn json_object(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply.trim(),
    }
}

/// Asks the model for the candidate's domain and salary band.
pub fn infer_profile(model: &impl LanguageModel, resume_text: &str) -> Result<CandidateProfile, LlmError> {
    let reply = model.complete(&Completion::new(profile_prompt(resume_text), MATCH_MAX_TOKENS, 0.0))?;
    let profile: CandidateProfile = serde_json::from_str(json_object(&reply))?;
    info!(domain = %profile.candidate_domain, salary = %profile.candidate_salary_range, "inferred candidate profile");
    Ok(profile)
}

#[derive(Debug, Deserialize)]
struct MatchReply {
    #[serde(default)]
    resume_match_level: Option<String>,
    #[serde(default)]
    match_explanation: String,
}

/// Turns the classifier's raw reply into a level and explanation. The
/// object may be fenced or wrapped in prose; a reply with no parseable object
/// degrades to "no match" and keeps the raw text in the explanation.
pub fn parse_match_reply(reply: &str) -> (MatchLevel, String) {
    match serde_json::from_str::<MatchReply>(json_object(reply)) {
        Ok(parsed) => {
            let level = parsed
                .resume_match_level
                .as_deref()
                .map(MatchLevel::from_label)
                .unwrap_or(MatchLevel::NoMatch);
            (level, parsed.match_explanation)
        }
        Err(_) => (
            MatchLevel::NoMatch,
            format!("Error during evaluation: Unable to parse JSON. Raw response: {reply}"),
        ),
    }
}

/// Classifies one scraped job against the candidate. Never fails: failed
/// scrapes, jobs without minimum qualifications, model errors and bad JSON
/// all come back as "no match" with an explanation.
pub fn match_job(
    model: &impl LanguageModel,
    profile: &CandidateProfile,
    resume_text: &str,
    record: &DetailRecord,
    agency: &str,
) -> MatchResult {
    let detail = match record {
        DetailRecord::Failed { item_number, .. } => {
            return MatchResult::no_match(item_number, "", "Job details could not be retrieved.");
        }
        DetailRecord::Detail(detail) => detail,
    };

    let min_qual = detail.minimum_qualifications.trim();
    if min_qual.is_empty() {
        return MatchResult::no_match(
            &detail.item_number,
            &detail.job_title,
            "No minimum qualifications listed.",
        );
    }

    let prompt = match_prompt(
        profile,
        &detail.job_title,
        &detail.salary_range,
        min_qual,
        &detail.duties_description,
        agency,
        resume_text,
    );

    let (level, explanation) = match model.complete(&Completion::new(prompt, MATCH_MAX_TOKENS, 0.0)) {
        Ok(reply) => parse_match_reply(&reply),
        Err(e) => {
            warn!(item_number = %detail.item_number, "match classification failed: {e}");
            (MatchLevel::NoMatch, format!("Error during evaluation: {e}"))
        }
    };

    MatchResult {
        item_number: detail.item_number.clone(),
        job_title: detail.job_title.clone(),
        resume_match_level: level,
        match_explanation: explanation,
    }
}

/// Runs [`match_job`] over every scraped detail in the catalog, in listing
/// order.
pub fn match_catalog(
    model: &impl LanguageModel,
    profile: &CandidateProfile,
    resume_text: &str,
    catalog: &JobCatalog,
    mut progress: impl FnMut(usize, usize),
) -> Vec<MatchResult> {
    let details = catalog.details_in_order();
    let total = details.len();
    details
        .into_iter()
        .enumerate()
        .map(|(i, (item_number, record))| {
            progress(i + 1, total);
            match_job(model, profile, resume_text, record, catalog.agency(item_number))
        })
        .collect()
}
