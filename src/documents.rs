use anyhow::Context;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::applications::{append_application, ApplicationRecord};
use crate::catalog::JobCatalog;
use crate::llm::{Completion, LanguageModel, LlmError};
use crate::models::{JobDetail, MatchLevel, MatchResult};

pub const OUTPUT_DIR: &str = "generated_documents";

/// The two user-supplied templates the model fills in.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    pub cover_letter: String,
    pub resume: String,
}

impl Templates {
    pub fn load(cover_letter: &Path, resume: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            cover_letter: fs::read_to_string(cover_letter)
                .with_context(|| format!("{} not found", cover_letter.display()))?,
            resume: fs::read_to_string(resume).with_context(|| format!("{} not found", resume.display()))?,
        })
    }
}

/// Job fields a document prompt draws on.
#[derive(Debug, Clone, Copy)]
pub struct JobContext<'a> {
    pub detail: &'a JobDetail,
    pub agency: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocuments {
    pub cover_letter: String,
    pub tailored_resume: String,
    pub resume_changes: String,
    pub instructions: String,
}

#[derive(Debug, Clone)]
pub struct DocumentPaths {
    pub cover_letter: PathBuf,
    pub resume: PathBuf,
    pub resume_changes: PathBuf,
    pub instructions: PathBuf,
}

fn template_prompt(doc_type: &str, job: JobContext<'_>, resume_text: &str, notes: &str, template: &str) -> String {
    let d = job.detail;
    format!(
        r#"You are an expert career services writer. Tailor the {doc_type} below to this specific job, starting from the provided template.

Job Details:
Title: {title}
Agency: {agency}
Minimum Qualifications: {min_qual}
Duties: {duties}
Location: {location}
Application Procedure: {procedure}

Candidate's Original Resume:
{resume_text}

Notes from Candidate:
{notes}

Template:
{template}

Instructions:
- Work the job title, agency and the candidate's relevant experience into the template.
- Keep a professional, expert tone.
- For a resume, put the experience and skills that best fit the job requirements first.
- Output ONLY the full {doc_type} text with no extra commentary.
"#,
        title = d.job_title,
        agency = job.agency,
        min_qual = d.minimum_qualifications,
        duties = d.duties_description,
        location = d.location,
        procedure = d.application_procedure,
    )
}

fn instructions_prompt(application_procedure: &str, notes: &str) -> String {
    format!(
        r#"You are an expert career coach. Turn the application procedure below into clear, step-by-step instructions for the candidate. Be concise but complete. If the candidate has to email a resume and cover letter, give the subject line and file formats. If a web link is involved, say how to get there and what to fill in. Mention any forms that must be completed.

Application Procedure:
{application_procedure}

Notes from Candidate:
{notes}

Respond with a numbered list of steps.
"#
    )
}

fn changes_prompt(original: &str, tailored: &str) -> String {
    format!(
        r#"You are a professional editor. Below are a candidate's original resume and a version tailored for a specific job. In one short paragraph, explain what was changed or added in the tailored version and how it was customized for the job.

Original Resume:
{original}

Tailored Resume:
{tailored}
"#
    )
}

/// Drafts the full package for one job: cover letter, tailored resume, an
/// explanation of the resume changes, and application steps.
pub fn generate_documents(
    model: &impl LanguageModel,
    job: JobContext<'_>,
    resume_text: &str,
    notes: &str,
    templates: &Templates,
) -> Result<GeneratedDocuments, LlmError> {
    let cover_letter = model.complete(&Completion::new(
        template_prompt("cover letter", job, resume_text, notes, &templates.cover_letter),
        2000,
        0.7,
    ))?;
    let tailored_resume = model.complete(&Completion::new(
        template_prompt("resume", job, resume_text, notes, &templates.resume),
        2000,
        0.7,
    ))?;
    let resume_changes = model.complete(&Completion::new(changes_prompt(resume_text, &tailored_resume), 500, 0.0))?;
    let instructions = model.complete(&Completion::new(
        instructions_prompt(&job.detail.application_procedure, notes),
        1000,
        0.0,
    ))?;

    Ok(GeneratedDocuments {
        cover_letter,
        tailored_resume,
        resume_changes,
        instructions,
    })
}

pub fn write_documents(
    dir: &Path,
    item_number: &str,
    stamp: &str,
    docs: &GeneratedDocuments,
) -> anyhow::Result<DocumentPaths> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let write = |kind: &str, text: &str| -> anyhow::Result<PathBuf> {
        let path = dir.join(format!("{item_number}_{kind}_{stamp}.txt"));
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    };

    Ok(DocumentPaths {
        cover_letter: write("cover_letter", &docs.cover_letter)?,
        resume: write("resume", &docs.tailored_resume)?,
        resume_changes: write("resume_changes", &docs.resume_changes)?,
        instructions: write("instructions", &docs.instructions)?,
    })
}

/// Which matches to generate for: explicit item numbers, every match at a
/// level, or both. Only "good" and "minimum" matches are ever selected.
pub fn select_matches<'a>(
    matches: &'a [MatchResult],
    items: &[String],
    level: Option<MatchLevel>,
) -> Vec<&'a MatchResult> {
    matches
        .iter()
        .filter(|m| m.resume_match_level.is_applicable())
        .filter(|m| {
            items.iter().any(|i| *i == m.item_number) || level.is_some_and(|l| l == m.resume_match_level)
        })
        .collect()
}

/// Per-job outcome of a generation run.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated {
        item_number: String,
        docs: GeneratedDocuments,
        paths: DocumentPaths,
    },
    Skipped {
        item_number: String,
        reason: String,
    },
}

/// Everything a generation run needs besides the model.
pub struct GenerationRun<'a> {
    pub catalog: &'a JobCatalog,
    pub resume_text: &'a str,
    pub notes: &'a str,
    pub templates: &'a Templates,
    pub output_dir: &'a Path,
    pub applications_csv: &'a Path,
}

/// Generates and saves documents for each selected match. A failure on one
/// job is recorded as skipped and the run carries on.
pub fn generate_for_matches(
    model: &impl LanguageModel,
    run: &GenerationRun<'_>,
    selected: &[&MatchResult],
) -> Vec<GenerationOutcome> {
    let stamp = crate::store::timestamp();
    let mut outcomes = Vec::new();

    for m in selected {
        let skip = |reason: String| {
            warn!(item_number = %m.item_number, "{reason}");
            GenerationOutcome::Skipped {
                item_number: m.item_number.clone(),
                reason,
            }
        };

        let Some((key, record)) = run.catalog.find_detail(&m.item_number) else {
            outcomes.push(skip("no scraped details for this job".to_string()));
            continue;
        };
        let Some(detail) = record.as_detail() else {
            outcomes.push(skip("job details could not be retrieved".to_string()));
            continue;
        };

        let agency = run.catalog.agency(key);
        let job = JobContext { detail, agency };
        let docs = match generate_documents(model, job, run.resume_text, run.notes, run.templates) {
            Ok(docs) => docs,
            Err(e) => {
                outcomes.push(skip(format!("document generation failed: {e}")));
                continue;
            }
        };
        let paths = match write_documents(run.output_dir, &m.item_number, &stamp, &docs) {
            Ok(paths) => paths,
            Err(e) => {
                outcomes.push(skip(format!("saving documents failed: {e:#}")));
                continue;
            }
        };

        let record = ApplicationRecord {
            tracking_number: format!("{}-{}", m.item_number, stamp),
            item_number: m.item_number.clone(),
            job_title: detail.job_title.clone(),
            agency: agency.to_string(),
            match_level: m.resume_match_level.to_string(),
            generated_at: Local::now().format("%Y-%m-%d").to_string(),
            cover_letter_path: paths.cover_letter.display().to_string(),
            resume_path: paths.resume.display().to_string(),
            instructions_path: paths.instructions.display().to_string(),
            status: "Generated".to_string(),
        };
        if let Err(e) = append_application(run.applications_csv, &record) {
            warn!(item_number = %m.item_number, "could not log application: {e:#}");
        }

        info!(item_number = %m.item_number, "documents generated");
        outcomes.push(GenerationOutcome::Generated {
            item_number: m.item_number.clone(),
            docs,
            paths,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, level: MatchLevel) -> MatchResult {
        MatchResult {
            item_number: id.into(),
            job_title: format!("Job {id}"),
            resume_match_level: level,
            match_explanation: String::new(),
        }
    }

    #[test]
    fn selection_never_includes_no_match() {
        let matches = vec![
            result("1", MatchLevel::Good),
            result("2", MatchLevel::Minimum),
            result("3", MatchLevel::NoMatch),
        ];
        let ids = |sel: Vec<&MatchResult>| sel.iter().map(|m| m.item_number.clone()).collect::<Vec<_>>();

        assert_eq!(ids(select_matches(&matches, &["3".to_string(), "2".to_string()], None)), vec!["2"]);
        assert_eq!(ids(select_matches(&matches, &[], Some(MatchLevel::Good))), vec!["1"]);
        assert_eq!(ids(select_matches(&matches, &["2".to_string()], Some(MatchLevel::Good))), vec!["1", "2"]);
        assert!(select_matches(&matches, &[], None).is_empty());
    }

    #[test]
    fn documents_are_written_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        let docs = GeneratedDocuments {
            cover_letter: "Dear team".into(),
            tailored_resume: "Resume".into(),
            resume_changes: "Reordered".into(),
            instructions: "1. Email".into(),
        };
        let paths = write_documents(dir.path(), "42", "20240102_030405", &docs).unwrap();
        assert!(paths.cover_letter.ends_with("42_cover_letter_20240102_030405.txt"));
        assert_eq!(fs::read_to_string(&paths.instructions).unwrap(), "1. Email");
    }
}
