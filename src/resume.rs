use anyhow::Context;
use std::fs;
use std::path::Path;

/// Reads a resume as plain text. PDFs go through `pdf-extract`; anything
/// else is read as (lossy) UTF-8.
pub fn load_resume_text(path: &Path) -> anyhow::Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path).with_context(|| format!("extracting text from {}", path.display()))?
    } else {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        String::from_utf8_lossy(&bytes).into_owned()
    };

    if text.trim().is_empty() {
        anyhow::bail!("resume {} contains no text", path.display());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_text_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        fs::write(&path, "Registered Nurse, 5 years ICU").unwrap();
        assert_eq!(load_resume_text(&path).unwrap(), "Registered Nurse, 5 years ICU");
    }

    #[test]
    fn blank_resume_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        fs::write(&path, "  \n").unwrap();
        assert!(load_resume_text(&path).is_err());
    }
}
