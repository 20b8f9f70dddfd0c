use std::path::PathBuf;

use serde::Serialize;
use tokio::fs;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::utils::fields::{extract_contact_fields, ContactFields};

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Pdf,
    Docx,
}

impl ResumeKind {
    pub fn extension(self) -> &'static str {
        match self {
            ResumeKind::Pdf => "pdf",
            ResumeKind::Docx => "docx",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedResume {
    pub fields: ContactFields,
    pub text: String,
    pub file_id: String,
}

/// Saves uploaded resumes and extracts their text through external tools:
/// `pdftotext` for PDFs and a headless LibreOffice text conversion for
/// DOCX. Field extraction on the resulting text is regex-based.
#[derive(Clone)]
pub struct ResumeService {
    uploads_dir: PathBuf,
}

impl ResumeService {
    pub fn new(uploads_dir: PathBuf) -> Self {
        Self { uploads_dir }
    }

    pub fn detect_kind(filename: &str, content_type: Option<&str>) -> Option<ResumeKind> {
        match content_type {
            Some(PDF_MIME) => return Some(ResumeKind::Pdf),
            Some(DOCX_MIME) => return Some(ResumeKind::Docx),
            _ => {}
        }
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("pdf") => Some(ResumeKind::Pdf),
            Some("docx") => Some(ResumeKind::Docx),
            _ => None,
        }
    }

    pub async fn ingest(&self, kind: ResumeKind, data: &[u8]) -> Result<ParsedResume> {
        fs::create_dir_all(&self.uploads_dir).await?;
        let file_id = format!("{}.{}", uuid::Uuid::new_v4(), kind.extension());
        let path = self.uploads_dir.join(&file_id);
        fs::write(&path, data).await?;

        let text = match kind {
            ResumeKind::Pdf => self.pdf_to_text(&path).await,
            ResumeKind::Docx => self.docx_to_text(&path).await,
        }
        .map_err(|e| {
            tracing::error!(error = %e, file_id, "resume text extraction failed");
            Error::Internal("Failed to process resume".to_string())
        })?;

        let fields = extract_contact_fields(&text);
        Ok(ParsedResume {
            fields,
            text,
            file_id,
        })
    }

    async fn pdf_to_text(&self, path: &std::path::Path) -> Result<String> {
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .await
            .map_err(|e| Error::Internal(format!("failed to run pdftotext: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Internal(format!(
                "pdftotext failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn docx_to_text(&self, path: &std::path::Path) -> Result<String> {
        let temp_dir = std::env::temp_dir().join(format!("resume_txt_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&temp_dir).await?;

        let output = Command::new("libreoffice")
            .arg("--headless")
            .arg("--norestore")
            .arg("--convert-to")
            .arg("txt:Text")
            .arg("--outdir")
            .arg(&temp_dir)
            .arg(path)
            .output()
            .await;

        let result = match output {
            Ok(out) if out.status.success() => self.read_converted_text(&temp_dir).await,
            Ok(out) => Err(Error::Internal(format!(
                "LibreOffice text conversion failed: {}",
                String::from_utf8_lossy(&out.stderr)
            ))),
            Err(e) => Err(Error::Internal(format!("failed to run libreoffice: {}", e))),
        };

        let _ = fs::remove_dir_all(&temp_dir).await;
        result
    }

    async fn read_converted_text(&self, dir: &std::path::Path) -> Result<String> {
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let p = entry.path();
            if p.extension().and_then(|e| e.to_str()) == Some("txt") {
                let raw = fs::read(&p).await?;
                return Ok(String::from_utf8_lossy(&raw).into_owned());
            }
        }
        Err(Error::Internal(
            "LibreOffice produced no text output".to_string(),
        ))
    }
}
