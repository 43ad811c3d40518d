//! Persona documents and the system prompt built from them.
//!
//! Two documents describe the persona: a résumé PDF and a plain-text
//! summary. Both are read once at startup. A missing or unreadable document
//! never stops the process; a fixed placeholder takes its place and a
//! warning is logged.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::PersonaConfig;

/// Stand-in text when the résumé cannot be loaded.
pub const RESUME_PLACEHOLDER: &str = "Could not find LinkedIn file.";

/// Stand-in text when the summary cannot be loaded.
pub const SUMMARY_PLACEHOLDER: &str = "Could not find summary file.";

/// Faults while reading a persona document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The file does not exist.
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The PDF could not be parsed.
    #[error("failed to extract PDF text from {}: {message}", path.display())]
    Pdf {
        /// File path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Loaded persona content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Display name the assistant speaks as.
    pub name: String,
    /// Summary document text or [`SUMMARY_PLACEHOLDER`].
    pub summary: String,
    /// Résumé text or [`RESUME_PLACEHOLDER`].
    pub resume: String,
}

impl Persona {
    /// Load both documents from the configured persona directory.
    ///
    /// Infallible: each missing or unreadable document is replaced by its
    /// placeholder.
    pub fn load(config: &PersonaConfig) -> Self {
        let resume = load_or_placeholder(
            "resume",
            &config.resume_path(),
            read_resume_pdf,
            RESUME_PLACEHOLDER,
        );
        let summary = load_or_placeholder(
            "summary",
            &config.summary_path(),
            read_summary,
            SUMMARY_PLACEHOLDER,
        );
        Self {
            name: config.name.clone(),
            summary,
            resume,
        }
    }

    /// Render the system prompt for this persona.
    pub fn system_prompt(&self) -> String {
        render_system_prompt(self)
    }
}

/// Read the summary text file.
///
/// # Errors
///
/// Returns [`DocumentError`] if the file is missing or unreadable.
pub fn read_summary(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|source| io_error(path, source))
}

/// Extract the text of every page of a PDF, concatenated in page order.
///
/// # Errors
///
/// Returns [`DocumentError`] if the file is missing or cannot be parsed.
pub fn read_resume_pdf(path: &Path) -> Result<String, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }
    pdf_extract::extract_text(path).map_err(|e| DocumentError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn io_error(path: &Path, source: std::io::Error) -> DocumentError {
    if source.kind() == std::io::ErrorKind::NotFound {
        DocumentError::NotFound(path.to_path_buf())
    } else {
        DocumentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn load_or_placeholder(
    label: &str,
    path: &Path,
    read: impl Fn(&Path) -> Result<String, DocumentError>,
    placeholder: &str,
) -> String {
    match read(path) {
        Ok(text) => {
            info!(document = label, path = %path.display(), chars = text.chars().count(), "persona document loaded");
            text
        }
        Err(e) => {
            warn!(document = label, error = %e, "persona document unavailable, using placeholder");
            placeholder.to_owned()
        }
    }
}

/// Render the persona instruction sent as the first message of every request.
pub fn render_system_prompt(persona: &Persona) -> String {
    let name = &persona.name;
    let mut doc = String::with_capacity(
        1024_usize
            .saturating_add(persona.summary.len())
            .saturating_add(persona.resume.len()),
    );

    doc.push_str("[SYSTEM INSTRUCTION: for the assistant to follow]\n");
    let _ = writeln!(
        doc,
        "You are acting as {name}. You are answering questions on {name}'s website,"
    );
    let _ = writeln!(
        doc,
        "particularly questions related to {name}'s career, background, skills and experience."
    );
    let _ = writeln!(
        doc,
        "Represent {name} faithfully and professionally. If you don't know an answer, \
         suggest the user share more details or provide contact information."
    );
    doc.push_str("If the user asks to get in touch, ask for their email.\n\n");

    doc.push_str("## Summary:\n");
    let _ = writeln!(doc, "{}\n", persona.summary);

    doc.push_str("## LinkedIn Profile:\n");
    let _ = writeln!(doc, "{}", persona.resume);

    doc
}
