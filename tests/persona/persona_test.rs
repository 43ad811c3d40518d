//! Persona document loading and system prompt rendering.

use std::fs;
use std::path::PathBuf;

use persona_relay::config::PersonaConfig;
use persona_relay::persona::{
    read_resume_pdf, read_summary, render_system_prompt, DocumentError, Persona,
    RESUME_PLACEHOLDER, SUMMARY_PLACEHOLDER,
};

fn persona_config(dir: PathBuf) -> PersonaConfig {
    PersonaConfig {
        name: "Ada Lovelace".to_owned(),
        dir,
        ..PersonaConfig::default()
    }
}

fn sample_persona() -> Persona {
    Persona {
        name: "Ada Lovelace".to_owned(),
        summary: "Mathematician and writer.".to_owned(),
        resume: "Analytical Engine notes, 1843.".to_owned(),
    }
}

#[test]
fn missing_documents_fall_back_to_placeholders() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let persona = Persona::load(&persona_config(tmp.path().join("absent")));

    assert_eq!(persona.name, "Ada Lovelace");
    assert_eq!(persona.summary, SUMMARY_PLACEHOLDER);
    assert_eq!(persona.resume, RESUME_PLACEHOLDER);
}

#[test]
fn summary_is_loaded_verbatim() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    fs::write(tmp.path().join("summary.txt"), "Line one.\nLine two.\n").expect("write summary");

    let persona = Persona::load(&persona_config(tmp.path().to_path_buf()));
    assert_eq!(persona.summary, "Line one.\nLine two.\n");
    assert_eq!(persona.resume, RESUME_PLACEHOLDER);
}

#[test]
fn unparseable_pdf_falls_back_to_placeholder() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let resume = tmp.path().join("resume.pdf");
    fs::write(&resume, b"definitely not a pdf").expect("write resume");

    assert!(matches!(
        read_resume_pdf(&resume),
        Err(DocumentError::Pdf { .. })
    ));

    let persona = Persona::load(&persona_config(tmp.path().to_path_buf()));
    assert_eq!(persona.resume, RESUME_PLACEHOLDER);
}

#[test]
fn readers_report_not_found() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let missing = tmp.path().join("nope.txt");

    assert!(matches!(
        read_summary(&missing),
        Err(DocumentError::NotFound(path)) if path == missing
    ));
    assert!(matches!(
        read_resume_pdf(&tmp.path().join("nope.pdf")),
        Err(DocumentError::NotFound(_))
    ));
}

#[test]
fn reading_a_directory_is_an_io_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let err = read_summary(tmp.path());
    assert!(err.is_err());
    assert!(!matches!(err, Err(DocumentError::NotFound(_))));
}

#[test]
fn custom_file_names_are_respected() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    fs::write(tmp.path().join("about.md"), "About me.").expect("write summary");

    let config = PersonaConfig {
        summary_file: "about.md".to_owned(),
        ..persona_config(tmp.path().to_path_buf())
    };
    assert_eq!(Persona::load(&config).summary, "About me.");
}

#[test]
fn system_prompt_names_the_persona_and_embeds_documents() {
    let prompt = render_system_prompt(&sample_persona());

    assert!(prompt.starts_with("[SYSTEM INSTRUCTION"));
    assert!(prompt.contains("You are acting as Ada Lovelace."));
    assert!(prompt.contains("Ada Lovelace's career, background, skills and experience"));
    assert!(prompt.contains("If the user asks to get in touch, ask for their email."));
    assert!(prompt.contains("## Summary:\nMathematician and writer."));
    assert!(prompt.contains("## LinkedIn Profile:\nAnalytical Engine notes, 1843."));
}

#[test]
fn summary_section_precedes_profile_section() {
    let prompt = sample_persona().system_prompt();
    let summary_at = prompt.find("## Summary:").expect("summary heading");
    let profile_at = prompt.find("## LinkedIn Profile:").expect("profile heading");
    assert!(summary_at < profile_at);
}

#[test]
fn placeholder_persona_still_renders() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let prompt = Persona::load(&persona_config(tmp.path().to_path_buf())).system_prompt();
    assert!(prompt.contains(SUMMARY_PLACEHOLDER));
    assert!(prompt.contains(RESUME_PLACEHOLDER));
}
