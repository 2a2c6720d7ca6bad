//! Integration tests for bookgen-cli functionality.
//! Tests the underlying library functions that the CLI commands invoke.

use bookgen_core::config::{BookgenConfig, CONFIG_FILE, FailurePolicy};
use bookgen_pipeline::{
    BookProgress, GenerateConfig, Generation, GenerationRequest, ProviderError, TextGenerator,
    run_pipeline,
};

/// Answers every prompt with a fixed text per stage.
struct FixedGenerator {
    fail_text: bool,
}

impl TextGenerator for FixedGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Generation, ProviderError> {
        let prompt = &request.prompt;
        if prompt.contains("Generate a name for the book") {
            Ok(Generation::text("ERP: A Guide"))
        } else if prompt.contains("titles of the chapters") {
            Ok(Generation::text(" Foundations\nChapter 2: Data\nChapter 3: Sales"))
        } else if prompt.contains("generate the sections of Chapter") {
            Ok(Generation::text("Section 1.1: Overview"))
        } else if self.fail_text {
            Err(ProviderError::Http("timed out".to_string()))
        } else {
            Ok(Generation::text("First paragraph.\nSecond paragraph."))
        }
    }

    fn provider_name(&self) -> &str {
        "fixed"
    }
}

#[test]
fn test_config_file_in_directory() {
    let tmpdir = tempfile::tempdir().unwrap();
    std::fs::write(
        tmpdir.path().join(CONFIG_FILE),
        r#"
[book]
topic = "ERP"
chapters = 3

[policy]
on_empty_outline = "abort"
"#,
    )
    .unwrap();

    let config = BookgenConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.book.chapters, 3);
    assert_eq!(config.policy.on_empty_outline, FailurePolicy::Abort);
    config.validate().unwrap();
}

#[test]
fn test_config_defaults_without_file() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = BookgenConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.stages.text.max_tokens, 512);
    assert!(config.output.section_titles);
}

#[test]
fn test_printed_config_is_loadable() {
    let tmpdir = tempfile::tempdir().unwrap();
    let path = tmpdir.path().join("printed.toml");
    std::fs::write(&path, BookgenConfig::default().to_toml().unwrap()).unwrap();

    let loaded = BookgenConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.stages, BookgenConfig::default().stages);
}

#[test]
fn test_generate_and_write_html() {
    let tmpdir = tempfile::tempdir().unwrap();
    let mut config = BookgenConfig::default();
    config.book.author = Some("William Oakes".to_string());
    config.output.dir = tmpdir.path().to_path_buf();

    let progress = BookProgress::hidden();
    let report = run_pipeline(&GenerateConfig {
        generator: &FixedGenerator { fail_text: false },
        config: &config,
        progress: &progress,
    })
    .unwrap();

    let path = bookgen_render::save_book(&report.book, &config.output).unwrap();
    assert_eq!(path, tmpdir.path().join("erp__a_guide.html"));

    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("<title>ERP: A Guide</title>"));
    assert!(html.contains("<p><i>By William Oakes</i></p>"));
    assert!(html.contains("<h2>Chapter 1. Foundations</h2>"));
    assert!(html.contains("<h2>Chapter 3. Sales</h2>"));
    assert!(html.contains("<h3>3.1. Overview</h3>"));
    assert_eq!(
        html.matches("<p>First paragraph.<br>Second paragraph.</p>").count(),
        3
    );
}

#[test]
fn test_transport_failure_aborts_run() {
    let tmpdir = tempfile::tempdir().unwrap();
    let mut config = BookgenConfig::default();
    config.output.dir = tmpdir.path().to_path_buf();

    let progress = BookProgress::hidden();
    let result = run_pipeline(&GenerateConfig {
        generator: &FixedGenerator { fail_text: true },
        config: &config,
        progress: &progress,
    });

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("text of section 1.1"), "{err}");
}
