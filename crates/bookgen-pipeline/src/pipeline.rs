//! Book generation pipeline — fire-and-forget prompt chaining.
//!
//! Runs four stages strictly in order: title → chapter outline → section
//! outlines (one call per chapter) → section text (one call per section). Each
//! prompt re-embeds what earlier stages produced, and the document only grows.
//! Transport and API failures abort the run; malformed responses and empty
//! outlines follow the configured [`FailurePolicy`].

use crate::progress::BookProgress;
use crate::prompts;
use crate::provider::{GenerationOptions, GenerationRequest, ProviderError, TextGenerator};
use crate::usage::UsageTracker;
use bookgen_core::config::{BookgenConfig, FailurePolicy, StageParams};
use bookgen_core::outline::{OutlineError, OutlineKind, parse_outline};
use bookgen_core::{Book, BookError, Chapter, Section};
use std::fmt;

/// Configuration for one generation run.
pub struct GenerateConfig<'a> {
    pub generator: &'a dyn TextGenerator,
    pub config: &'a BookgenConfig,
    pub progress: &'a BookProgress,
}

/// Which call of the pipeline something happened in. Indices are zero-based;
/// `Display` shows 1-based numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Title,
    Chapters,
    Sections { chapter: usize },
    Text { chapter: usize, section: usize },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Chapters => write!(f, "chapter outline"),
            Self::Sections { chapter } => write!(f, "sections of chapter {}", chapter + 1),
            Self::Text { chapter, section } => {
                write!(f, "text of section {}.{}", chapter + 1, section + 1)
            }
        }
    }
}

/// Result of a completed generation run.
#[derive(Debug)]
pub struct GenerationReport {
    pub book: Book,
    pub calls: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost_usd: f64,
    /// Malformed responses and empty outlines that were tolerated.
    pub warnings: Vec<String>,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generation Summary:")?;
        writeln!(f, "  Title: {}", self.book.title().unwrap_or("(none)"))?;
        writeln!(
            f,
            "  Chapters: {} ({} sections)",
            self.book.chapters().len(),
            self.book.section_count()
        )?;
        if !self.book.is_complete() {
            writeln!(
                f,
                "  Sections without text: {}",
                self.book.sections_without_text()
            )?;
        }
        writeln!(f, "  Calls: {}", self.calls)?;
        writeln!(
            f,
            "  Tokens: {} prompt, {} completion",
            self.prompt_tokens, self.completion_tokens
        )?;
        write!(f, "  Estimated cost: ${:.4}", self.cost_usd)?;
        for warning in &self.warnings {
            write!(f, "\n  WARNING: {}", warning)?;
        }
        Ok(())
    }
}

/// Errors from the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage}: {source}")]
    Provider {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
    #[error("{stage}: malformed response: {raw}")]
    Malformed { stage: Stage, raw: String },
    #[error("{stage}: {source}")]
    EmptyOutline {
        stage: Stage,
        #[source]
        source: OutlineError,
    },
    #[error("document error: {0}")]
    Document(#[from] BookError),
}

/// Run the full generation pipeline and return the finished book.
///
/// Nothing is written to disk here; rendering happens only once this returns
/// `Ok`, so an aborted run leaves no output file behind.
pub fn run_pipeline(config: &GenerateConfig<'_>) -> Result<GenerationReport, PipelineError> {
    let mut run = Run {
        generator: config.generator,
        config: config.config,
        progress: config.progress,
        tracker: UsageTracker::new(config.generator),
        warnings: Vec::new(),
    };

    let result = run.execute();
    config.progress.finish();
    let book = result?;

    tracing::info!(
        "generated {} chapters, {} sections in {} calls",
        book.chapters().len(),
        book.section_count(),
        run.tracker.calls
    );

    Ok(GenerationReport {
        book,
        calls: run.tracker.calls,
        prompt_tokens: run.tracker.prompt_tokens,
        completion_tokens: run.tracker.completion_tokens,
        cost_usd: run.tracker.total_cost_usd(),
        warnings: run.warnings,
    })
}

struct Run<'a> {
    generator: &'a dyn TextGenerator,
    config: &'a BookgenConfig,
    progress: &'a BookProgress,
    tracker: UsageTracker,
    warnings: Vec<String>,
}

impl<'a> Run<'a> {
    fn execute(&mut self) -> Result<Book, PipelineError> {
        let mut book = self.title_stage()?;
        self.chapter_stage(&mut book)?;
        self.section_stage(&mut book)?;
        self.text_stage(&mut book)?;
        Ok(book)
    }

    fn topic(&self) -> &'a str {
        &self.config.book.topic
    }

    fn progress(&self) -> &'a BookProgress {
        self.progress
    }

    fn settings(&self) -> &'a BookgenConfig {
        self.config
    }

    // -----------------------------------------------------------------------
    // Stage 1: Title
    // -----------------------------------------------------------------------

    fn title_stage(&mut self) -> Result<Book, PipelineError> {
        let stages = &self.settings().stages;
        self.progress().start_stage("Title", 1);

        let prompt = prompts::title_prompt(self.topic());
        let title = self
            .call(Stage::Title, prompt, &stages.title, None)?
            .map(|t| t.trim().to_string());

        self.progress().tick_stage();
        if let Some(title) = &title {
            self.progress().line(title);
        }
        tracing::info!("title stage done: {:?}", title);

        Ok(Book::new(title, self.config.book.author.clone()))
    }

    // -----------------------------------------------------------------------
    // Stage 2: Chapter outline
    // -----------------------------------------------------------------------

    fn chapter_stage(&mut self, book: &mut Book) -> Result<(), PipelineError> {
        let stages = &self.settings().stages;
        self.progress().start_stage("Chapters", 1);

        let prompt = prompts::chapters_prompt(self.topic(), self.config.book.chapters);
        let titles = match self.call(Stage::Chapters, prompt, &stages.chapters, None)? {
            Some(text) => self.outline(Stage::Chapters, &text, OutlineKind::Chapters)?,
            None => Vec::new(),
        };

        book.assign_chapters(titles.into_iter().map(Chapter::new).collect())?;

        self.progress().tick_stage();
        for chapter in book.chapters() {
            self.progress().line(chapter.title());
        }
        tracing::info!("chapter stage done: {} chapters", book.chapters().len());

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stage 3: Section outlines
    // -----------------------------------------------------------------------

    fn section_stage(&mut self, book: &mut Book) -> Result<(), PipelineError> {
        let stages = &self.settings().stages;
        let chapter_count = book.chapters().len();
        self.progress().start_stage("Sections", chapter_count as u64);

        for i in 0..chapter_count {
            let stage = Stage::Sections { chapter: i };
            let prompt = prompts::sections_prompt(self.topic(), &book.chapter_titles(), i);
            let stop = prompts::sections_stop(i);

            let titles = match self.call(stage, prompt, &stages.sections, Some(stop))? {
                Some(text) => self.outline(stage, text.trim(), OutlineKind::Sections)?,
                None => Vec::new(),
            };

            let Some(chapter) = book.chapter_mut(i) else {
                continue;
            };
            chapter.assign_sections(titles.into_iter().map(Section::new).collect())?;

            self.progress()
                .line(&format!("Chapter {}. {}", i + 1, chapter.title()));
            for (j, section) in chapter.sections().iter().enumerate() {
                self.progress()
                    .line(&format!("Section {}.{}. {}", i + 1, j + 1, section.title()));
            }
            self.progress().line("");
            self.progress().tick_stage();
        }

        tracing::info!("section stage done: {} sections", book.section_count());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stage 4: Section text
    // -----------------------------------------------------------------------

    fn text_stage(&mut self, book: &mut Book) -> Result<(), PipelineError> {
        let stages = &self.settings().stages;
        self.progress()
            .start_stage("Text", book.section_count() as u64);

        for i in 0..book.chapters().len() {
            self.progress()
                .line(&format!("Generating text for Chapter {}", i + 1));
            let section_count = book.chapters()[i].sections().len();

            for j in 0..section_count {
                self.progress()
                    .line(&format!("Generating text for Section {}.{}", i + 1, j + 1));
                self.progress()
                    .set_stage_message(&format!("section {}.{}", i + 1, j + 1));

                let prompt = prompts::text_prompt(
                    self.topic(),
                    &book.chapter_titles(),
                    i,
                    &book.chapters()[i].section_titles(),
                    j,
                );
                let stage = Stage::Text {
                    chapter: i,
                    section: j,
                };

                if let Some(text) = self.call(stage, prompt, &stages.text, None)?
                    && let Some(section) = book.chapter_mut(i).and_then(|c| c.section_mut(j))
                {
                    section.fill_text(text.trim())?;
                }
                self.progress().tick_stage();
            }
        }

        tracing::info!("text stage done");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Generation and parsing with failure policy
    // -----------------------------------------------------------------------

    /// Make one generation call.
    ///
    /// Returns `Ok(None)` when the response was malformed and the policy says
    /// to continue with an undefined value.
    fn call(
        &mut self,
        stage: Stage,
        prompt: String,
        params: &StageParams,
        stop: Option<String>,
    ) -> Result<Option<String>, PipelineError> {
        let request = GenerationRequest {
            model: self.config.model.name.clone(),
            prompt,
            options: GenerationOptions {
                max_tokens: Some(params.max_tokens),
                temperature: params.temperature,
                stop,
            },
        };
        tracing::debug!(
            "{}: requesting {} tokens for a {}-byte prompt",
            stage,
            params.max_tokens,
            request.prompt.len()
        );

        let result = self.generator.generate(&request);
        let outcome = match result {
            Ok(generation) => {
                self.tracker.record(&generation);
                Ok(Some(generation.text))
            }
            Err(ProviderError::MalformedResponse { raw }) => {
                self.tracker.record_failed();
                tracing::warn!("{}: malformed response: {}", stage, raw);
                match self.config.policy.on_malformed {
                    FailurePolicy::Abort => Err(PipelineError::Malformed { stage, raw }),
                    FailurePolicy::Continue => {
                        self.warnings
                            .push(format!("{stage}: malformed response: {raw}"));
                        Ok(None)
                    }
                }
            }
            Err(source) => Err(PipelineError::Provider { stage, source }),
        };

        self.progress().update_usage(
            self.tracker.calls,
            self.tracker.prompt_tokens + self.tracker.completion_tokens,
            self.tracker.total_cost_usd(),
        );
        outcome
    }

    /// Parse an outline, applying the empty-outline policy to a parse miss.
    fn outline(
        &mut self,
        stage: Stage,
        text: &str,
        kind: OutlineKind,
    ) -> Result<Vec<String>, PipelineError> {
        match parse_outline(text, kind) {
            Ok(titles) => Ok(titles),
            Err(source) => {
                tracing::warn!("{}: {}", stage, source);
                match self.config.policy.on_empty_outline {
                    FailurePolicy::Abort => Err(PipelineError::EmptyOutline { stage, source }),
                    FailurePolicy::Continue => {
                        self.warnings.push(format!("{stage}: {source}"));
                        Ok(Vec::new())
                    }
                }
            }
        }
    }
}
