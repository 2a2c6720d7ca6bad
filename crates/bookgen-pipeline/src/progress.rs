//! Terminal progress display for book generation.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;

/// Manages progress bars for the generation pipeline.
///
/// Progress lines (chapter and section identifiers) are printed through
/// [`BookProgress::line`] so they interleave cleanly with the bars.
pub struct BookProgress {
    multi: Arc<MultiProgress>,
    stage_bar: ProgressBar,
    usage_bar: ProgressBar,
    quiet: bool,
}

impl Default for BookProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BookProgress {
    pub fn new() -> Self {
        Self::with_target(MultiProgress::new(), false)
    }

    /// A display that draws nothing and prints nothing. Used by tests and
    /// `--quiet`.
    pub fn hidden() -> Self {
        Self::with_target(
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            true,
        )
    }

    fn with_target(multi: MultiProgress, quiet: bool) -> Self {
        let multi = Arc::new(multi);

        let stage_bar = multi.add(ProgressBar::new(0));
        stage_bar.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("##-"),
        );

        let usage_bar = multi.add(ProgressBar::new_spinner());
        usage_bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .expect("valid template"),
        );

        Self {
            multi,
            stage_bar,
            usage_bar,
            quiet,
        }
    }

    /// Start a new stage with a given name and total count.
    pub fn start_stage(&self, name: &str, total: u64) {
        self.stage_bar.set_prefix(name.to_string());
        self.stage_bar.set_length(total);
        self.stage_bar.set_position(0);
        self.stage_bar.set_message("");
    }

    /// Increment the stage progress by 1.
    pub fn tick_stage(&self) {
        self.stage_bar.inc(1);
    }

    /// Set a message on the stage bar.
    pub fn set_stage_message(&self, msg: &str) {
        self.stage_bar.set_message(msg.to_string());
    }

    /// Update the token usage display.
    pub fn update_usage(&self, calls: usize, tokens: u64, spent: f64) {
        self.usage_bar.set_message(format!(
            "{} calls, {} tokens, ${:.4} spent",
            calls, tokens, spent
        ));
        self.usage_bar.tick();
    }

    /// Print one progress line above the bars.
    pub fn line(&self, text: &str) {
        if self.quiet {
            return;
        }
        self.multi.suspend(|| eprintln!("{text}"));
    }

    /// Finish all bars.
    pub fn finish(&self) {
        self.stage_bar.finish_and_clear();
        self.usage_bar.finish_and_clear();
    }
}
