//! CLI binary for bookgen: write a book with a text-completion model and render
//! it to a single HTML file.

use anyhow::{Context, Result, bail};
use bookgen_core::config::{BookgenConfig, FailurePolicy};
use bookgen_pipeline::{
    BookProgress, GenerateConfig, GenerationReport, TextGenerator, create_generator, run_pipeline,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Parser)]
#[command(name = "bookgen", about = "Generate a book with an LLM and render it to HTML")]
struct Cli {
    /// Config file (defaults to ./bookgen.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a book and write it as HTML
    Generate(GenerateArgs),

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct GenerateArgs {
    /// What the book is about
    #[arg(long)]
    topic: Option<String>,

    /// Author shown under the title
    #[arg(long)]
    author: Option<String>,

    /// Number of chapters to ask for
    #[arg(long)]
    chapters: Option<usize>,

    /// Completion model name
    #[arg(short, long)]
    model: Option<String>,

    /// API base URL (OpenAI-compatible completions endpoint)
    #[arg(long)]
    base_url: Option<String>,

    /// Output file name (derived from the title if not specified)
    #[arg(short, long)]
    output: Option<String>,

    /// Directory to write the HTML file into
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Omit section headings from the HTML
    #[arg(long)]
    no_section_titles: bool,

    /// Fail the run on a response without generated text
    #[arg(long)]
    abort_on_malformed: bool,

    /// Fail the run when an outline yields no titles
    #[arg(long)]
    abort_on_empty_outline: bool,

    /// Hide progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Generate(args) => cmd_generate(config, &args),
        Commands::Config => cmd_config(&config),
    }
}

fn load_config(cli: &Cli) -> Result<BookgenConfig> {
    match &cli.config {
        Some(path) => BookgenConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            BookgenConfig::load(&cwd).context("failed to load bookgen.toml")
        }
    }
}

/// Apply command-line overrides on top of file and env configuration.
fn apply_overrides(config: &mut BookgenConfig, args: &GenerateArgs) {
    if let Some(topic) = &args.topic {
        config.book.topic.clone_from(topic);
    }
    if let Some(author) = &args.author {
        config.book.author = Some(author.clone());
    }
    if let Some(chapters) = args.chapters {
        config.book.chapters = chapters;
    }
    if let Some(model) = &args.model {
        config.model.name.clone_from(model);
    }
    if let Some(base_url) = &args.base_url {
        config.model.base_url.clone_from(base_url);
    }
    if let Some(output) = &args.output {
        config.output.filename = Some(output.clone());
    }
    if let Some(dir) = &args.out_dir {
        config.output.dir.clone_from(dir);
    }
    if args.no_section_titles {
        config.output.section_titles = false;
    }
    if args.abort_on_malformed {
        config.policy.on_malformed = FailurePolicy::Abort;
    }
    if args.abort_on_empty_outline {
        config.policy.on_empty_outline = FailurePolicy::Abort;
    }
}

/// Read the API key from the environment, or prompt for it without echo.
fn read_api_key() -> Result<String> {
    resolve_api_key(std::env::var(API_KEY_VAR).ok(), || {
        rpassword::prompt_password("Enter OpenAI API key: ")
    })
}

/// A non-blank env value wins; otherwise the prompt is asked once.
fn resolve_api_key(
    env: Option<String>,
    prompt: impl FnOnce() -> std::io::Result<String>,
) -> Result<String> {
    if let Some(key) = env
        && !key.trim().is_empty()
    {
        return Ok(key.trim().to_string());
    }

    let key = prompt().context("failed to read API key")?;
    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("No API key provided. Set {API_KEY_VAR} or enter a key when prompted.");
    }
    Ok(key)
}

/// Run the pipeline, then write the HTML. The file is only written once the
/// whole book has been generated.
fn generate_and_save(
    generator: &dyn TextGenerator,
    config: &BookgenConfig,
    progress: &BookProgress,
) -> Result<(GenerationReport, PathBuf)> {
    let report = run_pipeline(&GenerateConfig {
        generator,
        config,
        progress,
    })
    .context("book generation failed")?;

    let path = bookgen_render::save_book(&report.book, &config.output)
        .context("failed to write HTML output")?;
    Ok((report, path))
}

fn cmd_generate(mut config: BookgenConfig, args: &GenerateArgs) -> Result<()> {
    apply_overrides(&mut config, args);
    config.validate()?;

    let api_key = read_api_key()?;
    let generator = create_generator(
        &config.model.provider,
        &api_key,
        &config.model.name,
        Some(&config.model.base_url),
        config.model.timeout_secs,
    )?;

    let progress = if args.quiet {
        BookProgress::hidden()
    } else {
        BookProgress::new()
    };

    tracing::info!(
        "generating a {}-chapter book with {} ({})",
        config.book.chapters,
        config.model.name,
        generator.provider_name()
    );

    let (report, path) = generate_and_save(generator.as_ref(), &config, &progress)?;

    if !args.quiet {
        eprintln!("{report}");
    }
    println!("{}", path.display());
    Ok(())
}

fn cmd_config(config: &BookgenConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
