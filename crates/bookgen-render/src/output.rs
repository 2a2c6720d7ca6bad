//! Output file naming and writing.

use crate::html::{RenderOptions, render_book};
use bookgen_core::Book;
use bookgen_core::config::OutputConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors from writing the rendered book.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Derive the output file name.
///
/// An explicit name wins; otherwise the title is lower-cased with spaces turned
/// into `-` and `.html` appended. Then every `:` and `-` becomes `_`, which also
/// rewrites the hyphens the slug just inserted: `"ERP: A Guide"` →
/// `"erp:-a-guide.html"` → `"erp__a_guide.html"`. Path separators are replaced
/// too, so the file always lands directly in the output directory.
pub fn output_filename(title: Option<&str>, explicit: Option<&str>) -> String {
    let name = match explicit {
        Some(name) => name.to_string(),
        None => {
            let title = title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("untitled");
            format!("{}.html", title.to_lowercase().replace(' ', "-"))
        }
    };

    name.replace([':', '-'], "_").replace(['/', '\\'], "_")
}

/// Render `book` and write it into `config.dir`, overwriting any existing file.
/// Returns the path written.
pub fn save_book(book: &Book, config: &OutputConfig) -> Result<PathBuf, RenderError> {
    let options = RenderOptions {
        section_titles: config.section_titles,
    };
    let html = render_book(book, &options);
    let path = config
        .dir
        .join(output_filename(book.title(), config.filename.as_deref()));

    write_html(&config.dir, &path, &html)?;
    tracing::info!(
        "wrote {} ({} chapters, {} sections)",
        path.display(),
        book.chapters().len(),
        book.section_count()
    );

    Ok(path)
}

fn write_html(dir: &Path, path: &Path, html: &str) -> Result<(), RenderError> {
    fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(path, html).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}
