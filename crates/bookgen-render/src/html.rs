//! HTML rendering for a finished book.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating, so all
//! generated text is escaped. Rendering is a pure function of the book: the same
//! book renders to the same bytes.

use bookgen_core::{Book, Chapter, Section};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Heading used when the title stage produced nothing.
pub const UNTITLED: &str = "Untitled";

const CSS: &str = "
  body {
\ttext-align: left;
\twidth: 50%;
\tmargin: 0 auto;
  }
";

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit an `<h3>i.j. TITLE</h3>` heading before every section body.
    pub section_titles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            section_titles: true,
        }
    }
}

/// Render a book to a complete HTML document.
pub fn render_book(book: &Book, options: &RenderOptions) -> String {
    let title = book.title().unwrap_or(UNTITLED);

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                title { (title) }
                style { (PreEscaped(CSS)) }
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
            }
            body {
                h1 { (title) }
                @if let Some(author) = book.author() {
                    p { i { "By " (author) } }
                }
                @for (i, chapter) in book.chapters().iter().enumerate() {
                    (render_chapter(i + 1, chapter, options))
                }
            }
        }
    };

    markup.into_string()
}

fn render_chapter(number: usize, chapter: &Chapter, options: &RenderOptions) -> Markup {
    html! {
        h2 { "Chapter " (number) ". " (chapter.title()) }
        @for (j, section) in chapter.sections().iter().enumerate() {
            (render_section(number, j + 1, section, options))
        }
    }
}

fn render_section(
    chapter_number: usize,
    number: usize,
    section: &Section,
    options: &RenderOptions,
) -> Markup {
    html! {
        @if options.section_titles {
            h3 { (chapter_number) "." (number) ". " (section.title()) }
        }
        @if let Some(text) = section.text() {
            (paragraph(text))
        }
    }
}

/// One `<p>` with every newline turned into `<br>`.
fn paragraph(text: &str) -> Markup {
    html! {
        p {
            @for (i, line) in text.split('\n').enumerate() {
                @if i > 0 { br; }
                (line)
            }
        }
    }
}
