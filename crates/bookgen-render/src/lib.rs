//! Static HTML rendering for generated books.
//!
//! - **html**: pure rendering of a [`bookgen_core::Book`] into one HTML page
//! - **output**: output file naming and writing

pub mod html;
pub mod output;

pub use html::{RenderOptions, render_book};
pub use output::{RenderError, output_filename, save_book};
