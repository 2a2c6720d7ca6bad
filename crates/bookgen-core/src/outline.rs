//! Numbered-list outline parsing.
//!
//! Generated outlines look like `"Intro\nChapter 2: Growth\nChapter 3: Scale"`.
//! Lines are matched against `^<Label>\s+(.*)$`; anything else is dropped. The
//! parse is deliberately lossy so formatting drift in the model output does not
//! fail a run, but a block with no usable line is reported as
//! [`OutlineError::NoMatch`] instead of an empty list.

use regex::Regex;
use std::sync::OnceLock;

/// Which numbered list is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    /// Chapter outline. The first line carries no label because the prompt
    /// already ends in `Chapter 1:`, so it is taken as-is.
    Chapters,
    /// Section outline. Every line must carry the `Section` label.
    Sections,
}

impl OutlineKind {
    /// The label that prefixes each numbered line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Chapters => "Chapter",
            Self::Sections => "Section",
        }
    }

    fn pattern(self) -> &'static Regex {
        static CHAPTER_RE: OnceLock<Regex> = OnceLock::new();
        static SECTION_RE: OnceLock<Regex> = OnceLock::new();

        match self {
            Self::Chapters => {
                CHAPTER_RE.get_or_init(|| Regex::new(r"^Chapter\s+(.*)$").unwrap())
            }
            Self::Sections => {
                SECTION_RE.get_or_init(|| Regex::new(r"^Section\s+(.*)$").unwrap())
            }
        }
    }
}

/// Errors from outline parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutlineError {
    #[error("no '{label}' line found in {lines} line(s) of generated outline")]
    NoMatch { label: &'static str, lines: usize },
}

/// Parse an outline into raw captures: everything after the label, index and
/// separator included (`"2: Growth"`, `"1.1: Start"`).
///
/// For [`OutlineKind::Chapters`] the trimmed first line is returned first,
/// unchanged. Blank entries are dropped.
pub fn parse_outline_raw(text: &str, kind: OutlineKind) -> Result<Vec<String>, OutlineError> {
    let pattern = kind.pattern();
    let mut lines = text.lines();
    let mut captures = Vec::new();

    if kind == OutlineKind::Chapters
        && let Some(first) = lines.next()
    {
        let first = first.trim();
        if !first.is_empty() {
            captures.push(first.to_string());
        }
    }

    for line in lines {
        if let Some(rest) = pattern.captures(line.trim()).and_then(|c| c.get(1)) {
            let rest = rest.as_str().trim();
            if !rest.is_empty() {
                captures.push(rest.to_string());
            }
        }
    }

    if captures.is_empty() {
        return Err(OutlineError::NoMatch {
            label: kind.label(),
            lines: text.lines().count(),
        });
    }

    Ok(captures)
}

/// Parse an outline into titles, with the numeric index and its separator
/// removed from every labelled line.
pub fn parse_outline(text: &str, kind: OutlineKind) -> Result<Vec<String>, OutlineError> {
    let raw = parse_outline_raw(text, kind)?;
    let skip = usize::from(kind == OutlineKind::Chapters && !first_line_is_blank(text));

    let titles: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, capture)| {
            if i < skip {
                capture
            } else {
                strip_index(&capture).to_string()
            }
        })
        .filter(|t| !t.is_empty())
        .collect();

    if titles.is_empty() {
        return Err(OutlineError::NoMatch {
            label: kind.label(),
            lines: text.lines().count(),
        });
    }

    Ok(titles)
}

/// Remove a leading numeric index (`2`, `1.1`, `3.`) and the separator that
/// follows it (`:`, `.`, `)`, `-`).
///
/// `"2: Growth"` → `"Growth"`, `"1.1 - Start"` → `"Start"`. Text without a
/// leading index only loses leading separators and whitespace.
pub fn strip_index(capture: &str) -> &str {
    static INDEX_RE: OnceLock<Regex> = OnceLock::new();
    let index_re =
        INDEX_RE.get_or_init(|| Regex::new(r"^(?:\d[\d.]*)?\s*[:.)\-]*\s*").unwrap());

    match index_re.find(capture) {
        Some(m) => capture[m.end()..].trim_end(),
        None => capture.trim(),
    }
}

fn first_line_is_blank(text: &str) -> bool {
    text.lines().next().is_none_or(|l| l.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_first_line_taken_as_is() {
        let titles = parse_outline(" Getting Started\nChapter 2: Growth", OutlineKind::Chapters)
            .unwrap();
        assert_eq!(titles, vec!["Getting Started", "Growth"]);
    }

    #[test]
    fn test_chapter_first_line_keeps_digits() {
        // The unlabelled first line is never index-stripped.
        let titles = parse_outline("2025 in Review", OutlineKind::Chapters).unwrap();
        assert_eq!(titles, vec!["2025 in Review"]);
    }

    #[test]
    fn test_unmatched_lines_dropped() {
        let titles = parse_outline("foo\nChapter 2: X\nbar\nChapter 3: Y", OutlineKind::Chapters)
            .unwrap();
        assert_eq!(titles, vec!["foo", "X", "Y"]);
    }

    #[test]
    fn test_section_first_line_needs_label() {
        let titles = parse_outline(
            "Overview\nSection 1.2: Details\nSection 1.3. Wrap-up",
            OutlineKind::Sections,
        )
        .unwrap();
        assert_eq!(titles, vec!["Details", "Wrap-up"]);
    }

    #[test]
    fn test_raw_capture_keeps_index() {
        let raw = parse_outline_raw("Section 1.1: Start\nSection 1.2: Next", OutlineKind::Sections)
            .unwrap();
        assert_eq!(raw, vec!["1.1: Start", "1.2: Next"]);
    }

    #[test]
    fn test_no_match_is_an_error() {
        let err = parse_outline("just prose\nwith no list", OutlineKind::Sections).unwrap_err();
        assert_eq!(
            err,
            OutlineError::NoMatch {
                label: "Section",
                lines: 2
            }
        );
    }

    #[test]
    fn test_blank_chapter_output_is_no_match() {
        assert!(parse_outline("", OutlineKind::Chapters).is_err());
        assert!(parse_outline("   \n\n", OutlineKind::Chapters).is_err());
    }

    #[test]
    fn test_blank_first_line_then_labelled_lines() {
        let titles = parse_outline("\nChapter 2: Growth", OutlineKind::Chapters).unwrap();
        assert_eq!(titles, vec!["Growth"]);
    }

    #[test]
    fn test_label_must_start_line() {
        let titles = parse_outline(
            "Intro\nSee Chapter 4 for details\nChapter 2: Growth",
            OutlineKind::Chapters,
        )
        .unwrap();
        assert_eq!(titles, vec!["Intro", "Growth"]);
    }

    #[test]
    fn test_label_without_title_dropped() {
        let titles =
            parse_outline("Section 1.1: Start\nSection 1.2:", OutlineKind::Sections).unwrap();
        assert_eq!(titles, vec!["Start"]);
    }

    #[test]
    fn test_strip_index_variants() {
        assert_eq!(strip_index("2: Growth"), "Growth");
        assert_eq!(strip_index("1.1: Start"), "Start");
        assert_eq!(strip_index("3. The 3.5 Percent Rule"), "The 3.5 Percent Rule");
        assert_eq!(strip_index("4) Scale"), "Scale");
        assert_eq!(strip_index("1.1 - Start"), "Start");
        assert_eq!(strip_index("Two: Words"), "Two: Words");
        assert_eq!(strip_index(": Dangling"), "Dangling");
    }
}
