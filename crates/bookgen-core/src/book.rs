//! Document model: a book made of chapters made of sections.
//!
//! The structure only grows. Chapters are assigned once, each chapter's sections
//! are assigned once, and each section's text is filled at most once.

/// Errors raised when a mutation would break the grow-only structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    #[error("chapters already assigned ({0} present)")]
    ChaptersAlreadyAssigned(usize),
    #[error("sections of chapter '{chapter}' already assigned ({count} present)")]
    SectionsAlreadyAssigned { chapter: String, count: usize },
    #[error("text of section '{0}' already set")]
    TextAlreadySet(String),
}

/// A generated book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    title: Option<String>,
    author: Option<String>,
    chapters: Vec<Chapter>,
}

/// A chapter; its position in [`Book::chapters`] is the chapter number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    title: String,
    sections: Vec<Section>,
}

/// A section; its position in [`Chapter::sections`] is the section number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    title: String,
    text: Option<String>,
}

impl Book {
    /// Create a book with no chapters.
    ///
    /// `title` is `None` only when the title could not be generated.
    pub fn new(title: Option<String>, author: Option<String>) -> Self {
        Self {
            title,
            author,
            chapters: Vec::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Assign the chapter list. Allowed only while the book has no chapters.
    pub fn assign_chapters(&mut self, chapters: Vec<Chapter>) -> Result<(), BookError> {
        if !self.chapters.is_empty() {
            return Err(BookError::ChaptersAlreadyAssigned(self.chapters.len()));
        }
        self.chapters = chapters;
        Ok(())
    }

    /// Mutable access to one chapter by zero-based index.
    pub fn chapter_mut(&mut self, index: usize) -> Option<&mut Chapter> {
        self.chapters.get_mut(index)
    }

    /// Total number of sections across all chapters.
    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }

    /// True when every section has text.
    pub fn is_complete(&self) -> bool {
        self.sections_without_text() == 0
    }

    /// Sections whose text was never filled in.
    pub fn sections_without_text(&self) -> usize {
        self.chapters
            .iter()
            .flat_map(|c| c.sections.iter())
            .filter(|s| s.text.is_none())
            .count()
    }

    /// Chapter titles in order, for embedding into prompts.
    pub fn chapter_titles(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.title.as_str()).collect()
    }
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Assign the section list. Allowed only while the chapter has no sections.
    pub fn assign_sections(&mut self, sections: Vec<Section>) -> Result<(), BookError> {
        if !self.sections.is_empty() {
            return Err(BookError::SectionsAlreadyAssigned {
                chapter: self.title.clone(),
                count: self.sections.len(),
            });
        }
        self.sections = sections;
        Ok(())
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// Section titles in order, for embedding into prompts.
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Set the body text. A section's text can be set only once.
    pub fn fill_text(&mut self, text: impl Into<String>) -> Result<(), BookError> {
        if self.text.is_some() {
            return Err(BookError::TextAlreadySet(self.title.clone()));
        }
        self.text = Some(text.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_chapter_book() -> Book {
        let mut book = Book::new(Some("My Book".to_string()), None);
        book.assign_chapters(vec![Chapter::new("Intro"), Chapter::new("Growth")])
            .unwrap();
        book
    }

    #[test]
    fn test_new_book_is_empty() {
        let book = Book::new(Some("T".to_string()), Some("A".to_string()));
        assert_eq!(book.title(), Some("T"));
        assert_eq!(book.author(), Some("A"));
        assert!(book.chapters().is_empty());
        assert_eq!(book.section_count(), 0);
        assert!(book.is_complete());
    }

    #[test]
    fn test_chapters_assigned_once() {
        let mut book = two_chapter_book();
        let err = book
            .assign_chapters(vec![Chapter::new("Other")])
            .unwrap_err();
        assert_eq!(err, BookError::ChaptersAlreadyAssigned(2));
        assert_eq!(book.chapter_titles(), vec!["Intro", "Growth"]);
    }

    #[test]
    fn test_empty_assignment_can_be_retried() {
        let mut book = Book::new(None, None);
        book.assign_chapters(Vec::new()).unwrap();
        book.assign_chapters(vec![Chapter::new("Late")]).unwrap();
        assert_eq!(book.chapters().len(), 1);
    }

    #[test]
    fn test_sections_assigned_once() {
        let mut book = two_chapter_book();
        let chapter = book.chapter_mut(0).unwrap();
        chapter
            .assign_sections(vec![Section::new("Start"), Section::new("Middle")])
            .unwrap();
        let err = chapter.assign_sections(vec![Section::new("End")]).unwrap_err();
        assert!(matches!(
            err,
            BookError::SectionsAlreadyAssigned { count: 2, .. }
        ));
        assert_eq!(book.section_count(), 2);
        assert_eq!(book.sections_without_text(), 2);
        assert!(!book.is_complete());
    }

    #[test]
    fn test_text_filled_once() {
        let mut section = Section::new("Start");
        assert_eq!(section.text(), None);
        section.fill_text("Hello world.").unwrap();
        assert_eq!(section.text(), Some("Hello world."));
        assert_eq!(
            section.fill_text("Again"),
            Err(BookError::TextAlreadySet("Start".to_string()))
        );
        assert_eq!(section.text(), Some("Hello world."));
    }

    #[test]
    fn test_titles_stored_verbatim() {
        let chapter = Chapter::new("  padded: title ");
        assert_eq!(chapter.title(), "  padded: title ");
    }
}
