//! Prompt builders for the four generation stages.
//!
//! The generator is stateless, so every prompt re-embeds the titles generated
//! so far. Chapter and section numbers in prompts are 1-based.

/// Stage 1: ask for a book title.
pub fn title_prompt(topic: &str) -> String {
    format!(
        "We are writing a book about {topic}. Generate a name for the book. Do not use quotes:\n"
    )
}

/// Stage 2: ask for the chapter titles. The prompt ends in `Chapter 1:` so the
/// first line of the answer is the first title, unlabelled.
pub fn chapters_prompt(topic: &str, chapter_count: usize) -> String {
    format!(
        "We are writing a book about {topic}. We want to generate the titles of the chapters, \
         and nothing more. The book has the following {chapter_count} chapters:\nChapter 1:"
    )
}

/// Stage 3: ask for the section titles of chapter `chapter` (zero-based).
pub fn sections_prompt(topic: &str, chapter_titles: &[&str], chapter: usize) -> String {
    let number = chapter + 1;
    let current = chapter_titles.get(chapter).copied().unwrap_or_default();

    let mut prompt = format!(
        "We are writing a book about {topic}. The book has the following chapter titles:\n"
    );
    prompt.push_str(&numbered_chapters(chapter_titles, "."));
    prompt.push_str(&format!(
        "\nWe want to generate the sections of Chapter {number}. {current}, and nothing more. \
         The chapter has the following sections:\nSection {number}.1:"
    ));
    prompt
}

/// Stop sequence for stage 3, so the model does not echo the first label back.
pub fn sections_stop(chapter: usize) -> String {
    format!("Section {}.1", chapter + 1)
}

/// Stage 4: ask for the body of section `section` of chapter `chapter`
/// (both zero-based).
pub fn text_prompt(
    topic: &str,
    chapter_titles: &[&str],
    chapter: usize,
    section_titles: &[&str],
    section: usize,
) -> String {
    let number = chapter + 1;
    let current = chapter_titles.get(chapter).copied().unwrap_or_default();

    let mut prompt = format!(
        "We are writing a book about {topic}. The book has the following chapter titles:\n"
    );
    prompt.push_str(&numbered_chapters(chapter_titles, ":"));
    prompt.push_str(&format!(
        "\nWe want to generate a section for Chapter {number}: {current}, and nothing more. \
         The chapter has the following sections:\n"
    ));
    prompt.push_str(
        &section_titles
            .iter()
            .enumerate()
            .map(|(k, title)| format!("Section {number}.{}: {title}", k + 1))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    prompt.push_str(&format!(
        "\nWe want to generate the text of Section {number}.{}, and nothing more. \
         Generate several lengthy paragraphs for the aforementioned section of the book. \
         We want the sections to be verbose, and highly descriptive. \
         Do not number the paragraphs, we just want the text itself:\n",
        section + 1
    ));
    prompt
}

/// `Chapter 1<sep> A\nChapter 2<sep> B`.
fn numbered_chapters(chapter_titles: &[&str], separator: &str) -> String {
    chapter_titles
        .iter()
        .enumerate()
        .map(|(k, title)| format!("Chapter {}{separator} {title}", k + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
