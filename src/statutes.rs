//! Parsing of flat statute text into labelled sections.
//!
//! The input format is a plain text file where every section starts with a
//! header line of the form `Section 302: Punishment for murder` followed by
//! one or more lines of body text:
//!
//! ```text
//! Section 378: Theft
//! Whoever, intending to take dishonestly any movable property
//! out of the possession of any person without that person's consent...
//! Section 379: Punishment for theft
//! Whoever commits theft shall be punished...
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One parsed statute section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteSection {
    /// Section number as written in the source (e.g. "302").
    pub number: String,
    /// Trimmed heading.
    pub title: String,
    /// Trimmed body, line breaks preserved.
    pub body: String,
}

impl StatuteSection {
    /// Stable document id, e.g. `ipc_302` for prefix `ipc`.
    pub fn id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.number)
    }

    /// Single-line text that gets embedded and returned as context.
    pub fn document(&self) -> String {
        format!(
            "Section {}: {}. {}",
            self.number,
            self.title,
            self.body.replace('\n', " ")
        )
    }
}

/// Splits statute text into sections.
pub struct SectionParser {
    header: Regex,
}

impl SectionParser {
    pub fn new() -> Self {
        let header = Regex::new(r"Section (\d+): ").expect("Invalid regex");
        Self { header }
    }

    /// Parse every section in `text`.
    ///
    /// A section is a `Section <n>: ` header, a title of at least one
    /// character up to the next newline, and a body of at least one
    /// character that runs until the next `"\nSection"` or the end of the
    /// text. Text before the first header is ignored.
    pub fn parse(&self, text: &str) -> Vec<StatuteSection> {
        let mut sections = Vec::new();
        let mut pos = 0;

        while let Some(caps) = self.header.captures_at(text, pos) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            let title_start = whole.end();
            let Some(title_end) = find_after_first_char(text, title_start, "\n") else {
                break;
            };

            let body_start = title_end + 1;
            let body_end = find_after_first_char(text, body_start, "\nSection");
            let body_end = match body_end {
                Some(end) => end,
                None if body_start < text.len() => text.len(),
                None => break,
            };

            sections.push(StatuteSection {
                number: number.as_str().trim().to_string(),
                title: text[title_start..title_end].trim().to_string(),
                body: text[body_start..body_end].trim().to_string(),
            });

            pos = body_end;
        }

        sections
    }
}

impl Default for SectionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse sections with a default parser.
pub fn parse_sections(text: &str) -> Vec<StatuteSection> {
    SectionParser::new().parse(text)
}

/// Find `needle` in `text`, skipping the first character after `start`.
///
/// Returns `None` when there is no character at `start` or no match after it.
fn find_after_first_char(text: &str, start: usize, needle: &str) -> Option<usize> {
    let first = text.get(start..)?.chars().next()?;
    let from = start + first.len_utf8();
    text[from..].find(needle).map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Indian Penal Code, 1860\n\
Section 378: Theft\n\
Whoever, intending to take dishonestly any movable property\n\
out of the possession of any person without that person's consent, commits theft.\n\
Section 379: Punishment for theft \n\
Whoever commits theft shall be punished with imprisonment.\n";

    #[test]
    fn test_parse_sections() {
        let sections = parse_sections(SAMPLE);
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].number, "378");
        assert_eq!(sections[0].title, "Theft");
        assert_eq!(
            sections[0].body,
            "Whoever, intending to take dishonestly any movable property\nout of the possession of any person without that person's consent, commits theft."
        );
        assert_eq!(sections[1].title, "Punishment for theft");
        assert_eq!(
            sections[1].body,
            "Whoever commits theft shall be punished with imprisonment."
        );
    }

    #[test]
    fn test_document_and_id() {
        let sections = parse_sections(SAMPLE);
        assert_eq!(sections[0].id("ipc"), "ipc_378");
        assert_eq!(
            sections[0].document(),
            "Section 378: Theft. Whoever, intending to take dishonestly any movable property out of the possession of any person without that person's consent, commits theft."
        );
    }

    #[test]
    fn test_body_runs_until_next_section_word() {
        // Any line starting with "Section" ends the body, even without a number.
        let text = "Section 1: A\nbody one\nSection heading note\nSection 2: B\nbody two";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "body one");
        assert_eq!(sections[1].number, "2");
        assert_eq!(sections[1].body, "body two");
    }

    #[test]
    fn test_header_without_body_is_skipped() {
        assert!(parse_sections("Section 5: Title only").is_empty());
        assert!(parse_sections("Section 5: Title\n").is_empty());
        assert!(parse_sections("no sections here").is_empty());
    }

    #[test]
    fn test_crlf_input_is_trimmed() {
        let sections = parse_sections("Section 420: Cheating\r\nWhoever cheats\r\nshall be punished.\r\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Cheating");
        assert_eq!(sections[0].body, "Whoever cheats\r\nshall be punished.");
    }

    #[test]
    fn test_non_ascii_text() {
        let sections = parse_sections("Section 1: धारा\nपाठ\nSection 2: Second\nbody");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "धारा");
        assert_eq!(sections[0].body, "पाठ");
    }
}
