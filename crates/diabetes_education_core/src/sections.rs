//! crates/diabetes_education_core/src/sections.rs
//!
//! Splits a generated education document into its numbered sections
//! (`1) Disclaimer`, `2) Your Current Regimen`, ...).

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One numbered unit of a generated education document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub number: u32,
    pub title: String,
    pub body: String,
}

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\) (.+)$").expect("heading pattern is a valid regex")
    })
}

/// Parses a heading line into its number and title.
fn parse_heading(line: &str) -> Option<(u32, String)> {
    let captures = heading_pattern().captures(line)?;
    // A number too large for u32 is treated as body text.
    let number = captures[1].parse().ok()?;
    Some((number, captures[2].to_string()))
}

/// Splits `document` into sections in the order their headings appear.
///
/// Lines before the first heading are dropped. Repeated or skipped numbers
/// are kept exactly as encountered. A document without headings yields an
/// empty list.
pub fn split_sections(document: &str) -> Vec<SummarySection> {
    let mut sections = Vec::new();
    let mut open: Option<(u32, String, Vec<&str>)> = None;

    for line in document.lines() {
        if let Some((number, title)) = parse_heading(line) {
            if let Some((number, title, body)) = open.take() {
                sections.push(finish_section(number, title, &body));
            }
            open = Some((number, title, Vec::new()));
        } else if let Some((_, _, body)) = open.as_mut() {
            body.push(line);
        }
    }

    if let Some((number, title, body)) = open {
        sections.push(finish_section(number, title, &body));
    }
    sections
}

/// Trims leading and trailing blank lines; interior lines are kept verbatim.
fn finish_section(number: u32, title: String, lines: &[&str]) -> SummarySection {
    let is_blank = |line: &&str| line.trim().is_empty();
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(start, |i| i + 1);
    SummarySection {
        number,
        title,
        body: lines[start..end].join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(number: u32, title: &str, body: &str) -> SummarySection {
        SummarySection {
            number,
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn splits_two_sections() {
        assert_eq!(
            split_sections("1) A\nhello\n2) B\nworld"),
            vec![section(1, "A", "hello"), section(2, "B", "world")]
        );
    }

    #[test]
    fn no_headings_yields_nothing() {
        assert!(split_sections("no headings here").is_empty());
        assert!(split_sections("").is_empty());
    }

    #[test]
    fn duplicate_numbers_are_not_merged() {
        assert_eq!(
            split_sections("1) A\n1) A again\nbody"),
            vec![section(1, "A", ""), section(1, "A again", "body")]
        );
    }

    #[test]
    fn preamble_before_first_heading_is_dropped() {
        let sections = split_sections("Here is your plan:\n\n3) ADA Glycemic Targets\n- A1C below 7%");
        assert_eq!(sections, vec![section(3, "ADA Glycemic Targets", "- A1C below 7%")]);
    }

    #[test]
    fn out_of_order_numbers_keep_source_order() {
        let numbers: Vec<u32> = split_sections("2) B\n1) A\n5) E")
            .iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(numbers, vec![2, 1, 5]);
    }

    #[test]
    fn blank_edges_are_trimmed_but_interior_kept() {
        let doc = "  4) **Lifestyle & Self-Care**\n\n   - Diet\n\n   - Sleep\n\n\n";
        let sections = split_sections(doc);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "**Lifestyle & Self-Care**");
        assert_eq!(sections[0].body, "   - Diet\n\n   - Sleep");
    }

    #[test]
    fn lines_resembling_headings_without_space_are_body() {
        let sections = split_sections("1) Intro\n2)missing space\n10)no");
        assert_eq!(sections, vec![section(1, "Intro", "2)missing space\n10)no")]);
    }

    #[test]
    fn crlf_documents_split_cleanly() {
        let sections = split_sections("1) A\r\nhello\r\n2) B\r\nworld\r\n");
        assert_eq!(sections[0], section(1, "A", "hello"));
        assert_eq!(sections[1].title, "B");
    }
}
