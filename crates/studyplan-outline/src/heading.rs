use once_cell::sync::Lazy;
use regex::Regex;

/// Which rule recognized a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingKind {
    Chapter,
    Section,
    Part,
    Unit,
    Topic,
    /// "§ 4", "§4.2"
    SectionMark,
    /// "2 Methods", "3.1 Setup", "1.2.3. Details"
    Numbered,
}

/// A classified heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub kind: HeadingKind,
    pub level: usize,
    /// The full line, trimmed.
    pub title: String,
}

struct HeadingRule {
    kind: HeadingKind,
    regex: Regex,
}

fn named(kind: HeadingKind, keyword: &str) -> HeadingRule {
    HeadingRule {
        kind,
        regex: Regex::new(&format!(
            r"^(?i:{keyword})\s+(?P<num>\d+(?:\.\d+)*|[IVXLCDM]+)\b"
        ))
        .unwrap(),
    }
}

/// Rules in priority order. The first match wins; rules are never combined.
static RULES: Lazy<Vec<HeadingRule>> = Lazy::new(|| {
    vec![
        named(HeadingKind::Chapter, "chapter"),
        named(HeadingKind::Section, "section"),
        named(HeadingKind::Part, "part"),
        named(HeadingKind::Unit, "unit"),
        named(HeadingKind::Topic, "topic"),
        HeadingRule {
            kind: HeadingKind::SectionMark,
            regex: Regex::new(r"^§\s*(?P<num>\d+(?:\.\d+)*)").unwrap(),
        },
        HeadingRule {
            kind: HeadingKind::Numbered,
            regex: Regex::new(r"^(?P<num>\d{1,3}(?:\.\d{1,3})*)\.?\s+\p{Lu}").unwrap(),
        },
    ]
});

/// Nesting level of a heading label: one more than the number of `.`
/// separators in its numeric part. Roman numerals and plain numbers are
/// level 1.
pub fn label_level(label: &str) -> usize {
    label.matches('.').count() + 1
}

/// Classify a single line of text.
///
/// Returns `None` for body text, including empty and whitespace-only lines.
pub fn classify_line(line: &str) -> Option<Heading> {
    let stripped = line.trim_start();
    if stripped.is_empty() {
        return None;
    }

    RULES.iter().find_map(|rule| {
        let caps = rule.regex.captures(stripped)?;
        let level = caps.name("num").map_or(1, |m| label_level(m.as_str()));
        Some(Heading {
            kind: rule.kind,
            level,
            title: stripped.trim_end().to_string(),
        })
    })
}
