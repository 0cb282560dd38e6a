//! Title selection and outline assembly over accepted headings.

use std::collections::HashSet;

use outline_model::{Heading, Outline, OutlineEntry, UNTITLED};

use crate::patterns::matches_title_pattern;

fn by_position(a: &Heading, b: &Heading) -> std::cmp::Ordering {
    a.page.cmp(&b.page).then(a.y.total_cmp(&b.y))
}

/// Pick the document title from headings in their accepted order.
///
/// Priority: a document-type heading ("... guide", "syllabus", ...), then the
/// top-most level-1 heading, then the first heading, then "Untitled".
pub fn select_title(headings: &[Heading]) -> String {
    if let Some(h) = headings.iter().find(|h| matches_title_pattern(&h.text)) {
        return h.text.clone();
    }
    if let Some(h) = headings.iter().filter(|h| h.level == 1).min_by(|a, b| by_position(a, b)) {
        return h.text.clone();
    }
    headings
        .first()
        .map(|h| h.text.clone())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Outline entries in reading order, without the level-1 title and without
/// repeats of the same (case-insensitive) text on one page.
pub fn build_outline(headings: &[Heading], title: &str) -> Vec<OutlineEntry> {
    let mut sorted: Vec<&Heading> = headings.iter().collect();
    sorted.sort_by(|a, b| by_position(a, b));

    let title_lower = title.to_lowercase();
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    let mut out = Vec::new();
    for h in sorted {
        let text = h.text.trim();
        let lower = text.to_lowercase();
        if h.level == 1 && lower == title_lower {
            continue;
        }
        if !seen.insert((lower, h.page)) {
            continue;
        }
        out.push(OutlineEntry {
            level: format!("H{}", h.level),
            text: text.to_string(),
            page: h.page,
            language: h.language.clone(),
        });
    }
    out
}

pub fn assemble_outline(headings: &[Heading]) -> Outline {
    if headings.is_empty() {
        return Outline::untitled();
    }
    let title = select_title(headings);
    let outline = build_outline(headings, &title);
    Outline { title, outline }
}
