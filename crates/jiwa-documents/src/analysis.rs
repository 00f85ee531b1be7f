//! Keyword detection, highlighting and summaries for mental-health content.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

pub const KEYWORDS: &[&str] = &[
    "mental health",
    "depression",
    "anxiety",
    "stress",
    "psikologis",
    "depresi",
    "kecemasan",
    "gangguan mood",
    "terapi",
    "konseling",
    "skrining",
    "diagnosis",
    "DSM-5",
];

pub const SUMMARY_HEADER: &str = "DOKUMEN MENGANDUNG INFORMASI TENTANG:";
pub const SUMMARY_FOOTER: &str = "Gunakan fitur chat untuk bertanya spesifik tentang dokumen ini.";
pub const NO_CONTENT_SUMMARY: &str =
    "Dokumen ini tidak memiliki konten kesehatan mental yang terdeteksi.";

const MAX_PAGE_SENTENCES: usize = 3;
const MAX_SUMMARY_PARAGRAPHS: usize = 3;
const PARAGRAPH_PREVIEW_CHARS: usize = 150;

static KEYWORD_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let mut keywords: Vec<&str> = KEYWORDS.to_vec();
    // Longest first so overlapping alternatives prefer the fuller match.
    keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let pattern = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| tracing::error!("keyword pattern failed to compile: {e}"))
        .ok()
});

/// Case-insensitive substring match against [`KEYWORDS`].
#[must_use]
pub fn contains_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    KEYWORDS.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// Replace every keyword occurrence with `**KEYWORD**`.
#[must_use]
pub fn highlight(text: &str) -> String {
    match KEYWORD_RE.as_ref() {
        Some(re) => re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                format!("**{}**", caps[0].to_uppercase())
            })
            .into_owned(),
        None => text.to_owned(),
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace. The whitespace run
/// is dropped; terminal punctuation stays with its sentence.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }
        sentences.push(&text[start..end]);
        let mut resume = text.len();
        while let Some(&(j, ws)) = chars.peek() {
            if ws.is_whitespace() {
                chars.next();
            } else {
                resume = j;
                break;
            }
        }
        start = resume;
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Up to three keyword-bearing sentences of a page, joined with spaces and
/// followed by `...`. Empty when no sentence qualifies.
#[must_use]
pub fn summarize_page(page_text: &str) -> String {
    let relevant: Vec<&str> = split_sentences(page_text)
        .into_iter()
        .map(str::trim)
        .filter(|s| contains_keyword(s))
        .take(MAX_PAGE_SENTENCES)
        .collect();
    if relevant.is_empty() {
        return String::new();
    }
    format!("{}...", relevant.join(" "))
}

/// Bulleted digest of the first three keyword-bearing paragraphs.
#[must_use]
pub fn generate_summary(text: &str) -> String {
    let paragraphs: Vec<String> = text
        .split('\n')
        .filter(|p| !p.trim().is_empty())
        .filter(|p| contains_keyword(p))
        .take(MAX_SUMMARY_PARAGRAPHS)
        .map(preview)
        .collect();

    if paragraphs.is_empty() {
        return NO_CONTENT_SUMMARY.to_owned();
    }

    format!(
        "{SUMMARY_HEADER}\n\n- {}\n\n\n{SUMMARY_FOOTER}",
        paragraphs.join("\n- ")
    )
}

fn preview(paragraph: &str) -> String {
    if paragraph.chars().count() > PARAGRAPH_PREVIEW_CHARS {
        let cut: String = paragraph.chars().take(PARAGRAPH_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        paragraph.to_owned()
    }
}
