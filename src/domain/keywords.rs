use std::collections::HashSet;

use crate::domain::ticket::Ticket;

/// Only the head of the description feeds keyword extraction.
pub const DESCRIPTION_PREFIX_CHARS: usize = 200;

const MIN_KEYWORD_CHARS: usize = 3;

const SEPARATORS: &[char] = &[
    '-', '_', '/', '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '`',
];

// English and French, matching the languages tickets are written in.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "can", "shall", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "and", "but", "or", "not", "so", "yet", "this", "that", "these", "those",
    "it", "its", "we", "they", "le", "la", "les", "un", "une", "des", "de", "du", "et", "en",
    "est", "que", "qui", "dans", "pour", "sur", "avec", "par", "pas", "plus", "ce", "cette",
    "ces", "son", "sa", "ses",
];

/// Extracts unique search keywords from a ticket. Keywords keep the order in
/// which they first appear, so callers can take a stable "top N".
pub fn extract_keywords(ticket: &Ticket) -> Vec<String> {
    let mut source = Vec::with_capacity(ticket.labels.len() + 2);
    source.push(ticket.title.clone());
    source.extend(ticket.labels.iter().cloned());
    if let Some(description) = &ticket.description {
        source.push(description.chars().take(DESCRIPTION_PREFIX_CHARS).collect());
    }

    let text = source.join(" ").to_lowercase();
    let mut seen = HashSet::new();
    text.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .filter(|token| seen.insert(token.to_string()))
        .map(str::to_string)
        .collect()
}
