//! Result Assembler / Citation Formatter.
//!
//! Maps fused hits to caller-facing results. Every emitted result re-checks
//! the security predicate locally: even if the index mis-applies the filter
//! and leaks a restricted chunk, it is dropped here before leaving the core.

use hearings_core::config::SearchConfig;
use hearings_core::types::{Chunk, DocumentType, SearchResult, SecurityPredicate};
use tracing::warn;

use crate::fusion::FusedHit;

/// Deterministic citation reference.
///
/// `"Proceeding {id}, {label}, p.{page}"`, with `", ¶{para}"` appended only
/// when a paragraph number is present. Decisions carrying an ABAER citation
/// use it as the citation base instead: `"2024-ABAER-001, p.47, ¶156"`.
pub fn format_citation_ref(
    proceeding_id: &str,
    document_type: DocumentType,
    page_number: u32,
    paragraph_number: Option<&str>,
    abaer_citation: Option<&str>,
) -> String {
    let mut citation = match abaer_citation {
        Some(abaer) => abaer.to_string(),
        None => format!("Proceeding {proceeding_id}, {}", document_type.label()),
    };
    citation.push_str(&format!(", p.{page_number}"));
    if let Some(para) = paragraph_number {
        citation.push_str(&format!(", \u{b6}{para}"));
    }
    citation
}

pub fn citation_for(chunk: &Chunk) -> String {
    format_citation_ref(
        &chunk.proceeding_id,
        chunk.document_type,
        chunk.page_number,
        chunk.paragraph_number.as_deref(),
        chunk.abaer_citation.as_deref(),
    )
}

/// Titles are frequently missing on ingested chunks; derive something
/// citable rather than emitting a placeholder.
pub fn derive_title(chunk: &Chunk) -> String {
    let raw = chunk.title.trim();
    if !raw.is_empty() && raw != "Untitled" && raw != "Unknown Document" {
        return raw.to_string();
    }
    match &chunk.abaer_citation {
        Some(abaer) => format!("Decision {abaer}"),
        None => format!("Document - {}", chunk.document_type.label()),
    }
}

/// Bounded excerpt of chunk content.
///
/// Content within budget passes through. Otherwise the window is centered
/// on the densest region of query-term matches; with no matches the prefix
/// is cut at a sentence boundary past half the budget, falling back to a
/// word boundary.
pub fn make_snippet(content: &str, query: &str, max_chars: usize) -> String {
    let content = content.trim();
    if content.len() <= max_chars {
        return content.to_string();
    }

    let lower = content.to_lowercase();
    let terms: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| t.len() > 2)
        .collect();

    let mut positions: Vec<usize> = Vec::new();
    for term in &terms {
        positions.extend(lower.match_indices(term.as_str()).map(|(i, _)| i));
    }
    positions.sort_unstable();
    positions.dedup();

    if positions.is_empty() {
        return prefix_snippet(content, max_chars);
    }

    // Densest window: for each match as window start, count matches that
    // fit inside the budget; earliest window wins ties.
    let mut best_start = 0usize;
    let mut best_count = 0usize;
    let mut j = 0usize;
    for i in 0..positions.len() {
        if j < i {
            j = i;
        }
        while j < positions.len() && positions[j] < positions[i] + max_chars {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best_start = i;
        }
    }

    let span_start = positions[best_start];
    let span_end = positions[best_start + best_count - 1].min(span_start + max_chars);
    let slack = max_chars.saturating_sub(span_end - span_start) / 2;

    let mut start = span_start.saturating_sub(slack);
    while start > 0 && !content.is_char_boundary(start) {
        start -= 1;
    }
    if start > 0 {
        // Pull forward to the next word boundary so we never open mid-word.
        if let Some(pos) = content[start..].find(' ') {
            start += pos + 1;
        }
    }

    let mut end = (start + max_chars).min(content.len());
    while end < content.len() && !content.is_char_boundary(end) {
        end -= 1;
    }
    if end < content.len() {
        if let Some(pos) = content[start..end].rfind(' ') {
            end = start + pos;
        }
    }

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(content[start..end].trim());
    if end < content.len() {
        snippet.push_str("...");
    }
    snippet
}

fn prefix_snippet(content: &str, max_chars: usize) -> String {
    let mut cut = max_chars.min(content.len());
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &content[..cut];

    if let Some(last_period) = truncated.rfind(". ") {
        if last_period > max_chars / 2 {
            return truncated[..=last_period].to_string();
        }
    }
    if let Some(last_space) = truncated.rfind(' ') {
        if last_space > 0 {
            return format!("{}...", &truncated[..last_space]);
        }
    }
    format!("{truncated}...")
}

/// Fused hits to caller-facing results, with the local predicate re-check.
pub fn assemble_results(
    fused: Vec<FusedHit>,
    query: &str,
    predicate: &SecurityPredicate,
    config: &SearchConfig,
) -> Vec<SearchResult> {
    fused
        .into_iter()
        .filter(|hit| {
            let allowed = predicate.allows_chunk(&hit.chunk);
            if !allowed {
                // The index should never have returned this chunk; drop it
                // and leave only its id in the log.
                warn!(chunk_id = %hit.chunk.id, "index returned chunk outside access predicate");
            }
            allowed
        })
        .map(|hit| SearchResult {
            citation_ref: citation_for(&hit.chunk),
            title: derive_title(&hit.chunk),
            snippet: make_snippet(&hit.chunk.content, query, config.snippet_max_chars),
            document_id: hit.chunk.document_id,
            abaer_citation: hit.chunk.abaer_citation,
            relevance_score: hit.relevance,
            page_number: hit.chunk.page_number,
            paragraph_number: hit.chunk.paragraph_number,
            parties: hit.chunk.parties,
            regulatory_citations: hit.chunk.regulatory_citations,
        })
        .collect()
}
