//! Context Window Expander.
//!
//! Expands a single hit into its surrounding chunks. Unlike search, which
//! silently filters, direct access denies: a requester asking for a chunk
//! they cannot see gets `AccessDenied`. Neighbors that are individually
//! stricter than the requester's clearance are silently omitted (documents
//! may carry mixed-confidentiality chunks).

use std::ops::RangeInclusive;

use hearings_core::error::{Error, Result};
use hearings_core::types::{
    Chunk, ContextChunk, ContextRequest, ContextResponse, PageRange, SecurityPredicate,
};

use crate::assemble;

/// Inclusive ordinal range to fetch, clamped to the configured ceiling.
pub fn window_range(chunk_id: u32, window: u32, max_window: u32) -> RangeInclusive<u32> {
    let n = window.min(max_window);
    chunk_id.saturating_sub(n)..=chunk_id.saturating_add(n)
}

/// Pure assembly step over chunks already fetched from the index.
pub fn build_response(
    mut chunks: Vec<Chunk>,
    request: &ContextRequest,
    predicate: &SecurityPredicate,
) -> Result<ContextResponse> {
    chunks.sort_by_key(|c| c.chunk_id);

    let target = chunks
        .iter()
        .find(|c| c.chunk_id == request.chunk_id)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "chunk {} of document {}",
                request.chunk_id, request.document_id
            ))
        })?;

    if !predicate.allows_chunk(target) {
        // Message intentionally names no content, only the restriction.
        return Err(Error::AccessDenied(
            "confidentiality restriction - insufficient access level".to_string(),
        ));
    }

    let citation_ref = assemble::citation_for(target);
    let title = assemble::derive_title(target);
    let proceeding_id = target.proceeding_id.clone();

    let kept: Vec<ContextChunk> = chunks
        .iter()
        .filter(|c| predicate.allows_chunk(c))
        .map(|c| ContextChunk {
            chunk_id: c.chunk_id,
            page_number: c.page_number,
            paragraph_number: c.paragraph_number.clone(),
            content: c.content.clone(),
            is_target: c.chunk_id == request.chunk_id,
        })
        .collect();

    // Target passed the predicate above, so `kept` is non-empty.
    let first = kept.iter().map(|c| c.page_number).min().unwrap_or(1);
    let last = kept.iter().map(|c| c.page_number).max().unwrap_or(first);

    Ok(ContextResponse {
        document_id: request.document_id.clone(),
        proceeding_id,
        title,
        citation_ref,
        chunks: kept,
        page_range: PageRange { first, last },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearings_core::types::{ConfidentialityLevel, DocumentType};

    fn chunk(chunk_id: u32, page: u32, level: ConfidentialityLevel) -> Chunk {
        Chunk {
            id: format!("doc-1-{chunk_id}"),
            chunk_id,
            document_id: "doc-1".to_string(),
            proceeding_id: "449".to_string(),
            document_type: DocumentType::Evidence,
            title: "Expert Report".to_string(),
            content: format!("chunk {chunk_id} content"),
            confidentiality_level: level,
            parties: vec![],
            page_number: page,
            paragraph_number: None,
            section_title: None,
            regulatory_citations: vec![],
            abaer_citation: None,
            document_date: None,
        }
    }

    fn request(chunk_id: u32, window: u32) -> ContextRequest {
        ContextRequest {
            document_id: "doc-1".to_string(),
            chunk_id,
            context_window: window,
        }
    }

    #[test]
    fn window_range_is_clamped_and_saturating() {
        assert_eq!(window_range(15, 2, 5), 13..=17);
        assert_eq!(window_range(15, 50, 5), 10..=20);
        assert_eq!(window_range(1, 3, 5), 0..=4);
    }

    #[test]
    fn target_is_flagged_and_order_ascending() {
        let chunks = (13..=17)
            .map(|i| chunk(i, 10 + i, ConfidentialityLevel::Public))
            .collect();
        let resp = build_response(chunks, &request(15, 2), &SecurityPredicate::Unrestricted)
            .expect("accessible");
        let ids: Vec<u32> = resp.chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![13, 14, 15, 16, 17]);
        let targets: Vec<u32> = resp
            .chunks
            .iter()
            .filter(|c| c.is_target)
            .map(|c| c.chunk_id)
            .collect();
        assert_eq!(targets, vec![15]);
        assert_eq!(resp.page_range, PageRange { first: 23, last: 27 });
    }

    #[test]
    fn missing_target_is_not_found() {
        let chunks = vec![chunk(3, 2, ConfidentialityLevel::Public)];
        let err = build_response(chunks, &request(9, 1), &SecurityPredicate::Unrestricted)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn restricted_target_is_denied_without_content_leak() {
        let chunks = vec![chunk(5, 4, ConfidentialityLevel::Confidential)];
        let predicate = SecurityPredicate::Restricted {
            protected_a: hearings_core::types::ProtectedAccess::Denied,
            party_match: hearings_core::types::PartyMatch::CaseSensitive,
        };
        let err = build_response(chunks, &request(5, 0), &predicate).unwrap_err();
        match err {
            Error::AccessDenied(msg) => assert!(!msg.contains("content")),
            other => panic!("expected AccessDenied, got {other:?}"),
        }
    }

    #[test]
    fn stricter_neighbors_are_silently_omitted() {
        let chunks = vec![
            chunk(4, 4, ConfidentialityLevel::Confidential),
            chunk(5, 4, ConfidentialityLevel::Public),
            chunk(6, 5, ConfidentialityLevel::Public),
        ];
        let predicate = SecurityPredicate::Restricted {
            protected_a: hearings_core::types::ProtectedAccess::Denied,
            party_match: hearings_core::types::PartyMatch::CaseSensitive,
        };
        let resp = build_response(chunks, &request(5, 1), &predicate).expect("target public");
        let ids: Vec<u32> = resp.chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![5, 6]);
        assert_eq!(resp.page_range, PageRange { first: 4, last: 5 });
    }
}
