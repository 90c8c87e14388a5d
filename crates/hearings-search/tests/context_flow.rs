use std::sync::Arc;

use hearings_core::config::SearchConfig;
use hearings_core::error::Error;
use hearings_core::types::{
    Chunk, ConfidentialityLevel, ContextRequest, DocumentType, PageRange, RequesterClaims,
};
use hearings_index_mem::{HashEmbedder, MemoryIndex};
use hearings_search::SearchService;

fn chunk(ordinal: u32, level: ConfidentialityLevel) -> Chunk {
    Chunk {
        id: format!("report-1-{ordinal}"),
        chunk_id: ordinal,
        document_id: "report-1".to_string(),
        proceeding_id: "449".to_string(),
        document_type: DocumentType::Evidence,
        title: "Hydrogeology Assessment".to_string(),
        content: format!("Paragraph {ordinal} of the assessment."),
        confidentiality_level: level,
        parties: vec!["Benga Mining".to_string()],
        page_number: ordinal,
        paragraph_number: Some(format!("{ordinal}")),
        section_title: None,
        regulatory_citations: vec![],
        abaer_citation: None,
        document_date: None,
    }
}

fn staff() -> RequesterClaims {
    RequesterClaims {
        roles: vec!["AER_Staff".to_string()],
        party_affiliation: None,
    }
}

fn public() -> RequesterClaims {
    RequesterClaims {
        roles: vec![],
        party_affiliation: None,
    }
}

async fn service_over(corpus: Vec<Chunk>) -> SearchService<MemoryIndex, HashEmbedder> {
    let embedder = Arc::new(HashEmbedder::default());
    let index = Arc::new(
        MemoryIndex::build(corpus, embedder.as_ref())
            .await
            .expect("build index"),
    );
    SearchService::new(index, embedder, SearchConfig::default())
}

fn request(chunk_id: u32, window: u32) -> ContextRequest {
    ContextRequest {
        document_id: "report-1".to_string(),
        chunk_id,
        context_window: window,
    }
}

#[tokio::test]
async fn window_of_two_around_chunk_15_returns_13_through_17() {
    let corpus = (1..=20).map(|i| chunk(i, ConfidentialityLevel::Public)).collect();
    let svc = service_over(corpus).await;

    let resp = svc.expand_context(&request(15, 2), &staff()).await.expect("expand");

    let ids: Vec<u32> = resp.chunks.iter().map(|c| c.chunk_id).collect();
    assert_eq!(ids, vec![13, 14, 15, 16, 17]);
    let flagged: Vec<u32> = resp
        .chunks
        .iter()
        .filter(|c| c.is_target)
        .map(|c| c.chunk_id)
        .collect();
    assert_eq!(flagged, vec![15]);
    assert_eq!(resp.page_range, PageRange { first: 13, last: 17 });
    assert_eq!(resp.page_range.to_string(), "pp.13-17");
    assert_eq!(resp.proceeding_id, "449");
}

#[tokio::test]
async fn window_is_clamped_to_configured_maximum() {
    let corpus = (1..=20).map(|i| chunk(i, ConfidentialityLevel::Public)).collect();
    let svc = service_over(corpus).await;
    let max = svc.config().max_context_window;

    let resp = svc.expand_context(&request(10, 100), &staff()).await.expect("expand");
    let ids: Vec<u32> = resp.chunks.iter().map(|c| c.chunk_id).collect();
    assert_eq!(ids.first(), Some(&(10 - max)));
    assert_eq!(ids.last(), Some(&(10 + max)));
}

#[tokio::test]
async fn inaccessible_target_is_denied() {
    let corpus = vec![chunk(5, ConfidentialityLevel::Confidential)];
    let svc = service_over(corpus).await;

    let err = svc.expand_context(&request(5, 1), &staff()).await.unwrap_err();
    assert!(matches!(err, Error::AccessDenied(_)));
}

#[tokio::test]
async fn stricter_neighbors_are_omitted_but_target_returned() {
    let corpus = vec![
        chunk(4, ConfidentialityLevel::ProtectedA),
        chunk(5, ConfidentialityLevel::Public),
        chunk(6, ConfidentialityLevel::Public),
    ];
    let svc = service_over(corpus).await;

    let resp = svc.expand_context(&request(5, 1), &public()).await.expect("expand");
    let ids: Vec<u32> = resp.chunks.iter().map(|c| c.chunk_id).collect();
    assert_eq!(ids, vec![5, 6], "protected neighbor silently omitted");
    assert_eq!(resp.page_range, PageRange { first: 5, last: 6 });
}

#[tokio::test]
async fn missing_target_chunk_is_not_found() {
    let corpus = vec![chunk(1, ConfidentialityLevel::Public)];
    let svc = service_over(corpus).await;

    let err = svc.expand_context(&request(40, 2), &staff()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn context_carries_target_citation() {
    let corpus = (1..=3).map(|i| chunk(i, ConfidentialityLevel::Public)).collect();
    let svc = service_over(corpus).await;

    let resp = svc.expand_context(&request(2, 0), &staff()).await.expect("expand");
    assert_eq!(resp.citation_ref, "Proceeding 449, Exhibit, p.2, \u{b6}2");
    assert_eq!(resp.title, "Hydrogeology Assessment");
}
