//! Collaborator contracts and the wire types exchanged with the index.
//!
//! The index and the embedder are external services. Both calls are
//! single-shot and cancellable: dropping the returned future cancels the
//! operation, and the service layer bounds each call with a timeout.

use std::ops::RangeInclusive;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Chunk, ConfidentialityLevel, DocumentType, ScoredChunk, SecurityPredicate};

/// Facet dimensions this core knows how to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetDimension {
    DocumentType,
    Parties,
    RegulatoryCitations,
}

impl FacetDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocumentType => "document_type",
            Self::Parties => "parties",
            Self::RegulatoryCitations => "regulatory_citations",
        }
    }

    pub const ALL: [FacetDimension; 3] = [
        FacetDimension::DocumentType,
        FacetDimension::Parties,
        FacetDimension::RegulatoryCitations,
    ];
}

/// Facet request attached to every index query. Always present so the
/// aggregator has population data even when a caller ignores facets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetSpec {
    pub dimensions: Vec<FacetDimension>,
    pub max_values_per_dimension: usize,
}

impl Default for FacetSpec {
    fn default() -> Self {
        Self {
            dimensions: FacetDimension::ALL.to_vec(),
            max_values_per_dimension: 20,
        }
    }
}

/// Conjunction of client filters and the server-derived security predicate.
///
/// The predicate is a mandatory field, not an optional clause: a filter
/// cannot be constructed without one, which is the invariant that keeps
/// client input from ever widening access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFilter {
    pub proceeding_id: Option<String>,
    pub document_types: Vec<DocumentType>,
    pub parties: Vec<String>,
    pub regulatory_citations: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub security: SecurityPredicate,
}

impl IndexFilter {
    /// Reference evaluation of the composed filter against one chunk.
    /// Empty client dimensions are unconstrained; the security predicate
    /// is always evaluated last and is never skipped.
    pub fn matches(&self, chunk: &Chunk) -> bool {
        if let Some(pid) = &self.proceeding_id {
            if &chunk.proceeding_id != pid {
                return false;
            }
        }
        if !self.document_types.is_empty() && !self.document_types.contains(&chunk.document_type) {
            return false;
        }
        if !self.parties.is_empty()
            && !self
                .parties
                .iter()
                .any(|p| chunk.parties.iter().any(|q| q == p))
        {
            return false;
        }
        if !self.regulatory_citations.is_empty() {
            let hit = self.regulatory_citations.iter().any(|wanted| {
                chunk
                    .regulatory_citations
                    .iter()
                    .any(|c| c.to_lowercase().contains(&wanted.to_lowercase()))
            });
            if !hit {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            // A date-bounded filter only matches chunks that carry a date.
            let Some(date) = chunk.document_date else {
                return false;
            };
            if let Some(from) = self.date_from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = self.date_to {
                if date > to {
                    return false;
                }
            }
        }
        self.security.allows_chunk(chunk)
    }
}

/// A single retrieval request against the index collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexQuery {
    /// Keyword text; present in hybrid and keyword modes.
    pub text: Option<String>,
    /// Query embedding; present in hybrid and vector modes.
    pub vector: Option<Vec<f32>>,
    pub filter: IndexFilter,
    pub top: usize,
    pub facets: FacetSpec,
}

/// Per-chunk fields needed for facet aggregation over the full matched
/// population, independent of `top` truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetSource {
    pub document_type: DocumentType,
    pub confidentiality_level: ConfidentialityLevel,
    pub parties: Vec<String>,
    pub regulatory_citations: Vec<String>,
}

impl FacetSource {
    pub fn of(chunk: &Chunk) -> Self {
        Self {
            document_type: chunk.document_type,
            confidentiality_level: chunk.confidentiality_level,
            parties: chunk.parties.clone(),
            regulatory_citations: chunk.regulatory_citations.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Top-k hits with their raw relevance signals.
    pub hits: Vec<ScoredChunk>,
    /// Full matched population, pre-truncation, for facet aggregation.
    pub matched: Vec<FacetSource>,
    pub total_count: usize,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, query: &IndexQuery) -> anyhow::Result<IndexResponse>;

    /// Fetch chunks of one document whose ordinal falls in `range`,
    /// ascending by ordinal. Access control is the caller's job.
    async fn fetch_chunk_range(
        &self,
        document_id: &str,
        range: RangeInclusive<u32>,
    ) -> anyhow::Result<Vec<Chunk>>;

    async fn proceeding_exists(&self, proceeding_id: &str) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}
