//! Domain types shared by the access, planning, and retrieval layers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document taxonomy for regulatory-hearing material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Decision,
    Transcript,
    Procedural,
    Evidence,
    Notice,
    InformationRequest,
}

impl DocumentType {
    /// Human-readable label used in citation references.
    /// Evidence documents are cited as exhibits.
    pub fn label(self) -> &'static str {
        match self {
            Self::Decision => "Decision",
            Self::Transcript => "Transcript",
            Self::Procedural => "Procedural",
            Self::Evidence => "Exhibit",
            Self::Notice => "Notice",
            Self::InformationRequest => "Information Request",
        }
    }

    /// Wire name as stored in the index.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Transcript => "transcript",
            Self::Procedural => "procedural",
            Self::Evidence => "evidence",
            Self::Notice => "notice",
            Self::InformationRequest => "information_request",
        }
    }
}

/// Confidentiality tier attached to every chunk at ingestion time.
/// Immutable once indexed; a change requires reindexing the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidentialityLevel {
    Public,
    ProtectedA,
    Confidential,
}

/// Smallest indexed unit of a document.
///
/// `id` is globally unique; `chunk_id` is the ordinal position within the
/// parent document and is the basis for context-window expansion. The
/// embedding vector stays inside the index collaborator and never crosses
/// this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub chunk_id: u32,
    pub document_id: String,
    pub proceeding_id: String,
    pub document_type: DocumentType,
    #[serde(default)]
    pub title: String,
    pub content: String,
    pub confidentiality_level: ConfidentialityLevel,
    #[serde(default)]
    pub parties: Vec<String>,
    pub page_number: u32,
    #[serde(default)]
    pub paragraph_number: Option<String>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub regulatory_citations: Vec<String>,
    #[serde(default)]
    pub abaer_citation: Option<String>,
    #[serde(default)]
    pub document_date: Option<NaiveDate>,
}

/// Resolved identity of the requester.
///
/// Produced by the auth collaborator; this core never defaults it. There is
/// no ambient identity anywhere: every operation takes claims explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequesterClaims {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub party_affiliation: Option<String>,
}

impl RequesterClaims {
    pub const ROLE_HEARING_PANEL: &'static str = "Hearing_Panel";
    pub const ROLE_AER_STAFF: &'static str = "AER_Staff";

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// How party names are compared for Protected A access.
///
/// The governing rules do not settle this; case-sensitive is the documented
/// default and the choice is pinned by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyMatch {
    CaseSensitive,
    CaseInsensitive,
}

impl Default for PartyMatch {
    fn default() -> Self {
        Self::CaseSensitive
    }
}

impl PartyMatch {
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::CaseSensitive => a == b,
            Self::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// What a restricted requester may see at the Protected A tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectedAccess {
    /// Staff-level: every Protected A chunk.
    All,
    /// Intervener: only chunks naming this party.
    OwnParty(String),
    /// No Protected A access at all.
    Denied,
}

/// Server-derived access predicate, computed once per request from
/// [`RequesterClaims`] and conjoined with every index query. Never optional,
/// never built from client input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPredicate {
    /// Hearing Panel: matches everything, including confidential.
    Unrestricted,
    /// Everyone else: confidential is always excluded, Protected A is
    /// gated by `protected_a`, public always passes.
    Restricted {
        protected_a: ProtectedAccess,
        party_match: PartyMatch,
    },
}

impl SecurityPredicate {
    /// Single evaluation point, shared by the planner, the assembler's
    /// defense-in-depth re-check, the facet aggregator, and the context
    /// expander.
    pub fn allows(&self, level: ConfidentialityLevel, parties: &[String]) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted {
                protected_a,
                party_match,
            } => match level {
                ConfidentialityLevel::Public => true,
                ConfidentialityLevel::Confidential => false,
                ConfidentialityLevel::ProtectedA => match protected_a {
                    ProtectedAccess::All => true,
                    ProtectedAccess::Denied => false,
                    ProtectedAccess::OwnParty(own) => {
                        parties.iter().any(|p| party_match.matches(own, p))
                    }
                },
            },
        }
    }

    pub fn allows_chunk(&self, chunk: &Chunk) -> bool {
        self.allows(chunk.confidentiality_level, &chunk.parties)
    }
}

/// Client-supplied filters. Confidentiality is deliberately absent: it is
/// exclusively server-derived via [`SecurityPredicate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub document_types: Option<Vec<DocumentType>>,
    #[serde(default)]
    pub parties: Option<Vec<String>>,
    #[serde(default)]
    pub regulatory_citations: Option<Vec<String>>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Hybrid,
    Vector,
    Keyword,
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Hybrid
    }
}

impl SearchMode {
    pub fn wants_keyword(self) -> bool {
        matches!(self, Self::Hybrid | Self::Keyword)
    }

    pub fn wants_vector(self) -> bool {
        matches!(self, Self::Hybrid | Self::Vector)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub proceeding_id: Option<String>,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
    #[serde(default)]
    pub top: Option<usize>,
    #[serde(default)]
    pub search_mode: SearchMode,
}

/// Per-hit relevance signals as reported by the index. Any subset may be
/// present depending on search mode and index capabilities.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Signals {
    #[serde(default)]
    pub keyword: Option<f32>,
    #[serde(default)]
    pub vector: Option<f32>,
    #[serde(default)]
    pub rerank: Option<f32>,
}

/// A raw index hit before rank fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub signals: Signals,
}

/// A single assembled result with its deterministic citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: String,
    pub title: String,
    pub abaer_citation: Option<String>,
    pub snippet: String,
    pub relevance_score: f32,
    pub page_number: u32,
    pub paragraph_number: Option<String>,
    pub citation_ref: String,
    pub parties: Vec<String>,
    pub regulatory_citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
}

/// Facets keyed by dimension name; `BTreeMap` keeps output order stable.
pub type Facets = BTreeMap<String, Vec<FacetValue>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total_count: usize,
    pub facets: Facets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    pub document_id: String,
    pub chunk_id: u32,
    #[serde(default)]
    pub context_window: u32,
}

/// One chunk in an expanded context window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub chunk_id: u32,
    pub page_number: u32,
    pub paragraph_number: Option<String>,
    pub content: String,
    pub is_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResponse {
    pub document_id: String,
    pub proceeding_id: String,
    pub title: String,
    pub citation_ref: String,
    pub chunks: Vec<ContextChunk>,
    pub page_range: PageRange,
}

/// Inclusive page span across the chunks actually returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "p.{}", self.first)
        } else {
            write!(f, "pp.{}-{}", self.first, self.last)
        }
    }
}
