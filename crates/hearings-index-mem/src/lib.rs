//! In-memory reference implementations of the index and embedding
//! collaborators.
//!
//! These are honest implementations of the traits, not mocks: the index
//! evaluates the composed filter (security predicate included), scores a
//! keyword and a vector signal per hit, and reports the full matched
//! population for facet aggregation. Everything is deterministic, so tests
//! and the demo CLI are reproducible without a model or an index service.
//!
//! Call counters let tests assert that validation failures never reach the
//! collaborators.

#![deny(warnings)]
#![deny(unused_imports)]

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use twox_hash::XxHash64;

use hearings_core::traits::{Embedder, FacetSource, IndexQuery, IndexResponse, SearchIndex};
use hearings_core::types::{Chunk, ScoredChunk, Signals};

/// Deterministic bag-of-words embedder: tokens hash (XxHash64, seed 0) into
/// a fixed number of buckets, L2-normalized. Stands in for the real
/// embedding collaborator wherever reproducibility matters more than
/// semantics.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dim];
        for token in tokens(text) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dim;
            vector[bucket] += 1.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Keyword signal: total occurrences of query terms in the chunk content.
fn keyword_score(content: &str, query: &str) -> f32 {
    let content = content.to_lowercase();
    let mut score = 0.0f32;
    for term in tokens(query) {
        score += content.matches(&term).count() as f32;
    }
    score
}

pub struct MemoryIndex {
    chunks: Vec<Chunk>,
    embeddings: HashMap<String, Vec<f32>>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    exists_calls: AtomicUsize,
}

impl MemoryIndex {
    /// Index a corpus, embedding each chunk's content with `embedder`.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> anyhow::Result<Self> {
        let mut embeddings = HashMap::with_capacity(chunks.len());
        for chunk in &chunks {
            let vector = embedder.embed(&chunk.content).await?;
            embeddings.insert(chunk.id.clone(), vector);
        }
        Ok(Self {
            chunks,
            embeddings,
            search_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            exists_calls: AtomicUsize::new(0),
        })
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total collaborator calls of any kind, for no-upstream-call tests.
    pub fn total_calls(&self) -> usize {
        self.search_calls() + self.fetch_calls() + self.exists_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn search(&self, query: &IndexQuery) -> anyhow::Result<IndexResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let matched_chunks: Vec<&Chunk> = self
            .chunks
            .iter()
            .filter(|c| query.filter.matches(c))
            .collect();
        let matched: Vec<FacetSource> = matched_chunks.iter().copied().map(FacetSource::of).collect();
        let total_count = matched_chunks.len();

        let mut hits: Vec<ScoredChunk> = matched_chunks
            .into_iter()
            .filter_map(|chunk| {
                let keyword = query.text.as_deref().map(|q| keyword_score(&chunk.content, q));
                let vector = query
                    .vector
                    .as_deref()
                    .and_then(|qv| self.embeddings.get(&chunk.id).map(|cv| cosine(qv, cv)));
                // A hit needs at least one positive signal; a keyword-only
                // query does not return chunks with no term overlap.
                let keyword = keyword.filter(|s| *s > 0.0);
                if keyword.is_none() && vector.is_none() {
                    return None;
                }
                Some(ScoredChunk {
                    chunk: chunk.clone(),
                    signals: Signals {
                        keyword,
                        vector,
                        rerank: None,
                    },
                })
            })
            .collect();

        // The index's own ordering: best single signal, ties by chunk id.
        // Rank fusion downstream re-orders; this just picks the top-k.
        hits.sort_by(|a, b| {
            let sa = best_signal(&a.signals);
            let sb = best_signal(&b.signals);
            sb.total_cmp(&sa).then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        hits.truncate(query.top);

        Ok(IndexResponse {
            hits,
            matched,
            total_count,
        })
    }

    async fn fetch_chunk_range(
        &self,
        document_id: &str,
        range: RangeInclusive<u32>,
    ) -> anyhow::Result<Vec<Chunk>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let mut chunks: Vec<Chunk> = self
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id && range.contains(&c.chunk_id))
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.chunk_id);
        Ok(chunks)
    }

    async fn proceeding_exists(&self, proceeding_id: &str) -> anyhow::Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chunks.iter().any(|c| c.proceeding_id == proceeding_id))
    }
}

fn best_signal(signals: &Signals) -> f32 {
    let mut best = f32::NEG_INFINITY;
    for s in [signals.keyword, signals.vector, signals.rerank].into_iter().flatten() {
        best = best.max(s);
    }
    best
}

/// Load a corpus from a JSON file containing an array of chunks.
pub fn load_corpus(path: &Path) -> anyhow::Result<Vec<Chunk>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read corpus {}: {e}", path.display()))?;
    let chunks: Vec<Chunk> = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse corpus {}: {e}", path.display()))?;
    Ok(chunks)
}
