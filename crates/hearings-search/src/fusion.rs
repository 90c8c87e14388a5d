//! Ranking Fuser: collapses per-hit relevance signals into one score.
//!
//! The fuser is a pure, deterministic function of the batch. Single-signal
//! batches are min-max normalized; multi-signal batches combine normalized
//! signals under configured weights (renormalized over the signals each hit
//! actually carries) and the combined scores get a final min-max pass, so
//! `relevance` always lands in [0, 1].
//!
//! Ordering is fully deterministic: score descending, then `page_number`
//! ascending, then `document_id` ascending. Never the index's arrival order.

use hearings_core::config::FusionWeights;
use hearings_core::types::{Chunk, ScoredChunk};

#[derive(Debug, Clone)]
pub struct FusedHit {
    pub chunk: Chunk,
    pub relevance: f32,
}

pub trait RankFuser: Send + Sync {
    fn fuse(&self, hits: &[ScoredChunk]) -> Vec<FusedHit>;
}

pub struct WeightedFuser {
    weights: FusionWeights,
}

impl WeightedFuser {
    pub fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }
}

/// Min/max of one signal over the batch, if any hit carries it.
fn signal_bounds(hits: &[ScoredChunk], get: impl Fn(&ScoredChunk) -> Option<f32>) -> Option<(f32, f32)> {
    let mut bounds: Option<(f32, f32)> = None;
    for h in hits {
        if let Some(v) = get(h) {
            bounds = Some(match bounds {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
    }
    bounds
}

fn normalize(v: f32, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        (v - lo) / (hi - lo)
    } else {
        // Degenerate batch: every present value identical.
        1.0
    }
}

impl RankFuser for WeightedFuser {
    fn fuse(&self, hits: &[ScoredChunk]) -> Vec<FusedHit> {
        if hits.is_empty() {
            return Vec::new();
        }

        let keyword_bounds = signal_bounds(hits, |h| h.signals.keyword);
        let vector_bounds = signal_bounds(hits, |h| h.signals.vector);
        let rerank_bounds = signal_bounds(hits, |h| h.signals.rerank);

        let combined: Vec<f32> = hits
            .iter()
            .map(|h| {
                let mut weighted = 0.0f32;
                let mut weight_sum = 0.0f32;
                if let (Some(v), Some(b)) = (h.signals.keyword, keyword_bounds) {
                    weighted += self.weights.keyword * normalize(v, b);
                    weight_sum += self.weights.keyword;
                }
                if let (Some(v), Some(b)) = (h.signals.vector, vector_bounds) {
                    weighted += self.weights.vector * normalize(v, b);
                    weight_sum += self.weights.vector;
                }
                if let (Some(v), Some(b)) = (h.signals.rerank, rerank_bounds) {
                    weighted += self.weights.rerank * normalize(v, b);
                    weight_sum += self.weights.rerank;
                }
                if weight_sum > 0.0 {
                    weighted / weight_sum
                } else {
                    0.0
                }
            })
            .collect();

        // Final pass keeps the top hit at 1.0 regardless of how many
        // signal kinds contributed.
        let lo = combined.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = combined.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let mut fused: Vec<FusedHit> = hits
            .iter()
            .zip(combined)
            .map(|(h, score)| FusedHit {
                chunk: h.chunk.clone(),
                relevance: normalize(score, (lo, hi)),
            })
            .collect();

        fused.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.chunk.page_number.cmp(&b.chunk.page_number))
                .then_with(|| a.chunk.document_id.cmp(&b.chunk.document_id))
        });
        fused
    }
}
