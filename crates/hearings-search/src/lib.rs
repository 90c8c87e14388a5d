//! Access-controlled hybrid retrieval over regulatory-hearing documents.
//!
//! The [`SearchService`] facade wires the pipeline together: claims become a
//! security predicate, the planner composes one index request, the fuser
//! collapses relevance signals, the assembler formats citations, and facets
//! are aggregated over the full matched population. Context expansion is a
//! separate direct-access operation with deny-on-restriction semantics.
//!
//! The service is stateless across requests; the only blocking points are
//! the two collaborator calls, each bounded by a timeout and cancelled by
//! dropping the future. No retries happen here.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod assemble;
pub mod context;
pub mod facets;
pub mod fusion;
pub mod planner;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info};

use hearings_access::build_predicate;
use hearings_core::config::SearchConfig;
use hearings_core::error::{Error, Result};
use hearings_core::traits::{Embedder, SearchIndex};
use hearings_core::types::{
    ContextRequest, ContextResponse, RequesterClaims, SearchRequest, SearchResponse,
};

use crate::fusion::{RankFuser, WeightedFuser};

pub struct SearchService<I, E> {
    index: Arc<I>,
    embedder: Arc<E>,
    config: SearchConfig,
    fuser: Box<dyn RankFuser>,
}

impl<I: SearchIndex, E: Embedder> SearchService<I, E> {
    pub fn new(index: Arc<I>, embedder: Arc<E>, config: SearchConfig) -> Self {
        let fuser = Box::new(WeightedFuser::new(config.fusion));
        Self {
            index,
            embedder,
            config,
            fuser,
        }
    }

    /// Swap the fusion policy. The replacement must stay pure and
    /// deterministic or result ordering stops being reproducible.
    pub fn with_fuser(mut self, fuser: Box<dyn RankFuser>) -> Self {
        self.fuser = fuser;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Execute one search request on behalf of `claims`.
    ///
    /// Inaccessible material is silently excluded, never reported as
    /// restricted; search cannot be used to confirm that a confidential
    /// document exists.
    pub async fn search(
        &self,
        request: &SearchRequest,
        claims: &RequesterClaims,
    ) -> Result<SearchResponse> {
        let predicate = build_predicate(claims, self.config.party_match);

        // Input validation happens before any collaborator call.
        let mut plan = planner::plan(request, predicate.clone(), &self.config)?;
        debug!(top = plan.query.top, mode = ?request.search_mode, "query planned");

        if let Some(pid) = &request.proceeding_id {
            let exists = self
                .bounded_index(self.index.proceeding_exists(pid))
                .await?;
            if !exists {
                return Err(Error::ProceedingNotFound(pid.clone()));
            }
        }

        if plan.needs_embedding {
            let vector = self
                .bounded(
                    self.config.embed_timeout_ms,
                    self.embedder.embed(&plan.keyword_text),
                    Error::EmbeddingUnavailable,
                )
                .await?;
            plan.query.vector = Some(vector);
        }

        let index_response = self.bounded_index(self.index.search(&plan.query)).await?;

        let fused = self.fuser.fuse(&index_response.hits);
        let results =
            assemble::assemble_results(fused, &plan.keyword_text, &predicate, &self.config);
        let facets = facets::aggregate(&index_response.matched, &predicate, &plan.query.facets);
        // Count from the locally re-checked population, not the index's
        // claim, so the total can never exceed what the predicate allows.
        let total_count = facets::accessible_count(&index_response.matched, &predicate);

        info!(
            roles = ?claims.roles,
            results = results.len(),
            total_count,
            "search completed"
        );

        Ok(SearchResponse {
            results,
            total_count,
            facets,
        })
    }

    /// Expand one hit into its surrounding chunks.
    pub async fn expand_context(
        &self,
        request: &ContextRequest,
        claims: &RequesterClaims,
    ) -> Result<ContextResponse> {
        let predicate = build_predicate(claims, self.config.party_match);
        let range = context::window_range(
            request.chunk_id,
            request.context_window,
            self.config.max_context_window,
        );

        let chunks = self
            .bounded_index(self.index.fetch_chunk_range(&request.document_id, range))
            .await?;

        let response = context::build_response(chunks, request, &predicate)?;
        info!(
            document_id = %request.document_id,
            chunk_id = request.chunk_id,
            returned = response.chunks.len(),
            "context expanded"
        );
        Ok(response)
    }

    async fn bounded_index<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T> {
        self.bounded(self.config.index_timeout_ms, fut, Error::IndexUnavailable)
            .await
    }

    /// Bound a collaborator call; elapse and failure both surface as the
    /// given retryable error. Dropping the future cancels the call.
    async fn bounded<T>(
        &self,
        timeout_ms: u64,
        fut: impl Future<Output = anyhow::Result<T>>,
        wrap: fn(String) -> Error,
    ) -> Result<T> {
        match timeout(Duration::from_millis(timeout_ms), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(wrap(e.to_string())),
            Err(_) => Err(wrap(format!("timed out after {timeout_ms}ms"))),
        }
    }
}
