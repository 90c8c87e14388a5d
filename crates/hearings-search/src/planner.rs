//! Query Planner: composes the user query, client filters, and the security
//! predicate into a single index request.
//!
//! All client-input validation happens here, before any collaborator call.
//! The security predicate arrives as a constructor argument of the filter,
//! so a plan without one cannot exist.

use hearings_core::config::SearchConfig;
use hearings_core::error::{Error, Result};
use hearings_core::traits::{FacetSpec, IndexFilter, IndexQuery};
use hearings_core::types::{SearchRequest, SecurityPredicate};

/// A validated plan. `needs_embedding` tells the service whether to call
/// the embedding collaborator before dispatching to the index.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub query: IndexQuery,
    pub keyword_text: String,
    pub needs_embedding: bool,
}

pub fn plan(
    request: &SearchRequest,
    predicate: SecurityPredicate,
    config: &SearchConfig,
) -> Result<QueryPlan> {
    let query_text = request.query.trim();
    if query_text.is_empty() {
        return Err(Error::EmptyQuery);
    }

    let filters = request.filters.clone().unwrap_or_default();
    if let (Some(from), Some(to)) = (filters.date_from, filters.date_to) {
        if from > to {
            return Err(Error::MalformedFilter(format!(
                "date_from {from} is after date_to {to}"
            )));
        }
    }

    let top = request
        .top
        .unwrap_or(config.default_top)
        .clamp(1, config.max_top);

    // Client filters first, security predicate last. The predicate is a
    // required field of the filter and can never be dropped.
    let filter = IndexFilter {
        proceeding_id: request.proceeding_id.clone(),
        document_types: filters.document_types.unwrap_or_default(),
        parties: filters.parties.unwrap_or_default(),
        regulatory_citations: filters.regulatory_citations.unwrap_or_default(),
        date_from: filters.date_from,
        date_to: filters.date_to,
        security: predicate,
    };

    let mode = request.search_mode;
    Ok(QueryPlan {
        query: IndexQuery {
            text: mode.wants_keyword().then(|| query_text.to_string()),
            vector: None,
            filter,
            top,
            // Facets are always requested so the aggregator has population
            // data even when the caller ignores them.
            facets: FacetSpec::default(),
        },
        keyword_text: query_text.to_string(),
        needs_embedding: mode.wants_vector(),
    })
}
