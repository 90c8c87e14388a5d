//! Access Predicate Builder.
//!
//! Turns resolved requester claims into the [`SecurityPredicate`] that is
//! conjoined with every retrieval request. Pure and deterministic: the same
//! claims always yield the same predicate, with no I/O, which keeps the
//! security boundary unit-testable without a live index.
//!
//! Access rules, in precedence order:
//! 1. `Hearing_Panel` sees everything, including confidential.
//! 2. Everyone else: confidential is excluded unconditionally.
//! 3. Protected A is visible to `AER_Staff`, or to a requester whose
//!    `party_affiliation` matches one of the chunk's parties.
//! 4. Public is visible to all.
//!
//! Insufficient access is never an error here. Disallowed chunks are
//! silently excluded downstream so that search cannot confirm the existence
//! of material the requester is not cleared for.

use hearings_core::types::{
    Chunk, PartyMatch, ProtectedAccess, RequesterClaims, SecurityPredicate,
};

/// Build the security predicate for one request.
pub fn build_predicate(claims: &RequesterClaims, party_match: PartyMatch) -> SecurityPredicate {
    if claims.has_role(RequesterClaims::ROLE_HEARING_PANEL) {
        return SecurityPredicate::Unrestricted;
    }

    let protected_a = if claims.has_role(RequesterClaims::ROLE_AER_STAFF) {
        ProtectedAccess::All
    } else {
        match &claims.party_affiliation {
            Some(party) if !party.trim().is_empty() => ProtectedAccess::OwnParty(party.clone()),
            _ => ProtectedAccess::Denied,
        }
    };

    SecurityPredicate::Restricted {
        protected_a,
        party_match,
    }
}

/// Direct-access check for by-id operations (context expansion).
///
/// Search silently filters; direct fetch denies. That asymmetry is
/// deliberate and must not be unified.
pub fn can_access_chunk(
    claims: &RequesterClaims,
    chunk: &Chunk,
    party_match: PartyMatch,
) -> bool {
    build_predicate(claims, party_match).allows_chunk(chunk)
}
