//! Facet Aggregator.
//!
//! Counts distinct values per filter dimension over the full matched
//! population (pre-`top` truncation), honoring the same access predicate as
//! the results: a facet count must never reveal inaccessible material.

use std::collections::HashMap;

use hearings_core::traits::{FacetDimension, FacetSource, FacetSpec};
use hearings_core::types::{FacetValue, Facets, SecurityPredicate};

pub fn aggregate(
    matched: &[FacetSource],
    predicate: &SecurityPredicate,
    spec: &FacetSpec,
) -> Facets {
    let accessible: Vec<&FacetSource> = matched
        .iter()
        .filter(|m| predicate.allows(m.confidentiality_level, &m.parties))
        .collect();

    let mut facets = Facets::new();
    for dimension in &spec.dimensions {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &accessible {
            match dimension {
                FacetDimension::DocumentType => {
                    *counts.entry(row.document_type.as_str()).or_insert(0) += 1;
                }
                FacetDimension::Parties => {
                    for party in &row.parties {
                        *counts.entry(party.as_str()).or_insert(0) += 1;
                    }
                }
                FacetDimension::RegulatoryCitations => {
                    for cite in &row.regulatory_citations {
                        *counts.entry(cite.as_str()).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut values: Vec<FacetValue> = counts
            .into_iter()
            .map(|(value, count)| FacetValue {
                value: value.to_string(),
                count,
            })
            .collect();
        // Count descending, ties alphabetical, so output is reproducible.
        values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        values.truncate(spec.max_values_per_dimension);

        facets.insert(dimension.as_str().to_string(), values);
    }
    facets
}

/// Accessible population size, used as the response's `total_count` so the
/// reported total can never disagree with what the predicate permits.
pub fn accessible_count(matched: &[FacetSource], predicate: &SecurityPredicate) -> usize {
    matched
        .iter()
        .filter(|m| predicate.allows(m.confidentiality_level, &m.parties))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearings_core::types::{ConfidentialityLevel, DocumentType, PartyMatch, ProtectedAccess};

    fn row(
        document_type: DocumentType,
        level: ConfidentialityLevel,
        parties: &[&str],
        cites: &[&str],
    ) -> FacetSource {
        FacetSource {
            document_type,
            confidentiality_level: level,
            parties: parties.iter().map(|p| (*p).to_string()).collect(),
            regulatory_citations: cites.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    fn public_only() -> SecurityPredicate {
        SecurityPredicate::Restricted {
            protected_a: ProtectedAccess::Denied,
            party_match: PartyMatch::CaseSensitive,
        }
    }

    #[test]
    fn inaccessible_rows_never_counted() {
        let matched = vec![
            row(DocumentType::Evidence, ConfidentialityLevel::Public, &["Acme Co"], &[]),
            row(DocumentType::Evidence, ConfidentialityLevel::Confidential, &["Acme Co"], &[]),
            row(DocumentType::Decision, ConfidentialityLevel::ProtectedA, &["Acme Co"], &[]),
        ];
        let facets = aggregate(&matched, &public_only(), &FacetSpec::default());
        let types = &facets["document_type"];
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].value, "evidence");
        assert_eq!(types[0].count, 1);
        assert_eq!(accessible_count(&matched, &public_only()), 1);
    }

    #[test]
    fn counts_sorted_descending_then_alphabetical() {
        let matched = vec![
            row(DocumentType::Transcript, ConfidentialityLevel::Public, &["Beta", "Alpha"], &[]),
            row(DocumentType::Transcript, ConfidentialityLevel::Public, &["Alpha"], &[]),
            row(DocumentType::Transcript, ConfidentialityLevel::Public, &["Beta"], &[]),
            row(DocumentType::Transcript, ConfidentialityLevel::Public, &["Gamma"], &[]),
        ];
        let facets = aggregate(&matched, &SecurityPredicate::Unrestricted, &FacetSpec::default());
        let parties = &facets["parties"];
        assert_eq!(parties[0].value, "Alpha");
        assert_eq!(parties[0].count, 2);
        assert_eq!(parties[1].value, "Beta");
        assert_eq!(parties[1].count, 2);
        assert_eq!(parties[2].value, "Gamma");
        assert_eq!(parties[2].count, 1);
    }

    #[test]
    fn dimension_sum_covers_contributing_rows() {
        let matched = vec![
            row(DocumentType::Notice, ConfidentialityLevel::Public, &[], &["REDA s. 34"]),
            row(DocumentType::Notice, ConfidentialityLevel::Public, &[], &["REDA s. 34", "Directive 056"]),
        ];
        let facets = aggregate(&matched, &SecurityPredicate::Unrestricted, &FacetSpec::default());
        let total: usize = facets["regulatory_citations"].iter().map(|f| f.count).sum();
        assert!(total >= 2);
    }
}
