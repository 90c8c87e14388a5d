use hearings_access::build_predicate;
use hearings_core::types::{ConfidentialityLevel, PartyMatch, RequesterClaims};

fn claims(roles: &[&str], party: Option<&str>) -> RequesterClaims {
    RequesterClaims {
        roles: roles.iter().map(|r| (*r).to_string()).collect(),
        party_affiliation: party.map(str::to_string),
    }
}

/// Exhaustive role x confidentiality matrix. Rows are requester profiles,
/// columns are (public, protected_a-with-Acme, confidential).
#[test]
fn role_level_matrix() {
    let acme = vec!["Acme Co".to_string()];
    let cases: Vec<(RequesterClaims, [bool; 3])> = vec![
        (claims(&["Hearing_Panel"], None), [true, true, true]),
        (claims(&["AER_Staff"], None), [true, true, false]),
        (claims(&["Intervener"], Some("Acme Co")), [true, true, false]),
        (claims(&["Intervener"], None), [true, false, false]),
        (claims(&[], None), [true, false, false]),
    ];

    for (c, expected) in cases {
        let p = build_predicate(&c, PartyMatch::CaseSensitive);
        assert_eq!(
            p.allows(ConfidentialityLevel::Public, &acme),
            expected[0],
            "public for {c:?}"
        );
        assert_eq!(
            p.allows(ConfidentialityLevel::ProtectedA, &acme),
            expected[1],
            "protected_a for {c:?}"
        );
        assert_eq!(
            p.allows(ConfidentialityLevel::Confidential, &acme),
            expected[2],
            "confidential for {c:?}"
        );
    }
}

#[test]
fn intervener_sees_only_own_party_protected_a() {
    let p = build_predicate(
        &claims(&["Intervener"], Some("Acme Co")),
        PartyMatch::CaseSensitive,
    );
    assert!(p.allows(ConfidentialityLevel::ProtectedA, &["Acme Co".to_string()]));
    assert!(!p.allows(ConfidentialityLevel::ProtectedA, &["OtherCo".to_string()]));
    assert!(p.allows(
        ConfidentialityLevel::ProtectedA,
        &["OtherCo".to_string(), "Acme Co".to_string()]
    ));
}

/// Pins the documented default: party comparison is case-sensitive.
#[test]
fn party_match_is_case_sensitive_by_default() {
    let p = build_predicate(
        &claims(&["Intervener"], Some("acme co")),
        PartyMatch::default(),
    );
    assert!(!p.allows(ConfidentialityLevel::ProtectedA, &["Acme Co".to_string()]));
}

#[test]
fn case_insensitive_mode_widens_party_match_only() {
    let p = build_predicate(
        &claims(&["Intervener"], Some("acme co")),
        PartyMatch::CaseInsensitive,
    );
    assert!(p.allows(ConfidentialityLevel::ProtectedA, &["Acme Co".to_string()]));
    assert!(!p.allows(ConfidentialityLevel::Confidential, &["Acme Co".to_string()]));
}
