use fda_signal::{
    data::openfda::ReportCount,
    signals::terms::{normalize_term, select_count, terms_match},
};

#[test]
fn multi_part_meddra_term_is_normalised_before_matching() {
    assert_eq!(normalize_term("NAUSEA/VOMITING"), "NAUSEA VOMITING");
    assert!(terms_match("NAUSEA/VOMITING", "nausea vomiting"));
    assert!(terms_match("nausea", "NAUSEA"));
    assert!(!terms_match("NAUSEA", "NAUSEA VOMITING"));
}

#[test]
fn bucket_lookup_is_case_insensitive() {
    let buckets = vec![
        ReportCount::new("MYALGIA", 31),
        ReportCount::new("NAUSEA", 12),
    ];
    assert_eq!(select_count(&buckets, "nausea"), Some(12));
    assert_eq!(select_count(&buckets, "Headache"), None);
}
