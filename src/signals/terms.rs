//! Term normalisation and matching against aggregation buckets.

use strsim::jaro_winkler;

use crate::data::openfda::ReportCount;

/// Normalise a MedDRA preferred term or drug name for comparison.
///
/// Multi-part MedDRA terms carry `^` and `/` separators (`NAUSEA/VOMITING`);
/// both become a space, runs of whitespace collapse and the ends are trimmed.
pub fn normalize_term(term: &str) -> String {
    term.replace(['^', '/'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive equality after normalisation.
pub fn terms_match(left: &str, right: &str) -> bool {
    normalize_term(left).eq_ignore_ascii_case(&normalize_term(right))
}

/// Count of the bucket whose term matches `term`, summed if the backend
/// returned several spellings that normalise to the same term.
pub fn select_count(counts: &[ReportCount], term: &str) -> Option<u64> {
    let wanted = normalize_term(term);
    counts
        .iter()
        .filter(|bucket| normalize_term(&bucket.term).eq_ignore_ascii_case(&wanted))
        .map(|bucket| bucket.count)
        .reduce(|acc, count| acc + count)
}

/// Returned term most similar to `term`, for diagnosing failed matches.
pub fn closest_term(counts: &[ReportCount], term: &str) -> Option<String> {
    let target = normalize_term(term).to_ascii_lowercase();
    counts
        .iter()
        .map(|bucket| {
            let candidate = normalize_term(&bucket.term).to_ascii_lowercase();
            (jaro_winkler(&target, &candidate), &bucket.term)
        })
        .filter(|(score, _)| *score > 0.7)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, term)| term.clone())
}

/// Build an exact-term search clause: `field:"VALUE"`.
pub fn exact_clause(field: &str, value: &str) -> String {
    let value = value.trim().to_ascii_uppercase();
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{field}:\"{escaped}\"")
}
