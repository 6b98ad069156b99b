use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use fda_signal::{
    data::openfda::{CountQueryClient, ReportCount},
    error::FetchError,
};

pub const DRUG_FIELD: &str = "patient.drug.medicinalproduct.exact";
pub const DRUG_SEARCH_FIELD: &str = "patient.drug.medicinalproduct";
pub const REACTION_FIELD: &str = "patient.reaction.reactionmeddrapt.exact";

/// Canned count responses keyed by (search, group-by field). Unknown queries
/// answer with no buckets, like an OpenFDA 404.
#[derive(Default, Clone)]
pub struct FakeCounts {
    responses: HashMap<(String, String), Vec<ReportCount>>,
    total: u64,
    pub seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeCounts {
    pub fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn respond(mut self, search: &str, field: &str, buckets: &[(&str, u64)]) -> Self {
        self.responses.insert(
            (search.to_string(), field.to_string()),
            buckets
                .iter()
                .map(|(term, count)| ReportCount::new(*term, *count))
                .collect(),
        );
        self
    }

    pub fn queries(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CountQueryClient for FakeCounts {
    async fn query_counts(
        &self,
        search_filter: &str,
        group_by_field: &str,
    ) -> Result<Vec<ReportCount>, FetchError> {
        let key = (search_filter.to_string(), group_by_field.to_string());
        self.seen.lock().unwrap().push(key.clone());
        Ok(self.responses.get(&key).cloned().unwrap_or_default())
    }

    async fn total_report_count(&self) -> Result<u64, FetchError> {
        Ok(self.total)
    }
}

pub fn drug_clause(drug: &str) -> String {
    format!("{DRUG_SEARCH_FIELD}:\"{drug}\"")
}

pub fn reaction_clause(reaction: &str) -> String {
    format!("{REACTION_FIELD}:\"{reaction}\"")
}

pub fn pair_clause(drug: &str, reaction: &str) -> String {
    format!("{} AND {}", drug_clause(drug), reaction_clause(reaction))
}

/// NEXLETOL / NAUSEA VOMITING counts that yield the table (10, 90, 5, 9895).
pub fn nexletol_fixture() -> FakeCounts {
    FakeCounts::with_total(10_000)
        .respond(
            &pair_clause("NEXLETOL", "NAUSEA VOMITING"),
            REACTION_FIELD,
            &[("NAUSEA VOMITING", 10), ("MYALGIA", 4)],
        )
        .respond(
            &drug_clause("NEXLETOL"),
            DRUG_FIELD,
            &[("NEXLETOL", 100), ("ASPIRIN", 20)],
        )
        .respond(
            &reaction_clause("NAUSEA VOMITING"),
            REACTION_FIELD,
            &[("nausea vomiting", 15), ("DIARRHOEA", 3)],
        )
}
