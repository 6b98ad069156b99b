//! Turns per-term count aggregations into contingency tables.
//!
//! OpenFDA can only group by one field per query, so every count is read by
//! scanning a ranked bucket list for the requested term.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    data::openfda::{CountQueryClient, ReportCount},
    error::{FetchError, SignalError},
};

use super::{
    table::ContingencyTable,
    terms::{closest_term, exact_clause, normalize_term, select_count},
    trend::ReactionTrend,
};

/// Fields used to scope and group count queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountFields {
    /// Grouping field for drug buckets; `.exact` keeps each stored spelling.
    pub drug: String,
    /// Analysed drug field used in search filters, matched case-insensitively
    /// by the backend.
    pub drug_search: String,
    pub reaction: String,
    pub receive_date: String,
}

impl Default for CountFields {
    fn default() -> Self {
        Self {
            drug: "patient.drug.medicinalproduct.exact".to_string(),
            drug_search: "patient.drug.medicinalproduct".to_string(),
            reaction: "patient.reaction.reactionmeddrapt.exact".to_string(),
            receive_date: "receivedate".to_string(),
        }
    }
}

/// Count lookups over an injected [`CountQueryClient`].
pub struct Aggregator<'a, C: CountQueryClient + ?Sized> {
    client: &'a C,
    fields: CountFields,
}

impl<'a, C: CountQueryClient + ?Sized> Aggregator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self::with_fields(client, CountFields::default())
    }

    pub fn with_fields(client: &'a C, fields: CountFields) -> Self {
        Self { client, fields }
    }

    pub fn fields(&self) -> &CountFields {
        &self.fields
    }

    /// Total reports in the database right now.
    pub async fn grand_total(&self) -> Result<u64, FetchError> {
        self.client.total_report_count().await
    }

    /// Reports naming `drug`, regardless of reaction. Zero when no bucket
    /// matches. Buckets differing only in case are summed.
    pub async fn count_drug_total(&self, drug: &str) -> Result<u64, FetchError> {
        let search = self.drug_clause(drug);
        let buckets = self.client.query_counts(&search, &self.fields.drug).await?;
        Ok(select_count(&buckets, drug).unwrap_or(0))
    }

    /// Reports naming `reaction`, regardless of drug. Zero when no bucket
    /// matches.
    pub async fn count_reaction_total(&self, reaction: &str) -> Result<u64, FetchError> {
        let reaction = normalize_term(reaction);
        let search = exact_clause(&self.fields.reaction, &reaction);
        let buckets = self
            .client
            .query_counts(&search, &self.fields.reaction)
            .await?;
        Ok(select_count(&buckets, &reaction).unwrap_or(0))
    }

    /// Reports naming both. `None` when the reaction-grouped breakdown holds
    /// no matching term, which is not the same as a zero count.
    pub async fn count_co_occurrence(
        &self,
        drug: &str,
        reaction: &str,
    ) -> Result<Option<u64>, FetchError> {
        let buckets = self.co_occurrence_buckets(drug, reaction).await?;
        Ok(select_count(&buckets, reaction))
    }

    fn drug_clause(&self, drug: &str) -> String {
        exact_clause(&self.fields.drug_search, drug)
    }

    async fn co_occurrence_buckets(
        &self,
        drug: &str,
        reaction: &str,
    ) -> Result<Vec<ReportCount>, FetchError> {
        let search = format!(
            "{} AND {}",
            self.drug_clause(drug),
            exact_clause(&self.fields.reaction, &normalize_term(reaction))
        );
        self.client
            .query_counts(&search, &self.fields.reaction)
            .await
    }

    /// Build the contingency table for one (drug, reaction) pair.
    pub async fn build_table(
        &self,
        drug: &str,
        reaction: &str,
        grand_total: u64,
    ) -> Result<ContingencyTable, SignalError> {
        let buckets = self.co_occurrence_buckets(drug, reaction).await?;
        let Some(a) = select_count(&buckets, reaction) else {
            let closest = closest_term(&buckets, reaction);
            warn!(%drug, %reaction, ?closest, "co-occurrence term not found");
            return Err(SignalError::TermMatching {
                drug: drug.to_string(),
                reaction: reaction.to_string(),
                closest,
            });
        };

        let (drug_total, reaction_total) = futures::try_join!(
            self.count_drug_total(drug),
            self.count_reaction_total(reaction)
        )?;
        debug!(%drug, %reaction, a, drug_total, reaction_total, grand_total, "aggregated counts");

        Ok(ContingencyTable::from_marginals(
            a,
            drug_total,
            reaction_total,
            grand_total,
        )?)
    }

    /// Most reported reactions among reports naming `drug`, ranked by count.
    pub async fn top_reactions(&self, drug: &str, n: usize) -> Result<Vec<ReportCount>, FetchError> {
        let search = self.drug_clause(drug);
        let mut buckets = self
            .client
            .query_counts(&search, &self.fields.reaction)
            .await?;
        buckets.truncate(n);
        Ok(buckets)
    }

    /// Reports naming `reaction` received between `from` and `to`, per year.
    pub async fn reaction_trend(
        &self,
        reaction: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ReactionTrend, FetchError> {
        let reaction = normalize_term(reaction);
        let search = format!(
            "{}:[{} TO {}] AND {}",
            self.fields.receive_date,
            from.format("%Y%m%d"),
            to.format("%Y%m%d"),
            exact_clause(&self.fields.reaction, &reaction)
        );
        let daily = self
            .client
            .query_counts(&search, &self.fields.receive_date)
            .await?;
        Ok(ReactionTrend::from_daily_counts(reaction, &daily))
    }
}
