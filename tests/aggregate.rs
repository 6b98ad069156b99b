mod common;

use common::{
    drug_clause, nexletol_fixture, pair_clause, reaction_clause, FakeCounts, DRUG_FIELD,
    REACTION_FIELD,
};
use fda_signal::{
    error::{AggregationError, SignalError},
    signals::{self, Aggregator, ContingencyTable},
};

#[tokio::test]
async fn builds_reference_table_from_case_mismatched_terms() {
    let client = nexletol_fixture();
    let aggregator = Aggregator::new(&client);

    let table = aggregator
        .build_table("Nexletol", "Nausea/Vomiting", 10_000)
        .await
        .unwrap();
    assert_eq!(table, ContingencyTable::new(10, 90, 5, 9895));

    let queries = client.queries();
    assert!(queries.contains(&(
        pair_clause("NEXLETOL", "NAUSEA VOMITING"),
        REACTION_FIELD.to_string()
    )));
    assert!(queries.contains(&(drug_clause("NEXLETOL"), DRUG_FIELD.to_string())));
}

#[tokio::test]
async fn missing_co_occurrence_term_is_not_zero() {
    let client = FakeCounts::with_total(1_000)
        .respond(
            &pair_clause("NEXLETOL", "MYALGIAS"),
            REACTION_FIELD,
            &[("MYALGIA", 12)],
        )
        .respond(&drug_clause("NEXLETOL"), DRUG_FIELD, &[("NEXLETOL", 100)]);
    let aggregator = Aggregator::new(&client);

    assert_eq!(
        aggregator
            .count_co_occurrence("NEXLETOL", "MYALGIAS")
            .await
            .unwrap(),
        None
    );

    let err = aggregator
        .build_table("NEXLETOL", "MYALGIAS", 1_000)
        .await
        .unwrap_err();
    match err {
        SignalError::TermMatching {
            drug,
            reaction,
            closest,
        } => {
            assert_eq!(drug, "NEXLETOL");
            assert_eq!(reaction, "MYALGIAS");
            assert_eq!(closest.as_deref(), Some("MYALGIA"));
        }
        other => panic!("expected TermMatching, got {other:?}"),
    }
}

#[tokio::test]
async fn drug_total_sums_spellings_that_differ_in_case() {
    let client = FakeCounts::with_total(10_000).respond(
        "patient.drug.medicinalproduct:\"NEXLETOL\"",
        DRUG_FIELD,
        &[("NEXLETOL", 80), ("Nexletol", 15), ("nexletol", 5), ("ASPIRIN", 20)],
    );
    let aggregator = Aggregator::new(&client);

    assert_eq!(aggregator.count_drug_total("Nexletol").await.unwrap(), 100);
    assert_eq!(
        client.queries(),
        vec![(
            "patient.drug.medicinalproduct:\"NEXLETOL\"".to_string(),
            DRUG_FIELD.to_string()
        )]
    );
}

#[tokio::test]
async fn unknown_drug_has_zero_total() {
    let client = FakeCounts::with_total(1_000);
    let aggregator = Aggregator::new(&client);
    assert_eq!(aggregator.count_drug_total("NOSUCHDRUG").await.unwrap(), 0);
    assert_eq!(aggregator.count_reaction_total("NOSUCHPT").await.unwrap(), 0);
}

#[tokio::test]
async fn inconsistent_upstream_counts_abort_the_table() {
    let client = FakeCounts::with_total(1_000)
        .respond(
            &pair_clause("DRUGX", "RASH"),
            REACTION_FIELD,
            &[("RASH", 5)],
        )
        .respond(&drug_clause("DRUGX"), DRUG_FIELD, &[("DRUGX", 5)])
        .respond(&reaction_clause("RASH"), REACTION_FIELD, &[("RASH", 3)]);
    let aggregator = Aggregator::new(&client);

    let err = aggregator.build_table("DRUGX", "RASH", 1_000).await.unwrap_err();
    assert!(matches!(
        err,
        SignalError::Aggregation(AggregationError::CoOccurrenceExceedsReactionTotal {
            a: 5,
            reaction_total: 3
        })
    ));
}

#[tokio::test]
async fn reactions_are_scored_in_order_with_pair_context() {
    let client = nexletol_fixture();
    let aggregator = Aggregator::new(&client);
    let grand_total = aggregator.grand_total().await.unwrap();

    let reactions = vec![
        "NAUSEA/VOMITING".to_string(),
        "HEADACHE".to_string(),
        "nausea vomiting".to_string(),
    ];
    let results =
        signals::evaluate_reactions(&aggregator, "NEXLETOL", &reactions, grand_total, 4).await;
    assert_eq!(results.len(), 2, "duplicate spelling is scored once");

    let row = results[0].as_ref().unwrap();
    assert_eq!(row.reaction, "NAUSEA/VOMITING");
    assert!((row.ror.as_ref().unwrap().estimate - 219.8889).abs() < 1e-3);
    assert!((row.prr.as_ref().unwrap().estimate - 198.0).abs() < 1e-3);
    assert!(row.is_signal());

    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.drug, "NEXLETOL");
    assert_eq!(err.reaction, "HEADACHE");
    assert!(matches!(err.source, SignalError::TermMatching { .. }));
}

#[tokio::test]
async fn top_reactions_are_truncated_in_rank_order() {
    let client = FakeCounts::with_total(1_000).respond(
        &drug_clause("NEXLETOL"),
        REACTION_FIELD,
        &[("MYALGIA", 40), ("NAUSEA", 30), ("FATIGUE", 10)],
    );
    let aggregator = Aggregator::new(&client);
    let top = aggregator.top_reactions("nexletol", 2).await.unwrap();
    let terms: Vec<_> = top.iter().map(|bucket| bucket.term.as_str()).collect();
    assert_eq!(terms, vec!["MYALGIA", "NAUSEA"]);
}

#[tokio::test]
async fn reaction_trend_groups_receive_dates_by_year() {
    let search = format!(
        "receivedate:[20200101 TO 20231231] AND {}",
        reaction_clause("DEATH")
    );
    let client = FakeCounts::with_total(1_000).respond(
        &search,
        "receivedate",
        &[
            ("20200105", 10),
            ("20210105", 12),
            ("20220105", 14),
            ("20230105", 30),
            ("20230605", 10),
        ],
    );
    let aggregator = Aggregator::new(&client);
    let from = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let to = chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();

    let trend = aggregator.reaction_trend("death", from, to).await.unwrap();
    assert_eq!(
        trend.years,
        vec![(2020, 10), (2021, 12), (2022, 14), (2023, 40)]
    );
    assert!(trend.latest_z > 3.0);
}
