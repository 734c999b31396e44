//! Cross-crate integration and E2E tests
//!
//! These tests verify that the store, search engine, and rationale
//! annotator work together correctly, end to end, from JSON artifacts
//! on disk through to an annotated result table.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use conceptvec_rationale::MockRationaleBackend;
use conceptvec_search::{SearchError, SearchOptions, most_similar, run_search, search};
use conceptvec_store::{ConceptStore, NO_DESCRIPTION};

/// Write a small embeddings + descriptions artifact pair and load it.
fn store_from_artifacts() -> ConceptStore {
    let dir = tempfile::tempdir().unwrap();

    let emb_path = dir.path().join("concept_glove.json");
    let mut f = std::fs::File::create(&emb_path).unwrap();
    write!(
        f,
        r#"{{
            "Gene_5071": [0.9, 0.1, 0.3],
            "Gene_6622": [0.2, 0.8, 0.4],
            "Chemical_MESH_D000068877": [0.7, 0.3, 0.6],
            "Disease_MESH_D010300": [0.1, 0.6, 0.9],
            "SNP_rs429358": [0.5, 0.5, 0.2]
        }}"#
    )
    .unwrap();

    let desc_path = dir.path().join("concept_descriptions.json");
    let mut f = std::fs::File::create(&desc_path).unwrap();
    write!(
        f,
        r#"{{
            "Gene_5071": "leucine rich repeat kinase 2",
            "Gene_6622": ["synuclein alpha", "SNCA"],
            "Chemical_MESH_D000068877": "imatinib mesylate",
            "Disease_MESH_D010300": "Parkinson disease"
        }}"#
    )
    .unwrap();

    ConceptStore::load(&emb_path, &desc_path).unwrap()
}

/// E2E: artifacts on disk -> seeded search -> ranked, mapped table.
#[test]
fn test_e2e_search_from_artifacts() {
    let store = store_from_artifacts();
    assert_eq!(store.size(), 5);
    assert_eq!(store.dim(), 3);

    let opts = SearchOptions::default()
        .with_samples(500)
        .with_threshold(0.5)
        .with_seed(42);
    let table = run_search(&store, "Gene_5071", &opts).unwrap();
    assert!(!table.is_empty());

    for row in table.rows() {
        assert_eq!(row.q, "Gene_5071");
        assert_eq!(row.q_mapped, "leucine rich repeat kinase 2");
        assert!(row.similarity >= 0.5);
        assert_ne!(row.d, row.q);
        assert_ne!(row.d, row.b);
        assert_ne!(row.d, row.c);
        // The SNP has no description registered.
        if row.d == "SNP_rs429358" {
            assert_eq!(row.d_mapped, NO_DESCRIPTION);
        }
    }
    for pair in table.rows().windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

/// The multi-valued description joins for display.
#[test]
fn test_multi_description_join_flows_into_rows() {
    let store = store_from_artifacts();
    assert_eq!(store.describe("Gene_6622"), "synuclein alpha or SNCA");

    let opts = SearchOptions::default()
        .with_samples(500)
        .with_threshold(0.0)
        .with_seed(8);
    let table = run_search(&store, "Gene_6622", &opts).unwrap();
    assert!(!table.is_empty());
    assert!(
        table.top().unwrap().equation_mapped.contains("(aka synuclein alpha or SNCA)")
    );
}

/// E2E: rationale annotation through the mock backend.
#[tokio::test]
async fn test_e2e_search_with_rationale() {
    let store = store_from_artifacts();
    let backend = Arc::new(MockRationaleBackend::with_text(
        "The kinase and the chemical share a signaling pathway.",
    ));

    let opts = SearchOptions::default()
        .with_samples(500)
        .with_threshold(0.5)
        .with_seed(42)
        .with_rationale(backend.clone());

    let table = search(&store, "Gene_5071", &opts).await.unwrap();
    assert!(!table.is_empty());
    assert_eq!(
        table.top().unwrap().rationale,
        "The kinase and the chemical share a signaling pathway."
    );
    for row in &table.rows()[1..] {
        assert_eq!(row.rationale, NO_DESCRIPTION);
    }
    assert_eq!(backend.request_count(), 1);
    // The backend saw the annotated equation, descriptions included.
    assert!(backend.requests()[0].contains("(aka"));
}

/// A slow rationale service cannot hang the search.
#[tokio::test]
async fn test_rationale_timeout_degrades() {
    use slow::SlowBackend;

    let store = store_from_artifacts();
    let backend = Arc::new(SlowBackend);

    let mut opts = SearchOptions::default()
        .with_samples(300)
        .with_threshold(0.5)
        .with_seed(42)
        .with_rationale(backend);
    opts.rationale_timeout = Duration::from_millis(50);

    let table = search(&store, "Gene_5071", &opts).await.unwrap();
    assert!(!table.is_empty());
    assert_eq!(table.top().unwrap().rationale, NO_DESCRIPTION);
}

/// Neighbor lookup from artifacts: ranked, described, query excluded.
#[test]
fn test_similar_concepts_from_artifacts() {
    let store = store_from_artifacts();

    let neighbors = most_similar(&store, "Gene_5071", 3).unwrap();
    assert_eq!(neighbors.len(), 3);
    assert!(neighbors.iter().all(|n| n.id != "Gene_5071"));
    for pair in neighbors.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }

    // Descriptions ride along; the undescribed SNP keeps the sentinel.
    let all = most_similar(&store, "Gene_5071", 10).unwrap();
    assert_eq!(all.len(), 4);
    let snp = all.iter().find(|n| n.id == "SNP_rs429358").unwrap();
    assert_eq!(snp.description, NO_DESCRIPTION);

    assert!(matches!(
        most_similar(&store, "Gene_0000", 3),
        Err(SearchError::QueryNotFound(_))
    ));
}

/// Unknown query resolves to a structured error, not a fault.
#[tokio::test]
async fn test_unknown_query_is_error_object_material() {
    let store = store_from_artifacts();
    let opts = SearchOptions::default().with_seed(1);
    let err = search(&store, "Gene_0000", &opts).await.unwrap_err();
    assert!(matches!(err, SearchError::QueryNotFound(_)));
    assert_eq!(err.to_string(), "Query concept not found: Gene_0000");
}

/// Serialized rows keep the caller-facing header names.
#[test]
fn test_result_table_wire_format() {
    let store = store_from_artifacts();
    let opts = SearchOptions::default()
        .with_samples(500)
        .with_threshold(0.0)
        .with_seed(4);
    let table = run_search(&store, "Disease_MESH_D010300", &opts).unwrap();
    assert!(!table.is_empty());

    let json = serde_json::to_value(&table).unwrap();
    let first = &json.as_array().unwrap()[0];
    for field in [
        "Equation",
        "Q",
        "B",
        "C",
        "D",
        "Equation (Mapped)",
        "Q (Mapped)",
        "B (Mapped)",
        "C (Mapped)",
        "D (Mapped)",
        "Similarity",
        "Rationale",
    ] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }
}

/// Minimal backend that never completes in time.
mod slow {
    use conceptvec_rationale::{RationaleBackend, Result};

    pub struct SlowBackend;

    #[async_trait::async_trait]
    impl RationaleBackend for SlowBackend {
        async fn explain(&self, _equation: &str) -> Result<String> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }
}
