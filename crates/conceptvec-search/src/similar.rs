//! Nearest-concept lookup.
//!
//! Ranks the whole store by cosine similarity to one query concept's own
//! embedding. This is the resolution step that precedes an analogy search:
//! a caller with an approximate concept in mind lists its neighbors, then
//! picks the exact stored id to use as `Q`.

use serde::{Deserialize, Serialize};

use conceptvec_store::ConceptStore;

use crate::error::{Result, SearchError};
use crate::rank::{row_norms, similarity_matrix, top_k_indices};

/// Default number of neighbors returned by [`most_similar`].
pub const DEFAULT_SIMILAR: usize = 10;

/// One stored concept ranked by similarity to the query concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarConcept {
    #[serde(rename = "Concept")]
    pub id: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Similarity")]
    pub similarity: f32,
}

/// The `top_k` stored concepts most similar to `query`, best first.
///
/// The query concept itself is omitted; its self-similarity of 1.0 tells
/// the caller nothing. Ties break by ascending store index, matching the
/// ranking used by the analogy search. Fails with
/// [`SearchError::QueryNotFound`] when the query id is absent.
pub fn most_similar(
    store: &ConceptStore,
    query: &str,
    top_k: usize,
) -> Result<Vec<SimilarConcept>> {
    let q_idx = store
        .index_of(query)
        .ok_or_else(|| SearchError::QueryNotFound(query.to_string()))?;

    let dim = store.dim();
    let q_vec = store.vector_at(q_idx);
    let q_norms = row_norms(q_vec, dim);
    let store_norms = row_norms(store.matrix(), dim);
    let sims = similarity_matrix(q_vec, &q_norms, store.matrix(), &store_norms, dim);

    // Over-fetch by one so dropping the query row still yields top_k.
    let neighbors = top_k_indices(&sims, top_k.saturating_add(1))
        .into_iter()
        .filter(|&idx| idx != q_idx)
        .take(top_k)
        .map(|idx| {
            let id = store.id_at(idx).to_string();
            SimilarConcept {
                description: store.describe(&id),
                similarity: sims[idx],
                id,
            }
        })
        .collect();

    tracing::debug!(query = query, top_k = top_k, "Similar-concept lookup complete");

    Ok(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fixture() -> ConceptStore {
        ConceptStore::from_parts(
            vec![
                ("Chemical_1".to_string(), vec![1.0, 0.0]),
                ("Disease_1".to_string(), vec![0.9, 0.1]),
                ("Gene_1".to_string(), vec![0.0, 1.0]),
                ("Gene_2".to_string(), vec![-1.0, 0.0]),
                ("SNP_1".to_string(), vec![0.7, 0.7]),
            ],
            HashMap::from([("Disease_1".to_string(), vec!["fibrosis".to_string()])]),
        )
        .unwrap()
    }

    #[test]
    fn test_neighbors_sorted_and_exclude_query() {
        let store = fixture();
        let neighbors = most_similar(&store, "Chemical_1", 4).unwrap();
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.iter().all(|n| n.id != "Chemical_1"));
        for pair in neighbors.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        // (0.9, 0.1) is the closest neighbor of (1.0, 0.0).
        assert_eq!(neighbors[0].id, "Disease_1");
        assert_eq!(neighbors[0].description, "fibrosis");
    }

    #[test]
    fn test_top_k_truncates() {
        let store = fixture();
        let neighbors = most_similar(&store, "Chemical_1", 2).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].id, "Disease_1");
    }

    #[test]
    fn test_top_k_larger_than_store() {
        let store = fixture();
        let neighbors = most_similar(&store, "Gene_1", 50).unwrap();
        // Everything except the query itself.
        assert_eq!(neighbors.len(), 4);
    }

    #[test]
    fn test_unknown_query_is_structured_error() {
        let store = fixture();
        assert!(matches!(
            most_similar(&store, "Gene_999", 5),
            Err(SearchError::QueryNotFound(_))
        ));
    }

    #[test]
    fn test_similarities_are_cosine() {
        let store = fixture();
        let neighbors = most_similar(&store, "SNP_1", 5).unwrap();
        let q = store.lookup("SNP_1").unwrap();
        for n in &neighbors {
            let v = store.lookup(&n.id).unwrap();
            let dot: f32 = q.iter().zip(v).map(|(a, b)| a * b).sum();
            let nq: f32 = q.iter().map(|x| x * x).sum::<f32>().sqrt();
            let nv: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((n.similarity - dot / (nq * nv)).abs() < 1e-6, "{}", n.id);
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let store = fixture();
        let neighbors = most_similar(&store, "Chemical_1", 1).unwrap();
        let json = serde_json::to_value(&neighbors[0]).unwrap();
        assert!(json.get("Concept").is_some());
        assert!(json.get("Description").is_some());
        assert!(json.get("Similarity").is_some());
    }
}
