//! Search orchestration.
//!
//! Wires the sampling, arithmetic, ranking, and filtering stages into the
//! single `search` entry point. The core pipeline is synchronous and
//! deterministic given a seed; the optional rationale annotation is the
//! only await point and is strictly best-effort.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use conceptvec_rationale::SharedRationaleBackend;
use conceptvec_store::{ConceptStore, NO_DESCRIPTION};

use crate::arithmetic::compute_d_batch;
use crate::error::{Result, SearchError};
use crate::rank::{row_norms, similarity_matrix, top_k_indices};
use crate::result::{CandidateResult, ResultTable, mapped_equation, symbolic_equation};
use crate::sample::generate_samples;

/// Default number of sampled `(B, C)` pairs per search.
pub const DEFAULT_SAMPLES: usize = 1000;

/// Default similarity threshold below which rows are dropped.
pub const DEFAULT_SIM_THRESHOLD: f32 = 0.80;

/// Candidates extracted per row. At most three indices (`Q`, `B`, `C`)
/// are ever excluded, so four candidates always leave a survivor when the
/// store holds at least four concepts. Stores smaller than that are
/// rejected up front instead of widening k.
pub const TOP_K: usize = 4;

/// Whether and how to annotate the top-ranked result with a rationale.
#[derive(Clone, Default)]
pub enum RationaleMode {
    /// No rationale requested; every row keeps the sentinel.
    #[default]
    None,
    /// Ask the given backend to explain the top row's mapped equation.
    Generate(SharedRationaleBackend),
}

impl std::fmt::Debug for RationaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RationaleMode::None => write!(f, "RationaleMode::None"),
            RationaleMode::Generate(backend) => {
                write!(f, "RationaleMode::Generate({})", backend.name())
            }
        }
    }
}

/// Parameters of one search invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Number of `(B, C)` pairs to sample.
    pub n: usize,

    /// Minimum similarity a row must reach to survive.
    pub sim_threshold: f32,

    /// Seed for the sampling RNG. `None` draws from OS entropy;
    /// fixing it makes the whole search reproducible.
    pub seed: Option<u64>,

    /// Rationale annotation mode.
    pub rationale: RationaleMode,

    /// Upper bound on the rationale call. On expiry the row keeps the
    /// sentinel and the search still succeeds.
    pub rationale_timeout: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            n: DEFAULT_SAMPLES,
            sim_threshold: DEFAULT_SIM_THRESHOLD,
            seed: None,
            rationale: RationaleMode::None,
            rationale_timeout: Duration::from_secs(60),
        }
    }
}

impl SearchOptions {
    /// Set the number of sampled pairs.
    pub fn with_samples(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, sim_threshold: f32) -> Self {
        self.sim_threshold = sim_threshold;
        self
    }

    /// Fix the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Request rationale annotation from the given backend.
    pub fn with_rationale(mut self, backend: SharedRationaleBackend) -> Self {
        self.rationale = RationaleMode::Generate(backend);
        self
    }
}

/// Run the synchronous core of a search: sample, compute, rank, filter.
///
/// Fails with [`SearchError::QueryNotFound`] before any sampling work when
/// the query id is absent, and with [`SearchError::StoreTooSmall`] when the
/// store cannot guarantee a post-filter survivor. Every returned row
/// satisfies `similarity >= sim_threshold` and `D != Q, B, C` by id, and
/// the table is sorted by similarity descending with ties keeping the
/// original sample order.
pub fn run_search(store: &ConceptStore, query: &str, opts: &SearchOptions) -> Result<ResultTable> {
    let q_idx = store
        .index_of(query)
        .ok_or_else(|| SearchError::QueryNotFound(query.to_string()))?;

    if store.size() < TOP_K {
        return Err(SearchError::StoreTooSmall {
            size: store.size(),
            required: TOP_K,
        });
    }

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let dim = store.dim();
    let m = store.size();
    let q_vec = store.vector_at(q_idx);

    let samples = generate_samples(opts.n, m, &mut rng);
    let d_matrix = compute_d_batch(q_vec, &samples, store);
    let d_norms = row_norms(&d_matrix, dim);
    let store_norms = row_norms(store.matrix(), dim);
    let sims = similarity_matrix(&d_matrix, &d_norms, store.matrix(), &store_norms, dim);

    let mut rows = Vec::new();
    for (i, sample) in samples.iter().enumerate() {
        // A zero-norm difference vector has no direction to match against.
        if d_norms[i] == 0.0 {
            tracing::debug!(row = i, "Dropping zero-norm candidate vector");
            continue;
        }

        let sim_row = &sims[i * m..(i + 1) * m];
        let excluded = [q_idx, sample.b_idx, sample.c_idx];
        let Some(&d_idx) = top_k_indices(sim_row, TOP_K)
            .iter()
            .find(|&&idx| !excluded.contains(&idx))
        else {
            // Unreachable with TOP_K = 4 and size >= 4; kept as a skip
            // rather than a panic.
            tracing::debug!(row = i, "All top-k candidates excluded");
            continue;
        };

        let similarity = sim_row[d_idx];
        if similarity < opts.sim_threshold {
            continue;
        }

        rows.push(assemble_row(
            store, q_idx, sample.b_idx, sample.c_idx, d_idx, similarity,
        ));
    }

    // Stable sort keeps original sample order among equal similarities.
    rows.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    tracing::debug!(
        query = query,
        sampled = opts.n,
        survivors = rows.len(),
        threshold = opts.sim_threshold,
        "Search complete"
    );

    Ok(ResultTable::new(rows))
}

/// Run a search and, if requested, annotate the top row with a rationale.
///
/// The rationale call happens strictly after filtering and sorting, so a
/// row that gets dropped is never annotated. Service failure or timeout
/// degrades to the sentinel and is logged, never propagated.
pub async fn search(
    store: &ConceptStore,
    query: &str,
    opts: &SearchOptions,
) -> Result<ResultTable> {
    let mut table = run_search(store, query, opts)?;

    if let RationaleMode::Generate(backend) = &opts.rationale {
        if let Some(top) = table.top() {
            let equation = top.equation_mapped.clone();
            match tokio::time::timeout(opts.rationale_timeout, backend.explain(&equation)).await {
                Ok(Ok(rationale)) => table.set_top_rationale(rationale),
                Ok(Err(e)) => {
                    tracing::warn!(
                        backend = backend.name(),
                        error = %e,
                        "Rationale generation failed; keeping sentinel"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        backend = backend.name(),
                        timeout_secs = opts.rationale_timeout.as_secs(),
                        "Rationale generation timed out; keeping sentinel"
                    );
                }
            }
        }
    }

    Ok(table)
}

fn assemble_row(
    store: &ConceptStore,
    q_idx: usize,
    b_idx: usize,
    c_idx: usize,
    d_idx: usize,
    similarity: f32,
) -> CandidateResult {
    let q = store.id_at(q_idx);
    let b = store.id_at(b_idx);
    let c = store.id_at(c_idx);
    let d = store.id_at(d_idx);

    let q_mapped = store.describe(q);
    let b_mapped = store.describe(b);
    let c_mapped = store.describe(c);
    let d_mapped = store.describe(d);

    CandidateResult {
        equation: symbolic_equation(q, b, c, d),
        equation_mapped: mapped_equation(
            (q, &q_mapped),
            (b, &b_mapped),
            (c, &c_mapped),
            (d, &d_mapped),
        ),
        q: q.to_string(),
        b: b.to_string(),
        c: c.to_string(),
        d: d.to_string(),
        q_mapped,
        b_mapped,
        c_mapped,
        d_mapped,
        similarity,
        rationale: NO_DESCRIPTION.to_string(),
    }
}
