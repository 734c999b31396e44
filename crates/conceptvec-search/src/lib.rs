//! conceptvec-search: Free-variable analogy search engine
//!
//! Given a fixed query concept `Q`, the engine samples many `(B, C)` pairs
//! from the store, computes `D = Q + B - C` for each, finds the stored
//! concept closest to each `D` by cosine similarity, filters matches that
//! trivially equal `Q`, `B`, or `C`, and returns the survivors above a
//! similarity threshold as a ranked result table.
//!
//! Modules, in data-flow order:
//! - [`sample`] - seeded random generation of `(B, C)` index pairs
//! - [`arithmetic`] - batched `Q + B - C` vector arithmetic
//! - [`rank`] - cosine similarity matrix and exact top-k extraction
//! - [`result`] - result rows, equation strings, and table rendering
//! - [`search`] - orchestration, degeneracy filtering, rationale annotation
//! - [`similar`] - nearest-concept lookup for resolving a query id

pub mod arithmetic;
pub mod error;
pub mod rank;
pub mod result;
pub mod sample;
pub mod search;
pub mod similar;

pub use arithmetic::compute_d_batch;
pub use error::{Result, SearchError};
pub use rank::{row_norms, similarity_matrix, top_k_indices};
pub use result::{CandidateResult, ResultTable};
pub use sample::{EquationSample, generate_samples};
pub use search::{
    DEFAULT_SAMPLES, DEFAULT_SIM_THRESHOLD, RationaleMode, SearchOptions, TOP_K, run_search,
    search,
};
pub use similar::{DEFAULT_SIMILAR, SimilarConcept, most_similar};
