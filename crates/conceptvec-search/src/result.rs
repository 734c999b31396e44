//! Result rows and table rendering.
//!
//! One [`CandidateResult`] is produced per surviving sampled pair. The
//! serialized field names are the caller-facing table headers, suitable for
//! direct JSON-array transport and for delimited-text export.

use serde::{Deserialize, Serialize};

/// One surviving analogy: `Q + B - C = D` with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Symbolic equation over concept ids.
    #[serde(rename = "Equation")]
    pub equation: String,

    #[serde(rename = "Q")]
    pub q: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,

    /// Equation annotated with "aka" descriptions.
    #[serde(rename = "Equation (Mapped)")]
    pub equation_mapped: String,

    #[serde(rename = "Q (Mapped)")]
    pub q_mapped: String,
    #[serde(rename = "B (Mapped)")]
    pub b_mapped: String,
    #[serde(rename = "C (Mapped)")]
    pub c_mapped: String,
    #[serde(rename = "D (Mapped)")]
    pub d_mapped: String,

    #[serde(rename = "Similarity")]
    pub similarity: f32,

    /// Generated explanation, or the sentinel when none was requested
    /// or the rationale service failed.
    #[serde(rename = "Rationale")]
    pub rationale: String,
}

/// Ordered sequence of surviving candidates, sorted by similarity
/// descending. The sole output artifact of a search invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<CandidateResult>,
}

impl ResultTable {
    pub(crate) fn new(rows: Vec<CandidateResult>) -> Self {
        Self { rows }
    }

    /// The rows in ranked order.
    pub fn rows(&self) -> &[CandidateResult] {
        &self.rows
    }

    /// The best-ranked row, if any survived.
    pub fn top(&self) -> Option<&CandidateResult> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn set_top_rationale(&mut self, rationale: String) {
        if let Some(row) = self.rows.first_mut() {
            row.rationale = rationale;
        }
    }

    /// Render the table as tab-delimited text with a header row.
    ///
    /// Every text field is flattened: descriptions and rationales can carry
    /// tabs or newlines, which would corrupt the delimited layout.
    pub fn to_tsv(&self) -> String {
        let mut out = String::from(
            "Equation\tQ\tB\tC\tD\tEquation (Mapped)\tQ (Mapped)\tB (Mapped)\tC (Mapped)\tD (Mapped)\tSimilarity\tRationale\n",
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{}\n",
                tsv_field(&row.equation),
                tsv_field(&row.q),
                tsv_field(&row.b),
                tsv_field(&row.c),
                tsv_field(&row.d),
                tsv_field(&row.equation_mapped),
                tsv_field(&row.q_mapped),
                tsv_field(&row.b_mapped),
                tsv_field(&row.c_mapped),
                tsv_field(&row.d_mapped),
                row.similarity,
                tsv_field(&row.rationale),
            ));
        }
        out
    }
}

fn tsv_field(s: &str) -> String {
    s.replace(['\t', '\n'], " ")
}

/// Build the symbolic equation string over concept ids.
pub(crate) fn symbolic_equation(q: &str, b: &str, c: &str, d: &str) -> String {
    format!("{q} + {b} - {c} = {d}")
}

/// Build the annotated equation string with "aka" descriptions.
pub(crate) fn mapped_equation(
    (q, q_desc): (&str, &str),
    (b, b_desc): (&str, &str),
    (c, c_desc): (&str, &str),
    (d, d_desc): (&str, &str),
) -> String {
    format!(
        "{q} (aka {q_desc}) + {b} (aka {b_desc}) - {c} (aka {c_desc}) = {d} (aka {d_desc})"
    )
}
