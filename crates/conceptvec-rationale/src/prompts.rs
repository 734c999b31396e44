//! Prompt construction for equation explanation.
//!
//! The prompt is composed of:
//! 1. A system turn establishing domain-expert framing
//! 2. One worked few-shot example (user equation + assistant explanation)
//! 3. A live user turn carrying the equation under analysis

use serde::{Deserialize, Serialize};

/// A single role-tagged message in a chat-style prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// System prompt establishing the domain-expert framing.
pub const EXPLAIN_SYSTEM_PROMPT: &str = "You are an intelligent and knowledgeable AI chatbot specializing in biology and molecular sciences. Your purpose is to provide insightful explanations, answer questions, and assist users in understanding complex biological concepts. You are proficient in providing concise definitions, explaining biological processes, describing experimental techniques, and elucidating the interconnections between different biological phenomena.";

/// The worked equation used as the few-shot example.
const FEW_SHOT_EQUATION: &str = "ProteinMutation_p_R199Q_RS_200850756 (aka 'uncharacterized LOC124903011' or 'D-amino acid oxidase') - Chemical_MESH_C000334 (aka butanediol divinylether) + Gene_492771 (aka 8 subunit of ESCRT-II) = SNP_rs2284018 (aka 'calcium voltage-gated channel auxiliary subunit gamma 2')";

/// The worked explanation paired with [`FEW_SHOT_EQUATION`].
const FEW_SHOT_RESPONSE: &str = r#"First, let's understand the elements in the equation:

ProteinMutation_p_R199Q_RS_200850756: This refers to a specific mutation in the protein D-amino acid oxidase (DAO). DAO is an enzyme that metabolizes D-amino acids, including D-serine, which plays a role in signal transmission in the brain.

Chemical_MESH_C000334 (butanediol divinylether): This is a chemical compound, specifically an ether. Its effects on biological systems are not immediately clear.

Gene_492771 (8 subunit of ESCRT-II): ESCRT-II is part of the Endosomal Sorting Complex Required for Transport, which helps in the transport and sorting of proteins within cells.

SNP_rs2284018 (calcium voltage-gated channel auxiliary subunit gamma 2): This represents a single nucleotide polymorphism (SNP), or a small genetic change, in the gene encoding for a component of a calcium channel. Calcium channels play a crucial role in cell signaling.

Given these biological elements, we can try to form an analogy to the original word2vec analogy:

In the King - Man + Woman = Queen analogy, the transformation removes the concept of 'male' from 'king' and adds 'female' to get 'queen'.

In your equation, the subtraction of butanediol divinylether from the protein mutation might represent removing the effect or influence of this chemical on the protein. Then, adding the 8 subunit of ESCRT-II may represent the introduction of a new effect or influence on the DAO protein mutation due to this gene. The result is SNP_rs2284018, a SNP associated with a calcium channel subunit.

One hypothesis, then, could be that the protein mutation in DAO, when not influenced by butanediol divinylether, but instead affected by the ESCRT-II gene, could result in changes that are similar to the SNP in the calcium channel auxiliary subunit gamma 2.

To further clarify, maybe the original protein mutation has a certain effect on cell signaling, perhaps through D-serine metabolism. Removing the influence of butanediol divinylether and introducing the influence of ESCRT-II could change how this protein mutation affects cell signaling, resulting in an effect similar to the SNP in the calcium channel gene."#;

/// Render the user-turn text for an equation.
fn explain_request_text(equation: &str) -> String {
    format!(
        "What does this mean analogically? I found this by doing equations with vector embeddings.\n\
         This is similar to how King - Man + Woman = Queen for word2vec. I'm trying to reason why this makes sense.\n\n\
         {equation}\n\n\
         Really try to think outside the box to find why this could be reasonable. Use this as a generative way to help think of biological hypotheses."
    )
}

/// Build the full message list for explaining an equation.
pub fn build_explain_messages(equation: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(EXPLAIN_SYSTEM_PROMPT),
        ChatMessage::user(explain_request_text(FEW_SHOT_EQUATION)),
        ChatMessage::assistant(FEW_SHOT_RESPONSE),
        ChatMessage::user(explain_request_text(equation)),
    ]
}
