//! Prompt templates for the two answering flows.
//!
//! Both flows ask for a single JSON object; the shape is spelled out in the
//! user prompt so providers without a JSON mode still comply.

use crate::answerer::{CatalogQuestionInput, ContextualizeInput};

pub const CONTEXTUALIZE_SYSTEM: &str = r#"
You are a customer support agent for an online product store.
Use the past conversation to understand what the user is really asking.
Reply with JSON only: no markdown, no commentary.
"#;

pub const CATALOG_SYSTEM: &str = r#"
You are a customer support agent answering questions about products.
Ground every answer in the product catalog you are given.
Reply with JSON only: no markdown, no commentary.
"#;

pub fn contextualize_prompt(input: &ContextualizeInput) -> String {
    format!(
        "Past conversation:\n\
         ---\n{history}\n---\n\
\n\
         User question:\n{question}\n\
\n\
         First rephrase the user question as one self-contained sentence using the conversation above.\n\
         Then answer that rephrased question as accurately and informatively as you can.\n\
\n\
         Return ONLY JSON with this exact shape:\n\
         {{\"contextualized_question\": \"...\", \"answer\": \"...\"}}\n",
        history = input.conversation_history.trim(),
        question = input.question.trim(),
    )
}

pub fn catalog_prompt(input: &CatalogQuestionInput) -> String {
    format!(
        "Product catalog (JSON):\n{products}\n\
\n\
         Question:\n{question}\n\
\n\
         Answer the question as well as you can from the catalog.\n\
         Also rate how confident you are that the answer is correct, from 0 (not confident) to 1 (very confident).\n\
\n\
         Return ONLY JSON with this exact shape:\n\
         {{\"answer\": \"...\", \"confidence\": 0.0}}\n",
        products = input.products,
        question = input.question.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contextualize_prompt_embeds_history_and_question() {
        let p = contextualize_prompt(&ContextualizeInput {
            question: " Is it available in black? ".into(),
            conversation_history: "User: Tell me about the X1000\nAssistant: It is a thermostat."
                .into(),
        });
        assert!(p.contains("User: Tell me about the X1000\nAssistant: It is a thermostat."));
        assert!(p.contains("User question:\nIs it available in black?\n"));
        assert!(p.contains("\"contextualized_question\""));
    }

    #[test]
    fn catalog_prompt_embeds_products_verbatim() {
        let products = r#"[{"name":"A","features":"f","category":"c"}]"#;
        let p = catalog_prompt(&CatalogQuestionInput {
            question: "What is A?".into(),
            products: products.into(),
        });
        assert!(p.contains(products));
        assert!(p.contains("\"confidence\""));
    }
}
