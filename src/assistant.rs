//! External AI-query collaborator
//!
//! The support chat treats the assistant as a black box: text in, text out.
//! Failures are tolerated and degrade to a fixed fallback message in the
//! transcript; they never propagate further.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::aggregates::catalog::Product;
use crate::domain::aggregates::support::{Message, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of conversation in the collaborator's wire shape.
#[derive(Clone, Debug, Serialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    /// Maps transcript messages to collaborator roles: assistant becomes
    /// `model`, everything else `user`. The session has already filtered
    /// system messages out of the history it hands over.
    pub fn from_transcript(history: &[Message]) -> Vec<ChatTurn> {
        history
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| ChatTurn {
                role: if m.role == Role::Assistant { TurnRole::Model } else { TurnRole::User },
                text: m.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
pub trait MarketplaceAssistant: Send + Sync {
    /// Answers a customer query given the prior turns and a snapshot of the
    /// full product catalog.
    async fn process_query(
        &self,
        text: &str,
        history: &[ChatTurn],
        catalog: &[Product],
    ) -> anyhow::Result<String>;
}

/// Catalog-aware canned responder used when no real model is wired in.
#[derive(Clone, Debug, Default)]
pub struct ScriptedAssistant;

#[async_trait]
impl MarketplaceAssistant for ScriptedAssistant {
    async fn process_query(
        &self,
        text: &str,
        _history: &[ChatTurn],
        catalog: &[Product],
    ) -> anyhow::Result<String> {
        let lower = text.to_lowercase();

        if let Some(product) = catalog.iter().find(|p| lower.contains(&p.name.to_lowercase())) {
            if product.out_of_stock {
                return Ok(format!(
                    "{} is currently out of stock. Can I interest you in something else?",
                    product.name
                ));
            }
            return Ok(format!(
                "{} is available for {}. Add it to your cart whenever you are ready.",
                product.name,
                product.effective_price()
            ));
        }

        if lower.contains("pay") || lower.contains("invoice") || lower.contains("transfer") {
            return Ok(
                "Payment is by bank transfer. Account: H8 Marketplace Ltd, 0123456789. \
                 Your Total is shown at checkout and your TRACKING ID arrives with the order."
                    .to_string(),
            );
        }

        Ok("Thanks for reaching out! Browse the marketplace for our latest stock, \
            or tell me a product name and I can check it for you."
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::support::SupportSession;

    #[test]
    fn test_turns_map_assistant_to_model() {
        let mut session = SupportSession::default();
        session.record_customer_message("hello");
        let turns = ChatTurn::from_transcript(session.messages());
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::Model);
        assert_eq!(turns[1].role, TurnRole::User);
    }

    #[tokio::test]
    async fn test_scripted_assistant_invoice_reply() {
        let reply = ScriptedAssistant
            .process_query("how do I pay?", &[], &[])
            .await
            .unwrap();
        assert!(reply.contains("Total"));
        assert!(reply.contains("Account"));
    }
}
