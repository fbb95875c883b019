//! Support Session Aggregate
//!
//! The chat alternates between two modes: AI-assisted (messages are answered
//! by the external query collaborator) and live support (a human admin
//! replies). Escalation is keyword-driven and sticks until the session is
//! resolved, which archives the transcript and starts a fresh one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{DomainEvent, SupportEvent};

pub const WELCOME_MESSAGE: &str =
    "Welcome to H8 MARKETPLACE Support. How can I assist you with your purchase today?";

pub const HANDOVER_MESSAGE: &str =
    "Request received. Connecting you to a human agent... Please wait.";

/// Shown in place of a collaborator reply when the query fails.
pub const FALLBACK_MESSAGE: &str =
    "I'm having trouble connecting. Please try again or ask for a human agent.";

/// Case-insensitive substring matches, any one of which hands the session
/// over to a human.
const ESCALATION_KEYWORDS: [&str; 7] = [
    "human",
    "agent",
    "support person",
    "real person",
    "staff",
    "representative",
    "customer service",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_invoice: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_links: Vec<GroundingLink>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_invoice: false,
            grounding_links: vec![],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportMode {
    AiAssisted,
    LiveSupport,
}

/// What the caller must do after recording a customer message. The aggregate
/// itself never suspends; the asynchronous follow-up (handover delay or
/// collaborator query) is driven by the application layer.
#[derive(Clone, Debug)]
pub enum SupportAction {
    /// Live support is active: the message only waits for an admin reply.
    AwaitAgent,
    /// Escalation keyword hit: append the handover notice after the
    /// simulated-typing delay.
    Escalate,
    /// Forward to the query collaborator. `history` is the transcript as it
    /// stood before this message, system messages filtered out.
    QueryAssistant { history: Vec<Message> },
}

#[derive(Clone, Debug)]
pub struct SupportSession {
    messages: Vec<Message>,
    /// Frozen snapshots of past transcripts, most recent first.
    archive: Vec<Vec<Message>>,
    mode: SupportMode,
    typing: bool,
    unread_for_admin: bool,
    events: Vec<DomainEvent>,
}

impl Default for SupportSession {
    fn default() -> Self {
        Self {
            messages: vec![Message::new(Role::Assistant, WELCOME_MESSAGE)],
            archive: vec![],
            mode: SupportMode::AiAssisted,
            typing: false,
            unread_for_admin: false,
            events: vec![],
        }
    }
}

impl SupportSession {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn archive(&self) -> &[Vec<Message>] {
        &self.archive
    }

    pub fn mode(&self) -> SupportMode {
        self.mode
    }

    pub fn is_live(&self) -> bool {
        self.mode == SupportMode::LiveSupport
    }

    /// One automated reply may be pending at a time; this flag drives the
    /// loading indicator and disables duplicate sends in the UI. The data
    /// layer itself does not hard-block a second send.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn has_unread_for_admin(&self) -> bool {
        self.unread_for_admin
    }

    /// Appends the customer message and decides the follow-up.
    pub fn record_customer_message(&mut self, text: impl Into<String>) -> SupportAction {
        let text = text.into();
        let history: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect();
        self.messages.push(Message::new(Role::User, text.clone()));

        if self.mode == SupportMode::LiveSupport {
            self.unread_for_admin = true;
            return SupportAction::AwaitAgent;
        }

        let lower = text.to_lowercase();
        if ESCALATION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            self.mode = SupportMode::LiveSupport;
            self.unread_for_admin = true;
            self.typing = true;
            self.raise(SupportEvent::Escalated);
            return SupportAction::Escalate;
        }

        self.typing = true;
        SupportAction::QueryAssistant { history }
    }

    /// The system-authored handover notice, appended once per escalation.
    pub fn append_handover(&mut self) {
        self.messages.push(Message::new(Role::System, HANDOVER_MESSAGE));
        self.typing = false;
    }

    /// Appends the collaborator's reply. The invoice flag is a best-effort
    /// substring heuristic, not a structured field from the collaborator.
    pub fn append_assistant_reply(&mut self, text: impl Into<String>) {
        let text = text.into();
        let is_invoice =
            text.contains("Total") || text.contains("Account") || text.contains("TRACKING ID");
        let mut message = Message::new(Role::Assistant, text);
        message.is_invoice = is_invoice;
        self.messages.push(message);
        self.typing = false;
    }

    /// Degraded reply when the collaborator errors; the raw error never
    /// reaches the transcript.
    pub fn append_failure_notice(&mut self) {
        self.messages.push(Message::new(Role::Assistant, FALLBACK_MESSAGE));
        self.typing = false;
    }

    /// Admin replies arrive as assistant-role messages and clear the unread
    /// marker. Replying does not end the session.
    pub fn admin_reply(&mut self, text: impl Into<String>) {
        self.messages.push(Message::new(Role::Assistant, text));
        self.unread_for_admin = false;
    }

    /// Archives the transcript and resets to a fresh welcome message.
    /// No-op (returns false) while only the welcome message exists.
    pub fn resolve(&mut self) -> bool {
        if self.messages.len() <= 1 {
            return false;
        }
        let transcript = std::mem::replace(
            &mut self.messages,
            vec![Message::new(Role::Assistant, WELCOME_MESSAGE)],
        );
        self.raise(SupportEvent::Resolved { archived_messages: transcript.len() });
        self.archive.insert(0, transcript);
        self.mode = SupportMode::AiAssisted;
        self.unread_for_admin = false;
        true
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event: SupportEvent) {
        self.events.push(DomainEvent::Support(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_count(session: &SupportSession) -> usize {
        session.messages().iter().filter(|m| m.role == Role::System).count()
    }

    #[test]
    fn test_escalation_keyword_switches_mode() {
        let mut session = SupportSession::default();
        let action = session.record_customer_message("Can I talk to an agent?");
        assert!(matches!(action, SupportAction::Escalate));
        assert!(session.is_live());
        assert!(session.has_unread_for_admin());
        assert!(session.is_typing());

        session.append_handover();
        assert_eq!(system_count(&session), 1);
        assert!(!session.is_typing());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        let mut session = SupportSession::default();
        let action = session.record_customer_message("I want a REAL PERSON please");
        assert!(matches!(action, SupportAction::Escalate));
    }

    #[test]
    fn test_no_automated_reply_while_live() {
        let mut session = SupportSession::default();
        session.record_customer_message("agent");
        session.append_handover();
        let before = session.messages().len();

        let action = session.record_customer_message("hello?");
        assert!(matches!(action, SupportAction::AwaitAgent));
        // Only the customer message itself was appended.
        assert_eq!(session.messages().len(), before + 1);
        assert_eq!(system_count(&session), 1);
        assert!(session.has_unread_for_admin());
    }

    #[test]
    fn test_query_history_excludes_system_and_current_message() {
        let mut session = SupportSession::default();
        let action = session.record_customer_message("How much is the iPhone?");
        match action {
            SupportAction::QueryAssistant { history } => {
                assert_eq!(history.len(), 1);
                assert_eq!(history[0].role, Role::Assistant);
                assert_eq!(history[0].content, WELCOME_MESSAGE);
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(session.is_typing());
    }

    #[test]
    fn test_invoice_heuristic() {
        let mut session = SupportSession::default();
        session.append_assistant_reply("Your Total is 2,475.00");
        session.append_assistant_reply("TRACKING ID: TRK-9J2M4");
        session.append_assistant_reply("Happy to help!");
        let tail = &session.messages()[1..];
        assert!(tail[0].is_invoice);
        assert!(tail[1].is_invoice);
        assert!(!tail[2].is_invoice);
    }

    #[test]
    fn test_resolve_noop_on_welcome_only() {
        let mut session = SupportSession::default();
        assert!(!session.resolve());
        assert!(session.archive().is_empty());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_resolve_archives_and_resets() {
        let mut session = SupportSession::default();
        session.record_customer_message("agent");
        session.append_handover();
        assert!(session.resolve());

        assert_eq!(session.archive().len(), 1);
        assert_eq!(session.archive()[0].len(), 3);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, WELCOME_MESSAGE);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.mode(), SupportMode::AiAssisted);
        assert!(!session.has_unread_for_admin());

        // Archived transcripts are frozen; resolving again with a new
        // conversation prepends a second entry.
        session.record_customer_message("hello");
        session.append_assistant_reply("hi");
        assert!(session.resolve());
        assert_eq!(session.archive().len(), 2);
        assert_eq!(session.archive()[0].len(), 3);
    }

    #[test]
    fn test_admin_reply_clears_unread() {
        let mut session = SupportSession::default();
        session.record_customer_message("staff");
        assert!(session.has_unread_for_admin());
        session.admin_reply("An agent here, how can I help?");
        assert!(!session.has_unread_for_admin());
        assert_eq!(session.messages().last().map(|m| m.role), Some(Role::Assistant));
    }

    #[test]
    fn test_failure_notice_clears_typing() {
        let mut session = SupportSession::default();
        session.record_customer_message("price?");
        assert!(session.is_typing());
        session.append_failure_notice();
        assert!(!session.is_typing());
        assert_eq!(session.messages().last().map(|m| m.content.as_str()), Some(FALLBACK_MESSAGE));
    }
}
