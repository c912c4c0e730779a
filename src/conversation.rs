use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Default persona sent as the leading system turn.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI expert in accounting, business strategy, and entrepreneurship. \
You must explain business concepts using established theories such as SWOT Analysis, \
Porter's Five Forces, Maslow's Hierarchy of Needs, the 4Ps of Marketing, Cost-Benefit \
Analysis, and more. Always include relevant theory names and real-world applications \
when giving advice.";

/// Who produced a turn. Serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Local receipt time, shown in the transcript but never sent.
    #[serde(skip_serializing)]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Owns the ordered turn list for one session: the leading system turn,
/// then user/assistant turns in submission order. Turns are never removed
/// or reordered, and the list dies with the session.
pub struct ConversationController {
    session_id: Uuid,
    turns: Vec<Turn>,
    pending: bool,
    draft: String,
    notice: Option<String>,
    revision: u64,
}

impl ConversationController {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(%session_id, "starting conversation");
        Self {
            session_id,
            turns: vec![Turn::system(system_prompt)],
            pending: false,
            draft: String::new(),
            notice: None,
            revision: 0,
        }
    }

    /// Submit a user message. Appends the user turn, flags the request as
    /// in flight, clears the draft, and returns a snapshot of the full
    /// conversation to send to the answering service.
    ///
    /// Returns `None` without touching any state when the trimmed text is
    /// empty or a request is already in flight.
    pub fn submit(&mut self, text: &str) -> Option<Vec<Turn>> {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return None;
        }

        self.turns.push(Turn::user(text));
        self.pending = true;
        self.draft.clear();
        self.notice = None;
        self.bump();
        tracing::debug!(session_id = %self.session_id, turns = self.turns.len(), "submitted user turn");
        Some(self.turns.clone())
    }

    /// Submit whatever is currently in the draft.
    pub fn submit_draft(&mut self) -> Option<Vec<Turn>> {
        let draft = self.draft.clone();
        self.submit(&draft)
    }

    /// Record a successful reply from the answering service.
    pub fn resolve(&mut self, reply: impl Into<String>) {
        self.turns.push(Turn::assistant(reply));
        self.pending = false;
        self.bump();
        tracing::debug!(session_id = %self.session_id, turns = self.turns.len(), "reply received");
    }

    /// Record a failed request. Resets the in-flight flag and records a
    /// notice for the UI; the conversation itself gains no turn, so the
    /// user can simply resubmit.
    pub fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        tracing::warn!(session_id = %self.session_id, %error, "request failed");
        self.pending = false;
        self.notice = Some(error);
        self.bump();
    }

    /// All turns, leading system turn included.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The turns shown to the user: everything except the leading system turn.
    pub fn visible_turns(&self) -> &[Turn] {
        &self.turns[1..]
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        self.bump();
        &mut self.draft
    }

    /// Error notice from the last failed request, cleared on the next submit.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Monotonic change counter; the render loop polls this to decide
    /// whether anything needs redrawing.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ConversationController {
        ConversationController::new(DEFAULT_SYSTEM_PROMPT)
    }

    #[test]
    fn starts_with_single_system_turn() {
        let ctrl = controller();
        assert_eq!(ctrl.turns().len(), 1);
        assert_eq!(ctrl.turns()[0].role, Role::System);
        assert!(ctrl.visible_turns().is_empty());
        assert!(!ctrl.pending());
    }

    #[test]
    fn submit_appends_user_turn_synchronously() {
        let mut ctrl = controller();
        let snapshot = ctrl.submit("What is SWOT analysis?").expect("accepted");

        assert_eq!(ctrl.turns().len(), 2);
        assert_eq!(ctrl.turns()[1].role, Role::User);
        assert_eq!(ctrl.turns()[1].content, "What is SWOT analysis?");
        assert!(ctrl.pending());

        // Snapshot carries the full conversation, system turn included.
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].role, Role::System);
        assert_eq!(snapshot[1].role, Role::User);
    }

    #[test]
    fn submit_trims_whitespace() {
        let mut ctrl = controller();
        ctrl.submit("  hello  ").expect("accepted");
        assert_eq!(ctrl.turns()[1].content, "hello");
    }

    #[test]
    fn empty_submit_is_a_no_op() {
        let mut ctrl = controller();
        let before = ctrl.revision();
        assert!(ctrl.submit("").is_none());
        assert!(ctrl.submit("   \n\t").is_none());
        assert_eq!(ctrl.turns().len(), 1);
        assert!(!ctrl.pending());
        assert_eq!(ctrl.revision(), before);
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut ctrl = controller();
        assert!(ctrl.submit("A").is_some());
        assert!(ctrl.submit("B").is_none());
        assert_eq!(ctrl.turns().len(), 2);
        assert_eq!(ctrl.turns()[1].content, "A");

        // Once the reply lands, the next submit goes through.
        ctrl.resolve("reply to A");
        assert!(ctrl.submit("B").is_some());
        assert_eq!(ctrl.turns().len(), 4);
        assert_eq!(ctrl.turns()[3].content, "B");
    }

    #[test]
    fn resolve_appends_assistant_turn_and_clears_pending() {
        let mut ctrl = controller();
        ctrl.submit("What is SWOT analysis?").expect("accepted");
        ctrl.resolve("SWOT stands for...");

        assert_eq!(ctrl.turns().len(), 3);
        assert_eq!(ctrl.turns()[2].role, Role::Assistant);
        assert_eq!(ctrl.turns()[2].content, "SWOT stands for...");
        assert!(!ctrl.pending());
    }

    #[test]
    fn fail_clears_pending_without_appending_a_turn() {
        let mut ctrl = controller();
        ctrl.submit("hello").expect("accepted");
        ctrl.fail("connection refused");

        assert_eq!(ctrl.turns().len(), 2);
        assert!(!ctrl.pending());
        assert_eq!(ctrl.notice(), Some("connection refused"));

        // Notice clears on the next successful submit.
        ctrl.submit("again").expect("accepted");
        assert!(ctrl.notice().is_none());
    }

    #[test]
    fn visible_turns_exclude_system_turn() {
        let mut ctrl = controller();
        ctrl.submit("hi").expect("accepted");
        ctrl.resolve("hello!");

        assert_eq!(ctrl.visible_turns().len(), ctrl.turns().len() - 1);
        assert!(ctrl.visible_turns().iter().all(|t| t.role != Role::System));
    }

    #[test]
    fn submit_draft_uses_and_clears_draft() {
        let mut ctrl = controller();
        ctrl.draft_mut().push_str("from the draft");
        let snapshot = ctrl.submit_draft().expect("accepted");

        assert_eq!(snapshot[1].content, "from the draft");
        assert!(ctrl.draft().is_empty());
    }

    #[test]
    fn rejected_submit_keeps_the_draft() {
        let mut ctrl = controller();
        ctrl.submit("first").expect("accepted");
        ctrl.draft_mut().push_str("second");
        assert!(ctrl.submit_draft().is_none());
        assert_eq!(ctrl.draft(), "second");
    }

    #[test]
    fn revision_advances_on_every_mutation() {
        let mut ctrl = controller();
        let r0 = ctrl.revision();
        ctrl.submit("hi").expect("accepted");
        let r1 = ctrl.revision();
        assert!(r1 > r0);
        ctrl.resolve("hello!");
        assert!(ctrl.revision() > r1);
    }

    #[test]
    fn draft_edits_and_failures_advance_revision() {
        let mut ctrl = controller();
        let r0 = ctrl.revision();
        ctrl.draft_mut().push('x');
        let r1 = ctrl.revision();
        assert!(r1 > r0);

        ctrl.submit("hi").expect("accepted");
        ctrl.fail("connection refused");
        assert!(ctrl.revision() > r1);
    }

    #[test]
    fn each_session_gets_its_own_id() {
        let a = controller();
        let b = controller();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn wire_format_is_role_and_content_only() {
        let turn = Turn::user("hello");
        let json = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));
    }
}
