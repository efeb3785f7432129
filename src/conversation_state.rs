/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    System,
    Interviewer,
    Interviewee,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }
}

/// The ordered transcript plus the turn budget that bounds a simulation.
/// The turn counter only ever grows; callers decide when to stop by
/// checking `turns_exhausted`.
pub struct ConversationState {
    messages: Vec<Message>,
    turn_count: u32,
    max_turns: u32,
}

impl ConversationState {
    pub fn new(max_turns: u32) -> Self {
        Self {
            messages: Vec::new(),
            turn_count: 0,
            max_turns,
        }
    }

    /// A transcript with no turn limit, for flows that never spend turns.
    pub fn unbounded() -> Self {
        Self::new(u32::MAX)
    }

    /// Append a message without spending a turn (seed messages, user lines).
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a model-produced message and spend one turn.
    pub fn record_turn(&mut self, message: Message) {
        self.messages.push(message);
        self.turn_count += 1;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn turns_exhausted(&self) -> bool {
        self.turn_count >= self.max_turns
    }
}
