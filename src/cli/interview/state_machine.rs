use crate::conversation_state::Role;

/// The interview loop's states. The two speaking states hand over to each
/// other while turns remain; `Terminated` is the only terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewState {
    Interviewer,
    Interviewee,
    Terminated,
}

/// The role acting in a speaking state. Split out from `InterviewState`
/// so callers that dispatch on it never have to handle `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Interviewer,
    Interviewee,
}

impl InterviewState {
    pub fn speaker(self) -> Option<Speaker> {
        match self {
            InterviewState::Interviewer => Some(Speaker::Interviewer),
            InterviewState::Interviewee => Some(Speaker::Interviewee),
            InterviewState::Terminated => None,
        }
    }
}

impl Speaker {
    pub fn role(self) -> Role {
        match self {
            Speaker::Interviewer => Role::Interviewer,
            Speaker::Interviewee => Role::Interviewee,
        }
    }
}

/// Transition rule evaluated after each model invocation: while
/// `turn_count < max_turns` the speaking states alternate, otherwise the
/// machine terminates. `Terminated` is absorbing.
pub fn next_state(state: InterviewState, turn_count: u32, max_turns: u32) -> InterviewState {
    match state {
        InterviewState::Interviewer if turn_count < max_turns => InterviewState::Interviewee,
        InterviewState::Interviewee if turn_count < max_turns => InterviewState::Interviewer,
        _ => InterviewState::Terminated,
    }
}
