pub mod state_machine;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use eyre::Result;
use tracing::debug;

use crate::conversation_state::{ConversationState, Message};
use crate::openrouter_client::CompletionService;

use self::state_machine::{next_state, InterviewState, Speaker};

pub const DEFAULT_MAX_TURNS: u32 = 10;

const SEED_MESSAGE: &str = "Hello! Welcome to our interview. Let's begin.";

const INTERVIEWER_PROMPT: &str = "
You are a professional HR interviewer conducting a job interview for a Software Engineer position.
You should ask thoughtful, relevant questions about:
- Technical skills and experience
- Problem-solving abilities
- Teamwork and communication
- Career goals and motivation
- Past projects and achievements

Keep your questions professional, clear, and engaging. Ask follow-up questions based on their responses.
After 5-6 exchanges, you can wrap up the interview.
";

const INTERVIEWEE_PROMPT: &str = "
You are a job candidate applying for a Software Engineer position. You have:
- 3 years of experience in Python and JavaScript
- Experience with web development and databases
- Strong problem-solving skills
- Good teamwork abilities
- Passion for learning new technologies

Answer questions professionally, provide specific examples from your experience, and show enthusiasm for the role.
Be honest about your skills and areas for growth.
";

pub struct InterviewContext {
    output: Box<dyn Write>,
    interviewer: Arc<dyn CompletionService>,
    interviewee: Arc<dyn CompletionService>,
    transcript: ConversationState,
}

impl InterviewContext {
    pub fn new(
        output: Box<dyn Write>,
        interviewer: Arc<dyn CompletionService>,
        interviewee: Arc<dyn CompletionService>,
        max_turns: u32,
    ) -> Self {
        let mut transcript = ConversationState::new(max_turns);
        transcript.push(Message::user(SEED_MESSAGE));

        Self {
            output,
            interviewer,
            interviewee,
            transcript,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        self.print_banner()?;

        // The greeting is shown under the interviewer's label even though
        // it sits in the transcript as a user message.
        writeln!(self.output, "\n{}: {}", role_label(Speaker::Interviewer), SEED_MESSAGE)?;

        let mut state = InterviewState::Interviewer;

        while let Some(speaker) = state.speaker() {
            // Catches a budget that is already spent on entry; after a turn
            // the transition below terminates on its own.
            if self.transcript.turns_exhausted() {
                state = InterviewState::Terminated;
                continue;
            }

            self.take_turn(speaker).await?;
            state = next_state(
                state,
                self.transcript.turn_count(),
                self.transcript.max_turns(),
            );
        }

        Ok(ExitCode::SUCCESS)
    }

    /// One turn: the speaker's client sees its own instructions followed by
    /// the full transcript, and the reply joins the transcript under the
    /// speaker's role. The instructions themselves are never recorded.
    async fn take_turn(&mut self, speaker: Speaker) -> Result<()> {
        let mut messages = Vec::with_capacity(self.transcript.messages().len() + 1);
        messages.push(Message::system(role_prompt(speaker)));
        messages.extend_from_slice(self.transcript.messages());

        debug!(
            "Turn {} of {}: {:?} speaking",
            self.transcript.turn_count() + 1,
            self.transcript.max_turns(),
            speaker
        );

        let service = match speaker {
            Speaker::Interviewer => &self.interviewer,
            Speaker::Interviewee => &self.interviewee,
        };

        let reply = service.complete(&messages).await?;
        writeln!(self.output, "\n{}: {}", role_label(speaker), reply)?;

        self.transcript.record_turn(Message {
            role: speaker.role(),
            text: reply,
        });

        Ok(())
    }

    fn print_banner(&mut self) -> Result<()> {
        let rule = "=".repeat(50);

        writeln!(self.output, "\n{}", rule)?;
        writeln!(self.output, "🎯 JOB INTERVIEW SIMULATOR")?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "Interviewer: HR Manager")?;
        writeln!(self.output, "Interviewee: Software Engineer Candidate")?;
        writeln!(self.output, "Position: Software Engineer")?;
        writeln!(self.output, "{}", rule)?;

        Ok(())
    }
}

fn role_prompt(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Interviewer => INTERVIEWER_PROMPT,
        Speaker::Interviewee => INTERVIEWEE_PROMPT,
    }
}

fn role_label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Interviewer => "🎤 INTERVIEWER",
        Speaker::Interviewee => "👤 INTERVIEWEE",
    }
}
