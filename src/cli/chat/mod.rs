use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use color_print::cformat;
use eyre::Result;
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Config, Editor};

use crate::conversation_state::{ConversationState, Message};
use crate::openrouter_client::CompletionService;

const PROMPT_TEXT: &str = "Enter: ";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    service: Arc<dyn CompletionService>,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        service: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            service,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_welcome()?;
        }

        // Non-interactive mode sends a single line and exits.
        if let Some(input) = self.input.take() {
            self.send_line(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", welcome_text())?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = readline_editor()?;

        loop {
            match rl.readline(PROMPT_TEXT) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str());

                    if is_exit(&line) {
                        break;
                    }

                    self.send_line(&line).await?;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// One chat turn. The service sees only this line; replies are printed
    /// and never fed back, so consecutive lines share no history.
    async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut state = ConversationState::unbounded();
        state.push(Message::user(line));

        let reply = self.service.complete(state.messages()).await?;
        writeln!(self.output, "\nAI: {}", reply)?;

        Ok(())
    }
}

/// The loop stops on this exact line. Surrounding whitespace defeats it,
/// as does any other casing.
fn is_exit(line: &str) -> bool {
    line == "exit"
}

fn welcome_text() -> String {
    cformat!(
        "
Hi, I'm <bold>OpenRouter Chat</bold>. Ask me anything.

<bold>exit</bold>          Quit the application
"
    )
}

fn readline_editor() -> rustyline::Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();
    Editor::with_config(config)
}
