use std::io::{self, BufRead, Write};

use tracing::warn;

/// Operator gate in front of further API requests.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Says yes to everything (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

/// Accepts y/s/sim as yes and n/nao/não as no, case-insensitively.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "s" | "sim" => Some(true),
        "n" | "nao" | "não" => Some(false),
        _ => None,
    }
}

/// Asks on a line-oriented terminal until a valid answer arrives.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl TerminalConfirm<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        loop {
            if write!(self.output, "{question} (y/n): ").and_then(|_| self.output.flush()).is_err() {
                return false;
            }

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                // closed input never turns into a yes
                Ok(0) => return false,
                Ok(_) => {}
                Err(err) => {
                    warn!("failed to read answer: {err}");
                    return false;
                }
            }

            if let Some(answer) = parse_answer(&line) {
                return answer;
            }

            let _ = writeln!(self.output, "Invalid option. Please type 'y' or 'n'.");
        }
    }
}
