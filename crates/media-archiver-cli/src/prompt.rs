use media_archiver_core::ConfirmationGate;
use std::cell::Cell;
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    All,
}

/// Asks on the terminal before each copy or move. Answering `a` approves the
/// current file and every remaining one in this run.
pub struct InteractiveGate {
    approve_rest: Cell<bool>,
}

impl InteractiveGate {
    pub fn new() -> Self {
        Self {
            approve_rest: Cell::new(false),
        }
    }
}

impl ConfirmationGate for InteractiveGate {
    fn confirm(&self, source: &Path, description: &str) -> bool {
        if self.approve_rest.get() {
            return true;
        }
        match prompt_confirm(&format!("{}?", description)) {
            Ok(Answer::Yes) => true,
            Ok(Answer::All) => {
                self.approve_rest.set(true);
                true
            }
            Ok(Answer::No) => false,
            Err(e) => {
                warn!("Could not read confirmation for {}: {}", source.display(), e);
                false
            }
        }
    }
}

pub fn prompt_confirm(prompt: &str) -> io::Result<Answer> {
    let mut input = String::new();

    loop {
        input.clear();

        print!("{} (y/N/a): ", prompt);
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            // EOF: nobody is there to answer.
            return Ok(Answer::No);
        }

        if let Some(answer) = parse_answer(&input) {
            return Ok(answer);
        }
    }
}

fn parse_answer(input: &str) -> Option<Answer> {
    match input.trim().to_uppercase().as_str() {
        "Y" | "YES" => Some(Answer::Yes),
        "N" | "NO" | "" => Some(Answer::No),
        "A" | "ALL" => Some(Answer::All),
        _ => None,
    }
}
