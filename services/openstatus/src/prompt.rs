//! Interactive yes/no confirmation

use std::io::{BufRead, Write};

/// Asks the user to confirm an action
#[cfg_attr(test, mockall::automock)]
pub trait Prompt: Send + Sync {
    fn confirm(&self, question: &str) -> crate::Result<bool>;
}

/// Prompt reading answers from stdin
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> crate::Result<bool> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        ask_for_confirmation(question, &mut stdin.lock(), &mut stdout.lock())
    }
}

/// Print `question [y/N]: ` and read one answer line
///
/// Only `y` and `yes` confirm, in any case. End of input declines.
pub fn ask_for_confirmation<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> crate::Result<bool> {
    write!(output, "{} [y/N]: ", question)
        .and_then(|()| output.flush())
        .map_err(|e| crate::OpenstatusError::Prompt(e.to_string()))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| crate::OpenstatusError::Prompt(e.to_string()))?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
