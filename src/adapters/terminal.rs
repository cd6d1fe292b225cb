use crate::domain::ports::Prompter;
use crate::utils::error::{GsError, Result};
use std::io::{self, BufRead, Write};

/// Prompts on stdout, reads answers from stdin.
pub struct StdinPrompter<R: BufRead = io::StdinLock<'static>> {
    input: R,
}

impl StdinPrompter {
    pub fn new() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl Default for StdinPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> StdinPrompter<R> {
    pub fn from_reader(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Prompter for StdinPrompter<R> {
    fn say(&mut self, message: &str) {
        println!("{}", message);
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(GsError::PromptError {
                message: "reached end of input".to_string(),
            });
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
