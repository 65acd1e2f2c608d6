use std::io::{BufRead, Write};

use crate::error::{SessionError, SessionResult};

/// Line-oriented terminal I/O shared by the startup prompts and the
/// interactive session
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Create a new Prompter instance
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` without a newline and read one trimmed line.
    /// Returns `None` at end of input.
    pub fn ask(&mut self, question: &str) -> SessionResult<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| SessionError::InputFailed(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask a yes/no question. Only `y` (any case) counts as yes.
    pub fn confirm(&mut self, question: &str) -> SessionResult<bool> {
        let answer = self.ask(&format!("{} (y/n): ", question))?;
        Ok(answer.is_some_and(|a| a.eq_ignore_ascii_case("y")))
    }

    /// Read lines until an empty line or end of input
    pub fn read_block(&mut self, instructions: &str) -> SessionResult<String> {
        writeln!(self.output, "{}", instructions)?;
        self.output.flush()?;

        let mut block = String::new();
        loop {
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| SessionError::InputFailed(e.to_string()))?;
            if read == 0 || line.trim().is_empty() {
                break;
            }
            block.push_str(&line);
        }
        Ok(block)
    }

    pub fn say(&mut self, text: &str) -> SessionResult<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
