//! Line-oriented console adapter: reads commands and answers disambiguation
//! menus from any `BufRead`, writing prompts to any `Write`.

use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::error::{PantryError, Result};
use crate::resolver::{Chooser, Disambiguation, CANCEL};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Show `label` and read one line. `None` at end of input.
    pub fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{} {} ", label.cyan(), ">".cyan().bold())?;
        self.output.flush()?;
        self.read_line()
    }

    pub fn print(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Parse a menu answer, rejecting anything the menu does not offer.
pub fn parse_choice(answer: &str, request: &Disambiguation) -> Result<i64> {
    let answer = answer.trim();
    let choice: i64 = answer
        .parse()
        .map_err(|_| PantryError::AmbiguousInput(answer.to_string()))?;
    if request.accepts(choice) {
        Ok(choice)
    } else {
        Err(PantryError::AmbiguousInput(answer.to_string()))
    }
}

impl<R: BufRead, W: Write> Chooser for Console<R, W> {
    /// Reprompts until the answer is one of the offered numbers. End of input
    /// counts as a cancel.
    fn choose_among(&mut self, request: &Disambiguation) -> Result<i64> {
        for line in request.render() {
            writeln!(self.output, "{}", line)?;
        }
        loop {
            write!(self.output, "{} ", "Enter a number:".yellow())?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                debug!("input closed during disambiguation");
                return Ok(CANCEL);
            };
            match parse_choice(&answer, request) {
                Ok(choice) => return Ok(choice),
                Err(e) => {
                    debug!(error = %e, "reprompting");
                    writeln!(self.output, "{}", e.to_string().red())?;
                }
            }
        }
    }
}
