use std::io::{self, BufRead, Write};

use dannet_types::IndexRecord;

use crate::lexeme::LexemeCandidate;

/// The human in the loop: approves matches and edits glosses on Wikidata.
///
/// Both calls block until the operator answers; there is no timeout.
pub trait Operator {
    /// Ask whether `record` is the DanNet word for `candidate`.
    fn approve_match(
        &mut self,
        candidate: &LexemeCandidate,
        record: &IndexRecord,
    ) -> io::Result<bool>;

    /// Wait until the operator reports that Danish glosses were added.
    fn await_glosses(&mut self, candidate: &LexemeCandidate) -> io::Result<()>;
}

/// Line-based prompts on a terminal (or any reader/writer pair).
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for the operator",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn approve_match(
        &mut self,
        _candidate: &LexemeCandidate,
        _record: &IndexRecord,
    ) -> io::Result<bool> {
        loop {
            write!(self.output, "Is this a good match? [y/N] ")?;
            self.output.flush()?;
            match self.read_line()?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer yes or no.")?,
            }
        }
    }

    fn await_glosses(&mut self, candidate: &LexemeCandidate) -> io::Result<()> {
        writeln!(
            self.output,
            "Please add Danish glosses on all senses of {} to proceed to matching.",
            candidate.entity_url()
        )?;
        write!(self.output, "Press enter to continue")?;
        self.output.flush()?;
        self.read_line().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record() -> IndexRecord {
        IndexRecord {
            id: "11010114".into(),
            pos: "Noun".into(),
            form: "dyr".into(),
            pos_category_id: Some("Q1084".into()),
        }
    }

    fn answer(input: &str) -> (io::Result<bool>, String) {
        let mut output = Vec::new();
        let result = ConsoleOperator::new(Cursor::new(input.to_string()), &mut output)
            .approve_match(&LexemeCandidate::default(), &record());
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn approval_defaults_to_no() {
        assert!(answer("YES\n").0.unwrap());
        assert!(answer("y\n").0.unwrap());
        assert!(!answer("\n").0.unwrap());
        assert!(!answer("no\n").0.unwrap());
    }

    #[test]
    fn approval_reasks_on_unclear_answer() {
        let (result, output) = answer("maybe\ny\n");
        assert!(result.unwrap());
        assert_eq!(output.matches("Is this a good match?").count(), 2);
    }

    #[test]
    fn closed_input_is_an_error() {
        let (result, _) = answer("");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);

        let mut output = Vec::new();
        let err = ConsoleOperator::new(Cursor::new(String::new()), &mut output)
            .await_glosses(&LexemeCandidate::default())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn gloss_prompt_names_the_lexeme() {
        let candidate = LexemeCandidate {
            id: "L43".into(),
            ..Default::default()
        };
        let mut output = Vec::new();
        ConsoleOperator::new(Cursor::new("\n".to_string()), &mut output)
            .await_glosses(&candidate)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("https://www.wikidata.org/wiki/Lexeme:L43"));
    }
}
