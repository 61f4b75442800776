use std::io::{self, BufRead, Write};

/// Source of interactive answers. The CLI reads stdin; tests script answers.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Asks on stderr so stdout stays clean for `--json` output.
pub struct StdioPrompter;

impl Prompter for StdioPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{}", question)?;
        stderr.flush()?;
        drop(stderr);

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no answer for prompt '{}'", question.trim()),
            ));
        }
        Ok(line.trim().to_string())
    }
}

/// Splits a pipe-delimited list of ids, dropping blanks.
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub struct ScriptedPrompter {
    pub answers: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ids_handles_pipes_and_whitespace() {
        assert_eq!(split_ids("Q1| Q2 ||Q3 "), vec!["Q1", "Q2", "Q3"]);
        assert!(split_ids("  ").is_empty());
    }

    #[test]
    fn scripted_prompter_records_questions() {
        let mut prompter = ScriptedPrompter::new(&[" 40748 "]);
        let answer = prompter.ask("Catalog ID: ").expect("answer");
        assert_eq!(answer, "40748");
        assert_eq!(prompter.asked, vec!["Catalog ID: "]);
        assert!(prompter.ask("again").is_err());
    }
}
