//! Interactive prompting.
//!
//! Everything that asks the user a question goes through the [`Prompter`]
//! trait so lifecycle code can be driven by scripted answers in tests.

use crate::error::{KdkError, Result};
use std::io::{BufRead, IsTerminal};
use std::path::Path;
use tracing::debug;

/// Source of user answers. `Ok(None)` means input is closed.
pub trait Prompter {
    fn read_line(&self, text: &str) -> Result<Option<String>>;
}

/// Reads answers from the terminal, or from plain stdin when it is not a TTY.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&self, text: &str) -> Result<Option<String>> {
        if std::io::stdin().is_terminal() {
            let answer = dialoguer::Input::<String>::new()
                .with_prompt(text)
                .allow_empty(true)
                .interact_text();
            return match answer {
                Ok(line) => Ok(Some(line)),
                Err(e) => {
                    debug!("Terminal input closed: {}", e);
                    Ok(None)
                }
            };
        }

        eprint!("{}: ", text);
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| KdkError::Internal(format!("Failed to read answer: {}", e)))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

pub type Validator = fn(&str) -> bool;

pub fn any_answer(_: &str) -> bool {
    true
}

pub fn yes_or_no(answer: &str) -> bool {
    matches!(
        answer.to_ascii_lowercase().as_str(),
        "y" | "n" | "yes" | "no"
    )
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn dir_exists(answer: &str) -> bool {
    !answer.is_empty() && Path::new(answer).is_dir()
}

pub fn port_or_empty(answer: &str) -> bool {
    answer.is_empty() || matches!(answer.parse::<u16>(), Ok(p) if p > 0)
}

pub fn restart_or_delete(answer: &str) -> bool {
    matches!(
        answer.to_ascii_lowercase().as_str(),
        "r" | "restart" | "d" | "delete"
    )
}

/// A question re-asked until its validator accepts or attempts run out.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub attempts: u32,
    pub validator: Validator,
    pub default: Option<String>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attempts: 1,
            validator: any_answer,
            default: None,
        }
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Value returned for an accepted empty answer.
    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Returns the trimmed answer, or `None` when no valid answer was given.
    pub fn run(&self, prompter: &dyn Prompter) -> Result<Option<String>> {
        let text = match &self.default {
            Some(d) => format!("{} [{}]", self.text, d),
            None => self.text.clone(),
        };

        for attempt in 1..=self.attempts {
            let Some(raw) = prompter.read_line(&text)? else {
                return Ok(None);
            };
            let answer = raw.trim();
            if (self.validator)(answer) {
                if answer.is_empty() {
                    if let Some(d) = &self.default {
                        return Ok(Some(d.clone()));
                    }
                }
                return Ok(Some(answer.to_string()));
            }
            debug!(
                "Rejected answer '{}' to '{}' (attempt {}/{})",
                answer, self.text, attempt, self.attempts
            );
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        self == Confirmation::Confirmed
    }
}

/// Ask a yes/no question with one retry. Anything but yes is a decline.
pub fn confirm(prompter: &dyn Prompter, text: &str) -> Result<Confirmation> {
    let answer = Prompt::new(format!("{} [y/n]", text))
        .attempts(2)
        .validator(yes_or_no)
        .run(prompter)?;
    Ok(match answer {
        Some(a) if is_yes(&a) => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    })
}

#[cfg(any(test, feature = "test-helpers"))]
pub use scripted::ScriptedPrompter;

#[cfg(any(test, feature = "test-helpers"))]
mod scripted {
    use super::Prompter;
    use crate::error::Result;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays queued answers; reports closed input once they run out.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: RefCell<VecDeque<String>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
                asked: RefCell::new(Vec::new()),
            }
        }

        /// Every prompt text shown so far, in order.
        pub fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }

        pub fn remaining(&self) -> usize {
            self.answers.borrow().len()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&self, text: &str) -> Result<Option<String>> {
            self.asked.borrow_mut().push(text.to_string());
            Ok(self.answers.borrow_mut().pop_front())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_yes_or_no_is_case_insensitive() {
        for answer in ["y", "Y", "yes", "YES", "n", "No"] {
            assert!(yes_or_no(answer), "{answer}");
        }
        assert!(!yes_or_no(""));
        assert!(!yes_or_no("maybe"));
    }

    #[test]
    fn test_port_or_empty() {
        assert!(port_or_empty(""));
        assert!(port_or_empty("2022"));
        assert!(!port_or_empty("0"));
        assert!(!port_or_empty("70000"));
        assert!(!port_or_empty("ssh"));
    }

    #[test]
    fn test_dir_exists() {
        let temp = TempDir::new().unwrap();
        assert!(dir_exists(temp.path().to_str().unwrap()));
        assert!(!dir_exists(temp.path().join("missing").to_str().unwrap()));
        assert!(!dir_exists(""));
    }

    #[test]
    fn test_prompt_retries_until_valid() {
        let prompter = ScriptedPrompter::new(["nope", "d"]);
        let answer = Prompt::new("restart or delete")
            .attempts(3)
            .validator(restart_or_delete)
            .run(&prompter)
            .unwrap();
        assert_eq!(answer.as_deref(), Some("d"));
        assert_eq!(prompter.asked().len(), 2);
    }

    #[test]
    fn test_prompt_gives_up_after_attempts() {
        let prompter = ScriptedPrompter::new(["a", "b", "c"]);
        let answer = Prompt::new("port")
            .attempts(2)
            .validator(port_or_empty)
            .run(&prompter)
            .unwrap();
        assert_eq!(answer, None);
        assert_eq!(prompter.remaining(), 1);
    }

    #[test]
    fn test_prompt_applies_default_on_empty() {
        let prompter = ScriptedPrompter::new([""]);
        let answer = Prompt::new("Shell")
            .default("/bin/bash")
            .run(&prompter)
            .unwrap();
        assert_eq!(answer.as_deref(), Some("/bin/bash"));
        assert_eq!(prompter.asked(), vec!["Shell [/bin/bash]".to_string()]);
    }

    #[test]
    fn test_confirm_outcomes() {
        assert_eq!(
            confirm(&ScriptedPrompter::new(["y"]), "go").unwrap(),
            Confirmation::Confirmed
        );
        assert_eq!(
            confirm(&ScriptedPrompter::new(["n"]), "go").unwrap(),
            Confirmation::Declined
        );
        assert_eq!(
            confirm(&ScriptedPrompter::new(["what", "yes"]), "go").unwrap(),
            Confirmation::Confirmed
        );
        assert_eq!(
            confirm(&ScriptedPrompter::new(["", "?"]), "go").unwrap(),
            Confirmation::Declined
        );
        assert_eq!(
            confirm(&ScriptedPrompter::new(Vec::<String>::new()), "go").unwrap(),
            Confirmation::Declined
        );
    }
}
