//! Scripted command runner for testing.
//!
//! Answers invocations from a table of canned results instead of starting
//! processes, and records every invocation for later assertions.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::command::{display_command, CommandResult, CommandRunner};
use crate::error::{ProvisionError, Result};

#[derive(Debug, Clone)]
enum Reply {
    Ran(CommandResult),
    Missing,
}

#[derive(Debug)]
struct Rule {
    pattern: Vec<String>,
    replies: VecDeque<Reply>,
}

/// Command runner that replies from a script.
///
/// A rule matches any invocation whose program and leading arguments equal
/// the rule's words; the longest matching rule wins. Registering the same
/// words again queues another reply: replies are consumed in order and the
/// last one repeats. Invocations no rule matches behave like a program that
/// is not installed.
///
/// # Example
///
/// ```
/// use croppass_setup::shell::{CommandResult, CommandRunner, ScriptedRunner};
///
/// let runner = ScriptedRunner::new()
///     .on_missing("python3 --version")
///     .on("python3 --version", CommandResult::success("Python 3.11.9", ""));
///
/// let args = vec!["--version".to_string()];
/// assert!(runner.run("python3", &args).is_err());
/// assert!(runner.run("python3", &args).unwrap().success);
/// assert_eq!(runner.count("python3 --version"), 2);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    /// Create a runner with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `words` with `result`.
    pub fn on(self, words: &str, result: CommandResult) -> Self {
        self.push(words, Reply::Ran(result));
        self
    }

    /// Reply to `words` as if the program could not be started.
    pub fn on_missing(self, words: &str) -> Self {
        self.push(words, Reply::Missing);
        self
    }

    /// Every invocation so far, rendered as command lines.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|words| display_command(&words[0], &words[1..]))
            .collect()
    }

    /// Number of invocations starting with `words`.
    pub fn count(&self, words: &str) -> usize {
        let pattern = split(words);
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(&pattern))
            .count()
    }

    fn push(&self, words: &str, reply: Reply) {
        let pattern = split(words);
        let mut rules = self.rules.borrow_mut();
        match rules.iter_mut().find(|rule| rule.pattern == pattern) {
            Some(rule) => rule.replies.push_back(reply),
            None => rules.push(Rule {
                pattern,
                replies: VecDeque::from([reply]),
            }),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandResult> {
        let mut call = Vec::with_capacity(args.len() + 1);
        call.push(program.to_string());
        call.extend(args.iter().cloned());
        self.calls.borrow_mut().push(call.clone());

        let mut rules = self.rules.borrow_mut();
        let reply = rules
            .iter_mut()
            .filter(|rule| call.starts_with(&rule.pattern))
            .max_by_key(|rule| rule.pattern.len())
            .and_then(|rule| {
                if rule.replies.len() > 1 {
                    rule.replies.pop_front()
                } else {
                    rule.replies.front().cloned()
                }
            })
            .unwrap_or(Reply::Missing);

        match reply {
            Reply::Ran(result) => Ok(result),
            Reply::Missing => Err(ProvisionError::CommandFailed {
                program: program.to_string(),
                message: "No such file or directory".to_string(),
            }),
        }
    }
}

fn split(words: &str) -> Vec<String> {
    words.split_whitespace().map(str::to_string).collect()
}
