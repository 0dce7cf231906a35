//! Interaction channel (v0.1)
//!
//! The resolver only ever suspends at these two calls: read one line,
//! write one line. Both are synchronous and blocking. Injecting the
//! channel keeps the operator-driven loops testable with scripted input.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use colored::Colorize;

use crate::error::StrataError;

/// One-line-at-a-time operator interaction
pub trait Console: Send + Sync {
    /// Write `text` as a prompt and read one line, trimmed
    fn prompt(&self, text: &str) -> Result<String, StrataError>;

    /// Write one line of output
    fn announce(&self, text: &str);
}

/// Console over stdin/stdout
#[derive(Debug, Default)]
pub struct StdioConsole;

impl StdioConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdioConsole {
    fn prompt(&self, text: &str) -> Result<String, StrataError> {
        print!("{} {} ", "?".cyan().bold(), text);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn announce(&self, text: &str) {
        println!("{text}");
    }
}

/// Scripted console for tests
///
/// Returns queued responses in FIFO order (the default response once the
/// queue is empty) and records the full transcript for assertions.
pub struct ScriptedConsole {
    responses: Mutex<VecDeque<String>>,
    default_response: String,
    prompts: Mutex<Vec<String>>,
    announcements: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    /// Create with an empty queue; every prompt gets the default
    /// (empty) response, i.e. "accept"
    pub fn new() -> Self {
        Self::with_responses(Vec::<String>::new())
    }

    /// Create with a queue of responses
    pub fn with_responses(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            default_response: String::new(),
            prompts: Mutex::new(Vec::new()),
            announcements: Mutex::new(Vec::new()),
        }
    }

    /// Set the response used once the queue is empty
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Append a response to the queue
    pub fn queue_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    /// All prompt texts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// All announced lines so far
    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().unwrap().clone()
    }
}

impl Default for ScriptedConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for ScriptedConsole {
    fn prompt(&self, text: &str) -> Result<String, StrataError> {
        self.prompts.lock().unwrap().push(text.to_string());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());
        Ok(response.trim().to_string())
    }

    fn announce(&self, text: &str) {
        self.announcements.lock().unwrap().push(text.to_string());
    }
}
