use crate::traits::{Interface, InterfaceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum ScriptedLine {
    Line(String),
    Failure,
}

/// In-memory interface fed from a fixed script of input lines.
///
/// Everything written to it is recorded and can be inspected with
/// [`ScriptedInterface::transcript`]. Reading past the end of the script
/// behaves like a closed terminal.
pub struct ScriptedInterface {
    input: Mutex<VecDeque<ScriptedLine>>,
    output: Mutex<Vec<String>>,
}

impl ScriptedInterface {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: Mutex::new(
                lines
                    .into_iter()
                    .map(|l| ScriptedLine::Line(l.into()))
                    .collect(),
            ),
            output: Mutex::new(Vec::new()),
        }
    }

    /// Queues a read error after the lines already scripted.
    pub fn push_failure(&self) {
        if let Ok(mut input) = self.input.lock() {
            input.push_back(ScriptedLine::Failure);
        }
    }

    pub fn transcript(&self) -> Vec<String> {
        self.output.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn remaining_input(&self) -> usize {
        self.input.lock().map(|i| i.len()).unwrap_or(0)
    }

    fn record(&self, text: String) {
        if let Ok(mut output) = self.output.lock() {
            output.push(text);
        }
    }
}

#[async_trait]
impl Interface for ScriptedInterface {
    async fn receive_input(&self) -> Result<Option<String>, InterfaceError> {
        let next = self
            .input
            .lock()
            .map_err(|_| InterfaceError::Closed)?
            .pop_front();

        match next {
            Some(ScriptedLine::Line(line)) => Ok(Some(line)),
            Some(ScriptedLine::Failure) => Err(InterfaceError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted input failure",
            ))),
            None => Ok(None),
        }
    }

    async fn send_output(&self, message: &str) {
        self.record(message.to_string());
    }

    async fn prompt(&self, message: &str) {
        self.record(message.to_string());
    }
}
