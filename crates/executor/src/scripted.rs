use crate::command_executor::{CommandRunner, ExecutionRequest, ExecutionResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Runner that answers from a table of canned results keyed by command line
/// and records every request it receives.
///
/// Unknown commands get the fallback result, which is a successful run with
/// empty output unless replaced with [`ScriptedRunner::fallback`].
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, ExecutionResult>>,
    fallback: ExecutionResult,
    calls: Mutex<Vec<ExecutionRequest>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            fallback: ExecutionResult::from_exit(0, Vec::new(), Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fallback(mut self, result: ExecutionResult) -> Self {
        self.fallback = result;
        self
    }

    pub fn respond(self, command_line: &str, exit_code: i32, stdout: &str) -> Self {
        self.respond_with(
            command_line,
            ExecutionResult::from_exit(exit_code, stdout.as_bytes().to_vec(), Vec::new()),
        )
    }

    pub fn respond_with(self, command_line: &str, result: ExecutionResult) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(command_line.to_string(), result);
        }
        self
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Command lines received so far, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.requests().iter().map(|r| r.command_line()).collect()
    }

    pub fn was_called(&self, command_line: &str) -> bool {
        self.command_lines().iter().any(|c| c == command_line)
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        self.responses
            .lock()
            .ok()
            .and_then(|r| r.get(&request.command_line()).cloned())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses() {
        let runner = ScriptedRunner::new()
            .respond("pacman -Qtdq", 0, "foo\nbar\n")
            .fallback(ExecutionResult::spawn_failure("x", "not scripted"));

        let hit = runner.run(&ExecutionRequest::captured(["pacman", "-Qtdq"])).await;
        assert_eq!(hit.stdout_lines(), vec!["foo", "bar"]);

        let miss = runner.run(&ExecutionRequest::captured(["pacman", "-Qu"])).await;
        assert!(miss.is_spawn_failure());

        assert_eq!(runner.command_lines(), vec!["pacman -Qtdq", "pacman -Qu"]);
        assert!(runner.was_called("pacman -Qu"));
    }
}
