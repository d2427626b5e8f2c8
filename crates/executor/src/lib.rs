pub mod command_executor;
pub mod dry_run;
pub mod environment;
pub mod progress;
pub mod scripted;

pub use command_executor::{
    CommandRunner, ExecError, ExecutionRequest, ExecutionResult, OutputMode, SystemRunner,
};
pub use dry_run::{DryRunExecutor, DRY_RUN_MARKER};
pub use environment::{format_uptime, human_bytes, DiskUsage, EnvironmentSnapshot};
pub use progress::{CountingSink, DotSink, ProgressReporter, ProgressSink, DEFAULT_TICK_INTERVAL};
pub use scripted::ScriptedRunner;
