pub mod scripted;
pub mod terminal;
pub mod traits;

pub use scripted::ScriptedInterface;
pub use terminal::TerminalInterface;
pub use traits::{Interface, InterfaceError};
