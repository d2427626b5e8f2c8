pub mod gate;
pub mod safety;

pub use gate::{ConfirmationGate, Decision, SAFE_MODE_PHRASE};
pub use safety::SafetyPolicy;
