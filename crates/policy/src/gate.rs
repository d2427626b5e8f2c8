use crate::safety::SafetyPolicy;
use archmaint_interfaces::Interface;
use std::sync::Arc;

/// Literal phrase required for dangerous actions in safe mode.
pub const SAFE_MODE_PHRASE: &str = "yes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Policy allowed the action without asking.
    AutoApproved,
    Approved,
    Declined,
    /// Input could not be read; treated as a refusal.
    InputClosed,
}

impl Decision {
    pub fn is_approved(self) -> bool {
        matches!(self, Decision::AutoApproved | Decision::Approved)
    }
}

/// Asks the operator before an action runs.
///
/// The gate holds no state of its own: the same policy and the same input
/// always produce the same decision.
pub struct ConfirmationGate {
    interface: Arc<dyn Interface>,
}

impl ConfirmationGate {
    pub fn new(interface: Arc<dyn Interface>) -> Self {
        Self { interface }
    }

    pub async fn confirm(&self, message: &str, dangerous: bool, policy: &SafetyPolicy) -> bool {
        self.decide(message, dangerous, policy).await.is_approved()
    }

    pub async fn decide(&self, message: &str, dangerous: bool, policy: &SafetyPolicy) -> Decision {
        if policy.auto_confirm && !dangerous {
            tracing::debug!("Auto-confirmed: {}", message);
            return Decision::AutoApproved;
        }

        let phrase_required = dangerous && policy.safe_mode;
        if phrase_required {
            self.interface
                .send_output(&format!(
                    "⚠️  DANGEROUS OPERATION - Extra confirmation required!\n   {}",
                    message
                ))
                .await;
            self.interface
                .prompt(&format!("Type '{}' to confirm: ", SAFE_MODE_PHRASE))
                .await;
        } else if dangerous {
            self.interface
                .prompt(&format!("WARNING {} [y/N]: ", message))
                .await;
        } else {
            self.interface.prompt(&format!("? {} [y/N]: ", message)).await;
        }

        let response = match self.interface.receive_input().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::warn!("Input closed while confirming: {}", message);
                return Decision::InputClosed;
            }
            Err(e) => {
                tracing::warn!("Failed to read confirmation for '{}': {}", message, e);
                return Decision::InputClosed;
            }
        };

        let accepted = if phrase_required {
            accepts_phrase(&response)
        } else {
            accepts_plain(&response)
        };

        if accepted {
            Decision::Approved
        } else {
            tracing::info!("Declined: {}", message);
            Decision::Declined
        }
    }
}

/// `y` or `yes` in any case, surrounding whitespace ignored.
pub fn accepts_plain(response: &str) -> bool {
    let response = response.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Exact, case-sensitive match of [`SAFE_MODE_PHRASE`] after trimming.
pub fn accepts_phrase(response: &str) -> bool {
    response.trim() == SAFE_MODE_PHRASE
}

#[cfg(test)]
mod tests {
    use super::*;
    use archmaint_interfaces::ScriptedInterface;

    fn gate_with(lines: &[&str]) -> (ConfirmationGate, Arc<ScriptedInterface>) {
        let ui = Arc::new(ScriptedInterface::new(lines.iter().copied()));
        (ConfirmationGate::new(ui.clone()), ui)
    }

    fn safe_mode() -> SafetyPolicy {
        SafetyPolicy {
            safe_mode: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_auto_confirm_skips_prompt_for_safe_actions() {
        let (gate, ui) = gate_with(&[]);
        let policy = SafetyPolicy {
            auto_confirm: true,
            ..Default::default()
        };
        let decision = gate.decide("Clean cache?", false, &policy).await;
        assert_eq!(decision, Decision::AutoApproved);
        assert!(ui.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_auto_confirm_never_bypasses_dangerous() {
        let (gate, ui) = gate_with(&["n"]);
        let policy = SafetyPolicy {
            auto_confirm: true,
            ..Default::default()
        };
        assert!(!gate.confirm("Remove orphans?", true, &policy).await);
        assert_eq!(ui.remaining_input(), 0);

        let (gate, _) = gate_with(&[]);
        let policy = SafetyPolicy {
            auto_confirm: true,
            safe_mode: true,
            ..Default::default()
        };
        assert_eq!(
            gate.decide("Remove orphans?", true, &policy).await,
            Decision::InputClosed
        );
    }

    #[tokio::test]
    async fn test_plain_prompt_accepts_y_and_yes_any_case() {
        for answer in ["y", "Y", "yes", "YES", "  Yes  "] {
            let (gate, _) = gate_with(&[answer]);
            assert!(
                gate.confirm("Continue?", false, &SafetyPolicy::default()).await,
                "expected '{}' to be accepted",
                answer
            );
        }
    }

    #[tokio::test]
    async fn test_plain_prompt_rejects_everything_else() {
        for answer in ["", "n", "no", "yep", "ye", "sure"] {
            let (gate, _) = gate_with(&[answer]);
            assert!(
                !gate.confirm("Continue?", true, &SafetyPolicy::default()).await,
                "expected '{}' to be rejected",
                answer
            );
        }
    }

    #[tokio::test]
    async fn test_safe_mode_requires_exact_phrase() {
        let (gate, _) = gate_with(&["y", "yes"]);
        let policy = safe_mode();
        assert!(!gate.confirm("Remove these 3 orphaned packages?", true, &policy).await);
        assert!(gate.confirm("Remove these 3 orphaned packages?", true, &policy).await);
    }

    #[tokio::test]
    async fn test_safe_mode_phrase_is_case_sensitive() {
        for answer in ["YES", "Yes", "yes please"] {
            let (gate, _) = gate_with(&[answer]);
            assert!(!gate.confirm("Reboot now?", true, &safe_mode()).await);
        }
        let (gate, _) = gate_with(&["  yes\t"]);
        assert!(gate.confirm("Reboot now?", true, &safe_mode()).await);
    }

    #[tokio::test]
    async fn test_safe_mode_leaves_non_dangerous_on_plain_prompt() {
        let (gate, ui) = gate_with(&["y"]);
        assert!(gate.confirm("Run cleanup?", false, &safe_mode()).await);
        assert!(ui.transcript()[0].contains("[y/N]"));
    }

    #[tokio::test]
    async fn test_read_failure_declines() {
        let (gate, ui) = gate_with(&[]);
        ui.push_failure();
        assert_eq!(
            gate.decide("Remove orphans?", true, &SafetyPolicy::default())
                .await,
            Decision::InputClosed
        );

        let (gate, _) = gate_with(&[]);
        assert!(!gate.confirm("Update?", false, &SafetyPolicy::default()).await);
    }

    #[tokio::test]
    async fn test_same_input_same_answer() {
        let policy = safe_mode();
        for answer in ["yes", "y", "no"] {
            let (gate, _) = gate_with(&[answer, answer]);
            let first = gate.confirm("Proceed?", true, &policy).await;
            let second = gate.confirm("Proceed?", true, &policy).await;
            assert_eq!(first, second);
        }
        assert_eq!(policy, safe_mode());
    }

    #[test]
    fn test_response_matchers() {
        assert!(accepts_plain(" Y "));
        assert!(!accepts_plain("yess"));
        assert!(accepts_phrase("yes\n"));
        assert!(!accepts_phrase("y"));
    }
}
