//! Error policy: log and skip, or escalate.

use tracing::{error, warn};

use crate::error::WiringResult;

/// Decides what happens to a failed resolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    strict: bool,
}

impl Policy {
    /// Creates a policy; `strict` escalates every failure.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Returns `true` in strict mode.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Turns a step result into "value", "skipped" or an escalated error.
    ///
    /// Failures are always logged. In permissive mode they become `Ok(None)`;
    /// in strict mode the error is returned for the caller to wrap.
    pub fn settle<T>(&self, result: WiringResult<T>) -> WiringResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                if err.is_warning() {
                    warn!(kind = err.kind(), "{err}");
                } else {
                    error!(kind = err.kind(), "{err}");
                }
                if self.strict { Err(err) } else { Ok(None) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Role, WiringError};

    fn failure() -> WiringResult<u8> {
        Err(WiringError::TypeNotFound {
            role: Role::Consumer,
            type_name: "app.Missing".to_string(),
        })
    }

    #[test]
    fn test_permissive_skips() {
        let policy = Policy::new(false);
        assert_eq!(policy.settle(Ok(1u8)), Ok(Some(1)));
        assert_eq!(policy.settle(failure()), Ok(None));
    }

    #[test]
    fn test_strict_escalates() {
        let policy = Policy::new(true);
        assert!(policy.is_strict());
        assert_eq!(policy.settle(failure()).unwrap_err().kind(), "TypeNotFound");
    }
}
