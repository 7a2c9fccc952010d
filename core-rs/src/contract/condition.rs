//! Condition categories
//!
//! Conditions are plain closures written as "fails if violated": they return
//! `Ok(())` when the condition holds and an error (usually an
//! `AssertionError` from `require`/`ensure`/`check`) when it does not.
//!
//! - invariant: `Fn(&T) -> anyhow::Result<()>`, receives the subject
//! - precondition: `FnOnce() -> anyhow::Result<()>`
//! - postcondition: `FnOnce(&M) -> anyhow::Result<()>`, receives the snapshot
//!   captured when the contract was acquired

use std::fmt;

/// Runtime name of a condition category, used for error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Invariant,
    Precondition,
    Postcondition,
}

impl ConditionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ConditionKind::Invariant => "invariant",
            ConditionKind::Precondition => "precondition",
            ConditionKind::Postcondition => "postcondition",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
