//! # DBC Core - Design-by-Contract for Rust objects
//!
//! Lets a method body declare preconditions (checked before mutation),
//! postconditions (checked after mutation, against a snapshot of the state
//! before the call) and an invariant (checked when the outermost contract
//! scope of an object is entered and left).
//!
//! ## Core Principle
//!
//! **Contracts are scoped to the object, per thread**: every thread keeps its
//! own registry of active contracts keyed by object identity, and a stack of
//! open scopes. Ambient checks target the innermost scope. A check that is
//! triggered while another check on the same contract is running is a no-op,
//! so conditions may call contracted accessors on `self` freely.
//!
//! ## Example
//!
//! ```
//! use dbc_core::contract::{self, check, ensure, require};
//! use dbc_core::ContractError;
//!
//! struct Account {
//!     balance: i64,
//! }
//!
//! impl Account {
//!     fn invariant(&self) -> anyhow::Result<()> {
//!         check(self.balance >= 0)?;
//!         Ok(())
//!     }
//!
//!     fn withdraw(&mut self, amount: i64) -> dbc_core::Result<()> {
//!         contract::acquire_mut_with(self, Self::invariant, |a| a.balance, |this, c| {
//!             c.precondition(|| Ok(require(amount > 0 && amount <= this.balance)?))?;
//!             this.balance -= amount;
//!             let now = this.balance;
//!             c.postcondition(|before: &i64| Ok(ensure(now == before - amount)?))
//!         })
//!     }
//! }
//!
//! let mut account = Account { balance: 10 };
//! account.withdraw(4).unwrap();
//! assert_eq!(account.balance, 6);
//!
//! let err = account.withdraw(100).unwrap_err();
//! assert!(matches!(err, ContractError::PreconditionViolated(_)));
//! assert_eq!(account.balance, 6);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │  acquire*(subject, invariant, body)   │
//! │  registry lookup → push → invariant   │
//! └───────────────────────────────────────┘
//!           │                   ▲
//!           ▼                   │
//!     ┌──────────────┐   ┌──────────────────┐
//!     │ scope stack  │──▶│ guarded dispatch │
//!     │ (per thread) │   │ lock → classify  │
//!     └──────────────┘   └──────────────────┘
//! ```

pub mod config;
pub mod contract;
pub mod errors;

pub use config::ContractConfig;
pub use contract::{
    acquire, acquire_mut, acquire_mut_with, acquire_with, check_postcondition, check_precondition,
    ConditionKind, Contract,
};
pub use errors::{AssertionError, ConfigError, ContractError, Result};

/// Version of the contract engine
pub const VERSION: &str = "0.3.0";
