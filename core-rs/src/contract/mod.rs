//! Contract engine
//!
//! - `scope` - scoped acquisition of a contract for a subject
//! - `dispatch` - guarded precondition/postcondition/invariant checks
//! - `registry` - per-thread handle registry and scope stack
//! - `assertions` - `require`/`ensure`/`check` primitives
//! - `condition` - condition categories

pub mod assertions;
pub mod condition;
pub mod dispatch;
pub mod registry;
pub mod scope;

pub use assertions::{check, check_with, ensure, ensure_with, require, require_with, NOTHING};
pub use condition::ConditionKind;
pub use dispatch::{check_postcondition, check_precondition};
pub use registry::{active_contracts, is_active, scope_depth, thread_state_allocated};
pub use scope::{acquire, acquire_mut, acquire_mut_with, acquire_with, Contract};
