//! Uncaught-panics tests
//!
//! Runs as its own test binary because the configuration is process-wide.
//! Every test installs `catchPanics: false, logViolations: false` before
//! touching the engine: panics in condition bodies propagate to the caller
//! and failed checks are returned without a warning event.

#[path = "../support/log_capture.rs"]
mod log_capture;

use dbc_core::contract::{
    self, active_contracts, check, require, scope_depth, thread_state_allocated,
};
use dbc_core::{config, ContractConfig, ContractError};
use log_capture::LogCapture;
use std::panic::{self, AssertUnwindSafe};

fn install_quiet_uncaught() {
    let _ = ContractConfig {
        enabled: true,
        catch_panics: false,
        log_violations: false,
    }
    .install();

    let current = config::current();
    assert!(current.enabled);
    assert!(!current.catch_panics);
    assert!(!current.log_violations);
}

struct Reactor {
    rods: Vec<u32>,
}

impl Reactor {
    fn invariant(&self) -> anyhow::Result<()> {
        check(self.rods.len() <= 8)?;
        Ok(())
    }

    fn first_rod(&self) -> Result<u32, ContractError> {
        contract::acquire(self, Self::invariant, |c| {
            c.precondition(|| {
                require(self.rods[0] > 0)?;
                Ok(())
            })?;
            Ok(self.rods[0])
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_default()
}

#[test]
fn test_panicking_precondition_propagates_and_releases_scope() {
    install_quiet_uncaught();

    let reactor = Reactor { rods: Vec::new() };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| reactor.first_rod()));

    let payload = outcome.unwrap_err();
    assert!(panic_message(payload.as_ref()).contains("index out of bounds"));
    assert_eq!(scope_depth(), 0);
    assert_eq!(active_contracts(), 0);
    assert!(!thread_state_allocated());
}

#[test]
fn test_lock_cleared_when_panic_escapes_a_check() {
    install_quiet_uncaught();

    let reactor = Reactor { rods: vec![3] };

    let result: Result<(), ContractError> = contract::acquire(&reactor, Reactor::invariant, |c| {
        let escaped = panic::catch_unwind(AssertUnwindSafe(|| {
            c.precondition(|| -> anyhow::Result<()> { panic!("rod jammed") })
        }));
        assert_eq!(panic_message(escaped.unwrap_err().as_ref()), "rod jammed");
        assert!(!c.is_locked());

        // later checks on the same handle still fire
        let err = c.precondition(|| Ok(require(reactor.rods.is_empty())?)).unwrap_err();
        assert!(matches!(err, ContractError::PreconditionViolated(_)));
        Ok(())
    });

    assert!(result.is_ok());
    assert!(!thread_state_allocated());
}

#[test]
fn test_panicking_entry_invariant_leaves_no_state() {
    install_quiet_uncaught();

    let reactor = Reactor { rods: vec![1] };
    let body_ran = std::cell::Cell::new(false);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), ContractError> = contract::acquire(
            &reactor,
            |r: &Reactor| {
                check(r.rods[5] > 0)?;
                Ok(())
            },
            |_| {
                body_ran.set(true);
                Ok(())
            },
        );
    }));

    assert!(outcome.is_err());
    assert!(!body_ran.get());
    assert_eq!(scope_depth(), 0);
    assert!(!thread_state_allocated());
}

#[test]
fn test_violations_not_logged_when_logging_is_off() {
    install_quiet_uncaught();

    let capture = LogCapture::default();
    let reactor = Reactor { rods: vec![0] };

    let result = capture.during(|| reactor.first_rod());

    assert!(matches!(result, Err(ContractError::PreconditionViolated(_))));
    assert!(!capture.contents().contains("contract check failed"));
}
