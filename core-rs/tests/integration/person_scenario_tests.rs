//! Person scenario tests
//!
//! Drives the Person fixture through construction, reads and a rejected
//! rename, checking contract outcomes and the thread-local bookkeeping.

#[path = "../support/log_capture.rs"]
mod log_capture;
#[path = "../support/person.rs"]
mod person;

use chrono::NaiveDate;
use dbc_core::contract::{active_contracts, scope_depth, thread_state_allocated};
use dbc_core::{AssertionError, ContractError};
use log_capture::LogCapture;
use person::{should_not_be_blank, today, Person};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

fn max_mustermann() -> Person {
    Person::new("Max", "Mustermann", birthday()).unwrap()
}

#[test]
fn test_construct_person() {
    init_tracing();

    let me = max_mustermann();

    assert_eq!(me.firstname().unwrap(), "Max");
    assert_eq!(me.lastname().unwrap(), "Mustermann");
    assert_eq!(me.date_of_birth().unwrap(), birthday());
    assert!(me.age().unwrap() >= 0);
    assert!(!thread_state_allocated());
}

#[test]
fn test_change_name_to_blank_is_rejected() {
    init_tracing();

    let mut me = max_mustermann();

    let err = me.change_name("", "").unwrap_err();

    match &err {
        ContractError::PreconditionViolated(AssertionError::InvalidArgument(Some(msg))) => {
            assert_eq!(msg, &should_not_be_blank("newFirstname", ""));
        }
        other => panic!("Expected PreconditionViolated, got {:?}", other),
    }

    // The assignment never ran
    assert_eq!(me.firstname().unwrap(), "Max");
    assert_eq!(me.lastname().unwrap(), "Mustermann");
    assert_eq!(active_contracts(), 0);
    assert_eq!(scope_depth(), 0);
}

#[test]
fn test_change_name_blank_lastname_only() {
    let mut me = max_mustermann();

    let err = me.change_name("Erika", "   ").unwrap_err();

    assert!(matches!(err, ContractError::PreconditionViolated(_)));
    assert!(err
        .to_string()
        .contains(&should_not_be_blank("newLastname", "   ")));
    assert_eq!(me.firstname().unwrap(), "Max");
}

#[test]
fn test_rejected_rename_is_logged() {
    let capture = LogCapture::default();
    let mut me = max_mustermann();

    let result = capture.during(|| me.change_name("", ""));

    assert!(result.is_err());
    let logged = capture.contents();
    assert!(logged.contains("contract check failed"), "log was: {}", logged);
    assert!(logged.contains("kind=precondition"), "log was: {}", logged);
    assert!(logged.contains("Person"), "log was: {}", logged);
}

#[test]
fn test_change_name_succeeds() {
    init_tracing();

    let mut me = max_mustermann();

    me.change_name("Erika", "Musterfrau").unwrap();

    assert_eq!(me.firstname().unwrap(), "Erika");
    assert_eq!(me.lastname().unwrap(), "Musterfrau");
    assert!(!thread_state_allocated());
}

#[test]
fn test_construct_with_blank_name_is_precondition_violation() {
    let err = Person::new(" ", "Mustermann", birthday()).unwrap_err();

    assert!(matches!(
        err,
        ContractError::PreconditionViolated(AssertionError::InvalidArgument(_))
    ));
}

#[test]
fn test_construct_with_future_birthday_is_precondition_violation() {
    let tomorrow = today().succ_opt().unwrap();

    let err = Person::new("Max", "Mustermann", tomorrow).unwrap_err();

    assert!(matches!(err, ContractError::PreconditionViolated(_)));
    assert!(err.to_string().contains("lies in the future"));
}

#[test]
fn test_construct_born_today() {
    let newborn = Person::new("Baby", "Mustermann", today()).unwrap();
    assert_eq!(newborn.age().unwrap(), 0);
}

#[test]
fn test_memento_round_trip() {
    let mut me = max_mustermann();
    let memento = me.save_to_memento();

    me.change_name("Erika", "Musterfrau").unwrap();
    assert!(!me.equates(&memento));

    me.restore_from_memento(&memento);
    assert!(me.equates(&memento));
    assert_eq!(me.firstname().unwrap(), "Max");
}

#[test]
fn test_display() {
    let me = max_mustermann();
    assert_eq!(
        me.to_string(),
        "Person[firstname='Max', lastname='Mustermann', dateOfBirth=2022-01-01]"
    );
}
