/// Example: Contracted Person entity
///
/// Constructs a person, renames them, then attempts a rename to blank names,
/// which the precondition rejects before any state changes.
///
/// Usage:
///   cargo run --example person
///   RUST_LOG=trace cargo run --example person

#[path = "../tests/support/person.rs"]
mod person;

use chrono::NaiveDate;
use person::Person;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let born = NaiveDate::from_ymd_opt(2022, 1, 1).ok_or("invalid date")?;
    let mut me = Person::new("Max", "Mustermann", born)?;
    println!("Created {} (age {})", me, me.age()?);

    me.change_name("Erika", "Musterfrau")?;
    println!("Renamed to {}", me);

    match me.change_name("", "") {
        Ok(()) => println!("Unexpectedly renamed to {}", me),
        Err(err) => {
            println!("Rename rejected: {}", err);
            println!("State unchanged: {}", me);
        }
    }

    Ok(())
}
