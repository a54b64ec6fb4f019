//! CLI command implementations

pub mod pr;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use serde::Serialize;

/// Print a command result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
