//! Turns the flat per-player tick table of a pre-parsed demo into per-team
//! summary rows.

pub mod aggregate;
pub mod schema;

pub use aggregate::{aggregate, TeamRow, TeamSnapshot};
pub use schema::{PlayerSlot, SchemaError, Team, TickRecord};
