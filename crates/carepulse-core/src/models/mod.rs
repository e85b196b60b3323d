//! Domain models for the booking portal.

mod appointment;
mod patient;
mod record;
mod user;

pub use appointment::*;
pub use patient::*;
pub use record::*;
pub use user::*;
