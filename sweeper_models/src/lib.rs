pub mod reminder;
pub mod user;

pub use chrono;
