mod memory;
mod reminder_storage;
pub mod sqlite;

pub use memory::{InMemoryReminderStore, InMemoryStoreError};
pub use reminder_storage::ReminderStore;
