//! Table events and their subscribers

pub mod dispatcher;
pub mod events;

pub use dispatcher::{TableEventDispatcher, TableSubscriber};
pub use events::TableEvent;
