//! Publish/subscribe for table events

use std::collections::VecDeque;
use tracing::{debug, info};

use crate::state::events::TableEvent;

const DEFAULT_MAX_HISTORY: usize = 100;

/// Receives events from one table view
pub trait TableSubscriber {
    fn on_table_event(&mut self, table: &str, event: &TableEvent);

    /// Subscriber name for debugging
    fn name(&self) -> &str;
}

/// Delivers events in subscription order and keeps a bounded history
pub struct TableEventDispatcher {
    subscribers: Vec<Box<dyn TableSubscriber>>,
    event_history: VecDeque<TableEvent>,
    max_history: usize,
}

impl TableEventDispatcher {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_MAX_HISTORY)
    }

    pub fn with_history(max_history: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            event_history: VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY)),
            max_history,
        }
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn TableSubscriber>) {
        info!("TableEventDispatcher: adding subscriber {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    pub fn dispatch(&mut self, table: &str, event: TableEvent) {
        debug!("TableEventDispatcher[{}]: {:?}", table, event);

        for subscriber in &mut self.subscribers {
            subscriber.on_table_event(table, &event);
        }

        if self.max_history == 0 {
            return;
        }
        if self.event_history.len() >= self.max_history {
            self.event_history.pop_front();
        }
        self.event_history.push_back(event);
    }

    /// Oldest first
    pub fn event_history(&self) -> impl Iterator<Item = &TableEvent> {
        self.event_history.iter()
    }

    pub fn last_event(&self) -> Option<&TableEvent> {
        self.event_history.back()
    }
}

impl Default for TableEventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TableEventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEventDispatcher")
            .field(
                "subscribers",
                &self.subscribers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("history", &self.event_history.len())
            .finish()
    }
}
