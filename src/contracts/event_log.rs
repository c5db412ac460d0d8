// src/contracts/event_log.rs
//! Append-only notification stream.
//!
//! The registry appends exactly one record per committed mutation, while it
//! still holds its write lock, so the log order is the commit order. Live
//! subscribers receive records over a broadcast channel; a slow or absent
//! subscriber never blocks or fails the mutation.

use crate::models::event::{EventRecord, RegistryEvent};
use tokio::sync::broadcast;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct EventLog {
    records: Vec<EventRecord>,
    sender: broadcast::Sender<EventRecord>,
}

impl EventLog {
    pub fn new(channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        EventLog {
            records: Vec::new(),
            sender,
        }
    }

    /// Appends `event` and publishes it to live subscribers.
    pub fn append(&mut self, event: RegistryEvent, timestamp: u64) -> EventRecord {
        let record = EventRecord {
            sequence: self.records.len() as u64,
            timestamp,
            event,
        };
        self.records.push(record.clone());
        // No receivers is not an error for a fire-and-forget feed.
        let _ = self.sender.send(record.clone());
        record
    }

    /// Records with `sequence >= from`, in commit order.
    pub fn since(&self, from: u64) -> Vec<EventRecord> {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.records.len());
        self.records[start..].to_vec()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        EventLog::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
