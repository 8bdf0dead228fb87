//! User-visible status slots.
//!
//! Each feature area owns one slot holding at most one message. A message
//! clears itself after a fixed delay. Showing a new message cancels the
//! previous message's clear timer, so an older timer can never wipe a newer
//! message.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{CoreEvent, EventBus, StatusEvent};

/// Named status areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSlot {
    Upload,
    Playlist,
    AddToPlaylist,
    /// Buffering, playback and download messages.
    Playback,
}

impl fmt::Display for StatusSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusSlot::Upload => "upload",
            StatusSlot::Playlist => "playlist",
            StatusSlot::AddToPlaylist => "add_to_playlist",
            StatusSlot::Playback => "playback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
}

/// Message currently displayed in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub slot: StatusSlot,
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: DateTime<Utc>,
}

struct SlotEntry {
    message: StatusMessage,
    seq: u64,
    clear_task: Option<JoinHandle<()>>,
}

struct Inner {
    slots: Mutex<HashMap<StatusSlot, SlotEntry>>,
    events: EventBus,
    clear_after: Duration,
    next_seq: AtomicU64,
}

impl Inner {
    fn clear_if_current(&self, slot: StatusSlot, seq: u64) {
        let cleared = {
            let mut slots = self.slots.lock();
            match slots.get(&slot) {
                Some(entry) if entry.seq == seq => slots.remove(&slot).is_some(),
                _ => false,
            }
        };

        if cleared {
            debug!(slot = %slot, "Status cleared");
            self.events
                .emit(CoreEvent::Status(StatusEvent::Cleared { slot }))
                .ok();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for entry in self.slots.get_mut().values_mut() {
            if let Some(task) = entry.clear_task.take() {
                task.abort();
            }
        }
    }
}

/// Status slots shared by every operation of a client session.
///
/// Cloning is cheap and clones share the same slots.
#[derive(Clone)]
pub struct StatusBoard {
    inner: Arc<Inner>,
}

impl StatusBoard {
    pub fn new(events: EventBus, clear_after: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                events,
                clear_after,
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn success(&self, slot: StatusSlot, text: impl Into<String>) {
        self.show(slot, StatusKind::Success, text);
    }

    pub fn error(&self, slot: StatusSlot, text: impl Into<String>) {
        self.show(slot, StatusKind::Error, text);
    }

    /// Replace the slot's message and restart its clear timer.
    ///
    /// Outside a Tokio runtime the message is shown but never auto-clears.
    pub fn show(&self, slot: StatusSlot, kind: StatusKind, text: impl Into<String>) {
        let text = text.into();
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let clear_task = self.spawn_clear(slot, seq);

        let message = StatusMessage {
            slot,
            text: text.clone(),
            kind,
            shown_at: Utc::now(),
        };

        let previous = self.inner.slots.lock().insert(
            slot,
            SlotEntry {
                message,
                seq,
                clear_task,
            },
        );
        if let Some(task) = previous.and_then(|entry| entry.clear_task) {
            task.abort();
        }

        debug!(slot = %slot, kind = ?kind, message = %text, "Status shown");
        self.inner
            .events
            .emit(CoreEvent::Status(StatusEvent::Shown {
                slot,
                message: text,
                kind,
            }))
            .ok();
    }

    fn spawn_clear(&self, slot: StatusSlot, seq: u64) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(slot = %slot, "No async runtime; status will not auto-clear");
                return None;
            }
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.clear_after;
        Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.clear_if_current(slot, seq);
            }
        }))
    }

    /// Message currently shown in `slot`.
    pub fn current(&self, slot: StatusSlot) -> Option<StatusMessage> {
        self.inner.slots.lock().get(&slot).map(|entry| entry.message.clone())
    }

    /// Clear `slot` immediately.
    pub fn clear(&self, slot: StatusSlot) {
        let seq = self.inner.slots.lock().get_mut(&slot).map(|entry| {
            if let Some(task) = entry.clear_task.take() {
                task.abort();
            }
            entry.seq
        });
        if let Some(seq) = seq {
            self.inner.clear_if_current(slot, seq);
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.inner.clear_after
    }
}

impl fmt::Debug for StatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBoard")
            .field("clear_after", &self.inner.clear_after)
            .field("active_slots", &self.inner.slots.lock().len())
            .finish()
    }
}
