//! In-process publish/subscribe hub used by the Job Registry to drive the
//! Event Bridge (see the registry change stream in SPEC_FULL.md §4.8).
//!
//! Emission is split into three phases so a listener can never be awaited
//! while a lock over the listener list is held:
//! 1. `snapshot_emit` — read-only, no `.await`, returns the matching
//!    listeners plus any `once` ids to retire.
//! 2. the caller awaits each listener with no lock held.
//! 3. `finalize_once_removals` — write-only, no `.await`, retires `once`
//!    listeners.
//!
//! `emit_async` is the convenience wrapper combining all three for callers
//! that already hold `&mut` access (tests, single-writer setups).

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static LISTENER_ID: AtomicU64 = AtomicU64::new(1);

fn next_listener_id() -> ListenerId {
    ListenerId(LISTENER_ID.fetch_add(1, Ordering::Relaxed))
}

pub type EventFut<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Listener signature: receives the topic it matched on and the event payload.
pub type EventListener<E> =
    Arc<dyn for<'a> Fn(&'a str, &'a E) -> EventFut<'a> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPattern {
    Any,
    Exact(String),
}

impl TopicPattern {
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            TopicPattern::Any => true,
            TopicPattern::Exact(t) => t == topic,
        }
    }
}

struct ListenerEntry<E> {
    id: ListenerId,
    pattern: TopicPattern,
    listener: EventListener<E>,
    once: bool,
}

impl<E> Clone for ListenerEntry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            pattern: self.pattern.clone(),
            listener: self.listener.clone(),
            once: self.once,
        }
    }
}

/// Minimal runtime-agnostic event hub, generic over the event payload type.
pub struct EventHub<E>
where
    E: Send + Sync + 'static,
{
    listeners: Vec<ListenerEntry<E>>,
}

impl<E> Default for EventHub<E>
where
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventHub<E>
where
    E: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Subscribe to an exact topic.
    pub fn on(&mut self, topic: impl Into<String>, listener: EventListener<E>) -> ListenerId {
        self.on_pattern(TopicPattern::Exact(topic.into()), listener)
    }

    /// Subscribe to every topic.
    pub fn on_any(&mut self, listener: EventListener<E>) -> ListenerId {
        self.on_pattern(TopicPattern::Any, listener)
    }

    pub fn on_pattern(&mut self, pattern: TopicPattern, listener: EventListener<E>) -> ListenerId {
        let id = next_listener_id();
        self.listeners.push(ListenerEntry {
            id,
            pattern,
            listener,
            once: false,
        });
        id
    }

    pub fn once(&mut self, topic: impl Into<String>, listener: EventListener<E>) -> ListenerId {
        let id = next_listener_id();
        self.listeners.push(ListenerEntry {
            id,
            pattern: TopicPattern::Exact(topic.into()),
            listener,
            once: true,
        });
        id
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|e| e.id != id);
        before != self.listeners.len()
    }

    pub fn remove_all(&mut self, pattern: Option<&TopicPattern>) -> usize {
        let before = self.listeners.len();
        match pattern {
            Some(p) => self.listeners.retain(|e| &e.pattern != p),
            None => self.listeners.clear(),
        }
        before - self.listeners.len()
    }

    /// Phase 1: snapshot matching listeners. No `.await`, safe under a read-lock.
    pub fn snapshot_emit(&self, topic: &str) -> (Vec<EventListener<E>>, Vec<ListenerId>) {
        let mut to_call = Vec::new();
        let mut once_ids = Vec::new();
        for entry in &self.listeners {
            if entry.pattern.matches(topic) {
                to_call.push(entry.listener.clone());
                if entry.once {
                    once_ids.push(entry.id);
                }
            }
        }
        (to_call, once_ids)
    }

    /// Phase 3: retire `once` listeners. No `.await`, safe under a write-lock.
    pub fn finalize_once_removals(&mut self, once_ids: &[ListenerId]) {
        if once_ids.is_empty() {
            return;
        }
        self.listeners.retain(|e| !once_ids.contains(&e.id));
    }

    /// Convenience: snapshot, await, finalize, all in one call.
    pub async fn emit_async(&mut self, topic: &str, event: &E) -> Result<()> {
        let (listeners, once_ids) = {
            let hub: &Self = &*self;
            hub.snapshot_emit(topic)
        };
        for f in &listeners {
            f(topic, event).await?;
        }
        self.finalize_once_removals(&once_ids);
        Ok(())
    }
}
