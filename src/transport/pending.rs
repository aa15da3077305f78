use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::error::TransportError;

type Slots = HashMap<String, Option<Value>>;

/// Correlation map of in-flight calls, keyed by callback name.
///
/// A name is live from [`PendingCalls::register`] until its [`PendingCall`]
/// guard is consumed or dropped, whichever path the call takes.
#[derive(Debug, Clone, Default)]
pub struct PendingCalls {
    slots: Arc<Mutex<Slots>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a callback name. Returns `None` if the name is already live.
    pub fn register(&self, name: String) -> Option<PendingCall> {
        let mut slots = self.lock();
        if slots.contains_key(&name) {
            return None;
        }
        slots.insert(name.clone(), None);
        Some(PendingCall {
            name,
            calls: self.clone(),
        })
    }

    /// Deliver a payload to the call waiting on `name`
    pub fn dispatch(&self, name: &str, value: Value) -> Result<(), TransportError> {
        let mut slots = self.lock();
        match slots.get_mut(name) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value);
                Ok(())
            }
            _ => Err(TransportError::UnknownCallback(name.to_string())),
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Registration of one in-flight call; unregisters itself when dropped
#[derive(Debug)]
pub struct PendingCall {
    name: String,
    calls: PendingCalls,
}

impl PendingCall {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unregister and return the delivered payload, if any
    pub fn take(self) -> Option<Value> {
        // The lock must be released before `drop` takes it again
        let value = self.calls.lock().remove(&self.name).flatten();
        value
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.calls.lock().remove(&self.name);
    }
}
