use crate::Identity;
use std::sync::{Arc, Mutex, Weak};

type Listener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Observable identity value shared by auth providers.
///
/// Listeners run synchronously inside `publish`, in registration order.
#[derive(Clone, Default)]
pub struct IdentityFeed {
    current: Arc<Mutex<Option<Identity>>>,
    listeners: Arc<Mutex<Listeners>>,
}

impl IdentityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.lock().map(|c| c.clone()).unwrap_or(None)
    }

    pub fn publish(&self, identity: Option<Identity>) {
        if let Ok(mut current) = self.current.lock() {
            *current = identity.clone();
        }
        // Snapshot so a listener may unsubscribe without deadlocking.
        let listeners: Vec<Listener> = match self.listeners.lock() {
            Ok(l) => l.entries.iter().map(|(_, f)| f.clone()).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(identity.clone());
        }
    }

    pub fn subscribe(&self, on_change: Box<dyn Fn(Option<Identity>) + Send + Sync>) -> Unsubscribe {
        let id = match self.listeners.lock() {
            Ok(mut l) => {
                let id = l.next_id;
                l.next_id += 1;
                l.entries.push((id, Arc::from(on_change)));
                id
            }
            Err(_) => 0,
        };
        Unsubscribe {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.entries.len()).unwrap_or(0)
    }
}

/// Handle returned by `subscribe`; removes the listener when dropped.
pub struct Unsubscribe {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Unsubscribe {
    pub fn unsubscribe(self) {}
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if let Ok(mut l) = listeners.lock() {
                l.entries.retain(|(id, _)| *id != self.id);
            }
        }
    }
}
