//! Monitor relations and exit hooks.
//!
//! The registry only records who watches whom. Liveness checks and the
//! delivery of `Down` envelopes happen in the system, which takes this
//! registry's lock before the arena lock.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use wren_api::{ActorId, DownNotification};

/// Callback run once when its target terminates.
pub(crate) type ExitHook = Box<dyn FnOnce(&DownNotification) + Send>;

/// Everything to notify about one terminated subject.
pub(crate) struct Obituary {
    pub(crate) observers: Vec<ActorId>,
    pub(crate) hooks: Vec<ExitHook>,
}

#[derive(Default)]
pub(crate) struct MonitorRegistry {
    /// subject -> observers
    observers: HashMap<ActorId, BTreeSet<ActorId>>,
    /// observer -> subjects
    subjects: HashMap<ActorId, BTreeSet<ActorId>>,
    hooks: HashMap<ActorId, Vec<ExitHook>>,
}

impl MonitorRegistry {
    /// Records that `observer` watches `subject`. Returns false if the
    /// relation already existed.
    pub(crate) fn insert(&mut self, observer: ActorId, subject: ActorId) -> bool {
        let added = self.observers.entry(subject).or_default().insert(observer);
        if added {
            self.subjects.entry(observer).or_default().insert(subject);
        }
        added
    }

    pub(crate) fn remove(&mut self, observer: ActorId, subject: ActorId) -> bool {
        let removed = remove_from(&mut self.observers, subject, observer);
        if removed {
            remove_from(&mut self.subjects, observer, subject);
        }
        removed
    }

    pub(crate) fn attach_hook(&mut self, subject: ActorId, hook: ExitHook) {
        self.hooks.entry(subject).or_default().push(hook);
    }

    /// Removes every relation involving `subject` and returns whom to
    /// notify. A second call for the same subject returns nothing.
    pub(crate) fn take(&mut self, subject: ActorId) -> Obituary {
        let observers: Vec<ActorId> = self
            .observers
            .remove(&subject)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for observer in &observers {
            remove_from(&mut self.subjects, *observer, subject);
        }

        // The subject no longer watches anyone either.
        if let Some(watched) = self.subjects.remove(&subject) {
            for other in watched {
                remove_from(&mut self.observers, other, subject);
            }
        }

        Obituary {
            observers,
            hooks: self.hooks.remove(&subject).unwrap_or_default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn observers_of(&self, subject: ActorId) -> Vec<ActorId> {
        self.observers
            .get(&subject)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn subjects_of(&self, observer: ActorId) -> Vec<ActorId> {
        self.subjects
            .get(&observer)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty() && self.subjects.is_empty() && self.hooks.is_empty()
    }
}

fn remove_from(map: &mut HashMap<ActorId, BTreeSet<ActorId>>, key: ActorId, value: ActorId) -> bool {
    let Some(set) = map.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(&value);
    if set.is_empty() {
        map.remove(&key);
    }
    removed
}

impl fmt::Debug for MonitorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("observers", &self.observers)
            .field("hooks", &self.hooks.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wren_api::ExitReason;

    #[test]
    fn test_insert_is_idempotent() {
        let mut registry = MonitorRegistry::default();
        let (observer, subject) = (ActorId::next(), ActorId::next());

        assert!(registry.insert(observer, subject));
        assert!(!registry.insert(observer, subject));
        assert_eq!(registry.observers_of(subject), vec![observer]);
        assert_eq!(registry.subjects_of(observer), vec![subject]);
    }

    #[test]
    fn test_take_clears_both_directions() {
        let mut registry = MonitorRegistry::default();
        let (a, b, c) = (ActorId::next(), ActorId::next(), ActorId::next());
        registry.insert(a, b);
        registry.insert(c, b);
        registry.insert(b, a);

        let obituary = registry.take(b);
        assert_eq!(obituary.observers, vec![a, c]);
        assert!(registry.observers_of(a).is_empty());
        assert!(registry.is_empty());

        let again = registry.take(b);
        assert!(again.observers.is_empty());
        assert!(again.hooks.is_empty());
    }

    #[test]
    fn test_remove_relation() {
        let mut registry = MonitorRegistry::default();
        let (observer, subject) = (ActorId::next(), ActorId::next());
        registry.insert(observer, subject);

        assert!(registry.remove(observer, subject));
        assert!(!registry.remove(observer, subject));
        assert!(registry.take(subject).observers.is_empty());
    }

    #[test]
    fn test_hooks_are_taken_once() {
        let mut registry = MonitorRegistry::default();
        let subject = ActorId::next();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let calls = calls.clone();
            registry.attach_hook(
                subject,
                Box::new(move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        let note = DownNotification::new(subject, ExitReason::Normal);
        for hook in registry.take(subject).hooks {
            hook(&note);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.take(subject).hooks.is_empty());
    }
}
