//! Ordered observer registries with handle-based removal.

/// Handle returned when an observer is registered.
///
/// Handles are never reused within a registry, so removing with a stale
/// handle is a no-op rather than removing someone else's observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observers notified in registration order.
pub struct Observers<T: ?Sized> {
    entries: Vec<(ObserverId, Box<T>)>,
    next_id: u64,
}

impl<T: ?Sized> Observers<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, observer: Box<T>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Remove an observer, handing it back to the caller.
    pub fn remove(&mut self, id: ObserverId) -> Option<Box<T>> {
        let index = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, observer)| observer.as_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> Box<dyn FnMut()> {
        let log = Rc::clone(log);
        Box::new(move || log.borrow_mut().push(name))
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Log::default();
        let mut observers: Observers<dyn FnMut()> = Observers::new();
        observers.add(recorder(&log, "first"));
        observers.add(recorder(&log, "second"));
        observers.add(recorder(&log, "third"));

        for observer in observers.iter_mut() {
            observer();
        }

        assert_eq!(*log.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn removal_by_handle_keeps_the_others() {
        let log = Log::default();
        let mut observers: Observers<dyn FnMut()> = Observers::new();
        observers.add(recorder(&log, "first"));
        let second = observers.add(recorder(&log, "second"));
        observers.add(recorder(&log, "third"));

        assert!(observers.remove(second).is_some());
        assert!(observers.remove(second).is_none());
        assert_eq!(observers.len(), 2);

        for observer in observers.iter_mut() {
            observer();
        }
        assert_eq!(*log.borrow(), ["first", "third"]);
    }
}
