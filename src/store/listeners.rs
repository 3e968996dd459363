//! Change notification with batching.
//!
//! Listeners are called synchronously, in subscription order, after a
//! mutation has been fully applied. Inside a batch, changes only mark the
//! notifier dirty; closing the outermost batch schedules one coalesced
//! notification after the debounce window.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Removes the listener. Safe to call from inside a notification; the
    /// listener is skipped from the next notification on.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

pub struct Notifier {
    registry: Rc<RefCell<Registry>>,
    debounce: Duration,
    batch_depth: usize,
    dirty: bool,
    due: Option<Instant>,
}

impl Notifier {
    pub fn new(debounce: Duration) -> Self {
        Self {
            registry: Rc::default(),
            debounce,
            batch_depth: 0,
            dirty: false,
            due: None,
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn() + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Whether a coalesced notification is waiting for its window.
    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Records a completed mutation.
    pub fn changed(&mut self) {
        if self.in_batch() {
            self.dirty = true;
        } else {
            self.notify();
        }
    }

    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Closes one batch level. Closing the outermost dirty batch schedules
    /// the notification, or fires it at once when there is no window.
    pub fn end_batch(&mut self, now: Instant) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 || !self.dirty {
            return;
        }
        self.dirty = false;
        if self.debounce.is_zero() {
            self.notify();
        } else {
            self.due = Some(now + self.debounce);
        }
    }

    /// Fires the scheduled notification if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.notify();
                true
            }
            _ => false,
        }
    }

    /// Fires the scheduled notification without waiting.
    pub fn flush(&mut self) -> bool {
        if self.due.is_some() {
            self.notify();
            true
        } else {
            false
        }
    }

    fn notify(&mut self) {
        self.due = None;
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .field("debounce", &self.debounce)
            .field("batch_depth", &self.batch_depth)
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter(notifier: &mut Notifier) -> (Rc<Cell<u32>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let sub = notifier.subscribe(move || seen.set(seen.get() + 1));
        (count, sub)
    }

    #[test]
    fn test_change_outside_batch_notifies_immediately() {
        let mut notifier = Notifier::new(Duration::from_millis(16));
        let (count, _sub) = counter(&mut notifier);
        notifier.changed();
        notifier.changed();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_batch_coalesces_after_window() {
        let mut notifier = Notifier::new(Duration::from_millis(16));
        let (count, _sub) = counter(&mut notifier);
        let start = Instant::now();

        notifier.begin_batch();
        for _ in 0..10 {
            notifier.changed();
        }
        notifier.end_batch(start);
        assert_eq!(count.get(), 0);
        assert!(notifier.is_pending());

        assert!(!notifier.poll(start + Duration::from_millis(5)));
        assert!(notifier.poll(start + Duration::from_millis(16)));
        assert!(!notifier.poll(start + Duration::from_millis(100)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_nested_batches_fire_once() {
        let mut notifier = Notifier::new(Duration::ZERO);
        let (count, _sub) = counter(&mut notifier);
        let now = Instant::now();

        notifier.begin_batch();
        notifier.changed();
        notifier.begin_batch();
        notifier.changed();
        notifier.end_batch(now);
        assert_eq!(count.get(), 0);
        notifier.end_batch(now);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_clean_batch_is_silent() {
        let mut notifier = Notifier::new(Duration::ZERO);
        let (count, _sub) = counter(&mut notifier);
        notifier.begin_batch();
        notifier.end_batch(Instant::now());
        notifier.end_batch(Instant::now());
        assert_eq!(count.get(), 0);
        assert!(!notifier.flush());
    }

    #[test]
    fn test_unsubscribe() {
        let mut notifier = Notifier::new(Duration::ZERO);
        let (count, sub) = counter(&mut notifier);
        sub.unsubscribe();
        notifier.changed();
        assert_eq!(count.get(), 0);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_notification() {
        let mut notifier = Notifier::new(Duration::ZERO);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();
        let calls = Rc::new(Cell::new(0));

        let inner_slot = Rc::clone(&slot);
        let inner_calls = Rc::clone(&calls);
        let sub = notifier.subscribe(move || {
            inner_calls.set(inner_calls.get() + 1);
            if let Some(sub) = inner_slot.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(sub);

        notifier.changed();
        notifier.changed();
        assert_eq!(calls.get(), 1);
    }
}
