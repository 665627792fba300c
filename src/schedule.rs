use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Handle to a pending timeout or interval. Dropping it cancels the timer,
/// so whoever holds the handle owns the timer's lifetime.
#[derive(Debug)]
pub struct Timer {
    token: Rc<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    Once,
    Every(Duration),
}

struct Pending<E> {
    due: Duration,
    seq: u64,
    repeat: Repeat,
    token: Weak<()>,
    event: E,
}

impl<E> Pending<E> {
    fn is_live(&self) -> bool {
        self.token.strong_count() > 0
    }
}

// BinaryHeap is a max-heap; order reversed so the earliest (due, seq) pops first.
impl<E> Ord for Pending<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for Pending<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> PartialEq for Pending<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Pending<E> {}

/// Single-threaded timer queue on a virtual clock.
///
/// The owner drives the clock: it calls [`Scheduler::pop_due`] in a loop,
/// handles each returned event (which may arm or drop timers), then calls
/// [`Scheduler::advance_to`]. A timer whose handle is dropped before it is
/// popped never fires.
pub struct Scheduler<E> {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Pending<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current virtual time since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `event` once, `delay` from now.
    pub fn set_timeout(&mut self, delay: Duration, event: E) -> Timer {
        self.arm(self.now + delay, Repeat::Once, event)
    }

    /// Fire `event` every `period`, first one `period` from now.
    ///
    /// Panics on a zero period: it would fire forever without time passing.
    pub fn set_interval(&mut self, period: Duration, event: E) -> Timer {
        assert!(!period.is_zero(), "interval period must be non-zero");
        self.arm(self.now + period, Repeat::Every(period), event)
    }

    fn arm(&mut self, due: Duration, repeat: Repeat, event: E) -> Timer {
        let token = Rc::new(());
        self.enqueue(due, repeat, Rc::downgrade(&token), event);
        Timer { token }
    }

    fn enqueue(&mut self, due: Duration, repeat: Repeat, token: Weak<()>, event: E) {
        self.seq += 1;
        self.queue.push(Pending {
            due,
            seq: self.seq,
            repeat,
            token,
            event,
        });
    }

    /// Drop cancelled entries sitting at the front of the queue.
    fn purge_front(&mut self) {
        while self.queue.peek().is_some_and(|p| !p.is_live()) {
            self.queue.pop();
        }
    }

    /// Due time of the earliest live timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|p| p.is_live())
            .map(|p| p.due)
            .min()
    }

    /// Time left until `timer` next fires, if it is still queued here.
    pub fn remaining(&self, timer: &Timer) -> Option<Duration> {
        let token = Rc::downgrade(&timer.token);
        self.queue
            .iter()
            .find(|p| p.token.ptr_eq(&token))
            .map(|p| p.due.saturating_sub(self.now))
    }

    /// Number of live timers.
    pub fn pending(&self) -> usize {
        self.queue.iter().filter(|p| p.is_live()).count()
    }

    /// Move the clock to `until` once every due timer has been handled.
    pub fn advance_to(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}

impl<E: Clone> Scheduler<E> {
    /// Pop the earliest live timer due at or before `until`.
    ///
    /// The clock jumps to that timer's due time. Intervals are re-queued one
    /// period after their previous due time, so a late caller still sees
    /// one event per elapsed period.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        self.purge_front();
        if self.queue.peek()?.due > until {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        if let Repeat::Every(period) = entry.repeat {
            self.enqueue(
                entry.due + period,
                entry.repeat,
                entry.token.clone(),
                entry.event.clone(),
            );
        }
        Some(entry.event)
    }
}
