use log::debug;
use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

/// Repeating, cancelable timer facility provided by the host.
pub trait Timer {
    fn start(&mut self, interval: Duration) -> TimerToken;

    fn cancel(&mut self, token: TimerToken);

    /// Tokens whose deadline passed at `now`. Each one is rescheduled.
    fn expired(&mut self, now: Instant) -> Vec<TimerToken>;

    fn next_deadline(&self) -> Option<Instant>;
}

struct Entry {
    interval: Duration,
    due: Instant,
}

#[derive(Default)]
pub struct IntervalTimer {
    next_token: u64,
    entries: BTreeMap<TimerToken, Entry>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn active(&self) -> usize {
        self.entries.len()
    }

    fn start_at(&mut self, interval: Duration, now: Instant) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;

        self.entries.insert(
            token,
            Entry {
                interval,
                due: now + interval,
            },
        );
        debug!("Started timer {:?} every {:?}", token, interval);

        token
    }
}

impl Timer for IntervalTimer {
    fn start(&mut self, interval: Duration) -> TimerToken {
        self.start_at(interval, Instant::now())
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.entries.remove(&token).is_some() {
            debug!("Cancelled timer {:?}", token);
        }
    }

    fn expired(&mut self, now: Instant) -> Vec<TimerToken> {
        let mut fired = Vec::new();

        for (token, entry) in self.entries.iter_mut() {
            if entry.due <= now {
                fired.push(*token);
                entry.due = now + entry.interval;
            }
        }

        fired
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|e| e.due).min()
    }
}
