//! # Migration Ordering Keys
//!
//! Migration files are named `YYYY_MM_DD_HHMMSS_NN_create_<table>_table.php`.
//! The host framework runs them in string order, so keys handed out for one
//! module must be strictly increasing, including several within one clock
//! second and across separate runs.
//!
//! [`ClockSequence`] derives keys from an injectable [`Clock`]. It remembers the
//! last key per module and is seeded from keys already on disk with
//! [`MigrationSequence::observe`]. When the two-digit counter would pass 99 the key
//! moves on to the next second.
//!
//! A framework migration without a counter (`2024_05_01_120000_create_users_table`)
//! sorts after every `2024_05_01_120000_NN` key, because digits sort before
//! letters. Such a file therefore claims its whole second and the next key
//! starts at the following one.

use std::cell::Cell;
use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDateTime, Timelike};

const STAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";
const STAMP_LEN: usize = 17;
const MAX_COUNTER: u8 = 99;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    at: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at: Cell::new(at) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.at.set(at);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Hands out migration ordering keys.
pub trait MigrationSequence {
    /// The next key for `module_key`, greater than every key handed out or
    /// observed for it before.
    fn next(&mut self, module_key: &str) -> String;

    /// Record a key that already exists for `module_key`, typically the prefix
    /// of a migration file found on disk. Unparseable names are ignored.
    fn observe(&mut self, module_key: &str, file_name: &str);
}

/// A parsed ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderingKey {
    pub stamp: NaiveDateTime,
    pub counter: u8,
}

impl OrderingKey {
    /// Parse the ordering prefix of a migration file name.
    ///
    /// Accepts both `2024_05_01_120000_03_create_posts_table.php` and the
    /// framework's own `2024_05_01_120000_create_posts_table.php`. The latter
    /// gets the highest counter so no key of the same second sorts after it.
    pub fn parse_prefix(file_name: &str) -> Option<Self> {
        let stamp = NaiveDateTime::parse_from_str(file_name.get(..STAMP_LEN)?, STAMP_FORMAT).ok()?;
        let rest = &file_name[STAMP_LEN..];
        let counter = rest
            .strip_prefix('_')
            .and_then(|r| {
                let digits = r.get(..2)?;
                let boundary = r[2..].is_empty() || r[2..].starts_with('_');
                (boundary && digits.bytes().all(|b| b.is_ascii_digit()))
                    .then(|| digits.parse().ok())
                    .flatten()
            })
            .unwrap_or(MAX_COUNTER);
        Some(Self { stamp, counter })
    }

    pub fn render(&self) -> String {
        format!("{}_{:02}", self.stamp.format(STAMP_FORMAT), self.counter)
    }
}

/// Clock-driven [`MigrationSequence`].
#[derive(Debug)]
pub struct ClockSequence<C: Clock> {
    clock: C,
    last: HashMap<String, OrderingKey>,
}

impl<C: Clock> ClockSequence<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last: HashMap::new(),
        }
    }
}

impl<C: Clock> MigrationSequence for ClockSequence<C> {
    fn next(&mut self, module_key: &str) -> String {
        let now = self.clock.now();
        let now = now.with_nanosecond(0).unwrap_or(now);
        let candidate = OrderingKey {
            stamp: now,
            counter: 0,
        };
        let key = match self.last.get(module_key) {
            Some(prev) if candidate <= *prev => {
                if prev.counter >= MAX_COUNTER {
                    OrderingKey {
                        stamp: prev.stamp + Duration::seconds(1),
                        counter: 0,
                    }
                } else {
                    OrderingKey {
                        stamp: prev.stamp,
                        counter: prev.counter + 1,
                    }
                }
            }
            _ => candidate,
        };
        self.last.insert(module_key.to_string(), key);
        key.render()
    }

    fn observe(&mut self, module_key: &str, file_name: &str) {
        if let Some(key) = OrderingKey::parse_prefix(file_name) {
            let slot = self.last.entry(module_key.to_string()).or_insert(key);
            if key > *slot {
                *slot = key;
            }
        }
    }
}
