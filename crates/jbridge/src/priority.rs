//! Converter Priorities
//!
//! A priority is a plain `f64` with a total order: higher priorities are
//! tried first. The named bands leave room for offsets, so a rule that must
//! beat the stock rules of its band can use `Priority::NORMAL + 1.0`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// Priority of a converter; higher wins.
#[derive(Debug, Clone, Copy)]
pub struct Priority(pub f64);

impl Priority {
    pub const FIRST: Priority = Priority(1e300);
    pub const EXTREMELY_HIGH: Priority = Priority(1e6);
    pub const VERY_HIGH: Priority = Priority(1e4);
    pub const HIGH: Priority = Priority(1e2);
    pub const NORMAL: Priority = Priority(0.0);
    pub const LOW: Priority = Priority(-1e2);
    pub const VERY_LOW: Priority = Priority(-1e4);
    pub const EXTREMELY_LOW: Priority = Priority(-1e6);
    pub const LAST: Priority = Priority(-1e300);

    /// The raw value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for Priority {
    type Output = Priority;

    fn add(self, rhs: f64) -> Priority {
        Priority(self.0 + rhs)
    }
}

impl Sub<f64> for Priority {
    type Output = Priority;

    fn sub(self, rhs: f64) -> Priority {
        Priority(self.0 - rhs)
    }
}

impl From<f64> for Priority {
    fn from(value: f64) -> Self {
        Priority(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
