//! Bounded collection utilities

use std::collections::VecDeque;

/// Capacity of a service's health history
pub const HEALTH_HISTORY_CAPACITY: usize = 100;

/// Maximum number of alerts retained in the alert history
pub const MAX_ALERT_HISTORY: usize = 1_000;

/// Helper trait for bounded VecDeque operations
pub(crate) trait BoundedPush<T> {
    /// Append at the back, evicting from the front when full
    fn push_bounded(&mut self, value: T, max_size: usize) -> Option<T>;

    /// Prepend at the front, evicting from the back when full
    fn push_front_bounded(&mut self, value: T, max_size: usize) -> Option<T>;
}

impl<T> BoundedPush<T> for VecDeque<T> {
    #[inline]
    fn push_bounded(&mut self, value: T, max_size: usize) -> Option<T> {
        let evicted = if self.len() >= max_size {
            self.pop_front()
        } else {
            None
        };
        self.push_back(value);
        evicted
    }

    #[inline]
    fn push_front_bounded(&mut self, value: T, max_size: usize) -> Option<T> {
        let evicted = if self.len() >= max_size {
            self.pop_back()
        } else {
            None
        };
        self.push_front(value);
        evicted
    }
}
