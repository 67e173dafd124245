//! Network time collaborator
//!
//! The clock never speaks NTP itself. It asks a [`TimeSource`] for a sample
//! whenever a resync is due and tracks how the link has been doing.

use crate::time_base::TimeSample;

/// Supplier of absolute time, usually backed by Wi-Fi and NTP
///
/// Calls are synchronous and may be slow. Retries, if any, belong to the
/// implementation.
pub trait TimeSource {
    /// Fetch a fresh UTC sample
    fn fetch(&mut self) -> Option<TimeSample>;

    /// Check whether the network link is up
    fn is_connected(&self) -> bool {
        true
    }

    /// Release the network interface while the display is off
    fn power_down(&mut self) {}

    /// Re-acquire the network interface
    fn power_up(&mut self) {}
}

/// Health of the time source link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkHealth {
    /// Last fetch succeeded
    #[default]
    Ok,
    /// A few consecutive fetches failed
    Warning,
    /// More consecutive failures than the warning budget
    Error,
}

/// Consecutive-failure counter behind [`LinkHealth`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkMonitor {
    warning_failures: u8,
    consecutive_failures: u16,
}

impl LinkMonitor {
    pub(crate) const fn new(warning_failures: u8) -> Self {
        Self {
            warning_failures,
            consecutive_failures: 0,
        }
    }

    /// Record a successful fetch
    ///
    /// Returns the new health if it changed.
    pub(crate) fn record_success(&mut self) -> Option<LinkHealth> {
        let before = self.health();
        self.consecutive_failures = 0;
        Self::changed(before, self.health())
    }

    /// Record a failed fetch
    ///
    /// Returns the new health if it changed.
    pub(crate) fn record_failure(&mut self) -> Option<LinkHealth> {
        let before = self.health();
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        Self::changed(before, self.health())
    }

    pub(crate) fn health(&self) -> LinkHealth {
        match self.consecutive_failures {
            0 => LinkHealth::Ok,
            n if n <= u16::from(self.warning_failures) => LinkHealth::Warning,
            _ => LinkHealth::Error,
        }
    }

    pub(crate) const fn consecutive_failures(&self) -> u16 {
        self.consecutive_failures
    }

    fn changed(before: LinkHealth, after: LinkHealth) -> Option<LinkHealth> {
        if before == after { None } else { Some(after) }
    }
}
