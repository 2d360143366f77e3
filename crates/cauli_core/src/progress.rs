//! Upload progress indicator.
//!
//! `Simulated` progress is cosmetic: it creeps towards 98 % on a timer and only
//! jumps to 100 % once the response has arrived. It says nothing about bytes on
//! the wire. `Transport` progress follows the bytes actually handed to the
//! HTTP client, still holding at 98 % until the response is read.

use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::ConfigError;

/// Interval between two simulated ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(300);
/// Value the indicator approaches but never passes before completion.
pub const CEILING: f64 = 98.0;
/// Share of the remaining distance covered per tick.
pub const TICK_RATE: f64 = 0.007;
pub const COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressMode {
    #[default]
    Simulated,
    Transport,
}

impl ProgressMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressMode::Simulated => "simulated",
            ProgressMode::Transport => "transport",
        }
    }
}

impl FromStr for ProgressMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "sim" => Ok(ProgressMode::Simulated),
            "transport" | "real" => Ok(ProgressMode::Transport),
            other => Err(ConfigError::ProgressMode(other.to_string())),
        }
    }
}

/// Progress of the current upload, always within [0, 100].
#[derive(Debug, Clone)]
pub struct UploadProgress {
    mode: ProgressMode,
    value: f64,
    started: Option<Instant>,
    ticks_applied: u64,
}

impl UploadProgress {
    pub fn new(mode: ProgressMode) -> Self {
        Self {
            mode,
            value: 0.0,
            started: None,
            ticks_applied: 0,
        }
    }

    pub fn mode(&self) -> ProgressMode {
        self.mode
    }

    /// Current value in percent.
    pub fn percent(&self) -> f64 {
        self.value
    }

    pub fn fraction(&self) -> f32 {
        (self.value / COMPLETE) as f32
    }

    /// Whether the ticker is running.
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Restarts from 0 and arms the ticker.
    pub fn start(&mut self, now: Instant) {
        self.value = 0.0;
        self.ticks_applied = 0;
        self.started = Some(now);
    }

    /// Applies every simulated tick due by `now`. No-op once stopped or in transport mode.
    pub fn poll(&mut self, now: Instant) -> f64 {
        if self.mode != ProgressMode::Simulated {
            return self.value;
        }
        let Some(started) = self.started else {
            return self.value;
        };
        let due = (now.saturating_duration_since(started).as_millis() / TICK_INTERVAL.as_millis())
            as u64;
        while self.ticks_applied < due {
            self.tick();
            self.ticks_applied += 1;
        }
        self.value
    }

    /// One simulated step towards the ceiling.
    pub fn tick(&mut self) {
        if self.value < CEILING {
            self.value = (self.value + (CEILING - self.value) * TICK_RATE).clamp(0.0, CEILING);
        }
    }

    /// Bytes handed to the transport so far. Ignored in simulated mode.
    pub fn on_transfer(&mut self, sent: u64, total: u64) {
        if self.mode != ProgressMode::Transport || self.started.is_none() || total == 0 {
            return;
        }
        let share = (sent.min(total) as f64 / total as f64) * CEILING;
        self.value = self.value.max(share).clamp(0.0, CEILING);
    }

    /// Snaps to 100 and stops the ticker, on success and on failure alike.
    pub fn finish(&mut self) {
        self.started = None;
        self.value = COMPLETE;
    }

    pub fn reset(&mut self) {
        self.started = None;
        self.ticks_applied = 0;
        self.value = 0.0;
    }
}

impl Default for UploadProgress {
    fn default() -> Self {
        Self::new(ProgressMode::default())
    }
}
