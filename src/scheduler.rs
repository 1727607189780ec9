//! Playback scheduler
//!
//! A clock-driven state machine that selects the display segment covering
//! the current playback position and issues show/clear commands through a
//! [`TitleSink`]. The position comes from a [`TimeSource`]: either the
//! local monotonic clock pinned to a VTT-time origin, or the latest
//! reading from the external timecode feed.

use std::sync::Arc;
use std::time::Instant;

use crate::segment::Segment;

/// Supplies the current playback position in seconds
///
/// Returns `None` when no reading is available yet (external mode before
/// the first timecode datagram).
pub trait TimeSource: Send + Sync {
    fn current_time(&self) -> Option<f64>;
}

/// Receives the show/clear commands produced by scheduler ticks
pub trait TitleSink: Send + Sync {
    fn show_title(&self, lines: &[String]);
    fn clear_title(&self);
}

/// Monotonic clock pinned to a VTT-time origin
pub struct AutonomousClock {
    origin_vtt_s: f64,
    origin: Instant,
}

impl AutonomousClock {
    /// Start counting from `origin_vtt_s` now
    pub fn new(origin_vtt_s: f64) -> Self {
        Self {
            origin_vtt_s,
            origin: Instant::now(),
        }
    }
}

impl TimeSource for AutonomousClock {
    fn current_time(&self) -> Option<f64> {
        Some(self.origin_vtt_s + self.origin.elapsed().as_secs_f64())
    }
}

/// Which clock drives playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMode {
    /// Timecode feed from the video mixer
    External,
    /// Local monotonic clock
    Autonomous,
}

impl TimeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeMode::External => "external",
            TimeMode::Autonomous => "autonomous",
        }
    }
}

impl std::str::FromStr for TimeMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "external" => Ok(TimeMode::External),
            "autonomous" => Ok(TimeMode::Autonomous),
            _ => Err(()),
        }
    }
}

/// Clock-driven playback state machine
///
/// Mutated only from serialized contexts (the tick task and the HTTP
/// handlers); see the locking in `AppState`.
pub struct Scheduler {
    segments: Vec<Segment>,
    time_source: Option<Box<dyn TimeSource>>,
    sink: Arc<dyn TitleSink>,
    last_shown: Option<usize>,
    hang_secs: f64,
}

impl Scheduler {
    pub fn new(sink: Arc<dyn TitleSink>, hang_secs: f64) -> Self {
        Self {
            segments: Vec::new(),
            time_source: None,
            sink,
            last_shown: None,
            hang_secs,
        }
    }

    /// Replace the segment list and clock, dropping any shown-segment state
    pub fn load(&mut self, segments: Vec<Segment>, time_source: Box<dyn TimeSource>) {
        self.segments = segments;
        self.time_source = Some(time_source);
        self.last_shown = None;
    }

    /// Clear the title and reset shown-segment state
    ///
    /// Always dispatches one clear, even when nothing was shown.
    pub fn stop(&mut self) {
        self.sink.clear_title();
        self.last_shown = None;
    }

    /// Number of loaded segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// One scheduler tick
    ///
    /// Reads the clock, finds the segment covering the position and issues
    /// at most one show or clear. A title whose segment has ended stays on
    /// screen while the next segment starts within the hang window.
    pub fn tick(&mut self) {
        let Some(t) = self.time_source.as_ref().and_then(|s| s.current_time()) else {
            return;
        };

        if self.segments.is_empty() {
            if self.last_shown.is_some() {
                self.sink.clear_title();
                self.last_shown = None;
            }
            return;
        }

        let current = self
            .segments
            .iter()
            .position(|s| t >= s.start_s && t < s.end_s);

        match current {
            Some(index) if Some(index) != self.last_shown => {
                tracing::debug!(index, t, "showing segment");
                self.sink.show_title(&self.segments[index].lines);
                self.last_shown = Some(index);
            }
            Some(_) => {}
            None => {
                let gap_to_next = self
                    .segments
                    .iter()
                    .find(|s| s.start_s > t)
                    .map(|s| s.start_s - t)
                    .unwrap_or(f64::INFINITY);
                if self.last_shown.is_some() && gap_to_next > self.hang_secs {
                    tracing::debug!(t, "clearing title");
                    self.sink.clear_title();
                    self.last_shown = None;
                }
            }
        }
    }
}
