#![allow(dead_code)]

//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - The playback scheduler and its tick task
//! - The downstream dispatcher handle
//! - The shared timecode reading
//! - Server configuration

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::scheduler::{Scheduler, TitleSink};
use crate::timecode::SharedTimecode;

/// Application state shared across all handlers
pub struct AppState {
    /// Playback scheduler, serialized behind one lock: only the tick task
    /// and the HTTP handlers touch it
    pub scheduler: Mutex<Scheduler>,

    /// Latest external timecode reading
    pub timecode: SharedTimecode,

    /// Tick task handle; present while the scheduler is running
    ticker: Mutex<Option<JoinHandle<()>>>,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState with the given configuration and title sink
    pub fn new(config: ServerConfig, sink: Arc<dyn TitleSink>) -> Self {
        let scheduler = Scheduler::new(sink, config.scheduler.hang_secs);
        Self {
            scheduler: Mutex::new(scheduler),
            timecode: SharedTimecode::new(),
            ticker: Mutex::new(None),
            config,
        }
    }

    /// Start the periodic tick task; no-op when it is already running
    pub fn start_ticker(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock();
        if ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        let state = Arc::clone(self);
        let period = Duration::from_millis(self.config.scheduler.tick_ms);
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                state.scheduler.lock().tick();
            }
        }));
    }

    /// Cancel the tick task before its next run; no-op when stopped
    pub fn stop_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }
    }

    /// Whether the tick task is currently running
    pub fn ticker_running(&self) -> bool {
        self.ticker
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;

    impl TitleSink for NullSink {
        fn show_title(&self, _lines: &[String]) {}
        fn clear_title(&self) {}
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig::default(), Arc::new(NullSink)))
    }

    #[tokio::test]
    async fn test_ticker_lifecycle() {
        let state = state();
        assert!(!state.ticker_running());

        state.start_ticker();
        assert!(state.ticker_running());

        // Starting again is a no-op
        state.start_ticker();
        assert!(state.ticker_running());

        state.stop_ticker();
        assert!(!state.ticker_running());
    }

    #[tokio::test]
    async fn test_state_creation() {
        let state = state();
        assert_eq!(state.scheduler.lock().segment_count(), 0);
        assert_eq!(state.timecode.get(), None);
    }
}
