//! Simulated playback clock.
//!
//! Emits `Position` events from a tokio interval while "playing". Pausing
//! tears the ticker task down; nothing emits while paused. Position is kept
//! in milliseconds in an atomic so seeks apply without locking the ticker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{PlayerControl, PlayerEvent};

pub struct SimulatedClock {
    tx: mpsc::Sender<PlayerEvent>,
    tick: Duration,
    /// Playback rate; 8.0 plays a song through eight times faster.
    speed: f64,
    position_ms: Arc<AtomicU64>,
    duration: f64,
    ticker: Option<JoinHandle<()>>,
}

impl SimulatedClock {
    pub fn new(tx: mpsc::Sender<PlayerEvent>, tick_ms: u64, speed: f64, duration: f64) -> Self {
        let _ = tx.try_send(PlayerEvent::Duration { seconds: duration });
        Self {
            tx,
            tick: Duration::from_millis(tick_ms.max(1)),
            speed: if speed > 0.0 { speed } else { 1.0 },
            position_ms: Arc::new(AtomicU64::new(0)),
            duration,
            ticker: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn position(&self) -> f64 {
        self.position_ms.load(Ordering::Relaxed) as f64 / 1000.0
    }

    fn spawn_ticker(&mut self) {
        let tx = self.tx.clone();
        let position_ms = self.position_ms.clone();
        let tick = self.tick;
        let step_ms = (tick.as_secs_f64() * self.speed * 1000.0) as u64;
        let duration = self.duration;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                let now_ms = position_ms.fetch_add(step_ms, Ordering::Relaxed) + step_ms;
                let seconds = now_ms as f64 / 1000.0;
                if tx.send(PlayerEvent::Position { seconds }).await.is_err() {
                    break;
                }
                if duration > 0.0 && seconds >= duration {
                    let _ = tx.send(PlayerEvent::Ended).await;
                    break;
                }
            }
        }));
    }
}

impl PlayerControl for SimulatedClock {
    fn play(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let _ = self.tx.try_send(PlayerEvent::Started);
        self.spawn_ticker();
    }

    fn pause(&mut self) {
        // Cancellation is ticker teardown: no events while paused.
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            let _ = self.tx.try_send(PlayerEvent::Paused);
        }
    }

    fn seek(&mut self, seconds: f64) {
        let clamped = seconds.max(0.0);
        self.position_ms
            .store((clamped * 1000.0) as u64, Ordering::Relaxed);
    }
}

impl Drop for SimulatedClock {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_while_playing() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut clock = SimulatedClock::new(tx, 5, 1.0, 600.0);
        clock.play();

        assert_eq!(rx.recv().await, Some(PlayerEvent::Duration { seconds: 600.0 }));
        assert_eq!(rx.recv().await, Some(PlayerEvent::Started));
        let ev = rx.recv().await;
        assert!(matches!(ev, Some(PlayerEvent::Position { seconds }) if seconds > 0.0));
    }

    #[tokio::test]
    async fn test_pause_stops_ticks() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut clock = SimulatedClock::new(tx, 5, 1.0, 600.0);
        clock.play();
        clock.pause();
        assert!(!clock.is_playing());

        // Drain whatever was in flight; the stream must end with Paused.
        let mut last = None;
        while let Ok(ev) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
            last = ev;
            if last.is_none() {
                break;
            }
        }
        assert_eq!(last, Some(PlayerEvent::Paused));
    }

    #[tokio::test]
    async fn test_seek_moves_position() {
        let (tx, _rx) = mpsc::channel(64);
        let mut clock = SimulatedClock::new(tx, 5, 1.0, 600.0);
        clock.seek(42.5);
        assert_eq!(clock.position(), 42.5);
        clock.seek(-5.0);
        assert_eq!(clock.position(), 0.0);
    }

    #[tokio::test]
    async fn test_ends_at_duration() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut clock = SimulatedClock::new(tx, 1, 50.0, 0.2);
        clock.play();

        let mut saw_end = false;
        while let Ok(Some(ev)) = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
            if ev == PlayerEvent::Ended {
                saw_end = true;
                break;
            }
        }
        assert!(saw_end);
    }
}
