//! Playback capability seam.
//!
//! The engine never owns a transport: it consumes position updates and emits
//! play/pause/seek requests through whatever controller the surrounding
//! application injects. The bundled `clock` module is a transport-free
//! controller used by the headless `follow` mode and by tests.

pub mod clock;

/// Events a player controller reports back to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Ended,
}

/// The injected controller capability. The session only ever calls these
/// three; time flows back as `PlayerEvent`s.
pub trait PlayerControl {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
}

/// Controller that swallows every request, for render-only paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayer;

impl PlayerControl for NullPlayer {
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _seconds: f64) {}
}
