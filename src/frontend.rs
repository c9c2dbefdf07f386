//! Interfaces for the presentation side
//!
//! Renderers and audio only ever read a `StateSnapshot` and the per-tick
//! `GameEvent` list. Nothing here can reach back into the simulation.

use glam::Vec2;

use crate::sim::{GameEvent, StateSnapshot};

/// Anything that displays the game
pub trait Presenter {
    /// Draw the latest state; `events` are everything since the last call
    fn present(&mut self, snapshot: &StateSnapshot, events: &[GameEvent]);

    /// The display surface changed size
    fn set_viewport(&mut self, _viewport: Viewport) {}
}

/// Maps the normalized field onto a pixel surface.
///
/// Immutable: a resize builds a new viewport via `resized` and hands it to the
/// presenter. The field keeps its aspect and is centered (letterboxed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Pixels per field unit
    pub scale: f32,
    /// Pixel position of field origin
    pub offset: Vec2,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let scale = w.min(h);
        Self {
            width,
            height,
            scale,
            offset: Vec2::new((w - scale) * 0.5, (h - scale) * 0.5),
        }
    }

    /// Viewport for a new surface size. Zero-sized surfaces (minimized
    /// windows) keep the current mapping.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            *self
        } else {
            Self::new(width, height)
        }
    }

    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }
}

/// Audio cues an audio backend plays for simulation events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Launch,
    PaddleHit,
    WallHit,
    /// Block hit but not destroyed
    BlockHit,
    BlockBreak,
    LifeLost,
    GameOver,
    Victory,
}

impl SoundCue {
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::BallLaunched => Some(SoundCue::Launch),
            GameEvent::PaddleHit => Some(SoundCue::PaddleHit),
            GameEvent::WallHit => Some(SoundCue::WallHit),
            GameEvent::BlockChipped { .. } => Some(SoundCue::BlockHit),
            GameEvent::BlockDestroyed { .. } => Some(SoundCue::BlockBreak),
            GameEvent::LifeLost { .. } => Some(SoundCue::LifeLost),
            GameEvent::GameOver => Some(SoundCue::GameOver),
            GameEvent::Victory => Some(SoundCue::Victory),
            GameEvent::Jumped => None,
        }
    }

    /// Cues for a batch of events, in order
    pub fn from_events(events: &[GameEvent]) -> Vec<Self> {
        events.iter().filter_map(Self::for_event).collect()
    }
}

/// Headless presenter that reports score and lives changes to the log
#[derive(Debug, Default)]
pub struct LogPresenter {
    viewport: Option<Viewport>,
    last: Option<(u64, u32)>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, snapshot: &StateSnapshot, events: &[GameEvent]) {
        for cue in SoundCue::from_events(events) {
            log::trace!("cue {:?}", cue);
        }

        let now = (snapshot.score, snapshot.lives);
        if self.last != Some(now) {
            let remaining = snapshot.blocks.iter().filter(|b| b.active).count();
            log::info!(
                "score {} | lives {} | blocks left {}",
                snapshot.score,
                snapshot.lives,
                remaining
            );
            self.last = Some(now);
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        log::debug!("viewport {}x{}", viewport.width, viewport.height);
        self.viewport = Some(viewport);
    }
}
