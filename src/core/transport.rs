//! Playback transport.
//!
//! The controller owns the playhead clock. A [`MediaSurface`] (the preview
//! element) follows it: the surface clock is advisory and is forced back to
//! the model when it drifts past the configured tolerance.

use tracing::debug;

use crate::config::TransportConfig;
use crate::constants::DEFAULT_FPS;

/// The media-rendering surface the transport drives.
pub trait MediaSurface {
    /// Playback position reported by the surface, in seconds.
    fn current_time(&self) -> f64;
    fn is_playing(&self) -> bool;
    fn seek(&mut self, time: f64);
    fn play(&mut self);
    fn pause(&mut self);
    /// Output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
}

/// Outcome of comparing the surface clock against the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncAction {
    /// Within tolerance; nothing changed.
    InSync,
    /// Within tolerance during playback; the model took the surface time.
    AdoptedSurface,
    /// Past tolerance; the surface must seek to this time.
    ForceSurface(f64),
}

#[derive(Clone, Debug)]
pub struct TransportController {
    position: f64,
    playing: bool,
    volume: f64,
    muted: bool,
    frame_rate: f64,
    duration: f64,
    media_available: bool,
    config: TransportConfig,
}

impl Default for TransportController {
    fn default() -> Self {
        Self::new(TransportConfig::default(), DEFAULT_FPS)
    }
}

impl TransportController {
    pub fn new(config: TransportConfig, frame_rate: f64) -> Self {
        Self {
            position: 0.0,
            playing: false,
            volume: 1.0,
            muted: false,
            frame_rate: sanitize_frame_rate(frame_rate),
            duration: 0.0,
            media_available: false,
            config,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn media_available(&self) -> bool {
        self.media_available
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn set_frame_rate(&mut self, frame_rate: f64) {
        self.frame_rate = sanitize_frame_rate(frame_rate);
    }

    /// Updates the timeline length, pulling the playhead back inside it.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        self.position = self.clamp_time(self.position);
        if self.playing && self.position >= self.duration {
            self.playing = false;
        }
    }

    /// Marks whether a playable source resolves. Losing it stops playback.
    pub fn set_media_available(&mut self, available: bool) {
        self.media_available = available;
        if !available && self.playing {
            debug!("media unavailable, pausing");
            self.playing = false;
        }
    }

    /// Starts playback. Ignored without media. At the end, restarts from 0.
    pub fn play(&mut self) -> bool {
        if !self.media_available {
            debug!("play ignored: no media");
            return false;
        }
        if self.position >= self.duration {
            self.position = 0.0;
        }
        if !self.playing {
            self.playing = true;
            debug!(position = self.position, "playback started");
        }
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.media_available {
            return false;
        }
        if self.playing {
            self.playing = false;
            debug!(position = self.position, "playback paused");
        }
        true
    }

    pub fn toggle_play(&mut self) -> bool {
        if self.playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Continuous seek. Clamped to the timeline; the play state is unchanged.
    pub fn seek(&mut self, time: f64) -> f64 {
        if time.is_finite() {
            self.position = self.clamp_time(time);
        }
        self.position
    }

    /// Drag-to-seek. Like [`seek`](Self::seek), but pauses when configured to.
    pub fn scrub(&mut self, time: f64) -> f64 {
        if self.config.pause_on_scrub {
            self.playing = false;
        }
        self.seek(time)
    }

    /// Moves exactly one frame forward (`forward == true`) or back.
    pub fn step_frame(&mut self, forward: bool) -> f64 {
        self.step_frames(if forward { 1 } else { -1 })
    }

    /// Moves `frames / frame_rate` seconds and clamps.
    pub fn step_frames(&mut self, frames: i32) -> f64 {
        let delta = f64::from(frames) / self.frame_rate;
        self.position = self.clamp_time(self.position + delta);
        self.position
    }

    /// Relative seek by `seconds`.
    pub fn jump(&mut self, seconds: f64) -> f64 {
        self.seek(self.position + seconds)
    }

    pub fn seek_start(&mut self) -> f64 {
        self.seek(0.0)
    }

    pub fn seek_end(&mut self) -> f64 {
        self.seek(self.duration)
    }

    /// Sets the output volume, clamped to `[0, 1]`. Mute is left alone.
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    /// Flips mute. Unmuting at zero volume restores the default level.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if !self.muted && self.volume <= 0.0 {
            self.volume = self.config.default_unmute_volume.clamp(0.0, 1.0);
        }
        self.muted
    }

    /// Advances the clock while playing. Returns true when playback reached the end.
    pub fn tick(&mut self, elapsed_seconds: f64) -> bool {
        if !self.playing || !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
            return false;
        }
        self.position = (self.position + elapsed_seconds).min(self.duration);
        if self.position >= self.duration {
            self.playing = false;
            debug!(position = self.position, "playback reached end");
            return true;
        }
        false
    }

    /// Compares the surface clock against the model.
    pub fn reconcile(&mut self, surface_time: f64) -> SyncAction {
        if !surface_time.is_finite() {
            return SyncAction::ForceSurface(self.position);
        }
        let drift = (surface_time - self.position).abs();
        if drift > self.config.drift_tolerance_seconds {
            debug!(drift, position = self.position, "surface drifted, forcing seek");
            return SyncAction::ForceSurface(self.position);
        }
        if self.playing {
            self.position = self.clamp_time(surface_time);
            return SyncAction::AdoptedSurface;
        }
        SyncAction::InSync
    }

    /// Pushes the transport state onto a surface.
    pub fn drive(&mut self, surface: &mut dyn MediaSurface) -> SyncAction {
        let action = self.reconcile(surface.current_time());
        if let SyncAction::ForceSurface(time) = action {
            surface.seek(time);
        }
        surface.set_volume(self.volume);
        surface.set_muted(self.muted);
        if self.playing && !surface.is_playing() {
            surface.play();
        } else if !self.playing && surface.is_playing() {
            surface.pause();
        }
        action
    }

    fn clamp_time(&self, time: f64) -> f64 {
        time.clamp(0.0, self.duration)
    }
}

fn sanitize_frame_rate(frame_rate: f64) -> f64 {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        frame_rate
    } else {
        DEFAULT_FPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSurface {
        time: f64,
        playing: bool,
        volume: f64,
        muted: bool,
        seeks: Vec<f64>,
    }

    impl MediaSurface for FakeSurface {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn seek(&mut self, time: f64) {
            self.time = time;
            self.seeks.push(time);
        }
        fn play(&mut self) {
            self.playing = true;
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    fn loaded(duration: f64) -> TransportController {
        let mut transport = TransportController::new(TransportConfig::default(), 30.0);
        transport.set_duration(duration);
        transport.set_media_available(true);
        transport
    }

    #[test]
    fn frame_step_is_exact() {
        let mut transport = loaded(10.0);
        transport.seek(1.0);
        transport.step_frame(true);
        assert!((transport.position() - (1.0 + 1.0 / 30.0)).abs() < 1e-9);
        for _ in 0..9 {
            transport.step_frame(true);
        }
        assert!((transport.position() - (1.0 + 10.0 / 30.0)).abs() < 1e-9);
        transport.step_frames(-10);
        assert!((transport.position() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn steps_and_seeks_clamp() {
        let mut transport = loaded(2.0);
        assert_eq!(transport.step_frame(false), 0.0);
        assert_eq!(transport.seek(5.0), 2.0);
        assert_eq!(transport.jump(-0.5), 1.5);
        assert_eq!(transport.seek(f64::NAN), 1.5);
    }

    #[test]
    fn play_without_media_is_ignored() {
        let mut transport = TransportController::default();
        transport.set_duration(10.0);
        assert!(!transport.play());
        assert!(!transport.is_playing());
        assert!(!transport.toggle_play());
    }

    #[test]
    fn seek_keeps_play_state_scrub_pauses() {
        let mut transport = loaded(10.0);
        transport.play();
        transport.seek(4.0);
        assert!(transport.is_playing());
        transport.scrub(5.0);
        assert!(!transport.is_playing());
        assert_eq!(transport.position(), 5.0);

        let config = TransportConfig {
            pause_on_scrub: false,
            ..TransportConfig::default()
        };
        let mut transport = TransportController::new(config, 30.0);
        transport.set_duration(10.0);
        transport.set_media_available(true);
        transport.play();
        transport.scrub(3.0);
        assert!(transport.is_playing());
    }

    #[test]
    fn tick_stops_at_end_and_play_restarts() {
        let mut transport = loaded(1.0);
        transport.play();
        assert!(!transport.tick(0.5));
        assert!(transport.tick(0.75));
        assert!(!transport.is_playing());
        assert_eq!(transport.position(), 1.0);

        transport.play();
        assert_eq!(transport.position(), 0.0);
        assert!(transport.is_playing());
    }

    #[test]
    fn volume_and_mute_are_independent() {
        let mut transport = loaded(1.0);
        transport.set_volume(1.7);
        assert_eq!(transport.volume(), 1.0);
        transport.toggle_mute();
        assert!(transport.is_muted());
        assert_eq!(transport.volume(), 1.0);

        transport.set_volume(0.0);
        assert!(transport.is_muted());
        assert!(!transport.toggle_mute());
        assert_eq!(transport.volume(), 0.5);
    }

    #[test]
    fn reconcile_forces_on_large_drift_only() {
        let mut transport = loaded(10.0);
        transport.seek(2.0);
        assert_eq!(transport.reconcile(2.5), SyncAction::ForceSurface(2.0));
        assert_eq!(transport.reconcile(2.05), SyncAction::InSync);
        assert_eq!(transport.position(), 2.0);

        transport.play();
        assert_eq!(transport.reconcile(2.05), SyncAction::AdoptedSurface);
        assert_eq!(transport.position(), 2.05);
    }

    #[test]
    fn drive_syncs_surface() {
        let mut transport = loaded(10.0);
        transport.seek(3.0);
        transport.play();
        transport.toggle_mute();
        let mut surface = FakeSurface::default();

        assert_eq!(transport.drive(&mut surface), SyncAction::ForceSurface(3.0));
        assert_eq!(surface.seeks, vec![3.0]);
        assert!(surface.playing);
        assert!(surface.muted);
        assert_eq!(surface.volume, 1.0);

        transport.pause();
        transport.drive(&mut surface);
        assert!(!surface.playing);
    }

    #[test]
    fn losing_media_pauses() {
        let mut transport = loaded(10.0);
        transport.play();
        transport.set_media_available(false);
        assert!(!transport.is_playing());
    }
}
