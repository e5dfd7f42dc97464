//! Editing session
//!
//! One session owns one project together with its transport, gesture state,
//! caption job and connectivity flag. The host feeds it [`Command`]s and
//! renders from the [`Event`]s it returns. All mutation happens through
//! `&mut self`, one command at a time.
//!
//! Service calls are free functions that never borrow the session. Their
//! results come back as commands ([`run_caption_job`]) or as values the host
//! hands to the session ([`fetch_project`], [`fetch_media`]), so editing
//! continues while a request is in flight.

use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::constants::TIMELINE_DEFAULT_ZOOM;
use crate::core::inspector::{self, InspectorView, PropertyField};
use crate::core::time_space::to_pixels;
use crate::core::transport::{MediaSurface, SyncAction, TransportController};
use crate::error::{EditorError, Result};
use crate::hotkeys::{handle_hotkey, HotkeyAction, HotkeyContext, HotkeyResult, Key, Modifiers};
use crate::providers::{
    CaptionService, ChannelMessage, MediaIngestion, ProjectStore, StatusEvent, StoredProject,
};
use crate::state::{
    CaptionJob, CaptionJobStatus, CaptionResult, MediaItem, MediaLibrary, Project,
    ProjectRecord, ProjectSettings, TrackKind,
};
use crate::timeline::{self, classify_hit, ClipDrag, ClipEdit, DragMode, PlayheadDrag};
use crate::utils::format_timecode;

/// Status-channel event type carrying caption job updates.
pub const CAPTION_EVENT_TYPE: &str = "transcription";

/// Input accepted by [`EditorSession::handle_command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Pointer
    PointerDownPlayhead { x: f64 },
    /// Pointer down on a clip. Without an explicit mode the hit region decides.
    PointerDownClip {
        clip_id: Uuid,
        x: f64,
        mode: Option<DragMode>,
    },
    PointerMove { x: f64 },
    PointerUp,
    BackgroundClick { x: f64 },
    CancelDrag,
    Key {
        key: Key,
        modifiers: Modifiers,
        input_focused: bool,
    },

    // Transport
    Play,
    Pause,
    TogglePlay,
    /// Programmatic seek; keeps the play state.
    Seek(f64),
    /// User seek; pauses when configured to.
    Scrub(f64),
    StepFrames(i32),
    Jump(f64),
    SeekStart,
    SeekEnd,
    SetVolume(f64),
    ToggleMute,
    /// Wall-clock time elapsed since the last tick, in seconds.
    Tick(f64),
    /// Time reported by the preview surface.
    SurfaceTime(f64),

    // Timeline view
    SetZoom(f64),
    ZoomIn,
    ZoomOut,

    // Selection and inspector
    SelectClip(Uuid),
    ClearSelection,
    EditProperty { field: PropertyField, value: f64 },
    EditPropertyText { field: PropertyField, text: String },
    SetClipMuted(bool),
    RenameClip(String),
    ResetProperties,

    // Structure
    RegisterMedia(MediaItem),
    /// Places registered media at `at`, or at the playhead.
    PlaceMedia { media_id: String, at: Option<f64> },
    RemoveClip(Uuid),
    AddTrack(TrackKind),
    RemoveTrack(Uuid),
    RenameTrack { track_id: Uuid, name: String },
    /// Locking a track cancels a clip gesture on it.
    SetTrackLocked { track_id: Uuid, locked: bool },
    /// Hiding a track cancels a clip gesture on it.
    SetTrackVisible { track_id: Uuid, visible: bool },
    /// Drops a media item from the library, e.g. after deleting it upstream.
    ForgetMedia(String),

    // Services
    /// Starts a caption job; run it with [`run_caption_job`].
    RequestCaptions { media_id: String },
    /// Outcome of a caption job, as built by [`run_caption_job`].
    CaptionsFinished {
        job_id: Uuid,
        result: std::result::Result<CaptionResult, String>,
    },
    Channel(ChannelMessage),
}

/// What the preview surface should show at the playhead.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewSource {
    Clip {
        clip_id: Uuid,
        media_id: String,
        playable_ref: String,
        /// Position inside the source media, trims applied
        source_time: f64,
    },
    /// No playable media under the playhead.
    Placeholder,
}

impl PreviewSource {
    fn same_target(&self, other: &PreviewSource) -> bool {
        match (self, other) {
            (
                PreviewSource::Clip {
                    clip_id: a,
                    playable_ref: ref_a,
                    ..
                },
                PreviewSource::Clip {
                    clip_id: b,
                    playable_ref: ref_b,
                    ..
                },
            ) => a == b && ref_a == ref_b,
            (PreviewSource::Placeholder, PreviewSource::Placeholder) => true,
            _ => false,
        }
    }
}

/// Output of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PlayheadMoved { time: f64 },
    PlaybackChanged { playing: bool },
    VolumeChanged { volume: f64, muted: bool },
    ZoomChanged { zoom: f64 },
    SelectionChanged { clip_id: Option<Uuid> },
    /// A clip gesture changed a clip.
    ClipEdited(ClipEdit),
    /// Snap guide to draw during a clip move (`None` hides it).
    SnapGuide { time: Option<f64> },
    /// Tracks, clips or properties changed outside a gesture.
    ProjectChanged,
    /// The preview surface should load a different source.
    PreviewChanged(PreviewSource),
    /// The surface drifted and must seek.
    SurfaceSeek { time: f64 },
    SaveRequested,
    CaptionsStarted { job_id: Uuid, media_id: String },
    /// `track_id` is `None` when the job produced no segments.
    CaptionsInserted { track_id: Option<Uuid>, count: usize },
    CaptionsFailed { job_id: Uuid, message: String },
    ConnectivityChanged { connected: bool },
}

/// Values compared before and after a command to derive change events.
#[derive(Clone, Copy, PartialEq)]
struct Observed {
    position: f64,
    playing: bool,
    volume: f64,
    muted: bool,
    selected: Option<Uuid>,
}

pub struct EditorSession {
    config: EditorConfig,
    project: Project,
    media: MediaLibrary,
    transport: TransportController,
    zoom: f64,
    playhead_drag: PlayheadDrag,
    clip_drag: ClipDrag,
    caption_job: Option<CaptionJob>,
    connected: bool,
    preview: PreviewSource,
}

impl EditorSession {
    /// A session on a fresh project built from the configured defaults.
    pub fn new(config: EditorConfig) -> Self {
        let settings = ProjectSettings::from(&config.project);
        let project = Project::with_settings("Untitled Project", settings);
        Self::with_project(config, project)
    }

    pub fn with_project(config: EditorConfig, mut project: Project) -> Self {
        project.normalize();
        let transport = TransportController::new(config.transport.clone(), project.settings.fps);
        let mut session = Self {
            config,
            project,
            media: MediaLibrary::new(),
            transport,
            zoom: TIMELINE_DEFAULT_ZOOM,
            playhead_drag: PlayheadDrag::new(),
            clip_drag: ClipDrag::new(),
            caption_job: None,
            connected: false,
            preview: PreviewSource::Placeholder,
        };
        session.sync_transport();
        session.preview = session.preview_source();
        session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    pub fn transport(&self) -> &TransportController {
        &self.transport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn caption_job(&self) -> Option<&CaptionJob> {
        self.caption_job.as_ref()
    }

    /// Whether a captioning request may start now.
    pub fn captioning_enabled(&self) -> bool {
        self.caption_job.is_none()
    }

    pub fn is_dragging(&self) -> bool {
        self.playhead_drag.is_dragging() || self.clip_drag.is_dragging()
    }

    pub fn inspector(&self) -> InspectorView {
        inspector::view(&self.project)
    }

    pub fn playhead_timecode(&self) -> String {
        format_timecode(self.transport.position(), self.project.settings.fps)
    }

    /// Resolves the playable source under the playhead.
    pub fn preview_source(&self) -> PreviewSource {
        let time = self.transport.position();
        let Some(clip) = self.project.playable_clip_at(time) else {
            return PreviewSource::Placeholder;
        };
        match self.media.playable_ref(&clip.media_id) {
            Some(playable_ref) => PreviewSource::Clip {
                clip_id: clip.id,
                media_id: clip.media_id.clone(),
                playable_ref: playable_ref.to_string(),
                source_time: clip.source_time_at(time),
            },
            None => PreviewSource::Placeholder,
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Vec<Event> {
        let before = self.observe();
        let mut events = Vec::new();
        match command {
            Command::PointerDownPlayhead { x } => self.pointer_down_playhead(x),
            Command::PointerDownClip { clip_id, x, mode } => {
                self.pointer_down_clip(clip_id, x, mode)
            }
            Command::PointerMove { x } => self.pointer_move(x, &mut events),
            Command::PointerUp => self.pointer_up(&mut events),
            Command::BackgroundClick { x } => self.background_click(x),
            Command::CancelDrag => self.cancel_drag(&mut events),
            Command::Key {
                key,
                modifiers,
                input_focused,
            } => self.key(&key, modifiers, input_focused, &mut events),

            Command::Play => {
                self.transport.play();
            }
            Command::Pause => {
                self.transport.pause();
            }
            Command::TogglePlay => {
                self.transport.toggle_play();
            }
            Command::Seek(time) => {
                self.transport.seek(time);
            }
            Command::Scrub(time) => {
                self.transport.scrub(time);
            }
            Command::StepFrames(frames) => {
                self.transport.step_frames(frames);
            }
            Command::Jump(seconds) => {
                self.transport.jump(seconds);
            }
            Command::SeekStart => {
                self.transport.seek_start();
            }
            Command::SeekEnd => {
                self.transport.seek_end();
            }
            Command::SetVolume(volume) => self.transport.set_volume(volume),
            Command::ToggleMute => {
                self.transport.toggle_mute();
            }
            Command::Tick(elapsed) => {
                self.transport.tick(elapsed);
            }
            Command::SurfaceTime(time) => {
                if let SyncAction::ForceSurface(time) = self.transport.reconcile(time) {
                    events.push(Event::SurfaceSeek { time });
                }
            }

            Command::SetZoom(zoom) => self.set_zoom(timeline::clamp_zoom(zoom), &mut events),
            Command::ZoomIn => self.set_zoom(timeline::zoom_in(self.zoom), &mut events),
            Command::ZoomOut => self.set_zoom(timeline::zoom_out(self.zoom), &mut events),

            Command::SelectClip(clip_id) => {
                self.project.select_clip(clip_id);
            }
            Command::ClearSelection => self.project.clear_selection(),
            Command::EditProperty { field, value } => {
                project_changed(inspector::edit(&mut self.project, field, value), &mut events)
            }
            Command::EditPropertyText { field, text } => project_changed(
                inspector::edit_text(&mut self.project, field, &text),
                &mut events,
            ),
            Command::SetClipMuted(muted) => {
                project_changed(inspector::set_muted(&mut self.project, muted), &mut events)
            }
            Command::RenameClip(name) => {
                project_changed(inspector::rename(&mut self.project, &name), &mut events)
            }
            Command::ResetProperties => {
                project_changed(inspector::reset(&mut self.project), &mut events)
            }

            Command::RegisterMedia(item) => {
                debug!(media_id = %item.id, "media registered");
                self.media.insert(item);
            }
            Command::PlaceMedia { media_id, at } => self.place_media(&media_id, at, &mut events),
            Command::RemoveClip(clip_id) => {
                if self.clip_drag.gesture().map(|g| g.clip_id) == Some(clip_id) {
                    self.clip_drag.pointer_up();
                }
                project_changed(self.project.remove_clip(clip_id), &mut events);
            }
            Command::AddTrack(kind) => {
                self.project.add_track(kind);
                events.push(Event::ProjectChanged);
            }
            Command::RemoveTrack(track_id) => {
                self.end_gesture_on_track(track_id, &mut events);
                project_changed(self.project.remove_track(track_id), &mut events);
            }
            Command::RenameTrack { track_id, name } => {
                project_changed(self.project.rename_track(track_id, name), &mut events)
            }
            Command::SetTrackLocked { track_id, locked } => {
                if locked {
                    self.end_gesture_on_track(track_id, &mut events);
                }
                project_changed(self.project.set_track_locked(track_id, locked), &mut events);
            }
            Command::SetTrackVisible { track_id, visible } => {
                if !visible {
                    self.end_gesture_on_track(track_id, &mut events);
                }
                project_changed(self.project.set_track_visible(track_id, visible), &mut events);
            }
            Command::ForgetMedia(media_id) => {
                if self.media.remove(&media_id).is_some() {
                    debug!(%media_id, "media forgotten");
                }
            }

            Command::RequestCaptions { media_id } => self.request_captions(&media_id, &mut events),
            Command::CaptionsFinished { job_id, result } => match result {
                Ok(result) => self.complete_captioning(job_id, result, &mut events),
                Err(message) => self.fail_captioning(job_id, message, &mut events),
            },
            Command::Channel(message) => self.channel_message(message, &mut events),
        }
        self.finish(before, &mut events);
        events
    }

    fn observe(&self) -> Observed {
        Observed {
            position: self.transport.position(),
            playing: self.transport.is_playing(),
            volume: self.transport.volume(),
            muted: self.transport.is_muted(),
            selected: self.project.selected_clip().map(|clip| clip.id),
        }
    }

    /// Appends the change events implied by the command and re-syncs the transport.
    fn finish(&mut self, before: Observed, events: &mut Vec<Event>) {
        self.sync_transport();
        let after = self.observe();
        if after.selected != before.selected {
            events.push(Event::SelectionChanged {
                clip_id: after.selected,
            });
        }
        if after.position != before.position {
            events.push(Event::PlayheadMoved {
                time: after.position,
            });
        }
        if after.playing != before.playing {
            events.push(Event::PlaybackChanged {
                playing: after.playing,
            });
        }
        if after.volume != before.volume || after.muted != before.muted {
            events.push(Event::VolumeChanged {
                volume: after.volume,
                muted: after.muted,
            });
        }
        let preview = self.preview_source();
        if !preview.same_target(&self.preview) {
            events.push(Event::PreviewChanged(preview.clone()));
        }
        self.preview = preview;
    }

    fn sync_transport(&mut self) {
        self.transport.set_frame_rate(self.project.settings.fps);
        self.transport.set_duration(self.project.duration());
        let available = self
            .project
            .clips()
            .any(|clip| self.media.playable_ref(&clip.media_id).is_some());
        self.transport.set_media_available(available);
    }

    fn pointer_down_playhead(&mut self, x: f64) {
        if self.clip_drag.is_dragging() {
            return;
        }
        self.playhead_drag
            .pointer_down(x, self.transport.position(), self.zoom);
    }

    fn pointer_down_clip(&mut self, clip_id: Uuid, x: f64, mode: Option<DragMode>) {
        if self.playhead_drag.is_dragging() || self.clip_drag.is_dragging() {
            return;
        }
        let mode = match (mode, self.project.find_clip(clip_id)) {
            (Some(mode), _) => mode,
            (None, Some(clip)) => classify_hit(
                x,
                to_pixels(clip.start_time, self.zoom),
                to_pixels(clip.end_time, self.zoom),
            ),
            (None, None) => return,
        };
        self.clip_drag.pointer_down(&mut self.project, clip_id, mode, x);
    }

    fn pointer_move(&mut self, x: f64, events: &mut Vec<Event>) {
        if let Some(time) =
            self.playhead_drag
                .pointer_move(x, self.zoom, self.project.duration())
        {
            self.transport.scrub(time);
            return;
        }
        if let Some(edit) = self.clip_drag.pointer_move(&mut self.project, x, self.zoom) {
            if let ClipEdit::Move { snapped_to, .. } = edit {
                events.push(Event::SnapGuide { time: snapped_to });
            }
            events.push(Event::ClipEdited(edit));
        }
    }

    fn pointer_up(&mut self, events: &mut Vec<Event>) {
        self.playhead_drag.pointer_up();
        if let Some(gesture) = self.clip_drag.pointer_up() {
            if gesture.mode == DragMode::Move {
                events.push(Event::SnapGuide { time: None });
            }
        }
    }

    fn background_click(&mut self, x: f64) {
        if self.clip_drag.is_dragging() {
            return;
        }
        if let Some(time) = self
            .playhead_drag
            .background_click(x, self.zoom, self.project.duration())
        {
            self.transport.scrub(time);
        }
    }

    fn cancel_drag(&mut self, events: &mut Vec<Event>) {
        self.playhead_drag.pointer_up();
        if let Some(edit) = self.clip_drag.cancel(&mut self.project) {
            events.push(Event::SnapGuide { time: None });
            events.push(Event::ClipEdited(edit));
        }
    }

    /// Cancels the clip gesture when `track_id` is about to stop accepting edits.
    fn end_gesture_on_track(&mut self, track_id: Uuid, events: &mut Vec<Event>) {
        if self.clip_drag.gesture().map(|g| g.track_id) == Some(track_id) {
            debug!(%track_id, "clip gesture abandoned");
            self.cancel_drag(events);
        }
    }

    fn key(
        &mut self,
        key: &Key,
        modifiers: Modifiers,
        input_focused: bool,
        events: &mut Vec<Event>,
    ) {
        let context = HotkeyContext {
            input_focused,
            dragging: self.is_dragging(),
        };
        let HotkeyResult::Action(action) = handle_hotkey(key, modifiers, &context) else {
            return;
        };
        self.apply_hotkey(action, events);
    }

    fn apply_hotkey(&mut self, action: HotkeyAction, events: &mut Vec<Event>) {
        match action {
            HotkeyAction::PlayPause => {
                self.transport.toggle_play();
            }
            HotkeyAction::StepFrames(frames) => {
                self.transport.step_frames(frames);
            }
            HotkeyAction::SeekStart => {
                self.transport.seek_start();
            }
            HotkeyAction::SeekEnd => {
                self.transport.seek_end();
            }
            HotkeyAction::Jump(seconds) => {
                self.transport.jump(seconds);
            }
            HotkeyAction::TimelineZoomIn => self.set_zoom(timeline::zoom_in(self.zoom), events),
            HotkeyAction::TimelineZoomOut => self.set_zoom(timeline::zoom_out(self.zoom), events),
            HotkeyAction::CancelDrag => self.cancel_drag(events),
            HotkeyAction::SaveProject => events.push(Event::SaveRequested),
        }
    }

    fn set_zoom(&mut self, zoom: f64, events: &mut Vec<Event>) {
        if zoom != self.zoom {
            self.zoom = zoom;
            events.push(Event::ZoomChanged { zoom });
        }
    }

    fn place_media(&mut self, media_id: &str, at: Option<f64>, events: &mut Vec<Event>) {
        let Some(item) = self.media.get(media_id) else {
            warn!(%media_id, "place rejected: unknown media");
            return;
        };
        let start = at.unwrap_or_else(|| self.transport.position());
        if let Some(clip_id) = self.project.place_media(item, start) {
            debug!(%clip_id, %media_id, start, "media placed");
            events.push(Event::ProjectChanged);
        }
    }

    // =========================================================================
    // Captions
    // =========================================================================

    fn request_captions(&mut self, media_id: &str, events: &mut Vec<Event>) {
        if let Some(job) = self.begin_captioning(media_id) {
            events.push(Event::CaptionsStarted {
                job_id: job.id,
                media_id: job.media_id,
            });
        }
    }

    /// Starts a caption job. Returns `None` while another job is pending or
    /// when the media has no audio to transcribe.
    fn begin_captioning(&mut self, media_id: &str) -> Option<CaptionJob> {
        if self.caption_job.is_some() {
            debug!(%media_id, "captioning already pending");
            return None;
        }
        if let Some(item) = self.media.get(media_id) {
            if !item.kind.is_timed() {
                warn!(%media_id, "captioning rejected: media has no audio");
                return None;
            }
        }
        let job = CaptionJob::new(media_id);
        info!(job_id = %job.id, %media_id, "captioning started");
        self.caption_job = Some(job.clone());
        Some(job)
    }

    /// Appends the job's segments to the captions track in one step.
    fn complete_captioning(
        &mut self,
        job_id: Uuid,
        result: CaptionResult,
        events: &mut Vec<Event>,
    ) {
        let Some(job) = self.take_job(job_id) else {
            return;
        };
        let count = result.segments.len();
        let track_id = if count == 0 {
            None
        } else {
            Some(self.project.append_captions(&job.media_id, &result.segments))
        };
        let elapsed_ms = (Utc::now() - job.created_at).num_milliseconds();
        info!(
            job_id = %job.id,
            count,
            language = %result.language,
            elapsed_ms,
            "captioning completed"
        );
        events.push(Event::CaptionsInserted { track_id, count });
        if track_id.is_some() {
            events.push(Event::ProjectChanged);
        }
    }

    /// Ends the job without touching the project.
    fn fail_captioning(&mut self, job_id: Uuid, message: String, events: &mut Vec<Event>) {
        let Some(job) = self.take_job(job_id) else {
            return;
        };
        warn!(job_id = %job.id, %message, "captioning failed");
        events.push(Event::CaptionsFailed {
            job_id: job.id,
            message,
        });
    }

    fn take_job(&mut self, job_id: Uuid) -> Option<CaptionJob> {
        match &self.caption_job {
            Some(job) if job.id == job_id => self.caption_job.take(),
            _ => {
                debug!(%job_id, "ignoring result for unknown caption job");
                None
            }
        }
    }

    // =========================================================================
    // Status channel
    // =========================================================================

    fn channel_message(&mut self, message: ChannelMessage, events: &mut Vec<Event>) {
        match message {
            ChannelMessage::Connected => self.set_connected(true, events),
            ChannelMessage::Disconnected { reason } => {
                debug!(%reason, "status channel lost");
                self.set_connected(false, events);
            }
            ChannelMessage::Event(event) => self.status_event(event, events),
        }
    }

    fn set_connected(&mut self, connected: bool, events: &mut Vec<Event>) {
        if self.connected != connected {
            self.connected = connected;
            events.push(Event::ConnectivityChanged { connected });
        }
    }

    /// Caption jobs can also finish through the status channel; only terminal
    /// states for the pending job's media are acted on.
    fn status_event(&mut self, event: StatusEvent, events: &mut Vec<Event>) {
        if event.kind != CAPTION_EVENT_TYPE {
            return;
        }
        let Some(job) = self.caption_job.clone() else {
            return;
        };
        let media_id = event
            .data_str("media_file_id")
            .or_else(|| event.data_str("media_id"));
        if media_id != Some(job.media_id.as_str()) {
            return;
        }
        let Some(status) = event
            .data_str("status")
            .and_then(CaptionJobStatus::parse)
            .filter(|status| status.is_terminal())
        else {
            return;
        };
        match status {
            CaptionJobStatus::Completed => {
                let result = event
                    .data
                    .get("transcription")
                    .cloned()
                    .and_then(|value| serde_json::from_value::<CaptionResult>(value).ok());
                match result {
                    Some(result) => self.complete_captioning(job.id, result, events),
                    None => self.fail_captioning(
                        job.id,
                        "completed without a transcription".to_string(),
                        events,
                    ),
                }
            }
            CaptionJobStatus::Failed => {
                let message = event
                    .data_str("error")
                    .or_else(|| event.data_str("message"))
                    .unwrap_or("captioning failed")
                    .to_string();
                self.fail_captioning(job.id, message, events);
            }
            CaptionJobStatus::Pending => {}
        }
    }

    // =========================================================================
    // Media and persistence
    // =========================================================================

    /// Media ids referenced by clips that do not resolve in the library.
    ///
    /// A freshly opened project has every id missing until the host registers
    /// the items returned by [`fetch_media`].
    pub fn missing_media(&self) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for clip in self.project.clips() {
            if self.media.get(&clip.media_id).is_none() && !missing.contains(&clip.media_id) {
                missing.push(clip.media_id.clone());
            }
        }
        missing
    }

    /// Width of the scrollable timeline content in pixels.
    pub fn timeline_width(&self) -> f64 {
        timeline::content_width(self.project.duration(), self.zoom)
    }

    /// Pushes the transport state to the preview surface.
    pub fn drive_surface(&mut self, surface: &mut dyn MediaSurface) -> SyncAction {
        self.transport.drive(surface)
    }

    pub fn save_to(&self, folder: &Path) -> Result<()> {
        self.project.save_to(folder)
    }

    /// Replaces the session project with one loaded from disk.
    pub fn load_from(&mut self, folder: &Path) -> Result<Vec<Event>> {
        let project = Project::load(folder)?;
        Ok(self.open_project(project))
    }

    /// Replaces the session project, e.g. with one from [`fetch_project`].
    ///
    /// Gestures end, the playhead returns to zero and a pending caption job
    /// is dropped, since its result belongs to the previous project.
    pub fn open_project(&mut self, project: Project) -> Vec<Event> {
        let before = self.observe();
        self.playhead_drag.pointer_up();
        self.clip_drag.pointer_up();
        if let Some(job) = self.caption_job.take() {
            debug!(job_id = %job.id, "caption job dropped with previous project");
        }
        self.project = project;
        self.transport.seek_start();
        let mut events = vec![Event::ProjectChanged];
        self.finish(before, &mut events);
        events
    }
}

// =========================================================================
// Service calls
// =========================================================================

/// Transcribes `media_id` and wraps the outcome as [`Command::CaptionsFinished`].
pub async fn run_caption_job<S: CaptionService>(
    service: &S,
    job_id: Uuid,
    media_id: &str,
) -> Command {
    let result = service
        .transcribe(media_id)
        .await
        .map_err(|err| err.to_string());
    Command::CaptionsFinished { job_id, result }
}

/// Saves a record to the store: creates on first save, updates afterwards.
pub async fn save_project<S: ProjectStore>(
    store: &S,
    record: &ProjectRecord,
    project_id: Option<&str>,
) -> Result<StoredProject> {
    match project_id {
        Some(id) => store.update(id, record).await,
        None => store.create(record).await,
    }
}

/// Fetches a stored project; open it with [`EditorSession::open_project`].
pub async fn fetch_project<S: ProjectStore>(store: &S, project_id: &str) -> Result<Project> {
    let stored = store.fetch(project_id).await?;
    debug!(%project_id, "project fetched");
    Ok(Project::from_record(stored.into_record()))
}

/// Resolves media ids against the ingestion service.
///
/// Lists once, then fetches whatever the listing missed. Ids the service no
/// longer knows are skipped.
pub async fn fetch_media<I: MediaIngestion>(
    ingestion: &I,
    media_ids: &[String],
) -> Result<Vec<MediaItem>> {
    if media_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut found: Vec<MediaItem> = ingestion
        .list()
        .await?
        .into_iter()
        .filter(|item| media_ids.contains(&item.id))
        .collect();
    for media_id in media_ids {
        if found.iter().any(|item| &item.id == media_id) {
            continue;
        }
        match ingestion.fetch(media_id).await {
            Ok(item) => found.push(item),
            Err(EditorError::MediaNotFound(_)) => {
                warn!(%media_id, "media missing from ingestion service")
            }
            Err(err) => return Err(err),
        }
    }
    Ok(found)
}

fn project_changed(changed: bool, events: &mut Vec<Event>) {
    if changed {
        events.push(Event::ProjectChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CaptionSegment, MediaKind, MediaMetadata};

    fn media(id: &str, kind: MediaKind, duration: f64) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            kind,
            name: format!("{id}.mp4"),
            duration_seconds: Some(duration),
            thumbnail_ref: None,
            playable_ref: format!("http://api/uploads/{id}"),
            metadata: MediaMetadata::default(),
        }
    }

    fn session_with_clip() -> (EditorSession, Uuid) {
        let mut session = EditorSession::new(EditorConfig::default());
        session.handle_command(Command::RegisterMedia(media("m1", MediaKind::Video, 10.0)));
        session.handle_command(Command::PlaceMedia {
            media_id: "m1".into(),
            at: Some(2.0),
        });
        let clip = session.project().clips().next().unwrap().id;
        (session, clip)
    }

    #[test]
    fn place_media_enables_transport() {
        let mut session = EditorSession::new(EditorConfig::default());
        assert!(session.handle_command(Command::Play).is_empty());

        session.handle_command(Command::RegisterMedia(media("m1", MediaKind::Video, 10.0)));
        let events = session.handle_command(Command::PlaceMedia {
            media_id: "m1".into(),
            at: None,
        });
        assert!(events.contains(&Event::ProjectChanged));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::PreviewChanged(PreviewSource::Clip { .. }))));

        let events = session.handle_command(Command::Play);
        assert_eq!(events, vec![Event::PlaybackChanged { playing: true }]);
    }

    #[test]
    fn playhead_drag_scrubs_and_pauses() {
        let (mut session, _) = session_with_clip();
        session.handle_command(Command::Seek(3.0));
        session.handle_command(Command::Play);
        session.handle_command(Command::PointerDownPlayhead { x: 31.0 });
        let events = session.handle_command(Command::PointerMove { x: 51.0 });
        assert!(events.contains(&Event::PlayheadMoved { time: 5.0 }));
        assert!(events.contains(&Event::PlaybackChanged { playing: false }));

        assert!(session.handle_command(Command::BackgroundClick { x: 200.0 }).is_empty());
        session.handle_command(Command::PointerUp);
        let events = session.handle_command(Command::BackgroundClick { x: 200.0 });
        assert!(events.contains(&Event::PlayheadMoved { time: 20.0 }));
    }

    #[test]
    fn clip_gesture_selects_moves_and_cancels() {
        let (mut session, clip) = session_with_clip();
        // clip spans 2..12 s, i.e. 20..120 px at zoom 1
        let events = session.handle_command(Command::PointerDownClip {
            clip_id: clip,
            x: 60.0,
            mode: None,
        });
        assert_eq!(events, vec![Event::SelectionChanged { clip_id: Some(clip) }]);

        let events = session.handle_command(Command::PointerMove { x: 80.0 });
        assert!(events.iter().any(|e| matches!(
            e,
            Event::ClipEdited(ClipEdit::Move { start, .. }) if *start == 4.0
        )));

        let events = session.handle_command(Command::Key {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
            input_focused: false,
        });
        assert!(events.iter().any(|e| matches!(e, Event::ClipEdited(ClipEdit::Restore { .. }))));
        assert_eq!(session.project().find_clip(clip).unwrap().start_time, 2.0);
        assert!(!session.is_dragging());
    }

    #[test]
    fn trim_handle_hit_starts_trim() {
        let (mut session, clip) = session_with_clip();
        session.handle_command(Command::PointerDownClip {
            clip_id: clip,
            x: 22.0,
            mode: None,
        });
        session.handle_command(Command::PointerMove { x: 42.0 });
        session.handle_command(Command::PointerUp);
        let trimmed = session.project().find_clip(clip).unwrap();
        assert_eq!(trimmed.trim_start, 2.0);
        assert_eq!(trimmed.start_time, 2.0);
    }

    #[test]
    fn keys_drive_transport_unless_typing() {
        let (mut session, _) = session_with_clip();
        session.handle_command(Command::Seek(1.0));
        let key = |key: Key, modifiers| Command::Key {
            key,
            modifiers,
            input_focused: false,
        };
        session.handle_command(key(Key::ArrowRight, Modifiers::shift()));
        assert!((session.transport().position() - (1.0 + 10.0 / 30.0)).abs() < 1e-9);
        session.handle_command(key(Key::End, Modifiers::NONE));
        assert_eq!(session.transport().position(), session.project().duration());

        let events = session.handle_command(Command::Key {
            key: Key::Home,
            modifiers: Modifiers::NONE,
            input_focused: true,
        });
        assert!(events.is_empty());

        let events = session.handle_command(key(Key::character("s"), Modifiers::ctrl()));
        assert_eq!(events, vec![Event::SaveRequested]);
        let events = session.handle_command(key(Key::character("+"), Modifiers::NONE));
        assert_eq!(events, vec![Event::ZoomChanged { zoom: 1.25 }]);
    }

    #[test]
    fn preview_follows_playhead() {
        let (mut session, clip) = session_with_clip();
        assert_eq!(session.preview_source(), PreviewSource::Placeholder);
        session.handle_command(Command::Seek(4.5));
        match session.preview_source() {
            PreviewSource::Clip {
                clip_id,
                source_time,
                ..
            } => {
                assert_eq!(clip_id, clip);
                assert_eq!(source_time, 2.5);
            }
            PreviewSource::Placeholder => panic!("expected clip preview"),
        }
        let events = session.handle_command(Command::Seek(30.0));
        assert!(events.contains(&Event::PreviewChanged(PreviewSource::Placeholder)));
    }

    #[test]
    fn inspector_edits_emit_project_changes() {
        let (mut session, clip) = session_with_clip();
        assert!(session
            .handle_command(Command::EditProperty {
                field: PropertyField::Scale,
                value: 3.0
            })
            .is_empty());
        session.handle_command(Command::SelectClip(clip));
        let events = session.handle_command(Command::EditPropertyText {
            field: PropertyField::Rotation,
            text: "-10".into(),
        });
        assert_eq!(events, vec![Event::ProjectChanged]);
        assert_eq!(
            session.project().find_clip(clip).unwrap().properties.transform.rotation,
            350.0
        );
    }

    #[test]
    fn removing_selected_clip_clears_selection() {
        let (mut session, clip) = session_with_clip();
        session.handle_command(Command::SelectClip(clip));
        let events = session.handle_command(Command::RemoveClip(clip));
        assert!(events.contains(&Event::ProjectChanged));
        assert!(events.contains(&Event::SelectionChanged { clip_id: None }));
        assert!(!session.transport().media_available());
    }

    fn request_captions(session: &mut EditorSession, media_id: &str) -> Option<Uuid> {
        let events = session.handle_command(Command::RequestCaptions {
            media_id: media_id.into(),
        });
        events.iter().find_map(|event| match event {
            Event::CaptionsStarted { job_id, .. } => Some(*job_id),
            _ => None,
        })
    }

    fn hello() -> CaptionResult {
        CaptionResult {
            segments: vec![CaptionSegment {
                text: "Hello".into(),
                start: 0.0,
                end: 1.5,
                confidence: 0.9,
            }],
            language: "en".into(),
            duration: 1.5,
        }
    }

    #[test]
    fn caption_job_is_exclusive_and_atomic() {
        let mut session = EditorSession::new(EditorConfig::default());
        let job_id = request_captions(&mut session, "m1").unwrap();
        assert!(!session.captioning_enabled());
        assert!(request_captions(&mut session, "m1").is_none());

        let events = session.handle_command(Command::CaptionsFinished {
            job_id,
            result: Err("boom".into()),
        });
        assert!(matches!(
            &events[..],
            [Event::CaptionsFailed { message, .. }] if message == "boom"
        ));
        assert!(session.captioning_enabled());
        assert!(session.project().captions_track().is_none());

        let stale = session.handle_command(Command::CaptionsFinished {
            job_id,
            result: Ok(hello()),
        });
        assert!(stale.is_empty());
        assert!(session.project().captions_track().is_none());
    }

    #[test]
    fn images_cannot_be_captioned() {
        let mut session = EditorSession::new(EditorConfig::default());
        session.handle_command(Command::RegisterMedia(media("still", MediaKind::Image, 5.0)));
        assert!(request_captions(&mut session, "still").is_none());
        assert!(session.captioning_enabled());
    }

    #[test]
    fn edits_continue_while_captions_are_pending() {
        let (mut session, clip) = session_with_clip();
        let job_id = request_captions(&mut session, "m1").unwrap();

        session.handle_command(Command::SelectClip(clip));
        session.handle_command(Command::RenameClip("interview".into()));
        session.handle_command(Command::AddTrack(TrackKind::Audio));
        session.handle_command(Command::PointerDownClip {
            clip_id: clip,
            x: 60.0,
            mode: Some(DragMode::Move),
        });
        session.handle_command(Command::PointerMove { x: 90.0 });
        session.handle_command(Command::PointerUp);

        let events = session.handle_command(Command::CaptionsFinished {
            job_id,
            result: Ok(hello()),
        });
        let track = session.project().captions_track().unwrap();
        assert!(events.contains(&Event::CaptionsInserted {
            track_id: Some(track.id),
            count: 1
        }));
        assert_eq!(track.clips[0].name, "Hello");
        let edited = session.project().find_clip(clip).unwrap();
        assert_eq!(edited.name, "interview");
        assert_eq!(edited.start_time, 5.0);
        assert_eq!(session.project().tracks.len(), 4);
    }

    #[test]
    fn opening_a_project_drops_the_pending_job() {
        let (mut session, _) = session_with_clip();
        let job_id = request_captions(&mut session, "m1").unwrap();
        session.open_project(Project::new("Other"));
        assert!(session.captioning_enabled());
        let events = session.handle_command(Command::CaptionsFinished {
            job_id,
            result: Ok(hello()),
        });
        assert!(events.is_empty());
        assert!(session.project().captions_track().is_none());
    }

    #[test]
    fn status_channel_drives_connectivity_and_captions() {
        let mut session = EditorSession::new(EditorConfig::default());
        let events = session.handle_command(Command::Channel(ChannelMessage::Connected));
        assert_eq!(events, vec![Event::ConnectivityChanged { connected: true }]);
        assert!(session.handle_command(Command::Channel(ChannelMessage::Connected)).is_empty());

        let job_id = request_captions(&mut session, "m1").unwrap();
        let event = |status: &str| StatusEvent {
            kind: CAPTION_EVENT_TYPE.to_string(),
            data: serde_json::json!({
                "media_file_id": "m1",
                "status": status,
                "transcription": {
                    "segments": [{"text": "Hi", "start": 0.0, "end": 1.0, "confidence": 0.9}],
                    "language": "en",
                    "duration": 1.0
                }
            }),
            timestamp: None,
        };
        assert!(session
            .handle_command(Command::Channel(ChannelMessage::Event(event("processing"))))
            .is_empty());
        let completed = ChannelMessage::Event(event("completed"));
        let events = session.handle_command(Command::Channel(completed));
        assert!(events.contains(&Event::CaptionsInserted {
            track_id: session.project().captions_track().map(|t| t.id),
            count: 1
        }));
        assert!(session.caption_job().is_none());
        let late = Command::CaptionsFinished {
            job_id,
            result: Ok(hello()),
        };
        assert!(session.handle_command(late).is_empty());

        let events = session.handle_command(Command::Channel(ChannelMessage::Disconnected {
            reason: "closed".into(),
        }));
        assert_eq!(events, vec![Event::ConnectivityChanged { connected: false }]);
    }

    #[test]
    fn locked_track_blocks_gestures() {
        let (mut session, clip) = session_with_clip();
        let track = session.project().track_of_clip(clip).unwrap().id;
        session.handle_command(Command::SetTrackLocked { track_id: track, locked: true });
        let events = session.handle_command(Command::PointerDownClip {
            clip_id: clip,
            x: 60.0,
            mode: Some(DragMode::Move),
        });
        assert!(events.is_empty());
        assert!(!session.is_dragging());
    }

    #[test]
    fn hiding_a_track_mid_drag_cancels_the_gesture() {
        let (mut session, clip) = session_with_clip();
        let track_id = session.project().track_of_clip(clip).unwrap().id;
        session.handle_command(Command::PointerDownClip {
            clip_id: clip,
            x: 60.0,
            mode: Some(DragMode::Move),
        });
        session.handle_command(Command::PointerMove { x: 80.0 });

        let events = session.handle_command(Command::SetTrackVisible {
            track_id,
            visible: false,
        });
        assert!(events.iter().any(|e| matches!(e, Event::ClipEdited(ClipEdit::Restore { .. }))));
        assert!(events.contains(&Event::ProjectChanged));
        assert!(!session.is_dragging());

        let events = session.handle_command(Command::PointerMove { x: 200.0 });
        assert!(!events.iter().any(|e| matches!(e, Event::ClipEdited(_))));
        assert_eq!(session.project().find_clip(clip).unwrap().start_time, 2.0);
    }

    #[test]
    fn locking_a_track_mid_drag_cancels_the_gesture() {
        let (mut session, clip) = session_with_clip();
        let track_id = session.project().track_of_clip(clip).unwrap().id;
        session.handle_command(Command::PointerDownClip {
            clip_id: clip,
            x: 60.0,
            mode: Some(DragMode::Move),
        });
        session.handle_command(Command::PointerMove { x: 80.0 });
        session.handle_command(Command::SetTrackLocked {
            track_id,
            locked: true,
        });
        session.handle_command(Command::PointerMove { x: 200.0 });
        assert!(!session.is_dragging());
        assert_eq!(session.project().find_clip(clip).unwrap().start_time, 2.0);
    }

    #[test]
    fn rename_track_ignores_blank_names() {
        let (mut session, _) = session_with_clip();
        let track_id = session.project().tracks[0].id;
        let events = session.handle_command(Command::RenameTrack {
            track_id,
            name: "A-roll".into(),
        });
        assert_eq!(events, vec![Event::ProjectChanged]);
        assert_eq!(session.project().tracks[0].name, "A-roll");
        let blank = Command::RenameTrack {
            track_id,
            name: "  ".into(),
        };
        assert!(session.handle_command(blank).is_empty());
        assert_eq!(session.project().tracks[0].name, "A-roll");
    }

    #[test]
    fn missing_media_lists_unresolved_clip_sources() {
        let (mut session, _) = session_with_clip();
        assert!(session.missing_media().is_empty());
        assert!(session.handle_command(Command::ForgetMedia("m1".into())).is_empty());
        assert_eq!(session.missing_media(), vec!["m1".to_string()]);
        assert!(!session.transport().media_available());
    }

    #[test]
    fn timeline_width_follows_zoom() {
        let (mut session, _) = session_with_clip();
        let duration = session.project().duration();
        assert_eq!(session.timeline_width(), duration * 10.0);
        session.handle_command(Command::SetZoom(2.0));
        assert_eq!(session.timeline_width(), duration * 20.0);
    }

    #[derive(Default)]
    struct Surface {
        time: f64,
        playing: bool,
        muted: bool,
    }

    impl MediaSurface for Surface {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn seek(&mut self, time: f64) {
            self.time = time;
        }
        fn play(&mut self) {
            self.playing = true;
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn set_volume(&mut self, _volume: f64) {}
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    #[test]
    fn drive_surface_pushes_transport_state() {
        let (mut session, _) = session_with_clip();
        session.handle_command(Command::Seek(4.0));
        session.handle_command(Command::Play);
        session.handle_command(Command::ToggleMute);

        let mut surface = Surface::default();
        assert_eq!(session.drive_surface(&mut surface), SyncAction::ForceSurface(4.0));
        assert_eq!(surface.time, 4.0);
        assert!(surface.playing && surface.muted);

        surface.time = 4.05;
        assert_eq!(session.drive_surface(&mut surface), SyncAction::AdoptedSurface);
        assert_eq!(session.transport().position(), 4.05);
    }

    #[test]
    fn local_save_and_load() {
        let (mut session, _) = session_with_clip();
        let dir = std::env::temp_dir().join(format!("session-{}", Uuid::new_v4()));
        session.save_to(&dir).unwrap();
        let snapshot = session.project().clone();

        session.handle_command(Command::AddTrack(TrackKind::Video));
        let events = session.load_from(&dir).unwrap();
        assert!(events.contains(&Event::ProjectChanged));
        assert_eq!(session.project(), &snapshot);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn timecode_uses_project_fps() {
        let (mut session, _) = session_with_clip();
        session.handle_command(Command::Seek(31.5));
        assert_eq!(session.playhead_timecode(), "00:00:31:15");
    }
}
