//! Property-based tests for project invariants.
//!
//! Drives an editing session with arbitrary command sequences and checks that
//! every clip stays well formed, selection stays exclusive, and the project
//! survives a store round trip unchanged.

use ai_video_editor::constants::{MIN_CLIP_DURATION_SECONDS, SCALE_MAX, SCALE_MIN};
use ai_video_editor::core::inspector::PropertyField;
use ai_video_editor::state::{max_trim, MediaItem, MediaKind, MediaMetadata, Project, TrackKind};
use ai_video_editor::timeline::DragMode;
use ai_video_editor::{Command, EditorConfig, EditorSession};
use proptest::prelude::*;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
enum Op {
    Place { media: usize, at: f64 },
    Drag { clip: usize, mode: Option<DragMode>, from_x: f64, to_x: f64, cancel: bool },
    Edit { field: usize, value: f64 },
    Select { clip: usize },
    ClearSelection,
    Zoom(f64),
    Remove { clip: usize },
    Lock { track: usize, locked: bool },
    AddTrack(TrackKind),
    Step(i32),
}

fn media_items() -> Vec<MediaItem> {
    [
        ("video", MediaKind::Video, Some(12.0)),
        ("audio", MediaKind::Audio, Some(3.5)),
        ("still", MediaKind::Image, None),
    ]
    .into_iter()
    .map(|(id, kind, duration)| MediaItem {
        id: id.to_string(),
        kind,
        name: id.to_string(),
        duration_seconds: duration,
        thumbnail_ref: None,
        playable_ref: format!("http://localhost:8000/uploads/{id}"),
        metadata: MediaMetadata::default(),
    })
    .collect()
}

fn float_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => -20_000.0f64..20_000.0,
        1 => any::<f64>(),
        1 => Just(f64::NAN),
    ]
}

fn drag_mode() -> impl Strategy<Value = Option<DragMode>> {
    prop_oneof![
        Just(None),
        Just(Some(DragMode::Move)),
        Just(Some(DragMode::TrimStart)),
        Just(Some(DragMode::TrimEnd)),
    ]
}

fn track_kind() -> impl Strategy<Value = TrackKind> {
    prop_oneof![Just(TrackKind::Video), Just(TrackKind::Audio), Just(TrackKind::Captions)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3, -5.0f64..120.0).prop_map(|(media, at)| Op::Place { media, at }),
        4 => (any::<usize>(), drag_mode(), -100.0f64..1_500.0, -100.0f64..1_500.0, any::<bool>())
            .prop_map(|(clip, mode, from_x, to_x, cancel)| {
                Op::Drag { clip, mode, from_x, to_x, cancel }
            }),
        3 => (0usize..PropertyField::ALL.len(), float_value())
            .prop_map(|(field, value)| Op::Edit { field, value }),
        2 => any::<usize>().prop_map(|clip| Op::Select { clip }),
        1 => Just(Op::ClearSelection),
        1 => float_value().prop_map(Op::Zoom),
        1 => any::<usize>().prop_map(|clip| Op::Remove { clip }),
        1 => (any::<usize>(), any::<bool>()).prop_map(|(track, locked)| Op::Lock { track, locked }),
        1 => track_kind().prop_map(Op::AddTrack),
        1 => (-40i32..40).prop_map(Op::Step),
    ]
}

fn nth_clip(session: &EditorSession, index: usize) -> Option<uuid::Uuid> {
    let ids: Vec<_> = session.project().clips().map(|clip| clip.id).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn apply(session: &mut EditorSession, media: &[MediaItem], op: Op) {
    match op {
        Op::Place { media: index, at } => {
            session.handle_command(Command::PlaceMedia {
                media_id: media[index].id.clone(),
                at: Some(at),
            });
        }
        Op::Drag { clip, mode, from_x, to_x, cancel } => {
            let Some(clip_id) = nth_clip(session, clip) else {
                return;
            };
            session.handle_command(Command::PointerDownClip { clip_id, x: from_x, mode });
            session.handle_command(Command::PointerMove { x: to_x });
            if cancel {
                session.handle_command(Command::CancelDrag);
            } else {
                session.handle_command(Command::PointerUp);
            }
        }
        Op::Edit { field, value } => {
            session.handle_command(Command::EditProperty {
                field: PropertyField::ALL[field],
                value,
            });
        }
        Op::Select { clip } => {
            if let Some(clip_id) = nth_clip(session, clip) {
                session.handle_command(Command::SelectClip(clip_id));
            }
        }
        Op::ClearSelection => {
            session.handle_command(Command::ClearSelection);
        }
        Op::Zoom(zoom) => {
            session.handle_command(Command::SetZoom(zoom));
        }
        Op::Remove { clip } => {
            if let Some(clip_id) = nth_clip(session, clip) {
                session.handle_command(Command::RemoveClip(clip_id));
            }
        }
        Op::Lock { track, locked } => {
            let tracks = &session.project().tracks;
            let track_id = tracks[track % tracks.len()].id;
            session.handle_command(Command::SetTrackLocked { track_id, locked });
        }
        Op::AddTrack(kind) => {
            session.handle_command(Command::AddTrack(kind));
        }
        Op::Step(frames) => {
            session.handle_command(Command::StepFrames(frames));
        }
    }
}

fn check_invariants(project: &Project) -> Result<(), TestCaseError> {
    let mut selected = 0;
    for clip in project.clips() {
        prop_assert!(clip.start_time >= 0.0, "negative start {}", clip.start_time);
        prop_assert!(
            clip.duration() >= MIN_CLIP_DURATION_SECONDS - EPSILON,
            "clip too short: {}",
            clip.duration()
        );
        let limit = max_trim(clip.duration()) + EPSILON;
        prop_assert!((0.0..=limit).contains(&clip.trim_start));
        prop_assert!((0.0..=limit).contains(&clip.trim_end));

        let transform = clip.properties.transform;
        prop_assert!((0.0..360.0).contains(&transform.rotation), "rotation {}", transform.rotation);
        prop_assert!(
            (SCALE_MIN..=SCALE_MAX).contains(&transform.scale),
            "scale {}",
            transform.scale
        );
        prop_assert!(transform.x.is_finite() && transform.y.is_finite());
        if clip.selected {
            selected += 1;
        }
    }
    prop_assert!(selected <= 1, "{} clips selected", selected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every command sequence leaves the project well formed.
    #[test]
    fn command_sequences_preserve_invariants(ops in prop::collection::vec(op(), 1..40)) {
        let media = media_items();
        let mut session = EditorSession::new(EditorConfig::default());
        for item in &media {
            session.handle_command(Command::RegisterMedia(item.clone()));
        }
        for op in ops {
            apply(&mut session, &media, op);
            check_invariants(session.project())?;
            let transport = session.transport();
            prop_assert!(transport.position() >= 0.0);
            prop_assert!(transport.position() <= session.project().duration() + EPSILON);
        }
        prop_assert!(!session.is_dragging());
    }

    /// Saving, loading and saving again produces an identical record.
    #[test]
    fn store_round_trip_is_stable(ops in prop::collection::vec(op(), 1..30)) {
        let media = media_items();
        let mut session = EditorSession::new(EditorConfig::default());
        for item in &media {
            session.handle_command(Command::RegisterMedia(item.clone()));
        }
        for op in ops {
            apply(&mut session, &media, op);
        }

        let first = serde_json::to_string(&session.project().to_record()).unwrap();
        let record = serde_json::from_str(&first).unwrap();
        let reloaded = Project::from_record(record);
        let second = serde_json::to_string(&reloaded.to_record()).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(&reloaded.tracks, &session.project().tracks);
    }
}
