use uuid::Uuid;

use super::time_space::to_seconds;

/// Category of snap target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapTargetKind {
    /// Clip start or end edge.
    ClipEdge,
    /// The timeline origin.
    Origin,
}

/// Snap target expressed in timeline seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapTarget {
    pub time: f64,
    pub kind: SnapTargetKind,
    /// Clip id if this target comes from a clip edge.
    pub clip_id: Option<Uuid>,
}

impl SnapTarget {
    /// Build a clip-edge target.
    pub fn clip_edge(time: f64, clip_id: Uuid) -> Self {
        Self {
            time,
            kind: SnapTargetKind::ClipEdge,
            clip_id: Some(clip_id),
        }
    }

    /// The zero-time target.
    pub fn origin() -> Self {
        Self {
            time: 0.0,
            kind: SnapTargetKind::Origin,
            clip_id: None,
        }
    }
}

/// Result of a snap query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapMatch {
    /// Time after snapping (the candidate itself when nothing was in range).
    pub time: f64,
    /// The target that was snapped to.
    pub target: Option<SnapTarget>,
}

impl SnapMatch {
    pub fn snapped(&self) -> bool {
        self.target.is_some()
    }
}

/// Convert a pixel tolerance into seconds at `zoom`.
pub fn tolerance_seconds(pixel_tolerance: f64, zoom: f64) -> f64 {
    to_seconds(pixel_tolerance.max(0.0), zoom)
}

/// Pull `candidate` onto the nearest target within `pixel_tolerance` pixels.
///
/// The distance check is inclusive. On an exact tie the earlier time wins, so
/// the result does not depend on target order. Targets belonging to
/// `exclude_clip_id` are skipped.
pub fn resolve(
    candidate: f64,
    exclude_clip_id: Option<Uuid>,
    targets: &[SnapTarget],
    pixel_tolerance: f64,
    zoom: f64,
) -> SnapMatch {
    let threshold = tolerance_seconds(pixel_tolerance, zoom);
    let mut best: Option<(f64, SnapTarget)> = None;

    for &target in targets {
        if exclude_clip_id.is_some() && target.clip_id == exclude_clip_id {
            continue;
        }
        let distance = (target.time - candidate).abs();
        if !distance.is_finite() || distance > threshold {
            continue;
        }
        let take = match best {
            None => true,
            Some((best_distance, best_target)) => {
                distance < best_distance
                    || (distance == best_distance && target.time < best_target.time)
            }
        };
        if take {
            best = Some((distance, target));
        }
    }

    match best {
        Some((_, target)) => SnapMatch {
            time: target.time,
            target: Some(target),
        },
        None => SnapMatch {
            time: candidate,
            target: None,
        },
    }
}
