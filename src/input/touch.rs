// SPDX-License-Identifier: GPL-3.0-only

//! Touch-target resolution.
//!
//! Maps a raw touch point to the key the user most likely meant. Each key's
//! visual frame is grown by a per-class inset to form its hit region. Touches
//! inside one or more hit regions go to the nearest of those keys; touches
//! that miss every region snap to the nearest key within the gap radius, or
//! are dropped.
//!
//! Distance is measured from the touch to a key's centre and multiplied by the
//! vertical bias when the touch lies below that centre, so a key above the
//! finger wins over an equally distant key below it.

use crate::config::TouchDetectionConfig;
use crate::layout::KeyClass;
use crate::renderer::sizing::{Point, Rect};

/// Anything the resolver can pick: a frame plus the class that selects insets.
pub trait TouchTarget {
    /// Visual bounds of the key.
    fn frame(&self) -> Rect;

    /// Class used to choose hit-region insets.
    fn class(&self) -> KeyClass;
}

/// How a resolution was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// The touch was inside the key's expanded hit region
    Direct,
    /// The touch missed every region and snapped to the nearest key
    GapFallback,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Index of the chosen candidate
    pub index: usize,
    /// Biased distance from the touch to the key centre
    pub distance: f32,
    /// Whether it was a direct hit or a gap fallback
    pub kind: HitKind,
}

/// Returns the expanded hit region of a target.
pub fn hit_region<T: TouchTarget + ?Sized>(target: &T, config: &TouchDetectionConfig) -> Rect {
    target.frame().inset(config.insets_for(target.class()))
}

/// Euclidean distance from `point` to `center`, scaled by the vertical bias
/// when the point is below the centre.
pub fn biased_distance(point: Point, center: Point, config: &TouchDetectionConfig) -> f32 {
    let distance = point.distance_to(center);
    if point.y > center.y {
        distance * config.vertical_bias
    } else {
        distance
    }
}

/// Resolves a touch point against the candidate keys.
///
/// Returns `None` when the touch is further than the gap radius from every
/// key. Ties go to the earliest candidate.
pub fn resolve<T: TouchTarget>(
    point: Point,
    candidates: &[T],
    config: &TouchDetectionConfig,
) -> Option<Resolution> {
    let mut direct: Option<Resolution> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        if !hit_region(candidate, config).contains(point) {
            continue;
        }
        let distance = biased_distance(point, candidate.frame().center(), config);
        if direct.is_none_or(|best| distance < best.distance) {
            direct = Some(Resolution {
                index,
                distance,
                kind: HitKind::Direct,
            });
        }
    }

    if let Some(resolution) = direct {
        tracing::trace!(
            "Touch ({:.1}, {:.1}) hit key #{} directly (distance {:.1})",
            point.x,
            point.y,
            resolution.index,
            resolution.distance
        );
        return Some(resolution);
    }

    let fallback = nearest_within_gap(point, candidates, config);
    match fallback {
        Some(resolution) => tracing::trace!(
            "Touch ({:.1}, {:.1}) snapped to key #{} across a gap (distance {:.1})",
            point.x,
            point.y,
            resolution.index,
            resolution.distance
        ),
        None => tracing::trace!(
            "Touch ({:.1}, {:.1}) has no key within {:.1}",
            point.x,
            point.y,
            config.max_gap_detection_distance
        ),
    }
    fallback
}

/// Nearest key by biased distance among those within the gap radius.
pub fn nearest_within_gap<T: TouchTarget>(
    point: Point,
    candidates: &[T],
    config: &TouchDetectionConfig,
) -> Option<Resolution> {
    let mut nearest: Option<Resolution> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let distance = biased_distance(point, candidate.frame().center(), config);
        if distance > config.max_gap_detection_distance {
            continue;
        }
        if nearest.is_none_or(|best| distance < best.distance) {
            nearest = Some(Resolution {
                index,
                distance,
                kind: HitKind::GapFallback,
            });
        }
    }

    nearest
}

// ============================================================================
// Tests
// ============================================================================
