// SPDX-License-Identifier: GPL-3.0-only

//! Geometry and frame calculations for the key registry.
//!
//! Coordinates are in points with the origin at the top-left of the keyboard
//! surface and `y` growing downwards.
//!
//! # Row Distribution
//!
//! Keys with a fixed width keep it. The width left over after fixed keys and
//! spacing is shared equally by the remaining keys, so a row of only flexible
//! keys fills the surface evenly and the bottom row's spacebar takes whatever
//! the fixed-width neighbours leave.

use crate::config::KeyMetrics;
use crate::layout::KeyTemplate;

/// A point on the keyboard surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate, growing downwards
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Edge insets. Positive values shrink a rectangle, negative values grow it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    /// Top edge
    pub top: f32,
    /// Left edge
    pub left: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Right edge
    pub right: f32,
}

impl Insets {
    /// The same inset on all four edges.
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            left: value,
            bottom: value,
            right: value,
        }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner
    pub x: f32,
    /// Y coordinate of the top-left corner
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal centre.
    pub fn mid_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical centre.
    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Centre point.
    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Applies edge insets. Negative insets expand the rectangle.
    pub fn inset(&self, insets: Insets) -> Rect {
        Rect {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: (self.width - insets.left - insets.right).max(0.0),
            height: (self.height - insets.top - insets.bottom).max(0.0),
        }
    }

    /// Half-open containment: the top and left edges are inside, the bottom
    /// and right edges are not.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }
}

/// Computes the frames of one row of keys at vertical offset `y`.
///
/// Flexible keys never shrink below zero width; if the fixed keys overflow the
/// surface they simply extend past the right edge.
pub fn layout_row(keys: &[&KeyTemplate], y: f32, metrics: &KeyMetrics) -> Vec<Rect> {
    if keys.is_empty() {
        return Vec::new();
    }

    let available = (metrics.surface_width - metrics.side_inset * 2.0).max(0.0);
    let spacing_total = metrics.key_spacing * (keys.len() - 1) as f32;
    let fixed_total: f32 = keys.iter().filter_map(|key| key.width).sum();
    let flexible_count = keys.iter().filter(|key| key.width.is_none()).count();

    let flexible_width = if flexible_count > 0 {
        ((available - spacing_total - fixed_total) / flexible_count as f32).max(0.0)
    } else {
        0.0
    };

    let mut x = metrics.side_inset;
    keys.iter()
        .map(|key| {
            let width = key.width.unwrap_or(flexible_width);
            let frame = Rect::new(x, y, width, metrics.key_height);
            x += width + metrics.key_spacing;
            frame
        })
        .collect()
}

/// Vertical offset of the top of row `row_index`.
pub fn row_origin_y(row_index: usize, metrics: &KeyMetrics) -> f32 {
    metrics.top_inset + row_index as f32 * (metrics.key_height + metrics.row_spacing)
}

/// Total surface height needed for `row_count` rows.
pub fn surface_height(row_count: usize, metrics: &KeyMetrics) -> f32 {
    if row_count == 0 {
        return metrics.top_inset;
    }
    row_origin_y(row_count - 1, metrics) + metrics.key_height + metrics.top_inset
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::KeyFunction;

    fn metrics(width: f32) -> KeyMetrics {
        KeyMetrics {
            surface_width: width,
            ..KeyMetrics::default()
        }
    }

    #[test]
    fn test_inset_expands_with_negative_values() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let expanded = rect.inset(Insets {
            top: -5.0,
            left: -3.0,
            bottom: -3.0,
            right: -3.0,
        });

        assert_eq!(expanded, Rect::new(7.0, 15.0, 36.0, 48.0));
        assert_eq!(expanded.center(), Point::new(25.0, 39.0));
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.99, 9.99)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
        assert!(!rect.contains(Point::new(5.0, 10.0)));
    }

    #[test]
    fn test_equal_distribution() {
        let templates: Vec<KeyTemplate> = ["a", "b", "c", "d"]
            .into_iter()
            .map(KeyTemplate::glyph)
            .collect();
        let keys: Vec<&KeyTemplate> = templates.iter().collect();

        // 4 + 4 side insets, 3 gaps of 6: (226 - 8 - 18) / 4 = 50
        let frames = layout_row(&keys, 8.0, &metrics(226.0));
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], Rect::new(4.0, 8.0, 50.0, 45.0));
        assert_eq!(frames[1].x, 60.0);
        assert_eq!(frames[3].max_x(), 222.0);
    }

    #[test]
    fn test_fixed_widths_leave_remainder_to_flexible_keys() {
        let templates = vec![
            KeyTemplate::function(KeyFunction::SymbolsToggle).with_width(Some(60.0)),
            KeyTemplate::function(KeyFunction::Space),
            KeyTemplate::function(KeyFunction::Enter).with_width(Some(60.0)),
        ];
        let keys: Vec<&KeyTemplate> = templates.iter().collect();

        // 300 - 8 insets - 12 spacing - 120 fixed = 160 for the spacebar
        let frames = layout_row(&keys, 0.0, &metrics(300.0));
        assert_eq!(frames[0].width, 60.0);
        assert_eq!(frames[1].width, 160.0);
        assert_eq!(frames[1].x, 70.0);
        assert_eq!(frames[2].x, 236.0);
    }

    #[test]
    fn test_row_origins() {
        let metrics = KeyMetrics::default();
        assert_eq!(row_origin_y(0, &metrics), 8.0);
        assert_eq!(row_origin_y(1, &metrics), 63.0);
        assert_eq!(surface_height(5, &metrics), 8.0 + 4.0 * 55.0 + 45.0 + 8.0);
    }
}
