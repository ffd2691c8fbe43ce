//! Track boundary model
//!
//! Two B-spline curves bound the drivable band. Both curves are wound in the
//! same direction, so the left-hand normal `(-t.y, t.x)` of the left curve
//! points away from the band while the same normal on the right curve points
//! into it.
//!
//! Control points are edited one side at a time (the active side) and one
//! point can be selected for dragging.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::nearest::{ClosestPointInfo, closest_point};
use super::spline;
use crate::consts::*;

/// Which boundary curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveSide {
    Left,
    Right,
}

impl CurveSide {
    pub fn other(self) -> Self {
        match self {
            CurveSide::Left => CurveSide::Right,
            CurveSide::Right => CurveSide::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CurveSide::Left => "left",
            CurveSide::Right => "right",
        }
    }
}

/// A selected control point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub side: CurveSide,
    pub index: usize,
}

/// The pair of boundary curves plus editor state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    left: Vec<Vec2>,
    right: Vec<Vec2>,
    /// Closed curve (wraps indices) or open curve
    pub looped: bool,
    active_side: CurveSide,
    selection: Option<Selection>,
}

impl Default for Track {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Track {
    /// Default oval circuit for a 1280x720 playfield.
    ///
    /// The right curve is the outer wall, the left curve the infield.
    pub fn new(looped: bool) -> Self {
        let right = vec![
            Vec2::new(160.0, 140.0),
            Vec2::new(640.0, 110.0),
            Vec2::new(1120.0, 140.0),
            Vec2::new(1160.0, 360.0),
            Vec2::new(1120.0, 580.0),
            Vec2::new(640.0, 610.0),
            Vec2::new(160.0, 580.0),
            Vec2::new(120.0, 360.0),
        ];
        let left = vec![
            Vec2::new(400.0, 300.0),
            Vec2::new(640.0, 290.0),
            Vec2::new(880.0, 300.0),
            Vec2::new(900.0, 360.0),
            Vec2::new(880.0, 420.0),
            Vec2::new(640.0, 430.0),
            Vec2::new(400.0, 420.0),
            Vec2::new(380.0, 360.0),
        ];
        Self::from_control_points(left, right, looped)
    }

    /// Build a track from explicit control points (each list is truncated to `MAX_POINTS`)
    pub fn from_control_points(mut left: Vec<Vec2>, mut right: Vec<Vec2>, looped: bool) -> Self {
        left.truncate(MAX_POINTS);
        right.truncate(MAX_POINTS);
        Self {
            left,
            right,
            looped,
            active_side: CurveSide::Left,
            selection: None,
        }
    }

    pub fn control_points(&self, side: CurveSide) -> &[Vec2] {
        match side {
            CurveSide::Left => &self.left,
            CurveSide::Right => &self.right,
        }
    }

    fn points_mut(&mut self, side: CurveSide) -> &mut Vec<Vec2> {
        match side {
            CurveSide::Left => &mut self.left,
            CurveSide::Right => &mut self.right,
        }
    }

    pub fn active_side(&self) -> CurveSide {
        self.active_side
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// True when both curves have enough points to be evaluated as splines
    pub fn is_playable(&self) -> bool {
        self.left.len() >= MIN_POINTS_PER_CURVE && self.right.len() >= MIN_POINTS_PER_CURVE
    }

    // === Editing ===

    /// Insert a point on the active side before `index`, or append when the
    /// index is absent or out of range. Ignored once the side is full.
    pub fn add_control_point(&mut self, point: Vec2, index: Option<usize>) {
        let side = self.active_side;
        let len = self.control_points(side).len();
        if len >= MAX_POINTS {
            log::debug!("{} curve is full ({} points), add ignored", side.as_str(), len);
            return;
        }

        let insert_at = index.filter(|&i| i <= len).unwrap_or(len);
        self.points_mut(side).insert(insert_at, point);

        // Keep the selection on the same point
        if let Some(sel) = self.selection.as_mut() {
            if sel.side == side && sel.index >= insert_at {
                sel.index += 1;
            }
        }
    }

    /// Remove a point from the active side.
    ///
    /// Removes `index` when given, otherwise the selected point if it lives on
    /// the active side, otherwise the last point. Returns false without
    /// touching anything when the side is at its minimum or `index` is invalid.
    pub fn remove_control_point(&mut self, index: Option<usize>) -> bool {
        let side = self.active_side;
        let len = self.control_points(side).len();
        if len <= MIN_POINTS_PER_CURVE {
            log::debug!("{} curve at minimum ({} points), remove rejected", side.as_str(), len);
            return false;
        }

        let removal = match index {
            Some(i) if i < len => i,
            Some(i) => {
                log::debug!("remove index {} out of range for {} curve", i, side.as_str());
                return false;
            }
            None => match self.selection {
                Some(sel) if sel.side == side => sel.index,
                _ => len - 1,
            },
        };

        self.points_mut(side).remove(removal);

        if let Some(sel) = self.selection {
            if sel.side == side {
                if sel.index == removal {
                    self.selection = None;
                } else if sel.index > removal {
                    self.selection = Some(Selection {
                        side,
                        index: sel.index - 1,
                    });
                }
            }
        }
        true
    }

    /// Select the first control point within the pick radius of (x, y),
    /// scanning the left curve before the right one
    pub fn select_point_near(&mut self, x: f32, y: f32) -> bool {
        self.selection = None;
        let cursor = Vec2::new(x, y);

        for side in [CurveSide::Left, CurveSide::Right] {
            let hit = self
                .control_points(side)
                .iter()
                .position(|p| p.distance_squared(cursor) < SELECT_RADIUS_SQ);
            if let Some(index) = hit {
                self.selection = Some(Selection { side, index });
                return true;
            }
        }
        false
    }

    /// Drag the selected point to (x, y)
    pub fn move_selected(&mut self, x: f32, y: f32) {
        if let Some(sel) = self.selection {
            if let Some(p) = self.points_mut(sel.side).get_mut(sel.index) {
                *p = Vec2::new(x, y);
            }
        }
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Toggle the side that edits apply to
    pub fn switch_active_side(&mut self) {
        self.active_side = self.active_side.other();
        self.selection = None;
        log::debug!("editing {} curve", self.active_side.as_str());
    }

    // === Queries ===

    /// Position on a curve at global parameter `t`.
    ///
    /// Below `MIN_POINTS_PER_CURVE` this is the first control point (or the
    /// origin for an empty curve).
    pub fn point_on_curve(&self, t: f32, side: CurveSide) -> Vec2 {
        let points = self.control_points(side);
        let fallback = points.first().copied().unwrap_or(Vec2::ZERO);
        if points.len() < MIN_POINTS_PER_CURVE {
            return fallback;
        }
        spline::point_at(points, self.looped, t).unwrap_or(fallback)
    }

    /// Un-normalized tangent at global parameter `t`; unit x below the minimum
    pub fn tangent_on_curve(&self, t: f32, side: CurveSide) -> Vec2 {
        let points = self.control_points(side);
        if points.len() < MIN_POINTS_PER_CURVE {
            return Vec2::X;
        }
        spline::tangent_at(points, self.looped, t).unwrap_or(Vec2::X)
    }

    /// Approximate nearest point on a curve (see [`closest_point`])
    pub fn find_closest_point_on_curve(&self, query: Vec2, side: CurveSide) -> ClosestPointInfo {
        closest_point(self.control_points(side), self.looped, query)
    }

    /// Polyline through the curve, `steps_per_segment` lines per segment.
    ///
    /// Closed curves end on their starting point. Empty below the minimum.
    pub fn boundary_polyline(&self, side: CurveSide, steps_per_segment: usize) -> Vec<Vec2> {
        let points = self.control_points(side);
        let segments = spline::segment_count(points.len(), self.looped);
        if points.len() < MIN_POINTS_PER_CURVE || segments == 0 {
            return Vec::new();
        }
        let steps = steps_per_segment.max(1);

        let mut line = Vec::with_capacity(segments * steps + 1);
        for seg in 0..segments {
            let quad = spline::control_quad(points, seg, self.looped);
            for j in 0..steps {
                line.push(spline::segment_point(j as f32 / steps as f32, quad));
            }
        }
        let last = spline::control_quad(points, segments - 1, self.looped);
        line.push(spline::segment_point(1.0, last));
        line
    }

    /// Point between the two curves at the same parameter.
    ///
    /// `blend` 0 is on the left curve, 1 on the right curve.
    pub fn point_between(&self, t: f32, blend: f32) -> Vec2 {
        let left = self.point_on_curve(t, CurveSide::Left);
        let right = self.point_on_curve(t, CurveSide::Right);
        left + (right - left) * blend
    }

    /// Starting position and heading for a vehicle: halfway across the track
    /// at t = 0, facing along the averaged curve direction.
    ///
    /// Falls back to the first raw control points (heading 0) when the curves
    /// are not yet splines. `None` when either side is empty.
    pub fn start_pose(&self) -> Option<(Vec2, f32)> {
        if !self.is_playable() {
            let (l, r) = (self.left.first()?, self.right.first()?);
            log::warn!(
                "track not playable (L:{}, R:{}), starting at first control points",
                self.left.len(),
                self.right.len()
            );
            return Some(((*l + *r) * 0.5, 0.0));
        }

        let position = self.point_between(0.0, 0.5);
        let tl = self.tangent_on_curve(0.0, CurveSide::Left).normalize_or_zero();
        let tr = self.tangent_on_curve(0.0, CurveSide::Right).normalize_or_zero();
        let heading = (tl + tr).normalize_or_zero();
        let angle = if heading == Vec2::ZERO {
            log::warn!("track start has no clear direction, heading defaults to 0");
            0.0
        } else {
            crate::wrap_angle(heading.y.atan2(heading.x))
        };
        Some((position, angle))
    }
}

#[cfg(test)]
impl Track {
    /// Axis-aligned rectangular course shared by the geometry tests: four
    /// control points per side, same winding. The outer top edge sits near
    /// y = 213 and the inner top edge near y = 305.
    pub(crate) fn rectangle_course() -> Self {
        let right = vec![
            Vec2::new(200.0, 200.0),
            Vec2::new(1080.0, 200.0),
            Vec2::new(1080.0, 520.0),
            Vec2::new(200.0, 520.0),
        ];
        let left = vec![
            Vec2::new(400.0, 300.0),
            Vec2::new(880.0, 300.0),
            Vec2::new(880.0, 420.0),
            Vec2::new(400.0, 420.0),
        ];
        Self::from_control_points(left, right, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32, count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|i| Vec2::new(i as f32 * size, (i % 2) as f32 * size))
            .collect()
    }

    fn small_track() -> Track {
        Track::from_control_points(square(50.0, 4), square(80.0, 6), true)
    }

    #[test]
    fn test_add_appends_on_bad_index() {
        let mut track = small_track();
        track.add_control_point(Vec2::new(1.0, 2.0), Some(99));
        assert_eq!(track.control_points(CurveSide::Left).len(), 5);
        assert_eq!(track.control_points(CurveSide::Left)[4], Vec2::new(1.0, 2.0));

        track.add_control_point(Vec2::new(7.0, 7.0), Some(0));
        assert_eq!(track.control_points(CurveSide::Left)[0], Vec2::new(7.0, 7.0));
        // Right side untouched
        assert_eq!(track.control_points(CurveSide::Right).len(), 6);
    }

    #[test]
    fn test_add_ignored_at_max() {
        let mut track = Track::from_control_points(square(10.0, MAX_POINTS), square(10.0, 4), true);
        track.add_control_point(Vec2::ZERO, None);
        assert_eq!(track.control_points(CurveSide::Left).len(), MAX_POINTS);
    }

    #[test]
    fn test_remove_rejected_at_minimum() {
        let mut track = small_track();
        assert!(!track.remove_control_point(None));
        assert_eq!(track.control_points(CurveSide::Left).len(), MIN_POINTS_PER_CURVE);
    }

    #[test]
    fn test_remove_invalid_index_is_noop() {
        let mut track = small_track();
        track.switch_active_side();
        assert!(!track.remove_control_point(Some(6)));
        assert_eq!(track.control_points(CurveSide::Right).len(), 6);
    }

    #[test]
    fn test_remove_defaults_to_last_point() {
        let mut track = small_track();
        track.switch_active_side();
        let last = *track.control_points(CurveSide::Right).last().unwrap();
        assert!(track.remove_control_point(None));
        assert_eq!(track.control_points(CurveSide::Right).len(), 5);
        assert!(!track.control_points(CurveSide::Right).contains(&last));
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut track = small_track();
        track.switch_active_side();
        let target = track.control_points(CurveSide::Right)[2];
        // Left points sit on a 50 grid, so pick a right point that isn't shared
        assert!(track.select_point_near(target.x + 1.0, target.y));
        assert_eq!(
            track.selection(),
            Some(Selection { side: CurveSide::Right, index: 2 })
        );
        assert!(track.remove_control_point(None));
        assert_eq!(track.selection(), None);
        assert!(!track.control_points(CurveSide::Right).contains(&target));
    }

    #[test]
    fn test_remove_below_selection_shifts_index() {
        let mut track = small_track();
        track.switch_active_side();
        let p = track.control_points(CurveSide::Right)[4];
        assert!(track.select_point_near(p.x, p.y));
        assert!(track.remove_control_point(Some(1)));
        assert_eq!(
            track.selection(),
            Some(Selection { side: CurveSide::Right, index: 3 })
        );
        assert_eq!(track.control_points(CurveSide::Right)[3], p);
    }

    #[test]
    fn test_insert_before_selection_keeps_point_selected() {
        let mut track = small_track();
        let p = track.control_points(CurveSide::Left)[2];
        assert!(track.select_point_near(p.x, p.y));
        track.add_control_point(Vec2::new(-5.0, -5.0), Some(1));
        let sel = track.selection().unwrap();
        assert_eq!(track.control_points(CurveSide::Left)[sel.index], p);
    }

    #[test]
    fn test_failed_select_clears_stale_selection() {
        let mut track = small_track();
        let p = track.control_points(CurveSide::Right)[5];
        assert!(track.select_point_near(p.x, p.y));
        assert!(track.selection().is_some());
        assert!(!track.select_point_near(-1000.0, -1000.0));
        assert_eq!(track.selection(), None);
    }

    #[test]
    fn test_select_prefers_left_curve() {
        // Both curves share the origin
        let mut track = small_track();
        assert!(track.select_point_near(3.0, 3.0));
        assert_eq!(track.selection().unwrap().side, CurveSide::Left);
    }

    #[test]
    fn test_move_selected() {
        let mut track = small_track();
        track.move_selected(1.0, 1.0); // nothing selected
        assert_eq!(track.control_points(CurveSide::Left)[0], Vec2::ZERO);

        assert!(track.select_point_near(50.0, 50.0));
        track.move_selected(55.0, 60.0);
        assert_eq!(track.control_points(CurveSide::Left)[1], Vec2::new(55.0, 60.0));
    }

    #[test]
    fn test_switch_side_clears_selection() {
        let mut track = small_track();
        assert!(track.select_point_near(0.0, 0.0));
        track.switch_active_side();
        assert_eq!(track.active_side(), CurveSide::Right);
        assert_eq!(track.selection(), None);
    }

    #[test]
    fn test_fallbacks_below_minimum() {
        let track = Track::from_control_points(
            vec![Vec2::new(3.0, 4.0), Vec2::new(10.0, 0.0)],
            Vec::new(),
            true,
        );
        assert_eq!(track.point_on_curve(0.5, CurveSide::Left), Vec2::new(3.0, 4.0));
        assert_eq!(track.tangent_on_curve(0.5, CurveSide::Left), Vec2::X);
        assert_eq!(track.point_on_curve(0.5, CurveSide::Right), Vec2::ZERO);
        assert!(!track.is_playable());
        assert!(track.start_pose().is_none());
        assert!(track.boundary_polyline(CurveSide::Left, 20).is_empty());
    }

    #[test]
    fn test_polyline_closes_loop() {
        let track = Track::new(true);
        let line = track.boundary_polyline(CurveSide::Right, RENDER_STEPS_PER_SEGMENT);
        assert_eq!(line.len(), 8 * RENDER_STEPS_PER_SEGMENT + 1);
        assert!((line[0] - *line.last().unwrap()).length() < 1e-3);
    }

    #[test]
    fn test_polyline_open_curve() {
        let track = Track::new(false);
        let line = track.boundary_polyline(CurveSide::Left, 10);
        // 8 points, open: 5 segments
        assert_eq!(line.len(), 5 * 10 + 1);
        assert!((line[0] - *line.last().unwrap()).length() > 1.0);
    }

    #[test]
    fn test_start_pose_between_curves() {
        let track = Track::new(true);
        let (pos, angle) = track.start_pose().unwrap();
        let l = track.point_on_curve(0.0, CurveSide::Left);
        let r = track.point_on_curve(0.0, CurveSide::Right);
        assert!((pos - (l + r) * 0.5).length() < 1e-3);
        // Default circuit starts on the top straight heading +x
        assert!(angle < 0.1 || angle > std::f32::consts::TAU - 0.1);
    }

    #[test]
    fn test_default_circuit_winding() {
        // Left-hand normal at the start points toward the infield centre on both curves
        let track = Track::new(true);
        let centre = Vec2::new(640.0, 360.0);
        for side in [CurveSide::Left, CurveSide::Right] {
            let p = track.point_on_curve(0.0, side);
            let t = track.tangent_on_curve(0.0, side).normalize();
            let n = Vec2::new(-t.y, t.x);
            assert!(n.dot(centre - p) > 0.0);
        }
    }
}
