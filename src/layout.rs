use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

pub const MIN_CANVAS_SIZE: Vec2 = Vec2::new(200.0, 160.0);
const SEED_JITTER: f32 = 10.0;

/// Floors the measured size and keeps it above the minimum drawable area.
pub fn clamp_canvas(size: Vec2) -> Vec2 {
    let width = if size.x.is_finite() { size.x.floor() } else { 0.0 };
    let height = if size.y.is_finite() { size.y.floor() } else { 0.0 };
    vec2(width.max(MIN_CANVAS_SIZE.x), height.max(MIN_CANVAS_SIZE.y))
}

pub fn anchor_radius(canvas: Vec2) -> f32 {
    (canvas.x.min(canvas.y) / 2.0 - 60.0).max(80.0)
}

pub fn group_direction(group: usize, group_count: usize) -> Vec2 {
    if group_count == 0 {
        return vec2(1.0, 0.0);
    }
    let angle = TAU * group as f32 / group_count as f32;
    vec2(angle.cos(), angle.sin())
}

pub fn group_anchors(canvas: Vec2, group_count: usize) -> Vec<Vec2> {
    let center = canvas * 0.5;
    let radius = anchor_radius(canvas);
    (0..group_count)
        .map(|group| center + group_direction(group, group_count) * radius)
        .collect()
}

/// Where each node would rest without other forces: out from its group
/// anchor along the anchor direction, one layer per nesting level. Centering
/// pulls the whole group back toward the middle, which leaves roots near the
/// center and descendants further out.
pub fn desired_positions(
    canvas: Vec2,
    groups: &[usize],
    depths: &[usize],
    group_count: usize,
) -> Vec<Vec2> {
    let anchors = group_anchors(canvas, group_count);
    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let layer_spacing = anchor_radius(canvas) / (max_depth as f32 + 2.0);

    groups
        .iter()
        .zip(depths)
        .map(|(&group, &depth)| {
            let anchor = anchors.get(group).copied().unwrap_or(canvas * 0.5);
            anchor + group_direction(group, group_count) * (depth as f32 * layer_spacing)
        })
        .collect()
}

pub fn seed_positions(targets: &[Vec2]) -> Vec<Vec2> {
    targets
        .iter()
        .enumerate()
        .map(|(index, target)| {
            let (jx, jy) = stable_pair(("seed", index));
            *target + vec2(jx, jy) * SEED_JITTER
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn clamps_degenerate_sizes() {
        assert_eq!(clamp_canvas(Vec2::ZERO), MIN_CANVAS_SIZE);
        assert_eq!(clamp_canvas(vec2(-5.0, f32::NAN)), MIN_CANVAS_SIZE);
        assert_eq!(clamp_canvas(vec2(640.7, 320.2)), vec2(640.0, 320.0));
    }

    #[test]
    fn anchor_radius_has_a_floor() {
        assert_eq!(anchor_radius(vec2(200.0, 160.0)), 80.0);
        assert_eq!(anchor_radius(vec2(800.0, 600.0)), 240.0);
    }

    #[test]
    fn anchors_are_evenly_spaced_on_a_circle() {
        let canvas = vec2(600.0, 400.0);
        let anchors = group_anchors(canvas, 4);
        let center = canvas * 0.5;
        let radius = anchor_radius(canvas);

        assert_eq!(anchors.len(), 4);
        for anchor in &anchors {
            assert!(close((*anchor - center).length(), radius));
        }
        assert!(close(anchors[0].x, center.x + radius));
        assert!(close(anchors[1].y, center.y + radius));
        assert!(close(anchors[2].x, center.x - radius));
        assert!(close(anchors[3].y, center.y - radius));
    }

    #[test]
    fn deeper_targets_sit_farther_out() {
        let canvas = vec2(600.0, 400.0);
        let center = canvas * 0.5;
        let groups = [0, 0, 0, 1, 1];
        let depths = [0, 1, 2, 0, 1];
        let targets = desired_positions(canvas, &groups, &depths, 2);

        let distance = |index: usize| (targets[index] - center).length();
        assert!(distance(0) < distance(1));
        assert!(distance(1) < distance(2));
        assert!(distance(3) < distance(4));
        assert!(close(distance(0), anchor_radius(canvas)));
    }

    #[test]
    fn single_group_extends_along_the_first_anchor() {
        let canvas = vec2(400.0, 300.0);
        let targets = desired_positions(canvas, &[0, 0], &[0, 1], 1);
        assert_eq!(targets[0], group_anchors(canvas, 1)[0]);
        assert!(targets[1].x > targets[0].x);
        assert!(close(targets[1].y, targets[0].y));
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(desired_positions(vec2(400.0, 300.0), &[], &[], 0).is_empty());
        assert!(group_anchors(vec2(400.0, 300.0), 0).is_empty());
        assert!(seed_positions(&[]).is_empty());
    }

    #[test]
    fn seeds_stay_near_targets() {
        let targets = [vec2(10.0, 10.0), vec2(50.0, -20.0)];
        for (seed, target) in seed_positions(&targets).iter().zip(&targets) {
            assert!((*seed - *target).length() <= SEED_JITTER * 2.0_f32.sqrt() + 1e-3);
        }
    }
}
