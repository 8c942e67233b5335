use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const DISTANCE_MIN_SQ: f32 = 1.0;
const COLLIDE_STRENGTH: f32 = 1.0;

/// Separating direction for coincident points. Antisymmetric, so the two
/// nodes of a pair are pushed opposite ways.
fn jiggle(a: usize, b: usize) -> Vec2 {
    let (low, high, sign) = if a <= b { (a, b, 1.0) } else { (b, a, -1.0) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin()) * sign
}

/// Degree-weighted share of each link's correction applied to its target.
pub(super) fn link_bias(links: &[(usize, usize)], node_count: usize) -> Vec<f32> {
    let mut degree = vec![0usize; node_count];
    for &(source, target) in links {
        degree[source] += 1;
        degree[target] += 1;
    }
    links
        .iter()
        .map(|&(source, target)| {
            degree[source] as f32 / (degree[source] + degree[target]) as f32
        })
        .collect()
}

/// Springs between linked nodes, measured on next-step positions.
/// `strength` is already scaled by alpha.
pub(super) fn apply_links(
    links: &[(usize, usize)],
    bias: &[f32],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    strength: f32,
) {
    if strength == 0.0 {
        return;
    }

    for (&(source, target), &bias) in links.iter().zip(bias) {
        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() < 1e-12 {
            delta = jiggle(source, target) * 1e-3;
        }

        let length = delta.length();
        let correction = delta * ((length - distance) / length * strength);
        velocities[target] -= correction * bias;
        velocities[source] += correction * (1.0 - bias);
    }
}

fn charge_between(point: Vec2, other: Vec2, charge: f32, index: usize, other_index: usize) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq == 0.0 {
        delta = jiggle(other_index, index);
        distance_sq = DISTANCE_MIN_SQ;
    }
    delta * (charge / distance_sq.max(DISTANCE_MIN_SQ))
}

/// Many-body force on one node with Barnes-Hut approximation. Strength falls
/// off with the inverse of distance; a negative `charge` repels.
pub(super) fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charge: f32,
    theta: f32,
    velocity: &mut Vec2,
) {
    if node.count == 0 {
        return;
    }

    let point = positions[index];
    if node.is_leaf() {
        for &other in &node.points {
            if other != index {
                *velocity += charge_between(point, positions[other], charge, index, other);
            }
        }
        return;
    }

    let delta = node.centroid - point;
    let distance_sq = delta.length_sq();
    let width = node.cell.width();
    if !node.cell.contains(point) && width * width < theta * theta * distance_sq {
        *velocity += delta * (charge * node.count as f32 / distance_sq.max(DISTANCE_MIN_SQ));
        return;
    }

    for child in node.child_nodes() {
        accumulate_charge(child, index, positions, charge, theta, velocity);
    }
}

/// Per-axis pull of every node toward one point.
pub(super) fn apply_centering(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    center: Vec2,
    strength: f32,
) {
    for (position, velocity) in positions.iter().zip(velocities.iter_mut()) {
        *velocity += (center - *position) * strength;
    }
}

/// Per-axis pull of each node toward its own desired position.
pub(super) fn apply_targets(
    positions: &[Vec2],
    velocities: &mut [Vec2],
    targets: &[Vec2],
    strength: f32,
) {
    for ((position, velocity), target) in positions.iter().zip(velocities.iter_mut()).zip(targets) {
        *velocity += (*target - *position) * strength;
    }
}

fn separate(from: usize, to: usize, predicted: &[Vec2], reach: f32, impulses: &mut [Vec2]) {
    let mut delta = predicted[from] - predicted[to];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }
    if distance_sq == 0.0 {
        delta = jiggle(from, to) * 1e-3;
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance * COLLIDE_STRENGTH * 0.5);
    impulses[from] += push;
    impulses[to] -= push;
}

/// Resolves overlaps between nodes of equal `radius`, visiting only pairs of
/// quadtree cells that are within reach of each other.
pub(super) fn accumulate_collisions(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radius: f32,
    impulses: &mut [Vec2],
) {
    let reach = radius * 2.0;
    if node_a.cell.gap_sq(node_b.cell) > reach * reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.points.iter().enumerate() {
                for &to in &node_a.points[offset + 1..] {
                    separate(from, to, predicted, reach, impulses);
                }
            }
        } else {
            for &from in &node_a.points {
                for &to in &node_b.points {
                    separate(from, to, predicted, reach, impulses);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.child_nodes().collect::<Vec<_>>();
        for (offset, child) in children.iter().enumerate() {
            accumulate_collisions(child, child, true, predicted, radius, impulses);
            for other in &children[offset + 1..] {
                accumulate_collisions(child, other, false, predicted, radius, impulses);
            }
        }
        return;
    }

    let split_a = !node_a.is_leaf() && (node_b.is_leaf() || node_a.cell.half >= node_b.cell.half);
    if split_a {
        for child in node_a.child_nodes() {
            accumulate_collisions(child, node_b, false, predicted, radius, impulses);
        }
    } else {
        for child in node_b.child_nodes() {
            accumulate_collisions(node_a, child, false, predicted, radius, impulses);
        }
    }
}
