mod forces;
mod params;
mod quadtree;

use eframe::egui::Vec2;

use crate::layout::{clamp_canvas, desired_positions, seed_positions};
use crate::outline::Outline;
use forces::{
    accumulate_charge, accumulate_collisions, apply_centering, apply_links, apply_targets,
    link_bias,
};
pub use params::{
    CENTER_STRENGTH_RANGE, ForceParameters, LINK_DISTANCE_RANGE, LINK_STRENGTH_RANGE,
    REPEL_STRENGTH_RANGE,
};
use quadtree::QuadNode;

const ALPHA_MIN: f32 = 0.001;
const REHEAT_ALPHA: f32 = 0.3;
const VELOCITY_DECAY: f32 = 0.4;
const BARNES_HUT_THETA: f32 = 0.9;
const COLLIDE_RADIUS: f32 = 14.0;
const TARGET_STRENGTH: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct SimNode {
    pub(in crate::app) position: Vec2,
    pub(in crate::app) velocity: Vec2,
    pin: Option<Vec2>,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    predicted: Vec<Vec2>,
    impulses: Vec<Vec2>,
}

/// Force-directed layout for one outline. Node storage is an arena indexed by
/// outline id; every position write outside the pin API happens in `tick`.
pub(in crate::app) struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<(usize, usize)>,
    link_bias: Vec<f32>,
    groups: Vec<usize>,
    depths: Vec<usize>,
    group_count: usize,
    targets: Vec<Vec2>,
    canvas: Vec2,
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    scratch: Scratch,
}

impl Simulation {
    pub(in crate::app) fn new(outline: &Outline, canvas: Vec2) -> Self {
        let canvas = clamp_canvas(canvas);
        let (groups, group_count) = outline.group_assignment();
        let depths = outline
            .nodes
            .iter()
            .map(|node| node.depth)
            .collect::<Vec<_>>();
        let targets = desired_positions(canvas, &groups, &depths, group_count);
        let nodes = seed_positions(&targets)
            .into_iter()
            .map(|position| SimNode {
                position,
                velocity: Vec2::ZERO,
                pin: None,
            })
            .collect::<Vec<_>>();

        let node_count = nodes.len();
        let links = outline
            .edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .filter(|&(source, target)| source < node_count && target < node_count && source != target)
            .collect::<Vec<_>>();
        let link_bias = link_bias(&links, node_count);

        Self {
            nodes,
            links,
            link_bias,
            groups,
            depths,
            group_count,
            targets,
            canvas,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            scratch: Scratch::default(),
        }
    }

    /// Advances one step. Returns `false` without touching anything once the
    /// simulation has cooled below `ALPHA_MIN`.
    pub(in crate::app) fn tick(&mut self, params: &ForceParameters) -> bool {
        if self.nodes.is_empty() || !self.is_active() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;
        let params = params.clamped();
        let center = self.center();

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
        }

        apply_links(
            &self.links,
            &self.link_bias,
            &scratch.positions,
            &mut scratch.velocities,
            params.link_distance,
            params.link_strength * alpha,
        );

        let charge = params.charge() * alpha;
        if charge != 0.0
            && let Some(tree) = QuadNode::build(&scratch.positions)
        {
            for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
                accumulate_charge(
                    &tree,
                    index,
                    &scratch.positions,
                    charge,
                    BARNES_HUT_THETA,
                    velocity,
                );
            }
        }

        apply_centering(
            &scratch.positions,
            &mut scratch.velocities,
            center,
            params.center_strength * alpha,
        );
        apply_targets(
            &scratch.positions,
            &mut scratch.velocities,
            &self.targets,
            TARGET_STRENGTH * alpha,
        );

        scratch.predicted.clear();
        scratch.predicted.extend(
            scratch
                .positions
                .iter()
                .zip(&scratch.velocities)
                .map(|(position, velocity)| *position + *velocity),
        );
        scratch.impulses.clear();
        scratch.impulses.resize(scratch.predicted.len(), Vec2::ZERO);
        if let Some(tree) = QuadNode::build(&scratch.predicted) {
            accumulate_collisions(
                &tree,
                &tree,
                true,
                &scratch.predicted,
                COLLIDE_RADIUS,
                &mut scratch.impulses,
            );
        }

        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity =
                (scratch.velocities[index] + scratch.impulses[index]) * (1.0 - VELOCITY_DECAY);
            let position = node.position + velocity;
            if position.is_finite() {
                node.velocity = velocity;
                node.position = position;
            } else {
                node.velocity = Vec2::ZERO;
                node.position = self.targets[index];
            }
        }

        true
    }

    pub(in crate::app) fn is_active(&self) -> bool {
        self.alpha >= ALPHA_MIN
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn reheat(&mut self) {
        self.alpha = self.alpha.max(REHEAT_ALPHA);
    }

    /// Moves the centering target and the group anchors to a new canvas.
    /// Returns whether the clamped size actually changed.
    pub(in crate::app) fn resize(&mut self, canvas: Vec2) -> bool {
        let canvas = clamp_canvas(canvas);
        if canvas == self.canvas {
            return false;
        }

        self.canvas = canvas;
        self.targets = desired_positions(canvas, &self.groups, &self.depths, self.group_count);
        self.reheat();
        true
    }

    pub(in crate::app) fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub(in crate::app) fn center(&self) -> Vec2 {
        self.canvas * 0.5
    }

    /// Fixes a node at `position` and keeps the simulation warm until every
    /// pin is released.
    pub(in crate::app) fn pin(&mut self, index: usize, position: Vec2) -> bool {
        let Some(node) = self.nodes.get_mut(index) else {
            return false;
        };
        node.pin = Some(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
        self.alpha_target = REHEAT_ALPHA;
        self.reheat();
        true
    }

    pub(in crate::app) fn move_pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index)
            && node.pin.is_some()
        {
            node.pin = Some(position);
            node.position = position;
        }
    }

    pub(in crate::app) fn release(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
            node.velocity = Vec2::ZERO;
        }
        if self.nodes.iter().all(|node| node.pin.is_none()) {
            self.alpha_target = 0.0;
        }
        self.reheat();
    }

    pub(in crate::app) fn is_pinned(&self, index: usize) -> bool {
        self.nodes.get(index).is_some_and(|node| node.pin.is_some())
    }

    pub(in crate::app) fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub(in crate::app) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::app) fn links(&self) -> &[(usize, usize)] {
        &self.links
    }
}
