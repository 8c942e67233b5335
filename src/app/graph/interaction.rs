use eframe::egui::{self, Pos2, Rect, Response, Ui, Vec2};

use super::super::physics::Simulation;

pub(in crate::app) const MIN_ZOOM: f32 = 0.25;
pub(in crate::app) const MAX_ZOOM: f32 = 4.0;
pub(in crate::app) const HIT_RADIUS: f32 = 10.0;
const SCROLL_ZOOM_RATE: f32 = 0.0018;

/// Translate + uniform scale from simulation space onto the widget rect.
/// Node data is never touched by it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub(in crate::app) fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.min + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.min - self.pan) / self.zoom
    }

    /// Scales by `factor` keeping the world point under `anchor` fixed.
    pub(in crate::app) fn zoom_about(&mut self, rect: Rect, anchor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let world_before = self.screen_to_world(rect, anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - rect.min - world_before * self.zoom;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) enum Gesture {
    #[default]
    Idle,
    DraggingNode(usize),
    Panning,
}

impl Gesture {
    pub(in crate::app) fn is_active(self) -> bool {
        self != Self::Idle
    }
}

/// Closest node whose screen position lies within `HIT_RADIUS` of `pointer`.
pub(in crate::app) fn hit_node(
    simulation: &Simulation,
    transform: &ViewTransform,
    rect: Rect,
    pointer: Pos2,
) -> Option<usize> {
    simulation
        .nodes()
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let distance = transform
                .world_to_screen(rect, node.position)
                .distance(pointer);
            (distance <= HIT_RADIUS).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Routes one frame of pointer input. A press on a node pins it for the whole
/// drag and the pan gesture never starts for that pointer sequence.
pub(in crate::app) fn handle_pointer(
    gesture: &mut Gesture,
    transform: &mut ViewTransform,
    simulation: &mut Simulation,
    rect: Rect,
    response: &Response,
) {
    if response.drag_started_by(egui::PointerButton::Primary) {
        let press = response
            .ctx
            .input(|input| input.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        *gesture = match press.and_then(|pointer| hit_node(simulation, transform, rect, pointer)) {
            Some(index) => {
                let grab = press.map_or(Vec2::ZERO, |pointer| transform.screen_to_world(rect, pointer));
                simulation.pin(index, grab);
                log::debug!("pinned node {index}");
                Gesture::DraggingNode(index)
            }
            None => Gesture::Panning,
        };
    }

    if response.dragged() {
        match *gesture {
            Gesture::DraggingNode(index) => {
                if let Some(pointer) = response.interact_pointer_pos() {
                    simulation.move_pin(index, transform.screen_to_world(rect, pointer));
                }
            }
            Gesture::Panning => transform.pan += response.drag_delta(),
            Gesture::Idle => {}
        }
    }

    if response.drag_stopped() {
        if let Gesture::DraggingNode(index) = *gesture {
            simulation.release(index);
            log::debug!("released node {index}");
        }
        *gesture = Gesture::Idle;
    }
}

/// Wheel and pinch zoom about the pointer. Consumes the scroll so an
/// enclosing scroll area does not move at the same time.
pub(in crate::app) fn handle_zoom(
    ui: &Ui,
    transform: &mut ViewTransform,
    rect: Rect,
    response: &Response,
) {
    if !response.hovered() {
        return;
    }

    let (scroll, pinch, pointer) = ui.input(|input| {
        (
            input.raw_scroll_delta.y,
            input.zoom_delta(),
            input.pointer.hover_pos(),
        )
    });
    let wheel = if scroll.abs() > f32::EPSILON {
        (1.0 + scroll * SCROLL_ZOOM_RATE).clamp(0.85, 1.15)
    } else {
        1.0
    };

    let factor = wheel * pinch;
    if (factor - 1.0).abs() <= f32::EPSILON {
        return;
    }

    transform.zoom_about(rect, pointer.unwrap_or_else(|| rect.center()), factor);
    ui.ctx().input_mut(|input| {
        input.smooth_scroll_delta = Vec2::ZERO;
        input.raw_scroll_delta = Vec2::ZERO;
    });
}
