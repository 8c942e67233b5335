use std::ops::RangeInclusive;

use eframe::egui::{self, Align, Layout, Rect, Ui, UiBuilder, pos2, vec2};

use super::super::graph::OutlineGraphView;
use super::super::physics::{
    CENTER_STRENGTH_RANGE, ForceParameters, LINK_DISTANCE_RANGE, LINK_STRENGTH_RANGE,
    REPEL_STRENGTH_RANGE,
};

const OVERLAY_MARGIN: f32 = 8.0;
const PANEL_WIDTH: f32 = 230.0;
const OPEN_BUTTON_SIZE: egui::Vec2 = vec2(92.0, 22.0);

fn force_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    label: &str,
    hint: &str,
) -> bool {
    ui.add(
        egui::Slider::new(value, range)
            .text(label)
            .clamping(egui::SliderClamping::Always),
    )
    .on_hover_text(hint)
    .changed()
}

/// The four live force sliders. Returns whether any value moved.
pub(in crate::app) fn force_sliders(ui: &mut Ui, params: &mut ForceParameters) -> bool {
    let mut changed = false;
    changed |= force_slider(
        ui,
        &mut params.center_strength,
        CENTER_STRENGTH_RANGE,
        "Center",
        "Pull of every node toward the middle of the canvas.",
    );
    changed |= force_slider(
        ui,
        &mut params.repel_strength,
        REPEL_STRENGTH_RANGE,
        "Repel",
        "How strongly nodes push each other apart.",
    );
    changed |= force_slider(
        ui,
        &mut params.link_strength,
        LINK_STRENGTH_RANGE,
        "Link strength",
        "Stiffness of the parent/child links.",
    );
    changed |= force_slider(
        ui,
        &mut params.link_distance,
        LINK_DISTANCE_RANGE,
        "Link distance",
        "Rest length of the parent/child links.",
    );
    changed
}

impl OutlineGraphView {
    /// Force panel and open-view button, faded in while the pointer is over
    /// the graph.
    pub(in crate::app) fn draw_overlay(&mut self, ui: &mut Ui, rect: Rect) {
        let opacity = self.overlay_opacity(ui, rect);
        if opacity <= 0.0 {
            return;
        }
        let inner = rect.shrink(OVERLAY_MARGIN);

        if self.show_force_controls {
            let panel_rect = Rect::from_min_size(
                inner.min,
                vec2(PANEL_WIDTH.min(inner.width()), inner.height()),
            );
            let mut panel = ui.new_child(
                UiBuilder::new()
                    .id_salt(self.id.with("forces"))
                    .max_rect(panel_rect)
                    .layout(Layout::top_down(Align::Min)),
            );
            panel.multiply_opacity(opacity);

            let header_id = self.id.with("forces-header");
            let params = &mut self.params;
            let mut changed = false;
            egui::Frame::popup(panel.style()).show(&mut panel, |ui| {
                egui::CollapsingHeader::new("Forces")
                    .id_salt(header_id)
                    .default_open(false)
                    .show(ui, |ui| {
                        changed = force_sliders(ui, params);
                    });
            });

            if changed {
                log::debug!("force parameters changed: {:?}", self.params);
                self.reheat();
            }
        }

        if self.open_view.is_some() {
            let button_rect = Rect::from_min_size(
                pos2(inner.right() - OPEN_BUTTON_SIZE.x, inner.top()),
                OPEN_BUTTON_SIZE,
            );
            let mut corner = ui.new_child(
                UiBuilder::new()
                    .id_salt(self.id.with("open-view"))
                    .max_rect(button_rect)
                    .layout(Layout::right_to_left(Align::Min)),
            );
            corner.multiply_opacity(opacity);

            if corner
                .button("Open view")
                .on_hover_text("Open this graph in its own window.")
                .clicked()
            {
                self.request_open_view();
            }
        }
    }
}
