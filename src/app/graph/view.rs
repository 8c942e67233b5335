use eframe::egui::{self, Align2, FontId, Id, Sense, Stroke, Ui, Vec2, vec2};

use crate::outline::{Outline, parse_outline};
use crate::settings::Settings;
use crate::util::ellipsize;

use super::super::physics::{ForceParameters, Simulation};
use super::super::render_utils::{circle_visible, faded, segment_visible};
use super::interaction::{Gesture, ViewTransform, handle_pointer, handle_zoom, hit_node};
use super::scene::Scene;

const NODE_RADIUS: f32 = 4.0;
const LABEL_SIZE: f32 = 10.0;
const LABEL_OFFSET: Vec2 = vec2(6.0, 0.0);
const LABEL_MAX_CHARS: usize = 40;
const EDGE_OPACITY: f32 = 0.6;
const OVERLAY_FADE_SECS: f32 = 0.2;

/// Request to open a block's source in a dedicated view.
pub(in crate::app) type OpenViewFn = Box<dyn FnMut(&str)>;

enum Mount {
    /// Waiting for a measured, nonzero size; `measured` flips on the first
    /// one so the layout starts a frame later.
    Pending { measured: bool },
    Live(Simulation),
    Disposed,
}

/// One interactive graph for one outline block. Owns its simulation;
/// disposing or dropping the view stops it for good.
pub(in crate::app) struct OutlineGraphView {
    pub(in crate::app) id: Id,
    pub(in crate::app) source: String,
    outline: Outline,
    mount: Mount,
    scene: Scene,
    pub(in crate::app) params: ForceParameters,
    pub(in crate::app) show_force_controls: bool,
    transform: ViewTransform,
    gesture: Gesture,
    pub(in crate::app) open_view: Option<OpenViewFn>,
}

impl OutlineGraphView {
    pub(in crate::app) fn new(id: Id, source: impl Into<String>, settings: &Settings) -> Self {
        let source = source.into();
        let outline = parse_outline(&source);
        log::debug!(
            "parsed outline block: {} nodes, {} edges, {} roots, depth {}, {} demoted",
            outline.node_count(),
            outline.edge_count(),
            outline.root_ids().count(),
            outline.max_depth(),
            outline.demoted
        );

        Self {
            id,
            scene: Scene::new(&outline),
            source,
            outline,
            mount: Mount::Pending { measured: false },
            params: settings.forces,
            show_force_controls: settings.show_force_controls,
            transform: ViewTransform::default(),
            gesture: Gesture::Idle,
            open_view: None,
        }
    }

    pub(in crate::app) fn with_open_view(mut self, open_view: OpenViewFn) -> Self {
        self.open_view = Some(open_view);
        self
    }

    pub(in crate::app) fn outline(&self) -> &Outline {
        &self.outline
    }

    pub(in crate::app) fn simulation(&self) -> Option<&Simulation> {
        match &self.mount {
            Mount::Live(simulation) => Some(simulation),
            _ => None,
        }
    }

    pub(in crate::app) fn is_disposed(&self) -> bool {
        matches!(self.mount, Mount::Disposed)
    }

    /// Feeds the measured container size. The first nonzero measurement is
    /// only recorded; the layout starts on the next one. Returns whether the
    /// simulation was started or resized.
    pub(in crate::app) fn sync_size(&mut self, size: Vec2) -> bool {
        let measurable = size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0;

        match &mut self.mount {
            Mount::Disposed => false,
            Mount::Pending { measured } => {
                if !measurable {
                    return false;
                }
                if !*measured {
                    *measured = true;
                    return false;
                }

                let simulation = Simulation::new(&self.outline, size);
                log::debug!(
                    "starting layout for {} nodes on {:?}",
                    simulation.len(),
                    simulation.canvas()
                );
                self.scene.sync(&simulation);
                self.mount = Mount::Live(simulation);
                true
            }
            Mount::Live(simulation) => {
                if !measurable || !simulation.resize(size) {
                    return false;
                }
                log::debug!(
                    "resized layout to {:?}, alpha {:.3}",
                    simulation.canvas(),
                    simulation.alpha()
                );
                self.scene.sync(simulation);
                true
            }
        }
    }

    /// One simulation step followed by a scene sync.
    pub(in crate::app) fn advance(&mut self) -> bool {
        let Mount::Live(simulation) = &mut self.mount else {
            return false;
        };
        if !simulation.tick(&self.params) {
            return false;
        }
        self.scene.sync(simulation);
        true
    }

    pub(in crate::app) fn reheat(&mut self) {
        if let Mount::Live(simulation) = &mut self.mount {
            simulation.reheat();
        }
    }

    pub(in crate::app) fn is_animating(&self) -> bool {
        self.gesture.is_active()
            || self
                .simulation()
                .is_some_and(|simulation| simulation.is_active())
    }

    pub(in crate::app) fn request_open_view(&mut self) {
        if let Some(open_view) = self.open_view.as_mut() {
            log::debug!("opening dedicated view");
            open_view(&self.source);
        }
    }

    /// Ends any gesture without waiting for its release event; a dragged
    /// node is unpinned where it stands.
    fn cancel_gesture(&mut self) {
        if let (Gesture::DraggingNode(index), Mount::Live(simulation)) =
            (self.gesture, &mut self.mount)
        {
            simulation.release(index);
            log::debug!("released node {index} outside the view");
        }
        self.gesture = Gesture::Idle;
    }

    pub(in crate::app) fn dispose(&mut self) {
        if !self.is_disposed() {
            log::debug!("disposing graph view");
        }
        self.mount = Mount::Disposed;
        self.gesture = Gesture::Idle;
        self.open_view = None;
    }

    /// Lays out, drives and paints the view in a full-width block of
    /// `height` points.
    pub(in crate::app) fn show(&mut self, ui: &mut Ui, height: f32) {
        let size = vec2(ui.available_width(), height);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        if !ui.is_rect_visible(rect) {
            // Scrolled away mid-drag: the release would never reach us.
            self.cancel_gesture();
            return;
        }

        self.sync_size(rect.size());

        let painter = ui.painter_at(rect);
        let visuals = ui.visuals().clone();
        painter.rect_filled(rect, visuals.widgets.noninteractive.corner_radius, visuals.extreme_bg_color);
        painter.rect_stroke(
            rect,
            visuals.widgets.noninteractive.corner_radius,
            visuals.widgets.noninteractive.bg_stroke,
            egui::StrokeKind::Inside,
        );

        if self.outline.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Empty outline",
                FontId::proportional(12.0),
                visuals.weak_text_color(),
            );
        }

        if let Mount::Live(simulation) = &mut self.mount {
            handle_zoom(ui, &mut self.transform, rect, &response);
            handle_pointer(&mut self.gesture, &mut self.transform, simulation, rect, &response);

            let hovered = ui
                .input(|input| input.pointer.hover_pos())
                .filter(|_| response.hovered())
                .and_then(|pointer| hit_node(simulation, &self.transform, rect, pointer));
            match self.gesture {
                Gesture::DraggingNode(_) => ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing),
                _ if hovered.is_some() => ui.ctx().set_cursor_icon(egui::CursorIcon::Grab),
                _ => {}
            }
        }

        self.advance();
        self.paint(&painter, ui, rect);
        self.draw_overlay(ui, rect);

        if self.is_animating() || matches!(self.mount, Mount::Pending { .. }) {
            ui.ctx().request_repaint();
        }
    }

    fn paint(&self, painter: &egui::Painter, ui: &Ui, rect: egui::Rect) {
        let transform = self.transform;
        let visuals = ui.visuals();
        let edge_stroke = Stroke::new(
            1.0,
            faded(visuals.widgets.noninteractive.bg_stroke.color, EDGE_OPACITY),
        );

        for [start, end] in &self.scene.segments {
            let start = transform.world_to_screen(rect, *start);
            let end = transform.world_to_screen(rect, *end);
            if segment_visible(rect, start, end, 1.0) {
                painter.line_segment([start, end], edge_stroke);
            }
        }

        let zoom = transform.zoom;
        let radius = NODE_RADIUS * zoom;
        let font = FontId::proportional(LABEL_SIZE * zoom);
        let simulation = self.simulation();
        for (index, glyph) in self.scene.glyphs.iter().enumerate() {
            let position = transform.world_to_screen(rect, glyph.position);
            if !circle_visible(rect, position, radius + LABEL_SIZE * zoom) {
                continue;
            }

            let fill = if simulation.is_some_and(|simulation| simulation.is_pinned(index)) {
                visuals.selection.bg_fill
            } else {
                visuals.weak_text_color()
            };
            painter.circle_filled(position, radius, fill);
            painter.text(
                position + LABEL_OFFSET * zoom,
                Align2::LEFT_CENTER,
                ellipsize(&glyph.label, LABEL_MAX_CHARS),
                font.clone(),
                visuals.text_color(),
            );
        }
    }

    /// Opacity of the hover overlay; animates without touching any state.
    pub(in crate::app) fn overlay_opacity(&self, ui: &Ui, rect: egui::Rect) -> f32 {
        let hovered = ui.rect_contains_pointer(rect) || self.gesture.is_active();
        ui.ctx()
            .animate_bool_with_time(self.id.with("overlay"), hovered, OVERLAY_FADE_SECS)
    }
}

impl Drop for OutlineGraphView {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use eframe::egui::Pos2;

    use super::*;

    fn view(source: &str) -> OutlineGraphView {
        OutlineGraphView::new(Id::new("test-view"), source, &Settings::default())
    }

    #[test]
    fn layout_waits_one_measurement() {
        let mut view = view("- a\n  - b\n");
        assert!(!view.sync_size(vec2(600.0, 320.0)));
        assert!(view.simulation().is_none());
        assert!(!view.advance());

        assert!(view.sync_size(vec2(600.0, 320.0)));
        assert!(view.simulation().is_some());
        assert!(view.is_animating());
    }

    #[test]
    fn zero_size_never_starts_the_layout() {
        let mut view = view("- a\n");
        for _ in 0..3 {
            assert!(!view.sync_size(Vec2::ZERO));
        }
        assert!(view.simulation().is_none());
        assert!(!view.is_animating());
    }

    #[test]
    fn resize_updates_center_and_surface_together() {
        let mut view = view("- a\n  - b\n");
        view.sync_size(vec2(600.0, 320.0));
        view.sync_size(vec2(600.0, 320.0));
        for _ in 0..400 {
            view.advance();
        }
        assert!(!view.is_animating());

        assert!(view.sync_size(vec2(400.0, 300.0)));
        let simulation = view.simulation().unwrap();
        assert_eq!(simulation.center(), vec2(200.0, 150.0));
        assert_eq!(view.scene.size, vec2(400.0, 300.0));
        assert!(view.is_animating());
        assert!(!view.sync_size(vec2(400.0, 300.0)));
    }

    #[test]
    fn ticks_keep_the_scene_in_step() {
        let mut view = view("- a\n  - b\n    - c\n");
        view.sync_size(vec2(500.0, 300.0));
        view.sync_size(vec2(500.0, 300.0));
        assert!(view.advance());

        let simulation = view.simulation().unwrap();
        for (glyph, node) in view.scene.glyphs.iter().zip(simulation.nodes()) {
            assert_eq!(glyph.position, node.position);
        }
        assert_eq!(view.scene.segments[1][1], simulation.nodes()[2].position);
    }

    #[test]
    fn parameter_changes_apply_on_the_next_tick() {
        let mut view = view("- a\n  - b\n");
        view.sync_size(vec2(600.0, 320.0));
        view.sync_size(vec2(600.0, 320.0));
        while view.advance() {}
        let span = |view: &OutlineGraphView| {
            let nodes = view.simulation().unwrap().nodes();
            (nodes[0].position - nodes[1].position).length()
        };
        let before = span(&view);

        view.params.link_distance = 250.0;
        view.reheat();
        assert!(view.advance());
        while view.advance() {}

        let after = span(&view);
        assert!(after > before + 60.0, "link went from {before} to {after}");
    }

    #[test]
    fn disposed_view_never_ticks_again() {
        let mut view = view("- a\n  - b\n");
        view.sync_size(vec2(600.0, 320.0));
        view.sync_size(vec2(600.0, 320.0));
        view.dispose();

        assert!(view.is_disposed());
        assert!(!view.advance());
        assert!(!view.sync_size(vec2(600.0, 320.0)));
        assert!(!view.is_animating());
    }

    #[test]
    fn open_view_forwards_the_source() {
        let opened = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&opened);
        let source = "- a\n  - b\n";
        let mut view = view(source).with_open_view(Box::new(move |text: &str| {
            sink.borrow_mut().push(text.to_owned());
        }));

        view.request_open_view();
        assert_eq!(opened.borrow().as_slice(), [source.to_owned()]);

        let mut bare = self::view(source);
        bare.request_open_view();
        assert_eq!(opened.borrow().len(), 1);
    }

    #[test]
    fn empty_source_renders_an_empty_canvas() {
        let mut view = view("");
        view.sync_size(vec2(600.0, 320.0));
        assert!(view.sync_size(vec2(600.0, 320.0)));
        assert!(!view.advance());
        assert!(view.scene.glyphs.is_empty());
        assert!(view.scene.segments.is_empty());
    }

    #[test]
    fn cancelled_drag_unpins_and_lets_the_layout_settle() {
        let mut view = view("- a\n  - b\n");
        view.sync_size(vec2(600.0, 320.0));
        view.sync_size(vec2(600.0, 320.0));
        if let Mount::Live(simulation) = &mut view.mount {
            assert!(simulation.pin(0, vec2(40.0, 40.0)));
        }
        view.gesture = Gesture::DraggingNode(0);

        view.cancel_gesture();
        assert_eq!(view.gesture, Gesture::Idle);
        assert!(!view.simulation().unwrap().is_pinned(0));
        assert!(view.is_animating());

        for _ in 0..2000 {
            view.advance();
        }
        assert!(!view.is_animating());
    }

    const SCREEN: Vec2 = vec2(800.0, 600.0);

    fn interactive_view(source: &str) -> OutlineGraphView {
        let settings = Settings {
            show_force_controls: false,
            ..Settings::default()
        };
        OutlineGraphView::new(Id::new("pointer-view"), source, &settings)
    }

    /// Runs one headless frame with the view as the only widget and returns
    /// the top-left corner of its rect.
    fn frame(ctx: &egui::Context, view: &mut OutlineGraphView, events: Vec<egui::Event>) -> Pos2 {
        let mut origin = Pos2::ZERO;
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(Pos2::ZERO, SCREEN)),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                origin = ui.cursor().min;
                view.show(ui, 400.0);
            });
        });
        origin
    }

    fn button(pos: Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn settled(ctx: &egui::Context, view: &mut OutlineGraphView) -> Pos2 {
        frame(ctx, view, Vec::new());
        frame(ctx, view, Vec::new());
        assert!(view.simulation().is_some());
        while view.advance() {}
        frame(ctx, view, Vec::new())
    }

    #[test]
    fn pressing_a_node_drags_it_without_panning() {
        let ctx = egui::Context::default();
        let mut view = interactive_view("- a\n  - b\n");
        let origin = settled(&ctx, &mut view);
        let start = origin + view.simulation().unwrap().nodes()[0].position;
        let end = start + vec2(60.0, 30.0);

        frame(&ctx, &mut view, vec![egui::Event::PointerMoved(start), button(start, true)]);
        frame(&ctx, &mut view, vec![egui::Event::PointerMoved(start + vec2(30.0, 15.0))]);
        assert_eq!(view.gesture, Gesture::DraggingNode(0));
        assert!(view.simulation().unwrap().is_pinned(0));

        frame(&ctx, &mut view, vec![egui::Event::PointerMoved(end)]);
        let held = origin + view.simulation().unwrap().nodes()[0].position;
        assert!(held.distance(end) < 1e-3, "pinned node at {held:?}, pointer at {end:?}");

        frame(&ctx, &mut view, vec![button(end, false)]);
        let simulation = view.simulation().unwrap();
        assert_eq!(view.gesture, Gesture::Idle);
        assert!(!simulation.is_pinned(0));
        assert!(simulation.is_active());
        assert_eq!(view.transform.pan, Vec2::ZERO);
        let released = origin + simulation.nodes()[0].position;
        assert!(released.distance(end) < 20.0, "node drifted to {released:?}");
    }

    #[test]
    fn pressing_empty_canvas_pans() {
        let ctx = egui::Context::default();
        let mut view = interactive_view("- a\n  - b\n");
        let origin = settled(&ctx, &mut view);
        let before = view.simulation().unwrap().nodes().to_vec();
        let start = origin + vec2(740.0, 360.0);
        let rect = egui::Rect::from_min_size(origin, SCREEN);
        assert!(hit_node(view.simulation().unwrap(), &view.transform, rect, start).is_none());

        frame(&ctx, &mut view, vec![egui::Event::PointerMoved(start), button(start, true)]);
        frame(&ctx, &mut view, vec![egui::Event::PointerMoved(start - vec2(30.0, 15.0))]);
        assert_eq!(view.gesture, Gesture::Panning);
        frame(&ctx, &mut view, vec![egui::Event::PointerMoved(start - vec2(60.0, 30.0))]);
        frame(&ctx, &mut view, vec![button(start - vec2(60.0, 30.0), false)]);

        assert_eq!(view.gesture, Gesture::Idle);
        assert!(view.transform.pan.x < 0.0 && view.transform.pan.y < 0.0);
        let simulation = view.simulation().unwrap();
        assert!((0..simulation.len()).all(|index| !simulation.is_pinned(index)));
        for (node, earlier) in simulation.nodes().iter().zip(&before) {
            assert_eq!(node.position, earlier.position);
        }
    }
}
