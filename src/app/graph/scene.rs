use eframe::egui::Vec2;

use crate::outline::Outline;

use super::super::physics::Simulation;

/// Circle plus label for one node, in simulation space.
pub(in crate::app) struct NodeGlyph {
    pub(in crate::app) position: Vec2,
    pub(in crate::app) label: String,
}

/// Drawable primitives kept in step with the simulation. Painting projects
/// them through the view transform; nothing here knows about the screen.
pub(in crate::app) struct Scene {
    pub(in crate::app) size: Vec2,
    pub(in crate::app) segments: Vec<[Vec2; 2]>,
    pub(in crate::app) glyphs: Vec<NodeGlyph>,
}

impl Scene {
    pub(in crate::app) fn new(outline: &Outline) -> Self {
        Self {
            size: Vec2::ZERO,
            segments: Vec::with_capacity(outline.edge_count()),
            glyphs: outline
                .nodes
                .iter()
                .map(|node| NodeGlyph {
                    position: Vec2::ZERO,
                    label: node.label.clone(),
                })
                .collect(),
        }
    }

    pub(in crate::app) fn sync(&mut self, simulation: &Simulation) {
        self.size = simulation.canvas();

        for (glyph, node) in self.glyphs.iter_mut().zip(simulation.nodes()) {
            glyph.position = node.position;
        }

        self.segments.clear();
        self.segments.extend(
            simulation
                .links()
                .iter()
                .map(|&(source, target)| {
                    [
                        simulation.nodes()[source].position,
                        simulation.nodes()[target].position,
                    ]
                }),
        );
    }
}
