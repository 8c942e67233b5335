use std::path::Path;
use std::sync::mpsc;

use eframe::egui::{self, Align, Context, Id, Layout, ViewportBuilder, ViewportClass, ViewportId};

use crate::outline::{Document, Section};
use crate::settings::Settings;

use super::super::graph::{OpenViewFn, OutlineGraphView};
use super::super::{DedicatedView, DocumentModel};

const DEDICATED_TITLE: &str = "Outline Graph";
const DEDICATED_SIZE: [f32; 2] = [960.0, 720.0];

fn open_view_bridge(tx: mpsc::Sender<String>) -> OpenViewFn {
    Box::new(move |source: &str| {
        if tx.send(source.to_owned()).is_err() {
            log::warn!("open-view request dropped: document closed");
        }
    })
}

impl DocumentModel {
    pub(in crate::app) fn new(document: Document, settings: Settings) -> Self {
        let (open_tx, open_rx) = mpsc::channel();
        let blocks = document
            .outline_sources()
            .enumerate()
            .map(|(index, source)| {
                OutlineGraphView::new(Id::new(("outline-block", index)), source, &settings)
                    .with_open_view(open_view_bridge(open_tx.clone()))
            })
            .collect::<Vec<_>>();
        let node_total = blocks.iter().map(|view| view.outline().node_count()).sum();
        let edge_total = blocks.iter().map(|view| view.outline().edge_count()).sum();

        Self {
            document,
            settings,
            blocks,
            dedicated: Vec::new(),
            next_viewport: 0,
            open_rx,
            node_total,
            edge_total,
        }
    }

    pub(in crate::app) fn status_text(&self) -> String {
        format!(
            "blocks: {}  |  nodes: {}  |  edges: {}",
            self.blocks.len(),
            self.node_total,
            self.edge_total
        )
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        document_path: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(DEDICATED_TITLE);
                    ui.separator();
                    ui.label(document_path.display().to_string());
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_reloading {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(self.status_text());
            });

        let block_height = self.settings.block_height;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let mut blocks = self.blocks.iter_mut();
                    for section in &self.document.sections {
                        match section {
                            Section::Text(text) => {
                                ui.label(text.as_str());
                            }
                            Section::Outline(_) => {
                                if let Some(view) = blocks.next() {
                                    view.show(ui, block_height);
                                }
                            }
                        }
                        ui.add_space(8.0);
                    }
                });
        });

        self.open_requested_views();
        self.show_dedicated_views(ctx);
    }

    fn open_requested_views(&mut self) {
        while let Ok(source) = self.open_rx.try_recv() {
            let index = self.next_viewport;
            self.next_viewport += 1;
            log::info!("opening dedicated view #{index}");

            self.dedicated.push(DedicatedView {
                viewport_id: ViewportId::from_hash_of(("dedicated-outline", index)),
                title: format!("{DEDICATED_TITLE} #{}", index + 1),
                view: OutlineGraphView::new(
                    Id::new(("dedicated-view", index)),
                    source,
                    &self.settings,
                ),
            });
        }
    }

    fn show_dedicated_views(&mut self, ctx: &Context) {
        self.dedicated.retain_mut(|dedicated| {
            let mut open = true;
            let builder = ViewportBuilder::default()
                .with_title(dedicated.title.as_str())
                .with_inner_size(DEDICATED_SIZE);

            ctx.show_viewport_immediate(dedicated.viewport_id, builder, |ctx, class| {
                if class == ViewportClass::Embedded {
                    // Backends without multiple native windows.
                    egui::Window::new(dedicated.title.as_str())
                        .open(&mut open)
                        .default_size(DEDICATED_SIZE)
                        .show(ctx, |ui| {
                            let height = ui.available_height();
                            dedicated.view.show(ui, height);
                        });
                    return;
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    let height = ui.available_height();
                    dedicated.view.show(ui, height);
                });
                if ctx.input(|input| input.viewport().close_requested()) {
                    open = false;
                }
            });

            if !open {
                log::info!("closed {}", dedicated.title);
            }
            open
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(markdown: &str) -> DocumentModel {
        DocumentModel::new(Document::from_markdown(markdown), Settings::default())
    }

    #[test]
    fn one_view_per_outline_block() {
        let model = model("Intro\n\n```outline\n- a\n  - b\n```\n\n```outline\n- c\n```\n");
        assert_eq!(model.blocks.len(), 2);
        assert_eq!(model.node_total, 3);
        assert_eq!(model.edge_total, 1);
        assert_eq!(model.status_text(), "blocks: 2  |  nodes: 3  |  edges: 1");
        assert!(model.blocks.iter().all(|view| view.open_view.is_some()));
    }

    #[test]
    fn open_requests_become_dedicated_views() {
        let mut model = model("```outline\n- a\n  - b\n```\n```outline\n- x\n```\n");
        model.blocks[0].request_open_view();
        model.blocks[1].request_open_view();
        model.open_requested_views();

        assert_eq!(model.dedicated.len(), 2);
        assert_eq!(model.dedicated[0].view.source, "- a\n  - b\n");
        assert_eq!(model.dedicated[1].view.outline().node_count(), 1);
        assert!(model.dedicated[0].view.open_view.is_none());
        assert_ne!(model.dedicated[0].viewport_id, model.dedicated[1].viewport_id);
        assert_eq!(model.dedicated[0].title, "Outline Graph #1");
        assert_eq!(model.dedicated[1].title, "Outline Graph #2");
    }
}
