use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, ViewportId};

use crate::outline::{Document, load_document};
use crate::settings::Settings;

mod graph;
mod physics;
mod render_utils;
mod ui;

pub use physics::ForceParameters;

type LoadResult = Result<Document, String>;

pub struct OutlineGraphApp {
    document_path: PathBuf,
    settings: Settings,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<DocumentModel>),
    Error(String),
}

struct DocumentModel {
    document: Document,
    settings: Settings,
    /// One embedded view per outline section, in document order.
    blocks: Vec<graph::OutlineGraphView>,
    dedicated: Vec<DedicatedView>,
    next_viewport: u64,
    open_rx: Receiver<String>,
    node_total: usize,
    edge_total: usize,
}

/// A graph opened in its own native window. Dropping it drops the view.
struct DedicatedView {
    viewport_id: ViewportId,
    title: String,
    view: graph::OutlineGraphView,
}

impl OutlineGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        document_path: PathBuf,
        settings: Settings,
    ) -> Self {
        let state = Self::start_load(document_path.clone());
        Self {
            document_path,
            settings,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(document_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_document(&document_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(document_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(document_path),
        }
    }

    fn ready(&self, document: Document) -> AppState {
        AppState::Ready(Box::new(DocumentModel::new(document, self.settings.clone())))
    }
}

impl eframe::App for OutlineGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading document...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load document");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.document_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.document_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            ctx.request_repaint();
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.document_path.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(document) => self.ready(document),
                Err(error) => {
                    log::warn!("document load failed: {error}");
                    AppState::Error(error)
                }
            };
        }
    }
}
