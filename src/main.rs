mod app;
mod layout;
mod outline;
mod settings;
mod util;

use std::path::PathBuf;

use clap::Parser;

use settings::Settings;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Markdown document with ```outline blocks, or a bare outline file.
    document: PathBuf,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not create the force panel on graph views.
    #[arg(long)]
    hide_force_controls: bool,

    /// Height of each embedded graph, in points.
    #[arg(long)]
    block_height: Option<f32>,
}

impl Args {
    fn settings(&self) -> Settings {
        let mut settings = Settings::load_or_default(self.config.as_deref());
        if self.hide_force_controls {
            settings.show_force_controls = false;
        }
        if let Some(block_height) = self.block_height {
            settings = settings.with_block_height(block_height);
        }
        settings
    }
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("outline_graph=info"))
        .init();

    let args = Args::parse();
    let settings = args.settings();
    log::debug!("starting with {settings:?}");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1100.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Outline Graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::OutlineGraphApp::new(
                cc,
                args.document.clone(),
                settings.clone(),
            )))
        }),
    )
}
