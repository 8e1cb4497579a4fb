use std::path::PathBuf;

use anyhow::Context;
use artgrid::{GalleryApp, GalleryConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => GalleryConfig::load(&path)
            .with_context(|| format!("loading gallery config from {}", path.display()))?,
        None => {
            log::info!("No config given; using the built-in gallery");
            GalleryConfig::default()
        }
    };

    GalleryApp::new(config)
        .context("preparing gallery")?
        .run()
        .context("running gallery")
}
