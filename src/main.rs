#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
use anyhow::{Context, Result};
use bin_console::api::ApiClient;
use bin_console::app::BinConsoleApp;
use bin_console::config::Config;
use clap::Parser;
use eframe::egui;
use egui::IconData;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ICON_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAACAAAAAgCAYAAABzenr0AAAAeElEQVR42u3XwRHAIAgEQFpKTSneMsw3eQRBcuF0YMaf460fBZHVqp1H11ZKKBQzGx5GRINDkK/DXQhUuBmRCkCHq4i/wl8R1IB7jQ627nXdHgF4IApQgAKkAzwPkacgL+G+gPTvuDoimqaUoi2nGExoRjOK4RRZFxaUfmJQiAsBAAAAAElFTkSuQmCC";

fn main() -> Result<()> {
    let config = Config::parse();

    let default_filter = if config.verbose {
        "warn,bin_console=debug"
    } else {
        "warn,bin_console=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let api = ApiClient::new(config.base_url(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    info!(base_url = %config.base_url(), "Starting bin console");

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size((1200.0, 800.0))
        .with_min_inner_size((420.0, 320.0));
    if let Some(icon) = load_icon_from_base64() {
        viewport = viewport.with_icon(icon);
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..eframe::NativeOptions::default()
    };

    eframe::run_native(
        BinConsoleApp::name(),
        native_options,
        Box::new(move |cc| Ok(Box::new(BinConsoleApp::new(cc, &config, api, runtime)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run window: {e}"))
}

fn load_icon_from_base64() -> Option<IconData> {
    let Some(icon_bytes) = base64_decode(ICON_BASE64) else {
        warn!("Window icon is not valid base64");
        return None;
    };

    match egui_extras::image::load_image_bytes(&icon_bytes) {
        Ok(image) => Some(IconData {
            rgba: image.as_raw().to_vec(),
            width: image.width() as u32,
            height: image.height() as u32,
        }),
        Err(e) => {
            warn!("Failed to decode window icon: {}", e);
            None
        }
    }
}

fn base64_decode(input: &str) -> Option<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(input).ok()
}
