//! Meshboard - Multi-file STL scene viewer, headless driver
//!
//! Assembles a scene from bootstrap models, local files, and saved sessions,
//! applies visibility changes, reports what would be rendered, and exports
//! the session as a portable JSON document.

mod settings;
mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use meshboard_assets::IngestOutcome;
use meshboard_integration::BootstrapClient;
use meshboard_session::{load_from_path, save_to_dir, RenderOutcome, SceneSession, SessionEvent};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::AppSettings;
use summary::SummaryRenderer;

#[derive(Debug, Parser)]
#[command(name = "meshboard", about = "Assemble, inspect, and export STL scenes")]
struct Args {
    /// STL files to add to the scene
    files: Vec<PathBuf>,

    /// Session document to restore before adding files
    #[arg(long)]
    load: Option<PathBuf>,

    /// Skip fetching the default models
    #[arg(long)]
    no_bootstrap: bool,

    /// Hide every asset with this name (repeatable)
    #[arg(long = "hide", value_name = "NAME")]
    hide: Vec<String>,

    /// Hide all assets before applying `--show`
    #[arg(long)]
    hide_all: bool,

    /// Show every asset with this name (repeatable)
    #[arg(long = "show", value_name = "NAME")]
    show: Vec<String>,

    /// Frame the visible assets and pin the camera
    #[arg(long)]
    fit: bool,

    /// Export the session when done
    #[arg(long)]
    save: bool,

    /// Directory for exported sessions (overrides settings)
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    write_settings: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let args = Args::parse();
    let settings = AppSettings::load(args.settings.as_deref());

    if args.write_settings {
        let path = args
            .settings
            .clone()
            .or_else(AppSettings::default_path)
            .context("Could not determine settings path")?;
        settings.save(&path)?;
    }

    let mut session = settings.build_session()?;

    if let Some(path) = &args.load {
        // A bad document leaves the session as it was; keep going.
        match load_from_path(path).and_then(|doc| session.load(&doc)) {
            Ok(()) => info!("Restored session from {:?}", path),
            Err(e) => warn!("Could not restore {:?}: {}", path, e),
        }
    }

    if settings.bootstrap.enabled && !args.no_bootstrap && session.store().is_empty() {
        bootstrap(&mut session, &settings);
    }

    for path in &args.files {
        ingest_file(&mut session, path);
    }

    apply_visibility(&mut session, &args)?;

    if args.fit {
        session.apply(SessionEvent::FitToView)?;
    }

    report(&mut session);

    if args.save {
        let dir = args
            .export_dir
            .clone()
            .unwrap_or_else(|| settings.storage.export_dir());
        let path = save_to_dir(&dir, &settings.storage.export_prefix, &session.save())?;
        println!("{}", path.display());
    }

    Ok(())
}

fn bootstrap(session: &mut SceneSession, settings: &AppSettings) {
    let client = match BootstrapClient::new(settings.bootstrap.timeout()) {
        Ok(client) => client,
        Err(e) => {
            warn!("Bootstrap unavailable: {}", e);
            return;
        }
    };

    let report = client.fetch_blocking(settings.bootstrap.models.clone());
    for asset in report.assets {
        session.ingest(asset.name, asset.payload);
    }
    if !report.failures.is_empty() {
        warn!("{} bootstrap model(s) could not be loaded", report.failures.len());
    }
}

fn ingest_file(session: &mut SceneSession, path: &Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match fs::read(path) {
        Ok(payload) => {
            if let IngestOutcome::AlreadyExists(_) = session.ingest(name.as_str(), payload) {
                info!("'{}' is already loaded", name);
            }
        }
        Err(e) => warn!("Skipping {:?}: {}", path, e),
    }
}

fn apply_visibility(session: &mut SceneSession, args: &Args) -> Result<()> {
    if args.hide_all {
        session.apply(SessionEvent::HideAll)?;
    }

    let targets = args
        .hide
        .iter()
        .map(|name| (name, false))
        .chain(args.show.iter().map(|name| (name, true)));

    for (name, visible) in targets {
        let ids: Vec<_> = session
            .assets()
            .iter()
            .filter(|a| a.name() == name.as_str())
            .map(|a| a.id())
            .collect();
        if ids.is_empty() {
            warn!("No asset named '{}'", name);
        }
        for id in ids {
            session.apply(SessionEvent::SetVisible { id, visible })?;
        }
    }
    Ok(())
}

fn report(session: &mut SceneSession) {
    for row in session.listing() {
        let mark = if row.visible { "x" } else { " " };
        info!("[{}] {} ({} bytes)", mark, row.label, row.size);
    }

    let mut renderer = SummaryRenderer::default();
    match session.render(&mut renderer) {
        RenderOutcome::Empty { diagnostics } => {
            for d in &diagnostics {
                warn!("{}", d);
            }
            if session.store().is_empty() {
                info!("No assets loaded");
            } else {
                info!("No visible assets to render");
            }
            return;
        }
        RenderOutcome::Rendered {
            items, diagnostics, ..
        } => {
            for d in &diagnostics {
                warn!("{}", d);
            }
            info!("Rendered {} item(s)", items);
        }
    }

    let stats = session.stats();
    info!(
        "Visible files: {}, total points: {}, total faces: {}",
        stats.count, stats.total_points, stats.total_faces
    );
}
