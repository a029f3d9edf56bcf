//! Headless front end: load a dataset, export views, convert annotations.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueHint};

use fattrace::config::AppConfig;
use fattrace::data::NiftiSource;
use fattrace::export::save_png;
use fattrace::session::Session;
use fattrace::view::{LocationUpdate, ViewKind};
use fattrace_gpu::{GpuContext, WgpuTextureStore};

/// One view export request, given as `VIEW:SLICE:PNG`.
#[derive(Debug, Clone, PartialEq)]
struct ViewExport {
    view: ViewKind,
    slice: usize,
    path: PathBuf,
}

fn parse_export(value: &str) -> Result<ViewExport, String> {
    let mut parts = value.splitn(3, ':');
    let (Some(view), Some(slice), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected VIEW:SLICE:PNG, got '{}'", value));
    };
    let view = ViewKind::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(view))
        .ok_or_else(|| format!("unknown view '{}', expected axial or coronal", view))?;
    let slice = slice
        .parse()
        .map_err(|_| format!("invalid slice index '{}'", slice))?;
    if path.is_empty() {
        return Err("missing PNG path".to_string());
    }
    Ok(ViewExport {
        view,
        slice,
        path: path.into(),
    })
}

/// Load a fat/water dataset, export views and convert annotations.
#[derive(Debug, Parser)]
#[command(name = "fattrace-native", version)]
struct Args {
    /// Directory holding the four scans and config.xml
    #[arg(value_hint = ValueHint::DirPath)]
    dataset: PathBuf,

    /// Config file (defaults to the platform config directory)
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Load annotations from this directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    annotations: Option<PathBuf>,

    /// Save annotations into this directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    save: Option<PathBuf>,

    /// Render a view slice to PNG, e.g. `axial:40:out.png` (repeatable)
    #[arg(long = "export", value_name = "VIEW:SLICE:PNG", value_parser = parse_export, action = ArgAction::Append)]
    exports: Vec<ViewExport>,

    /// Paint both views through a headless GPU context
    #[arg(long)]
    gpu: bool,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default(args.config.as_deref());
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.into())
        .parse_default_env()
        .init();

    let mut session = Session::new(config);
    session.load_dataset(&args.dataset, &NiftiSource)?;

    if let Some(dir) = &args.annotations {
        let report = session.load_annotations(dir)?;
        log::info!(
            "Annotations: {} layers, {} points, {} warnings",
            report.layers_loaded.len(),
            report.points_loaded,
            report.warnings.len()
        );
    }

    for export in &args.exports {
        let axis = session.view(export.view).binding().slicing;
        session.move_cursor(LocationUpdate::axis(axis, export.slice), None);
        let image = session
            .render_view(export.view)
            .ok_or_else(|| format!("cannot render {} slice {}", export.view.name(), export.slice))?;
        save_png(&image, &export.path)?;
    }

    if args.gpu {
        let mut store = WgpuTextureStore::new(GpuContext::new_blocking()?);
        for view in ViewKind::ALL {
            session.resize_view(view, 512, 512);
            if let Some(frame) = session.paint(view, &mut store) {
                log::info!(
                    "{} view: {} slice textures, {} overlays",
                    view.name(),
                    frame.slices.len(),
                    frame.overlays.len()
                );
            }
        }
        log::info!(
            "GPU: {} textures, {} allocations",
            store.len(),
            store.allocation_count()
        );
        session.release_textures(&mut store);
    }

    if let Some(dir) = &args.save {
        let report = session.save_annotations(dir)?;
        for warning in &report.warnings {
            eprintln!("{}: {}", warning.layer, warning.message);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
