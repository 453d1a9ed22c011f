use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use meshpulse::{
    FixedRateScheduler, Mesh, MeshSettings, MeshStats, SurfaceSize, SvgSurface, run_frames,
};

mod cli;
mod pacing;

use cli::{Cli, Commands, Format, RunArgs};
use pacing::IntervalScheduler;

/// What `meshpulse run` prints to stdout
#[derive(Debug, Serialize)]
struct RunReport {
    seed: u64,
    width: f64,
    height: f64,
    frames_drawn: u64,
    #[serde(flatten)]
    stats: MeshStats,
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => MeshSettings::from_path(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => MeshSettings::default(),
    };
    let size = SurfaceSize::new(args.width, args.height, args.pixel_ratio);
    let seed = args.seed.unwrap_or_else(time_seed);

    let mut mesh = Mesh::seeded(settings, size, seed);
    tracing::info!(
        seed,
        nodes = mesh.stats().nodes,
        links = mesh.stats().links,
        "mesh ready"
    );

    for point in &args.clicks {
        match mesh.click(point.x, point.y) {
            Some(origin) => {
                tracing::info!(x = point.x, y = point.y, origin, "click started a wave")
            }
            None => tracing::warn!(x = point.x, y = point.y, "click hit no node"),
        }
    }

    let mut svg = SvgSurface::new(size);
    if let Some(color) = args.background {
        svg = svg.with_background(color);
    }

    let mesh = RefCell::new(mesh);
    let surface = RefCell::new(svg);

    let frames_drawn = if args.realtime {
        let mut scheduler = IntervalScheduler::new(args.fps, args.frames);
        run_frames(&mesh, &surface, &mut scheduler).await
    } else {
        let mut scheduler = FixedRateScheduler::new(args.fps).with_limit(args.frames);
        run_frames(&mesh, &surface, &mut scheduler).await
    };

    if let Some(output) = &args.output {
        if frames_drawn == 0 {
            mesh.borrow().render(&mut *surface.borrow_mut());
        }
        let document = surface.borrow().finish()?;
        std::fs::write(output, document)
            .with_context(|| format!("failed to write {}", output.display()))?;
        tracing::info!(path = %output.display(), "wrote frame");
    }

    let report = RunReport {
        seed,
        width: size.width,
        height: size.height,
        frames_drawn,
        stats: mesh.borrow().stats().clone(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn print_config(format: Format) -> anyhow::Result<()> {
    let settings = MeshSettings::default();
    let text = match format {
        Format::Yaml => settings.to_yaml()?,
        Format::Json => settings.to_json()?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "meshpulse=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await?,
        Commands::Config { format } => print_config(format)?,
    }

    Ok(())
}
