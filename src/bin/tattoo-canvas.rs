use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use tattoo_canvas::{CompositorConfig, ImageFile, PlacementUpdate, RasterImage, Session};

#[derive(Parser, Debug)]
#[command(name = "tattoo-canvas", version, about = "Preview a tattoo design on a body photo")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Increase log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a design over a body photo into a PNG.
    Compose(ComposeArgs),
    /// Remove a design's near-white background and write the cropped PNG.
    Knockout(KnockoutArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Body photo.
    #[arg(long)]
    body: Option<PathBuf>,

    /// Tattoo design.
    #[arg(long)]
    design: Option<PathBuf>,

    /// Remove the design background with this threshold (0-255).
    #[arg(long)]
    threshold: Option<u8>,

    /// Horizontal offset from the stage centre, in stage pixels.
    #[arg(long, allow_hyphen_values = true)]
    x: Option<f64>,

    /// Vertical offset from the stage centre, in stage pixels.
    #[arg(long, allow_hyphen_values = true)]
    y: Option<f64>,

    /// Design scale.
    #[arg(long)]
    scale: Option<f64>,

    /// Design rotation in degrees.
    #[arg(long, allow_hyphen_values = true)]
    rotate: Option<f64>,

    /// JSON action script replayed after the command-line edits.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Export resolution relative to the body photo.
    #[arg(long)]
    output_scale: Option<f64>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path (defaults to the configured export file name).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct KnockoutArgs {
    /// Tattoo design.
    #[arg(long)]
    design: PathBuf,

    /// Keying threshold (0-255).
    #[arg(long)]
    threshold: Option<u8>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn init_tracing(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("tattoo_canvas={level}")
            .parse()
            .context("build log filter")?,
    );
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Knockout(args) => cmd_knockout(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CompositorConfig> {
    let cfg = match path {
        Some(p) => CompositorConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => CompositorConfig::default(),
    };
    cfg.validate().context("validate config")?;
    Ok(cfg)
}

fn read_image(path: &Path) -> anyhow::Result<ImageFile> {
    ImageFile::from_path(path).with_context(|| format!("open image '{}'", path.display()))
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.export_file_name));
    let output_scale = args.output_scale.unwrap_or(cfg.output_scale);
    let mut session = Session::new(cfg)?;

    if let Some(path) = &args.body {
        session
            .load_body(&read_image(path)?)
            .with_context(|| format!("load body '{}'", path.display()))?;
    }
    if let Some(path) = &args.design {
        session
            .load_design(&read_image(path)?)
            .with_context(|| format!("load design '{}'", path.display()))?;
    }
    if let Some(t) = args.threshold {
        session
            .remove_background(t, true)
            .context("remove background")?;
    }

    let update = PlacementUpdate {
        x: args.x,
        y: args.y,
        scale: args.scale,
        rotate_deg: args.rotate,
        ..PlacementUpdate::default()
    };
    if update != PlacementUpdate::default() {
        session.set_placement(update, true);
    }

    if let Some(path) = &args.script {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        let actions = tattoo_canvas::parse_script(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        session
            .replay(&actions, base)
            .with_context(|| format!("replay script '{}'", path.display()))?;
    }

    let flat = session
        .export_composite(output_scale)
        .context("export composite")?;
    write_png(&out, &flat)
}

fn cmd_knockout(args: KnockoutArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let threshold = args.threshold.unwrap_or(cfg.default_threshold);

    let file = read_image(&args.design)?;
    let prepared = tattoo_canvas::prepare_design(&file, &cfg)
        .with_context(|| format!("load design '{}'", args.design.display()))?;
    let keyed = tattoo_canvas::remove_background(&prepared.original, threshold)?;
    if keyed.bounds.is_none() {
        tracing::warn!(threshold, "nothing left visible after keying");
    }
    write_png(&args.out, &keyed.image)
}

fn write_png(path: &Path, img: &RasterImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        path,
        img.as_rgba8(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;

    eprintln!("wrote {}", path.display());
    Ok(())
}
