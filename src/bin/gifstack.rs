use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gifstack", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene to an animated GIF.
    Render(RenderArgs),
    /// Render a single output frame as a PNG.
    Frame(FrameArgs),
    /// Print the operation queue, resolved sources and timeline length.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_builder(path: &Path) -> anyhow::Result<gifstack::GifBuilder> {
    let scene = gifstack::Scene::from_path(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    scene
        .into_builder(root)
        .with_context(|| format!("build scene '{}'", path.display()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let builder = load_builder(&args.in_path)?;
    let bytes = builder.to_buffer()?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write gif '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} bytes)", args.out.display(), bytes.len());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let builder = load_builder(&args.in_path)?;

    let mut decoder = gifstack::GifFileDecoder::new();
    let mut backend = gifstack::CpuCanvas::new();
    let mut progress = gifstack::SilentProgress;
    let mut dispatcher = gifstack::FrameDispatcher::new(builder.operations(), builder.canvas());
    let timeline = dispatcher.resolve(&mut decoder)?;
    if args.frame >= timeline.length() {
        anyhow::bail!(
            "frame {} is out of range (timeline has {} frames)",
            args.frame,
            timeline.length()
        );
    }

    let mut captured = None;
    while let Some((idx, frame)) = dispatcher.next_frame(&mut backend, &mut progress)? {
        if idx.0 == args.frame {
            captured = Some(frame);
            break;
        }
    }
    let frame = captured.context("dispatcher ended before the requested frame")?;
    let rgba = frame.to_straight_rgba8();

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let builder = load_builder(&args.in_path)?;
    let canvas = builder.canvas();
    println!("canvas: {}x{}", canvas.width, canvas.height);
    println!("encoder: {}", serde_json::to_string(builder.encoder_config())?);

    let mut decoder = gifstack::GifFileDecoder::new();
    let resolved = gifstack::resolve_queue(builder.operations(), &mut decoder)?;
    println!("operations:");
    for (i, op) in builder.operations().iter().enumerate() {
        let shape = match resolved.get(i) {
            None => "-".to_owned(),
            Some(gifstack::ResolvedSource::Static(gifstack::Paint::Color(c))) => {
                format!("static color {c}")
            }
            Some(gifstack::ResolvedSource::Static(gifstack::Paint::Image(d))) => {
                format!("static image {}x{}", d.width(), d.height())
            }
            Some(gifstack::ResolvedSource::Sequence(frames)) => {
                format!("sequence of {} frames", frames.len())
            }
        };
        println!("  #{i:<3} {:<14} {shape}", op.name());
    }
    let timeline = gifstack::Timeline::from_resolved(&resolved);
    println!("timeline: {} frame(s)", timeline.length());
    Ok(())
}
