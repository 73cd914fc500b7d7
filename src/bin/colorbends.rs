use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use colorbends::{Backdrop, Palette, Rgba8, Viewport};

#[derive(Parser, Debug)]
#[command(name = "colorbends", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single backdrop frame as a PNG.
    Frame(FrameArgs),
    /// Render a frame sequence as numbered PNGs.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Surface width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Animation time to sample, in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Palette JSON; defaults to the built-in three-spot palette.
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Opaque page color the frame is screen-blended over (RRGGBB).
    #[arg(long, default_value = "12141c")]
    page: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Surface width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Clip length in seconds.
    #[arg(long, default_value_t = 4.0)]
    secs: f64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Palette JSON; defaults to the built-in three-spot palette.
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Opaque page color frames are screen-blended over (RRGGBB).
    #[arg(long, default_value = "12141c")]
    page: String,

    /// Output directory for frame_NNNNN.png files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_palette(path: Option<&Path>) -> anyhow::Result<Palette> {
    let Some(path) = path else {
        return Ok(Palette::default());
    };
    let f = File::open(path).with_context(|| format!("open palette '{}'", path.display()))?;
    let palette: Palette =
        serde_json::from_reader(BufReader::new(f)).context("parse palette JSON")?;
    palette.validate()?;
    Ok(palette)
}

fn mount(args_width: u32, args_height: u32, palette: Palette) -> anyhow::Result<Backdrop> {
    let viewport = Viewport::new(args_width, args_height);
    if viewport.is_empty() {
        anyhow::bail!("surface must be non-empty, got {args_width}x{args_height}");
    }
    Ok(Backdrop::mount_with(viewport, palette)?)
}

fn flatten_frame(backdrop: &Backdrop, page: Rgba8) -> anyhow::Result<Vec<u8>> {
    let viewport = backdrop
        .viewport()
        .context("backdrop has no surface to present")?;
    let len = (viewport.width as usize) * (viewport.height as usize) * 4;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len / 4 {
        out.extend_from_slice(&[page.r, page.g, page.b, 255]);
    }
    backdrop.present_over(&mut out)?;
    Ok(out)
}

fn write_png(path: &Path, width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<()> {
    let img = image::RgbaImage::from_raw(width, height, data)
        .context("frame buffer does not match surface dimensions")?;
    img.save(path)
        .with_context(|| format!("write PNG '{}'", path.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let palette = read_palette(args.palette.as_deref())?;
    let page = Rgba8::from_hex(&args.page)?;

    let mut backdrop = mount(args.width, args.height, palette)?;
    backdrop
        .tick(args.at.max(0.0))
        .context("backdrop surface unavailable")?;

    let data = flatten_frame(&backdrop, page)?;
    write_png(&args.out, args.width, args.height, data)?;
    backdrop.unmount();
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if args.fps == 0 {
        anyhow::bail!("fps must be >= 1");
    }
    if !args.secs.is_finite() || args.secs <= 0.0 {
        anyhow::bail!("secs must be > 0");
    }
    let palette = read_palette(args.palette.as_deref())?;
    let page = Rgba8::from_hex(&args.page)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut backdrop = mount(args.width, args.height, palette)?;
    let frame_count = (args.secs * f64::from(args.fps)).ceil() as u64;
    for frame in 0..frame_count {
        let at = frame as f64 / f64::from(args.fps);
        backdrop
            .tick(at)
            .context("backdrop surface unavailable")?;
        let data = flatten_frame(&backdrop, page)?;
        let path = args.out_dir.join(format!("frame_{frame:05}.png"));
        write_png(&path, args.width, args.height, data)?;
    }
    backdrop.unmount();
    tracing::info!(frames = frame_count, dir = %args.out_dir.display(), "sequence rendered");
    Ok(())
}
