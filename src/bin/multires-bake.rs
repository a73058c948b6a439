use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "multires-bake", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake a job file and write every target image as a PNG.
    Bake(BakeArgs),
    /// Write a sample job file: a tiled plane baked against a smooth bump.
    Demo(DemoArgs),
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// Input job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving one PNG per image, named after the image.
    #[arg(long)]
    out_dir: PathBuf,

    /// Override the job's bake mode.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Override the number of margin filter passes.
    #[arg(long)]
    margin: Option<u32>,

    /// Override the multires level of the low-res mesh.
    #[arg(long)]
    level: Option<u32>,

    /// Also write the bake report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Output job JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Quads per side of the low-res plane.
    #[arg(long, default_value_t = 2)]
    tiles: u32,

    /// Elements per side of each high-res grid.
    #[arg(long, default_value_t = 9)]
    grid_size: u32,

    /// Width and height of the target image.
    #[arg(long, default_value_t = 64)]
    image_size: u32,

    /// Peak height of the bump.
    #[arg(long, default_value_t = 0.2)]
    amplitude: f32,

    #[arg(long, value_enum, default_value_t = ModeChoice::Normals)]
    mode: ModeChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Normals,
    Displacement,
}

impl From<ModeChoice> for multires_bake::BakeMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Normals => Self::Normals,
            ModeChoice::Displacement => Self::Displacement,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Bake(args) => cmd_bake(args),
        Command::Demo(args) => cmd_demo(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MULTIRES_BAKE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let mut file = multires_bake::JobFile::load(&args.in_path)
        .with_context(|| format!("load job '{}'", args.in_path.display()))?;

    if let Some(mode) = args.mode {
        file.settings.mode = mode.into();
    }
    if let Some(margin) = args.margin {
        file.settings.margin = margin;
    }
    if let Some(level) = args.level {
        file.settings.level = level;
    }

    let job = file.job().context("prepare bake job")?;
    let mut images = file.build_images();

    let cancel = multires_bake::CancelToken::new();
    let mut last_tenth = 0;
    let mut progress = |fraction: f32| {
        let tenth = (fraction * 10.0) as u32;
        if tenth > last_tenth {
            last_tenth = tenth;
            tracing::info!(percent = tenth * 10, "baking");
        }
    };
    let report = multires_bake::bake_images(&job, &mut images, &cancel, &mut progress)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let file_names = file.output_file_names();
    for entry in &report.images {
        let image = &images[entry.image];
        let out = args.out_dir.join(&file_names[entry.image]);
        write_png(image, &out)?;
        eprintln!(
            "wrote {} ({} texels, {} margin)",
            out.display(),
            entry.texels_written,
            entry.margin_texels
        );
    }

    if let Some(path) = &args.report {
        let text = serde_json::to_string_pretty(&report).context("serialize bake report")?;
        std::fs::write(path, text)
            .with_context(|| format!("write report '{}'", path.display()))?;
    }

    Ok(())
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let params = multires_bake::DemoParams {
        tiles: args.tiles,
        grid_size: args.grid_size,
        image_size: args.image_size,
        amplitude: args.amplitude,
    };
    let settings = multires_bake::BakeSettings {
        mode: args.mode.into(),
        ..multires_bake::BakeSettings::default()
    };
    let file = multires_bake::demo_job(params, settings);

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    file.save(&args.out)
        .with_context(|| format!("write job '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_png(image: &multires_bake::ImageBuffer, out: &Path) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        out,
        &image.to_rgba8(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))
}
