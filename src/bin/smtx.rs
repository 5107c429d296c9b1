use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use smtx::{
    DirectorySink, ExportFormat, ExportOptions, ExportOutcome, Exporter, SpriteRegistry,
    SpritesheetDescriptor, SpritesheetSource, WordLayout, cut_spritesheet, decode_surface,
};

#[derive(Parser, Debug)]
#[command(name = "smtx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a descriptor against its spritesheet and list the sprite keys.
    Inspect(InspectArgs),
    /// Export a word layout as an animated GIF or WebP.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Spritesheet image (PNG, GIF, WebP).
    #[arg(long)]
    sheet: PathBuf,

    /// Descriptor JSON for the spritesheet.
    #[arg(long)]
    descriptor: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Main spritesheet image.
    #[arg(long)]
    main_sheet: PathBuf,
    /// Main spritesheet descriptor.
    #[arg(long)]
    main_descriptor: PathBuf,

    /// Bundled object spritesheet image.
    #[arg(long)]
    object_sheet: PathBuf,
    /// Bundled object spritesheet descriptor.
    #[arg(long)]
    object_descriptor: PathBuf,

    /// Optional user-made object spritesheet image.
    #[arg(long, requires = "usermade_descriptor")]
    usermade_sheet: Option<PathBuf>,
    /// Descriptor for the user-made object spritesheet.
    #[arg(long, requires = "usermade_sheet")]
    usermade_descriptor: Option<PathBuf>,
    /// Let user-made sprites override bundled ones.
    #[arg(long, default_value_t = false)]
    enable_usermade: bool,

    /// Word layout JSON.
    #[arg(long)]
    layout: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Output scale (clamped to 1..=5).
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Gif)]
    format: FormatChoice,

    /// One animation per word instead of one for the whole grid.
    #[arg(long, default_value_t = false)]
    separate: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Gif,
    Webp,
}

impl From<FormatChoice> for ExportFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Gif => ExportFormat::Gif,
            FormatChoice::Webp => ExportFormat::Webp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => pollster::block_on(cmd_inspect(args)),
        Command::Export(args) => pollster::block_on(cmd_export(args)),
    }
}

async fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let descriptor = SpritesheetDescriptor::from_path(&args.descriptor)?;
    let bytes = read_bytes(&args.sheet)?;
    let surface = decode_surface(&bytes).await?;
    let sprites = cut_spritesheet(SpritesheetSource::Main, &surface, &descriptor)?;

    println!(
        "{}x{} sheet, {} sprites, {} wordmap entries",
        surface.width(),
        surface.height(),
        sprites.len(),
        descriptor.wordmap.len()
    );
    for sprite in &sprites {
        println!("{}", sprite.key());
    }
    Ok(())
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let layout = WordLayout::from_path(&args.layout)?;

    let mut registry = SpriteRegistry::new();
    registry
        .load_main(
            &read_bytes(&args.main_sheet)?,
            SpritesheetDescriptor::from_path(&args.main_descriptor)?,
        )
        .await
        .context("failed to load main spritesheet")?;
    registry
        .load_object_default(
            &read_bytes(&args.object_sheet)?,
            SpritesheetDescriptor::from_path(&args.object_descriptor)?,
        )
        .await
        .context("failed to load object spritesheet")?;
    if let (Some(sheet), Some(descriptor)) = (&args.usermade_sheet, &args.usermade_descriptor) {
        registry
            .load_usermade(
                &read_bytes(sheet)?,
                SpritesheetDescriptor::from_path(descriptor)?,
            )
            .await
            .context("failed to load user-made spritesheet")?;
    }
    registry.set_enable_usermade(args.enable_usermade);

    let options = ExportOptions {
        scale: args.scale,
        format: args.format.into(),
        combined_only: !args.separate,
    };
    let items = layout.grid_items(&registry, options.scale)?;
    let exporter = Exporter::new(options)?;
    let mut sink = DirectorySink::new(&args.out);
    let outcome = exporter.export(layout.grid(), &items, &mut sink).await?;

    match outcome {
        ExportOutcome::Single { filename } => {
            println!("{}", args.out.join(filename).display());
        }
        ExportOutcome::Archive { filename, entries } => {
            println!(
                "{} ({} entries)",
                args.out.join(filename).display(),
                entries.len()
            );
        }
    }
    Ok(())
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
}
