use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use the2px_studio::{
    ColorToken, EditorSession, ExportFormat, PickerTarget, SizingPolicy, StudioConfig,
    extract_colors,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "the2px", version)]
struct Cli {
    /// Studio configuration JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the distinct colors of an SVG, one per line.
    Colors {
        /// Input SVG file.
        input: PathBuf,
    },
    /// Recolor an SVG and write it as svg, png, or jpeg.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input SVG file.
    input: PathBuf,

    /// Title used in the output name. Defaults to the input file stem.
    #[arg(long)]
    title: Option<String>,

    /// Output format.
    #[arg(long, default_value = "png")]
    format: ExportFormat,

    /// `intrinsic`, 500, 1000, or 2000.
    #[arg(long, default_value = "intrinsic")]
    size: SizingPolicy,

    /// Background fill for jpeg output.
    #[arg(long)]
    background: Option<ColorToken>,

    /// Color substitution as OLD=NEW, repeatable.
    #[arg(long = "replace", value_name = "OLD=NEW")]
    replacements: Vec<String>,

    /// Directory the file is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Colors { input } => cmd_colors(&input),
        Command::Export(args) => cmd_export(config, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StudioConfig> {
    let Some(path) = path else {
        return Ok(StudioConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    StudioConfig::from_json(&json).with_context(|| format!("parse config '{}'", path.display()))
}

fn read_svg(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read svg '{}'", path.display()))
}

fn cmd_colors(input: &Path) -> anyhow::Result<()> {
    for color in extract_colors(&read_svg(input)?) {
        println!("{color}");
    }
    Ok(())
}

fn parse_replacement(pair: &str) -> anyhow::Result<(ColorToken, ColorToken)> {
    let Some((old, new)) = pair.split_once('=') else {
        bail!("replacement '{pair}' is not OLD=NEW");
    };
    Ok((
        old.parse().with_context(|| format!("old color in '{pair}'"))?,
        new.parse().with_context(|| format!("new color in '{pair}'"))?,
    ))
}

fn cmd_export(config: StudioConfig, args: ExportArgs) -> anyhow::Result<()> {
    let markup = read_svg(&args.input)?;
    let title = args.title.unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| the2px_studio::UNTITLED.to_owned())
    });

    let mut session = EditorSession::new(config);
    session.open_document(title, markup);

    for pair in &args.replacements {
        let (old, new) = parse_replacement(pair)?;
        let Some(slot) = session.palette().slots().iter().position(|c| *c == old) else {
            bail!("color {old} does not appear in '{}'", args.input.display());
        };
        session.open_picker(PickerTarget::Slot(slot))?;
        session.pick_color(new)?;
        session.close_picker();
    }

    if let Some(background) = args.background {
        session.open_picker(PickerTarget::Background)?;
        session.pick_color(background)?;
        session.close_picker();
    }

    let today = chrono::Local::now().date_naive();
    let artifact = session.export(args.format, args.size, today)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out = args.out_dir.join(&artifact.file_name);
    std::fs::write(&out, &artifact.bytes)
        .with_context(|| format!("write '{}'", out.display()))?;

    println!("{}", out.display());
    Ok(())
}
