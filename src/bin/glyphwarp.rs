use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "glyphwarp", version)]
struct Cli {
    /// Log debug output (per-stage tracing) to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one captcha image and print its answer.
    Generate(GenerateArgs),
    /// Print every difficulty recipe as JSON.
    Presets,
    /// List loaded fonts with the SHA-256 of their bytes.
    Fonts(FontsArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Answer length in characters.
    #[arg(long)]
    length: Option<usize>,

    /// Difficulty preset.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyChoice>,

    /// Output format. Defaults to the `--out` extension, then the config.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Fixed seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Output image path. Defaults to `captcha.<ext>`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print a JSON summary instead of the bare answer.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyChoice {
    VeryEasy,
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyChoice> for glyphwarp::Difficulty {
    fn from(c: DifficultyChoice) -> Self {
        match c {
            DifficultyChoice::VeryEasy => Self::VeryEasy,
            DifficultyChoice::Easy => Self::Easy,
            DifficultyChoice::Medium => Self::Medium,
            DifficultyChoice::Hard => Self::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
    Gif,
}

impl From<FormatChoice> for glyphwarp::ImageFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Png => Self::Png,
            FormatChoice::Jpeg => Self::Jpeg,
            FormatChoice::Gif => Self::Gif,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Presets => cmd_presets(),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn resolve_config(args: &GenerateArgs) -> anyhow::Result<glyphwarp::GeneratorConfig> {
    let mut cfg = match &args.config {
        Some(path) => glyphwarp::GeneratorConfig::from_json_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => glyphwarp::GeneratorConfig::default(),
    };
    if let Some(v) = args.width {
        cfg.width = v;
    }
    if let Some(v) = args.height {
        cfg.height = v;
    }
    if let Some(v) = args.length {
        cfg.length = v;
    }
    if let Some(v) = args.difficulty {
        cfg.difficulty = v.into();
    }
    if let Some(v) = args.seed {
        cfg.seed = Some(v);
    }
    cfg.font_dirs.extend(args.font_dirs.iter().cloned());

    let from_out = args
        .out
        .as_deref()
        .and_then(Path::extension)
        .and_then(|e| e.to_str())
        .and_then(|e| glyphwarp::ImageFormat::from_extension(e).ok());
    if let Some(f) = args.format.map(glyphwarp::ImageFormat::from).or(from_out) {
        cfg.format = f;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args)?;
    let generator = glyphwarp::Generator::from_config(&cfg).context("set up generator")?;
    let out = generator
        .generate(cfg.width, cfg.height, cfg.length, cfg.difficulty)
        .context("generate captcha")?;

    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("captcha.{}", out.format.extension())));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&path, &out.image)
        .with_context(|| format!("write image '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = out.image.len(), "wrote captcha");

    if args.json {
        let summary = serde_json::json!({
            "text": out.text,
            "path": path.display().to_string(),
            "format": out.format,
            "mime_type": out.mime_type(),
            "width": cfg.width,
            "height": cfg.height,
            "difficulty": cfg.difficulty,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", out.text);
    }
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    let all: Vec<_> = glyphwarp::Difficulty::ALL
        .iter()
        .map(|&d| {
            serde_json::json!({
                "difficulty": d,
                "charset": d.default_charset(),
                "recipe": d.recipe(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&all)?);
    Ok(())
}

fn cmd_fonts(args: FontsArgs) -> anyhow::Result<()> {
    let family = glyphwarp::FontFamily::with_embedded();
    for dir in &args.font_dirs {
        family
            .add_font_dir(dir)
            .with_context(|| format!("load font dir '{}'", dir.display()))?;
    }
    for key in family.keys()? {
        let bytes = family
            .font_bytes(&key)
            .with_context(|| format!("read font '{key}'"))?;
        println!("{}  {key}", sha256_hex(&bytes));
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
