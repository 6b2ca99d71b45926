//! `scrawl` command-line tool.
//!
//! ```text
//! scrawl extract --image sheet.jpg --chars "abc..." --out glyphs/ --debug
//! scrawl render  --glyphs glyphs/ --text "hello world" --out hello.png
//! scrawl pdf     --glyphs glyphs/ --text-file letter.txt --out letter.pdf --texture
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for layout details.

mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scrawl::{load_glyph_bank, save_glyph_bank, DocumentEncoder, GlyphExtractor, PageSize};
use scrawl_embedded_graphics::{
    apply_paper_texture, draw_reading_order_overlay, render_flow, render_pages, MissingGlyphPolicy,
};
use scrawl_pdf::PdfEncoder;
use scrawl_render::{JitterSource, LayoutDiagnostics, NeverCancel, SeededJitter, ThreadJitter};

use crate::config::CliConfig;

const DEBUG_OVERLAY_FILE: &str = "glyph_order_debug.png";

#[derive(Parser)]
#[command(name = "scrawl")]
#[command(about = "Extract handwriting glyphs and typeset text with them")]
#[command(version)]
struct Cli {
    /// JSON settings file; flags override its values
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut a scanned glyph sheet into one PNG per character
    Extract(ExtractArgs),
    /// Render text onto a single PNG canvas
    Render(RenderArgs),
    /// Render text onto fixed-size pages and write a PDF
    Pdf(PdfArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Scanned sheet (dark ink on light paper)
    #[arg(long)]
    image: PathBuf,

    /// Characters on the sheet, in reading order
    #[arg(long)]
    chars: String,

    /// Output directory for glyph PNGs
    #[arg(long, default_value = "glyphs")]
    out: PathBuf,

    /// Discard regions smaller than this many pixels
    #[arg(long)]
    min_area: Option<u64>,

    /// Max vertical distance between glyph centers on one row
    #[arg(long)]
    row_gap: Option<f32>,

    /// Paper border around each glyph
    #[arg(long)]
    padding: Option<u32>,

    /// Also write a reading-order overlay next to the glyphs
    #[arg(long)]
    debug: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TextSource {
    /// Text to render
    #[arg(long)]
    text: Option<String>,

    /// UTF-8 file with the text to render
    #[arg(long, value_name = "FILE")]
    text_file: Option<PathBuf>,
}

impl TextSource {
    fn read(&self) -> Result<String, String> {
        match (&self.text, &self.text_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => fs::read_to_string(path)
                .map_err(|e| format!("unable to read {}: {}", path.display(), e)),
            (None, None) => Err("provide --text or --text-file".to_string()),
        }
    }
}

/// Typography overrides shared by `render` and `pdf`.
#[derive(Args)]
struct TypographyArgs {
    #[arg(long)]
    scale: Option<f32>,

    #[arg(long)]
    letter_spacing: Option<i32>,

    #[arg(long)]
    space_factor: Option<f32>,

    #[arg(long)]
    line_spacing: Option<i32>,

    /// Max vertical offset per glyph
    #[arg(long)]
    jitter: Option<i32>,

    /// Max rotation per glyph, in degrees
    #[arg(long)]
    rotate_deg: Option<f32>,

    /// Disable jitter and rotation
    #[arg(long)]
    no_variation: bool,

    /// Seed for reproducible jitter and texture
    #[arg(long)]
    seed: Option<u64>,

    /// Outline characters that have no glyph
    #[arg(long)]
    outline_missing: bool,
}

impl TypographyArgs {
    fn jitter_source(&self) -> Box<dyn JitterSource> {
        match self.seed {
            Some(seed) => Box::new(SeededJitter::new(seed)),
            None => Box::new(ThreadJitter::default()),
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Glyph directory written by `extract`
    #[arg(long, default_value = "glyphs")]
    glyphs: PathBuf,

    #[command(flatten)]
    source: TextSource,

    /// Output PNG
    #[arg(long)]
    out: PathBuf,

    /// Canvas margin
    #[arg(long)]
    margin: Option<i32>,

    #[command(flatten)]
    typography: TypographyArgs,
}

#[derive(Args)]
struct PdfArgs {
    /// Glyph directory written by `extract`
    #[arg(long, default_value = "glyphs")]
    glyphs: PathBuf,

    #[command(flatten)]
    source: TextSource,

    /// Output PDF
    #[arg(long, default_value = "out/handwriting.pdf")]
    out: PathBuf,

    /// A4, LETTER, or <width>x<height>
    #[arg(long)]
    page_size: Option<PageSize>,

    #[arg(long)]
    margin: Option<i32>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Blend paper noise into every page
    #[arg(long)]
    texture: bool,

    #[command(flatten)]
    typography: TypographyArgs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let cfg = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Extract(args) => extract(cfg, args),
        Commands::Render(args) => render(cfg, args),
        Commands::Pdf(args) => pdf(cfg, args),
    }
}

fn extract(cfg: CliConfig, args: ExtractArgs) -> Result<(), String> {
    let mut options = cfg.extract;
    if let Some(min_area) = args.min_area {
        options.min_area = min_area;
    }
    if let Some(row_gap) = args.row_gap {
        options.row_gap_threshold = row_gap;
    }
    if let Some(padding) = args.padding {
        options.padding = padding;
    }

    let scan = image::open(&args.image)
        .map_err(|e| format!("unable to read {}: {}", args.image.display(), e))?;
    let extraction = GlyphExtractor::new(options)
        .extract(&scan, &args.chars)
        .map_err(|e| e.to_string())?;
    if !extraction.status.is_usable() {
        return Err(extraction.status.to_string());
    }

    let written = save_glyph_bank(&extraction.bank, &args.out).map_err(|e| e.to_string())?;
    println!("{} ({} files in {})", extraction.status, written.len(), args.out.display());

    if args.debug {
        let overlay = draw_reading_order_overlay(&scan.to_luma8(), &extraction.boxes, &extraction.order);
        let path = args.out.join(DEBUG_OVERLAY_FILE);
        overlay
            .save(&path)
            .map_err(|e| format!("unable to write {}: {}", path.display(), e))?;
        println!("reading-order overlay: {}", path.display());
    }
    Ok(())
}

fn render(cfg: CliConfig, args: RenderArgs) -> Result<(), String> {
    let text = args.source.read()?;
    let bank = load_bank(&args.glyphs)?;

    let mut flow = cfg.flow;
    let t = &args.typography;
    if let Some(margin) = args.margin {
        flow.margin = margin;
    }
    flow.scale = t.scale.unwrap_or(flow.scale);
    flow.letter_spacing = t.letter_spacing.unwrap_or(flow.letter_spacing);
    flow.space_factor = t.space_factor.unwrap_or(flow.space_factor);
    flow.line_spacing = t.line_spacing.unwrap_or(flow.line_spacing);
    flow.vertical_jitter = t.jitter.unwrap_or(flow.vertical_jitter);
    flow.rotation_deg = t.rotate_deg.unwrap_or(flow.rotation_deg);
    if t.no_variation {
        flow.vertical_jitter = 0;
        flow.rotation_deg = 0.0;
    }
    let mut render_cfg = cfg.render;
    if t.outline_missing {
        render_cfg.missing_glyph = MissingGlyphPolicy::Outline;
    }

    let mut jitter = t.jitter_source();
    let rendered = render_flow(&text, &bank, flow, render_cfg, jitter.as_mut());
    ensure_parent(&args.out)?;
    rendered
        .image
        .save(&args.out)
        .map_err(|e| format!("unable to write {}: {}", args.out.display(), e))?;
    report_missing(&rendered.diagnostics);
    println!(
        "wrote {}x{} canvas to {}",
        rendered.image.width(),
        rendered.image.height(),
        args.out.display()
    );
    Ok(())
}

fn pdf(cfg: CliConfig, args: PdfArgs) -> Result<(), String> {
    let text = args.source.read()?;
    let bank = load_bank(&args.glyphs)?;

    let mut layout = cfg.pages;
    let t = &args.typography;
    layout.page_size = args.page_size.unwrap_or(layout.page_size);
    layout.margin = args.margin.unwrap_or(layout.margin);
    layout.max_pages = args.max_pages.or(layout.max_pages);
    layout.scale = t.scale.unwrap_or(layout.scale);
    layout.letter_spacing = t.letter_spacing.unwrap_or(layout.letter_spacing);
    layout.space_factor = t.space_factor.unwrap_or(layout.space_factor);
    layout.line_spacing = t.line_spacing.unwrap_or(layout.line_spacing);
    layout.vertical_jitter = t.jitter.unwrap_or(layout.vertical_jitter);
    layout.rotation_deg = t.rotate_deg.unwrap_or(layout.rotation_deg);
    if t.no_variation {
        layout.vertical_jitter = 0;
        layout.rotation_deg = 0.0;
    }
    let mut render_cfg = cfg.render;
    if t.outline_missing {
        render_cfg.missing_glyph = MissingGlyphPolicy::Outline;
    }

    let mut jitter = t.jitter_source();
    let mut rendered = render_pages(&text, &bank, layout, render_cfg, jitter.as_mut(), &NeverCancel);
    if args.texture || cfg.texture.enabled {
        let mut rng = match t.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        for page in &mut rendered.pages {
            apply_paper_texture(page, cfg.texture.strength, &mut rng);
        }
    }

    let bytes = PdfEncoder::new()
        .encode_document(&rendered.pages, layout.page_size)
        .map_err(|e| e.to_string())?;
    ensure_parent(&args.out)?;
    fs::write(&args.out, bytes)
        .map_err(|e| format!("unable to write {}: {}", args.out.display(), e))?;

    report_missing(&rendered.diagnostics);
    if rendered.truncated {
        println!("stopped at the {}-page limit", rendered.pages.len());
    }
    println!(
        "wrote {} {} pages to {}",
        rendered.pages.len(),
        layout.page_size,
        args.out.display()
    );
    Ok(())
}

fn load_bank(dir: &Path) -> Result<scrawl::GlyphBank, String> {
    let bank = load_glyph_bank(dir)
        .map_err(|e| format!("unable to load glyphs from {}: {}", dir.display(), e))?;
    if bank.is_empty() {
        return Err(format!("no glyphs found in {}", dir.display()));
    }
    Ok(bank)
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| format!("unable to create {}: {}", parent.display(), e)),
        _ => Ok(()),
    }
}

fn report_missing(diagnostics: &LayoutDiagnostics) {
    if diagnostics.has_missing_glyphs() {
        let chars: String = diagnostics.missing_chars.iter().collect();
        println!(
            "{} characters had no glyph: {:?}",
            diagnostics.missing_glyphs, chars
        );
    }
}
