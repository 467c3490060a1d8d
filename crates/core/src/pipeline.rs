//! Build pipeline for Firple fonts.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use firple_font_metadata::{
    FontMetadata, FontNames, FontVersion, ItalicSettings, LanguageTags, MonospaceSettings,
    SourceInfo,
};
use log::info;

use crate::{
    assets::{SourceFonts, patcher_script, required, required_assets},
    compose::compose,
    config::{
        COPYRIGHT, DESIGN_LANGUAGES, FAMILY, ITALIC_OFFSET, ITALIC_SKEW, OUT_DIR, SLIM_SCALE,
        SRC_DIR, SUPPORTED_LANGUAGES, TMP_DIR, VERSION,
    },
    io::{FontFile, TmpDir, glob_fonts},
    style::{FontParams, OutputFormat, StyleConfig},
    tools::{hinter, patcher},
};

/// Run configuration shared by every style of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub nerd: bool,
    pub frozen_features: BTreeSet<String>,
    pub format: OutputFormat,
    pub keep_tmp: bool,
    pub suppress_errors: bool,
    /// Run ttfautohint. Without it the intermediate font goes on unhinted.
    pub hinting: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from(SRC_DIR),
            out_dir: PathBuf::from(OUT_DIR),
            tmp_dir: PathBuf::from(TMP_DIR),
            nerd: true,
            frozen_features: BTreeSet::new(),
            format: OutputFormat::default(),
            keep_tmp: false,
            suppress_errors: true,
            hinting: true,
        }
    }
}

impl BuildOptions {
    pub fn style(&self, slim: bool, bold: bool, italic: bool) -> StyleConfig {
        StyleConfig {
            slim,
            bold,
            italic,
            nerd: self.nerd,
            frozen_features: self.frozen_features.clone(),
            format: self.format,
        }
    }

    /// All eight combinations of slim, bold and italic.
    pub fn all_styles(&self) -> Vec<StyleConfig> {
        let mut styles = Vec::with_capacity(8);
        for slim in [false, true] {
            for bold in [false, true] {
                for italic in [false, true] {
                    styles.push(self.style(slim, bold, italic));
                }
            }
        }
        styles
    }
}

/// State of one style's build as it moves through the steps.
pub struct StyleContext<'a> {
    pub options: &'a BuildOptions,
    pub style: &'a StyleConfig,
    pub params: FontParams,
    tmp_dir: &'a Path,
    current: Option<PathBuf>,
    control_file: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl<'a> StyleContext<'a> {
    pub fn new(options: &'a BuildOptions, style: &'a StyleConfig, tmp_dir: &'a Path) -> Self {
        Self {
            options,
            style,
            params: style.params(),
            tmp_dir,
            current: None,
            control_file: None,
            output: None,
        }
    }

    /// The font produced by the last step.
    fn current(&self) -> Result<&Path> {
        self.current.as_deref().context("No intermediate font has been generated")
    }

    pub fn output_path(&self) -> PathBuf {
        self.options.out_dir.join(format!(
            "{}.{}",
            self.params.postscript_name,
            self.style.format.extension()
        ))
    }
}

pub type PipelineStep = (&'static str, fn(&mut StyleContext) -> Result<()>);

pub const BASE_STEPS: &[PipelineStep] =
    &[("create-base-font", step_create_base_font), ("auto-hint", step_auto_hint)];

pub const NERD_STEPS: &[PipelineStep] = &[("nerd-patch", step_nerd_patch)];

pub const FINAL_STEPS: &[PipelineStep] = &[("set-font-params", step_set_font_params)];

fn step_create_base_font(ctx: &mut StyleContext) -> Result<()> {
    let composed =
        compose(&ctx.options.src_dir, ctx.tmp_dir, ctx.style, ctx.options.suppress_errors)?;
    ctx.current = Some(composed.font);
    ctx.control_file = Some(composed.control_file);
    Ok(())
}

fn step_auto_hint(ctx: &mut StyleContext) -> Result<()> {
    if !ctx.options.hinting {
        info!("Auto-hinting disabled, keeping {}", ctx.current()?.display());
        return Ok(());
    }
    let control_file = ctx.control_file.as_deref().context("No hint control file")?;
    let hinted = hinter::run(ctx.current()?, control_file, &ctx.params.full_name)?;
    ctx.current = Some(hinted);
    Ok(())
}

fn step_nerd_patch(ctx: &mut StyleContext) -> Result<()> {
    let patched = patcher::run(
        &patcher_script(&ctx.options.src_dir),
        ctx.current()?,
        ctx.tmp_dir,
        &ctx.params.full_name,
        ctx.options.suppress_errors,
    )?;
    ctx.current = Some(patched);
    Ok(())
}

fn step_set_font_params(ctx: &mut StyleContext) -> Result<()> {
    let sources = SourceFonts::new(&ctx.options.src_dir, ctx.style.weight());
    let base = SourceInfo::read(&FontFile::new(&sources.base).read()?)?;
    let donor = SourceInfo::read(&FontFile::new(&sources.donor).read()?)?;

    let metadata = font_metadata(ctx.style, &ctx.params, &base, &donor);
    let data = metadata.apply(&FontFile::new(ctx.current()?).read()?)?;
    let data = ctx.style.format.encode(data)?;

    let output = ctx.output_path();
    FontFile::new(&output).write(data)?;
    ctx.output = Some(output);
    Ok(())
}

/// Final metadata of a style, from the naming and both source fonts.
pub fn font_metadata(
    style: &StyleConfig,
    params: &FontParams,
    base: &SourceInfo,
    donor: &SourceInfo,
) -> FontMetadata {
    let x_avg_char_width = if style.slim {
        (f64::from(base.x_avg_char_width) * SLIM_SCALE) as i16
    } else {
        base.x_avg_char_width
    };
    let tags = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();

    FontMetadata {
        names: FontNames {
            copyright: [COPYRIGHT, base.copyright.as_str(), donor.copyright.as_str()].join("; "),
            family: params.family.clone(),
            subfamily: params.subfamily.clone(),
            full_name: params.full_name.clone(),
            postscript_name: params.postscript_name.clone(),
            version: FontVersion::new(VERSION),
        },
        languages: LanguageTags {
            design: tags(DESIGN_LANGUAGES),
            supported: tags(SUPPORTED_LANGUAGES),
        },
        ranges: base.ranges.union(&donor.ranges),
        monospace: MonospaceSettings::new(x_avg_char_width),
        italic: style
            .italic
            .then_some(ItalicSettings { angle: ITALIC_SKEW, caret_offset: ITALIC_OFFSET as i16 }),
    }
}

pub fn run_step(
    name: &str,
    step_num: usize,
    total: usize,
    ctx: &mut StyleContext,
    f: impl Fn(&mut StyleContext) -> Result<()>,
) -> Result<()> {
    println!("\n[{step_num}/{total}] {name}");
    let start = Instant::now();
    f(ctx)?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(())
}

pub fn run_steps(
    steps: &[PipelineStep],
    ctx: &mut StyleContext,
    offset: usize,
    total: usize,
) -> Result<()> {
    for (i, (name, step_fn)) in steps.iter().enumerate() {
        run_step(name, offset + i + 1, total, ctx, step_fn)?;
    }
    Ok(())
}

/// Run every step for one style and return the path of the final font.
pub fn build_style(options: &BuildOptions, style: &StyleConfig, tmp_dir: &Path) -> Result<PathBuf> {
    let mut ctx = StyleContext::new(options, style, tmp_dir);
    println!("\n[{}]", ctx.params.full_name);

    let nerd_steps: &[PipelineStep] = if style.nerd { NERD_STEPS } else { &[] };
    let total = BASE_STEPS.len() + nerd_steps.len() + FINAL_STEPS.len();

    run_steps(BASE_STEPS, &mut ctx, 0, total)?;
    run_steps(nerd_steps, &mut ctx, BASE_STEPS.len(), total)?;
    run_steps(FINAL_STEPS, &mut ctx, BASE_STEPS.len() + nerd_steps.len(), total)?;

    let output = ctx.output.context("No font has been written")?;
    println!("  → {}", output.display());
    Ok(output)
}

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════════";

/// The header printed once at the start of a run.
pub fn banner() -> String {
    format!("{RULE}\n{FAMILY} v{VERSION} Build Pipeline\n{RULE}")
}

/// Build `styles` one after another.
///
/// Required files of every style are checked before anything is written.
/// Intermediate files are removed at the end unless `keep_tmp` is set.
pub fn build(options: &BuildOptions, styles: &[StyleConfig]) -> Result<Vec<PathBuf>> {
    let start = Instant::now();

    println!("{}", banner());

    for style in styles {
        required(&style.params().full_name, required_assets(&options.src_dir, style))?;
    }

    let tmp = TmpDir::create(&options.tmp_dir, options.keep_tmp)?;
    let mut outputs = Vec::with_capacity(styles.len());
    for style in styles {
        outputs.push(build_style(options, style, tmp.path())?);
    }

    println!("\n{RULE}");
    println!("✨ Build complete in {:.2}s", start.elapsed().as_secs_f64());
    println!("   Output: {}", options.out_dir.display());

    let pattern = format!("{FAMILY}*.{}", options.format.extension());
    let count = glob_fonts(&options.out_dir, &pattern)?.len();
    println!("   Fonts: {} built, {count} in output directory", outputs.len());
    println!("{RULE}");

    Ok(outputs)
}

/// Build all eight styles.
pub fn build_all(options: &BuildOptions) -> Result<Vec<PathBuf>> {
    build(options, &options.all_styles())
}
