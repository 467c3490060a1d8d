//! CLI definitions and dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::debug;

use firple_core::{
    BuildOptions, OutputFormat, StyleConfig, build,
    config::{FEATURE_GLYPHS, OUT_DIR, SRC_DIR, TMP_DIR, VERSION, is_feature_tag},
};

#[derive(Parser, Debug)]
#[command(name = "firple")]
#[command(version = VERSION)]
#[command(about = "Generate Firple fonts from Fira Code and IBM Plex Sans JP")]
pub struct Cli {
    /// Generate all families, weights and styles (default)
    #[arg(short, long)]
    pub all: bool,

    /// Generate a single font as specified; ignored if --all is set
    #[arg(short, long, value_enum, num_args = 0..)]
    pub single: Option<Vec<StyleFlag>>,

    /// Disable Nerd Fonts patching
    #[arg(long)]
    pub disable_nerd_fonts: bool,

    /// Freeze the given OpenType features (cv33, ss11)
    #[arg(long, num_args = 0.., value_parser = feature_tag)]
    pub freeze_features: Vec<String>,

    /// Format of the generated fonts: ttf, otf, woff or woff2
    #[arg(long, default_value = "ttf")]
    pub ext: OutputFormat,

    /// Do not delete temporary files on exit
    #[arg(long)]
    pub keep_tmp_files: bool,

    /// Show diagnostics from font libraries and external tools
    #[arg(long)]
    pub show_library_errors: bool,

    /// Skip ttfautohint
    #[arg(long)]
    pub disable_autohint: bool,

    #[arg(long, default_value = SRC_DIR)]
    pub src_dir: PathBuf,

    #[arg(long, default_value = OUT_DIR)]
    pub out_dir: PathBuf,

    #[arg(long, default_value = TMP_DIR)]
    pub tmp_dir: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFlag {
    Slim,
    Bold,
    Italic,
}

fn feature_tag(value: &str) -> Result<String, String> {
    if is_feature_tag(value) {
        Ok(value.to_string())
    } else {
        let known: Vec<&str> = FEATURE_GLYPHS.iter().map(|(tag, _)| *tag).collect();
        Err(format!("unknown feature '{value}' (expected one of: {})", known.join(", ")))
    }
}

impl Cli {
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            src_dir: self.src_dir.clone(),
            out_dir: self.out_dir.clone(),
            tmp_dir: self.tmp_dir.clone(),
            nerd: !self.disable_nerd_fonts,
            frozen_features: self.freeze_features.iter().cloned().collect(),
            format: self.ext,
            keep_tmp: self.keep_tmp_files,
            suppress_errors: !self.show_library_errors,
            hinting: !self.disable_autohint,
        }
    }

    /// The styles to build: every combination, or the one named by `--single`.
    pub fn styles(&self, options: &BuildOptions) -> Vec<StyleConfig> {
        match &self.single {
            Some(flags) if !self.all => vec![options.style(
                flags.contains(&StyleFlag::Slim),
                flags.contains(&StyleFlag::Bold),
                flags.contains(&StyleFlag::Italic),
            )],
            _ => options.all_styles(),
        }
    }

    pub fn run(self) -> Result<()> {
        let options = self.options();
        let styles = self.styles(&options);
        debug!("Building {} styles with {options:?}", styles.len());
        build(&options, &styles)?;
        Ok(())
    }
}
