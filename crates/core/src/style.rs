//! Style configurations and the naming derived from them.

use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use anyhow::Result;

use crate::{
    config::{FAMILY, TMP_FAMILY},
    features::FeatureMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Regular,
    Bold,
}

impl Weight {
    pub const fn as_str(self) -> &'static str {
        match self {
            Weight::Regular => "Regular",
            Weight::Bold => "Bold",
        }
    }
}

impl Display for Weight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File format of the final font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Ttf,
    /// TrueType outlines under the `.otf` extension.
    Otf,
    Woff,
    Woff2,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] =
        [OutputFormat::Ttf, OutputFormat::Otf, OutputFormat::Woff, OutputFormat::Woff2];

    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Ttf => "ttf",
            OutputFormat::Otf => "otf",
            OutputFormat::Woff => "woff",
            OutputFormat::Woff2 => "woff2",
        }
    }

    /// Wrap TrueType font data in this format.
    pub fn encode(self, data: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            OutputFormat::Ttf | OutputFormat::Otf => Ok(data),
            OutputFormat::Woff => firple_font_woff2::to_woff(&data),
            OutputFormat::Woff2 => firple_font_woff2::to_woff2(&data),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output format '{s}' (expected ttf, otf, woff or woff2)"))
    }
}

/// One font to build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleConfig {
    pub slim: bool,
    pub bold: bool,
    pub italic: bool,
    pub nerd: bool,
    pub frozen_features: BTreeSet<String>,
    pub format: OutputFormat,
}

impl StyleConfig {
    pub fn weight(&self) -> Weight {
        if self.bold { Weight::Bold } else { Weight::Regular }
    }

    pub fn feature_mode(&self, tag: &str) -> FeatureMode {
        if self.frozen_features.contains(tag) { FeatureMode::Freeze } else { FeatureMode::Create }
    }

    pub fn params(&self) -> FontParams {
        FontParams::new(self.slim, self.weight(), self.italic)
    }
}

/// Names of one font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontParams {
    pub family: String,
    pub weight: Weight,
    pub subfamily: String,
    pub full_name: String,
    pub postscript_name: String,
}

impl FontParams {
    pub fn new(slim: bool, weight: Weight, italic: bool) -> Self {
        let family = if slim { format!("{FAMILY} Slim") } else { FAMILY.to_string() };
        let subfamily = match (weight, italic) {
            (Weight::Regular, true) => "Italic".to_string(),
            (weight, true) => format!("{weight} Italic"),
            (weight, false) => weight.to_string(),
        };
        let full_name = format!("{family} {subfamily}");
        let postscript_name = format!("{family}-{subfamily}").replace(' ', "");
        Self { family, weight, subfamily, full_name, postscript_name }
    }

    /// Family name of the intermediate font.
    pub fn tmp_family(&self) -> String {
        self.family.replacen(FAMILY, TMP_FAMILY, 1)
    }

    /// Full name of the intermediate font.
    pub fn tmp_full_name(&self) -> String {
        self.full_name.replacen(FAMILY, TMP_FAMILY, 1)
    }

    /// File stem and PostScript name of the intermediate font.
    pub fn tmp_stem(&self) -> String {
        self.postscript_name.replacen(FAMILY, TMP_FAMILY, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_names() {
        let params = FontParams::new(false, Weight::Regular, false);
        assert_eq!(params.family, "Firple");
        assert_eq!(params.subfamily, "Regular");
        assert_eq!(params.full_name, "Firple Regular");
        assert_eq!(params.postscript_name, "Firple-Regular");
        assert_eq!(params.tmp_stem(), "Tmp-Regular");
    }

    #[test]
    fn test_slim_bold_italic_names() {
        let params = FontParams::new(true, Weight::Bold, true);
        assert_eq!(params.family, "Firple Slim");
        assert_eq!(params.subfamily, "Bold Italic");
        assert_eq!(params.full_name, "Firple Slim Bold Italic");
        assert_eq!(params.postscript_name, "FirpleSlim-BoldItalic");
        assert_eq!(params.tmp_family(), "Tmp Slim");
        assert_eq!(params.tmp_full_name(), "Tmp Slim Bold Italic");
        assert_eq!(params.tmp_stem(), "TmpSlim-BoldItalic");
    }

    #[test]
    fn test_regular_italic_subfamily() {
        let params = FontParams::new(false, Weight::Regular, true);
        assert_eq!(params.subfamily, "Italic");
        assert_eq!(params.postscript_name, "Firple-Italic");
    }

    #[test]
    fn test_feature_mode() {
        let style = StyleConfig {
            frozen_features: ["ss11".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(style.feature_mode("ss11"), FeatureMode::Freeze);
        assert_eq!(style.feature_mode("cv33"), FeatureMode::Create);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("woff2".parse::<OutputFormat>(), Ok(OutputFormat::Woff2));
        assert_eq!("OTF".parse::<OutputFormat>(), Ok(OutputFormat::Otf));
        assert!("eot".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().extension(), "ttf");
    }
}
