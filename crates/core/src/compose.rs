//! Composition of the intermediate font: base and donor merged, features
//! built, new glyphs fitted to the grid, italic applied.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use firple_font_artwork::ArtworkImporter;
use firple_font_merger::{FontAsset, reconcile, transfer_rules};
use firple_font_metadata::{FontNames, FontVersion, NAME_PLATFORMS};
use firple_font_ops::{build_name_table, rewrite_font};
use firple_font_transform::{
    GlyphSet, WidthGrid, advance_of, compensation_angle, condense, normalize_widths, shear,
};
use log::info;

use crate::{
    assets::{SourceFonts, feature_artwork, italic_artwork},
    config::{
        FEATURE_GLYPHS, HALF_WIDTH_REFERENCE, ITALIC_GLYPHS, ITALIC_OFFSET, ITALIC_SKEW,
        OVERRIDE_CODEPOINTS, PLEX_SCALE, SLIM_SCALE, VERSION,
    },
    features::apply_feature,
    hint_control::write_control_file,
    io::FontFile,
    style::{FontParams, StyleConfig, Weight},
    tools::DiagnosticGuard,
};

/// Files written by [`compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub font: PathBuf,
    pub control_file: PathBuf,
}

fn load(path: &Path) -> Result<FontAsset> {
    let data = FontFile::new(path).read()?;
    FontAsset::from_bytes(data).with_context(|| format!("Failed to load font: {}", path.display()))
}

/// Replace the base outlines of the italic glyphs with hand-drawn artwork at the "A" width.
fn import_italic_glyphs(
    asset: &mut FontAsset,
    importer: &ArtworkImporter,
    src_dir: &Path,
    weight: Weight,
) -> Result<()> {
    let width = advance_of(asset, HALF_WIDTH_REFERENCE)?;
    for name in ITALIC_GLYPHS {
        let outline = importer.import_file(&italic_artwork(src_dir, weight, name))?;
        let glyph = asset.glyph_by_name_mut(name)?;
        glyph.outline = outline;
        glyph.advance = width;
    }
    info!("Imported {} italic glyphs", ITALIC_GLYPHS.len());
    Ok(())
}

/// Names of the intermediate font, with the family replaced so it never
/// collides with an installed Firple.
fn intermediate_names(params: &FontParams, copyright: String) -> FontNames {
    FontNames {
        copyright,
        family: params.tmp_family(),
        subfamily: params.subfamily.clone(),
        full_name: params.tmp_full_name(),
        postscript_name: params.tmp_stem(),
        version: FontVersion::new(VERSION),
    }
}

/// Build the intermediate TrueType font of `style` and its hint control file in `tmp_dir`.
pub fn compose(
    src_dir: &Path,
    tmp_dir: &Path,
    style: &StyleConfig,
    suppress_errors: bool,
) -> Result<Composed> {
    let params = style.params();
    let weight = style.weight();
    let sources = SourceFonts::new(src_dir, weight);

    let (mut base, donor) = {
        let _guard = DiagnosticGuard::new(suppress_errors);
        (load(&sources.base)?, load(&sources.donor)?)
    };
    let importer = ArtworkImporter::new(base.metrics().ascent as f64);

    if style.italic {
        import_italic_glyphs(&mut base, &importer, src_dir, weight)?;
    }

    if style.slim {
        let all = GlyphSet::all(&base);
        condense(&mut base, &all, SLIM_SCALE)?;
        if style.italic {
            // Condensing flattens the pre-slanted artwork.
            let italic: GlyphSet = ITALIC_GLYPHS.iter().copied().collect();
            shear(&mut base, &italic, compensation_angle(ITALIC_SKEW, SLIM_SCALE), 0.0)?;
        }
    }

    let reconciliation = reconcile(&mut base, &donor, OVERRIDE_CODEPOINTS)?;
    let report = transfer_rules(&mut base, &donor, &reconciliation)?;
    info!("Transferred {} rules in {} lookups", report.rules, report.lookups);

    let mut introduced: GlyphSet = reconciliation.copied.iter().cloned().collect();
    let y_shift = f64::from(donor.metrics().ascent) - f64::from(base.metrics().ascent);
    for (tag, glyphs) in FEATURE_GLYPHS {
        let created =
            apply_feature(&mut base, tag, glyphs, style.feature_mode(tag), y_shift, |name| {
                Ok(importer.import_file(&feature_artwork(src_dir, tag, weight, name))?)
            })?;
        introduced.extend(created);
    }

    let grid = WidthGrid::new(advance_of(&base, HALF_WIDTH_REFERENCE)?);
    normalize_widths(&mut base, &introduced, grid, PLEX_SCALE)?;

    if style.italic {
        let offset = if style.slim { ITALIC_OFFSET * SLIM_SCALE } else { ITALIC_OFFSET };
        let targets = GlyphSet::all_except(&base, ITALIC_GLYPHS);
        shear(&mut base, &targets, ITALIC_SKEW, offset)?;
    }

    let data = {
        let _guard = DiagnosticGuard::new(suppress_errors);
        base.to_bytes()?
    };
    let names = intermediate_names(&params, base.copyright().unwrap_or_default());
    let data = rewrite_font(&data, |_, builder| {
        builder.add_table(&build_name_table(NAME_PLATFORMS, &names.entries()))?;
        Ok(())
    })?;

    let font = tmp_dir.join(format!("{}.ttf", params.tmp_stem()));
    FontFile::new(&font).write(data)?;

    let control_file = tmp_dir.join(format!("{}-control.txt", params.postscript_name));
    write_control_file(&control_file, &base, introduced.iter())?;

    info!("Wrote {}", font.display());
    Ok(Composed { font, control_file })
}
