//! The editable in-memory font model

use std::collections::{BTreeMap, HashMap};

use firple_font_ops::copy_tables_except;
use kurbo::BezPath;
use log::debug;
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        gpos::PositionLookup,
        gsub::SubstitutionLookup,
        head::Head,
        hhea::Hhea,
        maxp::Maxp,
        os2::Os2,
    },
};

use crate::{
    ComposeError, Result,
    glyph_order::GlyphName,
    tables::{
        cmap::{self, Variations},
        glyf, hmtx,
        layout::{self, DonorLookup},
        layout_types::LayoutTable,
        metrics::{self, VerticalMetrics},
        post,
    },
    types::{Codepoint, GlyphId, VariationSequence},
};

/// Tables that are rebuilt on compile.
const REBUILT_TABLES: &[&[u8; 4]] =
    &[b"glyf", b"loca", b"hmtx", b"hhea", b"maxp", b"head", b"cmap", b"post", b"OS/2", b"GSUB", b"GPOS"];

/// Tables that stop matching the glyph set once outlines change, and are dropped.
///
/// The auto-hinter regenerates the hinting tables.
const DROPPED_TABLES: &[&[u8; 4]] =
    &[b"fpgm", b"prep", b"cvt ", b"hdmx", b"LTSH", b"VDMX", b"DSIG", b"vhea", b"vmtx", b"VORG"];

/// One glyph of a font asset
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub name: GlyphName,
    /// The first code point is the primary one; the rest are aliases.
    pub codepoints: Vec<Codepoint>,
    /// Decomposed outline in font units.
    pub outline: BezPath,
    pub advance: u16,
}

/// An editable font: glyphs addressed by id, with indices by name and code point.
///
/// Tables the model does not edit are kept as raw bytes and passed through on
/// [`FontAsset::to_bytes`].
#[derive(Debug, Clone)]
pub struct FontAsset {
    data: Vec<u8>,
    glyphs: Vec<Glyph>,
    by_name: HashMap<GlyphName, GlyphId>,
    by_codepoint: BTreeMap<Codepoint, GlyphId>,
    variations: Variations,
    gsub: LayoutTable<SubstitutionLookup>,
    gpos: LayoutTable<PositionLookup>,
    metrics: VerticalMetrics,
}

impl FontAsset {
    /// Parse a TrueType font into the editable model.
    ///
    /// Composite glyphs are decomposed and hinting instructions dropped.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontRef::new(&data)?;
        let num_glyphs = font.maxp()?.num_glyphs();

        let names = post::read_glyph_names(&font, num_glyphs);
        let advances = hmtx::read_advances(&font, num_glyphs)?;
        let outlines = glyf::read_outlines(&font, num_glyphs)?;
        let mappings = cmap::read_mappings(&font, num_glyphs);
        let variations = cmap::read_variations(&font, num_glyphs);
        let gsub = layout::read_gsub(&font)?;
        let gpos = layout::read_gpos(&font)?;
        let metrics = metrics::read_vertical_metrics(&font)?;

        let mut glyphs: Vec<Glyph> = names
            .into_iter()
            .zip(outlines)
            .zip(advances)
            .map(|((name, outline), advance)| Glyph { name, codepoints: Vec::new(), outline, advance })
            .collect();

        let mut by_codepoint = BTreeMap::new();
        for (cp, gid) in mappings {
            glyphs[gid.to_usize()].codepoints.push(cp);
            by_codepoint.insert(cp, gid);
        }
        // Prefer the lowest code point as primary so the order does not depend on the subtable.
        for glyph in &mut glyphs {
            glyph.codepoints.sort_unstable();
        }

        let by_name = glyphs
            .iter()
            .enumerate()
            .map(|(gid, glyph)| (glyph.name.clone(), GlyphId::new(gid as u16)))
            .collect();

        debug!(
            "Loaded {} glyphs, {} code points, {} variation sequences",
            glyphs.len(),
            by_codepoint.len(),
            variations.len()
        );

        Ok(Self { data, glyphs, by_name, by_codepoint, variations, gsub, gpos, metrics })
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyph(&self, gid: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(gid.to_usize())
    }

    /// Names and code points of the returned glyph must stay unchanged.
    pub fn glyph_mut(&mut self, gid: GlyphId) -> Option<&mut Glyph> {
        self.glyphs.get_mut(gid.to_usize())
    }

    pub fn gid_by_name(&self, name: &str) -> Option<GlyphId> {
        self.by_name.get(name).copied()
    }

    pub fn gid_by_codepoint(&self, cp: Codepoint) -> Option<GlyphId> {
        self.by_codepoint.get(&cp).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn contains_codepoint(&self, cp: Codepoint) -> bool {
        self.by_codepoint.contains_key(&cp)
    }

    pub fn glyph_by_name(&self, name: &str) -> Result<&Glyph> {
        self.gid_by_name(name)
            .and_then(|gid| self.glyph(gid))
            .ok_or_else(|| ComposeError::MissingGlyph(name.to_string()))
    }

    pub fn glyph_by_name_mut(&mut self, name: &str) -> Result<&mut Glyph> {
        let gid = self.gid_by_name(name).ok_or_else(|| ComposeError::MissingGlyph(name.to_string()))?;
        self.glyph_mut(gid).ok_or_else(|| ComposeError::MissingGlyph(name.to_string()))
    }

    /// The glyph with the same key in this asset: by primary code point, else by name.
    pub fn resolve_key(&self, glyph: &Glyph) -> Option<GlyphId> {
        match glyph.codepoints.first() {
            Some(cp) => self.gid_by_codepoint(*cp),
            None => self.gid_by_name(&glyph.name),
        }
    }

    pub fn metrics(&self) -> VerticalMetrics {
        self.metrics
    }

    /// Unicode variation sequences, each with its glyph or `None` for the
    /// base character's default glyph.
    pub fn variations(&self) -> &Variations {
        &self.variations
    }

    /// Map a variation sequence. Its base character must be mapped in this asset.
    pub fn insert_variation(
        &mut self,
        sequence: VariationSequence,
        glyph: Option<GlyphId>,
    ) -> Result<()> {
        if !self.by_codepoint.contains_key(&sequence.base) {
            return Err(ComposeError::UnmappedCodepoint(sequence.base));
        }
        if let Some(gid) = glyph
            && gid.to_usize() >= self.glyphs.len()
        {
            return Err(ComposeError::MissingGlyph(gid.to_string()));
        }
        self.variations.insert(sequence, glyph);
        Ok(())
    }

    pub fn gsub(&self) -> &LayoutTable<SubstitutionLookup> {
        &self.gsub
    }

    pub fn gsub_mut(&mut self) -> &mut LayoutTable<SubstitutionLookup> {
        &mut self.gsub
    }

    pub fn gpos(&self) -> &LayoutTable<PositionLookup> {
        &self.gpos
    }

    /// Flattened substitution lookups of this asset's source GSUB.
    pub fn donor_lookups(&self) -> Result<Vec<DonorLookup>> {
        layout::read_donor_lookups(&FontRef::new(&self.data)?)
    }

    /// Copyright notice of the source font.
    pub fn copyright(&self) -> Option<String> {
        let font = FontRef::new(&self.data).ok()?;
        firple_font_ops::name_string(&font, 0)
    }

    /// Append a glyph, renaming it (`name.1`) if its name is taken.
    ///
    /// Code points already mapped in this asset are not carried. Returns the
    /// new glyph id.
    pub fn push_glyph(&mut self, mut glyph: Glyph) -> Result<GlyphId> {
        let gid = u16::try_from(self.glyphs.len())
            .ok()
            .filter(|gid| *gid < u16::MAX)
            .ok_or(ComposeError::TooManyGlyphs(self.glyphs.len() + 1))?;
        let gid = GlyphId::new(gid);

        glyph.name = glyph.name.disambiguate(|candidate| self.by_name.contains_key(candidate));
        glyph.codepoints.retain(|cp| !self.by_codepoint.contains_key(cp));

        self.by_name.insert(glyph.name.clone(), gid);
        for cp in &glyph.codepoints {
            self.by_codepoint.insert(*cp, gid);
        }
        self.glyphs.push(glyph);
        Ok(gid)
    }

    /// Put `glyph` in the slot of `gid`, dropping the previous glyph's name and code points.
    ///
    /// Layout rules that referred to the slot now refer to the new glyph.
    pub fn replace_glyph(&mut self, gid: GlyphId, mut glyph: Glyph) -> Result<()> {
        let old = self
            .glyphs
            .get(gid.to_usize())
            .ok_or_else(|| ComposeError::MissingGlyph(gid.to_string()))?;
        self.by_name.remove(&old.name);
        for cp in &old.codepoints {
            self.by_codepoint.remove(cp);
        }

        glyph.name = glyph.name.disambiguate(|candidate| self.by_name.contains_key(candidate));
        glyph.codepoints.retain(|cp| !self.by_codepoint.contains_key(cp));

        self.by_name.insert(glyph.name.clone(), gid);
        for cp in &glyph.codepoints {
            self.by_codepoint.insert(*cp, gid);
        }
        self.glyphs[gid.to_usize()] = glyph;
        self.variations.retain(|sequence, _| self.by_codepoint.contains_key(&sequence.base));
        Ok(())
    }

    /// Compile the model back into a TrueType font.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let font = FontRef::new(&self.data)?;
        let num_glyphs = u16::try_from(self.glyphs.len())
            .map_err(|_| ComposeError::TooManyGlyphs(self.glyphs.len()))?;

        let skip: Vec<Tag> =
            REBUILT_TABLES.iter().chain(DROPPED_TABLES).map(|tag| Tag::new(tag)).collect();
        let mut builder = FontBuilder::new();
        copy_tables_except(&font, &mut builder, &skip);

        let compiled = glyf::build_glyf(&self.glyphs)?;
        let advances: Vec<u16> = self.glyphs.iter().map(|g| g.advance).collect();
        let (hmtx, extents) = hmtx::build_hmtx(&advances, &compiled.bboxes);

        let mut head: Head = font.head()?.to_owned_table();
        metrics::update_head(&mut head, &compiled);

        let mut hhea: Hhea = font.hhea()?.to_owned_table();
        metrics::update_hhea(&mut hhea, &extents, num_glyphs);

        let mut maxp: Maxp = font.maxp()?.to_owned_table();
        metrics::update_maxp(&mut maxp, num_glyphs, &compiled);

        let names: Vec<GlyphName> = self.glyphs.iter().map(|g| g.name.clone()).collect();
        let post = post::build_post(&font.post()?, &names);
        let cmap = cmap::build_cmap(
            self.by_codepoint.iter().map(|(cp, gid)| (*cp, *gid)),
            &self.variations,
        )?;

        builder.add_table(&head)?;
        builder.add_table(&hhea)?;
        builder.add_table(&maxp)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&compiled.glyf)?;
        builder.add_table(&compiled.loca)?;
        builder.add_table(&post)?;
        builder.add_table(&cmap)?;

        if let Ok(os2) = font.os2() {
            let mut os2: Os2 = os2.to_owned_table();
            metrics::update_os2(&mut os2, self.by_codepoint.keys().copied());
            builder.add_table(&os2)?;
        }
        if let Some(gsub) = layout::build_gsub(&self.gsub) {
            builder.add_table(&gsub)?;
        }
        if let Some(gpos) = layout::build_gpos(&self.gpos) {
            builder.add_table(&gpos)?;
        }

        Ok(builder.build())
    }
}
