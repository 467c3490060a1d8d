//! Minimal TrueType fonts for tests
//!
//! Enabled for this crate's tests and, through the `testing` feature, for the
//! tests of crates built on top of it.

use std::collections::HashMap;

use font_types::{FWord, Fixed, LongDateTime, NameId, Tag, UfWord, Version16Dot16};
use kurbo::{BezPath, Rect, Shape};
use write_fonts::{
    FontBuilder,
    tables::{
        glyf::{GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        layout::LookupFlag,
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

use crate::{
    tables::{
        cmap::{Variations, build_cmap},
        layout::build_gsub,
        layout_types::{LayoutTable, RuleKind, RuleLookup, SubstRule},
    },
    types::{Codepoint, GlyphId, VariationSequence},
};

/// A glyph of a test font: a rectangle (or nothing) with an advance.
#[derive(Debug, Clone)]
pub struct TestGlyph {
    pub name: String,
    pub codepoints: Vec<u32>,
    pub rect: Option<Rect>,
    pub advance: u16,
}

impl TestGlyph {
    pub fn new(name: &str, codepoints: &[u32], rect: Option<Rect>, advance: u16) -> Self {
        Self { name: name.to_string(), codepoints: codepoints.to_vec(), rect, advance }
    }

    /// A glyph whose outline is a box `inset` units inside its advance.
    pub fn boxed(name: &str, codepoints: &[u32], advance: u16, inset: f64) -> Self {
        let rect = Rect::new(inset, 0.0, advance as f64 - inset, 700.0);
        Self::new(name, codepoints, Some(rect), advance)
    }

    /// A glyph without contours.
    pub fn empty(name: &str, codepoints: &[u32], advance: u16) -> Self {
        Self::new(name, codepoints, None, advance)
    }
}

/// Builder for a minimal TrueType font.
#[derive(Debug, Clone)]
pub struct TestFont {
    glyphs: Vec<TestGlyph>,
    typo_ascender: i16,
    copyright: String,
    x_avg_char_width: i16,
    unicode_ranges: [u32; 4],
    code_page_ranges: [u32; 2],
    lookups: Vec<(Tag, RuleKind, Vec<(Vec<String>, Vec<String>)>)>,
    variations: Vec<(u32, u32, Option<String>)>,
}

impl TestFont {
    /// A font with `.notdef` followed by `glyphs`.
    pub fn new(glyphs: Vec<TestGlyph>) -> Self {
        let mut all = vec![TestGlyph::boxed(".notdef", &[], 500, 50.0)];
        all.extend(glyphs);
        Self {
            glyphs: all,
            typo_ascender: 800,
            copyright: "Test copyright".to_string(),
            x_avg_char_width: 500,
            unicode_ranges: [1, 0, 0, 0],
            code_page_ranges: [1, 0],
            lookups: Vec::new(),
            variations: Vec::new(),
        }
    }

    pub fn typo_ascender(mut self, value: i16) -> Self {
        self.typo_ascender = value;
        self
    }

    pub fn copyright(mut self, value: &str) -> Self {
        self.copyright = value.to_string();
        self
    }

    pub fn x_avg_char_width(mut self, value: i16) -> Self {
        self.x_avg_char_width = value;
        self
    }

    pub fn unicode_ranges(mut self, ranges: [u32; 4], code_pages: [u32; 2]) -> Self {
        self.unicode_ranges = ranges;
        self.code_page_ranges = code_pages;
        self
    }

    /// Map the sequence `base` `selector` to the glyph named `variant`, or to
    /// the default glyph of `base` when `variant` is `None`.
    pub fn variation(mut self, base: u32, selector: u32, variant: Option<&str>) -> Self {
        self.variations.push((base, selector, variant.map(str::to_string)));
        self
    }

    /// Add a single substitution lookup under `tag`, by glyph name.
    pub fn single_subst(mut self, tag: &[u8; 4], pairs: &[(&str, &str)]) -> Self {
        let rules = pairs.iter().map(|(from, to)| (vec![from.to_string()], vec![to.to_string()]));
        self.lookups.push((Tag::new(tag), RuleKind::Single, rules.collect()));
        self
    }

    /// Add a ligature lookup under `tag`: (components, ligature glyph), by glyph name.
    pub fn ligatures(mut self, tag: &[u8; 4], ligatures: &[(&[&str], &str)]) -> Self {
        let rules = ligatures.iter().map(|(components, ligature)| {
            (components.iter().map(|c| c.to_string()).collect(), vec![ligature.to_string()])
        });
        self.lookups.push((Tag::new(tag), RuleKind::Ligature, rules.collect()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let units_per_em = 1000u16;
        let num_glyphs = self.glyphs.len() as u16;
        let gids: HashMap<&str, GlyphId> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.as_str(), GlyphId::new(i as u16)))
            .collect();

        let mut glyf_builder = GlyfLocaBuilder::new();
        let mut h_metrics = Vec::new();
        let (mut x_min, mut y_min, mut x_max, mut y_max) = (0i16, 0i16, 0i16, 0i16);
        for glyph in &self.glyphs {
            match glyph.rect {
                Some(rect) => {
                    let path: BezPath = rect.to_path(0.1);
                    let simple = SimpleGlyph::from_bezpath(&path).unwrap();
                    x_min = x_min.min(simple.bbox.x_min);
                    y_min = y_min.min(simple.bbox.y_min);
                    x_max = x_max.max(simple.bbox.x_max);
                    y_max = y_max.max(simple.bbox.y_max);
                    h_metrics.push(LongMetric {
                        advance: glyph.advance,
                        side_bearing: simple.bbox.x_min,
                    });
                    glyf_builder.add_glyph(&Glyph::Simple(simple)).unwrap();
                }
                None => {
                    h_metrics.push(LongMetric { advance: glyph.advance, side_bearing: 0 });
                    glyf_builder.add_glyph(&Glyph::Empty).unwrap();
                }
            }
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let mappings = self.glyphs.iter().enumerate().flat_map(|(gid, glyph)| {
            glyph.codepoints.iter().map(move |cp| (Codepoint::new(*cp), GlyphId::new(gid as u16)))
        });
        let variations: Variations = self
            .variations
            .iter()
            .map(|(base, selector, variant)| {
                let base = Codepoint::new(*base);
                let sequence = VariationSequence::new(base, Codepoint::new(*selector));
                (sequence, variant.as_deref().map(|name| gids[name]))
            })
            .collect();
        let cmap = build_cmap(mappings, &variations).unwrap();

        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::empty(),
            units_per_em,
            created: LongDateTime::new(0),
            modified: LongDateTime::new(0),
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        };

        let advance_width_max = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let hhea = Hhea {
            ascender: FWord::new(self.typo_ascender),
            descender: FWord::new(-200),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(advance_width_max),
            min_left_side_bearing: FWord::new(0),
            min_right_side_bearing: FWord::new(0),
            x_max_extent: FWord::new(x_max),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: num_glyphs,
        };

        let hmtx = Hmtx::new(h_metrics, Vec::new());

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(4),
            max_contours: Some(1),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(2),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let mut post = Post::new_v2(self.glyphs.iter().map(|g| g.name.as_str()));
        post.version = Version16Dot16::VERSION_2_0;
        post.underline_position = FWord::new(-100);
        post.underline_thickness = FWord::new(50);

        let os2 = Os2 {
            x_avg_char_width: self.x_avg_char_width,
            us_weight_class: 400,
            us_width_class: 5,
            fs_type: 0,
            y_subscript_x_size: 650,
            y_subscript_y_size: 600,
            y_subscript_x_offset: 0,
            y_subscript_y_offset: 75,
            y_superscript_x_size: 650,
            y_superscript_y_size: 600,
            y_superscript_x_offset: 0,
            y_superscript_y_offset: 350,
            y_strikeout_size: 50,
            y_strikeout_position: 300,
            s_family_class: 0,
            panose_10: [0; 10],
            ul_unicode_range_1: self.unicode_ranges[0],
            ul_unicode_range_2: self.unicode_ranges[1],
            ul_unicode_range_3: self.unicode_ranges[2],
            ul_unicode_range_4: self.unicode_ranges[3],
            ach_vend_id: Tag::new(b"NONE"),
            fs_selection: SelectionFlags::REGULAR,
            us_first_char_index: 0x20,
            us_last_char_index: 0x7E,
            s_typo_ascender: self.typo_ascender,
            s_typo_descender: -200,
            s_typo_line_gap: 0,
            us_win_ascent: 1000,
            us_win_descent: 200,
            ul_code_page_range_1: Some(self.code_page_ranges[0]),
            ul_code_page_range_2: Some(self.code_page_ranges[1]),
            sx_height: Some(500),
            s_cap_height: Some(700),
            us_default_char: Some(0),
            us_break_char: Some(32),
            us_max_context: Some(2),
            us_lower_optical_point_size: None,
            us_upper_optical_point_size: None,
        };

        let name = Name::new(vec![NameRecord::new(
            3,
            1,
            0x409,
            NameId::new(0),
            self.copyright.clone().into(),
        )]);

        let mut builder = FontBuilder::new();
        builder.add_table(&head).unwrap();
        builder.add_table(&hhea).unwrap();
        builder.add_table(&hmtx).unwrap();
        builder.add_table(&maxp).unwrap();
        builder.add_table(&cmap).unwrap();
        builder.add_table(&post).unwrap();
        builder.add_table(&glyf).unwrap();
        builder.add_table(&loca).unwrap();
        builder.add_table(&os2).unwrap();
        builder.add_table(&name).unwrap();

        if !self.lookups.is_empty() {
            let mut gsub = LayoutTable::default();
            for (tag, kind, rules) in &self.lookups {
                let mut lookup = RuleLookup::new(*kind, LookupFlag::empty());
                for (inputs, outputs) in rules {
                    let inputs: Vec<GlyphId> = inputs.iter().map(|n| gids[n.as_str()]).collect();
                    let outputs: Vec<GlyphId> = outputs.iter().map(|n| gids[n.as_str()]).collect();
                    lookup.rules.push(match kind {
                        RuleKind::Ligature => {
                            SubstRule::Ligature { ligature: outputs[0], components: inputs }
                        }
                        _ => SubstRule::Single { target: inputs[0], replacement: outputs[0] },
                    });
                }
                gsub.add_lookup(lookup.to_lookup().unwrap(), &[*tag]);
            }
            builder.add_table(&build_gsub(&gsub).unwrap()).unwrap();
        }

        builder.build()
    }
}
