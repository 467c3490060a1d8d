//! post table reading and building

use std::collections::HashSet;

use read_fonts::{FontRef, TableProvider, tables::post::Post as ReadPost};
use write_fonts::tables::post::Post;

use crate::{glyph_order::GlyphName, types::GlyphId};

/// Read a unique name for every glyph.
///
/// Names come from a version 2 post table; glyphs without one are named
/// `glyphNNNNN` after their id. Duplicate names get a numeric suffix.
pub fn read_glyph_names(font: &FontRef, num_glyphs: u16) -> Vec<GlyphName> {
    let post = font.post().ok();
    let mut seen: HashSet<GlyphName> = HashSet::with_capacity(num_glyphs as usize);

    (0..num_glyphs)
        .map(|gid| {
            let name = post
                .as_ref()
                .and_then(|post| post.glyph_name(GlyphId::new(gid).to_glyph_id16()))
                .filter(|name| !name.is_empty())
                .map(GlyphName::from)
                .unwrap_or_else(|| GlyphName::new(format!("glyph{gid:05}")));
            let name = name.disambiguate(|candidate| seen.contains(candidate));
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// Build a version 2.0 post table carrying `names`, with the metric fields of `source`.
pub fn build_post(source: &ReadPost, names: &[GlyphName]) -> Post {
    let mut post = Post::new_v2(names.iter().map(|n| n.as_str()));
    post.italic_angle = source.italic_angle();
    post.underline_position = source.underline_position();
    post.underline_thickness = source.underline_thickness();
    post.is_fixed_pitch = source.is_fixed_pitch();
    post.min_mem_type42 = source.min_mem_type42();
    post.max_mem_type42 = source.max_mem_type42();
    post.min_mem_type1 = source.min_mem_type1();
    post.max_mem_type1 = source.max_mem_type1();
    post
}
