//! Generic font table manipulation utilities.

use anyhow::{Context, Result};
use read_fonts::{FontRef, TableProvider, types::NameId, types::Tag};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
};

/// Windows, Unicode BMP, en-US.
const WINDOWS_ENGLISH: (u16, u16, u16) = (3, 1, 0x409);
/// Macintosh, Roman, English.
const MAC_ENGLISH: (u16, u16, u16) = (1, 0, 0);

/// Copy every table of `font` into `builder` as raw bytes, except the tags in `skip`.
///
/// Tables added to the builder afterwards with `add_table` replace the raw copies.
pub fn copy_tables_except<'a>(font: &FontRef<'a>, builder: &mut FontBuilder<'a>, skip: &[Tag]) {
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if skip.contains(&tag) {
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }
}

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let mut builder = FontBuilder::new();

    copy_tables_except(&font, &mut builder, &[]);

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Look up a string in the name table.
///
/// Prefers the Windows English record, then any Windows record, then the
/// Macintosh English record, then whatever comes first.
pub fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
    let name = font.name().ok()?;
    let wanted = NameId::new(name_id);

    let candidates: Vec<((u16, u16, u16), String)> = name
        .name_record()
        .iter()
        .filter(|record| record.name_id() == wanted)
        .filter_map(|record| {
            let string = record.string(name.string_data()).ok()?;
            let key = (record.platform_id(), record.encoding_id(), record.language_id());
            Some((key, string.chars().collect()))
        })
        .collect();

    let pick = |pred: &dyn Fn(&(u16, u16, u16)) -> bool| {
        candidates.iter().find(|(key, _)| pred(key)).map(|(_, s)| s.clone())
    };

    pick(&|key| *key == WINDOWS_ENGLISH)
        .or_else(|| pick(&|key| key.0 == WINDOWS_ENGLISH.0))
        .or_else(|| pick(&|key| *key == MAC_ENGLISH))
        .or_else(|| candidates.first().map(|(_, s)| s.clone()))
}

/// Build a name table holding `entries` for each `(platform, encoding, language)` triple.
///
/// Records are emitted in platform order, then name ID order.
pub fn build_name_table(platforms: &[(u16, u16, u16)], entries: &[(u16, String)]) -> Name {
    let mut records = Vec::with_capacity(platforms.len() * entries.len());
    for &(platform_id, encoding_id, language_id) in platforms {
        for (name_id, value) in entries {
            records.push(NameRecord::new(
                platform_id,
                encoding_id,
                language_id,
                NameId::new(*name_id),
                value.clone().into(),
            ));
        }
    }
    Name::new(records)
}

/// List the table tags present in font data.
pub fn table_tags(data: &[u8]) -> Result<Vec<Tag>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    Ok(font.table_directory.table_records().iter().map(|r| r.tag()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font_with_names(records: Vec<(u16, u16, u16, u16, &str)>) -> Vec<u8> {
        let records = records
            .into_iter()
            .map(|(platform, encoding, language, id, value)| {
                NameRecord::new(platform, encoding, language, NameId::new(id), value.to_string().into())
            })
            .collect::<Vec<_>>();
        let mut builder = FontBuilder::new();
        builder.add_table(&Name::new(records)).unwrap();
        builder.build()
    }

    #[test]
    fn test_build_name_table_covers_platforms() {
        let name = build_name_table(
            &[MAC_ENGLISH, WINDOWS_ENGLISH],
            &[(1, "Firple".to_string()), (2, "Regular".to_string())],
        );
        let mut builder = FontBuilder::new();
        builder.add_table(&name).unwrap();
        let data = builder.build();
        let font = FontRef::new(&data).unwrap();

        assert_eq!(font.name().unwrap().name_record().len(), 4);
        assert_eq!(name_string(&font, 1).as_deref(), Some("Firple"));
        assert_eq!(name_string(&font, 2).as_deref(), Some("Regular"));
    }

    #[test]
    fn test_name_string_prefers_windows_english() {
        let data = font_with_names(vec![
            (1, 0, 0, 0, "mac copyright"),
            (3, 1, 0x409, 0, "windows copyright"),
        ]);
        let font = FontRef::new(&data).unwrap();
        assert_eq!(name_string(&font, 0).as_deref(), Some("windows copyright"));
    }

    #[test]
    fn test_name_string_falls_back_to_mac() {
        let data = font_with_names(vec![(1, 0, 0, 0, "mac copyright")]);
        let font = FontRef::new(&data).unwrap();
        assert_eq!(name_string(&font, 0).as_deref(), Some("mac copyright"));
        assert_eq!(name_string(&font, 1), None);
    }

    #[test]
    fn test_rewrite_font_keeps_tables() {
        let data = font_test_data::CMAP12_FONT1;
        let before = table_tags(data).unwrap();
        let rewritten = rewrite_font(data, |_, _| Ok(())).unwrap();
        assert_eq!(table_tags(&rewritten).unwrap(), before);
    }

    #[test]
    fn test_copy_tables_except_skips() {
        let data = font_test_data::CMAP12_FONT1;
        let font = FontRef::new(data).unwrap();
        let mut builder = FontBuilder::new();
        copy_tables_except(&font, &mut builder, &[Tag::new(b"cmap")]);
        let tags = table_tags(&builder.build()).unwrap();
        assert!(!tags.contains(&Tag::new(b"cmap")));
    }
}
