use firple_font_merger::testing::{TestFont, TestGlyph};
use firple_font_metadata::{
    CoverageRanges, FontMetadata, FontNames, FontVersion, ItalicSettings, LanguageTags,
    MonospaceSettings, SourceInfo,
};
use read_fonts::{FontRead, FontRef, TableProvider, tables::meta::Meta, types::Tag};

fn names() -> FontNames {
    FontNames {
        copyright: "Copyright 2021 negset; Base copyright; Donor copyright".into(),
        family: "Firple".into(),
        subfamily: "Italic".into(),
        full_name: "Firple Italic".into(),
        postscript_name: "Firple-Italic".into(),
        version: FontVersion::new("6.400"),
    }
}

fn metadata(italic: Option<ItalicSettings>) -> FontMetadata {
    FontMetadata {
        names: names(),
        languages: LanguageTags {
            design: ["Hani", "Hira", "Hrkt", "Jpan", "Kana"].map(String::from).to_vec(),
            supported: ["Hani", "Hira", "Hrkt", "Jpan", "Kana", "Latn"].map(String::from).to_vec(),
        },
        ranges: CoverageRanges { unicode: [3, 0, 0, 0], code_pages: [0x20001, 0] },
        monospace: MonospaceSettings::new(510),
        italic,
    }
}

fn font() -> Vec<u8> {
    TestFont::new(vec![TestGlyph::boxed("A", &[0x41], 600, 50.0)]).build()
}

fn name(font: &FontRef, id: u16) -> Option<String> {
    firple_font_ops::name_string(font, id)
}

#[test]
fn test_source_info() {
    let data = TestFont::new(vec![])
        .copyright("Source copyright")
        .x_avg_char_width(612)
        .unicode_ranges([5, 6, 7, 8], [9, 10])
        .build();
    let info = SourceInfo::read(&data).unwrap();
    assert_eq!(info.copyright, "Source copyright");
    assert_eq!(info.x_avg_char_width, 612);
    assert_eq!(info.ranges, CoverageRanges { unicode: [5, 6, 7, 8], code_pages: [9, 10] });
}

#[test]
fn test_upright_metadata() {
    let data = metadata(None).apply(&font()).unwrap();
    let font = FontRef::new(&data).unwrap();

    let name_table = font.name().unwrap();
    assert_eq!(name_table.name_record().len(), 14);
    assert_eq!(name(&font, 1).as_deref(), Some("Firple"));
    assert_eq!(name(&font, 3).as_deref(), Some("6.400;Firple-Italic"));
    assert_eq!(name(&font, 5).as_deref(), Some("Version 6.400"));
    assert_eq!(name(&font, 6).as_deref(), Some("Firple-Italic"));

    let os2 = font.os2().unwrap();
    assert_eq!(os2.x_avg_char_width(), 510);
    assert_eq!(os2.panose_10()[0], 2);
    assert_eq!(os2.panose_10()[3], 9);
    assert_eq!(os2.ul_unicode_range_1(), 3);
    assert_eq!(os2.ul_code_page_range_1(), Some(0x20001));
    assert_eq!(os2.fs_selection().bits() & 1, 0);

    let post = font.post().unwrap();
    assert_eq!(post.is_fixed_pitch(), 1);
    assert_eq!(post.italic_angle().to_f64(), 0.0);

    assert!((font.head().unwrap().font_revision().to_f64() - 6.4).abs() < 0.0001);

    let meta = Meta::read(font.table_data(Tag::new(b"meta")).unwrap()).unwrap();
    assert_eq!(meta.data_maps().len(), 2);
}

#[test]
fn test_italic_metadata() {
    let italic = ItalicSettings { angle: 12.0, caret_offset: -100 };
    let data = metadata(Some(italic)).apply(&font()).unwrap();
    let font = FontRef::new(&data).unwrap();

    let fs_selection = font.os2().unwrap().fs_selection().bits();
    assert_eq!(fs_selection & (1 << 6), 0, "REGULAR cleared");
    assert_eq!(fs_selection & 1, 1, "ITALIC set");
    assert_eq!(font.head().unwrap().mac_style().bits() & (1 << 1), 1 << 1);
    assert_eq!(font.post().unwrap().italic_angle().to_f64(), -12.0);

    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.caret_slope_rise(), 908);
    assert_eq!(hhea.caret_slope_run(), 193);
    assert_eq!(hhea.caret_offset(), -100);
}

#[test]
fn test_metadata_is_deterministic() {
    let first = metadata(None).apply(&font()).unwrap();
    let second = metadata(None).apply(&font()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_real_font() {
    let data = metadata(None).apply(font_test_data::VAZIRMATN_VAR).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(name(&font, 4).as_deref(), Some("Firple Italic"));
    assert_eq!(font.post().unwrap().is_fixed_pitch(), 1);
}
