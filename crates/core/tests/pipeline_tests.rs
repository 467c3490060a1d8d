use std::{
    fs,
    path::{Path, PathBuf},
};

use firple_core::{
    BuildError, BuildOptions, OutputFormat, build,
    config::{FEATURE_GLYPHS, ITALIC_GLYPHS},
};
use firple_font_merger::{
    Codepoint, FontAsset,
    testing::{TestFont, TestGlyph},
};
use read_fonts::{FontRef, TableProvider, types::Tag};
use tempfile::TempDir;

const ARTWORK: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 600 800">
  <path d="M100 100 L500 100 L500 700 L100 700 Z"/>
</svg>"#;

fn base_font() -> Vec<u8> {
    let mut glyphs = vec![TestGlyph::boxed("A", &[0x41], 600, 50.0)];
    for name in ITALIC_GLYPHS {
        let cp = name.chars().next().unwrap() as u32;
        glyphs.push(TestGlyph::boxed(name, &[cp], 600, 60.0));
    }
    glyphs.push(TestGlyph::boxed("uni300C", &[0x300C], 600, 200.0));
    glyphs.push(TestGlyph::boxed("uni300D", &[0x300D], 600, 200.0));
    TestFont::new(glyphs).copyright("Fira copyright").x_avg_char_width(600).build()
}

fn donor_font() -> Vec<u8> {
    let mut glyphs = vec![
        TestGlyph::boxed("A", &[0x41], 500, 40.0),
        TestGlyph::boxed("uni3042", &[0x3042], 300, 20.0),
        TestGlyph::boxed("uni300C", &[0x300C], 1000, 100.0),
        TestGlyph::boxed("uni300D", &[0x300D], 1000, 100.0),
    ];
    for (_, names) in FEATURE_GLYPHS {
        for name in *names {
            let cp = u32::from_str_radix(&name[3..], 16).unwrap();
            glyphs.push(TestGlyph::boxed(name, &[cp], 1000, 80.0));
        }
    }
    TestFont::new(glyphs)
        .typo_ascender(880)
        .copyright("Plex copyright")
        .unicode_ranges([0, 0x28000000, 0, 0], [0x20000, 0])
        .build()
}

/// A source directory with Regular sources and all artwork.
fn source_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path();
    fs::write(src.join("FiraCode-Regular.ttf"), base_font()).unwrap();
    fs::write(src.join("IBMPlexSansJP-Regular.ttf"), donor_font()).unwrap();

    let italic = src.join("italic/Regular");
    fs::create_dir_all(&italic).unwrap();
    for name in ITALIC_GLYPHS {
        fs::write(italic.join(format!("{name}.svg")), ARTWORK).unwrap();
    }
    for (tag, names) in FEATURE_GLYPHS {
        let dir = src.join(tag).join("Regular");
        fs::create_dir_all(&dir).unwrap();
        for name in *names {
            fs::write(dir.join(format!("{name}.{tag}.svg")), ARTWORK).unwrap();
        }
    }
    dir
}

fn options(src: &Path, work: &Path) -> BuildOptions {
    BuildOptions {
        src_dir: src.to_path_buf(),
        out_dir: work.join("out"),
        tmp_dir: work.join("tmp"),
        nerd: false,
        hinting: false,
        ..Default::default()
    }
}

fn build_one(options: &BuildOptions, italic: bool) -> PathBuf {
    let style = options.style(false, false, italic);
    let outputs = build(options, &[style]).unwrap();
    assert_eq!(outputs.len(), 1);
    outputs.into_iter().next().unwrap()
}

#[test]
fn test_regular_build() {
    let src = source_dir();
    let work = tempfile::tempdir().unwrap();
    let options = options(src.path(), work.path());

    let output = build_one(&options, false);
    assert_eq!(output, work.path().join("out/Firple-Regular.ttf"));

    let data = fs::read(&output).unwrap();
    let asset = FontAsset::from_bytes(data.clone()).unwrap();
    let half = asset.glyph(asset.gid_by_codepoint(Codepoint::new(0x41)).unwrap()).unwrap().advance;
    assert_eq!(half, 600);

    let hiragana = asset.glyph(asset.gid_by_codepoint(Codepoint::new(0x3042)).unwrap()).unwrap();
    assert_eq!(hiragana.advance, half);
    let bracket = asset.glyph(asset.gid_by_codepoint(Codepoint::new(0x300C)).unwrap()).unwrap();
    assert_eq!(bracket.advance, half * 2);

    assert!(asset.contains_name("uni3000.cv33"));
    assert!(asset.contains_name("uni3071.ss11"));
    let tags: Vec<Tag> = asset.gsub().feature_tags().collect();
    assert!(tags.contains(&Tag::new(b"cv33")));
    assert!(tags.contains(&Tag::new(b"ss11")));

    let font = FontRef::new(&data).unwrap();
    assert_eq!(firple_font_ops::name_string(&font, 1).as_deref(), Some("Firple"));
    assert_eq!(
        firple_font_ops::name_string(&font, 0).as_deref(),
        Some("Copyright 2021 negset; Fira copyright; Plex copyright")
    );
    let os2 = font.os2().unwrap();
    assert_eq!(os2.fs_selection().bits() & 1, 0);
    assert_eq!(os2.ul_unicode_range_2(), 0x28000000);
    assert_eq!(font.post().unwrap().italic_angle().to_f64(), 0.0);

    assert!(!work.path().join("tmp").exists());
}

#[test]
fn test_italic_build() {
    let src = source_dir();
    let work = tempfile::tempdir().unwrap();
    let output = build_one(&options(src.path(), work.path()), true);
    assert_eq!(output.file_name().unwrap(), "Firple-Italic.ttf");

    let data = fs::read(&output).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(font.post().unwrap().italic_angle().to_f64(), -12.0);
    let selection = font.os2().unwrap().fs_selection().bits();
    assert_eq!(selection & 1, 1);
    assert_eq!(selection & (1 << 6), 0);
    assert_eq!(font.head().unwrap().mac_style().bits() & 2, 2);

    let hhea = font.hhea().unwrap();
    assert_eq!((hhea.caret_slope_rise(), hhea.caret_slope_run()), (908, 193));
    assert_eq!(hhea.caret_offset(), -100);
}

#[test]
fn test_missing_source_aborts() {
    let src = source_dir();
    let donor = src.path().join("IBMPlexSansJP-Regular.ttf");
    fs::remove_file(&donor).unwrap();
    let work = tempfile::tempdir().unwrap();
    let options = options(src.path(), work.path());

    let err = build(&options, &[options.style(false, false, false)]).unwrap_err();
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingAssets { paths, .. }) => assert_eq!(paths, &vec![donor]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!work.path().join("out/Firple-Regular.ttf").exists());
}

#[test]
fn test_builds_are_reproducible() {
    let src = source_dir();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let a = fs::read(build_one(&options(src.path(), first.path()), true)).unwrap();
    let b = fs::read(build_one(&options(src.path(), second.path()), true)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_frozen_feature() {
    let src = source_dir();
    let created_dir = tempfile::tempdir().unwrap();
    let frozen_dir = tempfile::tempdir().unwrap();
    let frozen_options = BuildOptions {
        frozen_features: ["ss11".to_string()].into_iter().collect(),
        ..options(src.path(), frozen_dir.path())
    };

    let load = |options: &BuildOptions| {
        FontAsset::from_bytes(fs::read(build_one(options, false)).unwrap()).unwrap()
    };
    let created = load(&options(src.path(), created_dir.path()));
    let frozen = load(&frozen_options);

    assert!(!frozen.contains_name("uni3071.ss11"));
    assert!(frozen.contains_name("uni3000.cv33"));
    let tags: Vec<Tag> = frozen.gsub().feature_tags().collect();
    assert!(!tags.contains(&Tag::new(b"ss11")));
    assert!(tags.contains(&Tag::new(b"cv33")));
    assert_eq!(frozen.gsub().lookups().len() + 1, created.gsub().lookups().len());

    // The default glyph carries the alternate's outline at its own advance.
    let default = created.glyph_by_name("uni3071").unwrap();
    let alternate = created.glyph_by_name("uni3071.ss11").unwrap();
    let frozen_glyph = frozen.glyph_by_name("uni3071").unwrap();
    assert_eq!(frozen_glyph.outline, alternate.outline);
    assert_ne!(frozen_glyph.outline, default.outline);
    assert_eq!(frozen_glyph.advance, default.advance);
}

#[test]
fn test_keep_tmp_files() {
    let src = source_dir();
    let work = tempfile::tempdir().unwrap();
    let options = BuildOptions { keep_tmp: true, ..options(src.path(), work.path()) };
    build_one(&options, false);

    let tmp = work.path().join("tmp");
    assert!(tmp.join("Tmp-Regular.ttf").exists());
    let control = fs::read_to_string(tmp.join("Firple-Regular-control.txt")).unwrap();
    assert!(control.starts_with("none dflt @ "));
    assert!(control.contains("uni3042"));

    let intermediate = fs::read(tmp.join("Tmp-Regular.ttf")).unwrap();
    let font = FontRef::new(&intermediate).unwrap();
    assert_eq!(firple_font_ops::name_string(&font, 1).as_deref(), Some("Tmp"));
}

#[test]
fn test_woff_output() {
    let src = source_dir();
    let work = tempfile::tempdir().unwrap();
    let options = BuildOptions { format: OutputFormat::Woff, ..options(src.path(), work.path()) };

    let output = build_one(&options, false);
    assert_eq!(output.extension().unwrap(), "woff");
    assert_eq!(&fs::read(output).unwrap()[..4], b"wOFF");
}
