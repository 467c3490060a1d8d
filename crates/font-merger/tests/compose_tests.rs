//! Reconciliation and rule transfer over small in-memory fonts

use firple_font_merger::{
    Codepoint, FontAsset, SubstRule, VariationSequence, Variations, reconcile,
    testing::{TestFont, TestGlyph},
    transfer_rules,
};
use read_fonts::{FontRef, TableProvider, types::Tag};

fn base_font() -> Vec<u8> {
    TestFont::new(vec![
        TestGlyph::boxed("A", &[0x41], 600, 50.0),
        TestGlyph::boxed("a", &[0x61], 600, 60.0),
        TestGlyph::boxed("uni300C", &[0x300C], 600, 70.0),
        TestGlyph::empty("space", &[0x20], 600),
    ])
    .copyright("Base copyright")
    .build()
}

fn donor_font() -> Vec<u8> {
    TestFont::new(vec![
        TestGlyph::boxed("A", &[0x41], 300, 10.0),
        TestGlyph::boxed("uni3042", &[0x3042], 500, 20.0),
        TestGlyph::boxed("uni3044", &[0x3044], 500, 30.0),
        TestGlyph::boxed("uni300C", &[0x300C], 500, 40.0),
        TestGlyph::boxed("a.alt", &[], 300, 10.0),
        TestGlyph::boxed("kana.alt", &[], 500, 10.0),
        TestGlyph::boxed("uni3042.italic", &[], 500, 10.0),
        TestGlyph::boxed("uni3042_uni3044", &[], 500, 10.0),
        TestGlyph::boxed("uni3042_A", &[], 500, 10.0),
        TestGlyph::boxed("uni3042.ss01", &[], 500, 15.0),
        TestGlyph::boxed("A.vert", &[], 300, 15.0),
        TestGlyph::boxed("a", &[], 300, 15.0),
        TestGlyph::boxed("uni3042.jp90", &[], 500, 25.0),
    ])
    .copyright("Donor copyright")
    .ligatures(
        b"liga",
        &[(&["uni3042", "uni3044"], "uni3042_uni3044"), (&["uni3042", "A"], "uni3042_A")],
    )
    .single_subst(b"ss01", &[("uni3042", "uni3042.ss01")])
    .single_subst(b"vert", &[("A", "A.vert")])
    .variation(0x3042, 0xE0100, None)
    .variation(0x3042, 0xE0101, Some("uni3042.jp90"))
    .variation(0x41, 0xFE00, None)
    .variation(0x3044, 0xE0101, Some("a.alt"))
    .build()
}

fn compose(overrides: &[Codepoint]) -> (FontAsset, FontAsset) {
    let mut base = FontAsset::from_bytes(base_font()).expect("load base");
    let donor = FontAsset::from_bytes(donor_font()).expect("load donor");
    let reconciliation = reconcile(&mut base, &donor, overrides).expect("reconcile");
    transfer_rules(&mut base, &donor, &reconciliation).expect("transfer");
    (base, donor)
}

/// Rules registered under `tag` once `base` has been compiled and read back.
fn compiled_rules(base: &FontAsset, tag: &[u8; 4]) -> Vec<SubstRule> {
    let reloaded = FontAsset::from_bytes(base.to_bytes().unwrap()).unwrap();
    reloaded
        .donor_lookups()
        .unwrap()
        .into_iter()
        .filter(|lookup| lookup.tags.contains(&Tag::new(tag)))
        .flat_map(|lookup| lookup.rules.rules)
        .collect()
}

#[test]
fn test_encoded_donor_glyphs_are_copied() {
    let mut base = FontAsset::from_bytes(base_font()).unwrap();
    let donor = FontAsset::from_bytes(donor_font()).unwrap();
    let base_glyphs = base.num_glyphs();

    let result = reconcile(&mut base, &donor, &[]).unwrap();

    let hiragana_a = base.gid_by_codepoint(Codepoint::new(0x3042)).expect("U+3042 copied");
    assert!(hiragana_a.to_usize() >= base_glyphs, "copied glyphs are appended");
    assert_eq!(base.glyph(hiragana_a).unwrap().advance, 500);
    assert!(result.copied.iter().any(|name| name == "uni3042"));
    assert!(base.contains_codepoint(Codepoint::new(0x3044)));
}

#[test]
fn test_shared_codepoints_keep_base_outline() {
    let original = FontAsset::from_bytes(base_font()).unwrap();
    let (base, _) = compose(&[]);

    let cp = Codepoint::new(0x41);
    let before = original.glyph(original.gid_by_codepoint(cp).unwrap()).unwrap();
    let after = base.glyph(base.gid_by_codepoint(cp).unwrap()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_override_takes_base_slot() {
    let original = FontAsset::from_bytes(base_font()).unwrap();
    let donor = FontAsset::from_bytes(donor_font()).unwrap();
    let (base, _) = compose(&[Codepoint::new(0x300C)]);

    let cp = Codepoint::new(0x300C);
    let slot = base.gid_by_codepoint(cp).unwrap();
    assert_eq!(slot, original.gid_by_codepoint(cp).unwrap());

    let donor_glyph = donor.glyph(donor.gid_by_codepoint(cp).unwrap()).unwrap();
    let glyph = base.glyph(slot).unwrap();
    assert_eq!(glyph.outline, donor_glyph.outline);
    assert_eq!(glyph.advance, 500);
}

#[test]
fn test_override_missing_from_donor_is_an_error() {
    let mut base = FontAsset::from_bytes(base_font()).unwrap();
    let donor = FontAsset::from_bytes(donor_font()).unwrap();
    assert!(reconcile(&mut base, &donor, &[Codepoint::new(0x300D)]).is_err());
}

#[test]
fn test_unencoded_glyph_rules() {
    let (base, _) = compose(&[]);

    // Alternate of an existing base glyph.
    assert!(!base.contains_name("a.alt"));
    // Alternate whose base form is new.
    assert!(base.contains_name("kana.alt"));
    // Donor style suffix.
    assert!(!base.contains_name("uni3042.italic"));
    // Ligature glyph.
    assert!(base.contains_name("uni3042_uni3044"));
    // Unencoded name already present in the base.
    assert_eq!(base.glyphs().iter().filter(|g| g.name.base_form() == "a").count(), 1);
}

#[test]
fn test_colliding_name_is_renamed() {
    let mut base = FontAsset::from_bytes(
        TestFont::new(vec![TestGlyph::boxed("uni3042", &[0x41], 600, 50.0)]).build(),
    )
    .unwrap();
    let donor = FontAsset::from_bytes(
        TestFont::new(vec![TestGlyph::boxed("uni3042", &[0x3042], 500, 20.0)]).build(),
    )
    .unwrap();

    let result = reconcile(&mut base, &donor, &[]).unwrap();

    assert_eq!(result.copied.len(), 1);
    assert_eq!(result.copied[0], "uni3042.1");
    let gid = base.gid_by_codepoint(Codepoint::new(0x3042)).unwrap();
    assert_eq!(base.glyph(gid).unwrap().name, "uni3042.1");
}

#[test]
fn test_rules_are_transferred() {
    let (base, _) = compose(&[]);
    let data = base.to_bytes().expect("compile");
    let font = FontRef::new(&data).unwrap();
    let gsub = font.gsub().expect("gsub");
    let features = gsub.feature_list().unwrap();

    let tags: Vec<Tag> = features.feature_records().iter().map(|r| r.feature_tag()).collect();
    assert!(tags.contains(&Tag::new(b"liga")));
    assert!(tags.contains(&Tag::new(b"vert")));
    assert!(!tags.contains(&Tag::new(b"ss01")));

    let scripts = gsub.script_list().unwrap();
    let records = scripts.script_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].script_tag(), Tag::new(b"DFLT"));
}

#[test]
fn test_compiled_font_round_trips() {
    let (base, _) = compose(&[Codepoint::new(0x300C)]);
    let data = base.to_bytes().unwrap();
    let reloaded = FontAsset::from_bytes(data).unwrap();

    assert_eq!(reloaded.num_glyphs(), base.num_glyphs());
    for (before, after) in base.glyphs().iter().zip(reloaded.glyphs()) {
        assert_eq!(before.name, after.name);
        assert_eq!(before.advance, after.advance);
    }
    assert!(reloaded.contains_codepoint(Codepoint::new(0x3042)));
    assert_eq!(reloaded.copyright().as_deref(), Some("Base copyright"));
}

#[test]
fn test_ligature_with_uncopied_component_is_dropped() {
    let (base, _) = compose(&[]);
    let gid = |name: &str| base.gid_by_name(name).unwrap();

    let rules = compiled_rules(&base, b"liga");
    assert_eq!(
        rules,
        vec![SubstRule::Ligature {
            ligature: gid("uni3042_uni3044"),
            components: vec![gid("uni3042"), gid("uni3044")],
        }]
    );
    // The ligature glyph itself is still copied, only its rule is dropped.
    assert!(base.contains_name("uni3042_A"));
}

#[test]
fn test_rule_on_existing_glyph_attaches_to_base_glyph() {
    let original = FontAsset::from_bytes(base_font()).unwrap();
    let (base, _) = compose(&[]);
    let base_a = original.gid_by_codepoint(Codepoint::new(0x41)).unwrap();

    let rules = compiled_rules(&base, b"vert");
    assert_eq!(
        rules,
        vec![SubstRule::Single {
            target: base_a,
            replacement: base.gid_by_name("A.vert").unwrap(),
        }]
    );
    assert_eq!(base.gid_by_codepoint(Codepoint::new(0x41)), Some(base_a));
}

#[test]
fn test_variation_sequences_follow_copied_glyphs() {
    let (base, donor) = compose(&[]);
    assert_eq!(donor.variations().len(), 4);

    let sequence =
        |cp, selector| VariationSequence::new(Codepoint::new(cp), Codepoint::new(selector));
    let expected: Variations = [
        (sequence(0x3042, 0xE0100), None),
        (sequence(0x3042, 0xE0101), Some(base.gid_by_name("uni3042.jp90").unwrap())),
    ]
    .into_iter()
    .collect();
    // U+0041 keeps the base glyph and a.alt was never copied.
    assert_eq!(base.variations(), &expected);

    let reloaded = FontAsset::from_bytes(base.to_bytes().unwrap()).unwrap();
    assert_eq!(reloaded.variations(), &expected);
}
