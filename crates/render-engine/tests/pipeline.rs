use std::io::{Cursor, Read};
use std::path::PathBuf;

use cueframe_common::{CueframeError, OutputFormat, RenderConfig};
use cueframe_render_engine::canvas::decode_artifact;
use cueframe_render_engine::{
    convert_cues, convert_document, RasterFailureKind, RenderContext, ResolvedFont,
};
use cueframe_subtitle_model::Cue;
use proptest::prelude::*;
use zip::ZipArchive;

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join(name);
    std::fs::read(path).expect("fixture should be readable")
}

fn context(config: RenderConfig) -> RenderContext {
    let size = config.font_size;
    RenderContext::new(config, ResolvedFont::builtin(size)).expect("valid config")
}

fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).expect("archive should open");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("entry").name().to_string())
        .collect()
}

#[test]
fn arabic_cue_and_empty_cue_produce_one_entry() {
    let ctx = context(RenderConfig::default());
    let doc = "1\n00:00:01,000 --> 00:00:02,000\nمرحبا\n\n2\n00:00:03,000 --> 00:00:04,000\n\n";

    let conversion = convert_document(doc.as_bytes(), Some("upload.srt"), &ctx).unwrap();

    assert_eq!(conversion.total, 2);
    assert_eq!(conversion.rendered, vec!["subtitle_0001.tiff"]);
    assert_eq!(entry_names(&conversion.archive), vec!["subtitle_0001.tiff"]);
    assert_eq!(conversion.skipped.len(), 1);
    assert_eq!(conversion.skipped[0].cue_index, 2);
    assert!(matches!(
        conversion.skipped[0].kind,
        RasterFailureKind::NoRenderableContent
    ));
}

#[test]
fn invalid_utf8_fails_before_rendering() {
    let ctx = context(RenderConfig::default());
    let err = convert_document(b"1\n00:00:01,000 --> 00:00:02,000\n\xc3\x28\n", None, &ctx)
        .unwrap_err();
    assert!(matches!(err, CueframeError::Encoding { .. }));
}

#[test]
fn all_blank_document_is_an_empty_archive() {
    let ctx = context(RenderConfig::default());
    let doc = "1\n00:00:01,000 --> 00:00:02,000\n   \n";
    let err = convert_document(doc.as_bytes(), None, &ctx).unwrap_err();
    assert!(matches!(err, CueframeError::EmptyArchive { attempted: 1 }));
    assert!(err.is_client_error());
}

#[test]
fn srt_fixture_round_trip() {
    let ctx = context(RenderConfig::default());
    let conversion = convert_document(&fixture("sample.srt"), Some("sample.srt"), &ctx).unwrap();

    assert_eq!(conversion.total, 4);
    assert_eq!(
        entry_names(&conversion.archive),
        vec![
            "subtitle_0001.tiff",
            "subtitle_0002.tiff",
            "subtitle_0004.tiff"
        ]
    );

    let mut zip = ZipArchive::new(Cursor::new(&conversion.archive)).unwrap();
    let mut bytes = Vec::new();
    zip.by_name("subtitle_0002.tiff")
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    let frame = decode_artifact(&bytes).unwrap();
    assert_eq!(frame.dimensions(), (720, 480));
}

#[test]
fn ass_fixture_with_png_output() {
    let ctx = context(RenderConfig {
        format: OutputFormat::Png,
        ..RenderConfig::default()
    });
    let conversion = convert_document(&fixture("sample.ass"), Some("sample.ass"), &ctx).unwrap();

    assert_eq!(conversion.total, 3);
    assert_eq!(
        conversion.rendered,
        vec!["subtitle_0001.png", "subtitle_0002.png"]
    );
    assert_eq!(conversion.skipped[0].cue_index, 3);
}

#[test]
fn parse_errors_are_reported_as_such() {
    let ctx = context(RenderConfig::default());
    let err = convert_document(b"[Script Info]\nTitle: x\n", Some("x.ass"), &ctx).unwrap_err();
    assert!(matches!(err, CueframeError::Parse { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn archive_holds_exactly_the_rendered_cues(blank in prop::collection::vec(any::<bool>(), 1..8)) {
        let ctx = context(RenderConfig {
            width: 160,
            height: 90,
            font_size: 12.0,
            format: OutputFormat::Png,
            ..RenderConfig::default()
        });
        let cues: Vec<Cue> = blank
            .iter()
            .enumerate()
            .map(|(i, &empty)| Cue::from_text(i + 1, if empty { "" } else { "cue" }))
            .collect();
        let expected: Vec<String> = blank
            .iter()
            .enumerate()
            .filter(|(_, empty)| !**empty)
            .map(|(i, _)| format!("subtitle_{:04}.png", i + 1))
            .collect();

        match convert_cues(&cues, &ctx) {
            Ok(conversion) => {
                prop_assert_eq!(entry_names(&conversion.archive), expected.clone());
                prop_assert_eq!(conversion.rendered, expected);
                prop_assert_eq!(conversion.skipped.len(), blank.iter().filter(|b| **b).count());
            }
            Err(CueframeError::EmptyArchive { attempted }) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(attempted, cues.len());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
