use cueframe_subtitle_model::srt::parse_srt;
use cueframe_subtitle_model::ParseError;
use proptest::prelude::*;

fn render_srt(blocks: &[Vec<String>]) -> String {
    let mut out = String::new();
    for (i, lines) in blocks.iter().enumerate() {
        out.push_str(&format!("{}\n", i + 1));
        out.push_str(&format!("00:00:{:02},000 --> 00:00:{:02},500\n", i % 60, i % 60));
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

proptest! {
    #[test]
    fn parser_never_panics(input in "\\PC{0,200}") {
        let _ = parse_srt(&input);
    }

    #[test]
    fn oversized_hours_are_reported_not_panicked(hours in 1u64 << 40.., minutes in 0u64..60) {
        let doc = format!("1\n{hours}:{minutes:02}:00,000 --> {hours}:{minutes:02}:01,000\nHi\n");
        // Anything that overflows milliseconds must come back as an error.
        match parse_srt(&doc) {
            Ok(cues) => prop_assert!(hours <= u64::MAX / 3_600_000 && cues.len() == 1),
            Err(err) => prop_assert!(
                matches!(err, ParseError::InvalidTiming { line: 2, .. }),
                "unexpected error {:?}", err
            ),
        }
    }

    #[test]
    fn well_formed_documents_keep_every_cue_in_order(
        blocks in prop::collection::vec(
            prop::collection::vec("[a-zA-Z\u{0621}-\u{064A} ]{0,12}[a-zA-Z\u{0621}-\u{064A}]", 0..3),
            0..20,
        )
    ) {
        let cues = parse_srt(&render_srt(&blocks)).unwrap();
        prop_assert_eq!(cues.len(), blocks.len());
        for (i, (cue, lines)) in cues.iter().zip(&blocks).enumerate() {
            prop_assert_eq!(cue.index, i + 1);
            let expected: Vec<String> = lines.iter().map(|l| l.trim_end().to_string()).collect();
            prop_assert_eq!(&cue.lines, &expected);
        }
    }
}
