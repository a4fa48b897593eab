//! Unit tests for the wire protocol decoder.
//!
//! These tests cover the pure parsing logic: CFG handling, frame length
//! validation, and the row-major reshape, without any serial I/O.

use taxelview::protocol::{parse_line, Decoder, GridConfig, Line};

// ==================== parse_line Tests ====================

#[test]
fn test_cfg_line_parses_dimensions() {
    let line = parse_line("CFG,16,8", None).unwrap();
    assert_eq!(line, Line::Config(GridConfig { rows: 16, cols: 8 }));
}

#[test]
fn test_frame_length_must_match_grid() {
    let config = GridConfig { rows: 2, cols: 3 };

    // rows*cols+2 tokens in total: tag, timestamp, then 6 samples.
    assert!(parse_line("F,100,1,2,3,4,5,6", Some(&config)).is_some());
    assert!(parse_line("F,100,1,2,3,4,5", Some(&config)).is_none());
    assert!(parse_line("F,100,1,2,3,4,5,6,7", Some(&config)).is_none());
    assert!(parse_line("F,100", Some(&config)).is_none());
}

#[test]
fn test_example_session_from_protocol_docs() {
    // CFG,2,3 then F,100,1,2,3,4,5,6 must reshape to [[1,2,3],[4,5,6]].
    let mut decoder = Decoder::new();
    decoder.feed("CFG,2,3");
    let frame = decoder.feed("F,100,1,2,3,4,5,6").unwrap();

    assert_eq!(frame.rows(), 2);
    assert_eq!(frame.cols(), 3);
    assert_eq!(frame.row(0), &[1, 2, 3]);
    assert_eq!(frame.row(1), &[4, 5, 6]);
    assert_eq!(frame.get(0, 0), Some(1));
    assert_eq!(frame.get(1, 2), Some(6));
}

#[test]
fn test_single_row_and_single_column_grids() {
    let row = GridConfig { rows: 1, cols: 4 };
    let Some(Line::Data(frame)) = parse_line("F,5,9,8,7,6", Some(&row)) else {
        panic!("1x4 frame should parse");
    };
    assert_eq!(frame.row(0), &[9, 8, 7, 6]);

    let col = GridConfig { rows: 4, cols: 1 };
    let Some(Line::Data(frame)) = parse_line("F,5,9,8,7,6", Some(&col)) else {
        panic!("4x1 frame should parse");
    };
    assert_eq!(frame.get(3, 0), Some(6));
}

#[test]
fn test_large_timestamps_fit() {
    let config = GridConfig { rows: 1, cols: 1 };
    let Some(Line::Data(frame)) = parse_line("F,18446744073709551615,7", Some(&config)) else {
        panic!("max u64 timestamp should parse");
    };
    assert_eq!(frame.timestamp_us, u64::MAX);
}

// ==================== Decoder Tests ====================

#[test]
fn test_decoder_silently_skips_malformed_input() {
    let mut decoder = Decoder::new();
    for line in [
        "",
        "\r",
        "garbage",
        "CFG",
        "CFG,a,b",
        "F,100,1,2,3,4,5,6", // before CFG
        "CFG,-1,3",
    ] {
        assert!(decoder.feed(line).is_none(), "line {:?} must not produce a frame", line);
    }
    assert!(decoder.config().is_none());
}

#[test]
fn test_hostile_cfg_dimensions_are_skipped_like_any_bad_line() {
    // Dimensions near usize::MAX must not poison the session: the CFG is
    // dropped, no buffer is ever sized from it, and a sane CFG afterwards
    // still configures the grid.
    let mut decoder = Decoder::new();
    decoder.feed("CFG,2,9223372036854775807");
    decoder.feed("F,1,1");
    assert!(decoder.config().is_none());

    decoder.feed("CFG,2,2");
    let frame = decoder.feed("F,9,1,2,3,4").unwrap();
    assert_eq!(frame.row(0), &[1, 2]);
}

#[test]
fn test_decoder_recovers_after_noise() {
    let mut decoder = Decoder::new();
    decoder.feed("## boot banner ##");
    decoder.feed("CFG,2,2");
    decoder.feed("F,1,1,2,3"); // truncated mid-line by a reset
    let frame = decoder.feed("F,2,10,20,30,40").unwrap();
    assert_eq!(frame.row(1), &[30, 40]);
}

#[test]
fn test_second_cfg_does_not_resize() {
    let mut decoder = Decoder::new();
    decoder.feed("CFG,2,2");
    decoder.feed("CFG,3,3");

    // Frames are still validated against the first CFG.
    assert!(decoder.feed("F,1,1,2,3,4,5,6,7,8,9").is_none());
    assert!(decoder.feed("F,1,1,2,3,4").is_some());
}
