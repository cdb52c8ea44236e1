/*!
 * Tests for cue parsing, reconstruction and track files
 */

use anyhow::Result;
use vttflow::errors::SubtitleError;
use vttflow::subtitle_processor::{Cue, SubtitleTrack, parse_vtt_string, reconstruct_vtt};
use crate::common;

#[test]
fn test_parse_vtt_string_withSampleFile_shouldAssignSequentialIndices() {
    let cues = parse_vtt_string(common::SAMPLE_VTT);

    assert_eq!(cues.len(), 3);
    let indices: Vec<usize> = cues.iter().map(|c| c.original_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(cues[1].start_time, "00:00:03.000");
    assert_eq!(cues[1].end_time, "00:00:05.500");
    assert_eq!(cues[1].text_lines, vec!["today we are going to look", "at something new."]);
}

#[test]
fn test_parse_vtt_string_withCrlfAndPadding_shouldTrimEverything() {
    let content = "WEBVTT\r\n\r\n  00:00:01.000   -->   00:00:02.000  \r\n   Hello   \r\n";
    let cues = parse_vtt_string(content);

    assert_eq!(cues, vec![Cue::new("00:00:01.000", "00:00:02.000", vec!["Hello".to_string()], 0)]);
}

#[test]
fn test_parse_vtt_string_withEmptyCue_shouldDropItWithoutUsingAnIndex() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n\n00:00:03.000 --> 00:00:04.000\nKept\n";
    let cues = parse_vtt_string(content);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].original_index, 0);
    assert_eq!(cues[0].start_time, "00:00:03.000");
}

#[test]
fn test_parse_vtt_string_withTextBeforeFirstTimestamp_shouldIgnoreIt() {
    let content = "WEBVTT\nKind: captions\n\n00:00:01.000 --> 00:00:02.000\nHi\n";
    let cues = parse_vtt_string(content);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text_lines, vec!["Hi"]);
}

#[test]
fn test_parse_vtt_string_withNoTimestamps_shouldReturnEmpty() {
    assert!(parse_vtt_string("").is_empty());
    assert!(parse_vtt_string("WEBVTT\n\nNo cues here\n").is_empty());
}

#[test]
fn test_reconstruct_vtt_withShuffledCues_shouldOrderByIndex() {
    let cues = vec![common::cue(1, &["second"]), common::cue(0, &["first"])];
    let output = reconstruct_vtt(&cues);

    assert_eq!(
        output,
        "WEBVTT\n\n00:00:00.000 --> 00:00:00.900\nfirst\n\n00:00:01.000 --> 00:00:01.900\nsecond"
    );
}

#[test]
fn test_reconstruct_vtt_thenParse_shouldReproduceCues() {
    let cues = parse_vtt_string(common::SAMPLE_VTT);
    assert_eq!(parse_vtt_string(&reconstruct_vtt(&cues)), cues);
}

#[test]
fn test_reconstruct_vtt_withNoCues_shouldEmitHeaderOnly() {
    assert_eq!(reconstruct_vtt(&[]), "WEBVTT");
}

#[test]
fn test_subtitle_track_from_file_withSampleFile_shouldLoadCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;

    let track = SubtitleTrack::from_file(&path)?;
    assert_eq!(track.cues.len(), 3);
    assert_eq!(track.line_count(), 4);
    assert_eq!(track.source_file, path);
    Ok(())
}

#[test]
fn test_subtitle_track_from_file_withoutCues_shouldReturnNoCuesError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.vtt", "WEBVTT\n")?;

    let error = SubtitleTrack::from_file(&path).unwrap_err();
    assert!(matches!(error.downcast_ref::<SubtitleError>(), Some(SubtitleError::NoCues(_))));
    Ok(())
}

#[test]
fn test_subtitle_track_write_to_vtt_shouldEndWithNewline() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out.vtt");
    let track = SubtitleTrack::new(path.clone(), vec![common::cue(0, &["Hello"])]);

    track.write_to_vtt(&path)?;
    let written = std::fs::read_to_string(&path)?;

    assert!(written.starts_with("WEBVTT\n\n"));
    assert!(written.ends_with("Hello\n"));
    Ok(())
}
