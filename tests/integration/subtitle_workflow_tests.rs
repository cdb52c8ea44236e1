/*!
 * Integration tests for the parse, group, redistribute, reconstruct workflow
 */

use anyhow::Result;

use vttflow::file_utils::FileManager;
use vttflow::subtitle_processor::{Cue, SubtitleTrack, parse_vtt_string, reconstruct_vtt};
use vttflow::translation::{group_cues, redistribute};
use crate::common;

/// Run the whole pipeline with a synchronous stand-in for the translator
fn translate_with(content: &str, translate: impl Fn(&str) -> String) -> String {
    let cues = parse_vtt_string(content);
    let translated: Vec<Cue> = group_cues(&cues)
        .iter()
        .flat_map(|group| redistribute(group, &translate(&group.combined_text)))
        .collect();
    reconstruct_vtt(&translated)
}

#[test]
fn test_workflow_withIdentityTranslation_shouldKeepTimingAndText() {
    let output = translate_with(common::SAMPLE_VTT, |text| text.to_string());
    let cues = parse_vtt_string(&output);
    let original = parse_vtt_string(common::SAMPLE_VTT);

    assert_eq!(cues.len(), original.len());
    for (out, source) in cues.iter().zip(&original) {
        assert_eq!(out.start_time, source.start_time);
        assert_eq!(out.end_time, source.end_time);
        assert_eq!(out.text_lines.len(), source.text_lines.len());
    }
}

#[test]
fn test_workflow_withLineBreakingTranslator_shouldFitEachCue() {
    let content = "WEBVTT

00:00:01.000 --> 00:00:02.000
I was walking

00:00:02.000 --> 00:00:03.000
down the street.

00:00:04.000 --> 00:00:05.000
Then it rained.
";
    let output = translate_with(content, |text| match text {
        "I was walking down the street." => "Je marchais\ndans la rue.".to_string(),
        "Then it rained." => "Puis il a plu.".to_string(),
        other => other.to_string(),
    });

    assert_eq!(output, "WEBVTT

00:00:01.000 --> 00:00:02.000
Je marchais

00:00:02.000 --> 00:00:03.000
dans la rue.

00:00:04.000 --> 00:00:05.000
Puis il a plu.");
}

#[test]
fn test_workflow_withChattyTranslator_shouldMergeExtraLines() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nYes.\n";
    let output = translate_with(content, |_| "Oui.\n(affirmatif)\n!".to_string());

    assert_eq!(output, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nOui. (affirmatif) !");
}

#[test]
fn test_workflow_withFileOnDisk_shouldWriteParsableOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let output_path = FileManager::generate_output_path(&input, temp_dir.path(), "de", "vtt");

    let track = SubtitleTrack::from_file(&input)?;
    let translated: Vec<Cue> = group_cues(&track.cues)
        .iter()
        .flat_map(|group| redistribute(group, &group.combined_text.to_uppercase()))
        .collect();
    SubtitleTrack::new(output_path.clone(), translated).write_to_vtt(&output_path)?;

    let reloaded = SubtitleTrack::from_file(&output_path)?;
    assert_eq!(reloaded.cues.len(), track.cues.len());
    assert_eq!(reloaded.cues[2].text_lines, vec!["LET'S GET STARTED!"]);
    assert!(output_path.ends_with("talk.de.vtt"));
    Ok(())
}
