/*!
 * Tests for sentence grouping and translation redistribution
 */

use vttflow::subtitle_processor::{Cue, parse_vtt_string};
use vttflow::translation::grouping::{ends_sentence, group_cues, starts_sentence};
use vttflow::translation::redistribution::{fit_lines, redistribute, translated_lines};
use vttflow::translation::SentenceGroup;
use crate::common::{self, cue};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_sentence_markers_withPunctuationAndCase_shouldClassify() {
    assert!(ends_sentence("Done."));
    assert!(ends_sentence("Really?!"));
    assert!(ends_sentence("And then…  "));
    assert!(!ends_sentence("and then,"));

    assert!(starts_sentence("Next"));
    assert!(starts_sentence("- Who's there?"));
    assert!(starts_sentence("«Bonjour»"));
    assert!(!starts_sentence("next"));
    assert!(!starts_sentence("42 apples"));
}

#[test]
fn test_group_cues_withSampleFile_shouldMergeRunOnSentence() {
    let cues = parse_vtt_string(common::SAMPLE_VTT);
    let groups = group_cues(&cues);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].cues.len(), 2);
    assert_eq!(
        groups[0].combined_text,
        "Welcome back to the channel, today we are going to look at something new."
    );
    assert_eq!(groups[1].combined_text, "Let's get started!");
}

#[test]
fn test_group_cues_withLowercaseAfterPeriod_shouldStayTogether() {
    let cues = vec![cue(0, &["It costs 3.5"]), cue(1, &["million dollars."])];
    let groups = group_cues(&cues);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].slot_count(), 2);
}

#[test]
fn test_group_cues_shouldCoverEveryCueOnceInOrder() {
    let cues: Vec<Cue> = (0..10)
        .map(|i| if i % 3 == 0 { cue(i, &["End."]) } else { cue(i, &["Start of", "something"]) })
        .collect();
    let groups = group_cues(&cues);

    let flattened: Vec<usize> = groups.iter()
        .flat_map(|g| g.cues.iter().map(|c| c.original_index))
        .collect();
    assert_eq!(flattened, (0..10).collect::<Vec<_>>());
    assert!(groups.iter().all(|g| !g.cues.is_empty()));
}

#[test]
fn test_group_cues_withEmptyInput_shouldReturnNoGroups() {
    assert!(group_cues(&[]).is_empty());
}

#[test]
fn test_translated_lines_shouldDropBlankLines() {
    assert_eq!(translated_lines("  A \n\n B\r\n   \n"), lines(&["A", "B"]));
}

#[test]
fn test_fit_lines_withTooManyLines_shouldMergeIntoLastSlot() {
    assert_eq!(fit_lines(lines(&["A", "B", "C"]), 2), lines(&["A", "B C"]));
}

#[test]
fn test_fit_lines_withTooFewLines_shouldSplitLongestLine() {
    assert_eq!(
        fit_lines(lines(&["one two three four"]), 2),
        lines(&["one two", "three four"])
    );
}

#[test]
fn test_fit_lines_withSingleWord_shouldAcceptShortfall() {
    assert_eq!(fit_lines(lines(&["Hi"]), 3), lines(&["Hi"]));
}

#[test]
fn test_redistribute_withSplitSentence_shouldKeepTimingAndSlots() {
    let group = SentenceGroup::new(vec![
        cue(4, &["Welcome back to the channel,"]),
        cue(5, &["today we are going to look", "at something new."]),
    ]);
    let translated = "Bienvenue sur la chaîne,\naujourd'hui nous allons voir\nquelque chose de nouveau.";

    let cues = redistribute(&group, translated);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text_lines, lines(&["Bienvenue sur la chaîne,"]));
    assert_eq!(
        cues[1].text_lines,
        lines(&["aujourd'hui nous allons voir", "quelque chose de nouveau."])
    );
    assert_eq!(cues[1].start_time, group.cues[1].start_time);
    assert_eq!(cues[1].end_time, group.cues[1].end_time);
    assert_eq!(cues[1].original_index, 5);
}

#[test]
fn test_redistribute_withSingleWordIntoThreeSlots_shouldLeaveLaterCuesEmpty() {
    let group = SentenceGroup::new(vec![cue(0, &["Hello"]), cue(1, &["there,"]), cue(2, &["you."])]);
    let cues = redistribute(&group, "Hi");

    assert_eq!(cues[0].text_lines, lines(&["Hi"]));
    assert!(cues[1].text_lines.is_empty());
    assert!(cues[2].text_lines.is_empty());
}

#[test]
fn test_redistribute_shouldNeverExceedOriginalLineCount() {
    let group = SentenceGroup::new(vec![cue(0, &["a", "b"]), cue(1, &["c"])]);
    let answers = ["x", "x y", "x\ny\nz\nw", "one two three four five six", "\n\n"];

    for answer in answers {
        let cues = redistribute(&group, answer);
        for (out, original) in cues.iter().zip(&group.cues) {
            assert!(out.text_lines.len() <= original.text_lines.len(), "answer {:?}", answer);
        }
    }
}
