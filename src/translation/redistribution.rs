/*!
 * Redistribution of a translated sentence over the original line slots.
 *
 * A sentence group is translated with a single request, but the output file
 * must keep the per-cue timing layout. The translated text is re-partitioned
 * into as many lines as the group had originally, splitting or merging lines
 * as needed, then handed back cue by cue.
 */

use log::trace;

use crate::subtitle_processor::Cue;
use super::grouping::SentenceGroup;

/// Split translated text into trimmed, non-empty lines
pub fn translated_lines(translated_text: &str) -> Vec<String> {
    translated_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Index of the longest line, the first one wins on equal length
fn longest_line_index(lines: &[String]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, line) in lines.iter().enumerate() {
        let length = line.chars().count();
        if best.is_none_or(|(_, best_length)| length > best_length) {
            best = Some((index, length));
        }
    }
    best.map(|(index, _)| index)
}

/// Split the longest lines in half until `slot_count` lines exist.
///
/// Stops early when the longest line is a single word; the caller then
/// gets fewer lines than slots.
fn split_to_fill(mut lines: Vec<String>, slot_count: usize) -> Vec<String> {
    while !lines.is_empty() && lines.len() < slot_count {
        let Some(index) = longest_line_index(&lines) else {
            break;
        };

        // Any whitespace separates words here, not only single spaces, so a
        // tab-joined line still splits and runs of spaces yield no empty words.
        let words: Vec<&str> = lines[index].split_whitespace().collect();
        if words.len() < 2 {
            trace!("Cannot split single word line '{}', leaving {} slot(s) empty",
                   lines[index], slot_count - lines.len());
            break;
        }

        let head_len = words.len().div_ceil(2);
        let head = words[..head_len].join(" ");
        let tail = words[head_len..].join(" ");
        lines.splice(index..=index, [head, tail]);
    }
    lines
}

/// Fold every line past the last slot into that slot
fn merge_to_fit(mut lines: Vec<String>, slot_count: usize) -> Vec<String> {
    if slot_count == 0 || lines.len() <= slot_count {
        return lines;
    }
    let overflow = lines.split_off(slot_count - 1);
    lines.push(overflow.join(" "));
    lines
}

/// Fit translated lines to exactly the number of slots where possible
pub fn fit_lines(lines: Vec<String>, slot_count: usize) -> Vec<String> {
    if lines.len() < slot_count {
        split_to_fill(lines, slot_count)
    } else {
        merge_to_fit(lines, slot_count)
    }
}

/// Re-partition a translated sentence across the slots of a group.
///
/// Returns one cue per input cue, in the same order, with the same timing and
/// index. Slots left without text are dropped from the cue's lines. This is a
/// pure function of its inputs.
pub fn redistribute(group: &SentenceGroup, translated_text: &str) -> Vec<Cue> {
    let slot_count = group.slot_count();
    let lines = fit_lines(translated_lines(translated_text), slot_count);
    let mut remaining = lines.into_iter();

    group.cues.iter()
        .map(|cue| {
            let text_lines = (0..cue.slot_count())
                .map(|_| remaining.next().unwrap_or_default())
                .filter(|line| !line.is_empty())
                .collect();
            cue.with_text_lines(text_lines)
        })
        .collect()
}
