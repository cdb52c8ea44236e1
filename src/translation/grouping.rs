/*!
 * Sentence grouping of subtitle cues.
 *
 * Cue boundaries rarely line up with sentence boundaries, so consecutive cues
 * are coalesced into sentence-level groups before anything is translated.
 * A boundary is placed between two cues only when the earlier one ends a
 * sentence and the later one visibly starts a new one.
 */

use crate::subtitle_processor::Cue;

/// Characters that may close a sentence
const TERMINAL_PUNCTUATION: [char; 4] = ['.', '!', '?', '…'];

/// Quotation marks that may open a sentence
const OPENING_QUOTES: [char; 8] = ['"', '“', '”', '„', '«', '\'', '‘', '’'];

/// A contiguous run of cues that forms one sentence (or fragment)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceGroup {
    /// Cues covered by this group, in file order
    pub cues: Vec<Cue>,

    /// Whitespace-normalized text of every line of every cue
    pub combined_text: String,
}

impl SentenceGroup {
    /// Build a group over the given cues
    pub fn new(cues: Vec<Cue>) -> Self {
        let combined_text = combine_text(&cues);
        Self { cues, combined_text }
    }

    /// Total number of line slots across the group's cues
    pub fn slot_count(&self) -> usize {
        self.cues.iter().map(Cue::slot_count).sum()
    }

    /// Index of the first cue in the group
    pub fn first_index(&self) -> Option<usize> {
        self.cues.first().map(|cue| cue.original_index)
    }
}

/// Whether the trimmed line ends with terminal punctuation
pub fn ends_sentence(line: &str) -> bool {
    line.trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| TERMINAL_PUNCTUATION.contains(&c))
}

/// Whether the trimmed line opens with an uppercase letter, a hyphen or a quote
pub fn starts_sentence(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c == '-' || OPENING_QUOTES.contains(&c))
}

fn is_boundary(previous: &Cue, next: &Cue) -> bool {
    let last_line = previous.text_lines.last().map(String::as_str).unwrap_or("");
    let first_line = next.text_lines.first().map(String::as_str).unwrap_or("");
    ends_sentence(last_line) && starts_sentence(first_line)
}

fn combine_text(cues: &[Cue]) -> String {
    cues.iter()
        .flat_map(|cue| cue.text_lines.iter())
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge consecutive cues into sentence groups.
///
/// Every cue lands in exactly one group and the groups concatenated in order
/// reproduce the input sequence.
pub fn group_cues(cues: &[Cue]) -> Vec<SentenceGroup> {
    let Some((first, rest)) = cues.split_first() else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let mut open = vec![first.clone()];

    for (previous, next) in cues.iter().zip(rest) {
        if is_boundary(previous, next) {
            groups.push(SentenceGroup::new(std::mem::take(&mut open)));
        }
        open.push(next.clone());
    }

    groups.push(SentenceGroup::new(open));
    groups
}
