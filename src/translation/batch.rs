/*!
 * Concurrent translation of sentence groups.
 *
 * A track is split into sentence groups, every group is translated as one
 * request and the answer is spread back over the group's cues. Groups run
 * concurrently up to a configured limit and the output is put back in cue
 * order afterwards.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::errors::TranslationError;
use crate::subtitle_processor::Cue;

use super::core::Translator;
use super::grouping::{SentenceGroup, group_cues};
use super::redistribution::{redistribute, translated_lines};

/// A sentence group that could not be translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    /// Position of the group in the track
    pub group_index: usize,

    /// Index of the first cue of the group
    pub first_cue_index: Option<usize>,

    /// Why the group failed
    pub message: String,
}

/// Outcome of translating one track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Number of cues in the track
    pub cue_count: usize,

    /// Number of sentence groups
    pub group_count: usize,

    /// Groups whose translation was applied
    pub translated_groups: usize,

    /// Groups that kept their original text
    pub failures: Vec<GroupFailure>,
}

impl TranslationReport {
    /// Number of groups that kept their original text
    pub fn failed_groups(&self) -> usize {
        self.failures.len()
    }

    /// True when every group was translated
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Error out when there was something to translate but nothing succeeded
    pub fn ensure_progress(&self) -> Result<(), TranslationError> {
        if self.group_count > 0 && self.translated_groups == 0 {
            return Err(TranslationError::AllGroupsFailed(self.group_count));
        }
        Ok(())
    }
}

/// Translates whole tracks group by group
pub struct GroupTranslator {
    /// The translator to use
    translator: Arc<dyn Translator>,

    /// Maximum number of groups in flight
    max_concurrent_requests: usize,
}

impl GroupTranslator {
    /// Create a new group translator
    pub fn new(translator: Arc<dyn Translator>, max_concurrent_requests: usize) -> Self {
        Self {
            translator,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Translate one sentence group into its replacement cues
    pub async fn translate_group(
        &self,
        group_index: usize,
        group: &SentenceGroup,
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Cue>, TranslationError> {
        let translated = self.translator
            .translate(&group.combined_text, source_language, target_language)
            .await?;

        if translated_lines(&translated).is_empty() {
            return Err(TranslationError::EmptyTranslation { group_index });
        }

        Ok(redistribute(group, &translated))
    }

    /// Group the cues, translate every group and return the new cue list
    pub async fn translate_cues(
        &self,
        cues: &[Cue],
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> (Vec<Cue>, TranslationReport) {
        let groups = group_cues(cues);
        debug!("{} cues form {} sentence groups", cues.len(), groups.len());

        let (mut translated, mut report) = self
            .translate_groups(&groups, source_language, target_language, progress_callback)
            .await;

        translated.sort_by_key(|cue| cue.original_index);
        report.cue_count = cues.len();
        (translated, report)
    }

    /// Translate prepared groups; a failed group keeps its original cues
    pub async fn translate_groups(
        &self,
        groups: &[SentenceGroup],
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> (Vec<Cue>, TranslationReport) {
        let total_groups = groups.len();
        let processed_groups = AtomicUsize::new(0);
        let processed = &processed_groups;
        let progress = &progress_callback;

        let mut results = stream::iter(groups.iter().enumerate())
            .map(|(group_index, group)| async move {
                let start_time = Instant::now();
                let result = self
                    .translate_group(group_index, group, source_language, target_language)
                    .await;

                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(current, total_groups);
                debug!("Group {} of {} done in {:?}", group_index + 1, total_groups, start_time.elapsed());

                (group_index, result)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort results by group index to maintain original order
        results.sort_by_key(|(idx, _)| *idx);

        let mut report = TranslationReport {
            cue_count: groups.iter().map(|g| g.cues.len()).sum(),
            group_count: total_groups,
            ..TranslationReport::default()
        };
        let mut all_cues = Vec::with_capacity(report.cue_count);

        for (group_index, result) in results {
            let group = &groups[group_index];
            match result {
                Ok(cues) => {
                    report.translated_groups += 1;
                    all_cues.extend(cues);
                }
                Err(e) => {
                    warn!("Group {} kept its original text: {}", group_index + 1, e);
                    report.failures.push(GroupFailure {
                        group_index,
                        first_cue_index: group.first_index(),
                        message: e.to_string(),
                    });
                    all_cues.extend(group.cues.iter().cloned());
                }
            }
        }

        if total_groups > 0 && report.translated_groups == 0 {
            error!("None of the {} sentence groups could be translated", total_groups);
        }

        (all_cues, report)
    }
}
