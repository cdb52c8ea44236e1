use anyhow::{Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::file_utils::{FileManager, FileType, VTT_EXTENSION};
use crate::subtitle_processor::SubtitleTrack;
use crate::translation::{
    GroupTranslator, TranslationReport, TranslationService, Translator, group_cues,
};

// @module: Application controller for subtitle processing

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A translated file was written
    Translated {
        output_path: PathBuf,
        report: TranslationReport,
    },
    /// The output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counters for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Grouping preview produced without contacting a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DryRunSummary {
    pub cue_count: usize,
    pub group_count: usize,
    pub line_count: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translator used for every group
    translator: Arc<dyn Translator>,

    // @field: Provider-backed service when built from config, for usage stats
    service: Option<TranslationService>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(config.translation.clone())?;
        Ok(Self {
            translator: Arc::new(service.clone()),
            service: Some(service),
            config,
        })
    }

    /// Create a controller around any translator
    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Self {
        Self {
            config,
            translator,
            service: None,
        }
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Check that the configured provider answers
    pub async fn test_connection(&self) -> Result<()> {
        match &self.service {
            Some(service) => service.test_connection().await,
            None => Ok(()),
        }
    }

    /// Where the translation of `input_file` goes
    pub fn output_path(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, output_dir, &self.config.target_language, VTT_EXTENSION)
    }

    /// Translate one subtitle file into `output_dir`
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<RunOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite).await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<RunOutcome> {
        let start_time = Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = self.output_path(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {}, translation already exists (use -f to force overwrite)", input_file.display());
            return Ok(RunOutcome::Skipped(output_path));
        }

        if FileManager::detect_file_type(input_file)? != FileType::Subtitle {
            return Err(SubtitleError::UnsupportedFormat(input_file.display().to_string()).into());
        }

        let track = SubtitleTrack::from_file(input_file)?;
        let (translated, report) = self.translate_track(&track, multi_progress).await?;

        FileManager::ensure_dir(output_dir)?;
        translated.write_to_vtt(&output_path)?;

        if !report.is_complete() {
            self.write_issues_log(&report, input_file, output_dir);
        }

        info!(
            "Success: {} ({} of {} groups translated in {})",
            output_path.display(),
            report.translated_groups,
            report.group_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunOutcome::Translated { output_path, report })
    }

    /// Translate every cue of a track, with a progress bar over its sentence groups
    pub async fn translate_track(
        &self,
        track: &SubtitleTrack,
        multi_progress: &MultiProgress,
    ) -> Result<(SubtitleTrack, TranslationReport)> {
        let groups = group_cues(&track.cues);

        let progress_bar = multi_progress.add(ProgressBar::new(groups.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sentences ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        info!("{} cues, {} sentence groups, {} -> {} with {} - {}",
            track.cues.len(),
            groups.len(),
            self.config.source_language,
            self.config.target_language,
            self.config.translation.provider.display_name(),
            self.config.translation.get_model());

        let group_translator = GroupTranslator::new(
            Arc::clone(&self.translator),
            self.config.translation.optimal_concurrent_requests(),
        );

        let pb = progress_bar.clone();
        let (cues, report) = group_translator.translate_groups(
            &groups,
            &self.config.source_language,
            &self.config.target_language,
            move |completed, _total| pb.set_position(completed as u64),
        ).await;

        progress_bar.finish_and_clear();

        if report.failed_groups() > 0 {
            warn!("{} of {} sentence groups kept their original text", report.failed_groups(), report.group_count);
        }
        report.ensure_progress()?;

        if let Some(service) = &self.service {
            let usage = service.token_usage();
            if usage.requests > 0 {
                info!("{}", usage.summary());
            }
        }

        Ok((SubtitleTrack::new(track.source_file.clone(), cues), report))
    }

    /// Group a file's cues and report the layout without translating
    pub fn dry_run(&self, input_file: &Path) -> Result<DryRunSummary> {
        let track = SubtitleTrack::from_file(input_file)?;
        let groups = group_cues(&track.cues);

        for (index, group) in groups.iter().enumerate() {
            debug!("Group {} ({} lines): {}", index + 1, group.slot_count(), group.combined_text);
        }

        let summary = DryRunSummary {
            cue_count: track.cues.len(),
            group_count: groups.len(),
            line_count: track.line_count(),
        };
        info!("{}: {} cues, {} lines, {} sentence groups",
            input_file.display(), summary.cue_count, summary.line_count, summary.group_count);

        Ok(summary)
    }

    /// Run the workflow in folder mode, processing all subtitle files in a directory
    /// Files that already look like translations are not picked up as inputs
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let subtitle_files: Vec<PathBuf> = FileManager::find_files(&input_dir, VTT_EXTENSION)?
            .into_iter()
            .filter(|path| !FileManager::is_translation_output(path, &self.config.target_language))
            .collect();

        if subtitle_files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(subtitle_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for subtitle_file in &subtitle_files {
            let file_name = subtitle_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let target_dir = match (&output_dir, subtitle_file.parent()) {
                (Some(dir), _) => dir.clone(),
                (None, Some(parent)) => parent.to_path_buf(),
                (None, None) => input_dir.clone(),
            };

            match self.run_with_progress(subtitle_file, &target_dir, &multi_progress, force_overwrite).await {
                Ok(RunOutcome::Translated { .. }) => summary.processed += 1,
                Ok(RunOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!("Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed, summary.skipped, summary.failed);

        Ok(summary)
    }

    /// Append the failed groups of a run to `vttflow.issues.log` in the output directory
    fn write_issues_log(&self, report: &TranslationReport, input_file: &Path, output_dir: &Path) {
        let log_path = output_dir.join("vttflow.issues.log");

        let mut content = FileManager::read_to_string(&log_path).unwrap_or_default();
        content.push_str(&format!(
            "Translation Log - {}\nFile: {}\nContext: {} - {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            input_file.display(),
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        ));
        for failure in &report.failures {
            let cue = failure.first_cue_index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string());
            content.push_str(&format!("[WARN] group {} (cue {}): {}\n", failure.group_index + 1, cue, failure.message));
        }
        content.push('\n');

        if let Err(e) = FileManager::write_to_file(&log_path, &content) {
            warn!("Failed to write logs to file: {}", e);
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
