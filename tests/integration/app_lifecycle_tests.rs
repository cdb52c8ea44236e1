/*!
 * Integration tests for the application controller
 */

use std::fs;
use std::sync::Arc;
use anyhow::Result;

use vttflow::app_config::Config;
use vttflow::app_controller::{Controller, FolderSummary, RunOutcome};
use vttflow::errors::{SubtitleError, TranslationError};
use vttflow::providers::mock::MockProvider;
use vttflow::subtitle_processor::parse_vtt_string;
use vttflow::translation::TranslationService;
use crate::common;
use crate::common::mock_translators::{FailingTranslator, FnTranslator};

fn controller_with(translator: impl vttflow::translation::Translator + 'static) -> Controller {
    common::init_test_logging();
    Controller::with_translator(Config::default(), Arc::new(translator))
}

#[test]
fn test_with_config_withDefaultConfig_shouldCreateController() -> Result<()> {
    let controller = Controller::with_config(Config::default())?;
    assert!(controller.is_initialized());
    Ok(())
}

#[tokio::test]
async fn test_run_withSubtitleFile_shouldWriteTranslatedTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let controller = controller_with(FnTranslator::uppercase());

    let outcome = controller.run(input, temp_dir.path().to_path_buf(), false).await?;

    let RunOutcome::Translated { output_path, report } = outcome else {
        panic!("expected a translated file");
    };
    assert_eq!(output_path, temp_dir.path().join("talk.fr.vtt"));
    assert_eq!(report.group_count, 2);
    assert!(report.is_complete());

    let cues = parse_vtt_string(&fs::read_to_string(&output_path)?);
    assert_eq!(cues.len(), 3);
    assert_eq!(cues[0].start_time, "00:00:01.000");
    assert_eq!(cues[2].text_lines, vec!["LET'S GET STARTED!"]);
    assert!(!temp_dir.path().join("vttflow.issues.log").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withMockProviderService_shouldTranslateThroughProvider() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let config = Config::default();
    let provider = MockProvider::working();
    let service = TranslationService::with_provider(config.translation.clone(), Arc::new(provider.clone()));
    let controller = Controller::with_translator(config, Arc::new(service));

    controller.run(input, temp_dir.path().to_path_buf(), false).await?;

    assert_eq!(provider.request_count(), 2);
    let output = fs::read_to_string(temp_dir.path().join("talk.fr.vtt"))?;
    assert!(output.contains("WELCOME BACK"));
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let existing = common::create_test_file(temp_dir.path(), "talk.fr.vtt", "WEBVTT\n")?;
    let controller = controller_with(FnTranslator::uppercase());

    let skipped = controller.run(input.clone(), temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(skipped, RunOutcome::Skipped(existing.clone()));
    assert_eq!(fs::read_to_string(&existing)?, "WEBVTT\n");

    let forced = controller.run(input, temp_dir.path().to_path_buf(), true).await?;
    assert!(matches!(forced, RunOutcome::Translated { .. }));
    assert!(fs::read_to_string(&existing)?.contains("LET'S GET STARTED!"));
    Ok(())
}

#[tokio::test]
async fn test_run_withPartialFailure_shouldKeepOriginalAndWriteIssuesLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let controller = controller_with(FailingTranslator::on("started"));

    let outcome = controller.run(input, temp_dir.path().to_path_buf(), false).await?;
    let RunOutcome::Translated { output_path, report } = outcome else {
        panic!("expected a translated file");
    };

    assert_eq!(report.failed_groups(), 1);
    let output = fs::read_to_string(output_path)?;
    assert!(output.contains("Let's get started!"));
    assert!(output.contains("WELCOME BACK"));

    let issues = fs::read_to_string(temp_dir.path().join("vttflow.issues.log"))?;
    assert!(issues.contains("talk.vtt"));
    assert!(issues.contains("group 2 (cue 2)"));
    Ok(())
}

#[tokio::test]
async fn test_run_withEveryGroupFailing_shouldFailWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let controller = controller_with(FailingTranslator::always());

    let error = controller.run(input, temp_dir.path().to_path_buf(), false).await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<TranslationError>(),
        Some(TranslationError::AllGroupsFailed(2))
    ));
    assert!(!temp_dir.path().join("talk.fr.vtt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withNonSubtitleFile_shouldReturnUnsupportedFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "notes.txt", "not subtitles")?;
    let controller = controller_with(FnTranslator::uppercase());

    let error = controller.run(input, temp_dir.path().to_path_buf(), false).await.unwrap_err();
    assert!(matches!(error.downcast_ref::<SubtitleError>(), Some(SubtitleError::UnsupportedFormat(_))));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_with(FnTranslator::uppercase());

    let result = controller.run(temp_dir.path().join("missing.vtt"), temp_dir.path().to_path_buf(), false).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_folder_shouldSkipPreviousOutputsAndCountResults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("part2");
    fs::create_dir_all(&nested)?;

    common::create_test_subtitle(temp_dir.path(), "a.vtt")?;
    common::create_test_subtitle(&nested, "b.vtt")?;
    common::create_test_file(temp_dir.path(), "empty.vtt", "WEBVTT\n")?;
    common::create_test_subtitle(temp_dir.path(), "old.fr.vtt")?;

    let controller = controller_with(FnTranslator::uppercase());
    let summary = controller.run_folder(temp_dir.path().to_path_buf(), None, false).await?;

    assert_eq!(summary, FolderSummary { processed: 2, skipped: 0, failed: 1 });
    assert!(temp_dir.path().join("a.fr.vtt").exists());
    assert!(nested.join("b.fr.vtt").exists());
    assert!(!temp_dir.path().join("old.fr.fr.vtt").exists());

    // Second run finds the outputs already there
    let again = controller.run_folder(temp_dir.path().to_path_buf(), None, false).await?;
    assert_eq!(again, FolderSummary { processed: 0, skipped: 2, failed: 1 });
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withOutputDir_shouldWriteThere() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_subtitle(input_dir.path(), "a.vtt")?;

    let controller = controller_with(FnTranslator::uppercase());
    controller.run_folder(input_dir.path().to_path_buf(), Some(output_dir.path().to_path_buf()), false).await?;

    assert!(output_dir.path().join("a.fr.vtt").exists());
    assert!(!input_dir.path().join("a.fr.vtt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withNoSubtitles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "nothing")?;

    let controller = controller_with(FnTranslator::uppercase());
    assert!(controller.run_folder(temp_dir.path().to_path_buf(), None, false).await.is_err());
    Ok(())
}

#[test]
fn test_dry_run_shouldReportGroupingWithoutTranslating() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "talk.vtt")?;
    let translator = FnTranslator::uppercase();
    let tracker = translator.tracker.clone();
    let controller = controller_with(translator);

    let summary = controller.dry_run(&input)?;

    assert_eq!(summary.cue_count, 3);
    assert_eq!(summary.group_count, 2);
    assert_eq!(summary.line_count, 4);
    assert!(tracker.calls().is_empty());
    assert!(!temp_dir.path().join("talk.fr.vtt").exists());
    Ok(())
}
