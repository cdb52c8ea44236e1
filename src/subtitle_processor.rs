use std::fmt;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: WebVTT cue parsing and reconstruction

// @const: File header token
pub const VTT_HEADER: &str = "WEBVTT";

// @const: Separator between start and end timestamps
pub const TIMESTAMP_SEPARATOR: &str = "-->";

// @struct: Single timed subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Start timestamp, passed through unparsed
    pub start_time: String,

    // @field: End timestamp (and any cue settings), passed through unparsed
    pub end_time: String,

    // @field: Text fragments as they appeared on separate lines
    pub text_lines: Vec<String>,

    // @field: Position in the parsed file, the only ordering key
    pub original_index: usize,
}

impl Cue {
    /// Creates a new cue
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        text_lines: Vec<String>,
        original_index: usize,
    ) -> Self {
        Cue {
            start_time: start_time.into(),
            end_time: end_time.into(),
            text_lines,
            original_index,
        }
    }

    /// Copy of this cue carrying different text, same timing and index
    pub fn with_text_lines(&self, text_lines: Vec<String>) -> Self {
        Cue {
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            text_lines,
            original_index: self.original_index,
        }
    }

    /// Number of line slots this cue occupies
    pub fn slot_count(&self) -> usize {
        self.text_lines.len()
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {} {}", self.start_time, TIMESTAMP_SEPARATOR, self.end_time)?;
        for line in &self.text_lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Cue being accumulated while scanning lines
struct OpenCue {
    start_time: String,
    end_time: String,
    text_lines: Vec<String>,
}

impl OpenCue {
    fn finish(self, cues: &mut Vec<Cue>) {
        if self.text_lines.is_empty() {
            debug!("Dropping cue {} --> {} without text", self.start_time, self.end_time);
            return;
        }
        let index = cues.len();
        cues.push(Cue::new(self.start_time, self.end_time, self.text_lines, index));
    }
}

/// Parse WebVTT text into an ordered sequence of cues.
///
/// Blank lines and bare `WEBVTT` lines are skipped wherever they occur. A line holding
/// `-->` opens a new cue; every other line is a text line of the open cue. Cues
/// without text are dropped and do not consume an index. Timestamps are not
/// validated.
pub fn parse_vtt_string(content: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut current: Option<OpenCue> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line == VTT_HEADER {
            continue;
        }

        if let Some((start, end)) = line.split_once(TIMESTAMP_SEPARATOR) {
            if let Some(open) = current.take() {
                open.finish(&mut cues);
            }
            current = Some(OpenCue {
                start_time: start.trim().to_string(),
                end_time: end.trim().to_string(),
                text_lines: Vec::new(),
            });
        } else if let Some(open) = current.as_mut() {
            open.text_lines.push(line.to_string());
        }
    }

    if let Some(open) = current.take() {
        open.finish(&mut cues);
    }

    cues
}

/// Serialize cues back into WebVTT text, ordered by `original_index`
pub fn reconstruct_vtt(cues: &[Cue]) -> String {
    let mut ordered: Vec<&Cue> = cues.iter().collect();
    ordered.sort_by_key(|cue| cue.original_index);

    let mut output = String::with_capacity(cues.len() * 64 + VTT_HEADER.len());
    output.push_str(VTT_HEADER);
    output.push_str("\n\n");
    for cue in ordered {
        output.push_str(&cue.to_string());
    }

    output.trim_end().to_string()
}

/// Subtitle file together with its parsed cues
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// Source filename
    pub source_file: PathBuf,

    /// Cues in file order
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// Create a track from already parsed cues
    pub fn new(source_file: PathBuf, cues: Vec<Cue>) -> Self {
        SubtitleTrack { source_file, cues }
    }

    /// Load and parse a WebVTT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let cues = parse_vtt_string(&content);

        if cues.is_empty() {
            warn!("No cues found in {:?}", path);
            return Err(SubtitleError::NoCues(path.display().to_string()).into());
        }

        debug!("Parsed {} cues from {:?}", cues.len(), path);
        Ok(SubtitleTrack::new(path.to_path_buf(), cues))
    }

    /// Render the track as WebVTT text
    pub fn to_vtt_string(&self) -> String {
        reconstruct_vtt(&self.cues)
    }

    /// Write the track to a WebVTT file
    pub fn write_to_vtt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut content = self.to_vtt_string();
        content.push('\n');
        FileManager::write_to_file(path, &content)
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Total number of text lines across all cues
    pub fn line_count(&self) -> usize {
        self.cues.iter().map(Cue::slot_count).sum()
    }
}
