/*!
 * Sentence-aware translation of subtitle cues.
 *
 * This module contains the translation pipeline. It is split into several
 * submodules:
 *
 * - `grouping`: Merges consecutive cues into sentence groups
 * - `redistribution`: Spreads a translated sentence back over its cues
 * - `core`: Translator contract and provider-backed service
 * - `batch`: Concurrent translation of all groups of a track
 * - `cache`: Caching mechanisms for translations
 */

// Re-export main types for easier usage
pub use self::batch::{GroupFailure, GroupTranslator, TranslationReport};
pub use self::core::{TokenUsageStats, TranslationService, Translator};
pub use self::grouping::{SentenceGroup, group_cues};
pub use self::redistribution::redistribute;

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
pub mod grouping;
pub mod redistribution;
