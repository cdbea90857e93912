//! Tuning constants and settings loading.
//!
//! Every empirically tuned threshold of the heuristics lives in
//! [`DiffTuning`]. [`DiffSettings::load`] reads defaults overridden by
//! `LINEDIFF__*` environment variables, e.g.
//! `LINEDIFF__OPTIONS__COMPUTE_MOVES=true` or
//! `LINEDIFF__TUNING__LINE_DP_THRESHOLD=2000`.

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::computer::LinesDiffOptions;
use crate::error::DiffError;

/// Thresholds and weights of the diff heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffTuning {
    /// Line alignment uses dynamic programming below this many lines in
    /// total, Myers above.
    pub line_dp_threshold: usize,
    /// Same switch for character refinement of one hunk.
    pub char_dp_threshold: usize,
    /// Histogram similarity above which a deletion and an insertion are
    /// paired as a move.
    pub move_similarity_threshold: f64,
    /// Minimum number of lines of a move.
    pub min_move_lines: usize,
    /// Share of common non-whitespace characters for two lines to count as
    /// similar when extending a move.
    pub line_similarity_threshold: f64,
    /// Lines longer than this are never compared character-wise.
    pub line_similarity_max_len: usize,
    /// Minimum number of common non-whitespace characters for two lines to
    /// count as similar.
    pub line_similarity_min_chars: usize,
    /// Minimum trimmed text length of a move.
    pub min_move_chars: usize,
    /// Moves whose gaps sum to at most this many lines are joined.
    pub move_join_gap: usize,
    /// Largest non-whitespace gap between line hunks that is bridged.
    pub short_line_gap_chars: usize,
    /// A neighbour hunk must be larger than this for the gap to be bridged.
    pub short_line_gap_elements: usize,
    /// Character gaps of at most this length are bridged.
    pub short_match_gap: usize,
    /// A word is absorbed when less than this share of it is unchanged.
    pub word_extension_ratio: f64,
    /// Weight of the bridging cost model between long character diffs.
    pub long_diff_bridge_factor: f64,
    /// Cap of the per-diff cost in the bridging cost model.
    pub long_diff_cost_cap: f64,
    /// Gaps spanning more lines than this are never bridged.
    pub long_diff_max_gap_lines: usize,
    /// Gaps longer than this are never bridged.
    pub long_diff_max_gap_len: usize,
    /// Gaps whose trimmed text is longer than this are never bridged.
    pub long_diff_max_gap_text: usize,
    /// Diffs above this size absorb short neighbouring text.
    pub long_diff_min_len: usize,
    /// Largest trimmed text absorbed by a long diff.
    pub long_diff_absorb_text: usize,
    /// Furthest an ambiguous diff boundary is shifted looking for a better
    /// position.
    pub max_shift: usize,
}

impl Default for DiffTuning {
    fn default() -> Self {
        Self {
            line_dp_threshold: 1700,
            char_dp_threshold: 500,
            move_similarity_threshold: 0.9,
            min_move_lines: 3,
            line_similarity_threshold: 0.6,
            line_similarity_max_len: 300,
            line_similarity_min_chars: 10,
            min_move_chars: 15,
            move_join_gap: 2,
            short_line_gap_chars: 4,
            short_line_gap_elements: 5,
            short_match_gap: 2,
            word_extension_ratio: 2.0 / 3.0,
            long_diff_bridge_factor: 1.3,
            long_diff_cost_cap: 130.0,
            long_diff_max_gap_lines: 5,
            long_diff_max_gap_len: 500,
            long_diff_max_gap_text: 20,
            long_diff_min_len: 100,
            long_diff_absorb_text: 3,
            max_shift: 100,
        }
    }
}

/// Options and tuning loaded from the environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiffSettings {
    /// Per-computation options.
    pub options: LinesDiffOptions,
    /// Heuristic constants.
    #[serde(default)]
    pub tuning: DiffTuning,
}

impl DiffSettings {
    /// Loads settings from defaults and `LINEDIFF__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Config`] if a variable cannot be parsed.
    pub fn load() -> Result<Self, DiffError> {
        Self::load_with(Environment::with_prefix("LINEDIFF").separator("__"))
    }

    /// Loads settings from defaults overridden by `env`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Config`] if a value cannot be parsed.
    pub fn load_with(env: Environment) -> Result<Self, DiffError> {
        let defaults = LinesDiffOptions::default();
        let s = Config::builder()
            .set_default("options.ignore_trim_whitespace", defaults.ignore_trim_whitespace)?
            .set_default("options.max_computation_time_ms", defaults.max_computation_time_ms)?
            .set_default("options.compute_moves", defaults.compute_moves)?
            .add_source(env.try_parsing(true))
            .build()?;

        let settings: Self = s.try_deserialize()?;
        tracing::debug!(?settings, "diff settings loaded");
        Ok(settings)
    }
}
