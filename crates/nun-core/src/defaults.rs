//! Centralized default constants for NUN code lookup.
//!
//! All crates and the CLI reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// SHORTLIST
// =============================================================================

/// Fewest suggestions the ranking capability is asked to return.
pub const MIN_SUGGESTIONS: usize = 3;

/// Most suggestions the ranking capability is asked to return.
pub const MAX_SUGGESTIONS: usize = 6;

// =============================================================================
// HISTORY
// =============================================================================

/// Rolling session history capacity.
pub const HISTORY_CAPACITY: usize = 10;

/// Suggestions kept per history entry.
pub const HISTORY_TOP_SUGGESTIONS: usize = 3;

/// Characters of the original description kept per history entry.
pub const HISTORY_DESCRIPTION_CHARS: usize = 120;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default model for both stages unless routed otherwise.
pub const GEN_MODEL: &str = "gpt-4o";

/// Classification runs at zero temperature for label stability.
pub const CLASSIFICATION_TEMPERATURE: f32 = 0.0;

/// Ranking temperature.
pub const RANKING_TEMPERATURE: f32 = 0.3;

/// Completion token ceiling for either stage.
pub const MAX_TOKENS: u32 = 1500;

/// HTTP timeout for a single capability call.
pub const TIMEOUT_SECS: u64 = 60;

// =============================================================================
// CACHE
// =============================================================================

/// Memoized results kept per operation.
pub const CACHE_CAPACITY: usize = 256;
