//! Structured logging schema and field name constants.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log output can be filtered by the same names across every stage of the
//! lookup pipeline.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, fallback outcome applied (unknown region, malformed output) |
//! | INFO  | Lifecycle events, completed searches |
//! | DEBUG | Decision points, cache hits, config choices |
//! | TRACE | Per-item iteration (candidates, suggestions) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "catalog", "inference", "search", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "region_classifier", "code_ranker", "candidate_filter", "openai"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "classify", "rank", "filter", "resolve", "search"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Free-text procedure description being looked up.
pub const QUERY: &str = "query";

/// Region code (MS, CO, PC, RO, PP).
pub const REGION: &str = "region";

/// Procedure code being resolved.
pub const CODE: &str = "code";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of catalog records passed to the ranking stage.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of suggestions returned.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Classifier or suggestion confidence.
pub const CONFIDENCE: &str = "confidence";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Whether a memoized result was served.
pub const CACHE_HIT: &str = "cache_hit";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
