//! Structured logging field names shared by every legis crate.
//!
//! Spans declared with `#[instrument]` and events name their fields
//! literally, using this vocabulary:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | Originating subsystem (`catalog`, `cli`) |
//! | `component` | Component within it (`loader`, `http`, `selector`) |
//! | `op` | Logical operation (`load`, `get_json`) |
//! | `entity_type` | Entity type key being loaded |
//! | `endpoint` | Endpoint path requested |
//! | `page` | 1-based page number |
//! | `generation` | Load generation of a picker session |
//! | `error` | Error message |
//!
//! Fields declared `Empty` and filled in later with `Span::record` use the
//! constants below.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Command-level failure surfaced to the operator |
//! | WARN  | Recoverable issue, degraded result returned (page cap, failed page, stale load) |
//! | INFO  | Lifecycle events (client construction), load completions |
//! | DEBUG | Per-request decisions, config choices |
//! | TRACE | Per-item data (individual pages, records) |

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of suggestions produced by a load.
pub const RESULT_COUNT: &str = "result_count";

/// Number of HTTP requests issued by a load.
pub const REQUEST_COUNT: &str = "request_count";

/// HTTP status code of a response.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Whether the load returned a degraded (partial) result.
pub const PARTIAL: &str = "partial";
