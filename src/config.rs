//! Crate-wide default tunables.
//!
//! Builders across the crate start from these values; override them per
//! instance rather than editing here.

use std::time::Duration;

/// Maximum chunk length in characters, overlap prefix included.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2000;

/// Upper bound in characters for a chunk's injected overlap prefix.
pub const DEFAULT_OVERLAP_SIZE: usize = 150;

/// Shortest suffix/prefix duplication the reassembler collapses.
pub const DEFAULT_MIN_MERGE_OVERLAP: usize = 10;

/// Lines shorter than this without terminal punctuation classify as headings.
pub const DEFAULT_HEADING_LENGTH_LIMIT: usize = 40;

/// Concurrent in-flight workers per batch.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Attempts per item before it is recorded as permanently failed.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between an item's attempts; constant across attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Partials merged per group in one reduction pass.
pub const DEFAULT_GROUP_SIZE: usize = 3;

/// Completion token budget requested from providers.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Adjacent small chunks are coalesced up to this combined character length
/// before fan-out.
pub const DEFAULT_COALESCE_LIMIT: usize = 6000;
