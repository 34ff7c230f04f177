//! Decides whether a rebuilt feed is written to its destination.

use crate::config::WriteMode;

/// `true` when the assembled document should replace the destination file.
///
/// Only the source feed's change flag counts; item page cache hits and
/// misses never reach this decision.
pub fn should_write(mode: WriteMode, source_changed: bool) -> bool {
    match mode {
        WriteMode::Always => true,
        WriteMode::Changed => source_changed,
    }
}
