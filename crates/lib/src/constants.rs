//! Constants used throughout the Tabula library.

/// Separator between path segments in the textual form of a [`crate::Path`].
pub const PATH_DELIMITER: char = '.';

/// Escape character that makes the following delimiter part of a segment.
pub const PATH_ESCAPE: char = '\\';

/// Base name of the table holding every document, after the configured prefix.
pub const CONTENT_TABLE: &str = "CONTENT_STORE";

/// Statement shapes used for multi-key reads and removals, smallest first.
pub const BATCH_LADDER: [usize; 4] = [1, 4, 11, 51];

/// Upper bound on stored key length, matching the key column width.
pub const MAX_KEY_LENGTH: usize = 512;
