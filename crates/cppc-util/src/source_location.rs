//! Packed source location handles.
//!
//! A [`SourceLocation`] is a 32-bit integer: the top 12 bits name a file
//! (1-based; 0 means invalid), the bottom 20 bits are a byte offset within
//! that file's current chunk. Large buffers are split across several
//! consecutive file ids ("chunks") of up to 2^20 bytes each so that a single
//! location always fits in 32 bits regardless of input size.

use static_assertions::const_assert_eq;
use std::fmt;

/// Number of bits reserved for the file id.
const FILE_ID_BITS: u32 = 12;
/// Number of bits reserved for the in-chunk offset.
const FILE_POS_BITS: u32 = 32 - FILE_ID_BITS;
/// Maximum byte offset representable within one chunk.
pub const CHUNK_SIZE: u32 = 1 << FILE_POS_BITS;
/// Largest file id the 12-bit field can name.
const MAX_FILE_ID: u32 = (1 << FILE_ID_BITS) - 1;

const_assert_eq!(FILE_ID_BITS + FILE_POS_BITS, 32);

/// An opaque, packed handle naming a byte within some ingested buffer.
///
/// `SourceLocation(0)` is the universal invalid value; every location
/// produced by [`SourceLocation::new`] is guaranteed non-zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation(u32);

impl SourceLocation {
    /// The invalid location. Equivalent to the zero value of the raw encoding.
    pub const INVALID: SourceLocation = SourceLocation(0);

    /// Builds a location from a 1-based file id and an in-chunk offset.
    ///
    /// An `offset` of 2^20 or more is promoted into additional file ids: every
    /// full chunk of `offset` advances `file_id` by one and the remainder
    /// becomes the in-chunk offset. If this promotion pushes `file_id` past
    /// the 12-bit ceiling, the id is clamped to [`Self::max_file_id`] rather
    /// than wrapping. A location built from a clamped id is not guaranteed to
    /// resolve back to the file the caller intended — TODO: this mirrors an
    /// unresolved escape hatch in the source this design is adapted from, and
    /// is only reachable once a translation unit mints more than 4095 chunks.
    pub fn new(file_id: u32, offset: u32) -> Self {
        let promoted = file_id as u64 + (offset / CHUNK_SIZE) as u64;
        let clamped_id = promoted.min(MAX_FILE_ID as u64) as u32;
        let in_chunk = offset % CHUNK_SIZE;
        Self::from_parts(clamped_id, in_chunk)
    }

    fn from_parts(file_id: u32, in_chunk_offset: u32) -> Self {
        debug_assert!(file_id <= MAX_FILE_ID);
        debug_assert!(in_chunk_offset < CHUNK_SIZE);
        SourceLocation((file_id << FILE_POS_BITS) | in_chunk_offset)
    }

    /// The largest file id the packed encoding can name.
    pub const fn max_file_id() -> u32 {
        MAX_FILE_ID
    }

    /// True for any location other than [`Self::INVALID`].
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// The 1-based file id this location names, or 0 if invalid.
    #[inline]
    pub const fn file_id(&self) -> u32 {
        self.0 >> FILE_POS_BITS
    }

    /// The raw in-chunk byte offset (not the "true" file offset — see
    /// `SourceManager::file_pos` for that, which also accounts for chunk
    /// number).
    #[inline]
    pub const fn raw_in_chunk_offset(&self) -> u32 {
        self.0 & (CHUNK_SIZE - 1)
    }

    /// Round-trippable 32-bit encoding suitable for persisting a location.
    #[inline]
    pub const fn raw_encoding(&self) -> u32 {
        self.0
    }

    /// Inverse of [`Self::raw_encoding`].
    #[inline]
    pub const fn from_raw_encoding(raw: u32) -> Self {
        SourceLocation(raw)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::INVALID
    }
}

impl PartialOrd for SourceLocation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceLocation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.file_id(), self.raw_in_chunk_offset())
        } else {
            write!(f, "<invalid>")
        }
    }
}
