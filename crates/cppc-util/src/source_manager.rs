//! Buffer ownership, file-id allocation, and line/column lookups.
//!
//! [`SourceManager`] is the owner of every ingested buffer for one
//! translation unit: it loads file contents (via [`crate::file_manager`]) or
//! accepts a caller-supplied in-memory buffer, appends the sentinel `\0`
//! byte the lexer relies on, and assigns one or more consecutive
//! [`SourceLocation`] file ids to each buffer (chunking large files per
//! spec.md §3/§4.4).

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use crate::error::{SourceManagerError, SourceManagerResult};
use crate::file_manager::FileEntry;
use crate::index_vec::IndexVec;
use crate::source_location::{SourceLocation, CHUNK_SIZE};

crate::define_idx!(FileId);

/// An ingested, immutable byte buffer. The final byte is always `\0`.
pub struct FileInfo {
    /// Owns the bytes; `buffer[buffer.len() - 1] == 0` always holds.
    buffer: Box<[u8]>,
    /// Lazily built table of physical line-start byte offsets, with a
    /// terminal entry equal to the scanned (pre-sentinel) length. Built at
    /// most once; `RefCell` stands in for "interior-mutable cache under
    /// otherwise-const access" (spec.md §9 Design Notes).
    line_offsets: RefCell<Option<Rc<Vec<u32>>>>,
    source: FileInfoSource,
}

enum FileInfoSource {
    /// Backed by a uniqued, on-disk `FileEntry`.
    File(Rc<FileEntry>),
    /// A caller-supplied buffer (stdin, synthesized input) with no
    /// filesystem identity.
    Mem { name: String },
}

impl FileInfo {
    /// The buffer's content, excluding the trailing sentinel.
    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.buffer[..self.buffer.len() - 1]
    }

    /// The full buffer, including the trailing sentinel `\0`.
    #[inline]
    pub fn buffer_with_sentinel(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.content().len()
    }

    pub fn display_name(&self) -> &str {
        match &self.source {
            FileInfoSource::File(entry) => entry.path.to_str().unwrap_or("<non-utf8 path>"),
            FileInfoSource::Mem { name } => name,
        }
    }

    pub fn file_entry(&self) -> Option<&Rc<FileEntry>> {
        match &self.source {
            FileInfoSource::File(entry) => Some(entry),
            FileInfoSource::Mem { .. } => None,
        }
    }

    fn line_offsets(&self) -> Rc<Vec<u32>> {
        if let Some(cached) = self.line_offsets.borrow().as_ref() {
            return cached.clone();
        }
        let offsets = Rc::new(compute_line_offsets(self.content()));
        *self.line_offsets.borrow_mut() = Some(offsets.clone());
        offsets
    }
}

/// Scans `content` for physical line terminators (`\n`, `\r`, `\r\n`,
/// `\n\r`, the two-byte forms counted once), recording the byte offset
/// immediately after each terminator. An embedded NUL is skipped as a
/// no-op (not a terminator) so the line table still describes positions in
/// sources the lexer will separately diagnose. The final entry is the
/// scanned length, so a location's line is always found by `lower_bound`.
fn compute_line_offsets(content: &[u8]) -> Vec<u32> {
    let mut offsets = vec![0u32];
    let mut i = 0usize;
    while i < content.len() {
        match content[i] {
            b'\n' => {
                i += 1;
                if i < content.len() && content[i] == b'\r' {
                    i += 1;
                }
                offsets.push(i as u32);
            }
            b'\r' => {
                i += 1;
                if i < content.len() && content[i] == b'\n' {
                    i += 1;
                }
                offsets.push(i as u32);
            }
            _ => i += 1,
        }
    }
    offsets.push(content.len() as u32);
    offsets
}

/// Per-file-id bookkeeping: which [`FileInfo`] it names, which chunk of
/// that buffer, and the location that pulled it into the translation unit.
pub struct FileIdInfo {
    pub include_loc: SourceLocation,
    pub chunk_no: u32,
    info: Rc<FileInfo>,
}

/// Ingestion/line-cache counters reported by [`SourceManager::print_stats`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceManagerStats {
    pub files_mapped: u64,
    pub mem_buffers_mapped: u64,
    pub file_ids_allocated: u64,
    pub bytes_mapped: u64,
    pub files_with_line_numbers_computed: u64,
}

/// Owns every buffer and file id for one translation unit.
#[derive(Default)]
pub struct SourceManager {
    file_ids: IndexVec<FileId, FileIdInfo>,
    stats: RefCell<SourceManagerStats>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `entry`'s contents and allocates one or more consecutive file
    /// ids for it, chunking per spec.md §3/§4.4. Returns the first id.
    pub fn create_file_id(
        &mut self,
        entry: Rc<FileEntry>,
        include_loc: SourceLocation,
    ) -> SourceManagerResult<FileId> {
        let path = entry.path.clone();
        let contents = fs::read(&path).map_err(|e| SourceManagerError::Read { path, source: e })?;
        let info = Rc::new(self.build_file_info(contents, FileInfoSource::File(entry)));
        self.stats.borrow_mut().files_mapped += 1;
        self.allocate_ids(info, include_loc)
    }

    /// Ingests a caller-supplied buffer (e.g. stdin) with no filesystem
    /// identity. Always succeeds.
    pub fn create_file_id_for_mem_buffer(&mut self, name: impl Into<String>, data: Vec<u8>) -> FileId {
        let info = Rc::new(self.build_file_info(data, FileInfoSource::Mem { name: name.into() }));
        self.stats.borrow_mut().mem_buffers_mapped += 1;
        self.allocate_ids(info, SourceLocation::INVALID)
            .expect("in-memory buffers never exceed the file-id space in practice")
    }

    fn build_file_info(&self, mut data: Vec<u8>, source: FileInfoSource) -> FileInfo {
        self.stats.borrow_mut().bytes_mapped += data.len() as u64;
        data.push(0);
        FileInfo { buffer: data.into_boxed_slice(), line_offsets: RefCell::new(None), source }
    }

    /// Issues `max(1, ceil((size + 1) / CHUNK_SIZE))` consecutive file ids
    /// for `info`, all sharing it but differing in `chunk_no`. Returns the
    /// first.
    fn allocate_ids(
        &mut self,
        info: Rc<FileInfo>,
        include_loc: SourceLocation,
    ) -> SourceManagerResult<FileId> {
        let size = info.buffer.len() as u64; // includes the sentinel, per spec.md §4.4
        let chunk_count = size.div_ceil(CHUNK_SIZE as u64).max(1);
        let first = self.file_ids.len() as u32;
        if first as u64 + chunk_count > SourceLocation::max_file_id() as u64 {
            return Err(SourceManagerError::FileIdSpaceExhausted {
                max: SourceLocation::max_file_id(),
            });
        }
        for chunk_no in 0..chunk_count {
            self.file_ids.push(FileIdInfo { include_loc, chunk_no: chunk_no as u32, info: info.clone() });
        }
        self.stats.borrow_mut().file_ids_allocated += chunk_count;
        Ok(FileId(first + 1)) // file ids are 1-based (0 is SourceLocation::INVALID's sentinel)
    }

    fn id_info(&self, file_id: u32) -> Option<&FileIdInfo> {
        if file_id == 0 {
            return None;
        }
        self.file_ids.get(FileId(file_id - 1))
    }

    pub fn buffer_of(&self, file_id: u32) -> Option<&[u8]> {
        self.id_info(file_id).map(|fi| fi.info.content())
    }

    pub fn include_loc_of(&self, file_id: u32) -> Option<SourceLocation> {
        self.id_info(file_id).map(|fi| fi.include_loc)
    }

    pub fn file_entry_of(&self, file_id: u32) -> Option<&Rc<FileEntry>> {
        self.id_info(file_id).and_then(|fi| fi.info.file_entry())
    }

    pub fn file_info_of(&self, file_id: u32) -> Option<&FileInfo> {
        self.id_info(file_id).map(|fi| &*fi.info)
    }

    /// `in_chunk_offset + chunk_no(file_id) * CHUNK_SIZE`: the true byte
    /// offset into the underlying buffer (as opposed to the chunk-relative
    /// offset `SourceLocation` stores directly).
    pub fn file_pos(&self, loc: SourceLocation) -> u64 {
        let Some(fi) = self.id_info(loc.file_id()) else { return 0 };
        loc.raw_in_chunk_offset() as u64 + fi.chunk_no as u64 * CHUNK_SIZE as u64
    }

    /// 1-based column, scanning backward to the previous line terminator
    /// (or buffer start). Returns 0 for an invalid location.
    pub fn column_of(&self, loc: SourceLocation) -> u32 {
        if !loc.is_valid() {
            return 0;
        }
        let Some(fi) = self.id_info(loc.file_id()) else { return 0 };
        let content = fi.info.content();
        let pos = self.file_pos(loc) as usize;
        let pos = pos.min(content.len());
        let mut start = pos;
        while start > 0 && content[start - 1] != b'\n' && content[start - 1] != b'\r' {
            start -= 1;
        }
        (pos - start + 1) as u32
    }

    /// 1-based physical line number, lazily building the file's line-offset
    /// table on first use (lower-bound search by `file_pos + 1`).
    pub fn line_of(&self, loc: SourceLocation) -> u32 {
        if !loc.is_valid() {
            return 0;
        }
        let Some(fi) = self.id_info(loc.file_id()) else { return 0 };
        let offsets = fi.info.line_offsets();
        let target = self.file_pos(loc) as u32 + 1;
        // partition_point finds the first offset >= target; the line
        // containing `target` is the partition index (1-based line number).
        let line = offsets.partition_point(|&o| o < target);
        line.max(1) as u32
    }

    pub fn stats(&self) -> SourceManagerStats {
        let mut s = *self.stats.borrow();
        s.files_with_line_numbers_computed = self
            .file_ids
            .iter_enumerated()
            .map(|(_, fi)| &fi.info)
            .filter(|info| info.line_offsets.borrow().is_some())
            .count() as u64;
        s
    }

    pub fn print_stats(&self) -> String {
        let s = self.stats();
        format!(
            "{} files mapped, {} mem buffers mapped, {} file ids allocated, \
             {} bytes mapped, {} files with line numbers computed",
            s.files_mapped,
            s.mem_buffers_mapped,
            s.file_ids_allocated,
            s.bytes_mapped,
            s.files_with_line_numbers_computed
        )
    }
}
