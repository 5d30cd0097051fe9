//! cppc-util — leaf utilities shared by the preprocessor lexer front-end.
//!
//! This crate owns everything that has no business depending on the lexer
//! itself: packed source locations, the filesystem-identity cache, the
//! buffer-owning source manager, the identifier table, typed indices, and
//! the diagnostic channel the lexer reports through. `cppc-lex` depends on
//! this crate; this crate depends on nothing in the workspace.

pub mod diagnostic;
pub mod error;
pub mod file_manager;
pub mod identifier_table;
pub mod index_vec;
pub mod source_location;
pub mod source_manager;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticId, Handler, LangOptions, Level};
pub use error::{
    FileManagerError, FileManagerResult, IdentifierTableError, IdentifierTableResult,
    SourceManagerError, SourceManagerResult,
};
pub use file_manager::{DirectoryEntry, FileEntry, FileManager, FileManagerStats, FileUid};
pub use identifier_table::{IdentifierTable, IdentifierTableStats, IdentifierTokenInfo, MacroInfoHandle};
pub use index_vec::{Idx, IndexVec};
pub use source_location::SourceLocation;
pub use source_manager::{FileId, FileIdInfo, FileInfo, SourceManager, SourceManagerStats};

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;

/// Defines a newtype wrapping `u32` that implements [`Idx`], for use as an
/// [`IndexVec`] index. Mirrors the teacher's `define_idx!` convenience macro.
#[macro_export]
macro_rules! define_idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize);
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}
