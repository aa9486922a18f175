//! Settings Editor: format-preserving editing of hand-maintained settings files
//!
//! Two dialects are supported:
//!
//! - `.cfg`: flat `key = value;` lines with optional
//!   `// [type: T; default: D] Description` annotations ([`cfg`]).
//! - `.xml`: line-oriented markup whose `name="value"` attributes are
//!   editable ([`markup`]).
//!
//! # Architecture
//!
//! Each dialect engine splits a file into physical lines and each line into
//! fragments: immutable literal bytes and mutable values. Rendering
//! concatenates the fragments, so an unedited file renders back byte for byte
//! and an edit touches only the value it targets. Parsing never fails;
//! anything the tokenizers do not recognize is kept as opaque text.
//!
//! Everything around the engines (settings tree, snapshot history, atomic
//! writes, root confinement) lives in [`tree`], [`history`], [`edit`] and
//! [`safety`].
//!
//! # Example
//!
//! ```
//! use settings_editor::cfg::parse_cfg;
//!
//! let mut file = parse_cfg("sv_gravity = 800; // [type: int; default: 800] Gravity strength\n");
//! assert_eq!(file.lines()[0].key(), Some("sv_gravity"));
//!
//! file.set_value(0, "600");
//! assert_eq!(
//!     file.render(),
//!     "sv_gravity = 600; // [type: int; default: 800] Gravity strength\n"
//! );
//! ```

pub mod cfg;
pub mod config;
pub mod dialect;
pub mod edit;
pub mod encoding;
pub mod history;
pub mod logging;
pub mod markup;
pub mod safety;
pub mod tree;
pub mod update;

// Re-exports
pub use cfg::{parse_cfg, CfgFile, CfgLine, LineKind, Metadata};
pub use config::{ConfigError, EditorConfig};
pub use dialect::{Dialect, Document};
pub use edit::{
    commit, load_document, plan_save, restore, save, EditError, LoadedDocument, SavePlan,
    SaveReport, SaveRequest, SaveResult,
};
pub use encoding::TextEncoding;
pub use history::{HistoryError, HistoryStore, Snapshot, SnapshotSummary};
pub use markup::{parse_markup, MarkupFile, MarkupLine, Segment};
pub use safety::{RootGuard, SafetyError};
pub use tree::{build_tree, NodeKind, TreeError, TreeNode};
pub use update::{FileUpdate, IgnoreReason, UpdateOutcome};
