//! Services layer - Business logic
//!
//! This module contains the importer and the helpers it is built from:
//! - `import`: CSV-to-entity import and rollback
//! - `creation_log`: durable record of created entities
//! - `file_copy`: copying bundled files into public storage
//! - `alias`: URL alias generation

pub mod alias;
pub mod creation_log;
pub mod file_copy;
pub mod import;

pub use alias::{css_identifier, term_alias};
pub use creation_log::{CreationLog, GroupedUuids};
pub use file_copy::{FileCopier, PublicDirectoryCopier};
pub use import::{ContentImporter, DeleteReport, ImportError, ImportReport, RowWarning};
