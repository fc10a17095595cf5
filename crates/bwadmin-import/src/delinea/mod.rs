//! Delinea (Thycotic) Secret Server XML export conversion.
//!
//! A Secret Server export carries three collections under a single
//! `ImportFile` root: secret templates (field definitions with type hints),
//! secrets (field values plus template/folder references) and folders (with
//! permission entries). [`parse_reader`] streams the document into those
//! collections; [`convert`] classifies every secret into a Bitwarden item
//! type, re-shapes its fields and resolves folder assignments.

mod convert;
mod parser;

pub use convert::{convert, normalize_path, Conversion, RecordMappingError};
pub use parser::{
    parse_reader, parse_str, FieldHint, FolderRecord, ParsedExport, PermissionEntry, SecretField,
    SecretRecord, Template, TemplateField,
};

/// Fatal parse failure. The conversion pass is aborted; a partially parsed
/// export would corrupt the classifier's field-presence tests.
#[derive(Debug, thiserror::Error)]
pub enum DelineaError {
    /// The underlying reader rejected the document (unbalanced tags,
    /// truncation, bad escapes). The offset is the byte position in the
    /// input.
    #[error("malformed export at byte offset {offset}: {source}")]
    Parse {
        /// Byte position the reader had reached.
        offset: u64,
        /// Reader error.
        #[source]
        source: quick_xml::Error,
    },

    /// The top-level container was not the expected root tag.
    #[error("unexpected root element `{0}`, expected `ImportFile`")]
    UnexpectedRoot(String),

    /// Input ended while elements were still open.
    #[error("export ended before `{0}` was closed")]
    Truncated(String),
}
