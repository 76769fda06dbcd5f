//! Parse failure taxonomy. Identification and file header failures are fatal
//! to the whole parse; table failures are scoped to the table that produced
//! them (see `ParseMode`).
use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ElfError {
    /// Bad magic, or a class/encoding byte outside the two defined values.
    #[error("MalformedIdentification: {0}")]
    MalformedIdentification(String),

    /// The buffer is shorter than the file header for the identified class.
    #[error("TruncatedHeader: need {needed} bytes for the file header, buffer has {actual}")]
    TruncatedHeader { needed: u64, actual: u64 },

    /// An offset/size/count combination would read outside the buffer, or a
    /// record violates a structural invariant that poisons its whole table.
    #[error("InvalidTableBounds: {0}")]
    InvalidTableBounds(String),

    /// A name offset points outside its string table.
    #[error("InvalidNameOffset: {0}")]
    InvalidNameOffset(String),

    /// A raw read past the end of the buffer.
    #[error("OutOfBounds: read at offset {offset:#x} of {len} bytes exceeds buffer length {buffer}")]
    OutOfBounds { offset: u64, len: u64, buffer: u64 },

    /// A table declares an entry size smaller than its record's fixed fields.
    #[error("UnsupportedRecordSize: {0}")]
    UnsupportedRecordSize(String),
}

impl ElfError {
    /// The failure kind without the offending offsets, e.g. for exit diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ElfError::MalformedIdentification(_) => "MalformedIdentification",
            ElfError::TruncatedHeader { .. } => "TruncatedHeader",
            ElfError::InvalidTableBounds(_) => "InvalidTableBounds",
            ElfError::InvalidNameOffset(_) => "InvalidNameOffset",
            ElfError::OutOfBounds { .. } => "OutOfBounds",
            ElfError::UnsupportedRecordSize(_) => "UnsupportedRecordSize",
        }
    }
}
