//! Read-only structural parsing of ELF files.
//! Quick ELF reference: https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
//!
//! ELF files start with a 16-byte identification prefix which decides,
//! once, whether the rest of the file uses 32- or 64-bit field widths and
//! which byte order applies. The file header that follows locates two
//! tables:
//! * Program headers identify segments, the regions the OS loader maps into
//!   memory.
//! * Section headers identify sections, the regions linkers and debuggers
//!   work with: symbol tables, string tables, dynamic-linking info, etc.
//!
//! Sections and segments are independent partitions of the same bytes and
//! may overlap. Decoding starts from an in-memory byte buffer (no I/O here)
//! and ends in `ElfFile`, an immutable queryable model. Everything reads
//! through the bounds-checked `Reader`; a malformed file yields an
//! `ElfError`, never an out-of-bounds read.
pub mod dynamic;
pub mod elf_file;
pub mod error;
pub mod header;
pub mod ident;
pub mod io;
pub mod primitives;
pub mod sections;
pub mod segments;
pub mod symbols;

#[cfg(test)]
pub mod fixtures;

pub use dynamic::*;
pub use elf_file::*;
pub use error::*;
pub use header::*;
pub use ident::*;
pub use io::*;
pub use primitives::*;
pub use sections::*;
pub use segments::*;
pub use symbols::*;
