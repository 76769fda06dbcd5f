//! Structural parsing of ELF binaries: executables, shared objects,
//! relocatable objects, and core files.
//!
//! The core (`elf`) consumes an in-memory byte buffer and produces an
//! immutable, queryable [`elf::ElfFile`]; it does no I/O of its own. The
//! `report` module renders the model into the human-readable summary the
//! `elfview` binary prints.
pub mod elf;
pub mod report;
pub mod utils;
