//! The ELF file header, decoded into one width-normalized struct. Offsets and
//! counts are widened to 64 bits here so no consumer branches on class again.
//!
//! Table bounds are validated here rather than in the table decoders: a
//! header whose offset/entry-size/count arithmetic escapes the buffer fails
//! the whole parse with a single diagnostic.
use super::{Class, ElfError, Identification, Reader, Stream};

pub const HEADER_SIZE_32: u64 = 52;
pub const HEADER_SIZE_64: u64 = 64;
pub const SECTION_ENTRY_SIZE_32: u64 = 40;
pub const SECTION_ENTRY_SIZE_64: u64 = 64;
pub const PROGRAM_ENTRY_SIZE_32: u64 = 32;
pub const PROGRAM_ENTRY_SIZE_64: u64 = 56;

/// Section index 0 doubles as the "no section names" sentinel in e_shstrndx.
pub const NO_SECTION_NAMES: u16 = 0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileType {
    Relocatable,
    Executable,
    SharedObject,
    Core,
    Other(u16),
}

impl FileType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => FileType::Relocatable,
            2 => FileType::Executable,
            3 => FileType::SharedObject,
            4 => FileType::Core,
            _ => FileType::Other(value),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FileType::Relocatable => "relocatable".to_string(),
            FileType::Executable => "executable".to_string(),
            FileType::SharedObject => "shared object".to_string(),
            FileType::Core => "core".to_string(),
            FileType::Other(value) => format!("other ({value:#x})"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileHeader {
    pub ftype: FileType,
    pub machine: u16,
    pub version: u32,
    pub entry: u64,
    pub ph_offset: u64,
    pub ph_entry_size: u16,
    pub num_ph_entries: u16,
    pub section_offset: u64,
    pub section_entry_size: u16,
    pub num_section_entries: u16,
    pub string_table_index: u16,
    pub flags: u32,
}

impl FileHeader {
    pub fn parse(reader: &Reader, ident: &Identification) -> Result<Self, ElfError> {
        let header_size = match ident.class {
            Class::ThirtyTwoBit => HEADER_SIZE_32,
            Class::SixtyFourBit => HEADER_SIZE_64,
        };
        if reader.len() < header_size {
            return Err(ElfError::TruncatedHeader {
                needed: header_size,
                actual: reader.len(),
            });
        }

        // Field widths differ per class but the order doesn't, so a single
        // Stream pass handles both layouts.
        let mut s = Stream::new(reader, 16);
        let ftype = FileType::from_u16(s.read_half()?);
        let machine = s.read_half()?;
        let version = s.read_word()?;
        let entry = s.read_addr()?;
        let ph_offset = s.read_offset()?;
        let section_offset = s.read_offset()?;
        let flags = s.read_word()?;
        let _ehsize = s.read_half()?;
        let ph_entry_size = s.read_half()?;
        let num_ph_entries = s.read_half()?;
        let section_entry_size = s.read_half()?;
        let num_section_entries = s.read_half()?;
        let string_table_index = s.read_half()?;

        let header = FileHeader {
            ftype,
            machine,
            version,
            entry,
            ph_offset,
            ph_entry_size,
            num_ph_entries,
            section_offset,
            section_entry_size,
            num_section_entries,
            string_table_index,
            flags,
        };
        header.validate(reader, ident)?;
        Ok(header)
    }

    fn validate(&self, reader: &Reader, ident: &Identification) -> Result<(), ElfError> {
        let (min_ph, min_sh) = match ident.class {
            Class::ThirtyTwoBit => (PROGRAM_ENTRY_SIZE_32, SECTION_ENTRY_SIZE_32),
            Class::SixtyFourBit => (PROGRAM_ENTRY_SIZE_64, SECTION_ENTRY_SIZE_64),
        };
        if self.num_ph_entries > 0 && (self.ph_entry_size as u64) < min_ph {
            return Err(ElfError::UnsupportedRecordSize(format!(
                "program header entries are {} bytes, minimum is {min_ph}",
                self.ph_entry_size
            )));
        }
        if self.num_section_entries > 0 && (self.section_entry_size as u64) < min_sh {
            return Err(ElfError::UnsupportedRecordSize(format!(
                "section header entries are {} bytes, minimum is {min_sh}",
                self.section_entry_size
            )));
        }

        check_table(
            reader,
            "program header table",
            self.ph_offset,
            self.ph_entry_size,
            self.num_ph_entries,
        )?;
        check_table(
            reader,
            "section header table",
            self.section_offset,
            self.section_entry_size,
            self.num_section_entries,
        )?;

        if self.string_table_index != NO_SECTION_NAMES
            && self.string_table_index >= self.num_section_entries
        {
            return Err(ElfError::InvalidTableBounds(format!(
                "section name string table index {} is outside the {} entry section table",
                self.string_table_index, self.num_section_entries
            )));
        }
        Ok(())
    }

    pub fn machine(&self) -> &'static str {
        match self.machine {
            0x02 => "SPARC",
            0x03 => "x86",
            0x08 => "MIPS",
            0x14 => "PowerPC",
            0x15 => "PowerPC64",
            0x28 => "ARM",
            0x2a => "SuperH",
            0x32 => "IA-64",
            0x3e => "x86-64",
            0xb7 => "AArch64",
            0xf3 => "RISC-V",
            _ => "unknown",
        }
    }

    pub fn has_section_names(&self) -> bool {
        self.string_table_index != NO_SECTION_NAMES
    }
}

/// Tables declared in the header must fit in the buffer. Checked with u64
/// arithmetic so a pathological entry size times count cannot wrap.
fn check_table(
    reader: &Reader,
    what: &str,
    offset: u64,
    entry_size: u16,
    count: u16,
) -> Result<(), ElfError> {
    if count == 0 {
        return Ok(());
    }
    let size = entry_size as u64 * count as u64;
    let in_bounds = offset
        .checked_add(size)
        .map(|end| end <= reader.len())
        .unwrap_or(false);
    if !in_bounds {
        return Err(ElfError::InvalidTableBounds(format!(
            "{what} at offset {offset:#x} with {count} entries of {entry_size} bytes \
             exceeds the {} byte buffer",
            reader.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::fixtures;
    use crate::elf::{Encoding, Identification};

    fn parse(bytes: &[u8]) -> Result<FileHeader, ElfError> {
        let ident = Identification::parse(bytes)?;
        let reader = Reader::new(bytes, &ident);
        FileHeader::parse(&reader, &ident)
    }

    #[test]
    fn widened_fields_match_fixture() {
        let bytes = fixtures::sample_64le();
        let header = parse(&bytes).unwrap();
        assert_eq!(header.ftype, FileType::Executable);
        assert_eq!(header.machine(), "x86-64");
        assert_eq!(header.entry, 0x401000);
        assert_eq!(header.num_ph_entries, 2);
        assert_eq!(header.num_section_entries, 7);
        assert!(header.has_section_names());
    }

    #[test]
    fn thirty_two_bit_fields_are_widened() {
        let bytes = fixtures::sample_32be();
        let header = parse(&bytes).unwrap();
        assert_eq!(header.ftype, FileType::SharedObject);
        assert_eq!(header.entry, 0x1000);
        assert_eq!(header.section_entry_size as u64, SECTION_ENTRY_SIZE_32);
    }

    #[test]
    fn truncated_header() {
        let bytes = fixtures::minimal(crate::elf::Class::SixtyFourBit, Encoding::LittleEndian);
        let err = parse(&bytes[..40]).unwrap_err();
        assert_eq!(
            err,
            ElfError::TruncatedHeader {
                needed: 64,
                actual: 40
            }
        );
    }

    #[test]
    fn section_table_past_buffer() {
        // Claims five sections but the buffer only has room for two.
        let bytes = fixtures::truncated_section_table();
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.kind(), "InvalidTableBounds");
    }

    #[test]
    fn undersized_entry_size() {
        let mut bytes = fixtures::sample_64le();
        bytes[58..60].copy_from_slice(&10u16.to_le_bytes()); // e_shentsize
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.kind(), "UnsupportedRecordSize");
    }

    #[test]
    fn string_table_index_out_of_range() {
        let mut bytes = fixtures::sample_64le();
        bytes[62..64].copy_from_slice(&100u16.to_le_bytes()); // e_shstrndx
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.kind(), "InvalidTableBounds");
    }
}
