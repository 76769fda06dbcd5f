//! The section header table. Used by the linker and debugger; also see
//! segments, which describe the same bytes from the loader's point of view.
//!
//! Decoding runs in two passes: pass one reads every raw record (the string
//! table holding the names is itself one of the records), pass two resolves
//! each name through the section at `e_shstrndx`.
use super::{ElfError, FileHeader, Reader, SectionIndex, Stream, StringIndex};

const WRITE_FLAG: u64 = 1 << 0; // Writable
const ALLOC_FLAG: u64 = 1 << 1; // Occupies memory during execution
const EXECINSTR_FLAG: u64 = 1 << 2; // Executable
const MERGE_FLAG: u64 = 1 << 4; // Might be merged
const STRINGS_FLAG: u64 = 1 << 5; // Contains nul-terminated strings
const INFO_LINK_FLAG: u64 = 1 << 6; // `sh_info' contains SHT index
const LINK_ORDER_FLAG: u64 = 1 << 7; // Preserve order after combining
const OS_NONCONFORMING_FLAG: u64 = 1 << 8; // Non-standard OS specific handling required
const GROUP_FLAG: u64 = 1 << 9; // Section is member of a group.
const TLS_FLAG: u64 = 1 << 10; // Section hold thread-local data.
const COMPRESSED_FLAG: u64 = 1 << 11; // Section with compressed data.
const MASKOS_FLAG: u64 = 0x0ff00000; // OS-specific.
const MASKPROC_FLAG: u64 = 0xf0000000; // Processor-specific

/// Describes a section. `name` is empty until the resolution pass runs (and
/// stays empty when the file carries no section name table).
#[derive(Clone, Debug)]
pub struct Section {
    pub name: String,

    /// Index into the section name string table.
    pub name_index: StringIndex,

    pub stype: SectionType,

    /// Write, alloc, and/or exec.
    pub flags: u64,

    /// Virtual address of the section at execution, zero if not loaded.
    pub addr: u64,

    /// Offset in the ELF file to the first byte of the section.
    pub offset: u64,

    /// Section size in bytes. For NoBits sections this is memory size only.
    pub size: u64,

    /// Link to another section with related information, usually a string
    /// or symbol table.
    pub link: SectionIndex,

    /// Additional section info.
    pub info: u32,

    /// Section alignment.
    pub align: u64,

    /// Set if the section holds a table of entries.
    pub entry_size: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionType {
    /// Dynamic linking information.
    Dynamic,

    /// Dynamic linker symbol table.
    DynamicSymbolTable,

    /// Array of pointers to termination functions.
    FiniArray,

    /// GNU style hash table.
    GnuHash,

    /// Section group.
    Group,

    /// Symbol hash table.
    HashTable,

    /// Array of pointers to initialization functions.
    InitArray,

    /// Uninitialized data. Occupies no space in the file.
    NoBits,

    /// Arbitrary metadata.
    Note,

    /// Not to be used.
    Null,

    /// Array of pointers to functions to be called before the regular
    /// initialization functions.
    PreinitArray,

    /// CPU instructions or constant data.
    ProgBits,

    /// Relocation entries with addends.
    RelocationsWith,

    /// Relocation entries without addends.
    RelocationsWithout,

    /// Strings for use by the linker and debugger.
    StringTable,

    /// Debugging info.
    SymbolTable,

    /// Extended section indexes for an associated symbol table.
    SymbolTableIndexes,

    /// GNU symbol versions that are provided.
    VerDef,

    /// GNU symbol versions that are required.
    VerNeed,

    /// GNU symbol version table.
    VerSym,

    /// Reserved for OS-specific semantics. Passed through, not rejected.
    OsSpecific(u32),

    /// Reserved for processor-specific semantics. Passed through, not rejected.
    ProcSpecific(u32),

    /// Anything else, kept verbatim for forward compatibility.
    Other(u32),
}

impl SectionType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x0 => SectionType::Null,
            0x1 => SectionType::ProgBits,
            0x2 => SectionType::SymbolTable,
            0x3 => SectionType::StringTable,
            0x4 => SectionType::RelocationsWith,
            0x5 => SectionType::HashTable,
            0x6 => SectionType::Dynamic,
            0x7 => SectionType::Note,
            0x8 => SectionType::NoBits,
            0x9 => SectionType::RelocationsWithout,
            0xb => SectionType::DynamicSymbolTable,
            0xe => SectionType::InitArray,
            0xf => SectionType::FiniArray,
            0x10 => SectionType::PreinitArray,
            0x11 => SectionType::Group,
            0x12 => SectionType::SymbolTableIndexes,
            0x6ffffff6 => SectionType::GnuHash,
            0x6ffffffd => SectionType::VerDef,
            0x6ffffffe => SectionType::VerNeed,
            0x6fffffff => SectionType::VerSym,
            0x60000000..=0x6fffffff => SectionType::OsSpecific(value),
            0x70000000..=0x7fffffff => SectionType::ProcSpecific(value),
            _ => SectionType::Other(value),
        }
    }

    /// NoBits (and the reserved null entry) describe regions with no bytes in
    /// the file, so their offset/size make no claim against the buffer.
    pub fn occupies_file_space(&self) -> bool {
        !matches!(self, SectionType::Null | SectionType::NoBits)
    }
}

impl Section {
    pub fn flags(flags: u64) -> String {
        let mut result = Vec::new();
        if flags & WRITE_FLAG != 0 {
            result.push("WRITE");
        }
        if flags & ALLOC_FLAG != 0 {
            result.push("ALLOC");
        }
        if flags & EXECINSTR_FLAG != 0 {
            result.push("EXEC");
        }
        if flags & MERGE_FLAG != 0 {
            result.push("MERGE");
        }
        if flags & STRINGS_FLAG != 0 {
            result.push("STRINGS");
        }
        if flags & INFO_LINK_FLAG != 0 {
            result.push("INFO");
        }
        if flags & LINK_ORDER_FLAG != 0 {
            result.push("LINK");
        }
        if flags & OS_NONCONFORMING_FLAG != 0 {
            result.push("OS_NONCONFORMING");
        }
        if flags & GROUP_FLAG != 0 {
            result.push("GROUP");
        }
        if flags & TLS_FLAG != 0 {
            result.push("TLS");
        }
        if flags & COMPRESSED_FLAG != 0 {
            result.push("COMPRESSED");
        }
        if flags & MASKOS_FLAG != 0 {
            result.push("MASKOS");
        }
        if flags & MASKPROC_FLAG != 0 {
            result.push("MASKPROC");
        }
        if result.is_empty() {
            result.push("none");
        }
        result.join(" ")
    }

    fn parse(reader: &Reader, offset: u64) -> Result<Self, ElfError> {
        let mut s = Stream::new(reader, offset);
        if reader.sixty_four_bit {
            let name = s.read_word()?;
            let stype = SectionType::from_u32(s.read_word()?);
            let flags = s.read_xword()?;
            let addr = s.read_addr()?;
            let offset = s.read_offset()?;
            let size = s.read_xword()?;
            let link = s.read_word()?;
            let info = s.read_word()?;
            let align = s.read_xword()?;
            let entry_size = s.read_xword()?;
            Ok(Section {
                name: String::new(),
                name_index: StringIndex(name),
                stype,
                flags,
                addr,
                offset,
                size,
                link: SectionIndex(link),
                info,
                align,
                entry_size,
            })
        } else {
            let name = s.read_word()?;
            let stype = SectionType::from_u32(s.read_word()?);
            let flags = s.read_word()? as u64;
            let addr = s.read_addr()?;
            let offset = s.read_offset()?;
            let size = s.read_word()? as u64;
            let link = s.read_word()?;
            let info = s.read_word()?;
            let align = s.read_word()? as u64;
            let entry_size = s.read_word()? as u64;
            Ok(Section {
                name: String::new(),
                name_index: StringIndex(name),
                stype,
                flags,
                addr,
                offset,
                size,
                link: SectionIndex(link),
                info,
                align,
                entry_size,
            })
        }
    }
}

/// Pass one: decode every record using the header's declared stride (which
/// may exceed the structure size; trailing bytes per record belong to future
/// format revisions and are skipped).
pub fn decode_section_table(
    reader: &Reader,
    header: &FileHeader,
) -> Result<Vec<Section>, ElfError> {
    let mut sections = Vec::with_capacity(header.num_section_entries as usize);
    let mut offset = header.section_offset;

    for index in 0..header.num_section_entries {
        let section = Section::parse(reader, offset)?;
        if section.stype.occupies_file_space() && section.size > 0 {
            let in_bounds = section
                .offset
                .checked_add(section.size)
                .map(|end| end <= reader.len())
                .unwrap_or(false);
            if !in_bounds {
                return Err(ElfError::InvalidTableBounds(format!(
                    "section {index} at offset {:#x} with size {:#x} exceeds the {} byte buffer",
                    section.offset,
                    section.size,
                    reader.len()
                )));
            }
        }
        sections.push(section);
        offset += header.section_entry_size as u64;
    }
    Ok(sections)
}

/// Pass two: resolve names through the section at `e_shstrndx`. With the
/// no-names sentinel every name stays empty rather than failing.
pub fn resolve_section_names(
    reader: &Reader,
    header: &FileHeader,
    sections: &mut [Section],
) -> Result<(), ElfError> {
    if !header.has_section_names() {
        return Ok(());
    }
    let index = header.string_table_index as usize;
    let names = StringTable::new(reader, index, &sections[index]);
    for section in sections.iter_mut() {
        section.name = names.get(section.name_index.0 as u64)?;
    }
    Ok(())
}

/// A section's file region interpreted as concatenated null-terminated
/// strings, addressed by byte offset.
pub struct StringTable<'a, 'b> {
    reader: &'b Reader<'a>,
    section: usize,
    offset: u64,
    size: u64,
}

impl<'a, 'b> StringTable<'a, 'b> {
    pub fn new(reader: &'b Reader<'a>, section_index: usize, section: &Section) -> Self {
        StringTable {
            reader,
            section: section_index,
            offset: section.offset,
            size: section.size,
        }
    }

    pub fn get(&self, index: u64) -> Result<String, ElfError> {
        // Checked arithmetic: a no-file-space section can carry an arbitrary
        // offset/size and still end up designated as a string table.
        let start = self.offset.checked_add(index);
        let end = self.offset.checked_add(self.size);
        match (start, end) {
            (Some(start), Some(end)) if index < self.size => {
                self.reader.read_string(start, end)
            }
            _ => Err(ElfError::InvalidNameOffset(format!(
                "name offset {index:#x} is outside string table section {} of {:#x} bytes",
                self.section, self.size
            ))),
        }
    }
}
