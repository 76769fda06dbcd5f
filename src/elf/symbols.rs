//! Symbol tables: named, typed, bound records used by the linker and
//! debugger. A file can carry both a full `.symtab` and the run-time
//! `.dynsym`; both decode the same way and both are kept.
use super::{ElfError, Reader, Section, SectionIndex, SectionType, Stream, StringIndex, StringTable};

pub const SYMBOL_ENTRY_SIZE_32: u64 = 16;
pub const SYMBOL_ENTRY_SIZE_64: u64 = 24;

#[derive(Debug)]
pub struct SymbolTable {
    /// Index of the originating symbol-table section.
    pub section: usize,

    /// Resolved name of that section, e.g. ".symtab".
    pub section_name: String,

    /// True for the dynamic linker's table.
    pub dynamic: bool,

    /// Entry 0 is always the reserved null symbol. It is retained so that
    /// index-based references from other structures stay valid.
    pub entries: Vec<Symbol>,
}

#[derive(Debug)]
pub struct Symbol {
    // see https://refspecs.linuxbase.org/elf/gabi4+/ch4.symtab.html
    /// Name resolved through the string table named by the symbol-table
    /// section's link field. Empty for the null symbol.
    pub name: String,

    /// Index into the symbol string table.
    pub name_index: StringIndex,

    /// Can be an address, absolute value, etc.
    pub value: u64,

    /// Size of the symbol. Zero if the symbol has no or unknown size.
    pub size: u64,

    pub stype: SymbolType,

    pub binding: SymbolBinding,

    pub visibility: SymbolVisibility,

    pub index: SymbolIndex,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolIndex {
    /// Symbol has an absolute value that will not change with relocation.
    Abs,

    /// A common block that has not yet been allocated. Value has alignment.
    Common,

    /// Symbol value refers to another section at this index.
    Index(SectionIndex),

    /// Value is undefined. Linker will fix these up.
    Undef,

    /// Used when Index overflows. Related section will be of type
    /// SymbolTableIndexes.
    XIndex,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolVisibility {
    /// Visibility is per binding.
    Default,

    /// Visible only within its object file. CPU may special case this.
    Internal,

    /// Visible only within its object file.
    Hidden,

    /// Visible to other object files but cannot be preempted.
    Protected,
}

/// Linkage visibility and behavior.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolBinding {
    /// Symbol is not visible outside the object file containing its
    /// definition. These will appear before global and weak symbols.
    Local,

    /// Visible to all object files.
    Global,

    /// Similar to Global but has lower precedence. These can be preempted
    /// by a Global.
    Weak,

    /// For use by OS or CPU.
    Reserved,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolType {
    None,

    /// A data object, variable, array, etc.
    Object,

    /// Function or other executable code.
    Func,

    /// Another section. Used for relocation.
    Section,

    /// Source file associated with the symbol table.
    File,

    /// Uninitialized common blocks. Used by the linker.
    Common,

    /// Thread Local Storage data. Value is an offset to the data.
    Tls,

    /// For use by OS or CPU.
    Reserved,
}

impl SymbolIndex {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => SymbolIndex::Undef,
            0xfff1 => SymbolIndex::Abs,
            0xfff2 => SymbolIndex::Common,
            0xffff => SymbolIndex::XIndex,
            _ => SymbolIndex::Index(SectionIndex(value as u32)),
        }
    }
}

impl SymbolVisibility {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x3 {
            0 => SymbolVisibility::Default,
            1 => SymbolVisibility::Internal,
            2 => SymbolVisibility::Hidden,
            _ => SymbolVisibility::Protected,
        }
    }
}

impl SymbolBinding {
    /// High four bits of the packed info byte.
    pub fn from_u8(value: u8) -> Self {
        match value >> 4 {
            0 => SymbolBinding::Local,
            1 => SymbolBinding::Global,
            2 => SymbolBinding::Weak,
            _ => SymbolBinding::Reserved,
        }
    }
}

impl SymbolType {
    /// Low four bits of the packed info byte.
    pub fn from_u8(value: u8) -> Self {
        match value & 0xf {
            0 => SymbolType::None,
            1 => SymbolType::Object,
            2 => SymbolType::Func,
            3 => SymbolType::Section,
            4 => SymbolType::File,
            5 => SymbolType::Common,
            6 => SymbolType::Tls,
            _ => SymbolType::Reserved,
        }
    }
}

impl Symbol {
    fn parse(reader: &Reader, offset: u64, strings: &StringTable) -> Result<Self, ElfError> {
        // Field order is different between the classes so we need both cases.
        let mut s = Stream::new(reader, offset);
        let (name, value, size, info, other, index) = if reader.sixty_four_bit {
            let name = s.read_word()?;
            let info = s.read_byte()?;
            let other = s.read_byte()?;
            let index = s.read_half()?;
            let value = s.read_addr()?;
            let size = s.read_xword()?;
            (name, value, size, info, other, index)
        } else {
            let name = s.read_word()?;
            let value = s.read_addr()?;
            let size = s.read_word()? as u64;
            let info = s.read_byte()?;
            let other = s.read_byte()?;
            let index = s.read_half()?;
            (name, value, size, info, other, index)
        };
        Ok(Symbol {
            name: strings.get(name as u64)?,
            name_index: StringIndex(name),
            value,
            size,
            stype: SymbolType::from_u8(info),
            binding: SymbolBinding::from_u8(info),
            visibility: SymbolVisibility::from_u8(other),
            index: SymbolIndex::from_u16(index),
        })
    }
}

impl SymbolTable {
    /// Decode one symbol-table section. The record stride is the section's
    /// own entry_size: larger than the fixed fields is accepted (trailing
    /// bytes skipped), smaller is not decodable.
    pub fn parse(
        reader: &Reader,
        sections: &[Section],
        index: usize,
    ) -> Result<SymbolTable, ElfError> {
        let section = &sections[index];
        let minimum = if reader.sixty_four_bit {
            SYMBOL_ENTRY_SIZE_64
        } else {
            SYMBOL_ENTRY_SIZE_32
        };
        if section.entry_size < minimum {
            return Err(ElfError::UnsupportedRecordSize(format!(
                "symbol table section {index} declares {} byte entries, minimum is {minimum}",
                section.entry_size
            )));
        }

        let link = section.link.0 as usize;
        let strtab = match sections.get(link) {
            Some(s) if s.stype == SectionType::StringTable => s,
            _ => {
                return Err(ElfError::InvalidTableBounds(format!(
                    "symbol table section {index} links to section {link} which is not a string table"
                )));
            }
        };
        let strings = StringTable::new(reader, link, strtab);

        let count = section.size / section.entry_size;
        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count {
            let offset = section.offset + i * section.entry_size;
            entries.push(Symbol::parse(reader, offset, &strings)?);
        }

        Ok(SymbolTable {
            section: index,
            section_name: section.name.clone(),
            dynamic: section.stype == SectionType::DynamicSymbolTable,
            entries,
        })
    }
}

/// Indexes of every symbol-table section, in table order. Decode order for
/// name lookups follows this order.
pub fn symbol_table_sections(sections: &[Section]) -> Vec<usize> {
    sections
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            matches!(
                s.stype,
                SectionType::SymbolTable | SectionType::DynamicSymbolTable
            )
        })
        .map(|(i, _)| i)
        .collect()
}
