//! The dynamic-linking section: tag/value pairs describing shared-library
//! dependencies and the run-time linker's working set.
use super::{ElfError, Reader, Section, SectionType, Stream, StringTable};

pub const DYNAMIC_ENTRY_SIZE_32: u64 = 8;
pub const DYNAMIC_ENTRY_SIZE_64: u64 = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DynamicTag {
    /// Marks the end of the table.
    Null,

    /// Name of a needed library, as an offset into the dynamic string table.
    Needed,

    PltRelSize,
    PltGot,

    /// Address of the symbol hash table.
    Hash,

    /// Address of the dynamic string table.
    StringTable,

    /// Address of the dynamic symbol table.
    SymbolTable,

    RelA,
    RelASize,
    RelAEntrySize,

    /// Size of the dynamic string table.
    StringTableSize,

    SymbolEntrySize,

    /// Address of the initialization function.
    Init,

    /// Address of the termination function.
    Fini,

    /// This object's own name, as an offset into the dynamic string table.
    SoName,

    /// Library search path, superseded by RunPath.
    RPath,

    Symbolic,
    Rel,
    RelSize,
    RelEntrySize,
    PltRelType,
    Debug,
    TextRel,
    JmpRel,
    BindNow,
    InitArray,
    FiniArray,
    InitArraySize,
    FiniArraySize,

    /// Library search path.
    RunPath,

    Flags,

    /// GNU style hash table.
    GnuHash,

    /// OS- or processor-specific tags and anything newer than this decoder,
    /// kept verbatim.
    Other(i64),
}

impl DynamicTag {
    pub fn from_i64(value: i64) -> Self {
        match value {
            0 => DynamicTag::Null,
            1 => DynamicTag::Needed,
            2 => DynamicTag::PltRelSize,
            3 => DynamicTag::PltGot,
            4 => DynamicTag::Hash,
            5 => DynamicTag::StringTable,
            6 => DynamicTag::SymbolTable,
            7 => DynamicTag::RelA,
            8 => DynamicTag::RelASize,
            9 => DynamicTag::RelAEntrySize,
            10 => DynamicTag::StringTableSize,
            11 => DynamicTag::SymbolEntrySize,
            12 => DynamicTag::Init,
            13 => DynamicTag::Fini,
            14 => DynamicTag::SoName,
            15 => DynamicTag::RPath,
            16 => DynamicTag::Symbolic,
            17 => DynamicTag::Rel,
            18 => DynamicTag::RelSize,
            19 => DynamicTag::RelEntrySize,
            20 => DynamicTag::PltRelType,
            21 => DynamicTag::Debug,
            22 => DynamicTag::TextRel,
            23 => DynamicTag::JmpRel,
            24 => DynamicTag::BindNow,
            25 => DynamicTag::InitArray,
            26 => DynamicTag::FiniArray,
            27 => DynamicTag::InitArraySize,
            28 => DynamicTag::FiniArraySize,
            29 => DynamicTag::RunPath,
            30 => DynamicTag::Flags,
            0x6ffffef5 => DynamicTag::GnuHash,
            _ => DynamicTag::Other(value),
        }
    }
}

/// One tag/value pair. Whether value is an integer or an address depends on
/// the tag; it is stored widened either way.
#[derive(Clone, Copy, Debug)]
pub struct DynamicEntry {
    pub tag: DynamicTag,
    pub value: u64,
}

#[derive(Debug)]
pub struct DynamicTable {
    /// Index of the originating dynamic section.
    pub section: usize,

    /// Every entry before the terminator, in on-disk order. The terminator
    /// itself is not kept.
    pub entries: Vec<DynamicEntry>,

    /// Needed-library names in on-disk order. Link order is sometimes
    /// load-order-significant so this is never sorted.
    pub dependencies: Vec<String>,
}

/// The first section typed Dynamic, if any.
pub fn find_dynamic_section(sections: &[Section]) -> Option<usize> {
    sections
        .iter()
        .position(|s| s.stype == SectionType::Dynamic)
}

impl DynamicTable {
    /// Iterates tag/value pairs until the null tag or the section boundary,
    /// whichever comes first. Producers sometimes size the section exactly
    /// and omit the terminator; that parses cleanly.
    pub fn parse(
        reader: &Reader,
        sections: &[Section],
        index: usize,
        warnings: &mut Vec<String>,
    ) -> Result<DynamicTable, ElfError> {
        let section = &sections[index];
        let minimum = if reader.sixty_four_bit {
            DYNAMIC_ENTRY_SIZE_64
        } else {
            DYNAMIC_ENTRY_SIZE_32
        };
        if section.entry_size < minimum {
            return Err(ElfError::UnsupportedRecordSize(format!(
                "dynamic section {index} declares {} byte entries, minimum is {minimum}",
                section.entry_size
            )));
        }

        let mut entries = Vec::new();
        let count = section.size / section.entry_size;
        for i in 0..count {
            let mut s = Stream::new(reader, section.offset + i * section.entry_size);
            let tag = DynamicTag::from_i64(s.read_sxword()?);
            let value = s.read_addr()?;
            if tag == DynamicTag::Null {
                break;
            }
            entries.push(DynamicEntry { tag, value });
        }

        let dependencies = resolve_dependencies(reader, sections, index, &entries, warnings)?;
        Ok(DynamicTable {
            section: index,
            entries,
            dependencies,
        })
    }

    /// Ordered dependency names, as resolved from the Needed entries.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// The dynamic string table is named twice: by the section's link field and
/// by the StringTable tag's virtual address. The link wins when they
/// disagree; the tag is the fallback when the link is missing or wrong.
fn resolve_dependencies(
    reader: &Reader,
    sections: &[Section],
    index: usize,
    entries: &[DynamicEntry],
    warnings: &mut Vec<String>,
) -> Result<Vec<String>, ElfError> {
    let link = sections[index].link.0 as usize;
    let linked = sections
        .get(link)
        .filter(|s| s.stype == SectionType::StringTable)
        .map(|s| (link, s));

    let tag_addr = entries
        .iter()
        .find(|e| e.tag == DynamicTag::StringTable)
        .map(|e| e.value);

    let strtab = match (linked, tag_addr) {
        (Some((i, s)), Some(addr)) => {
            if s.addr != addr {
                warnings.push(format!(
                    "dynamic string table tag points at {addr:#x} but section {i} \
                     linked from the dynamic section is at {:#x}; using the link",
                    s.addr
                ));
            }
            Some((i, s))
        }
        (Some((i, s)), None) => Some((i, s)),
        (None, Some(addr)) => sections
            .iter()
            .enumerate()
            .find(|(_, s)| s.stype == SectionType::StringTable && s.addr == addr),
        (None, None) => None,
    };

    let needed: Vec<u64> = entries
        .iter()
        .filter(|e| e.tag == DynamicTag::Needed)
        .map(|e| e.value)
        .collect();
    if needed.is_empty() {
        return Ok(Vec::new());
    }
    let (strtab_index, strtab) = strtab.ok_or_else(|| {
        ElfError::InvalidTableBounds(format!(
            "dynamic section {index} has no usable string table for its dependencies"
        ))
    })?;

    let strings = StringTable::new(reader, strtab_index, strtab);
    needed.into_iter().map(|off| strings.get(off)).collect()
}
