//! The program header table. Used by the run-time loader; also see sections.
//! Segments and sections are two independent partitions of the same bytes, so
//! their regions may legitimately overlap.
use super::{ElfError, FileHeader, Reader, Stream};

const EXECUTE_FLAG: u32 = 0x1;
const WRITE_FLAG: u32 = 0x2;
const READ_FLAG: u32 = 0x4;

/// Describes a segment, one runtime-loadable region.
#[derive(Clone, Debug)]
pub struct Segment {
    pub stype: SegmentType,

    /// Offset to the first byte of the segment in the file.
    pub offset: u64,

    /// Virtual address of the first byte in the segment.
    pub vaddr: u64,

    /// Physical address of the first byte in the segment.
    pub paddr: u64,

    /// Number of bytes the segment occupies in the file.
    pub file_size: u64,

    /// Number of bytes the segment occupies in memory. At least file_size;
    /// the difference is zero-filled by the loader.
    pub mem_size: u64,

    /// Read/Write/Execute flags.
    pub flags: u32,

    /// Zero or a power of two.
    pub align: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentType {
    /// Not to be used.
    Null,

    /// A loadable segment, described by p_filesz and p_memsz.
    Load,

    /// Specifies dynamic linking information.
    Dynamic,

    /// Location and size of a null-terminated path name to invoke as an interpreter.
    Interpreter,

    /// The location and size of auxiliary information.
    Note,

    /// Reserved but has unspecified semantics.
    Shlib,

    /// The location and size of the program header table itself.
    Phdr,

    /// The Thread-Local Storage template.
    Tls,

    /// Reserved for OS-specific semantics (e.g. GNU_STACK). Passed through.
    OsSpecific(u32),

    /// Reserved for processor-specific semantics. Passed through.
    ProcSpecific(u32),

    /// Anything else, kept verbatim.
    Other(u32),
}

impl SegmentType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => SegmentType::Null,
            1 => SegmentType::Load,
            2 => SegmentType::Dynamic,
            3 => SegmentType::Interpreter,
            4 => SegmentType::Note,
            5 => SegmentType::Shlib,
            6 => SegmentType::Phdr,
            7 => SegmentType::Tls,
            0x60000000..=0x6fffffff => SegmentType::OsSpecific(value),
            0x70000000..=0x7fffffff => SegmentType::ProcSpecific(value),
            _ => SegmentType::Other(value),
        }
    }
}

impl Segment {
    fn parse(reader: &Reader, offset: u64) -> Result<Self, ElfError> {
        // Field sizes and order differ between 32-bit and 64-bit ELF files:
        // p_flags moved next to p_type in the 64-bit layout.
        let mut s = Stream::new(reader, offset);
        if reader.sixty_four_bit {
            let p_type = SegmentType::from_u32(s.read_word()?);
            let p_flags = s.read_word()?;
            let p_offset = s.read_offset()?;
            let p_vaddr = s.read_addr()?;
            let p_paddr = s.read_addr()?;
            let p_filesz = s.read_xword()?;
            let p_memsz = s.read_xword()?;
            let p_align = s.read_xword()?;
            Ok(Segment {
                stype: p_type,
                flags: p_flags,
                offset: p_offset,
                vaddr: p_vaddr,
                paddr: p_paddr,
                file_size: p_filesz,
                mem_size: p_memsz,
                align: p_align,
            })
        } else {
            let p_type = SegmentType::from_u32(s.read_word()?);
            let p_offset = s.read_offset()?;
            let p_vaddr = s.read_addr()?;
            let p_paddr = s.read_addr()?;
            let p_filesz = s.read_word()? as u64;
            let p_memsz = s.read_word()? as u64;
            let p_flags = s.read_word()?;
            let p_align = s.read_word()? as u64;
            Ok(Segment {
                stype: p_type,
                flags: p_flags,
                offset: p_offset,
                vaddr: p_vaddr,
                paddr: p_paddr,
                file_size: p_filesz,
                mem_size: p_memsz,
                align: p_align,
            })
        }
    }

    pub fn executable(&self) -> bool {
        self.flags & EXECUTE_FLAG != 0
    }

    pub fn writeable(&self) -> bool {
        self.flags & WRITE_FLAG != 0
    }

    pub fn readable(&self) -> bool {
        self.flags & READ_FLAG != 0
    }

    pub fn flags(flags: u32) -> String {
        let mut result = String::new();
        if flags & READ_FLAG != 0 {
            result.push('r');
        } else {
            result.push('-');
        }
        if flags & WRITE_FLAG != 0 {
            result.push('w');
        } else {
            result.push('-');
        }
        if flags & EXECUTE_FLAG != 0 {
            result.push('x');
        } else {
            result.push('-');
        }
        result
    }
}

/// Decode the whole program header table in on-disk order; load order is
/// operationally meaningful so nothing here reorders it.
pub fn decode_program_table(
    reader: &Reader,
    header: &FileHeader,
) -> Result<Vec<Segment>, ElfError> {
    let mut segments = Vec::with_capacity(header.num_ph_entries as usize);
    let mut offset = header.ph_offset;

    for index in 0..header.num_ph_entries {
        let segment = Segment::parse(reader, offset)?;
        if segment.file_size > segment.mem_size {
            return Err(ElfError::InvalidTableBounds(format!(
                "segment {index} file size {:#x} exceeds its memory size {:#x}",
                segment.file_size, segment.mem_size
            )));
        }
        if segment.align != 0 && !segment.align.is_power_of_two() {
            return Err(ElfError::InvalidTableBounds(format!(
                "segment {index} alignment {:#x} is not zero or a power of two",
                segment.align
            )));
        }
        let in_bounds = segment
            .offset
            .checked_add(segment.file_size)
            .map(|end| end <= reader.len())
            .unwrap_or(false);
        if !in_bounds {
            return Err(ElfError::InvalidTableBounds(format!(
                "segment {index} at offset {:#x} with file size {:#x} exceeds the {} byte buffer",
                segment.offset,
                segment.file_size,
                reader.len()
            )));
        }
        segments.push(segment);
        offset += header.ph_entry_size as u64;
    }
    Ok(segments)
}
