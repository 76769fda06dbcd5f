//! Synthetic ELF buffers for tests. Everything is built byte-by-byte so the
//! tests own the exact layout; there are no binary files checked in.
use super::{Class, Encoding};

/// Field offsets inside a 64-bit section header record. The patch helpers
/// below use these against the 64-bit little-endian samples.
pub const SHDR_NAME: u64 = 0;
pub const SHDR_OFFSET: u64 = 24;
pub const SHDR_SIZE: u64 = 32;
pub const SHDR_LINK: u64 = 40;
pub const SHDR_ENTSIZE: u64 = 56;

/// Field offsets inside a 64-bit program header record.
pub const PHDR_FILESZ: u64 = 32;
pub const PHDR_ALIGN: u64 = 48;

/// Section indexes in `sample_64le`.
pub const TEXT: usize = 1;
pub const BSS: usize = 2;
pub const DYNSTR: usize = 3;
pub const DYNAMIC: usize = 4;
pub const SYMTAB: usize = 5;
pub const STRTAB: usize = 6;
pub const SHSTRTAB: usize = 7;

struct Emit {
    bytes: Vec<u8>,
    le: bool,
}

impl Emit {
    fn new(le: bool) -> Self {
        Emit { bytes: Vec::new(), le }
    }

    fn here(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn u16(&mut self, value: u16) {
        let b = if self.le { value.to_le_bytes() } else { value.to_be_bytes() };
        self.raw(&b);
    }

    fn u32(&mut self, value: u32) {
        let b = if self.le { value.to_le_bytes() } else { value.to_be_bytes() };
        self.raw(&b);
    }

    fn u64(&mut self, value: u64) {
        let b = if self.le { value.to_le_bytes() } else { value.to_be_bytes() };
        self.raw(&b);
    }

    fn pad_to(&mut self, align: usize) {
        while self.bytes.len() % align != 0 {
            self.bytes.push(0);
        }
    }

    fn patch_u64(&mut self, at: u64, value: u64) {
        let at = at as usize;
        let b = if self.le { value.to_le_bytes() } else { value.to_be_bytes() };
        self.bytes[at..at + 8].copy_from_slice(&b);
    }

    /// 64-bit section header record.
    #[allow(clippy::too_many_arguments)]
    fn shdr64(
        &mut self,
        name: u32,
        stype: u32,
        flags: u64,
        addr: u64,
        offset: u64,
        size: u64,
        link: u32,
        info: u32,
        align: u64,
        entsize: u64,
    ) {
        self.u32(name);
        self.u32(stype);
        self.u64(flags);
        self.u64(addr);
        self.u64(offset);
        self.u64(size);
        self.u32(link);
        self.u32(info);
        self.u64(align);
        self.u64(entsize);
    }

    /// 32-bit section header record.
    #[allow(clippy::too_many_arguments)]
    fn shdr32(
        &mut self,
        name: u32,
        stype: u32,
        flags: u32,
        addr: u32,
        offset: u32,
        size: u32,
        link: u32,
        info: u32,
        align: u32,
        entsize: u32,
    ) {
        self.u32(name);
        self.u32(stype);
        self.u32(flags);
        self.u32(addr);
        self.u32(offset);
        self.u32(size);
        self.u32(link);
        self.u32(info);
        self.u32(align);
        self.u32(entsize);
    }
}

fn ident(class: Class, encoding: Encoding) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
    bytes[4] = match class {
        Class::ThirtyTwoBit => 1,
        Class::SixtyFourBit => 2,
    };
    bytes[5] = match encoding {
        Encoding::LittleEndian => 1,
        Encoding::BigEndian => 2,
    };
    bytes[6] = 1; // version
    bytes
}

/// A valid file header with no tables at all. The smallest thing the parser
/// accepts whole.
pub fn minimal(class: Class, encoding: Encoding) -> Vec<u8> {
    let mut e = Emit::new(encoding == Encoding::LittleEndian);
    e.raw(&ident(class, encoding));
    match class {
        Class::SixtyFourBit => {
            e.u16(2); // e_type: executable
            e.u16(0x3e); // x86-64
            e.u32(1);
            e.u64(0); // entry
            e.u64(0); // phoff
            e.u64(0); // shoff
            e.u32(0); // flags
            e.u16(64); // ehsize
            e.u16(0); // phentsize
            e.u16(0); // phnum
            e.u16(0); // shentsize
            e.u16(0); // shnum
            e.u16(0); // shstrndx
        }
        Class::ThirtyTwoBit => {
            e.u16(2);
            e.u16(0x03); // x86
            e.u32(1);
            e.u32(0); // entry
            e.u32(0); // phoff
            e.u32(0); // shoff
            e.u32(0); // flags
            e.u16(52); // ehsize
            e.u16(0);
            e.u16(0);
            e.u16(0);
            e.u16(0);
            e.u16(0);
        }
    }
    e.bytes
}

/// A header that claims five section records when the buffer only has room
/// for two.
pub fn truncated_section_table() -> Vec<u8> {
    let mut e = Emit::new(true);
    e.raw(&ident(Class::SixtyFourBit, Encoding::LittleEndian));
    e.u16(2);
    e.u16(0x3e);
    e.u32(1);
    e.u64(0);
    e.u64(0); // phoff
    e.u64(64); // shoff: right after this header
    e.u32(0);
    e.u16(64);
    e.u16(0);
    e.u16(0);
    e.u16(64); // shentsize
    e.u16(5); // shnum: five claimed...
    e.u16(0);
    e.raw(&[0u8; 128]); // ...two records' worth of bytes present
    e.bytes
}

/// A 64-bit little-endian executable with a text section, an (oversized,
/// file-space-free) .bss, a symbol table, and a dynamic section depending on
/// libc.so.0 and libm.so.6. Two program headers: PHDR then LOAD.
pub fn sample_64le() -> Vec<u8> {
    sample_64le_with(true)
}

/// Same file, but the dynamic table exactly fills its section and omits the
/// null terminator.
pub fn sample_64le_unterminated() -> Vec<u8> {
    sample_64le_with(false)
}

fn sample_64le_with(terminated: bool) -> Vec<u8> {
    let mut e = Emit::new(true);
    e.raw(&ident(Class::SixtyFourBit, Encoding::LittleEndian));
    e.u16(2); // executable
    e.u16(0x3e); // x86-64
    e.u32(1);
    e.u64(0x401000); // entry
    e.u64(0); // phoff, patched below
    e.u64(0); // shoff, patched below
    e.u32(0);
    e.u16(64); // ehsize
    e.u16(56); // phentsize
    e.u16(2); // phnum
    e.u16(64); // shentsize
    e.u16(8); // shnum
    e.u16(SHSTRTAB as u16); // shstrndx

    e.pad_to(16);
    let text_off = e.here();
    e.raw(&[0x90; 16]);

    let dynstr = b"\0libc.so.0\0libm.so.6\0"; // libc @ 1, libm @ 11
    let dynstr_off = e.here();
    e.raw(dynstr);

    e.pad_to(8);
    let dynamic_off = e.here();
    e.u64(1); // Needed
    e.u64(1); // -> "libc.so.0"
    e.u64(1); // Needed
    e.u64(11); // -> "libm.so.6"
    e.u64(5); // StringTable
    e.u64(0x402000); // vaddr of .dynstr
    if terminated {
        e.u64(0);
        e.u64(0);
    }
    let dynamic_size = e.here() - dynamic_off;

    e.pad_to(8);
    let symtab_off = e.here();
    // null symbol
    e.u32(0);
    e.raw(&[0, 0]);
    e.u16(0);
    e.u64(0);
    e.u64(0);
    // main: global func in .text
    e.u32(1);
    e.raw(&[0x12, 0]);
    e.u16(TEXT as u16);
    e.u64(0x401000);
    e.u64(16);
    // _start: weak func in .text
    e.u32(6);
    e.raw(&[0x22, 0]);
    e.u16(TEXT as u16);
    e.u64(0x401008);
    e.u64(8);
    let symtab_size = e.here() - symtab_off;

    let strtab = b"\0main\0_start\0"; // main @ 1, _start @ 6
    let strtab_off = e.here();
    e.raw(strtab);

    // .text @ 1, .bss @ 7, .dynstr @ 12, .dynamic @ 20, .symtab @ 29,
    // .strtab @ 37, .shstrtab @ 45
    let shstr = b"\0.text\0.bss\0.dynstr\0.dynamic\0.symtab\0.strtab\0.shstrtab\0";
    let shstr_off = e.here();
    e.raw(shstr);

    e.pad_to(8);
    let phoff = e.here();
    // PHDR
    e.u32(6);
    e.u32(4);
    e.u64(phoff);
    e.u64(0x400000 + phoff);
    e.u64(0x400000 + phoff);
    e.u64(112);
    e.u64(112);
    e.u64(8);
    // LOAD covering the whole file
    let load_rec = e.here();
    e.u32(1);
    e.u32(5); // r-x
    e.u64(0);
    e.u64(0x400000);
    e.u64(0x400000);
    e.u64(0); // filesz, patched below
    e.u64(0x2000);
    e.u64(0x1000);

    e.pad_to(8);
    let shoff = e.here();
    e.shdr64(0, 0, 0, 0, 0, 0, 0, 0, 0, 0);
    e.shdr64(1, 1, 0x6, 0x401000, text_off, 16, 0, 0, 16, 0);
    e.shdr64(7, 8, 0x3, 0x404000, shstr_off, 0x10000, 0, 0, 16, 0);
    e.shdr64(12, 3, 0x2, 0x402000, dynstr_off, dynstr.len() as u64, 0, 0, 1, 0);
    e.shdr64(
        20,
        6,
        0x3,
        0x403000,
        dynamic_off,
        dynamic_size,
        DYNSTR as u32,
        0,
        8,
        16,
    );
    e.shdr64(29, 2, 0, 0, symtab_off, symtab_size, STRTAB as u32, 1, 8, 24);
    e.shdr64(37, 3, 0, 0, strtab_off, strtab.len() as u64, 0, 0, 1, 0);
    e.shdr64(45, 3, 0, 0, shstr_off, shstr.len() as u64, 0, 0, 1, 0);

    e.patch_u64(32, phoff);
    e.patch_u64(40, shoff);
    let total = e.here();
    e.patch_u64(load_rec + PHDR_FILESZ, total);
    e.bytes
}

/// The spec's smallest interesting file: 64-bit little-endian, one .dynstr
/// holding "\0libc.so.0\0" and a dynamic table with a single Needed entry
/// pointing at offset 1.
pub fn minimal_dynamic_64le() -> Vec<u8> {
    let mut e = Emit::new(true);
    e.raw(&ident(Class::SixtyFourBit, Encoding::LittleEndian));
    e.u16(3); // shared object
    e.u16(0x3e);
    e.u32(1);
    e.u64(0);
    e.u64(0); // phoff
    e.u64(0); // shoff, patched below
    e.u32(0);
    e.u16(64);
    e.u16(0);
    e.u16(0);
    e.u16(64);
    e.u16(4); // shnum
    e.u16(3); // shstrndx

    let dynstr = b"\0libc.so.0\0";
    let dynstr_off = e.here();
    e.raw(dynstr);

    e.pad_to(8);
    let dynamic_off = e.here();
    e.u64(1); // Needed
    e.u64(1); // -> "libc.so.0"
    e.u64(0); // terminator
    e.u64(0);
    let dynamic_size = e.here() - dynamic_off;

    let shstr = b"\0.dynstr\0.dynamic\0.shstrtab\0"; // 1, 9, 18
    let shstr_off = e.here();
    e.raw(shstr);

    e.pad_to(8);
    let shoff = e.here();
    e.shdr64(0, 0, 0, 0, 0, 0, 0, 0, 0, 0);
    e.shdr64(1, 3, 0x2, 0x402000, dynstr_off, dynstr.len() as u64, 0, 0, 1, 0);
    e.shdr64(9, 6, 0x3, 0x403000, dynamic_off, dynamic_size, 1, 0, 8, 16);
    e.shdr64(18, 3, 0, 0, shstr_off, shstr.len() as u64, 0, 0, 1, 0);

    e.patch_u64(40, shoff);
    e.bytes
}

/// A 32-bit big-endian shared object with a symbol table and one dynamic
/// dependency, exercising the narrow field widths and the other byte order.
pub fn sample_32be() -> Vec<u8> {
    let mut e = Emit::new(false);
    e.raw(&ident(Class::ThirtyTwoBit, Encoding::BigEndian));
    e.u16(3); // shared object
    e.u16(0x14); // PowerPC
    e.u32(1);
    e.u32(0x1000); // entry
    e.u32(0); // phoff
    e.u32(0); // shoff, patched below
    e.u32(0);
    e.u16(52);
    e.u16(0);
    e.u16(0);
    e.u16(40); // shentsize
    e.u16(7); // shnum
    e.u16(6); // shstrndx

    e.pad_to(4);
    let text_off = e.here();
    e.raw(&[0x60, 0, 0, 0, 0x60, 0, 0, 0]); // nops

    let dynstr = b"\0libz.so.1\0"; // libz @ 1
    let dynstr_off = e.here();
    e.raw(dynstr);

    e.pad_to(4);
    let dynamic_off = e.here();
    e.u32(1); // Needed
    e.u32(1); // -> "libz.so.1"
    e.u32(5); // StringTable
    e.u32(0x2000);
    e.u32(0); // terminator
    e.u32(0);
    let dynamic_size = e.here() - dynamic_off;

    e.pad_to(4);
    let symtab_off = e.here();
    // null symbol: name, value, size, info, other, shndx
    e.u32(0);
    e.u32(0);
    e.u32(0);
    e.raw(&[0, 0]);
    e.u16(0);
    // start: global func in .text
    e.u32(1);
    e.u32(0x1000);
    e.u32(4);
    e.raw(&[0x12, 0]);
    e.u16(1);
    let symtab_size = e.here() - symtab_off;

    let strtab = b"\0start\0"; // start @ 1
    let strtab_off = e.here();
    e.raw(strtab);

    // .text @ 1, .dynstr @ 7, .dynamic @ 15, .symtab @ 24, .strtab @ 32,
    // .shstrtab @ 40
    let shstr = b"\0.text\0.dynstr\0.dynamic\0.symtab\0.strtab\0.shstrtab\0";
    let shstr_off = e.here();
    e.raw(shstr);

    e.pad_to(4);
    let shoff = e.here();
    e.shdr32(0, 0, 0, 0, 0, 0, 0, 0, 0, 0);
    e.shdr32(1, 1, 0x6, 0x1000, text_off as u32, 8, 0, 0, 4, 0);
    e.shdr32(7, 3, 0x2, 0x2000, dynstr_off as u32, dynstr.len() as u32, 0, 0, 1, 0);
    e.shdr32(
        15,
        6,
        0x3,
        0x3000,
        dynamic_off as u32,
        dynamic_size as u32,
        2,
        0,
        4,
        8,
    );
    e.shdr32(24, 2, 0, 0, symtab_off as u32, symtab_size as u32, 5, 1, 4, 16);
    e.shdr32(32, 3, 0, 0, strtab_off as u32, strtab.len() as u32, 0, 0, 1, 0);
    e.shdr32(40, 3, 0, 0, shstr_off as u32, shstr.len() as u32, 0, 0, 1, 0);

    // shoff lives at offset 32 in the 32-bit header
    let b = (shoff as u32).to_be_bytes();
    e.bytes[32..36].copy_from_slice(&b);
    e.bytes
}

fn read_u64_le(bytes: &[u8], at: u64) -> u64 {
    let at = at as usize;
    u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

fn shdr_base(bytes: &[u8], index: usize, field: u64) -> u64 {
    let shoff = read_u64_le(bytes, 40);
    shoff + index as u64 * 64 + field
}

/// Read a section header field from a 64-bit little-endian sample.
pub fn shdr_u64(bytes: &[u8], index: usize, field: u64) -> u64 {
    read_u64_le(bytes, shdr_base(bytes, index, field))
}

pub fn shdr_u32(bytes: &[u8], index: usize, field: u64) -> u32 {
    let at = shdr_base(bytes, index, field) as usize;
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

/// Overwrite a section header field in a 64-bit little-endian sample.
pub fn patch_shdr_u64(bytes: &mut [u8], index: usize, field: u64, value: u64) {
    let at = shdr_base(bytes, index, field) as usize;
    bytes[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

pub fn patch_shdr_u32(bytes: &mut [u8], index: usize, field: u64, value: u32) {
    let at = shdr_base(bytes, index, field) as usize;
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Overwrite a program header field in a 64-bit little-endian sample.
pub fn patch_phdr_u64(bytes: &mut [u8], index: usize, field: u64, value: u64) {
    let phoff = read_u64_le(bytes, 32);
    let at = (phoff + index as u64 * 56 + field) as usize;
    bytes[at..at + 8].copy_from_slice(&value.to_le_bytes());
}
