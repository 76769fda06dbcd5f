//! Bounds-checked, width- and endianness-aware access to the raw bytes.
//! Every other decoder reads through `Reader` or `Stream`; neither ever
//! reads past the buffer.
use super::{Class, ElfError, Encoding, Identification};

#[derive(Debug)]
pub struct Reader<'a> {
    pub little_endian: bool,
    pub sixty_four_bit: bool,
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    /// The class and byte order decided at identification time apply to every
    /// read from here on; nothing downstream re-derives them.
    pub fn new(bytes: &'a [u8], ident: &Identification) -> Self {
        Reader {
            bytes,
            sixty_four_bit: ident.class == Class::SixtyFourBit,
            little_endian: ident.encoding == Encoding::LittleEndian,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Validates offset + size against the buffer and returns the usize start.
    fn check(&self, offset: u64, size: u64) -> Result<usize, ElfError> {
        let out_of_bounds = || ElfError::OutOfBounds {
            offset,
            len: size,
            buffer: self.len(),
        };
        let end = offset.checked_add(size).ok_or_else(out_of_bounds)?;
        if end > self.len() {
            return Err(out_of_bounds());
        }
        Ok(offset as usize)
    }

    pub fn slice(&self, offset: u64, size: u64) -> Result<&'a [u8], ElfError> {
        let start = self.check(offset, size)?;
        Ok(&self.bytes[start..start + size as usize])
    }

    pub fn read_byte(&self, offset: u64) -> Result<u8, ElfError> {
        let start = self.check(offset, 1)?;
        Ok(self.bytes[start])
    }

    pub fn read_half(&self, offset: u64) -> Result<u16, ElfError> {
        let start = self.check(offset, 2)?;
        let slice = self.bytes[start..start + 2].try_into().unwrap();
        if self.little_endian {
            Ok(u16::from_le_bytes(slice))
        } else {
            Ok(u16::from_be_bytes(slice))
        }
    }

    pub fn read_word(&self, offset: u64) -> Result<u32, ElfError> {
        let start = self.check(offset, 4)?;
        let slice = self.bytes[start..start + 4].try_into().unwrap();
        if self.little_endian {
            Ok(u32::from_le_bytes(slice))
        } else {
            Ok(u32::from_be_bytes(slice))
        }
    }

    pub fn read_xword(&self, offset: u64) -> Result<u64, ElfError> {
        let start = self.check(offset, 8)?;
        let slice = self.bytes[start..start + 8].try_into().unwrap();
        if self.little_endian {
            Ok(u64::from_le_bytes(slice))
        } else {
            Ok(u64::from_be_bytes(slice))
        }
    }

    /// Read either a u32 or u64 word depending on the file class. But, for
    /// sanity, always return the result as 64 bits.
    pub fn read_addr(&self, offset: u64) -> Result<u64, ElfError> {
        if self.sixty_four_bit {
            self.read_xword(offset)
        } else {
            Ok(self.read_word(offset)? as u64)
        }
    }

    pub fn read_offset(&self, offset: u64) -> Result<u64, ElfError> {
        self.read_addr(offset)
    }

    /// Read a null-terminated string from [offset, end). The terminator must
    /// appear before `end`; these strings always live inside a string table
    /// section and never run past it.
    pub fn read_string(&self, offset: u64, end: u64) -> Result<String, ElfError> {
        let end = end.min(self.len());
        if offset > end {
            return Err(ElfError::OutOfBounds {
                offset,
                len: 0,
                buffer: self.len(),
            });
        }
        let region = &self.bytes[offset as usize..end as usize];
        match region.iter().position(|b| *b == 0) {
            Some(nul) => Ok(String::from_utf8_lossy(&region[..nul]).into_owned()),
            None => Err(ElfError::InvalidNameOffset(format!(
                "string at offset {offset:#x} has no terminator before {end:#x}"
            ))),
        }
    }
}

/// A cursor over a `Reader` that advances past each field it reads.
pub struct Stream<'a, 'b> {
    pub reader: &'b Reader<'a>,
    pub offset: u64,
}

impl<'a, 'b> Stream<'a, 'b> {
    pub fn new(reader: &'b Reader<'a>, offset: u64) -> Self {
        Stream { reader, offset }
    }

    pub fn read_byte(&mut self) -> Result<u8, ElfError> {
        let byte = self.reader.read_byte(self.offset)?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_half(&mut self) -> Result<u16, ElfError> {
        let half = self.reader.read_half(self.offset)?;
        self.offset += 2;
        Ok(half)
    }

    pub fn read_word(&mut self) -> Result<u32, ElfError> {
        let word = self.reader.read_word(self.offset)?;
        self.offset += 4;
        Ok(word)
    }

    pub fn read_xword(&mut self) -> Result<u64, ElfError> {
        let xword = self.reader.read_xword(self.offset)?;
        self.offset += 8;
        Ok(xword)
    }

    /// Class-sized signed value, e.g. a dynamic entry tag.
    pub fn read_sxword(&mut self) -> Result<i64, ElfError> {
        if self.reader.sixty_four_bit {
            Ok(self.read_xword()? as i64)
        } else {
            Ok(self.read_word()? as i32 as i64)
        }
    }

    pub fn read_addr(&mut self) -> Result<u64, ElfError> {
        let addr = self.reader.read_addr(self.offset)?;
        self.offset += if self.reader.sixty_four_bit { 8 } else { 4 };
        Ok(addr)
    }

    pub fn read_offset(&mut self) -> Result<u64, ElfError> {
        self.read_addr()
    }
}
