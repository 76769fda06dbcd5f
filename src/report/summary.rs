//! Renders an `ElfFile` into the summary the CLI prints. Formatting only:
//! everything here is a pure function of the already-decoded model.
use super::tables::{add_field, add_simple};
use super::tables::{SimpleTableBuilder, TableBuilder};
use crate::elf::{
    Class, ElfFile, Encoding, Section, Segment, SymbolIndex, SymbolTable, TableOutcome,
};
use crate::utils::uwriteln;
use std::io::Write;

pub struct SummaryOptions {
    /// Include the symbol tables.
    pub symbols: bool,

    /// Include the raw dynamic entries.
    pub dynamic: bool,

    /// Print column titles.
    pub titles: bool,

    /// Print field/column explanations.
    pub explain: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            symbols: false,
            dynamic: false,
            titles: true,
            explain: false,
        }
    }
}

pub fn write_summary(out: &mut impl Write, file: &ElfFile, opts: &SummaryOptions) {
    write_header(out, file, opts);
    uwriteln!(out);
    write_sections(out, file, opts);
    uwriteln!(out);
    write_segments(out, file, opts);
    uwriteln!(out);
    write_dependencies(out, file);
    if opts.symbols {
        uwriteln!(out);
        write_symbols(out, file, opts);
    }
    if opts.dynamic {
        uwriteln!(out);
        write_dynamic(out, file, opts);
    }
}

pub fn write_header(out: &mut impl Write, file: &ElfFile, opts: &SummaryOptions) {
    let mut b = SimpleTableBuilder::new();

    add_simple!(b, "type", file.header.ftype.describe(), "type of ELF file");
    let class = match file.ident.class {
        Class::ThirtyTwoBit => "32-bit",
        Class::SixtyFourBit => "64-bit",
    };
    add_simple!(b, "class", class, "width of pointers and file offsets");
    let encoding = match file.ident.encoding {
        Encoding::LittleEndian => "little endian",
        Encoding::BigEndian => "big endian",
    };
    add_simple!(b, "data", encoding, "byte order of all multi-byte fields");
    add_simple!(b, "osabi", file.ident.abi(), "the OS the binary was compiled for");
    add_simple!(b, "abiversion", file.ident.abi_version, "zero for Linux");
    add_simple!(b, "machine", file.header.machine(), "CPU architecture");
    add_simple!(b, "entry", format!("{:x}", file.header.entry), "entry point (hex)");
    add_simple!(b, "flags", file.header.flags, "Linux has no defined flags");
    add_simple!(
        b,
        "segments",
        file.header.num_ph_entries,
        "number of entries in the program header table"
    );
    add_simple!(
        b,
        "sections",
        file.header.num_section_entries,
        "number of entries in the section header table"
    );
    add_simple!(
        b,
        "string table",
        file.header.string_table_index,
        "section index of the section name string table, zero for none"
    );
    b.writeln(out, opts.explain);
}

pub fn write_sections(out: &mut impl Write, file: &ElfFile, opts: &SummaryOptions) {
    let sections = match file.sections_outcome() {
        TableOutcome::Absent => {
            uwriteln!(out, "no sections");
            return;
        }
        TableOutcome::Failed(err) => {
            uwriteln!(out, "section table could not be decoded: {err}");
            return;
        }
        TableOutcome::Parsed(sections) => sections,
    };

    let mut builder = TableBuilder::new();
    builder.add_col_r("index", "index into sections");
    builder.add_col_l("name", "resolved from the section name string table");
    builder.add_col_l("type", "type of the section");
    builder.add_col_r("vaddr", "virtual address at execution (hex)");
    builder.add_col_r(
        "offset",
        "offset into the ELF file for the start of the section (hex)",
    );
    builder.add_col_r("size", "section size in bytes (hex)");
    builder.add_col_r("entry_size", "set if the section holds a table of entries");
    builder.add_col_r("align", "section alignment");
    builder.add_col_r(
        "link",
        "link to another section with related information, usually a string or symbol table",
    );
    builder.add_col_r("info", "additional section info");
    builder.add_col_l("flags", "write, alloc, and/or exec");

    // Sections are often referenced by index so the index column is handy.
    for (i, section) in sections.iter().enumerate() {
        add_field!(builder, "index", i);
        add_field!(builder, "name", section.name);
        add_field!(builder, "type", "{:?}", section.stype);
        add_field!(builder, "vaddr", "{:x}", section.addr);
        add_field!(builder, "offset", "{:x}", section.offset);
        add_field!(builder, "size", "{:x}", section.size);
        add_field!(builder, "entry_size", section.entry_size);
        add_field!(builder, "align", section.align);
        add_field!(builder, "link", section.link.0);
        add_field!(builder, "info", section.info);
        add_field!(builder, "flags", Section::flags(section.flags));
    }

    builder.writeln(out, opts.titles, opts.explain);
}

pub fn write_segments(out: &mut impl Write, file: &ElfFile, opts: &SummaryOptions) {
    let segments = match file.segments_outcome() {
        TableOutcome::Absent => {
            uwriteln!(out, "no segments");
            return;
        }
        TableOutcome::Failed(err) => {
            uwriteln!(out, "program header table could not be decoded: {err}");
            return;
        }
        TableOutcome::Parsed(segments) => segments,
    };

    let mut builder = TableBuilder::new();
    builder.add_col_l("type", "the segment type");
    builder.add_col_r(
        "offset",
        "the offset into the ELF file at which the segment appears (hex)",
    );
    builder.add_col_r("vaddr", "the virtual address the segment starts at (hex)");
    builder.add_col_r("file size", "the size of the segment on disk (hex)");
    builder.add_col_r("memory size", "the size of the segment in memory (hex)");
    builder.add_col_r("align", "segment alignment");
    builder.add_col_r("flags", "readable, writeable, and/or executable");

    for segment in segments.iter() {
        add_field!(builder, "type", "{:?}", segment.stype);
        add_field!(builder, "offset", "{:x}", segment.offset);
        add_field!(builder, "vaddr", "{:x}", segment.vaddr);
        add_field!(builder, "file size", "{:x}", segment.file_size);
        add_field!(builder, "memory size", "{:x}", segment.mem_size);
        add_field!(builder, "align", "{:x}", segment.align);
        add_field!(builder, "flags", Segment::flags(segment.flags));
    }

    builder.writeln(out, opts.titles, opts.explain);
}

pub fn write_dependencies(out: &mut impl Write, file: &ElfFile) {
    uwriteln!(out, "Dynamic linking dependencies:");
    if file.dependencies().is_empty() {
        uwriteln!(out, "   <none>");
    } else {
        for name in file.dependencies() {
            uwriteln!(out, "   {name}");
        }
    }
}

pub fn write_symbols(out: &mut impl Write, file: &ElfFile, opts: &SummaryOptions) {
    for outcome in file.symbol_table_outcomes() {
        match outcome {
            TableOutcome::Parsed(table) => write_symbol_table(out, file, table, opts),
            TableOutcome::Failed(err) => {
                uwriteln!(out, "symbol table could not be decoded: {err}");
            }
            TableOutcome::Absent => {}
        }
    }
    if file.symbol_table_outcomes().is_empty() {
        uwriteln!(out, "no symbol tables");
    }
}

fn write_symbol_table(
    out: &mut impl Write,
    file: &ElfFile,
    table: &SymbolTable,
    opts: &SummaryOptions,
) {
    uwriteln!(
        out,
        "{} ({} entries)",
        table.section_name,
        table.entries.len()
    );

    let mut builder = TableBuilder::new();
    builder.add_col_r("index", "symbol index");
    builder.add_col_l("name", "the symbol name");
    builder.add_col_r("value", "address, absolute value, etc (hex)");
    builder.add_col_r("size", "size of the value, 0 for unknown or undefined");
    builder.add_col_l("type", "the symbol type");
    builder.add_col_l("binding", "linkage visibility and behavior");
    builder.add_col_l(
        "visibility",
        "whether the symbol is visible outside its object file",
    );
    builder.add_col_l(
        "related",
        "indicates a related section or marks the entry as an absolute value",
    );

    for (i, symbol) in table.entries.iter().enumerate() {
        add_field!(builder, "index", i);
        add_field!(builder, "name", symbol.name);
        add_field!(builder, "value", "{:x}", symbol.value);
        add_field!(builder, "size", symbol.size);
        add_field!(builder, "type", "{:?}", symbol.stype);
        add_field!(builder, "binding", "{:?}", symbol.binding);
        add_field!(builder, "visibility", "{:?}", symbol.visibility);
        add_field!(builder, "related", index_to_str(file, symbol.index));
    }

    builder.writeln(out, opts.titles, opts.explain);
}

fn index_to_str(file: &ElfFile, index: SymbolIndex) -> String {
    match index {
        SymbolIndex::Abs => "Value".to_string(),
        SymbolIndex::Common => "Common".to_string(),
        SymbolIndex::Index(i) => file
            .section_by_index(i.0 as usize)
            .map(|s| s.name.clone())
            .unwrap_or("bad section index".to_string()),
        SymbolIndex::Undef => "".to_string(),
        SymbolIndex::XIndex => "extended index".to_string(),
    }
}

pub fn write_dynamic(out: &mut impl Write, file: &ElfFile, opts: &SummaryOptions) {
    let dynamic = match file.dynamic() {
        TableOutcome::Absent => {
            uwriteln!(out, "no dynamic section");
            return;
        }
        TableOutcome::Failed(err) => {
            uwriteln!(out, "dynamic table could not be decoded: {err}");
            return;
        }
        TableOutcome::Parsed(dynamic) => dynamic,
    };

    let mut builder = TableBuilder::new();
    builder.add_col_l("tag", "what the value describes");
    builder.add_col_r("value", "integer or address depending on the tag (hex)");

    for entry in dynamic.entries.iter() {
        add_field!(builder, "tag", "{:?}", entry.tag);
        add_field!(builder, "value", "{:x}", entry.value);
    }

    builder.writeln(out, opts.titles, opts.explain);
}
