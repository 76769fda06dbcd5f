//! The top-level model: one validated, immutable object graph composed from
//! the decoder outputs. Constructed once from a byte buffer; read-only
//! afterwards, so it can be shared across threads freely.
use super::{
    decode_program_table, decode_section_table, find_dynamic_section, resolve_section_names,
    symbol_table_sections, DynamicTable, ElfError, FileHeader, Identification, Reader, Section,
    Segment, Symbol, SymbolTable,
};

/// What to do when a single table is malformed but the file header is fine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseMode {
    /// Any failure fails the whole parse.
    Strict,

    /// A malformed table is surfaced as `TableOutcome::Failed` plus a
    /// collected warning; the rest of the model still parses.
    BestEffort,
}

/// Presence and validity of one table. Distinguishes "the file has no such
/// table" from "the table is there but could not be decoded" — callers
/// should not treat those as the same case.
#[derive(Clone, Debug)]
pub enum TableOutcome<T> {
    Parsed(T),
    Failed(ElfError),
    Absent,
}

impl<T> TableOutcome<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            TableOutcome::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ElfError> {
        match self {
            TableOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, TableOutcome::Absent)
    }
}

#[derive(Debug)]
pub struct ElfFile<'a> {
    pub ident: Identification,
    pub header: FileHeader,
    pub reader: Reader<'a>,
    sections: TableOutcome<Vec<Section>>,
    segments: TableOutcome<Vec<Segment>>,
    symtabs: Vec<TableOutcome<SymbolTable>>,
    dynamic: TableOutcome<DynamicTable>,
    warnings: Vec<String>,
}

impl<'a> ElfFile<'a> {
    /// Strict parse: the whole buffer either yields a fully valid model or
    /// an error. Identification and file header failures are always fatal
    /// regardless of mode; nothing downstream can be trusted without a
    /// valid width/endianness/table-location baseline.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ElfError> {
        Self::parse_with(bytes, ParseMode::Strict)
    }

    pub fn parse_with(bytes: &'a [u8], mode: ParseMode) -> Result<Self, ElfError> {
        let ident = Identification::parse(bytes)?;
        let reader = Reader::new(bytes, &ident);
        let header = FileHeader::parse(&reader, &ident)?;
        let mut warnings = Vec::new();

        let sections = if header.num_section_entries == 0 {
            TableOutcome::Absent
        } else {
            let result = decode_section_table(&reader, &header)
                .and_then(|mut sections| {
                    resolve_section_names(&reader, &header, &mut sections)?;
                    Ok(sections)
                });
            table_outcome(result, "section table", mode, &mut warnings)?
        };

        let segments = if header.num_ph_entries == 0 {
            TableOutcome::Absent
        } else {
            let result = decode_program_table(&reader, &header);
            table_outcome(result, "program header table", mode, &mut warnings)?
        };

        let (symtabs, dynamic) = match &sections {
            TableOutcome::Parsed(sections) => {
                let mut symtabs = Vec::new();
                for index in symbol_table_sections(sections) {
                    let result = SymbolTable::parse(&reader, sections, index);
                    symtabs.push(table_outcome(result, "symbol table", mode, &mut warnings)?);
                }

                let dynamic = match find_dynamic_section(sections) {
                    None => TableOutcome::Absent,
                    Some(index) => {
                        let result =
                            DynamicTable::parse(&reader, sections, index, &mut warnings);
                        table_outcome(result, "dynamic table", mode, &mut warnings)?
                    }
                };
                (symtabs, dynamic)
            }
            // Without a section table the derived tables can't be located;
            // they inherit its failure rather than claiming to be absent.
            TableOutcome::Failed(err) => (Vec::new(), TableOutcome::Failed(err.clone())),
            TableOutcome::Absent => (Vec::new(), TableOutcome::Absent),
        };

        Ok(ElfFile {
            ident,
            header,
            reader,
            sections,
            segments,
            symtabs,
            dynamic,
            warnings,
        })
    }

    pub fn sections_outcome(&self) -> &TableOutcome<Vec<Section>> {
        &self.sections
    }

    /// The decoded sections in table order, or an empty slice when the table
    /// is absent or failed (check `sections_outcome` to tell which).
    pub fn sections(&self) -> &[Section] {
        self.sections.parsed().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn section_by_index(&self, index: usize) -> Option<&Section> {
        self.sections().get(index)
    }

    /// First section with the given resolved name. Duplicate names are legal
    /// in ELF; later duplicates stay reachable by index.
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections().iter().find(|s| s.name == name)
    }

    pub fn segments_outcome(&self) -> &TableOutcome<Vec<Segment>> {
        &self.segments
    }

    /// The decoded segments in on-disk (load) order.
    pub fn segments(&self) -> &[Segment] {
        self.segments.parsed().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn segment_by_index(&self, index: usize) -> Option<&Segment> {
        self.segments().get(index)
    }

    pub fn symbol_table_outcomes(&self) -> &[TableOutcome<SymbolTable>] {
        &self.symtabs
    }

    /// Every successfully decoded symbol table, in decode order.
    pub fn symbol_tables(&self) -> impl Iterator<Item = &SymbolTable> {
        self.symtabs.iter().filter_map(|t| t.parsed())
    }

    /// First symbol with the given name, across all symbol tables in decode
    /// order.
    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbol_tables()
            .flat_map(|t| t.entries.iter())
            .find(|s| s.name == name)
    }

    pub fn dynamic(&self) -> &TableOutcome<DynamicTable> {
        &self.dynamic
    }

    /// Shared-library dependency names in on-disk order; empty when there is
    /// no dynamic section.
    pub fn dependencies(&self) -> &[String] {
        self.dynamic
            .parsed()
            .map(|d| d.dependencies())
            .unwrap_or(&[])
    }

    /// Diagnostics collected while building a best-effort model.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn table_outcome<T>(
    result: Result<T, ElfError>,
    what: &str,
    mode: ParseMode,
    warnings: &mut Vec<String>,
) -> Result<TableOutcome<T>, ElfError> {
    match result {
        Ok(value) => Ok(TableOutcome::Parsed(value)),
        Err(err) => match mode {
            ParseMode::Strict => Err(err),
            ParseMode::BestEffort => {
                warnings.push(format!("{what} dropped: {err}"));
                Ok(TableOutcome::Failed(err))
            }
        },
    }
}
