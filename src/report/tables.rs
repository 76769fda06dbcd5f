//! Helpers for building tables using the tabled crate.
use crate::utils::uwriteln;
use std::io::Write;
use tabled::{
    builder::Builder,
    settings::{Alignment, Padding, Style, object::Columns},
};

struct TableCol {
    header: String,
    align: Alignment,
    help: String,
    fields: Vec<String>,
}

/// General table. They look like this:
/// type  offset             vaddr  file size  memory size  flags   if titles
/// ----  ------             -----  ---------  -----------  -----
/// Phdr    2f8             4002f8         70           70    r--
/// Load      0             400000        340         2000    r-x
///
/// type: the segment type                                           if explain
/// offset: the offset into the ELF file at which the segment appears
/// ...
pub struct TableBuilder {
    cols: Vec<TableCol>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder { cols: Vec::new() }
    }

    /// Left aligned column
    pub fn add_col_l(&mut self, header: &str, help: &str) {
        debug_assert!(!self.has_col(header));
        let col = TableCol {
            header: header.to_string(),
            align: Alignment::left(),
            help: help.to_string(),
            fields: Vec::new(),
        };
        self.cols.push(col);
    }

    /// Right aligned column
    pub fn add_col_r(&mut self, header: &str, help: &str) {
        debug_assert!(!self.has_col(header));
        let col = TableCol {
            header: header.to_string(),
            align: Alignment::right(),
            help: help.to_string(),
            fields: Vec::new(),
        };
        self.cols.push(col);
    }

    /// Typically add_field! is used instead.
    pub fn add_str_field(&mut self, header: &str, value: String) {
        let col = self.find_col(header);
        if value.is_empty() {
            // For some reason empty fields screw up tabled formatting.
            col.fields.push(" ".to_string());
        } else {
            col.fields.push(value);
        }
    }

    pub fn writeln(&self, mut out: impl Write, titles: bool, explain: bool) {
        uwriteln!(out, "{}", self.table_str(titles));

        if explain {
            uwriteln!(out);
            uwriteln!(out, "{}", self.explain_str());
        }
    }

    // We need to preserve add_col ordering so we can't use a HashMap
    // but O(n) should be fine for tables.
    fn has_col(&self, header: &str) -> bool {
        self.cols.iter().any(|c| c.header == header)
    }

    fn find_col(&mut self, header: &str) -> &mut TableCol {
        self.cols.iter_mut().find(|c| c.header == header).unwrap() // programmer error to not have a col
    }

    fn table_str(&self, titles: bool) -> String {
        let height = self.cols[0].fields.len();
        let mut builder = Builder::with_capacity(height + 2, self.cols.len());
        if titles {
            let names: Vec<String> = self.cols.iter().map(|c| c.header.to_string()).collect();
            let dashes: Vec<String> = names.iter().map(|s| "-".repeat(s.len())).collect();
            builder.push_record(&names);
            builder.push_record(&dashes);
        }
        for i in 0..height {
            let row: Vec<String> = self.cols.iter().map(|c| c.fields[i].clone()).collect();
            builder.push_record(&row);
        }

        let mut table = builder.build();
        for (i, col) in self.cols.iter().enumerate() {
            table.modify(Columns::one(i), col.align);
        }
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());

        table.to_string()
    }

    fn explain_str(&self) -> String {
        self.cols
            .iter()
            .map(|c| format!("{}: {}", c.header, c.help))
            .collect::<Vec<String>>()
            .join("\n")
    }
}

/// Two-column name/value table for the header summary.
pub struct SimpleTableBuilder {
    rows: Vec<(String, String, String)>,
}

impl SimpleTableBuilder {
    pub fn new() -> SimpleTableBuilder {
        SimpleTableBuilder { rows: Vec::new() }
    }

    /// Typically add_simple! is used instead.
    pub fn add(&mut self, name: &str, value: String, help: &str) {
        self.rows
            .push((name.to_string(), value, help.to_string()));
    }

    pub fn writeln(&self, mut out: impl Write, explain: bool) {
        let mut builder = Builder::with_capacity(self.rows.len(), 2);
        for (name, value, _) in self.rows.iter() {
            builder.push_record([name.clone(), value.clone()]);
        }
        let mut table = builder.build();
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());
        uwriteln!(out, "{}", table);

        if explain {
            uwriteln!(out);
            for (name, _, help) in self.rows.iter() {
                uwriteln!(out, "{name}: {help}");
            }
        }
    }
}

macro_rules! add_field {
    ($builder:expr, $header:expr, $value:expr) => {
        $builder.add_str_field($header, format!("{}", $value))
    };
    ($builder:expr, $header:expr, $format:expr, $value:expr) => {
        $builder.add_str_field($header, format!($format, $value))
    };
}
pub(crate) use add_field;

macro_rules! add_simple {
    ($builder:expr, $name:expr, $value:expr, $help:expr) => {
        $builder.add($name, format!("{}", $value), $help)
    };
}
pub(crate) use add_simple;
