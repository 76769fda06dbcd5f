use clap::Parser;
use elfview::elf::{ElfFile, ParseMode};
use elfview::report::{self, SummaryOptions};
use elfview::utils;
use memmap2::Mmap;
use std::fs::File;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// path to an ELF executable, shared object, relocatable object, or core file
    file: PathBuf,

    /// include the symbol tables in the summary
    #[arg(long)]
    symbols: bool,

    /// include the raw dynamic entries in the summary
    #[arg(long)]
    dynamic: bool,

    /// keep going when a single table is malformed (its failure is reported
    /// as a warning instead)
    #[arg(long)]
    best_effort: bool,

    /// omit column titles
    #[arg(long)]
    no_titles: bool,

    /// explain each field and column
    #[arg(long)]
    explain: bool,
}

fn main() {
    let cli = Cli::parse();

    let file = match File::open(&cli.file) {
        Ok(file) => file,
        Err(err) => {
            utils::warn(&format!("couldn't open {}: {err}", cli.file.display()));
            process::exit(1);
        }
    };
    // This is unsafe because it has undefined behavior if the underlying file
    // is modified while the memory map is in use.
    let bytes = match unsafe { Mmap::map(&file) } {
        Ok(bytes) => bytes,
        Err(err) => {
            utils::warn(&format!("couldn't map {}: {err}", cli.file.display()));
            process::exit(1);
        }
    };

    let mode = if cli.best_effort {
        ParseMode::BestEffort
    } else {
        ParseMode::Strict
    };
    let elf = match ElfFile::parse_with(&bytes, mode) {
        Ok(elf) => elf,
        Err(err) => {
            // One line naming the failure kind; no partial dump of a model
            // we couldn't trust.
            utils::warn(&format!("{}: {err}", cli.file.display()));
            process::exit(1);
        }
    };

    let opts = SummaryOptions {
        symbols: cli.symbols,
        dynamic: cli.dynamic,
        titles: !cli.no_titles,
        explain: cli.explain,
    };
    let stdout = std::io::stdout();
    report::write_summary(&mut stdout.lock(), &elf, &opts);

    for warning in elf.warnings() {
        utils::warn(warning);
    }
}
