use nu_ansi_term::Color;

pub fn warn(mesg: &str) {
    eprintln!("{}", Color::Yellow.paint(mesg));
}

// Writes to stdout have nowhere sensible to report failures.
macro_rules! uwriteln {
    ($out:expr) => { writeln!($out).unwrap() };
    ($out:expr, $($arg:tt)*) => { writeln!($out, $($arg)*).unwrap() };
}
pub(crate) use uwriteln;
