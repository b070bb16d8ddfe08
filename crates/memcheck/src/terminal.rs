//! Styled output of report lines.
//!
//! Colors are applied only to the status label, and only when stdout is a
//! terminal; piped output is byte-identical to the plain report.

use console::{StyledObject, style};
use memcheck::report::{ReportLine, Status};

fn styled_label(status: Status) -> StyledObject<&'static str> {
    let label = style(status.label()).bold();
    match status {
        Status::Warn => label.yellow(),
        Status::Fail => label.red(),
        Status::Pass => label.green(),
    }
}

/// Print one report line to stdout.
pub fn print_line(line: &ReportLine) {
    println!("{}{}", styled_label(line.status), line.body);
}

/// Print every line in order.
pub fn print_report(lines: &[ReportLine]) {
    for line in lines {
        print_line(line);
    }
}
