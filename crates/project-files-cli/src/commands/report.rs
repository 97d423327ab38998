use std::io::Write;

use project_files::{Populated, SyncOptions, SyncReport};

/// Attach a progress line on stderr to `options`.
pub fn with_progress(options: SyncOptions) -> SyncOptions {
    options.on_progress(|done, total| {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{done}/{total} files");
        if done == total {
            let _ = writeln!(stderr);
        }
    })
}

pub fn print_report(report: &SyncReport) {
    println!(
        "{} written, {} skipped, {} ignored.",
        report.written, report.skipped, report.ignored
    );
}

/// Print which pipeline populated the filesystem.
pub fn print_populated(populated: &Populated) {
    match populated {
        Populated::Archive(outcome) => {
            println!("Loaded projects from the {} archive.", outcome.source);
            print_report(&outcome.report);
        }
        Populated::Legacy { cause } => {
            eprintln!("warning: {} phase failed: {cause}", cause.phase());
            println!("Wrote built-in project files.");
        }
    }
}
