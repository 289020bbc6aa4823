use owo_colors::OwoColorize;

use crate::mask::{Collision, CollisionKind};
use crate::relocate::{OutcomeKind, RelocationOutcome, RelocationReport, Unprocessed};

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix) that users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// The data-safety warning shown unless `--ignore-warning` is given.
pub const SAFETY_WARNING: &str = "WARNING!!!\nThis tool renames files in the image archive. There is potential risk of data loss if you are not careful! Always ensure there is an up-to-date backup before continuing, and check the output of your command with --dry-run first.\nNothing was changed. Append --ignore-warning to your previous command to run it.";

/// One line per outcome, tab separated: kind, role, source, target.
pub fn outcome_line(o: &RelocationOutcome) -> String {
    let kind = match o.kind {
        OutcomeKind::Moved => "moved",
        OutcomeKind::SkippedExists => "exists",
        OutcomeKind::SkippedDryRun => "dry-run",
        OutcomeKind::SkippedUnparsable => "unparsable",
        OutcomeKind::MissingCompanion => "no-meta",
        OutcomeKind::NoOp => "no-op",
        OutcomeKind::Unrepresentable => "unrepresentable",
        OutcomeKind::Failed => "failed",
    };
    let role = match o.role {
        crate::relocate::FileRole::Image => "image",
        crate::relocate::FileRole::Meta => "meta",
    };
    let target = o
        .target
        .as_ref()
        .map(|t| t.display().to_string())
        .unwrap_or_else(|| "-".into());
    let mut line = format!("{kind}\t{role}\t{}\t{target}", o.source.display());
    if let Some(err) = &o.error {
        line.push('\t');
        line.push_str(err);
    }
    line
}

/// Print the report: outcome lines (all of them when `verbose`, otherwise only
/// those needing attention) followed by a summary.
pub fn print_report(report: &RelocationReport, verbose: bool) {
    for o in &report.outcomes {
        let notable = matches!(
            o.kind,
            OutcomeKind::SkippedExists
                | OutcomeKind::Failed
                | OutcomeKind::MissingCompanion
                | OutcomeKind::SkippedUnparsable
                | OutcomeKind::Unrepresentable
        );
        if verbose || notable {
            print_user(&outcome_line(o));
        }
    }

    let t = report.tally();
    let summary = format!(
        "moved {}, dry-run {}, already exist {}, no-op {}, missing meta {}, unparsable {}, unrepresentable {}, failed {}",
        t.moved,
        t.skipped_dry_run,
        t.skipped_exists,
        t.no_op,
        t.missing_companion,
        t.skipped_unparsable,
        t.unrepresentable,
        t.failed
    );
    if report.has_failures() {
        print_error(&summary);
    } else if t.skipped_exists > 0 || t.unrepresentable > 0 {
        print_warn(&summary);
    } else {
        print_success(&summary);
    }
    print_interrupted(report);
}

/// JSON lines, one outcome per line. The interruption notice still goes to stderr.
pub fn print_report_json(report: &RelocationReport) -> serde_json::Result<()> {
    for o in &report.outcomes {
        print_user(&serde_json::to_string(o)?);
    }
    print_interrupted(report);
    Ok(())
}

fn print_interrupted(report: &RelocationReport) {
    if !report.interrupted {
        return;
    }
    match &report.unprocessed {
        Some(u) => {
            for line in interrupted_notice(u) {
                print_warn(&line);
            }
        }
        None => print_warn("Run was interrupted after the last image."),
    }
}

/// How to finish an interrupted run without touching the images it already moved.
pub fn interrupted_notice(u: &Unprocessed) -> Vec<String> {
    vec![
        format!(
            "Run was interrupted; {} image(s) were not processed, taken between {} and {}.",
            u.count, u.earliest, u.latest
        ),
        "Do NOT re-run the same command: images already moved could be shifted a second time.".to_string(),
        format!("To finish, re-run the same command with {} added.", u.resume),
    ]
}

pub fn print_collisions(collisions: &[Collision]) {
    for c in collisions {
        let why = match &c.kind {
            CollisionKind::Occupied => "destination already exists".to_string(),
            CollisionKind::Contended { with } => format!("same destination as {}", with.display()),
        };
        print_warn(&format!(
            "collision: {} -> {} ({why})",
            c.record.original_path().display(),
            c.destination.display()
        ));
    }
}
