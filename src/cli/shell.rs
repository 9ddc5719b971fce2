use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use intake_config::Config;
use intake_core::{
    lab_survey, FieldKind, InMemorySubmissionStore, SubmissionStore, SubmitPolicy,
    WizardController,
};
use intake_storage_json::JsonSubmissionStore;
use tracing::debug;

use crate::cli::forms::DialoguerInteraction;
use crate::cli::io;
use crate::cli::output;
use crate::cli::runner::{RunOutcome, WizardRunner};
use crate::config;
use crate::errors::CliError;

const USAGE: &str = "\
Usage:
  lab_intake [--data-dir DIR] [--dry-run]   fill in a lab setup request
  lab_intake list [--data-dir DIR]          list stored requests, newest first
  lab_intake show <id> [--data-dir DIR]     print one stored request as JSON
  lab_intake schema                         print the survey pages and fields
  lab_intake --version                      print version and build details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run { dry_run: bool },
    List,
    Show(String),
    Schema,
    Version,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub data_dir: Option<PathBuf>,
}

pub fn parse_args<I>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut data_dir = None;
    let mut dry_run = false;
    let mut positional = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--data-dir needs a directory".into()))?;
                data_dir = Some(PathBuf::from(value));
            }
            "--dry-run" => dry_run = true,
            "--version" | "-V" => return Ok(Invocation { command: Command::Version, data_dir }),
            "--help" | "-h" | "help" => return Ok(Invocation { command: Command::Help, data_dir }),
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option `{flag}`\n\n{USAGE}")))
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => Command::Run { dry_run },
        Some("list") => Command::List,
        Some("schema") => Command::Schema,
        Some("show") => Command::Show(
            positional
                .next()
                .ok_or_else(|| CliError::Usage(format!("show needs a submission id\n\n{USAGE}")))?,
        ),
        Some(other) => {
            return Err(CliError::Usage(format!("unknown command `{other}`\n\n{USAGE}")))
        }
    };
    if let Some(extra) = positional.next() {
        return Err(CliError::Usage(format!("unexpected argument `{extra}`")));
    }
    Ok(Invocation { command, data_dir })
}

pub fn run_cli() -> Result<(), CliError> {
    let invocation = parse_args(env::args().skip(1))?;
    match invocation.command {
        Command::Version => {
            println!("{}", version_string());
            return Ok(());
        }
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Schema => {
            print_schema();
            return Ok(());
        }
        _ => {}
    }

    let (_, settings) = config::load()?;
    crate::init_with_filter(settings.log_filter.as_deref());
    io::apply_config(&settings);
    let data_dir = config::data_dir(&settings, invocation.data_dir);
    debug!(data_dir = %data_dir.display(), "resolved data directory");

    match invocation.command {
        Command::Run { dry_run } => run_wizard(&settings, &data_dir, dry_run),
        Command::List => list_submissions(&JsonSubmissionStore::in_data_dir(&data_dir)?),
        Command::Show(id) => show_submission(&JsonSubmissionStore::in_data_dir(&data_dir)?, &id),
        Command::Version | Command::Help | Command::Schema => Ok(()),
    }
}

pub fn version_string() -> String {
    format!(
        "lab_intake {} ({} {}, built {}, {} {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("LAB_INTAKE_BUILD_HASH"),
        env!("LAB_INTAKE_BUILD_STATUS"),
        env!("LAB_INTAKE_BUILD_TIMESTAMP"),
        env!("LAB_INTAKE_BUILD_TARGET"),
        env!("LAB_INTAKE_BUILD_PROFILE"),
        env!("LAB_INTAKE_BUILD_RUSTC"),
    )
}

fn run_wizard(settings: &Config, data_dir: &Path, dry_run: bool) -> Result<(), CliError> {
    let memory = Arc::new(InMemorySubmissionStore::new());
    let store: Box<dyn SubmissionStore> = if dry_run {
        io::print_info("Dry run: nothing will be written to disk.");
        Box::new(Arc::clone(&memory))
    } else {
        Box::new(JsonSubmissionStore::in_data_dir(data_dir)?)
    };

    let controller = WizardController::new(lab_survey(), store)?.with_policy(SubmitPolicy::new(
        settings.submit_attempts,
        settings.retry_backoff(),
    ));
    let mut runner = WizardRunner::new(controller, DialoguerInteraction::new());

    match runner.run()? {
        RunOutcome::Quit => io::print_info("Exited without submitting."),
        RunOutcome::Submitted(receipts) => {
            if dry_run {
                for receipt in &receipts {
                    let record = memory.load(&receipt.id)?;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
            }
            io::print_success(format!("{} request(s) submitted.", receipts.len()));
        }
    }
    Ok(())
}

fn list_submissions(store: &JsonSubmissionStore) -> Result<(), CliError> {
    let rows = store.list()?;
    if rows.is_empty() {
        io::print_info("No submissions stored yet.");
        return Ok(());
    }
    output::section(format!("Submissions ({})", rows.len()));
    for row in rows {
        let id = row.id.to_string();
        println!(
            "{}  {}  {} <{}>  {} lab(s)",
            id.get(..8).unwrap_or(&id),
            row.submitted_at.format("%Y-%m-%d %H:%M"),
            row.contact_name,
            row.contact_email,
            row.item_count
        );
    }
    Ok(())
}

fn show_submission(store: &JsonSubmissionStore, raw_id: &str) -> Result<(), CliError> {
    let id = store.resolve(raw_id)?;
    let record = store.load(&id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn describe(kind: &FieldKind) -> String {
    let range = |min: Option<String>, max: Option<String>| match (min, max) {
        (Some(min), Some(max)) => format!(" {min}..={max}"),
        (Some(min), None) => format!(" >= {min}"),
        (None, Some(max)) => format!(" <= {max}"),
        (None, None) => String::new(),
    };
    match kind {
        FieldKind::Text => "text".into(),
        FieldKind::Integer { min, max } => format!(
            "integer{}",
            range(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
        ),
        FieldKind::Number { min, max } => format!(
            "number{}",
            range(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
        ),
        FieldKind::Boolean => "yes/no".into(),
        FieldKind::Date => "date (YYYY-MM-DD)".into(),
        FieldKind::Choice { options, .. } => format!("one of: {}", options.join(" | ")),
        FieldKind::MultiChoice { options, .. } => format!("any of: {}", options.join(" | ")),
    }
}

fn print_schema() {
    let survey = lab_survey();
    println!("{}", survey.name);
    let mut sections: Vec<_> = survey.sections.iter().collect();
    if let Some(dynamic) = &survey.dynamic {
        let anchor = sections
            .iter()
            .position(|section| section.id == dynamic.after)
            .map(|index| index + 1)
            .unwrap_or(sections.len());
        sections.insert(anchor, &dynamic.template);
    }
    for section in sections {
        let repeat = survey
            .dynamic
            .as_ref()
            .filter(|dynamic| dynamic.template.id == section.id)
            .map(|dynamic| format!(" (one page per `{}`)", dynamic.field))
            .unwrap_or_default();
        println!();
        println!("{}{}", section.title, repeat);
        for field in &section.fields {
            let optional = if field.required { "" } else { ", optional" };
            println!("  {} [{}]: {}{}", field.label, field.key, describe(&field.kind), optional);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn no_arguments_runs_the_wizard() {
        let invocation = parse_args(args(&[])).unwrap();
        assert_eq!(invocation.command, Command::Run { dry_run: false });
        assert_eq!(invocation.data_dir, None);
    }

    #[test]
    fn flags_can_follow_the_command() {
        let invocation = parse_args(args(&["show", "1a2b", "--data-dir", "/tmp/x"])).unwrap();
        assert_eq!(invocation.command, Command::Show("1a2b".into()));
        assert_eq!(invocation.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn unknown_input_is_a_usage_error() {
        assert!(matches!(
            parse_args(args(&["frobnicate"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(parse_args(args(&["show"])), Err(CliError::Usage(_))));
        assert!(matches!(
            parse_args(args(&["--data-dir"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn schema_descriptions_include_ranges() {
        assert_eq!(describe(&FieldKind::integer(Some(1), Some(25))), "integer 1..=25");
        assert_eq!(describe(&FieldKind::integer(Some(1), None)), "integer >= 1");
    }
}
