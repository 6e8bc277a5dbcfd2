//! # reportflow CLI
//!
//! Usage:
//!   reportflow report.json -o pages.json
//!   echo '{ ... }' | reportflow -o pages.json
//!   reportflow report.json --style style.json
//!   reportflow --example > report.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::{process, str::FromStr};

use chrono::Local;
use clap::Parser;
use log::{debug, error, info, LevelFilter};

use reportflow::error::ReportError;
use reportflow::model::Report;
use reportflow::style::ReportStyle;

/// Lay a survey report out into pages of draw commands.
#[derive(Debug, Parser)]
#[command(name = "reportflow", version, about)]
struct Args {
    /// Report JSON file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Where to write the recorded pages.
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Style JSON file, replacing the report's own style.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Print a sample report and exit.
    #[arg(long)]
    example: bool,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    if args.example {
        print!("{}", example_report_json());
        return;
    }

    debug!(args:?; "Parsed arguments");

    match run(&args) {
        Ok(pages) => {
            eprintln!("✓ Written {} pages to {}", pages, args.output.display());
        }
        Err(err) => {
            eprintln!("✗ {err}");
            error!(err:err; "Run failed");
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<usize, ReportError> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut report: Report = serde_json::from_str(&input)?;
    if report.generated_at.is_none() {
        report.generated_at = Some(Local::now().naive_local());
    }

    let pages = match &args.style {
        Some(path) => {
            let style: ReportStyle = serde_json::from_str(&fs::read_to_string(path)?)?;
            info!(path:?; "Using style file");
            reportflow::render_with_style(&report, &style)?
        }
        None => reportflow::render(&report)?,
    };

    fs::write(&args.output, serde_json::to_string_pretty(&pages)?)?;
    Ok(pages.len())
}

fn example_report_json() -> &'static str {
    r##"{
  "title": "Bilan de la formation",
  "generatedAt": "2024-03-05T14:30:00",
  "blocks": [
    { "type": "Title", "level": 1, "text": "Satisfaction générale" },
    {
      "type": "Paragraph",
      "text": "Ce document rassemble les réponses des participants au questionnaire de fin de session."
    },
    {
      "type": "Notes",
      "identifier": "q1",
      "text": "Êtes-vous satisfait de la formation ?",
      "possibleValues": ["Très satisfait", "Satisfait", "Peu satisfait", "Pas satisfait"]
    },
    {
      "type": "Notes",
      "identifier": "q2",
      "text": "Note globale",
      "possibleValues": ["1", "2", "3", "4", "5"]
    },
    { "type": "Title", "level": 2, "text": "Commentaires" },
    { "type": "Remark", "identifier": "r1", "text": "Qu'avez-vous le plus apprécié ?" }
  ],
  "responses": [
    { "answers": { "q1": "Très satisfait", "q2": 5, "r1": "Les exercices pratiques." } },
    { "answers": { "q1": "Satisfait", "q2": 4, "r1": "Le rythme, bien adapté." } },
    { "answers": { "q1": "Satisfait", "q2": 4 } },
    { "answers": { "q1": "Peu satisfait", "q2": 2, "r1": "Les supports de cours." } }
  ]
}
"##
}
