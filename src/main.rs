use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use acta_pdf::drafts::{DirStore, Drafts};
use acta_pdf::{Error, Record, RenderOptions};

const DRAFTS_ENV: &str = "ACTA_PDF_DRAFTS";
const DEFAULT_DRAFTS_DIR: &str = ".acta-drafts";

/// Render event supervision reports to PDF and manage saved drafts
#[derive(Parser, Debug)]
#[command(name = "acta-pdf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a record JSON file to PDF
    Render {
        record: PathBuf,

        /// Output file (defaults to the record's report name)
        #[arg(short, long, value_name = "FILE", conflicts_with = "out_dir")]
        output: Option<PathBuf>,

        /// Directory to write the report into under its generated name
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Logo image drawn under the banner
        #[arg(long, value_name = "PNG")]
        logo: Option<PathBuf>,

        /// Signature image for the signature block
        #[arg(long, value_name = "PNG")]
        signature: Option<PathBuf>,

        /// Date printed in the footers (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Manage saved drafts
    Drafts {
        /// Drafts directory [env: ACTA_PDF_DRAFTS, default: ./.acta-drafts]
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Subcommand, Debug)]
enum DraftAction {
    /// Save a record JSON file as a draft
    Save {
        record: PathBuf,
        /// Overwrite this draft instead of creating a new one
        #[arg(long)]
        id: Option<String>,
    },
    /// List saved drafts
    List,
    /// Print a draft as JSON
    Show { id: String },
    /// Delete a draft
    Delete { id: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Render {
            record,
            output,
            out_dir,
            logo,
            signature,
            date,
        } => {
            let mut rec = read_record(&record)?;
            let base_dir = record.parent().unwrap_or(Path::new("."));
            acta_pdf::load_photo_files(&mut rec, base_dir);
            if let Some(path) = signature {
                rec.signature = Some(std::fs::read(path)?);
            }

            let mut options = RenderOptions::default();
            if let Some(path) = logo {
                options.logo = Some(std::fs::read(path)?);
            }
            if let Some(date) = date {
                options.generated_on = date;
            }

            let written = match output {
                Some(path) => {
                    acta_pdf::generate(&rec, &options)?.write_to(&path)?;
                    path
                }
                None => {
                    let dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
                    acta_pdf::generate_to_file(&rec, &options, &dir)?
                }
            };
            println!("{}", written.display());
        }
        Command::Drafts { dir, action } => {
            let dir = dir
                .or_else(|| std::env::var_os(DRAFTS_ENV).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DRAFTS_DIR));
            let mut drafts = Drafts::new(DirStore::open(dir)?);

            match action {
                DraftAction::Save { record, id } => {
                    let rec = read_record(&record)?;
                    println!("{}", drafts.save(&rec, id.as_deref())?);
                }
                DraftAction::List => {
                    for s in drafts.summaries()? {
                        let saved = s
                            .last_saved
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        let verified = if s.verified { "verificada" } else { "" };
                        println!("{}\t{saved}\t{}\t{}\t{verified}", s.id, s.location, s.supervisor);
                    }
                }
                DraftAction::Show { id } => {
                    let rec = drafts.require(&id)?;
                    println!("{}", serde_json::to_string_pretty(&rec)?);
                }
                DraftAction::Delete { id } => {
                    if !drafts.delete(&id)? {
                        return Err(Error::DraftNotFound(id));
                    }
                }
            }
        }
    }
    Ok(())
}

fn read_record(path: &Path) -> Result<Record, Error> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
