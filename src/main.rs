mod catalog;
mod challenge;
mod config;
mod degree;
mod error;
mod keyboard;
mod note;
mod repl;
mod tone;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::note::NoteName;

#[derive(Parser)]
#[command(name = "keyquiz", about = "Ear-training quiz on a terminal piano")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive quiz (default)
    Play {
        /// Seed for challenge picks, to replay a session
        #[arg(long)]
        seed: Option<u64>,

        /// Do not open the audio device
        #[arg(long)]
        mute: bool,

        /// Path to a .tone file
        #[arg(long)]
        tone: Option<PathBuf>,
    },

    /// List the scales and songs challenges are drawn from
    Catalog,

    /// Show the degree label of a chord tonic within a key
    Degree {
        /// Key name as listed by `catalog`, e.g. "Sol Maior (G)"
        key: String,

        /// Note name, e.g. D or F#
        note: NoteName,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let command = cli.command.unwrap_or(Command::Play {
        seed: None,
        mute: false,
        tone: None,
    });

    match command {
        Command::Play { seed, mute, tone } => {
            let settings = Settings {
                seed,
                mute,
                tone: match tone {
                    Some(path) => config::load(&path).unwrap_or_else(|e| {
                        eprintln!("Error in tone file {}: {}", path.display(), e);
                        std::process::exit(1);
                    }),
                    None => Default::default(),
                },
            };

            if let Err(e) = repl::run(&settings) {
                eprintln!("Quiz error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Catalog => print_catalog(&Catalog::builtin()),
        Command::Degree { key, note } => {
            let label = degree::name_degree(&Catalog::builtin(), &key, note);
            if label.is_empty() {
                println!("{} has no degree in {}", note, key);
            } else {
                println!("{}", label);
            }
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    let join = |notes: &[NoteName]| {
        notes
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };

    println!("Scales: {}", catalog.scales().len());
    for scale in catalog.scales() {
        println!("  {:<16} {}", scale.key, join(&scale.notes));
    }
    println!();
    println!("Songs: {}", catalog.songs().len());
    for song in catalog.songs() {
        println!("--- {} ---", song.title);
        println!("  Key:         {}", song.key);
        println!("  Progression: {}", join(&song.progression));
        println!(
            "  Improvise:   {} ({})",
            song.improv_scale,
            join(song.scale_notes)
        );
    }
}
