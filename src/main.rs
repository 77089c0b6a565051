// main.rs
mod cli;
mod config;
mod core;
mod export;
mod provider;
mod service;

use clap::Parser;
use cli::{Args, Commands};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let data_dir = args.data_dir;

    let result = match args.command {
        Commands::Add {
            title,
            artist,
            date,
            mood,
            tags,
            text,
            lang,
        } => cli::handle_add(data_dir, title, artist, date, mood, tags, text, lang).await,
        Commands::List { limit } => cli::handle_list(data_dir, limit),
        Commands::Calendar { month } => cli::handle_calendar(data_dir, month),
        Commands::Feedback { id, verdict } => cli::handle_feedback(data_dir, id, verdict),
        Commands::Delete { id } => cli::handle_delete(data_dir, id),
        Commands::Export { id } => cli::handle_export(data_dir, id),
        Commands::Tags => cli::handle_tags(),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
