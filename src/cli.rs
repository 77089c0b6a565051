use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;

use crate::config::Config;
use crate::core::calendar::month_grid;
use crate::core::record::{EntryDraft, Language, MemoryRecord, Song, UserFeedback};
use crate::core::tags::{self, TagSelection, MAX_TAGS};
use crate::core::{FileStorage, MemoryStore};
use crate::provider::GeminiProvider;
use crate::service::DiaryService;

#[derive(Parser)]
#[command(name = "melodiary", version, about = "Song-paired mood diary with AI reflections")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a new memory: a song, a mood, and an AI reflection
    Add {
        /// Song title
        #[arg(long)]
        title: String,

        /// Song artist
        #[arg(long)]
        artist: String,

        /// Date of the memory, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Mood score from -50 (quiet, cool) to +50 (active, warm)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        mood: i32,

        /// Mood tag from the fixed vocabulary (repeat for up to 3)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Free-text diary note
        #[arg(long)]
        text: Option<String>,

        /// Language for the reflection (en/ja, defaults to config)
        #[arg(long)]
        lang: Option<String>,
    },

    /// Show memories, newest first
    List {
        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one month as a calendar grid
    Calendar {
        /// Month to show, YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Tell the diary whether the inferred emotion was right
    Feedback {
        id: String,
        #[arg(value_enum)]
        verdict: Verdict,
    },

    /// Remove a memory
    Delete { id: String },

    /// Print a shareable summary of one memory
    Export { id: String },

    /// List the mood tag vocabulary
    Tags,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Verdict {
    Correct,
    Incorrect,
}

fn build_service(config: &Config) -> DiaryService<FileStorage, GeminiProvider> {
    let store = MemoryStore::new(FileStorage::new(config.memories_path()));
    let provider = GeminiProvider::new(
        config.gemini_api_key(),
        config.model.clone(),
        config.image_model.clone(),
        config.images_dir(),
    );
    DiaryService::new(store, provider)
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn parse_month(s: &str) -> Result<(i32, u32)> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| anyhow!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((
        year.parse()
            .with_context(|| format!("Invalid year in '{}'", s))?,
        month
            .parse()
            .with_context(|| format!("Invalid month in '{}'", s))?,
    ))
}

fn feedback_glyph(record: &MemoryRecord) -> ColoredString {
    match record.user_feedback {
        UserFeedback::Correct => "✓".green(),
        UserFeedback::Incorrect => "✗".red(),
        UserFeedback::Unset => "·".dimmed(),
    }
}

pub async fn handle_add(
    data_dir: Option<PathBuf>,
    title: String,
    artist: String,
    date: Option<String>,
    mood: i32,
    tags: Vec<String>,
    text: Option<String>,
    lang: Option<String>,
) -> Result<()> {
    let config = Config::new(data_dir)?;

    let language = match lang {
        Some(s) => s.parse::<Language>()?,
        None => config.language,
    };
    let timestamp = match date {
        Some(s) => parse_date(&s)?,
        None => Utc::now(),
    };

    // Repeated --tag flags behave like taps on a tag picker: a repeat
    // deselects, and anything past the third selection is ignored
    let mut selection = TagSelection::new();
    for tag in &tags {
        selection.toggle(tag);
    }

    let mut draft = EntryDraft::new(timestamp, Song::new(title, artist), language);
    draft.mood_score = mood;
    draft.mood_tags = selection.into_tags();
    draft.content = text.unwrap_or_default();

    let mut service = build_service(&config);
    let result = service.create(draft).await?;
    let record = &result.record;

    println!("{}", "✅ Memory saved".green().bold());
    println!(
        "{} \"{}\" by {}",
        record.timestamp.format("%Y-%m-%d").to_string().dimmed(),
        record.song.title.cyan(),
        record.song.artist
    );
    println!(
        "Feeling: {} {}",
        record.analysis.inferred_emotion.yellow(),
        record.analysis.mood_color.dimmed()
    );
    println!("{}", record.analysis.analysis_text);

    if result.analysis_degraded {
        println!(
            "{}",
            "(saved without an AI reflection this time)".yellow()
        );
    }
    if !record.image_url.is_empty() {
        println!("🖼  {}", record.image_url.dimmed());
    }
    println!("id: {}", record.id.dimmed());

    Ok(())
}

pub fn handle_list(data_dir: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let service = build_service(&config);

    let records = service.records();
    if records.is_empty() {
        println!("{}", "No memories yet. Save one with `melodiary add`.".yellow());
        return Ok(());
    }

    let shown = limit.unwrap_or(records.len());
    for record in records.iter().take(shown) {
        println!(
            "{} {} {:<24} {:<18} {:>4} {} {}",
            feedback_glyph(record),
            record.timestamp.format("%Y-%m-%d").to_string().dimmed(),
            record.song.title.cyan(),
            record.analysis.inferred_emotion.yellow(),
            format!("{:+}", record.mood_score),
            record.mood_tags.join(","),
            record.id.dimmed()
        );
    }

    if shown < records.len() {
        println!("{}", format!("... and {} more", records.len() - shown).dimmed());
    }

    Ok(())
}

pub fn handle_calendar(data_dir: Option<PathBuf>, month: Option<String>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let service = build_service(&config);

    let (year, month) = match month {
        Some(s) => parse_month(&s)?,
        None => {
            let now = Utc::now();
            (now.year(), now.month())
        }
    };

    let grid = month_grid(year, month, service.records())?;

    println!("{}", format!("{}-{:02}", grid.year, grid.month).cyan().bold());
    println!("{}", " Su  Mo  Tu  We  Th  Fr  Sa".dimmed());

    let mut column = 0;
    for _ in 0..grid.leading_blanks {
        print!("    ");
        column += 1;
    }
    for bucket in &grid.days {
        if bucket.record_ids.is_empty() {
            print!("{:>3} ", bucket.day);
        } else {
            print!("{:>3}{}", bucket.day.to_string().green().bold(), "•".green());
        }
        column += 1;
        if column == 7 {
            println!();
            column = 0;
        }
    }
    if column != 0 {
        println!();
    }

    let total: usize = grid.days.iter().map(|d| d.record_ids.len()).sum();
    println!(
        "{}",
        format!("{} memories in {}-{:02}", total, grid.year, grid.month).dimmed()
    );

    Ok(())
}

pub fn handle_feedback(data_dir: Option<PathBuf>, id: String, verdict: Verdict) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut service = build_service(&config);

    if service.get(&id).is_none() {
        // A deleted record is tolerated: nothing to update, not an error
        println!("{}", format!("No memory with id {}", id).yellow());
        return Ok(());
    }

    let correct = matches!(verdict, Verdict::Correct);
    service.set_feedback(&id, correct)?;

    if correct {
        println!("{}", "✓ Marked the inferred emotion as right".green());
    } else {
        println!("{}", "✗ Marked the inferred emotion as off".yellow());
    }
    Ok(())
}

pub fn handle_delete(data_dir: Option<PathBuf>, id: String) -> Result<()> {
    let config = Config::new(data_dir)?;
    let mut service = build_service(&config);

    if service.get(&id).is_none() {
        println!("{}", format!("No memory with id {}", id).yellow());
        return Ok(());
    }

    service.delete(&id)?;
    println!("{}", "🗑  Memory removed".green());
    Ok(())
}

pub fn handle_export(data_dir: Option<PathBuf>, id: String) -> Result<()> {
    let config = Config::new(data_dir)?;
    let service = build_service(&config);

    let summary = service.export_summary(&id)?;
    println!("{}", summary);
    println!("{}", "📋 Ready to paste".dimmed());
    Ok(())
}

pub fn handle_tags() -> Result<()> {
    println!(
        "{}",
        format!("Mood tags (pick up to {} per memory):", MAX_TAGS).cyan()
    );
    for (name, ja) in tags::MOOD_TAGS {
        println!("  {:<12} {}", name, ja.dimmed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let ts = parse_date("2025-07-01").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2025-07-01 00:00");

        assert!(parse_date("07/01/2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-10").unwrap(), (2025, 10));
        assert!(parse_month("October").is_err());
        assert!(parse_month("2025-xx").is_err());
    }
}
