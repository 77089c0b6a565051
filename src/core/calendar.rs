use chrono::{Datelike, NaiveDate};

use super::error::{DiaryError, Result};
use super::record::MemoryRecord;

/// One calendar cell: the day of month plus the ids of every record
/// whose timestamp falls on that day
#[derive(Debug, Clone)]
pub struct DayBucket {
    pub day: u32,
    pub record_ids: Vec<String>,
}

/// A month of records, bucketed by day and aligned for a Sunday-first
/// grid. Stateless projection: re-derivable from the store at any time.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 (Sunday-based weekday index of the 1st)
    pub leading_blanks: usize,
    pub days: Vec<DayBucket>,
}

/// Partition records into the day buckets of one month. Records outside
/// the month are ignored; months of 28-31 days all come out with the
/// right cell count.
pub fn month_grid(year: i32, month: u32, records: &[MemoryRecord]) -> Result<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DiaryError::Validation(format!("Invalid month: {}-{:02}", year, month)))?;

    let leading_blanks = first.weekday().num_days_from_sunday() as usize;

    let mut days: Vec<DayBucket> = (1..=days_in_month(year, month))
        .map(|day| DayBucket {
            day,
            record_ids: Vec::new(),
        })
        .collect();

    for record in records {
        let date = record.timestamp.date_naive();
        if date.year() == year && date.month() == month {
            days[date.day() as usize - 1].record_ids.push(record.id.clone());
        }
    }

    Ok(MonthGrid {
        year,
        month,
        leading_blanks,
        days,
    })
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // month is already validated by the caller
    next.and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Analysis, EntryDraft, Language, MemoryRecord, Song};
    use chrono::{TimeZone, Utc};

    fn record_on(y: i32, m: u32, d: u32) -> MemoryRecord {
        let ts = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        let draft = EntryDraft::new(ts, Song::new("Song", "Artist"), Language::En);
        MemoryRecord::new(
            draft,
            Analysis {
                inferred_emotion: "calm".to_string(),
                analysis_text: "text".to_string(),
                mood_color: "#888888".to_string(),
                image_prompt: "prompt".to_string(),
            },
            String::new(),
        )
    }

    #[test]
    fn test_october_2025_alignment() {
        // 2025-10-01 is a Wednesday: three leading blanks on a
        // Sunday-first grid, 31 day cells
        let grid = month_grid(2025, 10, &[]).unwrap();
        assert_eq!(grid.leading_blanks, 3);
        assert_eq!(grid.days.len(), 31);
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(month_grid(2024, 2, &[]).unwrap().days.len(), 29);
        assert_eq!(month_grid(2023, 2, &[]).unwrap().days.len(), 28);
        assert_eq!(month_grid(2025, 4, &[]).unwrap().days.len(), 30);
        assert_eq!(month_grid(2025, 12, &[]).unwrap().days.len(), 31);
    }

    #[test]
    fn test_bucketing_by_day() {
        let records = vec![
            record_on(2025, 10, 5),
            record_on(2025, 10, 5),
            record_on(2025, 10, 31),
            record_on(2025, 9, 30),
        ];

        let grid = month_grid(2025, 10, &records).unwrap();
        assert_eq!(grid.days[4].record_ids.len(), 2);
        assert_eq!(grid.days[30].record_ids.len(), 1);

        let total: usize = grid.days.iter().map(|d| d.record_ids.len()).sum();
        assert_eq!(total, 3); // the September record is not bucketed
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(month_grid(2025, 13, &[]).is_err());
        assert!(month_grid(2025, 0, &[]).is_err());
    }
}
