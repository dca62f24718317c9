use clap::{Args, ValueEnum};
use tagtimer_core::activity::{aggregate_local, format_duration, weeks};
use tagtimer_core::{ActivityWindow, Config, Database, DayBucket, EntryStore, IntensityLevel};

use super::{print_json, CliResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum Layout {
    Trailing,
    Weeks,
}

#[derive(Args)]
pub struct ActivityArgs {
    /// Window layout; defaults to `activity.layout` from the config
    #[arg(long, value_enum)]
    layout: Option<Layout>,
    /// Output the day buckets as JSON
    #[arg(long)]
    json: bool,
}

const ROW_LABELS: [&str; 7] = [" ", "M", " ", "W", " ", "F", " "];

pub fn run(args: ActivityArgs, config: &Config) -> CliResult {
    let db = Database::open()?;
    let store = EntryStore::load(&db);

    let window = match args.layout {
        None => config.activity_window(),
        Some(Layout::Trailing) => ActivityWindow::Trailing {
            days: config.activity.trailing_days,
        },
        Some(Layout::Weeks) => ActivityWindow::Weeks {
            weeks: config.activity.weeks,
        },
    };
    let buckets = aggregate_local(store.list(), window);

    if args.json {
        return print_json(&buckets);
    }

    let week_aligned = matches!(window, ActivityWindow::Weeks { .. });
    let grid = weeks(&buckets);
    println!("ACTIVITY");
    for row in 0..7 {
        let label = if week_aligned { ROW_LABELS[row] } else { " " };
        let cells: String = grid
            .iter()
            .map(|week| week.get(row).map(cell).unwrap_or(' '))
            .collect();
        println!("{label} {cells}");
    }
    let total: u64 = buckets.iter().map(|b| b.total_secs).sum();
    let active = buckets.iter().filter(|b| b.total_secs > 0).count();
    println!(
        "{} over {} active days of {}",
        format_duration(total),
        active,
        window.len_days()
    );
    Ok(())
}

fn cell(bucket: &DayBucket) -> char {
    if bucket.future {
        return ' ';
    }
    match bucket.level {
        IntensityLevel::None => '·',
        IntensityLevel::Low => '░',
        IntensityLevel::Medium => '▒',
        IntensityLevel::High => '▓',
        IntensityLevel::Max => '█',
    }
}
