use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use holdem_stats::aggregate::aggregate_records;
use holdem_stats::config::DEFAULT_FILE_PREFIX;
use holdem_stats::pdb;
use holdem_stats::xlsx;
use holdem_stats::{AggregateStore, AggregateTable, CacheKey, Config, FileCache, Period, Pipeline};

#[derive(Parser)]
#[command(name = "holdem-stats")]
#[command(about = "Aggregate per-player statistics from IRC hold'em hand histories", long_about = None)]
struct Cli {
    /// Output logging statements
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Folder holding the <year><month> log directories and the <year> caches
    #[arg(short, long, env = "HOLDEM_FOLDER", default_value = ".")]
    data_folder: PathBuf,

    /// Years to process, comma separated (default: 1995-2001)
    #[arg(long, value_delimiter = ',')]
    years: Option<Vec<String>>,

    /// Months to process, comma separated (default: 01-12)
    #[arg(long, value_delimiter = ',')]
    months: Option<Vec<String>>,

    /// Only files starting with this prefix are read as logs
    #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
    prefix: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest and cache every month, then roll up all years
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Number of years to process in parallel
        #[arg(short = 'p', long = "processes", default_value = "1")]
        processes: usize,

        /// Skip ingestion and aggregate previously cached data only
        #[arg(short, long)]
        graph_only: bool,

        /// Report elapsed time
        #[arg(short, long)]
        time_it: bool,

        /// Excel workbook to write the final table to
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Number of players on the summary and in the report's top sheet
        #[arg(long, default_value = "40")]
        top_n: usize,
    },

    /// Aggregate a single month of logs without caching it
    Month {
        #[arg(short, long, env = "HOLDEM_FOLDER", default_value = ".")]
        data_folder: PathBuf,

        year: String,

        month: String,

        #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
        prefix: String,
    },

    /// Display a cached aggregate table
    Show {
        #[arg(short, long, env = "HOLDEM_FOLDER", default_value = ".")]
        data_folder: PathBuf,

        year: String,

        /// Cache entry name, usually a month such as 04
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Run {
            data,
            processes,
            graph_only,
            time_it,
            report,
            top_n,
        } => {
            let config = build_config(data, processes, graph_only);
            run(&config, time_it, report.as_deref(), top_n)?;
        }
        Commands::Month {
            data_folder,
            year,
            month,
            prefix,
        } => {
            month_summary(&data_folder, &year, &month, &prefix)?;
        }
        Commands::Show {
            data_folder,
            year,
            name,
        } => {
            show(&data_folder, &year, &name)?;
        }
    }

    Ok(())
}

fn build_config(data: DataArgs, processes: usize, graph_only: bool) -> Config {
    let mut config = Config::new(&data.data_folder)
        .with_file_prefix(&data.prefix)
        .with_workers(processes)
        .with_graph_only(graph_only);
    if let Some(years) = data.years {
        config = config.with_years(years.as_slice());
    }
    if let Some(months) = data.months {
        config = config.with_months(months.as_slice());
    }
    config
}

fn run(config: &Config, time_it: bool, report: Option<&Path>, top_n: usize) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let start = Instant::now();

    let cache = FileCache::new(&config.data_folder);
    let summary = Pipeline::new(config, &cache)
        .run()
        .context("Pipeline failed")?;

    if time_it {
        log::info!("elapsed time: {:?}", start.elapsed());
        println!("Elapsed time: {:.2}s", start.elapsed().as_secs_f64());
    }

    let mut failed = Vec::new();
    if let Some(ingest) = &summary.ingest {
        for year in &ingest.years {
            println!(
                "{}: {} months cached, {} without data",
                year.year,
                year.cached.len(),
                year.empty.len()
            );
            for (month, err) in &year.failures {
                println!("  {}-{} FAILED: {}", year.year, month, err);
            }
            if let Some(err) = &year.crashed {
                println!("  {} FAILED: {}", year.year, err);
            }
        }
        failed = ingest.failed_years().into_iter().map(String::from).collect();
    }

    println!("Rolled up years: {}", summary.rolled_up_years.join(", "));
    print_table(&summary.table, top_n)?;

    if let Some(path) = report {
        println!("Writing Excel file: {}", path.display());
        xlsx::write_report(&summary.table, path, top_n).context("Failed to write Excel file")?;
    }

    if !failed.is_empty() {
        anyhow::bail!("Processing failed for years: {}", failed.join(", "));
    }

    println!("Done!");
    Ok(())
}

fn month_summary(data_folder: &Path, year: &str, month: &str, prefix: &str) -> Result<()> {
    let period = Period::month(data_folder, year, month);
    let records = pdb::read_period(&period, prefix)
        .with_context(|| format!("Failed to read logs for {}", period))?;
    println!("Read {} records for {}", records.len(), period);

    let table = aggregate_records(&records)
        .with_context(|| format!("Failed to aggregate {}", period))?;
    print_table(&table, table.len())?;
    Ok(())
}

fn show(data_folder: &Path, year: &str, name: &str) -> Result<()> {
    let cache = FileCache::new(data_folder);
    let key = CacheKey::new(year, name);
    let table = cache
        .load(&key)
        .with_context(|| format!("Failed to load cached table {}", key))?;
    println!("Cached table {}", key);
    print_table(&table, table.len())?;
    Ok(())
}

fn print_table(table: &AggregateTable, limit: usize) -> Result<()> {
    println!("Players: {}", table.len());
    if table.is_empty() {
        return Ok(());
    }

    println!(
        "\n{:<20} {:>10} {:>14} {:>10} {:>8}",
        "Player", "Games", "Gain", "Wins", "Win %"
    );
    println!("{:-<66}", "");
    for row in table.nlargest_by_gain(limit) {
        println!(
            "{:<20} {:>10} {:>14} {:>10} {:>7.2}%",
            truncate_name(&row.player_name, 20),
            row.game_count,
            row.monetary_gain,
            row.num_wins,
            row.totals().win_rate()
        );
    }
    if limit < table.len() {
        println!("  ... and {} more", table.len() - limit);
    }

    let totals = table.totals()?;
    println!("{:-<66}", "");
    println!(
        "{:<20} {:>10} {:>14} {:>10}",
        "Total", totals.game_count, totals.monetary_gain, totals.num_wins
    );
    Ok(())
}

fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
