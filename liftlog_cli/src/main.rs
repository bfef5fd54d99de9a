use clap::{Parser, Subcommand};
use liftlog_core::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Strength training log with per-day estimated max history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a set (bench, squat, deadlift or any assistance exercise)
    Log {
        /// Exercise name
        exercise: String,

        /// Weight in kg (defaults from the exercise catalog)
        #[arg(long, short)]
        weight: Option<f64>,

        /// Repetitions (defaults from the exercise catalog)
        #[arg(long, short)]
        reps: Option<u32>,

        /// When the set was performed (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the per-day summary (default)
    History {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Keep only the best set per lift per day
        #[arg(long)]
        best_of_day: bool,

        /// Print entry ids (needed for edit/delete)
        #[arg(long)]
        ids: bool,
    },

    /// Change weight and/or reps of a recorded set
    Edit {
        id: Uuid,

        #[arg(long, short)]
        weight: Option<f64>,

        #[arg(long, short)]
        reps: Option<u32>,
    },

    /// Delete a recorded set
    Delete { id: Uuid },

    /// Export the per-day summary to CSV or XLSX
    Export {
        /// Output file
        #[arg(long, short)]
        out: PathBuf,

        /// csv or xlsx (defaults to config, then to the file extension)
        #[arg(long)]
        format: Option<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        best_of_day: bool,
    },

    /// List known exercises and their entry defaults
    Menu,
}

fn main() {
    liftlog_core::logging::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let mut store = JsonlStore::new(entries_path(&data_dir));
    tracing::debug!("Using entry log {:?}", store.path());

    match cli.command {
        Some(Commands::Log {
            exercise,
            weight,
            reps,
            at,
        }) => cmd_log(&mut store, &config, exercise, weight, reps, at),
        Some(Commands::History {
            from,
            to,
            best_of_day,
            ids,
        }) => cmd_history(&store, &config, from, to, best_of_day, ids),
        Some(Commands::Edit { id, weight, reps }) => cmd_edit(&mut store, id, weight, reps),
        Some(Commands::Delete { id }) => cmd_delete(&mut store, id),
        Some(Commands::Export {
            out,
            format,
            from,
            to,
            best_of_day,
        }) => cmd_export(&store, &config, &out, format, from, to, best_of_day),
        Some(Commands::Menu) => cmd_menu(&config),
        None => cmd_history(&store, &config, None, None, false, false),
    }
}

fn entries_path(data_dir: &Path) -> PathBuf {
    data_dir.join("entries.jsonl")
}

fn aggregate_options(config: &Config, best_of_day: bool) -> Result<AggregateOptions> {
    let mut options = config.history.aggregate_options()?;
    if best_of_day {
        options.policy = SelectionPolicy::BestOfDay;
    }
    Ok(options)
}

fn cmd_log(
    store: &mut JsonlStore,
    config: &Config,
    exercise: String,
    weight: Option<f64>,
    reps: Option<u32>,
    at: Option<String>,
) -> Result<()> {
    let catalog = Catalog::with_custom(&config.assistance);
    let defaults = catalog.defaults_for(&exercise);

    let mut entry = NewEntry::new(
        exercise,
        weight.unwrap_or(defaults.weight),
        reps.unwrap_or(defaults.reps),
    );
    if let Some(at) = at {
        let performed_at = chrono::DateTime::parse_from_rfc3339(&at)
            .map_err(|e| Error::Validation(format!("invalid --at '{}': {}", at, e)))?
            .with_timezone(&chrono::Utc);
        entry = entry.at(performed_at);
    }

    let entry = store.insert(entry)?;

    match Lift::from_exercise(&entry.exercise) {
        Some(_) => println!(
            "✓ Logged {} {}kg x {} (PV {})",
            entry.exercise,
            entry.weight,
            entry.reps,
            estimate(entry.weight, entry.reps)
        ),
        None => println!(
            "✓ Logged {}: {}kg x {}",
            entry.exercise, entry.weight, entry.reps
        ),
    }
    println!("  id: {}", entry.id);
    Ok(())
}

fn cmd_history(
    store: &JsonlStore,
    config: &Config,
    from: Option<String>,
    to: Option<String>,
    best_of_day: bool,
    show_ids: bool,
) -> Result<()> {
    let range = DayRange::parse(from.as_deref(), to.as_deref())?;
    let options = aggregate_options(config, best_of_day)?;
    let groups = load_history(store, &options, &range)?;

    if groups.is_empty() {
        println!("No entries recorded.");
        return Ok(());
    }

    for group in &groups {
        display_day(group, show_ids);
    }
    Ok(())
}

fn display_day(group: &DayGroup, show_ids: bool) {
    println!("\n── {} ─────────────────────────────", group.date);

    for lift in Lift::ALL {
        let sets = group.lift(lift);
        if sets.is_empty() {
            continue;
        }
        println!("  {}", lift.label().to_uppercase());
        for set in sets {
            print!("    {}kg x {}  (PV {})", set.weight, set.reps, set.strength_index);
            if show_ids {
                print!("  [{}]", set.id);
            }
            println!();
        }
    }

    if !group.others.is_empty() {
        println!("  OTHERS");
        for other in &group.others {
            print!("    {}: {}kg x {}", other.name, other.weight, other.reps);
            if show_ids {
                print!("  [{}]", other.id);
            }
            println!();
        }
    }
}

fn cmd_edit(store: &mut JsonlStore, id: Uuid, weight: Option<f64>, reps: Option<u32>) -> Result<()> {
    let patch = EntryPatch { weight, reps };
    if patch.is_empty() {
        return Err(Error::Validation(
            "nothing to change; pass --weight and/or --reps".into(),
        ));
    }

    let entry = store.update(id, &patch)?;
    println!(
        "✓ Updated {}: {}kg x {}",
        entry.exercise, entry.weight, entry.reps
    );
    Ok(())
}

fn cmd_delete(store: &mut JsonlStore, id: Uuid) -> Result<()> {
    store.delete(id)?;
    println!("✓ Deleted {}", id);
    Ok(())
}

fn cmd_export(
    store: &JsonlStore,
    config: &Config,
    out: &Path,
    format: Option<String>,
    from: Option<String>,
    to: Option<String>,
    best_of_day: bool,
) -> Result<()> {
    let format = match format {
        Some(f) => f.parse::<ExportFormat>()?,
        None => match out.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext
                .parse::<ExportFormat>()
                .unwrap_or(config.export.default_format),
            None => config.export.default_format,
        },
    };

    let range = DayRange::parse(from.as_deref(), to.as_deref())?;
    let options = aggregate_options(config, best_of_day)?;

    // Range is applied inside export so an empty result is reported as such
    let groups = load_history(store, &options, &DayRange::default())?;
    let rows = export(groups, &range, options.policy.limit(), format, out)?;

    println!("✓ Exported {} days to {}", rows, out.display());
    Ok(())
}

fn cmd_menu(config: &Config) -> Result<()> {
    let catalog = Catalog::with_custom(&config.assistance);

    println!("PRIMARY LIFTS");
    for def in catalog.exercises.iter().filter(|e| e.lift.is_some()) {
        println!(
            "  {:<16} {}kg x {}",
            def.name, def.defaults.weight, def.defaults.reps
        );
    }
    println!("ASSISTANCE");
    for def in catalog.assistance() {
        println!(
            "  {:<16} {}kg x {}",
            def.name, def.defaults.weight, def.defaults.reps
        );
    }
    Ok(())
}
