use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use liftrs::config::AppConfig;
use liftrs::health::HealthService;
use liftrs::logging::init_logging;
use liftrs::models::{WeightUnit, WorkoutSession};
use liftrs::plates::{format_plate_calculation, PlateCalculator};
use liftrs::records::{check_personal_record, get_pr_description, ExerciseHistory, SetPerformance};
use liftrs::routine::{parse_generated_routine, progress_routine_day};
use liftrs::session::{complete_workout, RoutineHistory};
use liftrs::storage::{Database, NoHealthData, RoutineStore, SessionLog};
use liftrs::units::{convert_weight, format_weight, round_weight};
use liftrs::LiftRsError;

/// LiftRS - Strength Training Analytics CLI
///
/// Plate loading, personal records, routine progression and daily
/// recovery scoring over a local workout log.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(version)]
#[command(about = "Strength training analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which plates to load on each side of the bar
    Plates {
        /// Target weight including the bar
        weight: f64,

        /// Unit (kg or lbs); defaults to the configured unit
        #[arg(short, long)]
        unit: Option<WeightUnit>,
    },

    /// Convert a weight between kg and lbs
    Convert {
        weight: f64,

        #[arg(short, long)]
        from: WeightUnit,

        #[arg(short, long)]
        to: WeightUnit,

        /// Round to the nearest loadable increment
        #[arg(short, long)]
        round: bool,
    },

    /// Check whether a set would be a personal record
    Pr {
        exercise: String,
        weight: f64,
        reps: u32,
    },

    /// Lifetime statistics for an exercise
    Stats {
        exercise: String,

        /// Only count sessions of this routine
        #[arg(short, long)]
        routine: Option<String>,
    },

    /// Daily recovery, stress and exertion scores
    Health {
        /// Date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Recompute even if a cached record exists
        #[arg(long)]
        force: bool,
    },

    /// Record a finished workout session from a JSON file
    Complete {
        file: PathBuf,
    },

    /// Manage routines
    Routine {
        #[command(subcommand)]
        command: RoutineCommands,
    },

    /// Show configuration
    Config {
        /// Print the config file path only
        #[arg(long)]
        path: bool,

        /// Write the current configuration to the default location
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum RoutineCommands {
    /// List stored routines
    List,

    /// Show the day suggested next
    Next { id: String },

    /// Advance to the next day
    Progress { id: String },

    /// Volume, sets and exercise frequency for a routine
    History { id: String },

    /// Import a generated routine (JSON, optionally wrapped in text)
    Import { file: PathBuf },
}

#[derive(Tabled)]
struct PlateRow {
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Per side")]
    count: u32,
}

#[derive(Tabled)]
struct RoutineRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Days")]
    days: usize,
    #[tabled(rename = "Next")]
    next: String,
}

#[derive(Tabled)]
struct ExerciseSessionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Max")]
    max_weight: String,
    #[tabled(rename = "Sets")]
    sets: u32,
    #[tabled(rename = "Reps")]
    reps: u32,
    #[tabled(rename = "Volume")]
    volume: String,
}

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Sleep h")]
    sleep: String,
    #[tabled(rename = "Stress")]
    stress: u8,
    #[tabled(rename = "Recovery")]
    recovery: u8,
    #[tabled(rename = "Exertion")]
    exertion: String,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let message = match err.downcast_ref::<LiftRsError>() {
            Some(lift_err) => lift_err.user_message(),
            None => format!("{:#}", err),
        };
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Config paths and fresh files are handled before any file is loaded
    if let Commands::Config { path, init } = &cli.command {
        let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
        if *path {
            println!("{}", config_path.display());
            return Ok(());
        }
        if *init {
            AppConfig::init_file(&config_path)?;
            println!("{} {}", "✓ Wrote".green(), config_path.display());
            return Ok(());
        }
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.logging.level = config.logging.level.raised_by(cli.verbose);
    init_logging(&config.logging)?;

    let unit = config.settings.weight_unit;

    match cli.command {
        Commands::Plates { weight, unit: unit_arg } => {
            let unit = unit_arg.unwrap_or(unit);
            let calculator = PlateCalculator::with_config(config.plates.clone());
            let calculation = calculator.calculate(weight, unit);

            if !calculation.is_valid {
                println!("{}", format_plate_calculation(&calculation, unit).yellow());
                return Ok(());
            }

            println!("{}", format!("Loading {}", format_weight(weight, unit, 2)).green().bold());
            if calculation.plates.is_empty() {
                println!("{}", format_plate_calculation(&calculation, unit));
            } else {
                let rows = calculation.plates.iter().map(|p| PlateRow {
                    plate: format!("{}{}", p.weight, unit),
                    count: p.count,
                });
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }

        Commands::Convert { weight, from, to, round } => {
            let mut converted = convert_weight(weight, from, to);
            if round {
                converted = round_weight(converted, to);
            }
            println!(
                "{} = {}",
                format_weight(weight, from, 2),
                format_weight(converted, to, 2).cyan().bold()
            );
        }

        Commands::Pr { exercise, weight, reps } => {
            let db = open_database(&config)?;
            let sessions = db.load_all_sessions()?;
            let performance = SetPerformance::new(weight, reps);
            let record = check_personal_record(&exercise, performance, &sessions);

            if record.is_pr {
                println!(
                    "{} {} × {} on {}: {}",
                    "PR!".green().bold(),
                    format_weight(weight, unit, 1),
                    reps,
                    exercise,
                    get_pr_description(&record.types)
                );
            } else {
                let line = format!(
                    "No record for {} at {} × {}",
                    exercise,
                    format_weight(weight, unit, 1),
                    reps
                );
                println!("{}", line.dimmed());
            }
        }

        Commands::Stats { exercise, routine } => {
            let db = open_database(&config)?;
            let sessions = db.load_all_sessions()?;
            let history = ExerciseHistory::build(&exercise, &sessions, routine.as_deref());

            if history.session_count() == 0 {
                println!("{}", format!("No completed sets logged for {}", exercise).yellow());
                return Ok(());
            }

            println!("{}", history.exercise_name.bold());
            let rows = history.sessions.iter().map(|s| ExerciseSessionRow {
                date: s.date.to_string(),
                max_weight: format_weight(s.max_weight, unit, 1),
                sets: s.total_sets,
                reps: s.total_reps,
                volume: format!("{:.0}", s.total_volume),
            });
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!(
                "Sessions: {}  Sets: {}  Volume: {:.0}  Best: {}",
                history.session_count(),
                history.total_sets,
                history.total_volume,
                format_weight(history.max_weight_ever, unit, 1).green()
            );
        }

        Commands::Health { date, force } => {
            let db = open_database(&config)?;
            let service =
                HealthService::with_config(&db, &db, &NoHealthData, config.health.clone());
            let date = date.unwrap_or_else(|| Utc::now().date_naive());

            if force {
                service.get_health_metrics_for_day(date, true, None)?;
            }
            let summary = service.get_daily_health_summary(date, None)?;
            let metrics = &summary.metrics;

            println!("{}", format!("Health for {}", date).bold());
            println!("  Recovery: {}", metrics.recovery_score.to_string().green().bold());
            println!("  Stress:   {}", metrics.stress_score.to_string().yellow().bold());
            println!("  Exertion: {:.1}", metrics.exertion_score);
            println!("  Sleep:    {:.1} h ({}%)", metrics.sleep_hours, metrics.sleep_percentage);
            if let Some(volume) = summary.workout_volume {
                println!("  Volume:   {:.0}", volume);
            }

            let rows = summary.last_7_days.iter().map(|m| HealthRow {
                date: m.date.to_string(),
                sleep: format!("{:.1}", m.sleep_hours),
                stress: m.stress_score,
                recovery: m.recovery_score,
                exertion: format!("{:.1}", m.exertion_score),
            });
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!(
                "Weekly averages: sleep {:.1} h, stress {:.0}, recovery {:.0}, burned {:.0} kcal",
                summary.weekly_averages.avg_sleep_hours,
                summary.weekly_averages.avg_stress,
                summary.weekly_averages.avg_recovery,
                summary.weekly_averages.avg_calories_burned
            );
        }

        Commands::Complete { file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read session file: {}", file.display()))?;
            let mut session: WorkoutSession = serde_json::from_str(&content)
                .with_context(|| "Failed to parse workout session JSON")?;
            session.recompute_totals();

            let db = open_database(&config)?;
            let completion = complete_workout(&session, &db, &db)?;

            println!(
                "{} {} sets, {} volume",
                "✓ Workout saved:".green().bold(),
                session.total_sets,
                format_weight(session.total_volume, session.weight_unit, 0)
            );
            for pr in &completion.personal_records {
                println!(
                    "  {} {} set {}: {}",
                    "PR".green().bold(),
                    pr.exercise_name,
                    pr.set_number,
                    get_pr_description(&pr.pr_types)
                );
            }
            let routine = db.get_routine(&session.routine_id)?;
            if let Some(day) = routine.suggested_day() {
                println!("Next up: {}", day.name.cyan());
            }
        }

        Commands::Routine { command } => run_routine_command(command, &config)?,

        Commands::Config { .. } => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn run_routine_command(command: RoutineCommands, config: &AppConfig) -> Result<()> {
    let db = open_database(config)?;

    match command {
        RoutineCommands::List => {
            let routines = db.list_routines()?;
            if routines.is_empty() {
                let hint = "No routines yet. Import one with `liftrs routine import`.";
                println!("{}", hint.yellow());
                return Ok(());
            }
            let rows = routines.iter().map(|r| RoutineRow {
                id: r.id.clone(),
                name: r.name.clone(),
                days: r.days.len(),
                next: r.suggested_day().map(|d| d.name.clone()).unwrap_or_default(),
            });
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        RoutineCommands::Next { id } => {
            let routine = db.get_routine(&id)?;
            let day = routine
                .suggested_day()
                .ok_or_else(|| anyhow::anyhow!("Routine {} has no days", id))?;

            println!(
                "{} {} (day {} of {})",
                "Next:".bold(),
                day.name.cyan().bold(),
                day.day_number,
                routine.days.len()
            );
            for exercise in &day.exercises {
                println!("  {} × {} sets", exercise.name, exercise.sets);
            }
        }

        RoutineCommands::Progress { id } => {
            let index = progress_routine_day(&db, &id)?;
            let routine = db.get_routine(&id)?;
            let name = routine.days.get(index).map(|d| d.name.as_str()).unwrap_or("");
            println!("{} {}", "✓ Next day:".green(), name);
        }

        RoutineCommands::History { id } => {
            let sessions = db.sessions_for_routine(&id)?;
            let history = RoutineHistory::build(&id, &sessions);

            println!(
                "Workouts: {}  Volume: {:.0}  Sets: {}  Avg duration: {} min",
                history.session_count(),
                history.total_volume,
                history.total_sets,
                history.average_duration_seconds / 60
            );
            for exercise in &history.exercises {
                println!(
                    "  {:<24} {} workouts, last volume {:.0}",
                    exercise.name, exercise.count, exercise.last_volume
                );
            }
        }

        RoutineCommands::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read routine file: {}", file.display()))?;
            let routine = parse_generated_routine(&text)
                .map_err(LiftRsError::from)?
                .into_routine()
                .map_err(LiftRsError::from)?;

            db.save_routine(&routine)?;
            println!("{} {} ({})", "✓ Imported".green(), routine.name.bold(), routine.id);
        }
    }

    Ok(())
}

fn open_database(config: &AppConfig) -> Result<Database> {
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    Database::new(&path)
        .map_err(LiftRsError::from)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}
