//! CLI for radcount — simulate, fit and run lab radiation counts.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "radcount")]
#[command(about = "radcount — radioactivity counting exercise: simulated and lab counters")]
#[command(version = radcount_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Detector model shared by the simulator-backed commands.
#[derive(clap::Args)]
struct DetectorArgs {
    /// Calibration source activity in Bq (clamped to 0-30). Omit for no source.
    #[arg(long)]
    activity: Option<f64>,

    /// Fraction of decays the detector registers (0-1)
    #[arg(long, default_value = "1.0")]
    efficiency: f64,

    /// Background count rate in Hz
    #[arg(long, default_value = "0.0")]
    background: f64,

    /// Counting time in seconds
    #[arg(long, default_value = "10.0")]
    counting_time: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw simulated counting runs and summarize them
    Simulate {
        #[command(flatten)]
        detector: DetectorArgs,

        /// Number of independent counting runs
        #[arg(long, default_value = "2")]
        reps: usize,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Probability of observing given counts under the simulated detector
    Likelihood {
        #[command(flatten)]
        detector: DetectorArgs,

        /// Observed counts (comma-separated for a series of runs)
        #[arg(long, value_delimiter = ',', required = true)]
        count: Vec<u64>,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run one measurement on the lab radiation counter
    Measure {
        /// Student ID (0 = anonymous)
        #[arg(long, default_value = "0")]
        student_id: u64,

        /// Counting time in seconds (0-30)
        #[arg(long, default_value = "10.0")]
        counting_time: f64,

        /// Insert a calibration source with this activity in Bq
        #[arg(long, conflicts_with = "lab_source")]
        activity: Option<f64>,

        /// Insert the lab source
        #[arg(long)]
        lab_source: bool,

        /// Base URL of the counting service
        #[arg(long, default_value = radcount_core::DEFAULT_BASE_URL)]
        url: String,

        /// Seconds to wait beyond the counting time before giving up
        #[arg(long, default_value = "15")]
        timeout_margin: u64,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a local counting service compatible with the lab protocol
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8042")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Detector efficiency (0-1)
        #[arg(long, default_value = "1.0")]
        efficiency: f64,

        /// Background count rate in Hz
        #[arg(long, default_value = "0.0")]
        background: f64,

        /// Activity of the built-in lab source in Bq
        #[arg(long, default_value = "20.0")]
        lab_activity: f64,

        /// Hold each response for the requested counting time
        #[arg(long)]
        realtime: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            detector,
            reps,
            json,
        } => commands::simulate::run(&commands::DetectorSettings::from(detector), reps, json),
        Commands::Likelihood {
            detector,
            count,
            json,
        } => commands::likelihood::run(&commands::DetectorSettings::from(detector), &count, json),
        Commands::Measure {
            student_id,
            counting_time,
            activity,
            lab_source,
            url,
            timeout_margin,
            json,
        } => commands::measure::run(commands::measure::MeasureCommandConfig {
            student_id,
            counting_time,
            activity,
            lab_source,
            url: &url,
            timeout_margin: std::time::Duration::from_secs(timeout_margin),
            json,
        }),
        Commands::Server {
            port,
            host,
            efficiency,
            background,
            lab_activity,
            realtime,
        } => commands::server::run(
            &host,
            port,
            radcount_server::ServerConfig {
                efficiency,
                background,
                lab_source_activity: lab_activity,
                realtime,
            },
        ),
    }
}

impl From<DetectorArgs> for commands::DetectorSettings {
    fn from(args: DetectorArgs) -> Self {
        Self {
            activity: args.activity,
            efficiency: args.efficiency,
            background: args.background,
            counting_time: args.counting_time,
        }
    }
}
