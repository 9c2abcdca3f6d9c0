mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use skywx_core::model::ReportType;
use skywx_core::station::StationFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skywx",
    version,
    about = "Decoder for aviation weather reports (METAR/TAF)"
)]
struct Cli {
    /// Station dataset (JSON); the bundled airport list when omitted
    #[arg(long, global = true, value_name = "FILE")]
    stations: Option<PathBuf>,

    /// Log decoding decisions to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one or more reports
    Parse {
        /// Report text; each argument is one report
        reports: Vec<String>,

        /// Read reports from a file, one per line
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Report type (metar or taf); detected when omitted
        #[arg(short = 't', long = "type", value_parser = parse_report_type)]
        report_type: Option<ReportType>,

        /// Reference date (YYYY-MM-DD) for resolving report times
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Fail if the station is not in the dataset
        #[arg(long)]
        require_station: bool,

        /// Report ambiguous units as unknown instead of assuming ICAO defaults
        #[arg(long)]
        strict_units: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Look up a station by ICAO or IATA code
    Station {
        code: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Find the stations closest to a coordinate
    Nearest {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,

        #[arg(allow_hyphen_values = true)]
        longitude: f64,

        /// Number of stations to list
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,

        /// Only stations issuing this report type (metar or taf)
        #[arg(long, value_parser = parse_filter)]
        issuing: Option<StationFilter>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Search stations by name, city or misspelled code
    Search {
        query: String,

        /// Number of matches to list
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn parse_report_type(s: &str) -> Result<ReportType, String> {
    ReportType::from_str_loose(s).ok_or_else(|| format!("unknown report type '{s}' (use metar or taf)"))
}

fn parse_filter(s: &str) -> Result<StationFilter, String> {
    match parse_report_type(s)? {
        ReportType::Observation => Ok(StationFilter::Observations),
        ReportType::Forecast => Ok(StationFilter::Forecasts),
    }
}

/// Install a stderr subscriber; `RUST_LOG` wins over `-v`.
fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skywx={level},skywx_core={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            reports,
            file,
            report_type,
            date,
            require_station,
            strict_units,
            output,
        } => commands::parse::run(commands::parse::ParseArgs {
            reports,
            file,
            report_type,
            date,
            require_station,
            strict_units,
            stations: cli.stations,
            output,
        }),
        Commands::Station { code, output } => {
            commands::station::lookup(cli.stations, &code, &output)
        }
        Commands::Nearest {
            latitude,
            longitude,
            limit,
            issuing,
            output,
        } => commands::station::nearest(
            cli.stations,
            latitude,
            longitude,
            limit,
            issuing.unwrap_or_default(),
            &output,
        ),
        Commands::Search {
            query,
            limit,
            output,
        } => commands::station::search(cli.stations, &query, limit, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
