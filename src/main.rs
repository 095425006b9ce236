//! hmdf CLI - inspect, reproject and convert station time series.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use hmdf::{DEFAULT_DATE_FORMAT, Date, HmdfData, ReaderConfig, projection};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "hmdf")]
#[command(version)]
#[command(about = "Read hydrodynamic model station output (ADCIRC, IMEDS, netCDF)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML reader configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct ReadArgs {
    /// Station data file (.61/.62/.71/.72, .nc, .imeds)
    file: PathBuf,

    /// Cold start date of model output, e.g. "2019-02-05 00:00:00"
    #[arg(long, default_value = "1970-01-01 00:00:00")]
    coldstart: String,

    /// ADCIRC station location file
    #[arg(short, long)]
    stations: Option<PathBuf>,

    /// Sort records and drop duplicate dates
    #[arg(long)]
    sanitize: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print station summaries
    Show {
        #[command(flatten)]
        read: ReadArgs,

        /// Reproject stations to this EPSG code
        #[arg(long)]
        reproject: Option<u32>,

        /// Zero-based station index; repeat for several (default: all)
        #[arg(long = "station")]
        station: Vec<usize>,
    },

    /// Print one sample of one station
    Sample {
        #[command(flatten)]
        read: ReadArgs,

        /// Zero-based station index
        #[arg(long)]
        station: usize,

        /// Zero-based sample index
        #[arg(long)]
        index: usize,

        /// strftime format for the date
        #[arg(long)]
        format: Option<String>,
    },

    /// Transform a coordinate between EPSG codes
    Project {
        /// Source EPSG code
        #[arg(long)]
        from: u32,

        /// Target EPSG code
        #[arg(long)]
        to: u32,

        /// Easting or longitude
        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// Northing or latitude
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },

    /// Describe an EPSG code
    Epsg {
        code: u32,
    },

    /// Parse and reformat a date
    Date {
        text: String,

        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        input_format: String,

        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        output_format: String,
    },

    /// Convert a station file to IMEDS
    Convert {
        #[command(flatten)]
        read: ReadArgs,

        /// Output file (.imeds)
        output: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ReaderConfig> {
    match path {
        Some(p) => ReaderConfig::from_file(p)
            .with_context(|| format!("Failed to load config from {:?}", p)),
        None => Ok(ReaderConfig::default()),
    }
}

fn read_data(args: &ReadArgs, config: &ReaderConfig) -> Result<HmdfData> {
    let coldstart = Date::from_string(&args.coldstart, DEFAULT_DATE_FORMAT)
        .or_else(|_| Date::from_string(&args.coldstart, "%Y-%m-%d"))
        .with_context(|| format!("Invalid cold start date {:?}", args.coldstart))?;

    let mut data = HmdfData::new(&args.file, coldstart, args.stations.as_ref())
        .with_config(config.clone());
    data.read()
        .with_context(|| format!("Failed to read {:?}", args.file))?;

    if args.sanitize {
        data.sanitize();
        debug!("Sanitized {} stations", data.n_stations());
    }
    Ok(data)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    hmdf::logging::init(cli.verbose);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Show {
            read,
            reproject,
            station,
        } => {
            let mut data = read_data(&read, &config)?;
            if let Some(epsg) = reproject {
                data.reproject(epsg)
                    .with_context(|| format!("Failed to reproject to EPSG:{}", epsg))?;
            }

            let indices: Vec<usize> = if station.is_empty() {
                (0..data.n_stations()).collect()
            } else {
                station
            };
            for (n, i) in indices.into_iter().enumerate() {
                let Some(s) = data.station(i) else {
                    bail!("Station {} out of range ({} stations)", i, data.n_stations());
                };
                if n > 0 {
                    println!();
                }
                print!("{}", s.summary(&config.date_format));
            }
        }

        Commands::Sample {
            read,
            station,
            index,
            format,
        } => {
            let data = read_data(&read, &config)?;
            let s = data
                .station(station)
                .with_context(|| format!("Station {} out of range ({} stations)", station, data.n_stations()))?;
            let p = s
                .get(index)
                .with_context(|| format!("Sample {} out of range ({} samples)", index, s.len()))?;

            let format = format.as_deref().unwrap_or(&config.date_format);
            let values: Vec<String> = p
                .values()
                .iter()
                .enumerate()
                .map(|(k, v)| if p.is_null(k) { "null".to_string() } else { v.to_string() })
                .collect();
            println!("{} {}", p.date().to_string_fmt(format)?, values.join(" "));
        }

        Commands::Project { from, to, x, y } => {
            let (xo, yo) = projection::transform(from, to, x, y)?;
            println!("{:.6} {:.6}", xo, yo);
        }

        Commands::Epsg { code } => {
            let name = projection::epsg_description(code)?;
            println!("EPSG:{} {}", code, name);
        }

        Commands::Date {
            text,
            input_format,
            output_format,
        } => {
            let date = Date::from_string(&text, &input_format)?;
            println!("{}", date.to_string_fmt(&output_format)?);
        }

        Commands::Convert { read, output } => {
            let data = read_data(&read, &config)?;
            data.write(&output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            info!("Wrote {} stations to {:?}", data.n_stations(), output);
        }
    }

    Ok(())
}
