//! tdb - Transistor datasheet tool
//!
//! Validates a device file and answers operating-point queries on it.
//!
//! # Usage
//!
//! ```bash
//! tdb check device.json
//! tdb points device.json --path diode
//! RUST_LOG=info tdb linearize device.json --path switch --t-j 125 --i-channel 20
//! tdb export device.json > plain.json
//! ```
//!
//! The input file is a JSON map with a `device`, a `switch` and a `diode`
//! record.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tdb_core::{analysis, error::Result, to_plain, ConductionPath, Device, HousingTypes, TdbError};

/// Transistor datasheet validation and linearization
#[derive(Parser, Debug)]
#[command(name = "tdb", author, version, about, long_about = None)]
struct Args {
    /// Housing-type reference list (one type per line); defaults to the bundled list
    #[arg(long, value_name = "PATH", global = true)]
    housing_types: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a device file and print a summary
    Check {
        /// Device file (JSON)
        #[arg(value_name = "DEVICE_FILE")]
        file: PathBuf,
    },

    /// List the measured operating points of a conduction path
    Points {
        /// Device file (JSON)
        #[arg(value_name = "DEVICE_FILE")]
        file: PathBuf,

        /// Conduction path
        #[arg(long, value_enum, default_value_t = PathArg::Switch)]
        path: PathArg,
    },

    /// Linearize a conduction path at one operating point
    Linearize {
        /// Device file (JSON)
        #[arg(value_name = "DEVICE_FILE")]
        file: PathBuf,

        /// Conduction path
        #[arg(long, value_enum, default_value_t = PathArg::Switch)]
        path: PathArg,

        /// Junction temperature in °C
        #[arg(long)]
        t_j: f64,

        /// Gate voltage in V; defaults to the family's typical value
        #[arg(long)]
        v_g: Option<f64>,

        /// Channel current in A
        #[arg(long)]
        i_channel: f64,
    },

    /// Print the device in plain form
    Export {
        /// Device file (JSON)
        #[arg(value_name = "DEVICE_FILE")]
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PathArg {
    Switch,
    Diode,
}

impl From<PathArg> for ConductionPath {
    fn from(arg: PathArg) -> Self {
        match arg {
            PathArg::Switch => ConductionPath::Switch,
            PathArg::Diode => ConductionPath::Diode,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load the vocabulary once for the whole run
    let housing_types = match &args.housing_types {
        Some(path) => HousingTypes::from_file(path)?,
        None => HousingTypes::bundled(),
    };

    match args.command {
        Command::Check { file } => {
            let device = load_device(&file, &housing_types)?;
            println!("{} ({}, {})", device.name, device.family, device.housing_type);
            println!(
                "  ratings: v_abs_max = {} V, i_abs_max = {} A, i_cont = {} A",
                device.v_abs_max, device.i_abs_max, device.i_cont
            );
            println!(
                "  switch: {} channel, {} e_on, {} e_off",
                device.switch.channel.len(),
                device.switch.e_on.len(),
                device.switch.e_off.len()
            );
            println!(
                "  diode: {} channel, {} e_rr",
                device.diode.channel.len(),
                device.diode.e_rr.len()
            );
        }
        Command::Points { file, path } => {
            let device = load_device(&file, &housing_types)?;
            let points = match ConductionPath::from(path) {
                ConductionPath::Switch => analysis::available_points(&device.switch.channel),
                ConductionPath::Diode => analysis::available_points(&device.diode.channel),
            };
            for point in points {
                println!("{point}");
            }
        }
        Command::Linearize {
            file,
            path,
            t_j,
            v_g,
            i_channel,
        } => {
            let device = load_device(&file, &housing_types)?;
            let path = ConductionPath::from(path);
            let defaults = device.gate_defaults();
            let v_g = v_g.unwrap_or(match path {
                ConductionPath::Switch => defaults.v_g_on,
                ConductionPath::Diode => defaults.v_g_diode,
            });
            let model = device.linearize(path, t_j, v_g, i_channel)?;
            println!("v0_channel = {} V", model.v0_channel);
            println!("r_channel = {} Ohm", model.r_channel);
        }
        Command::Export { file } => {
            let device = load_device(&file, &housing_types)?;
            println!("{}", serde_json::to_string_pretty(&to_plain(&device)?)?);
        }
    }

    Ok(())
}

/// Read a `{device, switch, diode}` file and build the device.
fn load_device(file: &Path, housing_types: &HousingTypes) -> Result<Device> {
    let content = std::fs::read_to_string(file).map_err(|e| TdbError::FileRead {
        path: file.display().to_string(),
        source: e,
    })?;
    let input: Value = serde_json::from_str(&content)?;
    Device::from_records(input.get("device"), input.get("switch"), input.get("diode"), housing_types)
}
