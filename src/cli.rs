use crate::config::Config;
use crate::error::{InspectError, Result};
use crate::export::ReportFormat;
use crate::vehicle::{StorageLayout, VehicleId, VehicleLocation};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vehicle-inspect")]
#[command(about = "Vehicle inspection workbook reader/writer and deficiency report tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Which vehicle to work on: a workbook path, or the folder triple under
/// the configured storage root.
#[derive(Args, Debug, Clone)]
pub struct VehicleArgs {
    /// Workbook file
    #[arg(long, conflicts_with_all = ["manufacturer", "date", "vehicle"])]
    pub workbook: Option<PathBuf>,

    /// Manufacturer folder
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Date folder
    #[arg(long)]
    pub date: Option<String>,

    /// Vehicle folder
    #[arg(long)]
    pub vehicle: Option<String>,
}

impl VehicleArgs {
    pub fn locate(&self, config: &Config) -> Result<VehicleLocation> {
        if let Some(path) = &self.workbook {
            return Ok(VehicleLocation::from_workbook(path));
        }
        match (&self.manufacturer, &self.date, &self.vehicle) {
            (Some(manufacturer), Some(date), Some(vehicle)) => {
                let layout = StorageLayout::new(config.storage_root()?);
                let id = VehicleId::new(manufacturer.as_str(), date.as_str(), vehicle.as_str());
                Ok(VehicleLocation::from_layout(&layout, &id))
            }
            _ => Err(InspectError::InvalidInput(
                "give --workbook, or all of --manufacturer, --date and --vehicle".into(),
            )),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the workbook, folder and photo paths of a vehicle
    Locate {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Detect the vehicle category
    Category {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Print reference sheet fields as JSON
    Reference {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Category to read with (default: detected)
        #[arg(long)]
        category: Option<String>,
    },

    /// Print examiner sheet fields as JSON
    Examiner {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Write examiner fields (partial update)
    Write {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// JSON object of field name -> value
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Single field, repeatable (name=value)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },

    /// Print examiner notes as JSON
    Notes {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Write examiner notes from a JSON array
    WriteNotes {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// JSON array of notes
        #[arg(short, long, required = true)]
        input: PathBuf,
    },

    /// List vehicle classification options
    Classifications {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Store the chosen vehicle classification
    Classify {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Classification value
        #[arg(required = true)]
        value: String,
    },

    /// Print summary rows, metadata and notes as JSON
    Deficiencies {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Build the deficiency report
    Report {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Output format (text/pdf/png/all)
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Render only, do not write files
        #[arg(long)]
        no_save: bool,
    },

    /// Show or edit the configuration
    Config {
        /// Storage root directory
        #[arg(long)]
        set_root: Option<PathBuf>,

        /// Regular TTF font
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// Bold TTF font
        #[arg(long)]
        set_bold_font: Option<PathBuf>,

        /// Default category code
        #[arg(long)]
        set_category: Option<String>,

        /// Show the configuration
        #[arg(long)]
        show: bool,
    },
}

/// `name=value`, value may be empty or contain `=`.
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("color=red").unwrap(), ("color".into(), "red".into()));
        assert_eq!(parse_key_value("note=a=b").unwrap(), ("note".into(), "a=b".into()));
        assert!(parse_key_value("color").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_report_args() {
        let cli = Cli::try_parse_from([
            "vehicle-inspect",
            "report",
            "--workbook",
            "/tmp/v.xlsx",
            "--format",
            "pdf",
            "--no-save",
        ])
        .unwrap();
        match cli.command {
            Commands::Report { vehicle, format, no_save } => {
                assert_eq!(vehicle.workbook, Some(PathBuf::from("/tmp/v.xlsx")));
                assert_eq!(format, ReportFormat::Pdf);
                assert!(no_save);
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_workbook_conflicts_with_folders() {
        let result = Cli::try_parse_from([
            "vehicle-inspect",
            "examiner",
            "--workbook",
            "a.xlsx",
            "--vehicle",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_locate_from_folders() {
        let args = VehicleArgs {
            workbook: None,
            manufacturer: Some("Volvo".into()),
            date: Some("2024-05-01".into()),
            vehicle: Some("12-345-67".into()),
        };
        let config = Config {
            storage_root: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        if std::env::var_os(crate::config::ROOT_ENV).is_some() {
            return;
        }
        let location = args.locate(&config).unwrap();
        assert_eq!(location.photos, PathBuf::from("/data/Volvo/2024-05-01/12-345-67/תמונות"));
        assert_eq!(location.workbook, PathBuf::from("/data/Volvo/2024-05-01/12-345-67/12-345-67.xlsx"));
    }

    #[test]
    fn test_locate_needs_all_folders() {
        let args = VehicleArgs {
            workbook: None,
            manufacturer: Some("Volvo".into()),
            date: None,
            vehicle: Some("x".into()),
        };
        assert!(matches!(
            args.locate(&Config::default()),
            Err(InspectError::InvalidInput(_))
        ));
    }
}
