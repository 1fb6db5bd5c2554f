use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pms_core::{
    config::patient_data_file_from_env_value, CoreConfig, JsonFileStore, PatientError,
    PatientFields, PatientService, SortField, SortOrder,
};

#[derive(Parser)]
#[command(name = "pms")]
#[command(about = "PMS patient management CLI")]
struct Cli {
    /// Patient store file (defaults to $PATIENT_DATA_FILE, then patients.json)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty patient store if none exists
    Init,
    /// Print every patient keyed by id
    View,
    /// Print one patient
    Get {
        /// Patient id
        id: String,
    },
    /// Print patients ordered by a measurement
    Sort {
        /// height, weight or bmi
        field: String,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: String,
    },
    /// Add a new patient
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        /// male or female
        #[arg(long)]
        gender: String,
        /// Height in metres
        #[arg(long, allow_negative_numbers = true)]
        height: f64,
        /// Weight in kilograms
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pms_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let patient_data_file = cli.file.unwrap_or_else(|| {
        patient_data_file_from_env_value(std::env::var("PATIENT_DATA_FILE").ok())
    });
    let cfg = CoreConfig::new(patient_data_file)?;
    let file_store = JsonFileStore::new(cfg.patient_data_file());
    let service = PatientService::new(Arc::new(file_store.clone()));

    match cli.command {
        Some(Commands::Init) => {
            if file_store.initialise()? {
                println!("Created {}", file_store.path().display());
            } else {
                println!("{} already exists", file_store.path().display());
            }
        }
        Some(Commands::View) => {
            let patients = service.view_all()?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                println!("{}", serde_json::to_string_pretty(&patients)?);
            }
        }
        Some(Commands::Get { id }) => {
            let patient = service.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&patient)?);
        }
        Some(Commands::Sort { field, order }) => {
            let field: SortField = field.parse()?;
            let order: SortOrder = order.parse()?;
            let patients = service.sorted(field, order)?;
            println!("{}", serde_json::to_string_pretty(&patients)?);
        }
        Some(Commands::Create {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        }) => {
            let fields = PatientFields {
                id: Some(id.clone().into()),
                name: Some(name.into()),
                city: Some(city.into()),
                age: Some(age.into()),
                gender: Some(gender.into()),
                height: Some(height.into()),
                weight: Some(weight.into()),
            };
            match service.create(fields) {
                Ok(view) => match (view.bmi, view.verdict) {
                    (Some(bmi), Some(verdict)) => {
                        println!("Created patient {} (bmi {}, {:?})", id, bmi, verdict)
                    }
                    _ => println!("Created patient {}", id),
                },
                Err(PatientError::Validation(violations)) => {
                    for violation in violations.iter() {
                        eprintln!("{}: {}", violation.field, violation.message);
                    }
                    anyhow::bail!("patient {} is invalid", id);
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => {
            println!("Use 'pms --help' for commands");
        }
    }

    Ok(())
}
