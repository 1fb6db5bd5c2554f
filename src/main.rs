use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use pms_core::{config::patient_data_file_from_env_value, CoreConfig, PatientService};

/// Main entry point for the PMS application
///
/// Serves the REST API on port 3000 (configurable via PMS_REST_ADDR) over the JSON patient
/// store named by PATIENT_DATA_FILE.
///
/// # Environment Variables
/// - `PMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_FILE`: JSON patient store (default: "patients.json")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the patient data file does not exist,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pms_run=info".parse()?)
                .add_directive("pms_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let patient_data_file =
        patient_data_file_from_env_value(std::env::var("PATIENT_DATA_FILE").ok());
    if !patient_data_file.is_file() {
        anyhow::bail!(
            "Patient data file does not exist: {} (create it with `pms init`)",
            patient_data_file.display()
        );
    }
    let cfg = CoreConfig::new(patient_data_file)?;

    tracing::info!("++ Starting PMS REST on {}", rest_addr);
    tracing::info!("++ Patient store: {}", cfg.patient_data_file().display());

    let app = api_rest::router(AppState::new(PatientService::from_config(&cfg)));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- PMS REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
