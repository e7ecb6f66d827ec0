#[macro_use]
extern crate rocket;

mod api;
mod client;
mod dates;
mod env;
mod error;
mod handlers;
mod models;
mod store;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use std::sync::Arc;

use rocket::{Build, Rocket};
use tracing::{error, info};

use api::{api_dispatch, health};
use env::{Backend, SheetsConfig, load_environment};
use store::{MemoryTransport, RestTransport, RowStore, SheetsTransport};
use telemetry::{TelemetryFairing, init_tracing};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[launch]
async fn rocket() -> _ {
    init_tracing();

    if let Err(e) = load_environment() {
        error!("Failed to load environment files: {}", e);
    }

    let config = match SheetsConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            panic!("Invalid configuration: {}", e);
        }
    };

    let transport: Arc<dyn SheetsTransport> = match config.backend {
        Backend::Memory => {
            info!("Using in-memory spreadsheet backend");
            Arc::new(MemoryTransport::new())
        }
        Backend::Rest => Arc::new(RestTransport::new(
            SHEETS_BASE_URL,
            &config.spreadsheet_id,
            &config.api_token,
        )),
    };

    init_rocket(RowStore::new(transport)).await
}

pub async fn init_rocket(store: RowStore) -> Rocket<Build> {
    info!("Starting plan tracker");

    rocket::build()
        .manage(store)
        .mount("/api", routes![api_dispatch, health])
        .attach(TelemetryFairing)
}
