use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;

use log::{info, initialize_logger};
use uploader::config::{self, get_variable, parse_variable, Config};
use uploader::environment::Environment;
use uploader::google::GoogleAuth;
use uploader::routes;
use uploader::store::DriveStore;
use uploader::table::SheetsTable;
use uploader::urls::ViewerLinks;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = parse_variable(config::PORT)?;
    let admin_port: u16 = parse_variable(config::ADMIN_PORT)?;
    let config = Config::from_env()?;

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port, "append_policy" => ?config.append_policy);
    let logger = Arc::new(logger);

    let auth = Arc::new(GoogleAuth::new(
        get_variable(config::CLIENT_ID)?,
        get_variable(config::CLIENT_SECRET)?,
        get_variable(config::REFRESH_TOKEN)?,
    )?);
    let client = reqwest::Client::new();

    let store = Arc::new(DriveStore::new(client.clone(), auth.clone()));
    let table = Arc::new(SheetsTable::new(client, auth)?);

    let environment = Environment::new(
        logger.clone(),
        store,
        table,
        Arc::new(ViewerLinks::default()),
        Arc::new(config),
    );

    let should_terminate = tokio::signal::ctrl_c().map(|_| ()).shared();

    let main_server = {
        let should_terminate = should_terminate.clone();

        let (_, server) = warp::serve(routes::make_routes(environment))
            .bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), should_terminate);

        server
    };

    let admin_server = {
        let (_, server) = warp::serve(routes::admin::make_healthz_route())
            .bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), should_terminate);

        server
    };

    tokio::join!(main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
