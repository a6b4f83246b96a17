use actix_web::web::Data;
use actix_web::{App, HttpServer, middleware::Logger};
use dotenvy::dotenv;
use log::info;
use sqlx::sqlite::SqlitePoolOptions;
use std::io;

use bugtrack::config::{self, Settings};
use bugtrack::handlers;
use bugtrack::middleware::Cors;
use bugtrack::store::{self, BugStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    env_logger::init();

    let settings = Settings::from_env().map_err(io::Error::other)?;
    config::set_run_mode(settings.run_mode);

    let db_pool = SqlitePoolOptions::new()
        .connect(&settings.database_url)
        .await
        .map_err(io::Error::other)?;

    // Ensure table exists
    store::init_schema(&db_pool)
        .await
        .map_err(io::Error::other)?;

    let bug_store = BugStore::new(db_pool);
    let cors = Cors::new(&settings.client_url).map_err(io::Error::other)?;

    info!(
        "listening on {}:{} ({:?} mode)",
        settings.host, settings.port, settings.run_mode
    );

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(bug_store.clone()))
            .wrap(cors.clone())
            .wrap(Logger::default())
            .configure(handlers::config)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
