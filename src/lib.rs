pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod pricing;
pub mod schema;
pub mod ticketing;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::admission::AdmissionService;
use application::fulfillment::FulfillmentService;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The webhook route must see the raw request body, so it takes `web::Bytes`
/// directly rather than going through the JSON extractor.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    fulfillment: web::Data<FulfillmentService>,
    admission: web::Data<AdmissionService>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(fulfillment.clone())
            .app_data(admission.clone())
            .wrap(Logger::default())
            .route("/", web::get().to(handlers::health))
            .service(
                web::scope("/api/payments")
                    .route(
                        "/initiate-transaction",
                        web::post().to(handlers::payments::initiate_transaction),
                    )
                    .route(
                        "/verify-payment",
                        web::post().to(handlers::payments::verify_payment),
                    )
                    .route("/webhook", web::post().to(handlers::payments::webhook)),
            )
            .service(
                web::scope("/api/tickets")
                    .route("/verify", web::post().to(handlers::tickets::verify_ticket)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
