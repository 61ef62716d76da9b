use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use dotenvy::dotenv;

use ticketd::application::admission::AdmissionService;
use ticketd::application::fulfillment::{FulfillmentService, NotifySettings};
use ticketd::config::Config;
use ticketd::infrastructure::order_repo::DieselOrderRepository;
use ticketd::infrastructure::paystack::PaystackClient;
use ticketd::infrastructure::resend::ResendMailer;
use ticketd::infrastructure::ticket_repo::DieselTicketRepository;
use ticketd::pricing::PriceTable;
use ticketd::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = create_pool(&config.database_url);
    run_migrations(&pool);

    let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
    let tickets = Arc::new(DieselTicketRepository::new(pool.clone()));
    let gateway = Arc::new(PaystackClient::new(config.paystack_secret_key.clone()));
    let mailer = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        config.mail_from.clone(),
    ));

    let fulfillment = web::Data::new(FulfillmentService::new(
        orders,
        tickets.clone(),
        gateway,
        mailer,
        PriceTable::default(),
        config.event.clone(),
        NotifySettings {
            admin_email: config.admin_email.clone(),
            frontend_url: config.frontend_url.clone(),
            pacing: Duration::from_millis(600),
        },
    ));
    let admission = web::Data::new(AdmissionService::new(tickets));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(fulfillment, admission, &config.host, config.port)?.await
}
