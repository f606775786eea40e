pub mod health;
pub mod auth;
pub mod accounts;
pub mod receptions;
pub mod livraisons;
pub mod stock;
pub mod payments;
pub mod finance;
pub mod charges;
pub mod statements;
pub mod journal;
pub mod dashboard;
pub mod vehicles;
pub mod settings;
pub mod admin;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .service(dashboard::get_dashboard)
            .configure(auth::auth_routes)
            .configure(accounts::accounts_routes)
            .configure(receptions::receptions_routes)
            .configure(livraisons::livraisons_routes)
            .configure(stock::stock_routes)
            .configure(payments::payments_routes)
            .configure(finance::finance_routes)
            .configure(charges::charges_routes)
            .configure(statements::statements_routes)
            .configure(journal::journal_routes)
            .configure(vehicles::vehicles_routes)
            .configure(settings::settings_routes)
            .configure(admin::admin_routes),
    );
}
