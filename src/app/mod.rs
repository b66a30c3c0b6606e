mod config;
mod error;
mod logging;
mod runtime;

pub mod services;

pub use error::AppError;

pub fn run() -> Result<(), AppError> {
    logging::init()?;
    dotenvy::dotenv().ok();

    let config = config::AppConfig::from_env()?;

    tracing::info!(
        db_path = %config.db_path,
        http_bind = %config.http_bind,
        cors_allow_origin = config.cors_allow_origin.as_deref().unwrap_or("*"),
        default_page_size = config.default_page_size,
        search_debounce_ms = config.search_debounce_ms,
        "application bootstrap initialized"
    );

    runtime::run(config)
}
