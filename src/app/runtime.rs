use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};

use crate::adapters::api::{ApiState, configure_routes};
use crate::adapters::fixtures;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::services::SqliteAdminService;

pub fn run(config: AppConfig) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(&config.db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(AppError::database_init)?;
    }

    let mut connection =
        crate::adapters::db::open_connection(&config.db_path).map_err(AppError::database_init)?;
    crate::adapters::db::run_migrations(&mut connection).map_err(AppError::database_init)?;

    if !fixtures::is_seeded(&connection).map_err(AppError::database_init)? {
        let set = fixtures::load_bundled().map_err(AppError::database_init)?;
        fixtures::seed(&connection, &set).map_err(AppError::database_init)?;
        tracing::info!(
            customers = set.customers.len(),
            submissions = set.submissions.len(),
            checkins = set.checkins.len(),
            trips = set.trips.len(),
            "empty database seeded from bundled fixtures"
        );
    }

    let shared_connection = Arc::new(Mutex::new(connection));
    let api_state = ApiState {
        admin: SqliteAdminService::new(Arc::clone(&shared_connection)),
        default_page_size: config.default_page_size,
    };

    tracing::info!(bind = %config.http_bind, "http server starting");

    let allow_origin = config.cors_allow_origin.clone();
    let server_result = actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let cors = match allow_origin.as_deref() {
                Some(origin) => Cors::default()
                    .allowed_origin(origin)
                    .allowed_methods(vec!["GET", "POST", "PUT"])
                    .allow_any_header()
                    .max_age(3600),
                None => Cors::permissive(),
            };
            App::new()
                .wrap(cors)
                .app_data(web::Data::new(api_state.clone()))
                .configure(configure_routes)
        })
        .bind(&config.http_bind)?
        .run()
        .await
    });

    server_result.map_err(AppError::runtime)
}
