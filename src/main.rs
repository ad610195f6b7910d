use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use fantoms_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware, session::SessionStatus,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    let bind = (config.web_server_host.clone(), config.web_server_port);
    let state = AppState::new(config);

    match state.session.initialize(None).await {
        Ok(Some(coords)) => {
            if let SessionStatus::Error(message) = state.session.resolve().await {
                log::warn!("Remembered session for bucket '{}' did not resolve: {}", coords.bucket, message);
            }
        }
        Ok(None) => log::info!("No remembered session"),
        Err(e) => log::warn!("Could not read session file: {}", e),
    }

    log::info!("Starting HTTP server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .wrap(Cors::permissive())
            .configure(handlers::configure)
    })
    .bind(bind)?
    .run()
    .await
}
