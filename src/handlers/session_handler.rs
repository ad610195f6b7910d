use actix_web::{delete, get, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::{
        domain::StoreCoordinates,
        dto::response::{MessageResponse, SessionView},
    },
};

#[get("/api/session")]
pub async fn get_session(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let coordinates = state.session.coordinates().await;
    let status = state.session.status().await;
    Ok(HttpResponse::Ok().json(SessionView::new(coordinates, &status)))
}

/// Remembers the pair and resolves it right away. A slower resolution for an
/// earlier pair cannot overwrite the answer for this one.
#[put("/api/session")]
pub async fn set_session(
    state: web::Data<AppState>,
    request: web::Json<StoreCoordinates>,
) -> Result<HttpResponse, AppError> {
    let coords = StoreCoordinates::new(&request.store_id, &request.bucket)?;
    state.session.set_coordinates(coords).await?;
    let status = state.session.resolve().await;
    let coordinates = state.session.coordinates().await;
    Ok(HttpResponse::Ok().json(SessionView::new(coordinates, &status)))
}

#[delete("/api/session")]
pub async fn clear_session(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.session.teardown().await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Session cleared")))
}
