use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::{AppState, TenantScope},
    codec::ShareLink,
    errors::{AppError, AppResult},
    models::{
        domain::StoreCoordinates,
        dto::request::{ParticipantLogin, SubmitAttemptRequest},
    },
    vault::EncryptionMode,
};

/// Path segments exactly as they appear in a share link.
#[derive(Debug, serde::Deserialize)]
struct TakePath {
    store: String,
    bucket: String,
    quiz_id: String,
}

/// Participants never hold a vault password, so shared quizzes only work for
/// tenants stored under the fixed secret.
async fn resolve(state: &AppState, path: &TakePath) -> AppResult<(TenantScope, String)> {
    let link = ShareLink::from_segments(&path.store, &path.bucket, &path.quiz_id);
    let coords = StoreCoordinates::new(&link.store_id, &link.bucket)?;
    let scope = state.tenant(&coords, EncryptionMode::FixedSecret).await?;
    Ok((scope, link.quiz_id))
}

#[get("/api/take/{store}/{bucket}/{quiz_id}")]
pub async fn get_public_quiz(state: web::Data<AppState>, path: web::Path<TakePath>) -> Result<HttpResponse, AppError> {
    let (scope, quiz_id) = resolve(&state, &path).await?;
    let quiz = scope.attempt_service().public_quiz(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/api/take/{store}/{bucket}/{quiz_id}/login")]
pub async fn participant_login(
    state: web::Data<AppState>,
    path: web::Path<TakePath>,
    credentials: web::Json<ParticipantLogin>,
) -> Result<HttpResponse, AppError> {
    let (scope, _) = resolve(&state, &path).await?;
    let session = scope.attempt_service().login(&credentials).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/api/take/{store}/{bucket}/{quiz_id}/attempts")]
pub async fn start_attempt(
    state: web::Data<AppState>,
    path: web::Path<TakePath>,
    credentials: web::Json<ParticipantLogin>,
) -> Result<HttpResponse, AppError> {
    let (scope, quiz_id) = resolve(&state, &path).await?;
    let attempt = scope
        .attempt_service()
        .start_attempt(&quiz_id, &credentials)
        .await?;
    Ok(HttpResponse::Created().json(attempt))
}

#[post("/api/take/{store}/{bucket}/{quiz_id}/attempts/{attempt_id}/submit")]
pub async fn submit_attempt(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String, String)>,
    request: web::Json<SubmitAttemptRequest>,
) -> Result<HttpResponse, AppError> {
    let (store, bucket, quiz_id, attempt_id) = path.into_inner();
    let take = TakePath {
        store,
        bucket,
        quiz_id,
    };
    let (scope, quiz_id) = resolve(&state, &take).await?;
    let result = scope
        .attempt_service()
        .submit_attempt(&quiz_id, &attempt_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
