use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::extractors::TenantHeaders,
    models::dto::{
        request::{ExplainRequest, GenerateQuizRequest, QuizDraft, UpdateQuizRequest},
        response::{MessageResponse, QuizDetails},
    },
    services::QuizService,
};

#[get("/api/quizzes")]
pub async fn list_quizzes(state: web::Data<AppState>, tenant: TenantHeaders) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let quizzes = scope.quiz_service().list_quizzes().await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[post("/api/quizzes")]
pub async fn create_quiz(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    request: web::Json<QuizDraft>,
) -> Result<HttpResponse, AppError> {
    // Validation errors must surface before the vault is touched.
    let draft = QuizService::normalize_draft(request.into_inner());
    validator::Validate::validate(&draft)?;

    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let quiz = scope.quiz_service().create_quiz(draft).await?;
    Ok(HttpResponse::Created().json(quiz))
}

#[get("/api/quizzes/{id}")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let service = scope.quiz_service();
    let quiz = service.get_quiz(&id).await?;
    let questions = service.load_questions(&quiz.id).await?;
    Ok(HttpResponse::Ok().json(QuizDetails { quiz, questions }))
}

#[patch("/api/quizzes/{id}")]
pub async fn update_quiz(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
    request: web::Json<UpdateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let quiz = scope.quiz_service().update_quiz(&id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[delete("/api/quizzes/{id}")]
pub async fn delete_quiz(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    scope.quiz_service().delete_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Quiz deleted")))
}

#[post("/api/quizzes/{id}/stop")]
pub async fn stop_quiz(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let quiz = scope.quiz_service().stop_quiz(&id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[get("/api/quizzes/{id}/stats")]
pub async fn quiz_stats(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let stats = scope.quiz_service().quiz_stats(&id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Needs no backend call: the link is built from the coordinates alone.
#[get("/api/quizzes/{id}/link")]
pub async fn share_link(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let link = QuizService::share_link(&tenant.coordinates, &id, &state.config.public_base_url);
    Ok(HttpResponse::Ok().json(link))
}

#[post("/api/quizzes/generate")]
pub async fn generate_quiz(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    validator::Validate::validate(&*request)?;
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let api_key = scope
        .session
        .openrouter_key
        .as_ref()
        .ok_or_else(|| AppError::ValidationError("OpenRouter key not configured".to_string()))?;

    let draft = state.generator.generate(api_key, &request).await?;
    Ok(HttpResponse::Ok().json(json!({ "quiz": draft })))
}

#[post("/api/quizzes/explain")]
pub async fn explain_answer(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    request: web::Json<ExplainRequest>,
) -> Result<HttpResponse, AppError> {
    validator::Validate::validate(&*request)?;
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let api_key = scope
        .session
        .openrouter_key
        .as_ref()
        .ok_or_else(|| AppError::ValidationError("OpenRouter key not configured".to_string()))?;

    let html = state
        .generator
        .explain(api_key, &request.question, &request.correct_answer)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "html": html })))
}
