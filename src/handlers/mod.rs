pub mod account_handler;
pub mod dashboard_handler;
pub mod extractors;
pub mod participant_handler;
pub mod quiz_handler;
pub mod session_handler;
pub mod take_handler;

use actix_web::web;

pub use dashboard_handler::health_check;
pub use extractors::TenantHeaders;

/// Registers every route. Static quiz paths go before `{id}` ones.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard_handler::health_check)
        .service(dashboard_handler::dashboard)
        .service(session_handler::get_session)
        .service(session_handler::set_session)
        .service(session_handler::clear_session)
        .service(account_handler::fetch_vault)
        .service(account_handler::store_vault)
        .service(account_handler::signup)
        .service(account_handler::login)
        .service(account_handler::get_settings)
        .service(account_handler::save_settings)
        .service(quiz_handler::generate_quiz)
        .service(quiz_handler::explain_answer)
        .service(quiz_handler::list_quizzes)
        .service(quiz_handler::create_quiz)
        .service(quiz_handler::get_quiz)
        .service(quiz_handler::update_quiz)
        .service(quiz_handler::delete_quiz)
        .service(quiz_handler::stop_quiz)
        .service(quiz_handler::quiz_stats)
        .service(quiz_handler::share_link)
        .service(participant_handler::list_participants)
        .service(participant_handler::create_participant)
        .service(participant_handler::participant_details)
        .service(take_handler::get_public_quiz)
        .service(take_handler::participant_login)
        .service(take_handler::start_attempt)
        .service(take_handler::submit_attempt);
}
