pub mod account_service;
pub mod dashboard_service;
pub mod generation_service;
pub mod html;
pub mod quiz_attempt_service;
pub mod quiz_service;
pub mod quiz_user_service;

pub use account_service::AccountService;
pub use dashboard_service::DashboardService;
pub use generation_service::{OpenRouterGenerator, QuizGenerator};
pub use quiz_attempt_service::QuizAttemptService;
pub use quiz_service::QuizService;
pub use quiz_user_service::QuizUserService;
