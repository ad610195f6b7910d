pub mod credentials;
pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_user;

pub use credentials::{CredentialDocument, StoreCoordinates};
pub use quiz::{NewOption, NewQuestion, NewQuiz, Question, QuestionWithOptions, Quiz, QuizOption, QuizPatch, QuizStatus};
pub use quiz_attempt::{AttemptCompletion, NewAnswer, NewAttempt, QuizAnswer, QuizAttempt};
pub use quiz_user::{NewQuizUser, QuizUser};
