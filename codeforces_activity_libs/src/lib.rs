pub mod api;
pub mod credentials;

pub use api::client::{ApiError, CodeforcesApi, CodeforcesClient};
pub use api::model::{Contest, Problem, Submission};
pub use credentials::Credentials;
