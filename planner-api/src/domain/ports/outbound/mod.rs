mod password_hasher;
mod project_repository;
mod schedule_repository;
mod user_repository;

pub use password_hasher::*;
pub use project_repository::*;
pub use schedule_repository::*;
pub use user_repository::*;
