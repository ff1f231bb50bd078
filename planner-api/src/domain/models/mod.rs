mod ids;
mod project;
mod schedule;
mod user;

pub use ids::*;
pub use project::*;
pub use schedule::*;
pub use user::*;
