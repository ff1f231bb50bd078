pub mod api;
pub mod config;
pub mod error;
pub mod session_store;
pub mod store;

pub use api::ApiClient;
pub use error::{ClientError, ErrorKind, Locale};
pub use store::{PlannerBackend, ProjectStore, ScheduleStore};
