pub(crate) mod auth;
pub(crate) mod error;
pub(crate) mod extract;
pub(crate) mod projects;
pub(crate) mod schedules;

pub(crate) use error::ApiError;
