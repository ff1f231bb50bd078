mod error;
pub mod models;
pub mod ports;
pub mod services;
mod session_token;

pub use error::*;
pub use session_token::*;
