pub mod formats;
mod responses;

pub use responses::*;
