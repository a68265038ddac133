mod handler;
mod model;

pub use handler::info;
pub use model::{EndpointLimit, InfoResponse};
