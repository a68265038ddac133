mod handler;
mod model;

pub use handler::{POKE_KEY, poke};
pub use model::{PokeRequest, PokeResponse};
