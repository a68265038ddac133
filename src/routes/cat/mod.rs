mod handler;
mod model;

pub use handler::{CAT_KEY, click_cat};
pub use model::CatResponse;
