use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CatResponse {
    pub status: &'static str,
    pub count: u64,
    pub hourly_count: u64,
    pub hourly_limit: i64,
}
