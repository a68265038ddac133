use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EndpointLimit {
    pub hourly_count: u64,
    pub hourly_limit: i64,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service: String,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub cat_clicks: u64,
    pub limits: BTreeMap<&'static str, EndpointLimit>,
}
