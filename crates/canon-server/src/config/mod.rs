// SPDX-License-Identifier: Apache-2.0

use canon_query::{QueryLimits, MAX_PAGE_SIZE};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub log_json: bool,
    pub max_body_bytes: usize,
    /// Upper bound for one request's store work, open included.
    pub request_timeout: Duration,
    pub sqlite_busy_timeout: Duration,
    pub slow_query_threshold: Duration,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub shutdown_drain: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: PathBuf::from("canon.sqlite"),
            log_json: true,
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(5),
            sqlite_busy_timeout: Duration::from_millis(800),
            slow_query_threshold: Duration::from_millis(200),
            default_page_size: 20,
            max_page_size: MAX_PAGE_SIZE,
            shutdown_drain: Duration::from_millis(2000),
        }
    }
}

impl ApiConfig {
    pub fn query_limits(&self) -> Result<QueryLimits, String> {
        QueryLimits::new(self.default_page_size, self.max_page_size)
    }
}

pub fn validate_startup_config_contract(api: &ApiConfig) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("max_body_bytes must be > 0".to_string());
    }
    if api.request_timeout.is_zero() {
        return Err("request_timeout must be > 0".to_string());
    }
    if api.sqlite_busy_timeout.is_zero() {
        return Err("sqlite_busy_timeout must be > 0".to_string());
    }
    if api.slow_query_threshold.is_zero() {
        return Err("slow_query_threshold must be > 0".to_string());
    }
    if api.default_page_size == 0 || api.max_page_size == 0 {
        return Err("page sizes must be > 0".to_string());
    }
    if api.max_page_size > MAX_PAGE_SIZE {
        return Err(format!("max_page_size must be <= {MAX_PAGE_SIZE}"));
    }
    if api.default_page_size > api.max_page_size {
        return Err("default_page_size must be <= max_page_size".to_string());
    }
    if api.bind_addr.trim().is_empty() {
        return Err("bind address must not be empty".to_string());
    }
    Ok(())
}
