// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod config;
mod http;
mod middleware;
mod runtime;

pub use config::{validate_startup_config_contract, ApiConfig};
pub use runtime::server_runtime_app::{build_router, AppState};
pub use runtime::store_access::check_store;

pub const CRATE_NAME: &str = "canon-server";
