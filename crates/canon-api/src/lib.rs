// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod error_mapping;
mod errors;
pub mod params;
mod responses;

pub use errors::{ApiError, ApiErrorCode, UNKNOWN_REQUEST_ID};
pub use params::{
    parse_config_files_params, parse_module_context_params, parse_onboarding_params,
    parse_planning_context_params, parse_slice_criteria, parse_validation_context_params,
    ParseFilter, QueryParams,
};
pub use responses::{ApiResponseEnvelope, VersionBody};

pub const CRATE_NAME: &str = "canon-api";
pub const API_BASE_PATH: &str = "/api/v1/templates";
