// SPDX-License-Identifier: Apache-2.0

use crate::http::{handlers, mcp, templates::list_handler};
use crate::middleware::body_limit::body_limit_middleware;
use crate::middleware::request_tracing::request_tracing_middleware;
use crate::ApiConfig;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use canon_model::{
    ArchUnitTest, Architecture, ChecklistItem, ClassTemplate, ClassType, ClassTypeCategory,
    CodingRule, ConfigFileTemplate, Convention, FeedbackQueue, Layer, LayerDependencyRule, Module,
    OnboardingContext, PackagePurpose, PackageStructure, ResourceTemplate, RuleExample, TechStack,
    ZeroToleranceRule,
};
use canon_query::QueryLimits;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Set once the database has been opened and its schema version checked.
    pub ready: Arc<AtomicBool>,
    pub request_id_seed: Arc<AtomicU64>,
    pub api: ApiConfig,
    pub limits: QueryLimits,
}

impl AppState {
    #[must_use]
    pub fn new(api: ApiConfig) -> Self {
        Self::with_config(api, QueryLimits::default())
    }

    #[must_use]
    pub fn with_config(api: ApiConfig, limits: QueryLimits) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            api,
            limits,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let templates = Router::new()
        .route("/tech-stacks", get(list_handler::<TechStack>))
        .route("/architectures", get(list_handler::<Architecture>))
        .route("/layers", get(list_handler::<Layer>))
        .route("/modules", get(list_handler::<Module>))
        .route("/conventions", get(list_handler::<Convention>))
        .route("/coding-rules", get(list_handler::<CodingRule>))
        .route("/rule-examples", get(list_handler::<RuleExample>))
        .route(
            "/zero-tolerance-rules",
            get(list_handler::<ZeroToleranceRule>),
        )
        .route("/checklist-items", get(list_handler::<ChecklistItem>))
        .route(
            "/package-structures",
            get(list_handler::<PackageStructure>),
        )
        .route("/package-purposes", get(list_handler::<PackagePurpose>))
        .route(
            "/class-type-categories",
            get(list_handler::<ClassTypeCategory>),
        )
        .route("/class-types", get(list_handler::<ClassType>))
        .route("/class-templates", get(list_handler::<ClassTemplate>))
        .route("/arch-unit-tests", get(list_handler::<ArchUnitTest>))
        .route(
            "/layer-dependency-rules",
            get(list_handler::<LayerDependencyRule>),
        )
        .route("/resource-templates", get(list_handler::<ResourceTemplate>))
        .route(
            "/config-file-templates",
            get(list_handler::<ConfigFileTemplate>),
        )
        .route(
            "/onboarding-contexts",
            get(list_handler::<OnboardingContext>),
        )
        .route("/feedback-queue", get(list_handler::<FeedbackQueue>))
        .route(
            "/mcp/module/:moduleId/context",
            get(mcp::module_context_handler),
        )
        .route(
            "/mcp/planning-context",
            get(mcp::planning_context_handler),
        )
        .route(
            "/mcp/validation-context",
            get(mcp::validation_context_handler),
        )
        .route("/mcp/config-files", get(mcp::config_files_handler))
        .route("/mcp/onboarding", get(mcp::onboarding_handler));

    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/readyz", get(handlers::readyz_handler))
        .route("/api/v1/version", get(handlers::version_handler))
        .nest(canon_api::API_BASE_PATH, templates)
        .layer(from_fn_with_state(state.clone(), body_limit_middleware))
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
