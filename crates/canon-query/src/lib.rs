// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod context;
mod cursor;
mod fetch;
mod filters;
mod hierarchy;
mod limits;
mod query_error;
mod row_decode;
mod slice;

pub use context::{
    config_files, module_context, onboarding, planning_context, validation_context,
    ArchUnitTestLeaf, ArchitectureSummary, ChecklistLeaf, ClassTemplateLeaf, CodingRuleNode,
    ConfigFileLeaf, ConfigFiles, ConfigFilesRequest, ConventionNode, ExampleLeaf,
    ExecutionContext, LayerCounts, LayerSummary, ModuleContext, ModuleContextRequest,
    ModuleContextSummary, ModuleSummary, Onboarding, OnboardingLeaf, OnboardingRequest,
    PackageLeaf, PackageStructureNode, PlanningContext,
    PlanningContextRequest, PlanningLayerNode, PlanningModuleNode, PlanningSummary, PurposeLeaf,
    RuleContext, TechStackSummary, ValidationChecklistItem, ValidationContext,
    ValidationContextRequest, ValidationSummary, ValidationZeroToleranceRule, ZeroToleranceLeaf,
};
pub use cursor::{CursorCodec, CursorPosition, InvalidCursorError, MAX_CURSOR_TOKEN_LEN};
pub use fetch::{build_slice_sql, escape_like, fetch_slice, lifecycle_predicate, SliceFilter};
pub use filters::{
    ArchUnitTestFilter, ArchitectureFilter, ChecklistItemFilter, ClassTemplateFilter,
    ClassTypeCategoryFilter, ClassTypeFilter, ClassTypeSearchField, CodingRuleFilter,
    ConfigFileTemplateFilter, ConventionFilter, FeedbackQueueFilter, LayerDependencyRuleFilter,
    LayerFilter, Listed, ModuleFilter, OnboardingContextFilter, PackagePurposeFilter,
    PackageStructureFilter, ResourceTemplateFilter, RuleExampleFilter, RuleSearchField,
    TechStackFilter, ZeroToleranceRuleFilter,
};
pub use hierarchy::{assemble, GroupIndex, Shell};
pub use limits::{QueryLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use query_error::{QueryError, QueryErrorCode};
pub use slice::{paginate, Slice, SliceCriteria};

pub const CRATE_NAME: &str = "canon-query";
