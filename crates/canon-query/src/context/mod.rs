// SPDX-License-Identifier: Apache-2.0

//! MCP context builders.
//!
//! Each builder issues a small fixed set of join queries, folds every row set on its own
//! with [`crate::hierarchy`], and merges the trees into one response value. A missing root
//! aborts with `NotFound`; missing children are empty collections. The config-file and
//! onboarding lookups are flat lists with no root check.

mod config_files;
mod module;
mod onboarding;
mod planning;
mod validation;

pub use config_files::{config_files, ConfigFileLeaf, ConfigFiles, ConfigFilesRequest};
pub use module::{
    module_context, ArchUnitTestLeaf, ChecklistLeaf, ClassTemplateLeaf, CodingRuleNode,
    ConventionNode, ExampleLeaf, ExecutionContext, LayerSummary, ModuleContext,
    ModuleContextRequest, ModuleContextSummary, ModuleSummary, PackageStructureNode,
    PurposeLeaf, RuleContext, ZeroToleranceLeaf,
};
pub use onboarding::{onboarding, Onboarding, OnboardingLeaf, OnboardingRequest};
pub use planning::{
    planning_context, ArchitectureSummary, PackageLeaf, PlanningContext, PlanningContextRequest,
    PlanningLayerNode, PlanningModuleNode, PlanningSummary, TechStackSummary,
};
pub use validation::{
    validation_context, LayerCounts, ValidationChecklistItem, ValidationContext,
    ValidationContextRequest, ValidationSummary, ValidationZeroToleranceRule,
};

use crate::fetch::placeholders;
use rusqlite::types::Value;

/// Matches rules whose `applies_to` list is empty or contains any of `codes` as a whole token.
pub(crate) fn push_applies_to_any(
    column: &str,
    codes: &[String],
    where_parts: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    if codes.is_empty() {
        return;
    }
    let mut alternatives = vec![format!("{column} = ''")];
    for code in codes {
        alternatives.push(format!("instr(',' || {column} || ',', ?) > 0"));
        params.push(Value::Text(format!(",{code},")));
    }
    where_parts.push(format!("({})", alternatives.join(" OR ")));
}

pub(crate) fn push_in_codes(
    column: &str,
    codes: &[String],
    where_parts: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    where_parts.push(format!("{column} IN ({})", placeholders(codes.len())));
    params.extend(codes.iter().map(|c| Value::Text(c.clone())));
}

pub(crate) fn require_codes(field: &'static str, codes: &[String]) -> Result<(), crate::QueryError> {
    if codes.is_empty() {
        return Err(crate::QueryError::validation(
            field,
            format!("{field} must list at least one code"),
        ));
    }
    Ok(())
}
