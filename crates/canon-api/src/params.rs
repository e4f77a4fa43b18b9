// SPDX-License-Identifier: Apache-2.0

//! Query-string parsing for list and context endpoints.
//!
//! Malformed values are `InvalidQueryParameter`; well-formed values the query layer rejects
//! (size bounds, cursor contents, empty layer lists) come back through `From<QueryError>`.

use crate::ApiError;
use canon_model::{
    DependencyType, DetectionType, ExampleType, FeedbackStatus, FeedbackTargetType, FeedbackType,
    LifecycleScope, RiskLevel, RuleSeverity, TechStackStatus, ValidationError,
};
use canon_query::{
    ArchUnitTestFilter, ArchitectureFilter, ChecklistItemFilter, ClassTemplateFilter,
    ClassTypeCategoryFilter, ClassTypeFilter, ClassTypeSearchField, CodingRuleFilter,
    ConfigFileTemplateFilter, ConfigFilesRequest, ConventionFilter, FeedbackQueueFilter,
    LayerDependencyRuleFilter, LayerFilter, Listed, ModuleContextRequest, ModuleFilter,
    OnboardingContextFilter, OnboardingRequest, PackagePurposeFilter, PackageStructureFilter,
    PlanningContextRequest, QueryLimits, ResourceTemplateFilter, RuleExampleFilter,
    RuleSearchField, SliceCriteria, TechStackFilter, ValidationContextRequest,
    ZeroToleranceRuleFilter,
};
use std::collections::BTreeMap;

pub type QueryParams = BTreeMap<String, String>;

/// Builds an entity filter from its list endpoint's query parameters.
pub trait ParseFilter: Sized {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError>;
}

/// `cursor`, `size`, `includeDeleted` and the entity's filter, validated into criteria.
pub fn parse_slice_criteria<E>(
    query: &QueryParams,
    limits: &QueryLimits,
) -> Result<SliceCriteria<E::Filter>, ApiError>
where
    E: Listed,
    E::Filter: ParseFilter,
{
    let size = match query.get("size") {
        Some(raw) => Some(
            raw.trim()
                .parse::<usize>()
                .map_err(|_| ApiError::invalid_param("size", raw))?,
        ),
        None => None,
    };
    let lifecycle = if optional_bool(query, "includeDeleted")?.unwrap_or(false) {
        LifecycleScope::IncludeDeleted
    } else {
        LifecycleScope::ActiveOnly
    };
    let filter = E::Filter::parse_filter(query)?;
    let criteria = SliceCriteria::from_request(
        query.get("cursor").map(String::as_str),
        size,
        filter,
        limits,
    )?;
    Ok(criteria.with_lifecycle(lifecycle))
}

fn parse_id(name: &str, raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::invalid_param(name, raw)),
    }
}

/// Comma-separated positive ids; absent means no filter.
pub fn id_list(query: &QueryParams, name: &str) -> Result<Vec<i64>, ApiError> {
    let Some(raw) = query.get(name) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_id(name, part))
        .collect()
}

/// Comma-separated codes with blanks dropped and first-seen order kept.
#[must_use]
pub fn code_list(query: &QueryParams, name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(raw) = query.get(name) {
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !out.iter().any(|seen| seen == part) {
                out.push(part.to_string());
            }
        }
    }
    out
}

fn enum_list<T>(
    query: &QueryParams,
    name: &str,
    parse: fn(&str) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ApiError> {
    code_list(query, name)
        .iter()
        .map(|code| parse(code).map_err(|_| ApiError::invalid_param(name, code)))
        .collect()
}

pub fn optional_id(query: &QueryParams, name: &str) -> Result<Option<i64>, ApiError> {
    query.get(name).map(|raw| parse_id(name, raw)).transpose()
}

pub fn required_id(query: &QueryParams, name: &str) -> Result<i64, ApiError> {
    optional_id(query, name)?.ok_or_else(|| ApiError::missing_param(name))
}

pub fn optional_bool(query: &QueryParams, name: &str) -> Result<Option<bool>, ApiError> {
    match query.get(name).map(|raw| raw.trim()) {
        None => Ok(None),
        Some(raw) if raw == "1" || raw.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(raw) if raw == "0" || raw.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(raw) => Err(ApiError::invalid_param(name, raw)),
    }
}

fn search<T>(
    query: &QueryParams,
    parse: fn(&str) -> Result<T, ValidationError>,
) -> Result<(Option<T>, Option<String>), ApiError> {
    let field = query
        .get("searchField")
        .map(|raw| parse(raw.trim()).map_err(|_| ApiError::invalid_param("searchField", raw)))
        .transpose()?;
    Ok((field, query.get("searchWord").cloned()))
}

impl ParseFilter for TechStackFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        let status = query
            .get("status")
            .map(|raw| {
                TechStackStatus::parse(raw.trim()).map_err(|_| ApiError::invalid_param("status", raw))
            })
            .transpose()?;
        Ok(Self { status })
    }
}

impl ParseFilter for ArchitectureFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            tech_stack_ids: id_list(query, "techStackIds")?,
        })
    }
}

impl ParseFilter for LayerFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            architecture_ids: id_list(query, "architectureIds")?,
            codes: code_list(query, "codes"),
        })
    }
}

impl ParseFilter for ModuleFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            layer_ids: id_list(query, "layerIds")?,
            parent_module_id: optional_id(query, "parentModuleId")?,
        })
    }
}

impl ParseFilter for ConventionFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            module_ids: id_list(query, "moduleIds")?,
            active: optional_bool(query, "active")?,
        })
    }
}

impl ParseFilter for CodingRuleFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        let (search_field, search_word) = search(query, RuleSearchField::parse)?;
        Ok(Self {
            convention_ids: id_list(query, "conventionIds")?,
            severities: enum_list(query, "severities", RuleSeverity::parse)?,
            categories: code_list(query, "categories"),
            search_field,
            search_word,
        })
    }
}

impl ParseFilter for RuleExampleFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            rule_ids: id_list(query, "ruleIds")?,
            example_types: enum_list(query, "exampleTypes", ExampleType::parse)?,
        })
    }
}

impl ParseFilter for ZeroToleranceRuleFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            rule_ids: id_list(query, "ruleIds")?,
            detection_types: enum_list(query, "detectionTypes", DetectionType::parse)?,
        })
    }
}

impl ParseFilter for ChecklistItemFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            rule_ids: id_list(query, "ruleIds")?,
        })
    }
}

impl ParseFilter for PackageStructureFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            module_ids: id_list(query, "moduleIds")?,
        })
    }
}

impl ParseFilter for PackagePurposeFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            structure_ids: id_list(query, "structureIds")?,
        })
    }
}

impl ParseFilter for ClassTypeCategoryFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            architecture_ids: id_list(query, "architectureIds")?,
        })
    }
}

impl ParseFilter for ClassTypeFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        let (search_field, search_word) = search(query, ClassTypeSearchField::parse)?;
        Ok(Self {
            ids: id_list(query, "ids")?,
            category_ids: id_list(query, "categoryIds")?,
            architecture_ids: id_list(query, "architectureIds")?,
            search_field,
            search_word,
        })
    }
}

impl ParseFilter for ClassTemplateFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            structure_ids: id_list(query, "structureIds")?,
            class_type_ids: id_list(query, "classTypeIds")?,
        })
    }
}

impl ParseFilter for ArchUnitTestFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            structure_ids: id_list(query, "structureIds")?,
        })
    }
}

impl ParseFilter for LayerDependencyRuleFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            architecture_ids: id_list(query, "architectureIds")?,
            dependency_types: enum_list(query, "dependencyTypes", DependencyType::parse)?,
        })
    }
}

impl ParseFilter for ResourceTemplateFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            module_ids: id_list(query, "moduleIds")?,
            categories: code_list(query, "categories"),
            file_types: code_list(query, "fileTypes"),
        })
    }
}

impl ParseFilter for ConfigFileTemplateFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            tech_stack_ids: id_list(query, "techStackIds")?,
            tool_types: code_list(query, "toolTypes"),
            categories: code_list(query, "categories"),
        })
    }
}

impl ParseFilter for OnboardingContextFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            tech_stack_ids: id_list(query, "techStackIds")?,
            context_types: code_list(query, "contextTypes"),
        })
    }
}

impl ParseFilter for FeedbackQueueFilter {
    fn parse_filter(query: &QueryParams) -> Result<Self, ApiError> {
        Ok(Self {
            statuses: enum_list(query, "statuses", FeedbackStatus::parse)?,
            target_types: enum_list(query, "targetTypes", FeedbackTargetType::parse)?,
            feedback_types: enum_list(query, "feedbackTypes", FeedbackType::parse)?,
            risk_levels: enum_list(query, "riskLevels", RiskLevel::parse)?,
        })
    }
}

pub fn parse_module_context_params(
    module_id: &str,
    query: &QueryParams,
) -> Result<ModuleContextRequest, ApiError> {
    Ok(ModuleContextRequest {
        module_id: parse_id("moduleId", module_id)?,
        class_type_id: optional_id(query, "classTypeId")?,
    })
}

/// `layers` must be present; an empty list is left to the query layer to reject.
pub fn parse_planning_context_params(
    query: &QueryParams,
) -> Result<PlanningContextRequest, ApiError> {
    if !query.contains_key("layers") {
        return Err(ApiError::missing_param("layers"));
    }
    Ok(PlanningContextRequest {
        layers: code_list(query, "layers"),
        tech_stack_id: optional_id(query, "techStackId")?,
    })
}

pub fn parse_validation_context_params(
    query: &QueryParams,
) -> Result<ValidationContextRequest, ApiError> {
    if !query.contains_key("layers") {
        return Err(ApiError::missing_param("layers"));
    }
    Ok(ValidationContextRequest {
        tech_stack_id: required_id(query, "techStackId")?,
        architecture_id: required_id(query, "architectureId")?,
        layers: code_list(query, "layers"),
        class_types: code_list(query, "classTypes"),
    })
}

pub fn parse_config_files_params(query: &QueryParams) -> Result<ConfigFilesRequest, ApiError> {
    Ok(ConfigFilesRequest {
        tech_stack_id: required_id(query, "techStackId")?,
        architecture_id: optional_id(query, "architectureId")?,
        tool_types: code_list(query, "toolTypes"),
    })
}

pub fn parse_onboarding_params(query: &QueryParams) -> Result<OnboardingRequest, ApiError> {
    Ok(OnboardingRequest {
        tech_stack_id: required_id(query, "techStackId")?,
        architecture_id: optional_id(query, "architectureId")?,
        context_types: code_list(query, "contextTypes"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn code_lists_drop_blanks_and_repeats() {
        let q = query(&[("layers", "DOMAIN, ,APPLICATION,DOMAIN")]);
        assert_eq!(code_list(&q, "layers"), vec!["DOMAIN", "APPLICATION"]);
        assert!(code_list(&q, "classTypes").is_empty());
    }

    #[test]
    fn id_lists_reject_non_positive_values() {
        assert_eq!(
            id_list(&query(&[("ruleIds", "3,1")]), "ruleIds").expect("ids"),
            vec![3, 1]
        );
        assert!(id_list(&query(&[("ruleIds", "3,0")]), "ruleIds").is_err());
        assert!(id_list(&query(&[("ruleIds", "x")]), "ruleIds").is_err());
    }
}
