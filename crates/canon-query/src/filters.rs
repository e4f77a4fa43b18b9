// SPDX-License-Identifier: Apache-2.0

use crate::fetch::{escape_like, push_in_ids, push_in_texts, SliceFilter};
use canon_model::{
    ArchUnitTest, Architecture, ChecklistItem, ClassTemplate, ClassType, ClassTypeCategory,
    CodingRule, ConfigFileTemplate, Convention, DependencyType, DetectionType, ExampleType,
    FeedbackQueue, FeedbackStatus, FeedbackTargetType, FeedbackType, Layer, LayerDependencyRule,
    Module, OnboardingContext, PackagePurpose, PackageStructure, ResourceTemplate, RiskLevel,
    RuleExample, RuleSeverity, TechStack, TechStackStatus, ValidationError, ZeroToleranceRule,
};
use canon_store::Table;
use rusqlite::types::Value;

/// Ties an entity to the filter type its list endpoint accepts.
pub trait Listed: Table {
    type Filter: SliceFilter<Self> + Default + Send + 'static;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleSearchField {
    Code,
    Name,
    Description,
}

impl RuleSearchField {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "CODE" => Ok(Self::Code),
            "NAME" => Ok(Self::Name),
            "DESCRIPTION" => Ok(Self::Description),
            _ => Err(ValidationError::new(
                "searchField",
                "must be one of CODE, NAME, DESCRIPTION",
            )),
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::Code => "t.code",
            Self::Name => "t.name",
            Self::Description => "t.description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClassTypeSearchField {
    Code,
    Name,
}

impl ClassTypeSearchField {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "CODE" => Ok(Self::Code),
            "NAME" => Ok(Self::Name),
            _ => Err(ValidationError::new("searchField", "must be CODE or NAME")),
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::Code => "t.code",
            Self::Name => "t.name",
        }
    }
}

fn push_search(
    column: Option<&'static str>,
    word: Option<&str>,
    where_parts: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    let (Some(column), Some(word)) = (column, word.map(str::trim)) else {
        return;
    };
    if word.is_empty() {
        return;
    }
    where_parts.push(format!("{column} LIKE ? ESCAPE '!'"));
    params.push(Value::Text(format!("%{}%", escape_like(word))));
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechStackFilter {
    pub status: Option<TechStackStatus>,
}

impl SliceFilter<TechStack> for TechStackFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        if let Some(status) = self.status {
            where_parts.push("t.status = ?".to_string());
            params.push(Value::Text(status.as_str().to_string()));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchitectureFilter {
    pub tech_stack_ids: Vec<i64>,
}

impl SliceFilter<Architecture> for ArchitectureFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.tech_stack_id", &self.tech_stack_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerFilter {
    pub architecture_ids: Vec<i64>,
    pub codes: Vec<String>,
}

impl SliceFilter<Layer> for LayerFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.architecture_id", &self.architecture_ids, where_parts, params);
        push_in_texts(
            "t.code",
            self.codes.iter().map(String::as_str),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    pub layer_ids: Vec<i64>,
    pub parent_module_id: Option<i64>,
}

impl SliceFilter<Module> for ModuleFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.layer_id", &self.layer_ids, where_parts, params);
        if let Some(parent) = self.parent_module_id {
            where_parts.push("t.parent_module_id = ?".to_string());
            params.push(Value::Integer(parent));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionFilter {
    pub module_ids: Vec<i64>,
    pub active: Option<bool>,
}

impl SliceFilter<Convention> for ConventionFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.module_id", &self.module_ids, where_parts, params);
        if let Some(active) = self.active {
            where_parts.push("t.active = ?".to_string());
            params.push(Value::Integer(i64::from(active)));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodingRuleFilter {
    pub convention_ids: Vec<i64>,
    pub severities: Vec<RuleSeverity>,
    pub categories: Vec<String>,
    /// The search applies only when both field and word are present.
    pub search_field: Option<RuleSearchField>,
    pub search_word: Option<String>,
}

impl SliceFilter<CodingRule> for CodingRuleFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.convention_id", &self.convention_ids, where_parts, params);
        push_in_texts(
            "t.severity",
            self.severities.iter().map(|s| s.as_str()),
            where_parts,
            params,
        );
        push_in_texts(
            "t.category",
            self.categories.iter().map(String::as_str),
            where_parts,
            params,
        );
        push_search(
            self.search_field.map(RuleSearchField::column),
            self.search_word.as_deref(),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleExampleFilter {
    pub rule_ids: Vec<i64>,
    pub example_types: Vec<ExampleType>,
}

impl SliceFilter<RuleExample> for RuleExampleFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.rule_id", &self.rule_ids, where_parts, params);
        push_in_texts(
            "t.example_type",
            self.example_types.iter().map(|e| e.as_str()),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZeroToleranceRuleFilter {
    pub rule_ids: Vec<i64>,
    pub detection_types: Vec<DetectionType>,
}

impl SliceFilter<ZeroToleranceRule> for ZeroToleranceRuleFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.rule_id", &self.rule_ids, where_parts, params);
        push_in_texts(
            "t.detection_type",
            self.detection_types.iter().map(|d| d.as_str()),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItemFilter {
    pub rule_ids: Vec<i64>,
}

impl SliceFilter<ChecklistItem> for ChecklistItemFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.rule_id", &self.rule_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageStructureFilter {
    pub module_ids: Vec<i64>,
}

impl SliceFilter<PackageStructure> for PackageStructureFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.module_id", &self.module_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagePurposeFilter {
    pub structure_ids: Vec<i64>,
}

impl SliceFilter<PackagePurpose> for PackagePurposeFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.structure_id", &self.structure_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTypeCategoryFilter {
    pub architecture_ids: Vec<i64>,
}

impl SliceFilter<ClassTypeCategory> for ClassTypeCategoryFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.architecture_id", &self.architecture_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTypeFilter {
    pub ids: Vec<i64>,
    pub category_ids: Vec<i64>,
    pub architecture_ids: Vec<i64>,
    pub search_field: Option<ClassTypeSearchField>,
    pub search_word: Option<String>,
}

impl SliceFilter<ClassType> for ClassTypeFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.id", &self.ids, where_parts, params);
        push_in_ids("t.category_id", &self.category_ids, where_parts, params);
        if !self.architecture_ids.is_empty() {
            let mut inner = Vec::new();
            push_in_ids("cat.architecture_id", &self.architecture_ids, &mut inner, params);
            where_parts.push(format!(
                "t.category_id IN (SELECT cat.id FROM class_type_category cat WHERE cat.deleted_at IS NULL AND {})",
                inner.join(" AND ")
            ));
        }
        push_search(
            self.search_field.map(ClassTypeSearchField::column),
            self.search_word.as_deref(),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTemplateFilter {
    pub structure_ids: Vec<i64>,
    pub class_type_ids: Vec<i64>,
}

impl SliceFilter<ClassTemplate> for ClassTemplateFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.structure_id", &self.structure_ids, where_parts, params);
        push_in_ids("t.class_type_id", &self.class_type_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchUnitTestFilter {
    pub structure_ids: Vec<i64>,
}

impl SliceFilter<ArchUnitTest> for ArchUnitTestFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.structure_id", &self.structure_ids, where_parts, params);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerDependencyRuleFilter {
    pub architecture_ids: Vec<i64>,
    pub dependency_types: Vec<DependencyType>,
}

impl SliceFilter<LayerDependencyRule> for LayerDependencyRuleFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.architecture_id", &self.architecture_ids, where_parts, params);
        push_in_texts(
            "t.dependency_type",
            self.dependency_types.iter().map(|d| d.as_str()),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTemplateFilter {
    pub module_ids: Vec<i64>,
    pub categories: Vec<String>,
    pub file_types: Vec<String>,
}

impl SliceFilter<ResourceTemplate> for ResourceTemplateFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.module_id", &self.module_ids, where_parts, params);
        push_in_texts(
            "t.category",
            self.categories.iter().map(String::as_str),
            where_parts,
            params,
        );
        push_in_texts(
            "t.file_type",
            self.file_types.iter().map(String::as_str),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFileTemplateFilter {
    pub tech_stack_ids: Vec<i64>,
    pub tool_types: Vec<String>,
    pub categories: Vec<String>,
}

impl SliceFilter<ConfigFileTemplate> for ConfigFileTemplateFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.tech_stack_id", &self.tech_stack_ids, where_parts, params);
        push_in_texts(
            "t.tool_type",
            self.tool_types.iter().map(String::as_str),
            where_parts,
            params,
        );
        push_in_texts(
            "t.category",
            self.categories.iter().map(String::as_str),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingContextFilter {
    pub tech_stack_ids: Vec<i64>,
    pub context_types: Vec<String>,
}

impl SliceFilter<OnboardingContext> for OnboardingContextFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_ids("t.tech_stack_id", &self.tech_stack_ids, where_parts, params);
        push_in_texts(
            "t.context_type",
            self.context_types.iter().map(String::as_str),
            where_parts,
            params,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackQueueFilter {
    pub statuses: Vec<FeedbackStatus>,
    pub target_types: Vec<FeedbackTargetType>,
    pub feedback_types: Vec<FeedbackType>,
    pub risk_levels: Vec<RiskLevel>,
}

impl SliceFilter<FeedbackQueue> for FeedbackQueueFilter {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>) {
        push_in_texts(
            "t.status",
            self.statuses.iter().map(|s| s.as_str()),
            where_parts,
            params,
        );
        push_in_texts(
            "t.target_type",
            self.target_types.iter().map(|t| t.as_str()),
            where_parts,
            params,
        );
        push_in_texts(
            "t.feedback_type",
            self.feedback_types.iter().map(|f| f.as_str()),
            where_parts,
            params,
        );
        push_in_texts(
            "t.risk_level",
            self.risk_levels.iter().map(|r| r.as_str()),
            where_parts,
            params,
        );
    }
}

macro_rules! listed {
    ($($entity:ty => $filter:ty),+ $(,)?) => {
        $(impl Listed for $entity {
            type Filter = $filter;
        })+
    };
}

listed! {
    TechStack => TechStackFilter,
    Architecture => ArchitectureFilter,
    Layer => LayerFilter,
    Module => ModuleFilter,
    Convention => ConventionFilter,
    CodingRule => CodingRuleFilter,
    RuleExample => RuleExampleFilter,
    ZeroToleranceRule => ZeroToleranceRuleFilter,
    ChecklistItem => ChecklistItemFilter,
    PackageStructure => PackageStructureFilter,
    PackagePurpose => PackagePurposeFilter,
    ClassTypeCategory => ClassTypeCategoryFilter,
    ClassType => ClassTypeFilter,
    ClassTemplate => ClassTemplateFilter,
    ArchUnitTest => ArchUnitTestFilter,
    LayerDependencyRule => LayerDependencyRuleFilter,
    ResourceTemplate => ResourceTemplateFilter,
    ConfigFileTemplate => ConfigFileTemplateFilter,
    OnboardingContext => OnboardingContextFilter,
    FeedbackQueue => FeedbackQueueFilter,
}
