// SPDX-License-Identifier: Apache-2.0

use crate::codes::{
    DependencyType, DetectionType, ExampleType, FeedbackStatus, FeedbackTargetType, FeedbackType,
    RiskLevel, RuleSeverity, TechStackStatus,
};
use crate::error::{
    optional_text, require_code, require_id, require_text, ValidationError, CODE_MAX_LEN,
    NAME_MAX_LEN, TEXT_MAX_LEN,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum EntityKind {
    TechStack,
    Architecture,
    Layer,
    Module,
    Convention,
    CodingRule,
    RuleExample,
    ZeroToleranceRule,
    ChecklistItem,
    PackageStructure,
    PackagePurpose,
    ClassTypeCategory,
    ClassType,
    ClassTemplate,
    ArchUnitTest,
    LayerDependencyRule,
    ResourceTemplate,
    ConfigFileTemplate,
    OnboardingContext,
    FeedbackQueue,
}

impl EntityKind {
    pub const ALL: [Self; 20] = [
        Self::TechStack,
        Self::Architecture,
        Self::Layer,
        Self::Module,
        Self::Convention,
        Self::CodingRule,
        Self::RuleExample,
        Self::ZeroToleranceRule,
        Self::ChecklistItem,
        Self::PackageStructure,
        Self::PackagePurpose,
        Self::ClassTypeCategory,
        Self::ClassType,
        Self::ClassTemplate,
        Self::ArchUnitTest,
        Self::LayerDependencyRule,
        Self::ResourceTemplate,
        Self::ConfigFileTemplate,
        Self::OnboardingContext,
        Self::FeedbackQueue,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TechStack => "tech-stack",
            Self::Architecture => "architecture",
            Self::Layer => "layer",
            Self::Module => "module",
            Self::Convention => "convention",
            Self::CodingRule => "coding-rule",
            Self::RuleExample => "rule-example",
            Self::ZeroToleranceRule => "zero-tolerance-rule",
            Self::ChecklistItem => "checklist-item",
            Self::PackageStructure => "package-structure",
            Self::PackagePurpose => "package-purpose",
            Self::ClassTypeCategory => "class-type-category",
            Self::ClassType => "class-type",
            Self::ClassTemplate => "class-template",
            Self::ArchUnitTest => "arch-unit-test",
            Self::LayerDependencyRule => "layer-dependency-rule",
            Self::ResourceTemplate => "resource-template",
            Self::ConfigFileTemplate => "config-file-template",
            Self::OnboardingContext => "onboarding-context",
            Self::FeedbackQueue => "feedback-queue",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute set of one persisted entity type.
///
/// The same value serves as the creation draft and as the payload of [`crate::Stored`].
pub trait Entity: Clone + PartialEq + Serialize + Send + Sync + 'static {
    const KIND: EntityKind;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Checks an update from `self` to `next` beyond what `validate` covers.
    fn validate_change(&self, _next: &Self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TechStack {
    pub name: String,
    pub status: TechStackStatus,
    pub language_type: String,
    pub language_version: String,
    pub framework_type: String,
    pub framework_version: String,
    pub build_tool_type: String,
}

impl Entity for TechStack {
    const KIND: EntityKind = EntityKind::TechStack;

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, NAME_MAX_LEN)?;
        require_text("languageType", &self.language_type, CODE_MAX_LEN)?;
        require_text("languageVersion", &self.language_version, CODE_MAX_LEN)?;
        require_text("frameworkType", &self.framework_type, CODE_MAX_LEN)?;
        require_text("frameworkVersion", &self.framework_version, CODE_MAX_LEN)?;
        require_text("buildToolType", &self.build_tool_type, CODE_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Architecture {
    pub tech_stack_id: i64,
    pub name: String,
    pub pattern_type: String,
    #[serde(default)]
    pub pattern_description: Option<String>,
}

impl Entity for Architecture {
    const KIND: EntityKind = EntityKind::Architecture;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("techStackId", self.tech_stack_id)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        require_code("patternType", &self.pattern_type)?;
        optional_text(
            "patternDescription",
            self.pattern_description.as_deref(),
            TEXT_MAX_LEN,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Layer {
    pub architecture_id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order_index: i64,
}

impl Entity for Layer {
    const KIND: EntityKind = EntityKind::Layer;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("architectureId", self.architecture_id)?;
        require_code("code", &self.code)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)?;
        if self.order_index < 0 {
            return Err(ValidationError::new("orderIndex", "must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Module {
    pub layer_id: i64,
    #[serde(default)]
    pub parent_module_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module_path: Option<String>,
}

impl Entity for Module {
    const KIND: EntityKind = EntityKind::Module;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("layerId", self.layer_id)?;
        if let Some(parent) = self.parent_module_id {
            require_id("parentModuleId", parent)?;
        }
        require_text("name", &self.name, NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)?;
        optional_text("modulePath", self.module_path.as_deref(), NAME_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Convention {
    pub module_id: i64,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub active: bool,
}

impl Entity for Convention {
    const KIND: EntityKind = EntityKind::Convention;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("moduleId", self.module_id)?;
        require_text("version", &self.version, CODE_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CodingRule {
    pub convention_id: i64,
    pub code: String,
    pub name: String,
    pub severity: RuleSeverity,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub auto_fixable: bool,
    /// Class-type codes this rule targets; empty means every class type.
    #[serde(default)]
    pub applies_to: Vec<String>,
}

impl CodingRule {
    #[must_use]
    pub fn applies_to_class_type(&self, class_type_code: &str) -> bool {
        self.applies_to.is_empty() || self.applies_to.iter().any(|c| c == class_type_code)
    }
}

impl Entity for CodingRule {
    const KIND: EntityKind = EntityKind::CodingRule;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("conventionId", self.convention_id)?;
        require_code("code", &self.code)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        require_code("category", &self.category)?;
        require_text("description", &self.description, TEXT_MAX_LEN)?;
        optional_text("rationale", self.rationale.as_deref(), TEXT_MAX_LEN)?;
        for code in &self.applies_to {
            require_code("appliesTo", code)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleExample {
    pub rule_id: i64,
    pub example_type: ExampleType,
    pub code: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Entity for RuleExample {
    const KIND: EntityKind = EntityKind::RuleExample;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("ruleId", self.rule_id)?;
        if self.code.trim().is_empty() {
            return Err(ValidationError::new("code", "must not be empty"));
        }
        optional_text("explanation", self.explanation.as_deref(), TEXT_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ZeroToleranceRule {
    pub rule_id: i64,
    pub detection_type: DetectionType,
    pub detection_pattern: String,
    #[serde(default)]
    pub auto_reject_pr: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Entity for ZeroToleranceRule {
    const KIND: EntityKind = EntityKind::ZeroToleranceRule;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("ruleId", self.rule_id)?;
        require_text("detectionPattern", &self.detection_pattern, TEXT_MAX_LEN)?;
        optional_text("errorMessage", self.error_message.as_deref(), TEXT_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChecklistItem {
    pub rule_id: i64,
    pub sequence_order: i64,
    pub check_description: String,
    #[serde(default)]
    pub automation_tool: Option<String>,
    #[serde(default)]
    pub critical: bool,
}

impl ChecklistItem {
    #[must_use]
    pub fn has_automation(&self) -> bool {
        self.automation_tool
            .as_deref()
            .is_some_and(|tool| !tool.trim().is_empty())
    }
}

impl Entity for ChecklistItem {
    const KIND: EntityKind = EntityKind::ChecklistItem;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("ruleId", self.rule_id)?;
        if self.sequence_order < 1 {
            return Err(ValidationError::new("sequenceOrder", "must be >= 1"));
        }
        require_text("checkDescription", &self.check_description, TEXT_MAX_LEN)?;
        optional_text("automationTool", self.automation_tool.as_deref(), CODE_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackageStructure {
    pub module_id: i64,
    pub path_pattern: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for PackageStructure {
    const KIND: EntityKind = EntityKind::PackageStructure;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("moduleId", self.module_id)?;
        require_text("pathPattern", &self.path_pattern, NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackagePurpose {
    pub structure_id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for PackagePurpose {
    const KIND: EntityKind = EntityKind::PackagePurpose;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("structureId", self.structure_id)?;
        require_code("code", &self.code)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassTypeCategory {
    pub architecture_id: i64,
    pub code: String,
    pub name: String,
    pub order_index: i64,
}

impl Entity for ClassTypeCategory {
    const KIND: EntityKind = EntityKind::ClassTypeCategory;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("architectureId", self.architecture_id)?;
        require_code("code", &self.code)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        if self.order_index < 0 {
            return Err(ValidationError::new("orderIndex", "must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassType {
    pub category_id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order_index: i64,
}

impl Entity for ClassType {
    const KIND: EntityKind = EntityKind::ClassType;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("categoryId", self.category_id)?;
        require_code("code", &self.code)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)?;
        if self.order_index < 0 {
            return Err(ValidationError::new("orderIndex", "must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassTemplate {
    pub structure_id: i64,
    pub class_type_id: i64,
    pub template_code: String,
    #[serde(default)]
    pub naming_pattern: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for ClassTemplate {
    const KIND: EntityKind = EntityKind::ClassTemplate;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("structureId", self.structure_id)?;
        require_id("classTypeId", self.class_type_id)?;
        if self.template_code.trim().is_empty() {
            return Err(ValidationError::new("templateCode", "must not be empty"));
        }
        optional_text("namingPattern", self.naming_pattern.as_deref(), NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArchUnitTest {
    pub structure_id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub test_code: String,
    #[serde(default)]
    pub severity: Option<RuleSeverity>,
}

impl Entity for ArchUnitTest {
    const KIND: EntityKind = EntityKind::ArchUnitTest;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("structureId", self.structure_id)?;
        require_code("code", &self.code)?;
        require_text("name", &self.name, NAME_MAX_LEN)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)?;
        if self.test_code.trim().is_empty() {
            return Err(ValidationError::new("testCode", "must not be empty"));
        }
        Ok(())
    }
}

/// Whether code in `from_layer` may depend on `to_layer` within one architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayerDependencyRule {
    pub architecture_id: i64,
    pub from_layer: String,
    pub to_layer: String,
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub condition_description: Option<String>,
}

impl Entity for LayerDependencyRule {
    const KIND: EntityKind = EntityKind::LayerDependencyRule;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("architectureId", self.architecture_id)?;
        require_code("fromLayer", &self.from_layer)?;
        require_code("toLayer", &self.to_layer)?;
        let has_condition = self
            .condition_description
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if self.dependency_type == DependencyType::Conditional && !has_condition {
            return Err(ValidationError::new(
                "conditionDescription",
                "required for CONDITIONAL dependencies",
            ));
        }
        optional_text(
            "conditionDescription",
            self.condition_description.as_deref(),
            TEXT_MAX_LEN,
        )
    }
}

/// Non-class file a module ships with (build scripts, config, static assets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceTemplate {
    pub module_id: i64,
    pub category: String,
    pub file_path: String,
    pub file_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template_content: String,
    #[serde(default)]
    pub required: bool,
}

impl Entity for ResourceTemplate {
    const KIND: EntityKind = EntityKind::ResourceTemplate;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("moduleId", self.module_id)?;
        require_code("category", &self.category)?;
        require_text("filePath", &self.file_path, NAME_MAX_LEN)?;
        require_code("fileType", &self.file_type)?;
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)
    }
}

/// Tool configuration file (assistant instructions, build settings) generated for a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFileTemplate {
    pub tech_stack_id: i64,
    #[serde(default)]
    pub architecture_id: Option<i64>,
    pub tool_type: String,
    pub file_path: String,
    pub file_name: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Placeholder names the content expects, as a JSON document.
    #[serde(default)]
    pub variables: Option<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub required: bool,
}

impl Entity for ConfigFileTemplate {
    const KIND: EntityKind = EntityKind::ConfigFileTemplate;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("techStackId", self.tech_stack_id)?;
        if let Some(architecture_id) = self.architecture_id {
            require_id("architectureId", architecture_id)?;
        }
        require_code("toolType", &self.tool_type)?;
        require_text("filePath", &self.file_path, NAME_MAX_LEN)?;
        require_text("fileName", &self.file_name, NAME_MAX_LEN)?;
        if self.content.trim().is_empty() {
            return Err(ValidationError::new("content", "must not be empty"));
        }
        if let Some(category) = self.category.as_deref() {
            require_code("category", category)?;
        }
        optional_text("description", self.description.as_deref(), TEXT_MAX_LEN)?;
        if let Some(variables) = self.variables.as_deref() {
            if serde_json::from_str::<serde_json::Value>(variables).is_err() {
                return Err(ValidationError::new("variables", "must be a JSON document"));
            }
        }
        Ok(())
    }
}

/// Prose handed to an assistant when it first attaches to a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OnboardingContext {
    pub tech_stack_id: i64,
    #[serde(default)]
    pub architecture_id: Option<i64>,
    pub context_type: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: i64,
}

impl Entity for OnboardingContext {
    const KIND: EntityKind = EntityKind::OnboardingContext;

    fn validate(&self) -> Result<(), ValidationError> {
        require_id("techStackId", self.tech_stack_id)?;
        if let Some(architecture_id) = self.architecture_id {
            require_id("architectureId", architecture_id)?;
        }
        require_code("contextType", &self.context_type)?;
        require_text("title", &self.title, NAME_MAX_LEN)?;
        if self.content.trim().is_empty() {
            return Err(ValidationError::new("content", "must not be empty"));
        }
        if self.priority < 0 {
            return Err(ValidationError::new("priority", "must be >= 0"));
        }
        Ok(())
    }
}

/// Proposed change to a convention row, moving through LLM and human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeedbackQueue {
    pub target_type: FeedbackTargetType,
    #[serde(default)]
    pub target_id: Option<i64>,
    pub feedback_type: FeedbackType,
    /// Proposed row content as a JSON document.
    pub payload: String,
    #[serde(default = "FeedbackQueue::initial_status")]
    pub status: FeedbackStatus,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub review_notes: Option<String>,
}

impl FeedbackQueue {
    const fn initial_status() -> FeedbackStatus {
        FeedbackStatus::Pending
    }
}

impl Entity for FeedbackQueue {
    const KIND: EntityKind = EntityKind::FeedbackQueue;

    fn validate(&self) -> Result<(), ValidationError> {
        match (self.feedback_type, self.target_id) {
            (FeedbackType::Add, _) => {}
            (_, Some(target_id)) => require_id("targetId", target_id)?,
            (_, None) => {
                return Err(ValidationError::new(
                    "targetId",
                    "required for MODIFY and DELETE feedback",
                ))
            }
        }
        if serde_json::from_str::<serde_json::Value>(&self.payload).is_err() {
            return Err(ValidationError::new("payload", "must be a JSON document"));
        }
        optional_text("reviewNotes", self.review_notes.as_deref(), TEXT_MAX_LEN)
    }

    fn validate_change(&self, next: &Self) -> Result<(), ValidationError> {
        if self.status == next.status {
            return Ok(());
        }
        if self.status.can_move_to(next.status, self.risk_level) {
            return Ok(());
        }
        Err(ValidationError::new(
            "status",
            format!(
                "cannot move from {} to {} at risk level {}",
                self.status.as_str(),
                next.status.as_str(),
                self.risk_level.as_str()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> Layer {
        Layer {
            architecture_id: 1,
            code: "DOMAIN".to_string(),
            name: "Domain".to_string(),
            description: None,
            order_index: 1,
        }
    }

    #[test]
    fn entity_kind_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("layers"), None);
    }

    #[test]
    fn layer_validation_rejects_bad_codes_and_order() {
        assert!(layer().validate().is_ok());
        let err = Layer {
            code: "DO MAIN".to_string(),
            ..layer()
        }
        .validate()
        .expect_err("space in code");
        assert_eq!(err.field, "code");
        let err = Layer {
            order_index: -1,
            ..layer()
        }
        .validate()
        .expect_err("negative order");
        assert_eq!(err.field, "orderIndex");
        let err = Layer {
            architecture_id: 0,
            ..layer()
        }
        .validate()
        .expect_err("missing parent");
        assert_eq!(err.field, "architectureId");
    }

    #[test]
    fn coding_rule_class_type_matching_is_exact() {
        let rule = CodingRule {
            convention_id: 1,
            code: "AGG-001".to_string(),
            name: "No setters".to_string(),
            severity: RuleSeverity::Critical,
            category: "STRUCTURE".to_string(),
            description: "Aggregates expose no setters".to_string(),
            rationale: None,
            auto_fixable: false,
            applies_to: vec!["AGGREGATE".to_string(), "VO".to_string()],
        };
        assert!(rule.applies_to_class_type("VO"));
        assert!(!rule.applies_to_class_type("AGG"));
        let everywhere = CodingRule {
            applies_to: Vec::new(),
            ..rule
        };
        assert!(everywhere.applies_to_class_type("ANY"));
    }

    fn feedback(status: FeedbackStatus, risk_level: RiskLevel) -> FeedbackQueue {
        FeedbackQueue {
            target_type: FeedbackTargetType::CodingRule,
            target_id: Some(3),
            feedback_type: FeedbackType::Modify,
            payload: r#"{"description":"Tighten wording"}"#.to_string(),
            status,
            risk_level,
            review_notes: None,
        }
    }

    #[test]
    fn feedback_requires_a_target_unless_it_adds() {
        assert!(feedback(FeedbackStatus::Pending, RiskLevel::Safe).validate().is_ok());
        let err = FeedbackQueue {
            target_id: None,
            ..feedback(FeedbackStatus::Pending, RiskLevel::Safe)
        }
        .validate()
        .expect_err("modify without target");
        assert_eq!(err.field, "targetId");
        let addition = FeedbackQueue {
            target_id: None,
            feedback_type: FeedbackType::Add,
            ..feedback(FeedbackStatus::Pending, RiskLevel::Safe)
        };
        assert!(addition.validate().is_ok());
        let err = FeedbackQueue {
            payload: "not json".to_string(),
            ..addition
        }
        .validate()
        .expect_err("payload");
        assert_eq!(err.field, "payload");
    }

    #[test]
    fn risky_feedback_cannot_skip_human_review() {
        let approved = feedback(FeedbackStatus::LlmApproved, RiskLevel::High);
        let err = approved
            .validate_change(&feedback(FeedbackStatus::Merged, RiskLevel::High))
            .expect_err("merge without human approval");
        assert_eq!(err.field, "status");
        assert!(approved
            .validate_change(&feedback(FeedbackStatus::HumanApproved, RiskLevel::High))
            .is_ok());
        let safe = feedback(FeedbackStatus::LlmApproved, RiskLevel::Safe);
        assert!(safe
            .validate_change(&feedback(FeedbackStatus::Merged, RiskLevel::Safe))
            .is_ok());
    }

    #[test]
    fn conditional_dependency_needs_its_condition() {
        let rule = LayerDependencyRule {
            architecture_id: 1,
            from_layer: "ADAPTER_IN".to_string(),
            to_layer: "DOMAIN".to_string(),
            dependency_type: DependencyType::Conditional,
            condition_description: None,
        };
        let err = rule.validate().expect_err("missing condition");
        assert_eq!(err.field, "conditionDescription");
        let rule = LayerDependencyRule {
            condition_description: Some("Only through ports".to_string()),
            ..rule
        };
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn drafts_reject_unknown_fields() {
        let err = serde_json::from_str::<Layer>(
            r#"{"architectureId":1,"code":"APP","name":"App","orderIndex":2,"color":"red"}"#,
        )
        .expect_err("unknown field");
        assert!(err.to_string().contains("color"));
    }
}
