// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod codes;
mod crud;
mod entity;
mod error;
mod lifecycle;
mod patch;

pub use codes::{
    DependencyType, DetectionType, ExampleType, FeedbackStatus, FeedbackTargetType, FeedbackType,
    RiskLevel, RuleSeverity, TechStackStatus,
};
pub use crud::{CrudError, CrudPort, CrudService, UpdateOutcome};
pub use entity::{
    ArchUnitTest, Architecture, ChecklistItem, ClassTemplate, ClassType, ClassTypeCategory,
    CodingRule, ConfigFileTemplate, Convention, Entity, EntityKind, FeedbackQueue, Layer,
    LayerDependencyRule, Module, OnboardingContext, PackagePurpose, PackageStructure,
    ResourceTemplate, RuleExample, TechStack, ZeroToleranceRule,
};
pub use error::{ValidationError, CODE_MAX_LEN, NAME_MAX_LEN, TEXT_MAX_LEN};
pub use lifecycle::{
    format_timestamp, parse_timestamp, Lifecycle, LifecycleScope, Stored, Timestamp,
};
pub use patch::{
    ArchUnitTestPatch, ArchitecturePatch, ChecklistItemPatch, ClassTemplatePatch,
    ClassTypeCategoryPatch, ClassTypePatch, CodingRulePatch, ConfigFileTemplatePatch,
    ConventionPatch, FeedbackQueuePatch, LayerDependencyRulePatch, LayerPatch, ModulePatch,
    OnboardingContextPatch, PackagePurposePatch, PackageStructurePatch, Patch,
    ResourceTemplatePatch, RuleExamplePatch, TechStackPatch, ZeroToleranceRulePatch,
};

pub const CRATE_NAME: &str = "canon-model";
