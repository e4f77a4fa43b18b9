// SPDX-License-Identifier: Apache-2.0

//! Partial updates as values.
//!
//! A patch holds one `Option` per mutable attribute. Applying it never mutates the current
//! value; it builds the next one. Owning-parent ids are not patchable.

use crate::codes::{
    DependencyType, DetectionType, ExampleType, FeedbackStatus, RuleSeverity, TechStackStatus,
};
use crate::entity::{
    ArchUnitTest, Architecture, ChecklistItem, ClassTemplate, ClassType, ClassTypeCategory,
    CodingRule, ConfigFileTemplate, Convention, FeedbackQueue, Layer, LayerDependencyRule, Module,
    OnboardingContext, PackagePurpose, PackageStructure, ResourceTemplate, RuleExample, TechStack,
    ZeroToleranceRule,
};
use serde::Deserialize;

pub trait Patch<E>: Sized {
    fn is_empty(&self) -> bool;

    fn apply(self, current: E) -> E;

    /// Wire names of the attributes this patch would actually change on `current`.
    fn changed_fields(&self, current: &E) -> Vec<&'static str>;
}

// `set` fields replace the current value; `fill` fields target optional attributes and
// only ever replace them with `Some`.
macro_rules! entity_patch {
    (
        $patch:ident for $entity:ident {
            set { $($field:ident : $ty:ty => $wire:literal),* $(,)? }
            fill { $($ofield:ident : $oty:ty => $owire:literal),* $(,)? }
        }
    ) => {
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $patch {
            $(
                #[serde(default)]
                pub $field: Option<$ty>,
            )*
            $(
                #[serde(default)]
                pub $ofield: Option<$oty>,
            )*
        }

        impl Patch<$entity> for $patch {
            fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())* $(&& self.$ofield.is_none())*
            }

            #[allow(clippy::needless_update)]
            fn apply(self, current: $entity) -> $entity {
                $entity {
                    $($field: self.$field.unwrap_or(current.$field),)*
                    $($ofield: self.$ofield.or(current.$ofield),)*
                    ..current
                }
            }

            fn changed_fields(&self, current: &$entity) -> Vec<&'static str> {
                let mut changed = Vec::new();
                $(
                    if self.$field.as_ref().is_some_and(|next| *next != current.$field) {
                        changed.push($wire);
                    }
                )*
                $(
                    if self.$ofield.is_some() && self.$ofield != current.$ofield {
                        changed.push($owire);
                    }
                )*
                changed
            }
        }
    };
}

entity_patch! {
    TechStackPatch for TechStack {
        set {
            name: String => "name",
            status: TechStackStatus => "status",
            language_type: String => "languageType",
            language_version: String => "languageVersion",
            framework_type: String => "frameworkType",
            framework_version: String => "frameworkVersion",
            build_tool_type: String => "buildToolType",
        }
        fill {}
    }
}

entity_patch! {
    ArchitecturePatch for Architecture {
        set {
            name: String => "name",
            pattern_type: String => "patternType",
        }
        fill {
            pattern_description: String => "patternDescription",
        }
    }
}

entity_patch! {
    LayerPatch for Layer {
        set {
            code: String => "code",
            name: String => "name",
            order_index: i64 => "orderIndex",
        }
        fill {
            description: String => "description",
        }
    }
}

entity_patch! {
    ModulePatch for Module {
        set {
            name: String => "name",
        }
        fill {
            parent_module_id: i64 => "parentModuleId",
            description: String => "description",
            module_path: String => "modulePath",
        }
    }
}

entity_patch! {
    ConventionPatch for Convention {
        set {
            version: String => "version",
            active: bool => "active",
        }
        fill {
            description: String => "description",
        }
    }
}

entity_patch! {
    CodingRulePatch for CodingRule {
        set {
            code: String => "code",
            name: String => "name",
            severity: RuleSeverity => "severity",
            category: String => "category",
            description: String => "description",
            auto_fixable: bool => "autoFixable",
            applies_to: Vec<String> => "appliesTo",
        }
        fill {
            rationale: String => "rationale",
        }
    }
}

entity_patch! {
    RuleExamplePatch for RuleExample {
        set {
            example_type: ExampleType => "exampleType",
            code: String => "code",
        }
        fill {
            explanation: String => "explanation",
        }
    }
}

entity_patch! {
    ZeroToleranceRulePatch for ZeroToleranceRule {
        set {
            detection_type: DetectionType => "detectionType",
            detection_pattern: String => "detectionPattern",
            auto_reject_pr: bool => "autoRejectPr",
        }
        fill {
            error_message: String => "errorMessage",
        }
    }
}

entity_patch! {
    ChecklistItemPatch for ChecklistItem {
        set {
            sequence_order: i64 => "sequenceOrder",
            check_description: String => "checkDescription",
            critical: bool => "critical",
        }
        fill {
            automation_tool: String => "automationTool",
        }
    }
}

entity_patch! {
    PackageStructurePatch for PackageStructure {
        set {
            path_pattern: String => "pathPattern",
        }
        fill {
            description: String => "description",
        }
    }
}

entity_patch! {
    PackagePurposePatch for PackagePurpose {
        set {
            code: String => "code",
            name: String => "name",
        }
        fill {
            description: String => "description",
        }
    }
}

entity_patch! {
    ClassTypeCategoryPatch for ClassTypeCategory {
        set {
            code: String => "code",
            name: String => "name",
            order_index: i64 => "orderIndex",
        }
        fill {}
    }
}

entity_patch! {
    ClassTypePatch for ClassType {
        set {
            code: String => "code",
            name: String => "name",
            order_index: i64 => "orderIndex",
        }
        fill {
            description: String => "description",
        }
    }
}

entity_patch! {
    ClassTemplatePatch for ClassTemplate {
        set {
            class_type_id: i64 => "classTypeId",
            template_code: String => "templateCode",
        }
        fill {
            naming_pattern: String => "namingPattern",
            description: String => "description",
        }
    }
}

entity_patch! {
    ArchUnitTestPatch for ArchUnitTest {
        set {
            code: String => "code",
            name: String => "name",
            test_code: String => "testCode",
        }
        fill {
            description: String => "description",
            severity: RuleSeverity => "severity",
        }
    }
}

entity_patch! {
    LayerDependencyRulePatch for LayerDependencyRule {
        set {
            from_layer: String => "fromLayer",
            to_layer: String => "toLayer",
            dependency_type: DependencyType => "dependencyType",
        }
        fill {
            condition_description: String => "conditionDescription",
        }
    }
}

entity_patch! {
    ResourceTemplatePatch for ResourceTemplate {
        set {
            category: String => "category",
            file_path: String => "filePath",
            file_type: String => "fileType",
            template_content: String => "templateContent",
            required: bool => "required",
        }
        fill {
            description: String => "description",
        }
    }
}

entity_patch! {
    ConfigFileTemplatePatch for ConfigFileTemplate {
        set {
            tool_type: String => "toolType",
            file_path: String => "filePath",
            file_name: String => "fileName",
            content: String => "content",
            required: bool => "required",
        }
        fill {
            architecture_id: i64 => "architectureId",
            category: String => "category",
            description: String => "description",
            variables: String => "variables",
            display_order: i64 => "displayOrder",
        }
    }
}

entity_patch! {
    OnboardingContextPatch for OnboardingContext {
        set {
            context_type: String => "contextType",
            title: String => "title",
            content: String => "content",
            priority: i64 => "priority",
        }
        fill {
            architecture_id: i64 => "architectureId",
        }
    }
}

// Feedback content is fixed once queued; review only moves the status along.
entity_patch! {
    FeedbackQueuePatch for FeedbackQueue {
        set {
            status: FeedbackStatus => "status",
        }
        fill {
            review_notes: String => "reviewNotes",
        }
    }
}
