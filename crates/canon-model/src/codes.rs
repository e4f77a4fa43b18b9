// SPDX-License-Identifier: Apache-2.0

use crate::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum TechStackStatus {
    Active,
    Deprecated,
    Archived,
}

impl TechStackStatus {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "ACTIVE" => Ok(Self::Active),
            "DEPRECATED" => Ok(Self::Deprecated),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(ValidationError::new(
                "status",
                "must be one of ACTIVE, DEPRECATED, ARCHIVED",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deprecated => "DEPRECATED",
            Self::Archived => "ARCHIVED",
        }
    }
}

/// Severity ladder shared by coding rules and arch-unit tests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RuleSeverity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
}

impl RuleSeverity {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "BLOCKER" => Ok(Self::Blocker),
            "CRITICAL" => Ok(Self::Critical),
            "MAJOR" => Ok(Self::Major),
            "MINOR" => Ok(Self::Minor),
            "INFO" => Ok(Self::Info),
            _ => Err(ValidationError::new(
                "severity",
                "must be one of BLOCKER, CRITICAL, MAJOR, MINOR, INFO",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER",
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ExampleType {
    Good,
    Bad,
}

impl ExampleType {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "GOOD" => Ok(Self::Good),
            "BAD" => Ok(Self::Bad),
            _ => Err(ValidationError::new("exampleType", "must be GOOD or BAD")),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Bad => "BAD",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum DetectionType {
    Regex,
    Ast,
    Archunit,
}

impl DetectionType {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "REGEX" => Ok(Self::Regex),
            "AST" => Ok(Self::Ast),
            "ARCHUNIT" => Ok(Self::Archunit),
            _ => Err(ValidationError::new(
                "detectionType",
                "must be one of REGEX, AST, ARCHUNIT",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "REGEX",
            Self::Ast => "AST",
            Self::Archunit => "ARCHUNIT",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum DependencyType {
    Allowed,
    Forbidden,
    Conditional,
}

impl DependencyType {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "ALLOWED" => Ok(Self::Allowed),
            "FORBIDDEN" => Ok(Self::Forbidden),
            "CONDITIONAL" => Ok(Self::Conditional),
            _ => Err(ValidationError::new(
                "dependencyType",
                "must be one of ALLOWED, FORBIDDEN, CONDITIONAL",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conditional => "CONDITIONAL",
        }
    }
}

/// Kind of convention row a feedback entry proposes to change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum FeedbackTargetType {
    CodingRule,
    RuleExample,
    ClassTemplate,
    ChecklistItem,
    ArchUnitTest,
}

impl FeedbackTargetType {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "CODING_RULE" => Ok(Self::CodingRule),
            "RULE_EXAMPLE" => Ok(Self::RuleExample),
            "CLASS_TEMPLATE" => Ok(Self::ClassTemplate),
            "CHECKLIST_ITEM" => Ok(Self::ChecklistItem),
            "ARCH_UNIT_TEST" => Ok(Self::ArchUnitTest),
            _ => Err(ValidationError::new(
                "targetType",
                "must be one of CODING_RULE, RULE_EXAMPLE, CLASS_TEMPLATE, CHECKLIST_ITEM, ARCH_UNIT_TEST",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodingRule => "CODING_RULE",
            Self::RuleExample => "RULE_EXAMPLE",
            Self::ClassTemplate => "CLASS_TEMPLATE",
            Self::ChecklistItem => "CHECKLIST_ITEM",
            Self::ArchUnitTest => "ARCH_UNIT_TEST",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum FeedbackType {
    Add,
    Modify,
    Delete,
}

impl FeedbackType {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "ADD" => Ok(Self::Add),
            "MODIFY" => Ok(Self::Modify),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ValidationError::new(
                "feedbackType",
                "must be one of ADD, MODIFY, DELETE",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Modify => "MODIFY",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RiskLevel {
    Safe,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "SAFE" => Ok(Self::Safe),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ValidationError::new(
                "riskLevel",
                "must be one of SAFE, MEDIUM, HIGH",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// SAFE feedback merges straight after LLM approval; anything riskier needs a human.
    #[must_use]
    pub const fn is_auto_mergeable(self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// Review pipeline state of a feedback entry.
///
/// `PENDING -> LLM_APPROVED | LLM_REJECTED`, then `LLM_APPROVED -> HUMAN_APPROVED |
/// HUMAN_REJECTED` for risky entries, and finally `MERGED`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum FeedbackStatus {
    Pending,
    LlmApproved,
    LlmRejected,
    HumanApproved,
    HumanRejected,
    Merged,
}

impl FeedbackStatus {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "PENDING" => Ok(Self::Pending),
            "LLM_APPROVED" => Ok(Self::LlmApproved),
            "LLM_REJECTED" => Ok(Self::LlmRejected),
            "HUMAN_APPROVED" => Ok(Self::HumanApproved),
            "HUMAN_REJECTED" => Ok(Self::HumanRejected),
            "MERGED" => Ok(Self::Merged),
            _ => Err(ValidationError::new(
                "status",
                "must be one of PENDING, LLM_APPROVED, LLM_REJECTED, HUMAN_APPROVED, HUMAN_REJECTED, MERGED",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::LlmApproved => "LLM_APPROVED",
            Self::LlmRejected => "LLM_REJECTED",
            Self::HumanApproved => "HUMAN_APPROVED",
            Self::HumanRejected => "HUMAN_REJECTED",
            Self::Merged => "MERGED",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::LlmRejected | Self::HumanRejected | Self::Merged)
    }

    /// Whether an entry of `risk` may move from `self` to `next`.
    #[must_use]
    pub const fn can_move_to(self, next: Self, risk: RiskLevel) -> bool {
        match (self, next) {
            (Self::Pending, Self::LlmApproved | Self::LlmRejected) => true,
            (Self::LlmApproved, Self::HumanApproved | Self::HumanRejected) => {
                !risk.is_auto_mergeable()
            }
            (Self::LlmApproved, Self::Merged) => risk.is_auto_mergeable(),
            (Self::HumanApproved, Self::Merged) => true,
            _ => false,
        }
    }
}
