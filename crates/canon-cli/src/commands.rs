// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "canon")]
#[command(about = "canon convention metadata operations CLI")]
pub struct Cli {
    /// Compact single-line JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[arg(long, global = true, default_value = "canon.sqlite")]
    pub db: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database if needed and apply the schema.
    Schema,
    /// Insert every record of a JSON fixture in one transaction.
    Import {
        #[arg(long)]
        fixture: PathBuf,
    },
    /// Print one cursor slice of an entity table.
    List {
        #[arg(value_enum)]
        entity: EntityArg,
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long, default_value_t = false)]
        include_deleted: bool,
    },
    /// Soft-delete one active row.
    Delete {
        #[arg(value_enum)]
        entity: EntityArg,
        id: i64,
    },
    /// Apply a JSON patch (camelCase attribute names) to one active row.
    Update {
        #[arg(value_enum)]
        entity: EntityArg,
        id: i64,
        #[arg(long)]
        patch: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
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
