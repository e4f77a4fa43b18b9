// SPDX-License-Identifier: Apache-2.0

use crate::port::SqlitePort;
use crate::table::Table;
use crate::StoreError;
use canon_model::{
    ArchUnitTest, Architecture, ChecklistItem, ClassTemplate, ClassType, ClassTypeCategory,
    CodingRule, ConfigFileTemplate, Convention, CrudService, EntityKind, FeedbackQueue, Layer,
    LayerDependencyRule, Module, OnboardingContext, PackagePurpose, PackageStructure,
    ResourceTemplate, RuleExample, TechStack, Timestamp, ZeroToleranceRule,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Seed document: one array of creation drafts per entity type.
///
/// Rows are inserted parents first, each array in file order, so a fresh database assigns
/// ids `1..n` per table and drafts may reference parents by those ids.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub tech_stacks: Vec<TechStack>,
    #[serde(default)]
    pub architectures: Vec<Architecture>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub conventions: Vec<Convention>,
    #[serde(default)]
    pub coding_rules: Vec<CodingRule>,
    #[serde(default)]
    pub rule_examples: Vec<RuleExample>,
    #[serde(default)]
    pub zero_tolerance_rules: Vec<ZeroToleranceRule>,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistItem>,
    #[serde(default)]
    pub package_structures: Vec<PackageStructure>,
    #[serde(default)]
    pub package_purposes: Vec<PackagePurpose>,
    #[serde(default)]
    pub class_type_categories: Vec<ClassTypeCategory>,
    #[serde(default)]
    pub class_types: Vec<ClassType>,
    #[serde(default)]
    pub class_templates: Vec<ClassTemplate>,
    #[serde(default)]
    pub arch_unit_tests: Vec<ArchUnitTest>,
    #[serde(default)]
    pub layer_dependency_rules: Vec<LayerDependencyRule>,
    #[serde(default)]
    pub resource_templates: Vec<ResourceTemplate>,
    #[serde(default)]
    pub config_file_templates: Vec<ConfigFileTemplate>,
    #[serde(default)]
    pub onboarding_contexts: Vec<OnboardingContext>,
    #[serde(default)]
    pub feedback_queue: Vec<FeedbackQueue>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: BTreeMap<EntityKind, usize>,
}

impl ImportReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.inserted.values().sum()
    }
}

pub fn load_fixture(path: &Path) -> Result<Fixture, StoreError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Inserts every fixture row through [`CrudService`] inside one transaction.
pub fn import_fixture(
    conn: &mut Connection,
    fixture: &Fixture,
    now: Timestamp,
) -> Result<ImportReport, StoreError> {
    let tx = conn.transaction()?;
    let mut report = ImportReport::default();
    {
        let port = SqlitePort::new(&tx);
        let service = CrudService::new(&port);
        create_all(&service, &fixture.tech_stacks, now, &mut report)?;
        create_all(&service, &fixture.architectures, now, &mut report)?;
        create_all(&service, &fixture.layers, now, &mut report)?;
        create_all(&service, &fixture.modules, now, &mut report)?;
        create_all(&service, &fixture.conventions, now, &mut report)?;
        create_all(&service, &fixture.coding_rules, now, &mut report)?;
        create_all(&service, &fixture.rule_examples, now, &mut report)?;
        create_all(&service, &fixture.zero_tolerance_rules, now, &mut report)?;
        create_all(&service, &fixture.checklist_items, now, &mut report)?;
        create_all(&service, &fixture.package_structures, now, &mut report)?;
        create_all(&service, &fixture.package_purposes, now, &mut report)?;
        create_all(&service, &fixture.class_type_categories, now, &mut report)?;
        create_all(&service, &fixture.class_types, now, &mut report)?;
        create_all(&service, &fixture.class_templates, now, &mut report)?;
        create_all(&service, &fixture.arch_unit_tests, now, &mut report)?;
        create_all(&service, &fixture.layer_dependency_rules, now, &mut report)?;
        create_all(&service, &fixture.resource_templates, now, &mut report)?;
        create_all(&service, &fixture.config_file_templates, now, &mut report)?;
        create_all(&service, &fixture.onboarding_contexts, now, &mut report)?;
        create_all(&service, &fixture.feedback_queue, now, &mut report)?;
    }
    tx.commit()?;
    info!(rows = report.total(), "fixture import complete");
    Ok(report)
}

fn create_all<E: Table>(
    service: &CrudService<'_, SqlitePort<'_>>,
    drafts: &[E],
    now: Timestamp,
    report: &mut ImportReport,
) -> Result<(), StoreError> {
    for (index, draft) in drafts.iter().enumerate() {
        service
            .create(draft, now)
            .map_err(|source| StoreError::Import {
                kind: E::KIND,
                index,
                source,
            })?;
    }
    if !drafts.is_empty() {
        report.inserted.insert(E::KIND, drafts.len());
    }
    Ok(())
}
