// SPDX-License-Identifier: Apache-2.0

use crate::commands::EntityArg;
use canon_model::{
    ArchUnitTest, ArchUnitTestPatch, Architecture, ArchitecturePatch, ChecklistItem,
    ChecklistItemPatch, ClassTemplate, ClassTemplatePatch, ClassType, ClassTypeCategory,
    ClassTypeCategoryPatch, ClassTypePatch, CodingRule, CodingRulePatch, ConfigFileTemplate,
    ConfigFileTemplatePatch, Convention, ConventionPatch, CrudService, FeedbackQueue,
    FeedbackQueuePatch, Layer, LayerDependencyRule, LayerDependencyRulePatch, LayerPatch,
    LifecycleScope, Module, ModulePatch, OnboardingContext, OnboardingContextPatch,
    PackagePurpose, PackagePurposePatch, PackageStructure, PackageStructurePatch, Patch,
    ResourceTemplate, ResourceTemplatePatch, RuleExample, RuleExamplePatch, TechStack,
    TechStackPatch, Timestamp, ZeroToleranceRule, ZeroToleranceRulePatch,
};
use canon_query::{fetch_slice, Listed, QueryLimits, SliceCriteria};
use canon_store::{
    ensure_schema_version, import_fixture, load_fixture, open_readonly, open_readwrite,
    schema_version, SqlitePort,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_millis(800);

/// Binds `$e` to the entity type and `$p` to its patch type for `entity`.
macro_rules! with_entity {
    (@bind $entity:ty, $patch:ty, $e:ident, $p:ident, $body:expr) => {{
        #[allow(dead_code)]
        type $e = $entity;
        #[allow(dead_code)]
        type $p = $patch;
        $body
    }};
    ($entity:expr, |$e:ident, $p:ident| $body:expr) => {
        match $entity {
            EntityArg::TechStack => with_entity!(@bind TechStack, TechStackPatch, $e, $p, $body),
            EntityArg::Architecture => {
                with_entity!(@bind Architecture, ArchitecturePatch, $e, $p, $body)
            }
            EntityArg::Layer => with_entity!(@bind Layer, LayerPatch, $e, $p, $body),
            EntityArg::Module => with_entity!(@bind Module, ModulePatch, $e, $p, $body),
            EntityArg::Convention => with_entity!(@bind Convention, ConventionPatch, $e, $p, $body),
            EntityArg::CodingRule => with_entity!(@bind CodingRule, CodingRulePatch, $e, $p, $body),
            EntityArg::RuleExample => {
                with_entity!(@bind RuleExample, RuleExamplePatch, $e, $p, $body)
            }
            EntityArg::ZeroToleranceRule => {
                with_entity!(@bind ZeroToleranceRule, ZeroToleranceRulePatch, $e, $p, $body)
            }
            EntityArg::ChecklistItem => {
                with_entity!(@bind ChecklistItem, ChecklistItemPatch, $e, $p, $body)
            }
            EntityArg::PackageStructure => {
                with_entity!(@bind PackageStructure, PackageStructurePatch, $e, $p, $body)
            }
            EntityArg::PackagePurpose => {
                with_entity!(@bind PackagePurpose, PackagePurposePatch, $e, $p, $body)
            }
            EntityArg::ClassTypeCategory => {
                with_entity!(@bind ClassTypeCategory, ClassTypeCategoryPatch, $e, $p, $body)
            }
            EntityArg::ClassType => with_entity!(@bind ClassType, ClassTypePatch, $e, $p, $body),
            EntityArg::ClassTemplate => {
                with_entity!(@bind ClassTemplate, ClassTemplatePatch, $e, $p, $body)
            }
            EntityArg::ArchUnitTest => {
                with_entity!(@bind ArchUnitTest, ArchUnitTestPatch, $e, $p, $body)
            }
            EntityArg::LayerDependencyRule => {
                with_entity!(@bind LayerDependencyRule, LayerDependencyRulePatch, $e, $p, $body)
            }
            EntityArg::ResourceTemplate => {
                with_entity!(@bind ResourceTemplate, ResourceTemplatePatch, $e, $p, $body)
            }
            EntityArg::ConfigFileTemplate => {
                with_entity!(@bind ConfigFileTemplate, ConfigFileTemplatePatch, $e, $p, $body)
            }
            EntityArg::OnboardingContext => {
                with_entity!(@bind OnboardingContext, OnboardingContextPatch, $e, $p, $body)
            }
            EntityArg::FeedbackQueue => {
                with_entity!(@bind FeedbackQueue, FeedbackQueuePatch, $e, $p, $body)
            }
        }
    };
}

fn open_existing(db: &Path) -> Result<Connection, String> {
    let conn = open_readonly(db, BUSY_TIMEOUT).map_err(|e| format!("open {}: {e}", db.display()))?;
    ensure_schema_version(&conn).map_err(|e| e.to_string())?;
    Ok(conn)
}

pub fn schema(db: &Path) -> Result<Value, String> {
    let conn = open_readwrite(db).map_err(|e| e.to_string())?;
    let version = schema_version(&conn).map_err(|e| e.to_string())?;
    info!(db = %db.display(), version, "schema applied");
    Ok(json!({"db": db.display().to_string(), "schemaVersion": version}))
}

pub fn import(db: &Path, fixture: &Path, now: Timestamp) -> Result<Value, String> {
    let fixture = load_fixture(fixture).map_err(|e| e.to_string())?;
    let mut conn = open_readwrite(db).map_err(|e| e.to_string())?;
    let report = import_fixture(&mut conn, &fixture, now).map_err(|e| e.to_string())?;
    let total = report.total();
    info!(total, "fixture imported");
    Ok(json!({"inserted": report.inserted, "total": total}))
}

pub struct ListArgs<'a> {
    pub size: Option<usize>,
    pub cursor: Option<&'a str>,
    pub include_deleted: bool,
}

fn list_slice<E: Listed>(conn: &Connection, args: &ListArgs<'_>) -> Result<Value, String> {
    let lifecycle = if args.include_deleted {
        LifecycleScope::IncludeDeleted
    } else {
        LifecycleScope::ActiveOnly
    };
    let criteria = SliceCriteria::from_request(
        args.cursor,
        args.size,
        E::Filter::default(),
        &QueryLimits::default(),
    )
    .map_err(|e| e.to_string())?
    .with_lifecycle(lifecycle);
    let slice = fetch_slice::<E, E::Filter>(conn, &criteria).map_err(|e| e.to_string())?;
    serde_json::to_value(slice).map_err(|e| e.to_string())
}

pub fn list(db: &Path, entity: EntityArg, args: &ListArgs<'_>) -> Result<Value, String> {
    let conn = open_existing(db)?;
    with_entity!(entity, |E, P| list_slice::<E>(&conn, args))
}

pub fn delete(db: &Path, entity: EntityArg, id: i64, now: Timestamp) -> Result<Value, String> {
    let conn = open_readwrite(db).map_err(|e| e.to_string())?;
    let port = SqlitePort::new(&conn);
    let service = CrudService::new(&port);
    let deleted = with_entity!(entity, |E, P| {
        let stored = service.soft_delete::<E>(id, now).map_err(|e| e.to_string())?;
        serde_json::to_value(stored).map_err(|e| e.to_string())?
    });
    info!(?entity, id, "row soft-deleted");
    Ok(deleted)
}

fn update_row<E, X>(
    service: &CrudService<'_, SqlitePort<'_>>,
    id: i64,
    raw_patch: &str,
    now: Timestamp,
) -> Result<Value, String>
where
    E: canon_store::Table,
    X: Patch<E> + serde::de::DeserializeOwned,
{
    let patch: X = serde_json::from_str(raw_patch).map_err(|e| format!("invalid patch: {e}"))?;
    let outcome = service
        .update::<E, X>(id, patch, now)
        .map_err(|e| e.to_string())?;
    Ok(json!({"entity": outcome.stored, "changed": outcome.changed}))
}

pub fn update(
    db: &Path,
    entity: EntityArg,
    id: i64,
    raw_patch: &str,
    now: Timestamp,
) -> Result<Value, String> {
    let conn = open_readwrite(db).map_err(|e| e.to_string())?;
    let port = SqlitePort::new(&conn);
    let service = CrudService::new(&port);
    let updated = with_entity!(entity, |E, P| update_row::<E, P>(&service, id, raw_patch, now))?;
    info!(?entity, id, "row updated");
    Ok(updated)
}
