// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

pub const SQLITE_SCHEMA_VERSION: i64 = 2;

// Business keys are unique among active rows only; a soft-deleted row frees its key.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS tech_stack (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  status TEXT NOT NULL,
  language_type TEXT NOT NULL,
  language_version TEXT NOT NULL,
  framework_type TEXT NOT NULL,
  framework_version TEXT NOT NULL,
  build_tool_type TEXT NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_tech_stack_name ON tech_stack(name) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS architecture (
  id INTEGER PRIMARY KEY,
  tech_stack_id INTEGER NOT NULL REFERENCES tech_stack(id),
  name TEXT NOT NULL,
  pattern_type TEXT NOT NULL,
  pattern_description TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_architecture_key ON architecture(tech_stack_id, name) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS layer (
  id INTEGER PRIMARY KEY,
  architecture_id INTEGER NOT NULL REFERENCES architecture(id),
  code TEXT NOT NULL,
  name TEXT NOT NULL,
  description TEXT,
  order_index INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_layer_key ON layer(architecture_id, code) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS ix_layer_order ON layer(order_index, id);

CREATE TABLE IF NOT EXISTS module (
  id INTEGER PRIMARY KEY,
  layer_id INTEGER NOT NULL REFERENCES layer(id),
  parent_module_id INTEGER REFERENCES module(id),
  name TEXT NOT NULL,
  description TEXT,
  module_path TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_module_key ON module(layer_id, name) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS convention (
  id INTEGER PRIMARY KEY,
  module_id INTEGER NOT NULL REFERENCES module(id),
  version TEXT NOT NULL,
  description TEXT,
  active INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_convention_key ON convention(module_id, version) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS coding_rule (
  id INTEGER PRIMARY KEY,
  convention_id INTEGER NOT NULL REFERENCES convention(id),
  code TEXT NOT NULL,
  name TEXT NOT NULL,
  severity TEXT NOT NULL,
  category TEXT NOT NULL,
  description TEXT NOT NULL,
  rationale TEXT,
  auto_fixable INTEGER NOT NULL,
  applies_to TEXT NOT NULL DEFAULT '',
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_coding_rule_key ON coding_rule(convention_id, code) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS rule_example (
  id INTEGER PRIMARY KEY,
  rule_id INTEGER NOT NULL REFERENCES coding_rule(id),
  example_type TEXT NOT NULL,
  code TEXT NOT NULL,
  explanation TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS ix_rule_example_rule ON rule_example(rule_id, id);

CREATE TABLE IF NOT EXISTS zero_tolerance_rule (
  id INTEGER PRIMARY KEY,
  rule_id INTEGER NOT NULL REFERENCES coding_rule(id),
  detection_type TEXT NOT NULL,
  detection_pattern TEXT NOT NULL,
  auto_reject_pr INTEGER NOT NULL,
  error_message TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_zero_tolerance_rule_key ON zero_tolerance_rule(rule_id) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS checklist_item (
  id INTEGER PRIMARY KEY,
  rule_id INTEGER NOT NULL REFERENCES coding_rule(id),
  sequence_order INTEGER NOT NULL,
  check_description TEXT NOT NULL,
  automation_tool TEXT,
  critical INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_checklist_item_key ON checklist_item(rule_id, sequence_order) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS package_structure (
  id INTEGER PRIMARY KEY,
  module_id INTEGER NOT NULL REFERENCES module(id),
  path_pattern TEXT NOT NULL,
  description TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_package_structure_key ON package_structure(module_id, path_pattern) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS package_purpose (
  id INTEGER PRIMARY KEY,
  structure_id INTEGER NOT NULL REFERENCES package_structure(id),
  code TEXT NOT NULL,
  name TEXT NOT NULL,
  description TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_package_purpose_key ON package_purpose(structure_id, code) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS class_type_category (
  id INTEGER PRIMARY KEY,
  architecture_id INTEGER NOT NULL REFERENCES architecture(id),
  code TEXT NOT NULL,
  name TEXT NOT NULL,
  order_index INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_class_type_category_key ON class_type_category(architecture_id, code) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS ix_class_type_category_order ON class_type_category(order_index, id);

CREATE TABLE IF NOT EXISTS class_type (
  id INTEGER PRIMARY KEY,
  category_id INTEGER NOT NULL REFERENCES class_type_category(id),
  code TEXT NOT NULL,
  name TEXT NOT NULL,
  description TEXT,
  order_index INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_class_type_key ON class_type(category_id, code) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS ix_class_type_order ON class_type(order_index, id);

CREATE TABLE IF NOT EXISTS class_template (
  id INTEGER PRIMARY KEY,
  structure_id INTEGER NOT NULL REFERENCES package_structure(id),
  class_type_id INTEGER NOT NULL REFERENCES class_type(id),
  template_code TEXT NOT NULL,
  naming_pattern TEXT,
  description TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_class_template_key ON class_template(structure_id, class_type_id) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS arch_unit_test (
  id INTEGER PRIMARY KEY,
  structure_id INTEGER NOT NULL REFERENCES package_structure(id),
  code TEXT NOT NULL,
  name TEXT NOT NULL,
  description TEXT,
  test_code TEXT NOT NULL,
  severity TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_arch_unit_test_key ON arch_unit_test(structure_id, code) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS layer_dependency_rule (
  id INTEGER PRIMARY KEY,
  architecture_id INTEGER NOT NULL REFERENCES architecture(id),
  from_layer TEXT NOT NULL,
  to_layer TEXT NOT NULL,
  dependency_type TEXT NOT NULL,
  condition_description TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_layer_dependency_rule_key ON layer_dependency_rule(architecture_id, from_layer, to_layer) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS resource_template (
  id INTEGER PRIMARY KEY,
  module_id INTEGER NOT NULL REFERENCES module(id),
  category TEXT NOT NULL,
  file_path TEXT NOT NULL,
  file_type TEXT NOT NULL,
  description TEXT,
  template_content TEXT NOT NULL DEFAULT '',
  required INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_resource_template_key ON resource_template(module_id, file_path) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS config_file_template (
  id INTEGER PRIMARY KEY,
  tech_stack_id INTEGER NOT NULL REFERENCES tech_stack(id),
  architecture_id INTEGER REFERENCES architecture(id),
  tool_type TEXT NOT NULL,
  file_path TEXT NOT NULL,
  file_name TEXT NOT NULL,
  content TEXT NOT NULL,
  category TEXT,
  description TEXT,
  variables TEXT,
  display_order INTEGER,
  required INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_config_file_template_key ON config_file_template(tech_stack_id, tool_type, file_path, file_name) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS onboarding_context (
  id INTEGER PRIMARY KEY,
  tech_stack_id INTEGER NOT NULL REFERENCES tech_stack(id),
  architecture_id INTEGER REFERENCES architecture(id),
  context_type TEXT NOT NULL,
  title TEXT NOT NULL,
  content TEXT NOT NULL,
  priority INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS ix_onboarding_context_order ON onboarding_context(priority, id);

CREATE TABLE IF NOT EXISTS feedback_queue (
  id INTEGER PRIMARY KEY,
  target_type TEXT NOT NULL,
  target_id INTEGER,
  feedback_type TEXT NOT NULL,
  payload TEXT NOT NULL,
  status TEXT NOT NULL,
  risk_level TEXT NOT NULL,
  review_notes TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS ix_feedback_queue_status ON feedback_queue(status, id);
";

/// Creates every table and index if missing and stamps the schema version.
pub fn apply_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

pub fn ensure_schema_version(conn: &Connection) -> Result<(), StoreError> {
    let found = schema_version(conn)?;
    if found != SQLITE_SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion {
            found,
            expected: SQLITE_SCHEMA_VERSION,
        });
    }
    Ok(())
}

/// Opens (creating if needed) a writable database with the schema applied.
pub fn open_readwrite(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
    apply_schema(&conn)?;
    Ok(conn)
}

pub fn open_readonly(path: &Path, busy_timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA query_only=ON; PRAGMA temp_store=MEMORY;")?;
    Ok(conn)
}
