//! Migration plan: which tables to copy, and in what order.
//!
//! The order is a configuration-level constant, not discovered at runtime.
//! Each table declares the tables it references, and plan construction
//! verifies that every parent appears before its children, so the declared
//! order is checkable rather than merely asserted.

use crate::error::{MigrateError, Result};

/// One table in the plan.
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Table name on both stores.
    pub name: String,

    /// Tables this one references; all must appear earlier in the plan.
    pub depends_on: Vec<String>,

    /// Whether the table has a serial integer `id` whose sequence must be
    /// resynchronized after the copy.
    pub resync_sequence: bool,
}

impl TableSpec {
    pub fn new(name: &str, depends_on: &[&str], resync_sequence: bool) -> Self {
        Self {
            name: name.to_string(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            resync_sequence,
        }
    }
}

/// Ordered, dependency-validated list of tables to migrate.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    tables: Vec<TableSpec>,
}

impl MigrationPlan {
    /// Build a plan, verifying that names are unique and that every
    /// dependency is a declared table appearing earlier in the list.
    pub fn new(tables: Vec<TableSpec>) -> Result<Self> {
        let mut seen: Vec<&str> = Vec::with_capacity(tables.len());
        for spec in &tables {
            if seen.contains(&spec.name.as_str()) {
                return Err(MigrateError::Plan(format!(
                    "table '{}' declared twice",
                    spec.name
                )));
            }
            for dep in &spec.depends_on {
                if !seen.contains(&dep.as_str()) {
                    return Err(MigrateError::Plan(format!(
                        "table '{}' depends on '{}', which is not declared before it",
                        spec.name, dep
                    )));
                }
            }
            seen.push(&spec.name);
        }
        Ok(Self { tables })
    }

    /// The fixed production plan for the billard ranking schema.
    pub fn standard() -> Self {
        // Order mirrors the schema's foreign keys: referenced tables first.
        let tables = vec![
            TableSpec::new("users", &[], true),
            TableSpec::new("categories", &[], true),
            TableSpec::new("players", &["categories"], false),
            TableSpec::new("clubs", &[], true),
            TableSpec::new("tournaments", &["clubs"], true),
            TableSpec::new("tournament_results", &["tournaments", "players"], true),
            TableSpec::new("rankings", &["players", "categories"], true),
            TableSpec::new("calendar", &[], true),
            TableSpec::new("tournoi_ext", &[], false),
            TableSpec::new("inscriptions", &["tournaments", "players"], false),
        ];
        Self::new(tables).expect("standard plan is dependency-ordered")
    }

    /// Tables in migration order.
    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    /// Table names in migration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Names of the tables whose `id` sequence is resynchronized after the
    /// copy, in plan order.
    pub fn sequence_tables(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| t.resync_sequence)
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plan_order() {
        let plan = MigrationPlan::standard();
        assert_eq!(
            plan.table_names(),
            vec![
                "users",
                "categories",
                "players",
                "clubs",
                "tournaments",
                "tournament_results",
                "rankings",
                "calendar",
                "tournoi_ext",
                "inscriptions",
            ]
        );
    }

    #[test]
    fn test_standard_sequence_tables() {
        let plan = MigrationPlan::standard();
        assert_eq!(
            plan.sequence_tables(),
            vec![
                "users",
                "categories",
                "clubs",
                "tournaments",
                "tournament_results",
                "rankings",
                "calendar",
            ]
        );
    }

    #[test]
    fn test_child_before_parent_rejected() {
        let result = MigrationPlan::new(vec![
            TableSpec::new("tournaments", &["clubs"], true),
            TableSpec::new("clubs", &[], true),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let result = MigrationPlan::new(vec![TableSpec::new("rankings", &["players"], true)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let result = MigrationPlan::new(vec![
            TableSpec::new("users", &[], true),
            TableSpec::new("users", &[], true),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let result = MigrationPlan::new(vec![TableSpec::new("users", &["users"], true)]);
        assert!(result.is_err());
    }
}
