use crate::store::HrStore;
use crate::DbError;
use serde::Serialize;

/// Every table the cleanup empties, children before parents so no foreign
/// key blocks a delete. User logins are kept.
pub const CLEANUP_TABLES: &[&str] = &[
    "audit_logs",
    "onboarding_submissions",
    "onboarding_forms",
    "onboarding_workflows",
    "signature_requests",
    "extra_pay_requests",
    "extra_pay_contracts",
    "employee_accounts",
    "pafs",
    "payroll_records",
    "timecards",
    "leave_requests",
    "leave_types",
    "workflow_templates",
    "employees",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCleanup {
    pub table: String,
    pub rows_deleted: u64,
}

/// Outcome of a cleanup run. Failures on individual tables are collected
/// rather than aborting the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub rows_deleted: u64,
    pub tables: Vec<TableCleanup>,
    pub errors: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Empties all business tables.
pub async fn run_cleanup(store: &dyn HrStore) -> CleanupReport {
    clear_tables(store, CLEANUP_TABLES).await
}

/// Empties `tables` in order. A table that does not exist is skipped.
pub async fn clear_tables(store: &dyn HrStore, tables: &[&str]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for table in tables {
        match store.delete_all_rows(table).await {
            Ok(rows) => {
                tracing::debug!(table, rows, "Cleared table.");
                report.rows_deleted += rows;
                report.tables.push(TableCleanup {
                    table: table.to_string(),
                    rows_deleted: rows,
                });
            }
            Err(DbError::MissingTable(_)) => {
                tracing::debug!(table, "Table does not exist, skipping.");
            }
            Err(e) => {
                tracing::warn!(table, error = %e, "Failed to clear table.");
                report.errors.push(format!("{table}: {e}"));
            }
        }
    }

    tracing::info!(
        rows_deleted = report.rows_deleted,
        failures = report.errors.len(),
        "Cleanup finished."
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRepository;
    use chrono::NaiveDate;
    use core_types::{EmployeeStatus, NewEmployee, NewLeaveType};

    async fn seeded_store() -> InMemoryRepository {
        let store = InMemoryRepository::new();
        store
            .create_employee(&NewEmployee {
                employee_number: "E-9".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@district.example".to_string(),
                phone: None,
                department: "Math".to_string(),
                position: "Teacher".to_string(),
                employee_type: "certificated".to_string(),
                hire_date: NaiveDate::from_ymd_opt(2024, 8, 19).unwrap(),
                salary: None,
                status: EmployeeStatus::Active,
                user_id: None,
            })
            .await
            .unwrap();
        store
            .create_leave_type(&NewLeaveType {
                name: "Sick".to_string(),
                description: None,
                max_days: Some(10),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn cleanup_empties_every_table_and_is_idempotent() {
        let store = seeded_store().await;

        let first = run_cleanup(&store).await;
        assert!(first.is_clean());
        // One employee, their default time card and one leave type.
        assert_eq!(first.rows_deleted, 3);
        assert_eq!(first.tables.len(), CLEANUP_TABLES.len());

        let second = run_cleanup(&store).await;
        assert!(second.is_clean());
        assert_eq!(second.rows_deleted, 0);
        assert!(store.list_employees().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_tables_are_skipped_silently() {
        let store = seeded_store().await;
        let report = clear_tables(&store, &["legacy_documents", "leave_types"]).await;

        assert!(report.is_clean());
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].table, "leave_types");
        assert_eq!(report.rows_deleted, 1);
    }
}
