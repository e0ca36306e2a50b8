use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Counters shown on the HR landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_employees: i64,
    pub active_employees: i64,
    pub pending_leave_requests: i64,
    /// Cards somewhere between secretary submission and payroll.
    pub timecards_in_approval: i64,
    pub pending_extra_pay_requests: i64,
    pub open_pafs: i64,
    pub pending_signatures: i64,
}
