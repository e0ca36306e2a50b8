use crate::store::{HrStore, TransitionInput};
use crate::DbError;
use async_trait::async_trait;
use core_types::{
    AccessLevel, AccountAction, AuditFilter, AuditLog, DashboardStats, Employee,
    EmployeeAccount, EmployeeUpdate, ExtraPayAction, ExtraPayContract, ExtraPayContractUpdate,
    ExtraPayRequest, LeaveAction, LeaveRequest, LeaveType, NewAuditLog, NewEmployee,
    NewEmployeeAccount, NewExtraPayContract, NewExtraPayRequest, NewLeaveRequest, NewLeaveType,
    NewOnboardingForm, NewOnboardingSubmission, NewOnboardingWorkflow, NewPaf,
    NewPayrollRecord, NewSignatureRequest, NewTimeCard, NewUser, NewWorkflowTemplate,
    OnboardingForm, OnboardingFormUpdate, OnboardingSubmission, OnboardingWorkflow,
    OnboardingWorkflowUpdate, Paf, PafAction, PafStatus, PafUpdate, PayrollAction,
    PayrollRecord, SignatureAction, SignatureRequest, StatusTransition, SubmissionStatus,
    TimeCard, TimeCardUpdate, TimecardAction, User, WorkflowTemplate, WorkflowTemplateUpdate,
    enums::labels, paf::EDITABLE_PAF_STATUSES, timecard::EDITABLE_TIMECARD_STATUSES,
    workflow::number_steps,
};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::types::Json;

/// The PostgreSQL implementation of [`HrStore`]. It encapsulates all SQL
/// queries; handlers never see a query string.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// Builds the conditional update shared by every status change.
///
/// Binds: `$1` id, `$2` allowed current statuses (`text[]`), `$3` target
/// status. `set` may use `$4` onwards.
fn transition_sql(table: &str, set: &str, extra_where: &str) -> String {
    let set = if set.is_empty() { String::new() } else { format!(", {set}") };
    format!(
        "UPDATE {table} SET status = $3{set}, updated_at = NOW() \
         WHERE id = $1 AND status = ANY($2){extra_where} RETURNING *"
    )
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn delete_by_id(&self, table: &str, id: i64) -> Result<bool, DbError> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HrStore for DbRepository {
    // ==========================================================================
    // Users
    // ==========================================================================

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, new: &NewUser, password_hash: &str) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new.username)
        .bind(password_hash)
        .bind(&new.full_name)
        .bind(new.email.as_deref())
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("users", id).await
    }

    // ==========================================================================
    // Employees
    // ==========================================================================

    async fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees ORDER BY last_name, first_name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn get_employee(&self, id: i64) -> Result<Option<Employee>, DbError> {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    /// Saves the employee and their first time card within a single transaction.
    async fn create_employee(&self, new: &NewEmployee) -> Result<Employee, DbError> {
        let mut tx = self.pool.begin().await?;

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (
                employee_number, first_name, last_name, email, phone, department,
                position, employee_type, hire_date, salary, status, user_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&new.employee_number)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(new.phone.as_deref())
        .bind(&new.department)
        .bind(&new.position)
        .bind(&new.employee_type)
        .bind(new.hire_date)
        .bind(new.salary)
        .bind(new.status.as_str())
        .bind(new.user_id)
        .fetch_one(&mut *tx) // Note: must use the transaction object `tx` here
        .await?;

        let card = NewTimeCard::default_for(employee.id, employee.hire_date);
        sqlx::query(
            "INSERT INTO timecards (employee_id, week_start, regular_hours, overtime_hours) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(card.employee_id)
        .bind(card.week_start)
        .bind(card.regular_hours)
        .bind(card.overtime_hours)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: i64,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, DbError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                department = COALESCE($6, department),
                position = COALESCE($7, position),
                employee_type = COALESCE($8, employee_type),
                salary = COALESCE($9, salary),
                status = COALESCE($10, status),
                user_id = COALESCE($11, user_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.email.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.department.as_deref())
        .bind(update.position.as_deref())
        .bind(update.employee_type.as_deref())
        .bind(update.salary)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn delete_employee(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("employees", id).await
    }

    // ==========================================================================
    // Leave
    // ==========================================================================

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, DbError> {
        let types = sqlx::query_as::<_, LeaveType>("SELECT * FROM leave_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    async fn create_leave_type(&self, new: &NewLeaveType) -> Result<LeaveType, DbError> {
        let leave_type = sqlx::query_as::<_, LeaveType>(
            "INSERT INTO leave_types (name, description, max_days) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&new.name)
        .bind(new.description.as_deref())
        .bind(new.max_days)
        .fetch_one(&self.pool)
        .await?;
        Ok(leave_type)
    }

    async fn delete_leave_type(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("leave_types", id).await
    }

    async fn list_leave_requests(&self) -> Result<Vec<LeaveRequest>, DbError> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn list_leave_requests_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<LeaveRequest>, DbError> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests WHERE employee_id = $1 ORDER BY start_date DESC, id DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn get_leave_request(&self, id: i64) -> Result<Option<LeaveRequest>, DbError> {
        let request =
            sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(request)
    }

    async fn create_leave_request(&self, new: &NewLeaveRequest) -> Result<LeaveRequest, DbError> {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO leave_requests (employee_id, leave_type_id, start_date, end_date, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.employee_id)
        .bind(new.leave_type_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.reason.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn transition_leave_request(
        &self,
        id: i64,
        action: LeaveAction,
        input: &TransitionInput,
    ) -> Result<Option<LeaveRequest>, DbError> {
        let sql = transition_sql(
            "leave_requests",
            "reviewed_by = $4, reviewed_at = NOW(), review_notes = $5",
            "",
        );
        let request = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str())
            .bind(input.actor_id)
            .bind(input.note.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn delete_leave_request(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("leave_requests", id).await
    }

    // ==========================================================================
    // Time cards
    // ==========================================================================

    async fn list_timecards(&self) -> Result<Vec<TimeCard>, DbError> {
        let cards = sqlx::query_as::<_, TimeCard>(
            "SELECT * FROM timecards ORDER BY week_start DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }

    async fn list_timecards_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<TimeCard>, DbError> {
        let cards = sqlx::query_as::<_, TimeCard>(
            "SELECT * FROM timecards WHERE employee_id = $1 ORDER BY week_start DESC, id DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }

    async fn get_timecard(&self, id: i64) -> Result<Option<TimeCard>, DbError> {
        let card = sqlx::query_as::<_, TimeCard>("SELECT * FROM timecards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(card)
    }

    async fn create_timecard(&self, new: &NewTimeCard) -> Result<TimeCard, DbError> {
        let card = sqlx::query_as::<_, TimeCard>(
            r#"
            INSERT INTO timecards (employee_id, week_start, regular_hours, overtime_hours, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.employee_id)
        .bind(new.week_start)
        .bind(new.regular_hours)
        .bind(new.overtime_hours)
        .bind(new.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(card)
    }

    async fn update_timecard(
        &self,
        id: i64,
        update: &TimeCardUpdate,
    ) -> Result<Option<TimeCard>, DbError> {
        let card = sqlx::query_as::<_, TimeCard>(
            r#"
            UPDATE timecards SET
                regular_hours = COALESCE($2, regular_hours),
                overtime_hours = COALESCE($3, overtime_hours),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.regular_hours)
        .bind(update.overtime_hours)
        .bind(update.notes.as_deref())
        .bind(labels(EDITABLE_TIMECARD_STATUSES))
        .fetch_optional(&self.pool)
        .await?;
        Ok(card)
    }

    async fn transition_timecard(
        &self,
        id: i64,
        action: TimecardAction,
        input: &TransitionInput,
    ) -> Result<Option<TimeCard>, DbError> {
        let sql = match action {
            TimecardAction::Submit => transition_sql(
                "timecards",
                "submitted_by = $4, submitted_at = NOW(), rejection_reason = NULL, \
                 employee_approved_at = NULL, admin_approved_by = NULL, admin_approved_at = NULL",
                "",
            ),
            TimecardAction::EmployeeApprove => {
                transition_sql("timecards", "employee_approved_at = NOW()", "")
            }
            TimecardAction::AdminApprove => transition_sql(
                "timecards",
                "admin_approved_by = $4, admin_approved_at = NOW()",
                "",
            ),
            TimecardAction::PayrollProcess => transition_sql(
                "timecards",
                "payroll_processed_by = $4, payroll_processed_at = NOW()",
                "",
            ),
            TimecardAction::Reject => transition_sql("timecards", "rejection_reason = $4", ""),
        };

        let query = sqlx::query_as::<_, TimeCard>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str());
        let query = match action {
            TimecardAction::EmployeeApprove => query,
            TimecardAction::Reject => query.bind(input.note.as_deref()),
            _ => query.bind(input.actor_id),
        };
        let card = query.fetch_optional(&self.pool).await?;
        Ok(card)
    }

    async fn delete_timecard(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("timecards", id).await
    }

    // ==========================================================================
    // Payroll
    // ==========================================================================

    async fn list_payroll_records(&self) -> Result<Vec<PayrollRecord>, DbError> {
        let records = sqlx::query_as::<_, PayrollRecord>(
            "SELECT * FROM payroll_records ORDER BY pay_period_end DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn list_payroll_records_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<PayrollRecord>, DbError> {
        let records = sqlx::query_as::<_, PayrollRecord>(
            "SELECT * FROM payroll_records WHERE employee_id = $1 \
             ORDER BY pay_period_end DESC, id DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn get_payroll_record(&self, id: i64) -> Result<Option<PayrollRecord>, DbError> {
        let record =
            sqlx::query_as::<_, PayrollRecord>("SELECT * FROM payroll_records WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    async fn create_payroll_record(
        &self,
        new: &NewPayrollRecord,
    ) -> Result<PayrollRecord, DbError> {
        let record = sqlx::query_as::<_, PayrollRecord>(
            r#"
            INSERT INTO payroll_records (
                employee_id, pay_period_start, pay_period_end, gross_pay, deductions, net_pay
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.employee_id)
        .bind(new.pay_period_start)
        .bind(new.pay_period_end)
        .bind(new.gross_pay)
        .bind(new.deductions)
        .bind(new.resolved_net_pay())
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn transition_payroll_record(
        &self,
        id: i64,
        action: PayrollAction,
    ) -> Result<Option<PayrollRecord>, DbError> {
        let set = match action {
            PayrollAction::Process => "processed_at = NOW()",
            PayrollAction::MarkPaid => "paid_at = NOW()",
        };
        let sql = transition_sql("payroll_records", set, "");
        let record = sqlx::query_as::<_, PayrollRecord>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn delete_payroll_record(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("payroll_records", id).await
    }

    // ==========================================================================
    // Extra pay
    // ==========================================================================

    async fn list_extra_pay_contracts(&self) -> Result<Vec<ExtraPayContract>, DbError> {
        let contracts = sqlx::query_as::<_, ExtraPayContract>(
            "SELECT * FROM extra_pay_contracts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(contracts)
    }

    async fn get_extra_pay_contract(&self, id: i64) -> Result<Option<ExtraPayContract>, DbError> {
        let contract = sqlx::query_as::<_, ExtraPayContract>(
            "SELECT * FROM extra_pay_contracts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contract)
    }

    async fn create_extra_pay_contract(
        &self,
        new: &NewExtraPayContract,
    ) -> Result<ExtraPayContract, DbError> {
        let contract = sqlx::query_as::<_, ExtraPayContract>(
            r#"
            INSERT INTO extra_pay_contracts (
                title, description, contract_type, amount, start_date, end_date, status, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(&new.contract_type)
        .bind(new.amount)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.status.as_str())
        .bind(new.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(contract)
    }

    async fn update_extra_pay_contract(
        &self,
        id: i64,
        update: &ExtraPayContractUpdate,
    ) -> Result<Option<ExtraPayContract>, DbError> {
        let contract = sqlx::query_as::<_, ExtraPayContract>(
            r#"
            UPDATE extra_pay_contracts SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                contract_type = COALESCE($4, contract_type),
                amount = COALESCE($5, amount),
                end_date = COALESCE($6, end_date),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.contract_type.as_deref())
        .bind(update.amount)
        .bind(update.end_date)
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(contract)
    }

    async fn delete_extra_pay_contract(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("extra_pay_contracts", id).await
    }

    async fn list_extra_pay_requests(&self) -> Result<Vec<ExtraPayRequest>, DbError> {
        let requests = sqlx::query_as::<_, ExtraPayRequest>(
            "SELECT * FROM extra_pay_requests ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn list_extra_pay_requests_for_contract(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ExtraPayRequest>, DbError> {
        let requests = sqlx::query_as::<_, ExtraPayRequest>(
            "SELECT * FROM extra_pay_requests WHERE contract_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn get_extra_pay_request(&self, id: i64) -> Result<Option<ExtraPayRequest>, DbError> {
        let request = sqlx::query_as::<_, ExtraPayRequest>(
            "SELECT * FROM extra_pay_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn create_extra_pay_request(
        &self,
        new: &NewExtraPayRequest,
        amount: Decimal,
    ) -> Result<ExtraPayRequest, DbError> {
        let request = sqlx::query_as::<_, ExtraPayRequest>(
            r#"
            INSERT INTO extra_pay_requests
                (contract_id, employee_id, amount, hours_worked, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.contract_id)
        .bind(new.employee_id)
        .bind(amount)
        .bind(new.hours_worked)
        .bind(new.description.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn transition_extra_pay_request(
        &self,
        id: i64,
        action: ExtraPayAction,
        input: &TransitionInput,
    ) -> Result<Option<ExtraPayRequest>, DbError> {
        let set = match action {
            ExtraPayAction::Approve => "approved_by = $4, approved_at = NOW()",
            ExtraPayAction::Reject => "rejection_reason = $4",
            ExtraPayAction::MarkPaid => "paid_at = NOW()",
        };
        let sql = transition_sql("extra_pay_requests", set, "");
        let query = sqlx::query_as::<_, ExtraPayRequest>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str());
        let query = match action {
            ExtraPayAction::Approve => query.bind(input.actor_id),
            ExtraPayAction::Reject => query.bind(input.note.as_deref()),
            ExtraPayAction::MarkPaid => query,
        };
        let request = query.fetch_optional(&self.pool).await?;
        Ok(request)
    }

    async fn delete_extra_pay_request(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("extra_pay_requests", id).await
    }

    // ==========================================================================
    // Onboarding
    // ==========================================================================

    async fn list_onboarding_workflows(&self) -> Result<Vec<OnboardingWorkflow>, DbError> {
        let workflows = sqlx::query_as::<_, OnboardingWorkflow>(
            "SELECT * FROM onboarding_workflows ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(workflows)
    }

    async fn get_onboarding_workflow(
        &self,
        id: i64,
    ) -> Result<Option<OnboardingWorkflow>, DbError> {
        let workflow = sqlx::query_as::<_, OnboardingWorkflow>(
            "SELECT * FROM onboarding_workflows WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn create_onboarding_workflow(
        &self,
        new: &NewOnboardingWorkflow,
    ) -> Result<OnboardingWorkflow, DbError> {
        let workflow = sqlx::query_as::<_, OnboardingWorkflow>(
            r#"
            INSERT INTO onboarding_workflows
                (employee_id, title, total_steps, assigned_to, due_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.employee_id)
        .bind(&new.title)
        .bind(new.total_steps)
        .bind(new.assigned_to)
        .bind(new.due_date)
        .bind(new.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn update_onboarding_workflow(
        &self,
        id: i64,
        update: &OnboardingWorkflowUpdate,
    ) -> Result<Option<OnboardingWorkflow>, DbError> {
        let workflow = sqlx::query_as::<_, OnboardingWorkflow>(
            r#"
            UPDATE onboarding_workflows SET
                title = COALESCE($2, title),
                assigned_to = COALESCE($3, assigned_to),
                due_date = COALESCE($4, due_date),
                notes = COALESCE($5, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.assigned_to)
        .bind(update.due_date)
        .bind(update.notes.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn advance_onboarding_workflow(
        &self,
        id: i64,
    ) -> Result<Option<OnboardingWorkflow>, DbError> {
        let workflow = sqlx::query_as::<_, OnboardingWorkflow>(
            r#"
            UPDATE onboarding_workflows SET
                current_step = current_step + 1,
                status = CASE WHEN current_step + 1 >= total_steps THEN 'completed'
                    ELSE 'in_progress' END,
                updated_at = NOW()
            WHERE id = $1 AND status <> 'completed'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn delete_onboarding_workflow(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("onboarding_workflows", id).await
    }

    async fn list_onboarding_forms(&self) -> Result<Vec<OnboardingForm>, DbError> {
        let forms = sqlx::query_as::<_, OnboardingForm>(
            "SELECT * FROM onboarding_forms ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(forms)
    }

    async fn get_onboarding_form(&self, id: i64) -> Result<Option<OnboardingForm>, DbError> {
        let form =
            sqlx::query_as::<_, OnboardingForm>("SELECT * FROM onboarding_forms WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(form)
    }

    async fn create_onboarding_form(
        &self,
        new: &NewOnboardingForm,
    ) -> Result<OnboardingForm, DbError> {
        let form = sqlx::query_as::<_, OnboardingForm>(
            r#"
            INSERT INTO onboarding_forms
                (title, description, form_type, fields, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(&new.form_type)
        .bind(&new.fields)
        .bind(new.is_active)
        .bind(new.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(form)
    }

    async fn update_onboarding_form(
        &self,
        id: i64,
        update: &OnboardingFormUpdate,
    ) -> Result<Option<OnboardingForm>, DbError> {
        let form = sqlx::query_as::<_, OnboardingForm>(
            r#"
            UPDATE onboarding_forms SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                form_type = COALESCE($4, form_type),
                fields = COALESCE($5, fields),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.form_type.as_deref())
        .bind(update.fields.as_ref())
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(form)
    }

    async fn delete_onboarding_form(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("onboarding_forms", id).await
    }

    async fn list_onboarding_submissions(
        &self,
        form_id: i64,
    ) -> Result<Vec<OnboardingSubmission>, DbError> {
        let submissions = sqlx::query_as::<_, OnboardingSubmission>(
            "SELECT * FROM onboarding_submissions WHERE form_id = $1 \
             ORDER BY submitted_at DESC, id DESC",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    async fn create_onboarding_submission(
        &self,
        form_id: i64,
        new: &NewOnboardingSubmission,
    ) -> Result<OnboardingSubmission, DbError> {
        let submission = sqlx::query_as::<_, OnboardingSubmission>(
            r#"
            INSERT INTO onboarding_submissions (form_id, employee_id, data, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(form_id)
        .bind(new.employee_id)
        .bind(&new.data)
        .bind(SubmissionStatus::Submitted.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(submission)
    }

    // ==========================================================================
    // Signatures
    // ==========================================================================

    async fn list_signature_requests(&self) -> Result<Vec<SignatureRequest>, DbError> {
        let requests = sqlx::query_as::<_, SignatureRequest>(
            "SELECT * FROM signature_requests ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn get_signature_request(&self, id: i64) -> Result<Option<SignatureRequest>, DbError> {
        let request = sqlx::query_as::<_, SignatureRequest>(
            "SELECT * FROM signature_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn create_signature_request(
        &self,
        new: &NewSignatureRequest,
    ) -> Result<SignatureRequest, DbError> {
        let request = sqlx::query_as::<_, SignatureRequest>(
            r#"
            INSERT INTO signature_requests (
                employee_id, document_title, document_type, document_url, requested_by, expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.employee_id)
        .bind(&new.document_title)
        .bind(&new.document_type)
        .bind(new.document_url.as_deref())
        .bind(new.requested_by)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn transition_signature_request(
        &self,
        id: i64,
        action: SignatureAction,
        input: &TransitionInput,
    ) -> Result<Option<SignatureRequest>, DbError> {
        let sql = match action {
            // An expired request can no longer be signed.
            SignatureAction::Sign => transition_sql(
                "signature_requests",
                "signature_data = $4, signed_at = NOW()",
                " AND (expires_at IS NULL OR expires_at > NOW())",
            ),
            SignatureAction::Decline => {
                transition_sql("signature_requests", "decline_reason = $4", "")
            }
        };
        let request = sqlx::query_as::<_, SignatureRequest>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str())
            .bind(input.note.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn delete_signature_request(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("signature_requests", id).await
    }

    // ==========================================================================
    // PAFs
    // ==========================================================================

    async fn list_pafs(&self) -> Result<Vec<Paf>, DbError> {
        let pafs = sqlx::query_as::<_, Paf>("SELECT * FROM pafs ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(pafs)
    }

    async fn get_paf(&self, id: i64) -> Result<Option<Paf>, DbError> {
        let paf = sqlx::query_as::<_, Paf>("SELECT * FROM pafs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(paf)
    }

    async fn create_paf(&self, new: &NewPaf, status: PafStatus) -> Result<Paf, DbError> {
        let paf = sqlx::query_as::<_, Paf>(
            r#"
            INSERT INTO pafs (
                paf_type, position_title, department, justification, employee_id, requested_by,
                salary, fte, effective_date, funding_source, status, submitted_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                CASE WHEN $11 = 'draft' THEN NULL ELSE NOW() END
            )
            RETURNING *
            "#,
        )
        .bind(new.paf_type.as_str())
        .bind(&new.position_title)
        .bind(&new.department)
        .bind(&new.justification)
        .bind(new.employee_id)
        .bind(new.requested_by)
        .bind(new.salary)
        .bind(new.fte)
        .bind(new.effective_date)
        .bind(new.funding_source.as_deref())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(paf)
    }

    async fn update_paf(&self, id: i64, update: &PafUpdate) -> Result<Option<Paf>, DbError> {
        let paf = sqlx::query_as::<_, Paf>(
            r#"
            UPDATE pafs SET
                position_title = COALESCE($2, position_title),
                department = COALESCE($3, department),
                justification = COALESCE($4, justification),
                employee_id = COALESCE($5, employee_id),
                salary = COALESCE($6, salary),
                fte = COALESCE($7, fte),
                effective_date = COALESCE($8, effective_date),
                funding_source = COALESCE($9, funding_source),
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.position_title.as_deref())
        .bind(update.department.as_deref())
        .bind(update.justification.as_deref())
        .bind(update.employee_id)
        .bind(update.salary)
        .bind(update.fte)
        .bind(update.effective_date)
        .bind(update.funding_source.as_deref())
        .bind(labels(EDITABLE_PAF_STATUSES))
        .fetch_optional(&self.pool)
        .await?;
        Ok(paf)
    }

    async fn transition_paf(
        &self,
        id: i64,
        action: PafAction,
        input: &TransitionInput,
    ) -> Result<Option<Paf>, DbError> {
        let set = match action {
            PafAction::Submit => {
                "submitted_at = NOW(), requested_by = COALESCE($4, requested_by), \
                 reviewer_notes = COALESCE($5, reviewer_notes)"
            }
            PafAction::Review => {
                "decided_by = COALESCE($4, decided_by), \
                 reviewer_notes = COALESCE($5, reviewer_notes)"
            }
            PafAction::Approve | PafAction::Deny => {
                "decided_by = $4, decided_at = NOW(), reviewer_notes = COALESCE($5, reviewer_notes)"
            }
        };
        let sql = transition_sql("pafs", set, "");
        let paf = sqlx::query_as::<_, Paf>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str())
            .bind(input.actor_id)
            .bind(input.note.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(paf)
    }

    async fn delete_paf(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("pafs", id).await
    }

    // ==========================================================================
    // Employee accounts
    // ==========================================================================

    async fn list_employee_accounts(&self) -> Result<Vec<EmployeeAccount>, DbError> {
        let accounts = sqlx::query_as::<_, EmployeeAccount>(
            "SELECT * FROM employee_accounts ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn get_employee_account(&self, id: i64) -> Result<Option<EmployeeAccount>, DbError> {
        let account = sqlx::query_as::<_, EmployeeAccount>(
            "SELECT * FROM employee_accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn create_employee_account(
        &self,
        new: &NewEmployeeAccount,
    ) -> Result<EmployeeAccount, DbError> {
        let account = sqlx::query_as::<_, EmployeeAccount>(
            r#"
            INSERT INTO employee_accounts (employee_id, username, email)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(new.employee_id)
        .bind(&new.username)
        .bind(&new.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    async fn transition_employee_account(
        &self,
        id: i64,
        action: AccountAction,
        level: AccessLevel,
        input: &TransitionInput,
    ) -> Result<Option<EmployeeAccount>, DbError> {
        let sql = match action {
            AccountAction::GrantAccess => transition_sql(
                "employee_accounts",
                "access_level = $4, granted_by = $5, granted_at = NOW(), revoked_at = NULL",
                "",
            ),
            AccountAction::Suspend => transition_sql("employee_accounts", "", ""),
            AccountAction::RevokeAccess => transition_sql(
                "employee_accounts",
                "access_level = 'none', revoked_at = NOW()",
                "",
            ),
        };
        let query = sqlx::query_as::<_, EmployeeAccount>(&sql)
            .bind(id)
            .bind(action.allowed_labels())
            .bind(action.target().as_str());
        let query = match action {
            AccountAction::GrantAccess => query.bind(level.as_str()).bind(input.actor_id),
            AccountAction::Suspend | AccountAction::RevokeAccess => query,
        };
        let account = query.fetch_optional(&self.pool).await?;
        Ok(account)
    }

    async fn delete_employee_account(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("employee_accounts", id).await
    }

    // ==========================================================================
    // Workflow templates
    // ==========================================================================

    async fn list_workflow_templates(&self) -> Result<Vec<WorkflowTemplate>, DbError> {
        let templates = sqlx::query_as::<_, WorkflowTemplate>(
            "SELECT * FROM workflow_templates ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    async fn get_workflow_template(&self, id: i64) -> Result<Option<WorkflowTemplate>, DbError> {
        let template = sqlx::query_as::<_, WorkflowTemplate>(
            "SELECT * FROM workflow_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    async fn create_workflow_template(
        &self,
        new: &NewWorkflowTemplate,
    ) -> Result<WorkflowTemplate, DbError> {
        let steps = number_steps(&new.steps);
        let template = sqlx::query_as::<_, WorkflowTemplate>(
            r#"
            INSERT INTO workflow_templates
                (name, description, category, steps, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(new.description.as_deref())
        .bind(new.category.as_str())
        .bind(Json(&steps))
        .bind(new.is_active)
        .bind(new.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(template)
    }

    async fn update_workflow_template(
        &self,
        id: i64,
        update: &WorkflowTemplateUpdate,
    ) -> Result<Option<WorkflowTemplate>, DbError> {
        let steps = update.steps.as_deref().map(number_steps);
        let template = sqlx::query_as::<_, WorkflowTemplate>(
            r#"
            UPDATE workflow_templates SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                steps = COALESCE($5, steps),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.category.map(|c| c.as_str()))
        .bind(steps.as_ref().map(Json))
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    async fn delete_workflow_template(&self, id: i64) -> Result<bool, DbError> {
        self.delete_by_id("workflow_templates", id).await
    }

    // ==========================================================================
    // Audit log
    // ==========================================================================

    async fn create_audit_log(&self, new: &NewAuditLog) -> Result<AuditLog, DbError> {
        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, actor_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new.entity_type)
        .bind(new.entity_id)
        .bind(&new.action)
        .bind(new.actor_id)
        .bind(&new.details)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    async fn list_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DbError> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::TEXT IS NULL OR entity_type = $1)
              AND ($2::BIGINT IS NULL OR entity_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(filter.entity_type.as_deref())
        .bind(filter.entity_id)
        .bind(filter.effective_limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    // ==========================================================================
    // Reporting & maintenance
    // ==========================================================================

    async fn dashboard_stats(&self) -> Result<DashboardStats, DbError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM employees) AS total_employees,
                (SELECT COUNT(*) FROM employees WHERE status = 'active') AS active_employees,
                (SELECT COUNT(*) FROM leave_requests WHERE status = 'pending')
                    AS pending_leave_requests,
                (SELECT COUNT(*) FROM timecards
                    WHERE status IN ('secretary_submitted', 'employee_approved', 'admin_approved'))
                    AS timecards_in_approval,
                (SELECT COUNT(*) FROM extra_pay_requests WHERE status = 'pending')
                    AS pending_extra_pay_requests,
                (SELECT COUNT(*) FROM pafs WHERE status IN ('submitted', 'under_review'))
                    AS open_pafs,
                (SELECT COUNT(*) FROM signature_requests WHERE status = 'pending')
                    AS pending_signatures
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn delete_all_rows(&self, table: &str) -> Result<u64, DbError> {
        if !is_plain_identifier(table) {
            return Err(DbError::InvalidTableName(table.to_string()));
        }
        let sql = format!("DELETE FROM {table}");
        let result = sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::MissingTable(_) => DbError::MissingTable(table.to_string()),
                other => other,
            })?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plain_identifiers_are_accepted_as_table_names() {
        assert!(is_plain_identifier("extra_pay_requests"));
        assert!(is_plain_identifier("audit_logs2"));
        assert!(!is_plain_identifier("users; DROP TABLE users"));
        assert!(!is_plain_identifier("Employees"));
        assert!(!is_plain_identifier("1table"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn transition_sql_guards_on_current_status() {
        let sql = transition_sql("timecards", "admin_approved_at = NOW()", "");
        assert!(sql.starts_with("UPDATE timecards SET status = $3, admin_approved_at = NOW()"));
        assert!(sql.contains("WHERE id = $1 AND status = ANY($2) RETURNING *"));
    }
}
