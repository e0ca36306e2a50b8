//! A process-local [`HrStore`] with the same semantics as the Postgres
//! repository: foreign keys are checked, employee deletes cascade, unique
//! columns are enforced and status changes use the same guards.

use crate::store::{HrStore, TransitionInput};
use crate::DbError;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{
    AccessLevel, AccountAction, AccountStatus, AuditFilter, AuditLog, DashboardStats, Employee,
    EmployeeAccount, EmployeeStatus, EmployeeUpdate, ExtraPayAction, ExtraPayContract,
    ExtraPayContractUpdate, ExtraPayRequest, ExtraPayStatus, LeaveAction, LeaveRequest,
    LeaveStatus, LeaveType, NewAuditLog, NewEmployee, NewEmployeeAccount, NewExtraPayContract,
    NewExtraPayRequest, NewLeaveRequest, NewLeaveType, NewOnboardingForm,
    NewOnboardingSubmission, NewOnboardingWorkflow, NewPaf, NewPayrollRecord,
    NewSignatureRequest, NewTimeCard, NewUser, NewWorkflowTemplate, OnboardingForm,
    OnboardingFormUpdate, OnboardingStatus, OnboardingSubmission, OnboardingWorkflow,
    OnboardingWorkflowUpdate, Paf, PafAction, PafStatus, PafUpdate, PayrollAction,
    PayrollRecord, PayrollStatus, SignatureAction, SignatureRequest, SignatureStatus,
    StatusTransition, SubmissionStatus, TimeCard, TimeCardUpdate, TimecardAction,
    TimecardStatus, User, WorkflowTemplate, WorkflowTemplateUpdate, workflow::number_steps,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    employees: BTreeMap<i64, Employee>,
    leave_types: BTreeMap<i64, LeaveType>,
    leave_requests: BTreeMap<i64, LeaveRequest>,
    timecards: BTreeMap<i64, TimeCard>,
    payroll_records: BTreeMap<i64, PayrollRecord>,
    extra_pay_contracts: BTreeMap<i64, ExtraPayContract>,
    extra_pay_requests: BTreeMap<i64, ExtraPayRequest>,
    onboarding_workflows: BTreeMap<i64, OnboardingWorkflow>,
    onboarding_forms: BTreeMap<i64, OnboardingForm>,
    onboarding_submissions: BTreeMap<i64, OnboardingSubmission>,
    signature_requests: BTreeMap<i64, SignatureRequest>,
    pafs: BTreeMap<i64, Paf>,
    employee_accounts: BTreeMap<i64, EmployeeAccount>,
    workflow_templates: BTreeMap<i64, WorkflowTemplate>,
    audit_logs: BTreeMap<i64, AuditLog>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_employee(&self, id: i64) -> Result<(), DbError> {
        if self.employees.contains_key(&id) {
            Ok(())
        } else {
            Err(DbError::MissingReference(format!("employee {id}")))
        }
    }

    fn require_user(&self, id: Option<i64>) -> Result<(), DbError> {
        match id {
            Some(id) if !self.users.contains_key(&id) => {
                Err(DbError::MissingReference(format!("user {id}")))
            }
            _ => Ok(()),
        }
    }

    /// Removes every row that cascades from the employee.
    fn cascade_employee(&mut self, employee_id: i64) {
        self.leave_requests.retain(|_, r| r.employee_id != employee_id);
        self.timecards.retain(|_, r| r.employee_id != employee_id);
        self.payroll_records.retain(|_, r| r.employee_id != employee_id);
        self.extra_pay_requests.retain(|_, r| r.employee_id != employee_id);
        self.onboarding_workflows.retain(|_, r| r.employee_id != employee_id);
        self.onboarding_submissions.retain(|_, r| r.employee_id != employee_id);
        self.signature_requests.retain(|_, r| r.employee_id != employee_id);
        self.employee_accounts.retain(|_, r| r.employee_id != employee_id);
        for paf in self.pafs.values_mut() {
            if paf.employee_id == Some(employee_id) {
                paf.employee_id = None;
            }
        }
    }

    /// Clears one table, returning how many rows it held.
    fn clear(&mut self, table: &str) -> Option<u64> {
        fn take<T>(map: &mut BTreeMap<i64, T>) -> u64 {
            let n = map.len() as u64;
            map.clear();
            n
        }
        let removed = match table {
            "users" => {
                for employee in self.employees.values_mut() {
                    employee.user_id = None;
                }
                take(&mut self.users)
            }
            "employees" => {
                let ids: Vec<i64> = self.employees.keys().copied().collect();
                for id in ids {
                    self.cascade_employee(id);
                }
                take(&mut self.employees)
            }
            "leave_types" => {
                for request in self.leave_requests.values_mut() {
                    request.leave_type_id = None;
                }
                take(&mut self.leave_types)
            }
            "leave_requests" => take(&mut self.leave_requests),
            "timecards" => take(&mut self.timecards),
            "payroll_records" => take(&mut self.payroll_records),
            "extra_pay_contracts" => {
                self.extra_pay_requests.clear();
                take(&mut self.extra_pay_contracts)
            }
            "extra_pay_requests" => take(&mut self.extra_pay_requests),
            "onboarding_workflows" => take(&mut self.onboarding_workflows),
            "onboarding_forms" => {
                self.onboarding_submissions.clear();
                take(&mut self.onboarding_forms)
            }
            "onboarding_submissions" => take(&mut self.onboarding_submissions),
            "signature_requests" => take(&mut self.signature_requests),
            "pafs" => take(&mut self.pafs),
            "employee_accounts" => take(&mut self.employee_accounts),
            "workflow_templates" => take(&mut self.workflow_templates),
            "audit_logs" => take(&mut self.audit_logs),
            _ => return None,
        };
        Some(removed)
    }
}

/// Rows newest first, matching the `created_at DESC, id DESC` ordering of
/// the SQL lists.
fn newest_first<T: Clone>(map: &BTreeMap<i64, T>) -> Vec<T> {
    map.values().rev().cloned().collect()
}

/// Runs `apply` on the row when `action` may start from its status.
/// `Ok(None)` covers both a missing row and a refused transition.
fn transition_row<A, T, F>(
    row: Option<&mut T>,
    action: A,
    status: impl Fn(&T) -> A::Status,
    apply: F,
) -> Option<T>
where
    A: StatusTransition,
    T: Clone,
    F: FnOnce(&mut T),
{
    let row = row?;
    if !action.permits(status(row)) {
        return None;
    }
    apply(row);
    Some(row.clone())
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HrStore for InMemoryRepository {
    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DbError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new: &NewUser, password_hash: &str) -> Result<User, DbError> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == new.username) {
            return Err(DbError::Duplicate("users_username_key".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: t.next_id(),
            username: new.username.clone(),
            password_hash: password_hash.to_string(),
            full_name: new.full_name.clone(),
            email: new.email.clone(),
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        for employee in t.employees.values_mut() {
            if employee.user_id == Some(id) {
                employee.user_id = None;
            }
        }
        Ok(true)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        let t = self.tables.read().await;
        let mut employees: Vec<Employee> = t.employees.values().cloned().collect();
        employees.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(employees)
    }

    async fn get_employee(&self, id: i64) -> Result<Option<Employee>, DbError> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn create_employee(&self, new: &NewEmployee) -> Result<Employee, DbError> {
        let mut t = self.tables.write().await;
        if t.employees.values().any(|e| e.employee_number == new.employee_number) {
            return Err(DbError::Duplicate("employees_employee_number_key".to_string()));
        }
        t.require_user(new.user_id)?;

        let now = Utc::now();
        let employee = Employee {
            id: t.next_id(),
            employee_number: new.employee_number.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            department: new.department.clone(),
            position: new.position.clone(),
            employee_type: new.employee_type.clone(),
            hire_date: new.hire_date,
            salary: new.salary,
            status: new.status,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        t.employees.insert(employee.id, employee.clone());

        let card = NewTimeCard::default_for(employee.id, employee.hire_date);
        let card = new_timecard_row(t.next_id(), &card);
        t.timecards.insert(card.id, card);
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: i64,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, DbError> {
        let mut t = self.tables.write().await;
        t.require_user(update.user_id)?;
        Ok(t.employees.get_mut(&id).map(|employee| {
            update.apply_to(employee);
            employee.updated_at = Utc::now();
            employee.clone()
        }))
    }

    async fn delete_employee(&self, id: i64) -> Result<bool, DbError> {
        let mut t = self.tables.write().await;
        if t.employees.remove(&id).is_none() {
            return Ok(false);
        }
        t.cascade_employee(id);
        Ok(true)
    }

    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, DbError> {
        let t = self.tables.read().await;
        let mut types: Vec<LeaveType> = t.leave_types.values().cloned().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn create_leave_type(&self, new: &NewLeaveType) -> Result<LeaveType, DbError> {
        let mut t = self.tables.write().await;
        if t.leave_types.values().any(|lt| lt.name == new.name) {
            return Err(DbError::Duplicate("leave_types_name_key".to_string()));
        }
        let leave_type = LeaveType {
            id: t.next_id(),
            name: new.name.clone(),
            description: new.description.clone(),
            max_days: new.max_days,
            created_at: Utc::now(),
        };
        t.leave_types.insert(leave_type.id, leave_type.clone());
        Ok(leave_type)
    }

    async fn delete_leave_type(&self, id: i64) -> Result<bool, DbError> {
        let mut t = self.tables.write().await;
        if t.leave_types.remove(&id).is_none() {
            return Ok(false);
        }
        for request in t.leave_requests.values_mut() {
            if request.leave_type_id == Some(id) {
                request.leave_type_id = None;
            }
        }
        Ok(true)
    }

    async fn list_leave_requests(&self) -> Result<Vec<LeaveRequest>, DbError> {
        Ok(newest_first(&self.tables.read().await.leave_requests))
    }

    async fn list_leave_requests_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<LeaveRequest>, DbError> {
        let t = self.tables.read().await;
        let mut requests: Vec<LeaveRequest> = t
            .leave_requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| (b.start_date, b.id).cmp(&(a.start_date, a.id)));
        Ok(requests)
    }

    async fn get_leave_request(&self, id: i64) -> Result<Option<LeaveRequest>, DbError> {
        Ok(self.tables.read().await.leave_requests.get(&id).cloned())
    }

    async fn create_leave_request(&self, new: &NewLeaveRequest) -> Result<LeaveRequest, DbError> {
        let mut t = self.tables.write().await;
        t.require_employee(new.employee_id)?;
        if let Some(type_id) = new.leave_type_id {
            if !t.leave_types.contains_key(&type_id) {
                return Err(DbError::MissingReference(format!("leave type {type_id}")));
            }
        }
        let now = Utc::now();
        let request = LeaveRequest {
            id: t.next_id(),
            employee_id: new.employee_id,
            leave_type_id: new.leave_type_id,
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason.clone(),
            status: LeaveStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: now,
            updated_at: now,
        };
        t.leave_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn transition_leave_request(
        &self,
        id: i64,
        action: LeaveAction,
        input: &TransitionInput,
    ) -> Result<Option<LeaveRequest>, DbError> {
        let mut t = self.tables.write().await;
        Ok(transition_row(t.leave_requests.get_mut(&id), action, |r| r.status, |r| {
            let now = Utc::now();
            r.status = action.target();
            r.reviewed_by = input.actor_id;
            r.reviewed_at = Some(now);
            r.review_notes = input.note.clone();
            r.updated_at = now;
        }))
    }

    async fn delete_leave_request(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.leave_requests.remove(&id).is_some())
    }

    async fn list_timecards(&self) -> Result<Vec<TimeCard>, DbError> {
        let t = self.tables.read().await;
        let mut cards: Vec<TimeCard> = t.timecards.values().cloned().collect();
        cards.sort_by(|a, b| (b.week_start, b.id).cmp(&(a.week_start, a.id)));
        Ok(cards)
    }

    async fn list_timecards_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<TimeCard>, DbError> {
        let mut cards = self.list_timecards().await?;
        cards.retain(|c| c.employee_id == employee_id);
        Ok(cards)
    }

    async fn get_timecard(&self, id: i64) -> Result<Option<TimeCard>, DbError> {
        Ok(self.tables.read().await.timecards.get(&id).cloned())
    }

    async fn create_timecard(&self, new: &NewTimeCard) -> Result<TimeCard, DbError> {
        let mut t = self.tables.write().await;
        t.require_employee(new.employee_id)?;
        let card = new_timecard_row(t.next_id(), new);
        t.timecards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn update_timecard(
        &self,
        id: i64,
        update: &TimeCardUpdate,
    ) -> Result<Option<TimeCard>, DbError> {
        let mut t = self.tables.write().await;
        let Some(card) = t.timecards.get_mut(&id).filter(|c| c.is_editable()) else {
            return Ok(None);
        };
        if let Some(hours) = update.regular_hours {
            card.regular_hours = hours;
        }
        if let Some(hours) = update.overtime_hours {
            card.overtime_hours = hours;
        }
        if let Some(notes) = &update.notes {
            card.notes = Some(notes.clone());
        }
        card.updated_at = Utc::now();
        Ok(Some(card.clone()))
    }

    async fn transition_timecard(
        &self,
        id: i64,
        action: TimecardAction,
        input: &TransitionInput,
    ) -> Result<Option<TimeCard>, DbError> {
        let mut t = self.tables.write().await;
        Ok(transition_row(t.timecards.get_mut(&id), action, |c| c.status, |c| {
            let now = Utc::now();
            c.status = action.target();
            c.updated_at = now;
            match action {
                TimecardAction::Submit => {
                    c.submitted_by = input.actor_id;
                    c.submitted_at = Some(now);
                    c.rejection_reason = None;
                    c.employee_approved_at = None;
                    c.admin_approved_by = None;
                    c.admin_approved_at = None;
                }
                TimecardAction::EmployeeApprove => c.employee_approved_at = Some(now),
                TimecardAction::AdminApprove => {
                    c.admin_approved_by = input.actor_id;
                    c.admin_approved_at = Some(now);
                }
                TimecardAction::PayrollProcess => {
                    c.payroll_processed_by = input.actor_id;
                    c.payroll_processed_at = Some(now);
                }
                TimecardAction::Reject => c.rejection_reason = input.note.clone(),
            }
        }))
    }

    async fn delete_timecard(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.timecards.remove(&id).is_some())
    }

    async fn list_payroll_records(&self) -> Result<Vec<PayrollRecord>, DbError> {
        let t = self.tables.read().await;
        let mut records: Vec<PayrollRecord> = t.payroll_records.values().cloned().collect();
        records.sort_by(|a, b| (b.pay_period_end, b.id).cmp(&(a.pay_period_end, a.id)));
        Ok(records)
    }

    async fn list_payroll_records_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<PayrollRecord>, DbError> {
        let mut records = self.list_payroll_records().await?;
        records.retain(|r| r.employee_id == employee_id);
        Ok(records)
    }

    async fn get_payroll_record(&self, id: i64) -> Result<Option<PayrollRecord>, DbError> {
        Ok(self.tables.read().await.payroll_records.get(&id).cloned())
    }

    async fn create_payroll_record(
        &self,
        new: &NewPayrollRecord,
    ) -> Result<PayrollRecord, DbError> {
        let mut t = self.tables.write().await;
        t.require_employee(new.employee_id)?;
        let now = Utc::now();
        let record = PayrollRecord {
            id: t.next_id(),
            employee_id: new.employee_id,
            pay_period_start: new.pay_period_start,
            pay_period_end: new.pay_period_end,
            gross_pay: new.gross_pay,
            deductions: new.deductions,
            net_pay: new.resolved_net_pay(),
            status: PayrollStatus::Pending,
            processed_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        t.payroll_records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn transition_payroll_record(
        &self,
        id: i64,
        action: PayrollAction,
    ) -> Result<Option<PayrollRecord>, DbError> {
        let mut t = self.tables.write().await;
        Ok(transition_row(t.payroll_records.get_mut(&id), action, |r| r.status, |r| {
            let now = Utc::now();
            r.status = action.target();
            r.updated_at = now;
            match action {
                PayrollAction::Process => r.processed_at = Some(now),
                PayrollAction::MarkPaid => r.paid_at = Some(now),
            }
        }))
    }

    async fn delete_payroll_record(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.payroll_records.remove(&id).is_some())
    }

    async fn list_extra_pay_contracts(&self) -> Result<Vec<ExtraPayContract>, DbError> {
        Ok(newest_first(&self.tables.read().await.extra_pay_contracts))
    }

    async fn get_extra_pay_contract(&self, id: i64) -> Result<Option<ExtraPayContract>, DbError> {
        Ok(self.tables.read().await.extra_pay_contracts.get(&id).cloned())
    }

    async fn create_extra_pay_contract(
        &self,
        new: &NewExtraPayContract,
    ) -> Result<ExtraPayContract, DbError> {
        let mut t = self.tables.write().await;
        t.require_user(new.created_by)?;
        let now = Utc::now();
        let contract = ExtraPayContract {
            id: t.next_id(),
            title: new.title.clone(),
            description: new.description.clone(),
            contract_type: new.contract_type.clone(),
            amount: new.amount,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        t.extra_pay_contracts.insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn update_extra_pay_contract(
        &self,
        id: i64,
        update: &ExtraPayContractUpdate,
    ) -> Result<Option<ExtraPayContract>, DbError> {
        let mut t = self.tables.write().await;
        Ok(t.extra_pay_contracts.get_mut(&id).map(|contract| {
            update.apply_to(contract);
            contract.updated_at = Utc::now();
            contract.clone()
        }))
    }

    async fn delete_extra_pay_contract(&self, id: i64) -> Result<bool, DbError> {
        let mut t = self.tables.write().await;
        if t.extra_pay_contracts.remove(&id).is_none() {
            return Ok(false);
        }
        t.extra_pay_requests.retain(|_, r| r.contract_id != id);
        Ok(true)
    }

    async fn list_extra_pay_requests(&self) -> Result<Vec<ExtraPayRequest>, DbError> {
        Ok(newest_first(&self.tables.read().await.extra_pay_requests))
    }

    async fn list_extra_pay_requests_for_contract(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ExtraPayRequest>, DbError> {
        let mut requests = self.list_extra_pay_requests().await?;
        requests.retain(|r| r.contract_id == contract_id);
        Ok(requests)
    }

    async fn get_extra_pay_request(&self, id: i64) -> Result<Option<ExtraPayRequest>, DbError> {
        Ok(self.tables.read().await.extra_pay_requests.get(&id).cloned())
    }

    async fn create_extra_pay_request(
        &self,
        new: &NewExtraPayRequest,
        amount: Decimal,
    ) -> Result<ExtraPayRequest, DbError> {
        let mut t = self.tables.write().await;
        if !t.extra_pay_contracts.contains_key(&new.contract_id) {
            return Err(DbError::MissingReference(format!("contract {}", new.contract_id)));
        }
        t.require_employee(new.employee_id)?;
        let now = Utc::now();
        let request = ExtraPayRequest {
            id: t.next_id(),
            contract_id: new.contract_id,
            employee_id: new.employee_id,
            amount,
            hours_worked: new.hours_worked,
            description: new.description.clone(),
            status: ExtraPayStatus::Pending,
            approved_by: None,
            approved_at: None,
            paid_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        t.extra_pay_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn transition_extra_pay_request(
        &self,
        id: i64,
        action: ExtraPayAction,
        input: &TransitionInput,
    ) -> Result<Option<ExtraPayRequest>, DbError> {
        let mut t = self.tables.write().await;
        Ok(transition_row(t.extra_pay_requests.get_mut(&id), action, |r| r.status, |r| {
            let now = Utc::now();
            r.status = action.target();
            r.updated_at = now;
            match action {
                ExtraPayAction::Approve => {
                    r.approved_by = input.actor_id;
                    r.approved_at = Some(now);
                }
                ExtraPayAction::Reject => r.rejection_reason = input.note.clone(),
                ExtraPayAction::MarkPaid => r.paid_at = Some(now),
            }
        }))
    }

    async fn delete_extra_pay_request(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.extra_pay_requests.remove(&id).is_some())
    }

    async fn list_onboarding_workflows(&self) -> Result<Vec<OnboardingWorkflow>, DbError> {
        Ok(newest_first(&self.tables.read().await.onboarding_workflows))
    }

    async fn get_onboarding_workflow(
        &self,
        id: i64,
    ) -> Result<Option<OnboardingWorkflow>, DbError> {
        Ok(self.tables.read().await.onboarding_workflows.get(&id).cloned())
    }

    async fn create_onboarding_workflow(
        &self,
        new: &NewOnboardingWorkflow,
    ) -> Result<OnboardingWorkflow, DbError> {
        let mut t = self.tables.write().await;
        t.require_employee(new.employee_id)?;
        t.require_user(new.assigned_to)?;
        let now = Utc::now();
        let workflow = OnboardingWorkflow {
            id: t.next_id(),
            employee_id: new.employee_id,
            title: new.title.clone(),
            status: OnboardingStatus::NotStarted,
            current_step: 0,
            total_steps: new.total_steps,
            assigned_to: new.assigned_to,
            due_date: new.due_date,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        t.onboarding_workflows.insert(workflow.id, workflow.clone());
        Ok(workflow)
    }

    async fn update_onboarding_workflow(
        &self,
        id: i64,
        update: &OnboardingWorkflowUpdate,
    ) -> Result<Option<OnboardingWorkflow>, DbError> {
        let mut t = self.tables.write().await;
        t.require_user(update.assigned_to)?;
        Ok(t.onboarding_workflows.get_mut(&id).map(|workflow| {
            update.apply_to(workflow);
            workflow.updated_at = Utc::now();
            workflow.clone()
        }))
    }

    async fn advance_onboarding_workflow(
        &self,
        id: i64,
    ) -> Result<Option<OnboardingWorkflow>, DbError> {
        let mut t = self.tables.write().await;
        let Some(workflow) = t.onboarding_workflows.get_mut(&id) else {
            return Ok(None);
        };
        let Some((step, status)) = workflow.next_step() else {
            return Ok(None);
        };
        workflow.current_step = step;
        workflow.status = status;
        workflow.updated_at = Utc::now();
        Ok(Some(workflow.clone()))
    }

    async fn delete_onboarding_workflow(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.onboarding_workflows.remove(&id).is_some())
    }

    async fn list_onboarding_forms(&self) -> Result<Vec<OnboardingForm>, DbError> {
        let t = self.tables.read().await;
        let mut forms: Vec<OnboardingForm> = t.onboarding_forms.values().cloned().collect();
        forms.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
        Ok(forms)
    }

    async fn get_onboarding_form(&self, id: i64) -> Result<Option<OnboardingForm>, DbError> {
        Ok(self.tables.read().await.onboarding_forms.get(&id).cloned())
    }

    async fn create_onboarding_form(
        &self,
        new: &NewOnboardingForm,
    ) -> Result<OnboardingForm, DbError> {
        let mut t = self.tables.write().await;
        t.require_user(new.created_by)?;
        let now = Utc::now();
        let form = OnboardingForm {
            id: t.next_id(),
            title: new.title.clone(),
            description: new.description.clone(),
            form_type: new.form_type.clone(),
            fields: new.fields.clone(),
            is_active: new.is_active,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        t.onboarding_forms.insert(form.id, form.clone());
        Ok(form)
    }

    async fn update_onboarding_form(
        &self,
        id: i64,
        update: &OnboardingFormUpdate,
    ) -> Result<Option<OnboardingForm>, DbError> {
        let mut t = self.tables.write().await;
        Ok(t.onboarding_forms.get_mut(&id).map(|form| {
            update.apply_to(form);
            form.updated_at = Utc::now();
            form.clone()
        }))
    }

    async fn delete_onboarding_form(&self, id: i64) -> Result<bool, DbError> {
        let mut t = self.tables.write().await;
        if t.onboarding_forms.remove(&id).is_none() {
            return Ok(false);
        }
        t.onboarding_submissions.retain(|_, s| s.form_id != id);
        Ok(true)
    }

    async fn list_onboarding_submissions(
        &self,
        form_id: i64,
    ) -> Result<Vec<OnboardingSubmission>, DbError> {
        let t = self.tables.read().await;
        Ok(t.onboarding_submissions
            .values()
            .rev()
            .filter(|s| s.form_id == form_id)
            .cloned()
            .collect())
    }

    async fn create_onboarding_submission(
        &self,
        form_id: i64,
        new: &NewOnboardingSubmission,
    ) -> Result<OnboardingSubmission, DbError> {
        let mut t = self.tables.write().await;
        if !t.onboarding_forms.contains_key(&form_id) {
            return Err(DbError::MissingReference(format!("form {form_id}")));
        }
        t.require_employee(new.employee_id)?;
        let submission = OnboardingSubmission {
            id: t.next_id(),
            form_id,
            employee_id: new.employee_id,
            data: new.data.clone(),
            status: SubmissionStatus::Submitted,
            submitted_at: Utc::now(),
        };
        t.onboarding_submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn list_signature_requests(&self) -> Result<Vec<SignatureRequest>, DbError> {
        Ok(newest_first(&self.tables.read().await.signature_requests))
    }

    async fn get_signature_request(&self, id: i64) -> Result<Option<SignatureRequest>, DbError> {
        Ok(self.tables.read().await.signature_requests.get(&id).cloned())
    }

    async fn create_signature_request(
        &self,
        new: &NewSignatureRequest,
    ) -> Result<SignatureRequest, DbError> {
        let mut t = self.tables.write().await;
        t.require_employee(new.employee_id)?;
        t.require_user(new.requested_by)?;
        let now = Utc::now();
        let request = SignatureRequest {
            id: t.next_id(),
            employee_id: new.employee_id,
            document_title: new.document_title.clone(),
            document_type: new.document_type.clone(),
            document_url: new.document_url.clone(),
            requested_by: new.requested_by,
            status: SignatureStatus::Pending,
            signature_data: None,
            signed_at: None,
            decline_reason: None,
            expires_at: new.expires_at,
            created_at: now,
            updated_at: now,
        };
        t.signature_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn transition_signature_request(
        &self,
        id: i64,
        action: SignatureAction,
        input: &TransitionInput,
    ) -> Result<Option<SignatureRequest>, DbError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let row = t
            .signature_requests
            .get_mut(&id)
            .filter(|r| action != SignatureAction::Sign || r.expires_at.is_none_or(|at| at > now));
        Ok(transition_row(row, action, |r| r.status, |r| {
            r.status = action.target();
            r.updated_at = now;
            match action {
                SignatureAction::Sign => {
                    r.signature_data = input.note.clone();
                    r.signed_at = Some(now);
                }
                SignatureAction::Decline => r.decline_reason = input.note.clone(),
            }
        }))
    }

    async fn delete_signature_request(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.signature_requests.remove(&id).is_some())
    }

    async fn list_pafs(&self) -> Result<Vec<Paf>, DbError> {
        Ok(newest_first(&self.tables.read().await.pafs))
    }

    async fn get_paf(&self, id: i64) -> Result<Option<Paf>, DbError> {
        Ok(self.tables.read().await.pafs.get(&id).cloned())
    }

    async fn create_paf(&self, new: &NewPaf, status: PafStatus) -> Result<Paf, DbError> {
        let mut t = self.tables.write().await;
        if let Some(employee_id) = new.employee_id {
            t.require_employee(employee_id)?;
        }
        t.require_user(new.requested_by)?;
        let now = Utc::now();
        let paf = Paf {
            id: t.next_id(),
            paf_type: new.paf_type,
            position_title: new.position_title.clone(),
            department: new.department.clone(),
            justification: new.justification.clone(),
            employee_id: new.employee_id,
            requested_by: new.requested_by,
            salary: new.salary,
            fte: new.fte,
            effective_date: new.effective_date,
            funding_source: new.funding_source.clone(),
            status,
            reviewer_notes: None,
            submitted_at: (status != PafStatus::Draft).then_some(now),
            decided_by: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        };
        t.pafs.insert(paf.id, paf.clone());
        Ok(paf)
    }

    async fn update_paf(&self, id: i64, update: &PafUpdate) -> Result<Option<Paf>, DbError> {
        let mut t = self.tables.write().await;
        if let Some(employee_id) = update.employee_id {
            t.require_employee(employee_id)?;
        }
        Ok(t.pafs.get_mut(&id).filter(|p| p.is_editable()).map(|paf| {
            update.apply_to(paf);
            paf.updated_at = Utc::now();
            paf.clone()
        }))
    }

    async fn transition_paf(
        &self,
        id: i64,
        action: PafAction,
        input: &TransitionInput,
    ) -> Result<Option<Paf>, DbError> {
        let mut t = self.tables.write().await;
        Ok(transition_row(t.pafs.get_mut(&id), action, |p| p.status, |p| {
            let now = Utc::now();
            p.status = action.target();
            p.updated_at = now;
            if let Some(note) = &input.note {
                p.reviewer_notes = Some(note.clone());
            }
            match action {
                PafAction::Submit => {
                    p.submitted_at = Some(now);
                    p.requested_by = input.actor_id.or(p.requested_by);
                }
                PafAction::Review => p.decided_by = input.actor_id.or(p.decided_by),
                PafAction::Approve | PafAction::Deny => {
                    p.decided_by = input.actor_id;
                    p.decided_at = Some(now);
                }
            }
        }))
    }

    async fn delete_paf(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.pafs.remove(&id).is_some())
    }

    async fn list_employee_accounts(&self) -> Result<Vec<EmployeeAccount>, DbError> {
        let t = self.tables.read().await;
        let mut accounts: Vec<EmployeeAccount> = t.employee_accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }

    async fn get_employee_account(&self, id: i64) -> Result<Option<EmployeeAccount>, DbError> {
        Ok(self.tables.read().await.employee_accounts.get(&id).cloned())
    }

    async fn create_employee_account(
        &self,
        new: &NewEmployeeAccount,
    ) -> Result<EmployeeAccount, DbError> {
        let mut t = self.tables.write().await;
        t.require_employee(new.employee_id)?;
        if t.employee_accounts.values().any(|a| a.username == new.username) {
            return Err(DbError::Duplicate("employee_accounts_username_key".to_string()));
        }
        let now = Utc::now();
        let account = EmployeeAccount {
            id: t.next_id(),
            employee_id: new.employee_id,
            username: new.username.clone(),
            email: new.email.clone(),
            access_level: AccessLevel::NoAccess,
            status: AccountStatus::Pending,
            granted_by: None,
            granted_at: None,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        };
        t.employee_accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn transition_employee_account(
        &self,
        id: i64,
        action: AccountAction,
        level: AccessLevel,
        input: &TransitionInput,
    ) -> Result<Option<EmployeeAccount>, DbError> {
        let mut t = self.tables.write().await;
        Ok(transition_row(t.employee_accounts.get_mut(&id), action, |a| a.status, |a| {
            let now = Utc::now();
            a.status = action.target();
            a.updated_at = now;
            match action {
                AccountAction::GrantAccess => {
                    a.access_level = level;
                    a.granted_by = input.actor_id;
                    a.granted_at = Some(now);
                    a.revoked_at = None;
                }
                AccountAction::Suspend => {}
                AccountAction::RevokeAccess => {
                    a.access_level = AccessLevel::NoAccess;
                    a.revoked_at = Some(now);
                }
            }
        }))
    }

    async fn delete_employee_account(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.employee_accounts.remove(&id).is_some())
    }

    async fn list_workflow_templates(&self) -> Result<Vec<WorkflowTemplate>, DbError> {
        let t = self.tables.read().await;
        let mut templates: Vec<WorkflowTemplate> = t.workflow_templates.values().cloned().collect();
        templates.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(templates)
    }

    async fn get_workflow_template(&self, id: i64) -> Result<Option<WorkflowTemplate>, DbError> {
        Ok(self.tables.read().await.workflow_templates.get(&id).cloned())
    }

    async fn create_workflow_template(
        &self,
        new: &NewWorkflowTemplate,
    ) -> Result<WorkflowTemplate, DbError> {
        let mut t = self.tables.write().await;
        t.require_user(new.created_by)?;
        let now = Utc::now();
        let template = WorkflowTemplate {
            id: t.next_id(),
            name: new.name.clone(),
            description: new.description.clone(),
            category: new.category,
            steps: number_steps(&new.steps),
            is_active: new.is_active,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        t.workflow_templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn update_workflow_template(
        &self,
        id: i64,
        update: &WorkflowTemplateUpdate,
    ) -> Result<Option<WorkflowTemplate>, DbError> {
        let mut t = self.tables.write().await;
        Ok(t.workflow_templates.get_mut(&id).map(|template| {
            update.apply_to(template);
            template.updated_at = Utc::now();
            template.clone()
        }))
    }

    async fn delete_workflow_template(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.workflow_templates.remove(&id).is_some())
    }

    async fn create_audit_log(&self, new: &NewAuditLog) -> Result<AuditLog, DbError> {
        let mut t = self.tables.write().await;
        let log = AuditLog {
            id: t.next_id(),
            entity_type: new.entity_type.clone(),
            entity_id: new.entity_id,
            action: new.action.clone(),
            actor_id: new.actor_id,
            details: new.details.clone(),
            created_at: Utc::now(),
        };
        t.audit_logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn list_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DbError> {
        let t = self.tables.read().await;
        let limit = usize::try_from(filter.effective_limit()).unwrap_or(usize::MAX);
        Ok(t.audit_logs
            .values()
            .rev()
            .filter(|log| filter.matches(log))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, DbError> {
        let t = self.tables.read().await;
        let count = |n: usize| n as i64;
        Ok(DashboardStats {
            total_employees: count(t.employees.len()),
            active_employees: count(
                t.employees.values().filter(|e| e.status == EmployeeStatus::Active).count(),
            ),
            pending_leave_requests: count(
                t.leave_requests.values().filter(|r| r.status == LeaveStatus::Pending).count(),
            ),
            timecards_in_approval: count(
                t.timecards
                    .values()
                    .filter(|c| {
                        matches!(
                            c.status,
                            TimecardStatus::SecretarySubmitted
                                | TimecardStatus::EmployeeApproved
                                | TimecardStatus::AdminApproved
                        )
                    })
                    .count(),
            ),
            pending_extra_pay_requests: count(
                t.extra_pay_requests
                    .values()
                    .filter(|r| r.status == ExtraPayStatus::Pending)
                    .count(),
            ),
            open_pafs: count(
                t.pafs
                    .values()
                    .filter(|p| matches!(p.status, PafStatus::Submitted | PafStatus::UnderReview))
                    .count(),
            ),
            pending_signatures: count(
                t.signature_requests
                    .values()
                    .filter(|s| s.status == SignatureStatus::Pending)
                    .count(),
            ),
        })
    }

    async fn delete_all_rows(&self, table: &str) -> Result<u64, DbError> {
        self.tables
            .write()
            .await
            .clear(table)
            .ok_or_else(|| DbError::MissingTable(table.to_string()))
    }
}

fn new_timecard_row(id: i64, new: &NewTimeCard) -> TimeCard {
    let now = Utc::now();
    TimeCard {
        id,
        employee_id: new.employee_id,
        week_start: new.week_start,
        regular_hours: new.regular_hours,
        overtime_hours: new.overtime_hours,
        notes: new.notes.clone(),
        status: TimecardStatus::Draft,
        submitted_by: None,
        submitted_at: None,
        employee_approved_at: None,
        admin_approved_by: None,
        admin_approved_at: None,
        payroll_processed_by: None,
        payroll_processed_at: None,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::ContractStatus;
    use rust_decimal_macros::dec;

    fn new_employee(number: &str) -> NewEmployee {
        NewEmployee {
            employee_number: number.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: format!("{number}@district.example"),
            phone: None,
            department: "Science".to_string(),
            position: "Teacher".to_string(),
            employee_type: "certificated".to_string(),
            // A Thursday.
            hire_date: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            salary: Some(dec!(65000)),
            status: EmployeeStatus::Active,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn new_employee_gets_one_draft_timecard_for_the_hire_week() {
        let store = InMemoryRepository::new();
        let employee = store.create_employee(&new_employee("E-100")).await.unwrap();

        let cards = store.list_timecards_for_employee(employee.id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].status, TimecardStatus::Draft);
        assert_eq!(cards[0].week_start, NaiveDate::from_ymd_opt(2024, 8, 12).unwrap());
        assert_eq!(cards[0].total_hours(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn duplicate_employee_number_is_rejected() {
        let store = InMemoryRepository::new();
        store.create_employee(&new_employee("E-1")).await.unwrap();
        let err = store.create_employee(&new_employee("E-1")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn deleting_an_employee_cascades_to_their_rows() {
        let store = InMemoryRepository::new();
        let employee = store.create_employee(&new_employee("E-2")).await.unwrap();
        let request = NewLeaveRequest {
            employee_id: employee.id,
            leave_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            reason: None,
        };
        store.create_leave_request(&request).await.unwrap();

        assert!(store.delete_employee(employee.id).await.unwrap());
        assert!(store.list_timecards().await.unwrap().is_empty());
        assert!(store.list_leave_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rows_for_unknown_employees_are_refused() {
        let store = InMemoryRepository::new();
        let card = NewTimeCard::default_for(42, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let err = store.create_timecard(&card).await.unwrap_err();
        assert!(matches!(err, DbError::MissingReference(_)));
    }

    #[tokio::test]
    async fn out_of_order_transition_leaves_the_row_untouched() {
        let store = InMemoryRepository::new();
        let employee = store.create_employee(&new_employee("E-3")).await.unwrap();
        let card = store.list_timecards_for_employee(employee.id).await.unwrap().remove(0);

        let skipped = store
            .transition_timecard(card.id, TimecardAction::AdminApprove, &TransitionInput::default())
            .await
            .unwrap();
        assert!(skipped.is_none());
        let unchanged = store.get_timecard(card.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TimecardStatus::Draft);
        assert!(unchanged.admin_approved_at.is_none());
    }

    #[tokio::test]
    async fn extra_pay_approval_and_payment_stamp_once() {
        let store = InMemoryRepository::new();
        let employee = store.create_employee(&new_employee("E-4")).await.unwrap();
        let contract = store
            .create_extra_pay_contract(&NewExtraPayContract {
                title: "Coaching".to_string(),
                description: None,
                contract_type: "stipend".to_string(),
                amount: dec!(1500),
                start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
                end_date: None,
                status: ContractStatus::Active,
                created_by: None,
            })
            .await
            .unwrap();
        let request = store
            .create_extra_pay_request(
                &NewExtraPayRequest {
                    contract_id: contract.id,
                    employee_id: employee.id,
                    amount: None,
                    hours_worked: None,
                    description: None,
                },
                contract.amount,
            )
            .await
            .unwrap();

        let input = TransitionInput::new(Some(7), None);
        let approved = store
            .transition_extra_pay_request(request.id, ExtraPayAction::Approve, &input)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.approved_by, Some(7));
        let approved_at = approved.approved_at;

        let paid = store
            .transition_extra_pay_request(request.id, ExtraPayAction::MarkPaid, &input)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, ExtraPayStatus::Paid);
        assert_eq!(paid.approved_at, approved_at);
        assert!(paid.paid_at.is_some());

        let again = store
            .transition_extra_pay_request(request.id, ExtraPayAction::MarkPaid, &input)
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn expired_signature_request_cannot_be_signed() {
        let store = InMemoryRepository::new();
        let employee = store.create_employee(&new_employee("E-5")).await.unwrap();
        let request = store
            .create_signature_request(&NewSignatureRequest {
                employee_id: employee.id,
                document_title: "Handbook".to_string(),
                document_type: "policy".to_string(),
                document_url: None,
                requested_by: None,
                expires_at: Some(Utc::now() - chrono::Duration::days(1)),
            })
            .await
            .unwrap();

        let input = TransitionInput::new(None, Some("Ada L.".to_string()));
        let signed = store
            .transition_signature_request(request.id, SignatureAction::Sign, &input)
            .await
            .unwrap();
        assert!(signed.is_none());

        let declined = store
            .transition_signature_request(request.id, SignatureAction::Decline, &input)
            .await
            .unwrap();
        assert_eq!(declined.map(|r| r.status), Some(SignatureStatus::Declined));
    }

    #[tokio::test]
    async fn submitted_timecard_refuses_edits() {
        let store = InMemoryRepository::new();
        let employee = store.create_employee(&new_employee("E-6")).await.unwrap();
        let card = store.list_timecards_for_employee(employee.id).await.unwrap().remove(0);
        store
            .transition_timecard(card.id, TimecardAction::Submit, &TransitionInput::default())
            .await
            .unwrap()
            .unwrap();

        let update = TimeCardUpdate {
            regular_hours: Some(dec!(40)),
            ..TimeCardUpdate::default()
        };
        assert!(store.update_timecard(card.id, &update).await.unwrap().is_none());
        let unchanged = store.get_timecard(card.id).await.unwrap().unwrap();
        assert_eq!(unchanged.regular_hours, Decimal::ZERO);
    }

    #[tokio::test]
    async fn decided_paf_refuses_edits() {
        let store = InMemoryRepository::new();
        let new = NewPaf {
            paf_type: Default::default(),
            position_title: "Reading Specialist".to_string(),
            department: "Elementary".to_string(),
            justification: "Enrollment growth".to_string(),
            employee_id: None,
            requested_by: None,
            salary: None,
            fte: None,
            effective_date: None,
            funding_source: None,
        };
        let paf = store.create_paf(&new, PafStatus::Submitted).await.unwrap();
        let update = PafUpdate {
            department: Some("Secondary".to_string()),
            ..PafUpdate::default()
        };
        assert!(store.update_paf(paf.id, &update).await.unwrap().is_some());

        store
            .transition_paf(paf.id, PafAction::Deny, &TransitionInput::default())
            .await
            .unwrap()
            .unwrap();
        let late = PafUpdate {
            department: Some("District Office".to_string()),
            ..PafUpdate::default()
        };
        assert!(store.update_paf(paf.id, &late).await.unwrap().is_none());
        let frozen = store.get_paf(paf.id).await.unwrap().unwrap();
        assert_eq!(frozen.department, "Secondary");
    }

    #[tokio::test]
    async fn unknown_table_reports_missing_table() {
        let store = InMemoryRepository::new();
        let err = store.delete_all_rows("substitute_assignments").await.unwrap_err();
        assert!(matches!(err, DbError::MissingTable(t) if t == "substitute_assignments"));
    }
}
