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
    PayrollRecord, SignatureAction, SignatureRequest, TimeCard, TimeCardUpdate, TimecardAction,
    User, WorkflowTemplate, WorkflowTemplateUpdate,
};
use rust_decimal::Decimal;

/// Extra columns a status change writes alongside the new status.
#[derive(Debug, Clone, Default)]
pub struct TransitionInput {
    /// Who performed the change.
    pub actor_id: Option<i64>,
    /// Rejection/decline reason or reviewer notes.
    pub note: Option<String>,
}

impl TransitionInput {
    pub fn new(actor_id: Option<i64>, note: Option<String>) -> Self {
        Self { actor_id, note }
    }
}

/// The storage layer: one method per table per query shape.
///
/// Lookups by id return `Ok(None)` when the row does not exist. Status
/// changes return `Ok(None)` when the row does not exist *or* is not in one
/// of the statuses the action starts from; the caller tells the two apart
/// with a follow-up read.
#[async_trait]
pub trait HrStore: Send + Sync {
    // --- Users ---
    async fn list_users(&self) -> Result<Vec<User>, DbError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DbError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
    async fn create_user(&self, new: &NewUser, password_hash: &str) -> Result<User, DbError>;
    async fn delete_user(&self, id: i64) -> Result<bool, DbError>;

    // --- Employees ---
    async fn list_employees(&self) -> Result<Vec<Employee>, DbError>;
    async fn get_employee(&self, id: i64) -> Result<Option<Employee>, DbError>;
    /// Inserts the employee together with their default time card.
    async fn create_employee(&self, new: &NewEmployee) -> Result<Employee, DbError>;
    async fn update_employee(
        &self,
        id: i64,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, DbError>;
    async fn delete_employee(&self, id: i64) -> Result<bool, DbError>;

    // --- Leave ---
    async fn list_leave_types(&self) -> Result<Vec<LeaveType>, DbError>;
    async fn create_leave_type(&self, new: &NewLeaveType) -> Result<LeaveType, DbError>;
    async fn delete_leave_type(&self, id: i64) -> Result<bool, DbError>;
    async fn list_leave_requests(&self) -> Result<Vec<LeaveRequest>, DbError>;
    async fn list_leave_requests_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<LeaveRequest>, DbError>;
    async fn get_leave_request(&self, id: i64) -> Result<Option<LeaveRequest>, DbError>;
    async fn create_leave_request(&self, new: &NewLeaveRequest) -> Result<LeaveRequest, DbError>;
    async fn transition_leave_request(
        &self,
        id: i64,
        action: LeaveAction,
        input: &TransitionInput,
    ) -> Result<Option<LeaveRequest>, DbError>;
    async fn delete_leave_request(&self, id: i64) -> Result<bool, DbError>;

    // --- Time cards ---
    async fn list_timecards(&self) -> Result<Vec<TimeCard>, DbError>;
    async fn list_timecards_for_employee(&self, employee_id: i64) -> Result<Vec<TimeCard>, DbError>;
    async fn get_timecard(&self, id: i64) -> Result<Option<TimeCard>, DbError>;
    async fn create_timecard(&self, new: &NewTimeCard) -> Result<TimeCard, DbError>;
    /// `None` when the card is missing or no longer draft or rejected.
    async fn update_timecard(
        &self,
        id: i64,
        update: &TimeCardUpdate,
    ) -> Result<Option<TimeCard>, DbError>;
    async fn transition_timecard(
        &self,
        id: i64,
        action: TimecardAction,
        input: &TransitionInput,
    ) -> Result<Option<TimeCard>, DbError>;
    async fn delete_timecard(&self, id: i64) -> Result<bool, DbError>;

    // --- Payroll ---
    async fn list_payroll_records(&self) -> Result<Vec<PayrollRecord>, DbError>;
    async fn list_payroll_records_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<PayrollRecord>, DbError>;
    async fn get_payroll_record(&self, id: i64) -> Result<Option<PayrollRecord>, DbError>;
    async fn create_payroll_record(&self, new: &NewPayrollRecord) -> Result<PayrollRecord, DbError>;
    async fn transition_payroll_record(
        &self,
        id: i64,
        action: PayrollAction,
    ) -> Result<Option<PayrollRecord>, DbError>;
    async fn delete_payroll_record(&self, id: i64) -> Result<bool, DbError>;

    // --- Extra pay ---
    async fn list_extra_pay_contracts(&self) -> Result<Vec<ExtraPayContract>, DbError>;
    async fn get_extra_pay_contract(&self, id: i64) -> Result<Option<ExtraPayContract>, DbError>;
    async fn create_extra_pay_contract(
        &self,
        new: &NewExtraPayContract,
    ) -> Result<ExtraPayContract, DbError>;
    async fn update_extra_pay_contract(
        &self,
        id: i64,
        update: &ExtraPayContractUpdate,
    ) -> Result<Option<ExtraPayContract>, DbError>;
    async fn delete_extra_pay_contract(&self, id: i64) -> Result<bool, DbError>;
    async fn list_extra_pay_requests(&self) -> Result<Vec<ExtraPayRequest>, DbError>;
    async fn list_extra_pay_requests_for_contract(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ExtraPayRequest>, DbError>;
    async fn get_extra_pay_request(&self, id: i64) -> Result<Option<ExtraPayRequest>, DbError>;
    /// `amount` is the resolved claim amount (the contract amount when the
    /// payload left it out).
    async fn create_extra_pay_request(
        &self,
        new: &NewExtraPayRequest,
        amount: Decimal,
    ) -> Result<ExtraPayRequest, DbError>;
    async fn transition_extra_pay_request(
        &self,
        id: i64,
        action: ExtraPayAction,
        input: &TransitionInput,
    ) -> Result<Option<ExtraPayRequest>, DbError>;
    async fn delete_extra_pay_request(&self, id: i64) -> Result<bool, DbError>;

    // --- Onboarding ---
    async fn list_onboarding_workflows(&self) -> Result<Vec<OnboardingWorkflow>, DbError>;
    async fn get_onboarding_workflow(&self, id: i64) -> Result<Option<OnboardingWorkflow>, DbError>;
    async fn create_onboarding_workflow(
        &self,
        new: &NewOnboardingWorkflow,
    ) -> Result<OnboardingWorkflow, DbError>;
    async fn update_onboarding_workflow(
        &self,
        id: i64,
        update: &OnboardingWorkflowUpdate,
    ) -> Result<Option<OnboardingWorkflow>, DbError>;
    /// Completes one step; `None` when missing or already completed.
    async fn advance_onboarding_workflow(
        &self,
        id: i64,
    ) -> Result<Option<OnboardingWorkflow>, DbError>;
    async fn delete_onboarding_workflow(&self, id: i64) -> Result<bool, DbError>;
    async fn list_onboarding_forms(&self) -> Result<Vec<OnboardingForm>, DbError>;
    async fn get_onboarding_form(&self, id: i64) -> Result<Option<OnboardingForm>, DbError>;
    async fn create_onboarding_form(
        &self,
        new: &NewOnboardingForm,
    ) -> Result<OnboardingForm, DbError>;
    async fn update_onboarding_form(
        &self,
        id: i64,
        update: &OnboardingFormUpdate,
    ) -> Result<Option<OnboardingForm>, DbError>;
    async fn delete_onboarding_form(&self, id: i64) -> Result<bool, DbError>;
    async fn list_onboarding_submissions(
        &self,
        form_id: i64,
    ) -> Result<Vec<OnboardingSubmission>, DbError>;
    async fn create_onboarding_submission(
        &self,
        form_id: i64,
        new: &NewOnboardingSubmission,
    ) -> Result<OnboardingSubmission, DbError>;

    // --- Signatures ---
    async fn list_signature_requests(&self) -> Result<Vec<SignatureRequest>, DbError>;
    async fn get_signature_request(&self, id: i64) -> Result<Option<SignatureRequest>, DbError>;
    async fn create_signature_request(
        &self,
        new: &NewSignatureRequest,
    ) -> Result<SignatureRequest, DbError>;
    /// For `Sign`, `input.note` carries the signature data; for `Decline`,
    /// the reason.
    async fn transition_signature_request(
        &self,
        id: i64,
        action: SignatureAction,
        input: &TransitionInput,
    ) -> Result<Option<SignatureRequest>, DbError>;
    async fn delete_signature_request(&self, id: i64) -> Result<bool, DbError>;

    // --- PAFs ---
    async fn list_pafs(&self) -> Result<Vec<Paf>, DbError>;
    async fn get_paf(&self, id: i64) -> Result<Option<Paf>, DbError>;
    /// `status` is either `Draft` or `Submitted` (the one-step submit form).
    async fn create_paf(&self, new: &NewPaf, status: PafStatus) -> Result<Paf, DbError>;
    /// `None` when the form is missing, approved or denied.
    async fn update_paf(&self, id: i64, update: &PafUpdate) -> Result<Option<Paf>, DbError>;
    async fn transition_paf(
        &self,
        id: i64,
        action: PafAction,
        input: &TransitionInput,
    ) -> Result<Option<Paf>, DbError>;
    async fn delete_paf(&self, id: i64) -> Result<bool, DbError>;

    // --- Employee accounts ---
    async fn list_employee_accounts(&self) -> Result<Vec<EmployeeAccount>, DbError>;
    async fn get_employee_account(&self, id: i64) -> Result<Option<EmployeeAccount>, DbError>;
    async fn create_employee_account(
        &self,
        new: &NewEmployeeAccount,
    ) -> Result<EmployeeAccount, DbError>;
    /// `level` is only written by `GrantAccess`; `RevokeAccess` resets it to
    /// `NoAccess` and `Suspend` leaves it untouched.
    async fn transition_employee_account(
        &self,
        id: i64,
        action: AccountAction,
        level: AccessLevel,
        input: &TransitionInput,
    ) -> Result<Option<EmployeeAccount>, DbError>;
    async fn delete_employee_account(&self, id: i64) -> Result<bool, DbError>;

    // --- Workflow templates ---
    async fn list_workflow_templates(&self) -> Result<Vec<WorkflowTemplate>, DbError>;
    async fn get_workflow_template(&self, id: i64) -> Result<Option<WorkflowTemplate>, DbError>;
    async fn create_workflow_template(
        &self,
        new: &NewWorkflowTemplate,
    ) -> Result<WorkflowTemplate, DbError>;
    async fn update_workflow_template(
        &self,
        id: i64,
        update: &WorkflowTemplateUpdate,
    ) -> Result<Option<WorkflowTemplate>, DbError>;
    async fn delete_workflow_template(&self, id: i64) -> Result<bool, DbError>;

    // --- Audit log ---
    async fn create_audit_log(&self, new: &NewAuditLog) -> Result<AuditLog, DbError>;
    async fn list_audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DbError>;

    // --- Reporting & maintenance ---
    async fn dashboard_stats(&self) -> Result<DashboardStats, DbError>;
    /// Deletes every row of `table`, returning the number removed.
    /// Fails with [`DbError::MissingTable`] when the table does not exist.
    async fn delete_all_rows(&self, table: &str) -> Result<u64, DbError>;
}
