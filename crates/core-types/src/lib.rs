//! # District HR Core Types
//!
//! Entity rows, request payloads and status vocabularies shared by the
//! database and web-server crates. Row structs derive `sqlx::FromRow` so the
//! storage layer maps query results straight into them; every struct
//! serializes with camelCase field names for the browser client.

pub mod account;
pub mod audit;
pub mod dashboard;
pub mod employee;
pub mod enums;
pub mod error;
pub mod extra_pay;
pub mod leave;
pub mod onboarding;
pub mod paf;
pub mod payroll;
pub mod signature;
pub mod timecard;
pub mod transitions;
pub mod user;
pub mod validation;
pub mod workflow;

// Re-export the core types to provide a clean public API.
pub use account::{AccountChange, EmployeeAccount, GrantAccess, NewEmployeeAccount};
pub use audit::{AuditFilter, AuditLog, NewAuditLog};
pub use dashboard::DashboardStats;
pub use employee::{Employee, EmployeeUpdate, NewEmployee};
pub use enums::{
    AccessLevel, AccountStatus, ContractStatus, EmployeeStatus, ExtraPayStatus, LeaveStatus,
    OnboardingStatus, PafStatus, PafType, PayrollStatus, SignatureStatus, StatusLabel,
    SubmissionStatus, TemplateCategory, TimecardStatus, UserRole,
};
pub use error::CoreError;
pub use extra_pay::{
    ExtraPayContract, ExtraPayContractUpdate, ExtraPayDecision, ExtraPayRequest,
    NewExtraPayContract, NewExtraPayRequest,
};
pub use leave::{LeaveDecision, LeaveRequest, LeaveType, NewLeaveRequest, NewLeaveType};
pub use onboarding::{
    NewOnboardingForm, NewOnboardingSubmission, NewOnboardingWorkflow, OnboardingForm,
    OnboardingFormUpdate, OnboardingSubmission, OnboardingWorkflow, OnboardingWorkflowUpdate,
};
pub use paf::{NewPaf, Paf, PafDecision, PafUpdate};
pub use payroll::{NewPayrollRecord, PayrollRecord};
pub use signature::{DeclineDocument, NewSignatureRequest, SignDocument, SignatureRequest};
pub use timecard::{NewTimeCard, TimeCard, TimeCardUpdate, TimecardStep};
pub use transitions::{
    AccountAction, ExtraPayAction, LeaveAction, PafAction, PayrollAction, SignatureAction,
    StatusTransition, TimecardAction,
};
pub use user::{LoginRequest, NewUser, User};
pub use workflow::{NewWorkflowTemplate, WorkflowStep, WorkflowTemplate, WorkflowTemplateUpdate};
