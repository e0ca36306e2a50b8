//! The dedicated status-change actions each endpoint performs.
//!
//! An action names the statuses it may start from and the status it leaves
//! the row in. The storage layer applies it as a single conditional update,
//! so an out-of-order call simply matches no row.

use crate::enums::{
    labels, AccountStatus, ExtraPayStatus, LeaveStatus, PafStatus, PayrollStatus, SignatureStatus,
    StatusLabel, TimecardStatus,
};
use serde::{Deserialize, Serialize};

pub trait StatusTransition: Copy {
    type Status: StatusLabel;

    /// Statuses the row must currently be in.
    fn allowed_from(&self) -> &'static [Self::Status];

    /// Status the row ends up in.
    fn target(&self) -> Self::Status;

    /// Verb recorded in the audit log.
    fn name(&self) -> &'static str;

    fn permits(&self, current: Self::Status) -> bool {
        self.allowed_from().contains(&current)
    }

    /// The allowed statuses as column labels, ready to bind as `text[]`.
    fn allowed_labels(&self) -> Vec<String> {
        labels(self.allowed_from())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimecardAction {
    Submit,
    EmployeeApprove,
    AdminApprove,
    PayrollProcess,
    Reject,
}

impl StatusTransition for TimecardAction {
    type Status = TimecardStatus;

    fn allowed_from(&self) -> &'static [TimecardStatus] {
        use TimecardStatus::*;
        match self {
            TimecardAction::Submit => &[Draft, Rejected],
            TimecardAction::EmployeeApprove => &[SecretarySubmitted],
            TimecardAction::AdminApprove => &[EmployeeApproved],
            TimecardAction::PayrollProcess => &[AdminApproved],
            TimecardAction::Reject => &[SecretarySubmitted, EmployeeApproved, AdminApproved],
        }
    }

    fn target(&self) -> TimecardStatus {
        match self {
            TimecardAction::Submit => TimecardStatus::SecretarySubmitted,
            TimecardAction::EmployeeApprove => TimecardStatus::EmployeeApproved,
            TimecardAction::AdminApprove => TimecardStatus::AdminApproved,
            TimecardAction::PayrollProcess => TimecardStatus::PayrollProcessed,
            TimecardAction::Reject => TimecardStatus::Rejected,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TimecardAction::Submit => "submit",
            TimecardAction::EmployeeApprove => "employee_approve",
            TimecardAction::AdminApprove => "admin_approve",
            TimecardAction::PayrollProcess => "payroll_process",
            TimecardAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveAction {
    Approve,
    Reject,
    Cancel,
}

impl StatusTransition for LeaveAction {
    type Status = LeaveStatus;

    fn allowed_from(&self) -> &'static [LeaveStatus] {
        &[LeaveStatus::Pending]
    }

    fn target(&self) -> LeaveStatus {
        match self {
            LeaveAction::Approve => LeaveStatus::Approved,
            LeaveAction::Reject => LeaveStatus::Rejected,
            LeaveAction::Cancel => LeaveStatus::Cancelled,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LeaveAction::Approve => "approve",
            LeaveAction::Reject => "reject",
            LeaveAction::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayrollAction {
    Process,
    MarkPaid,
}

impl StatusTransition for PayrollAction {
    type Status = PayrollStatus;

    fn allowed_from(&self) -> &'static [PayrollStatus] {
        match self {
            PayrollAction::Process => &[PayrollStatus::Pending],
            PayrollAction::MarkPaid => &[PayrollStatus::Processed],
        }
    }

    fn target(&self) -> PayrollStatus {
        match self {
            PayrollAction::Process => PayrollStatus::Processed,
            PayrollAction::MarkPaid => PayrollStatus::Paid,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PayrollAction::Process => "process",
            PayrollAction::MarkPaid => "mark_paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraPayAction {
    Approve,
    Reject,
    MarkPaid,
}

impl StatusTransition for ExtraPayAction {
    type Status = ExtraPayStatus;

    fn allowed_from(&self) -> &'static [ExtraPayStatus] {
        match self {
            ExtraPayAction::Approve | ExtraPayAction::Reject => &[ExtraPayStatus::Pending],
            ExtraPayAction::MarkPaid => &[ExtraPayStatus::Approved],
        }
    }

    fn target(&self) -> ExtraPayStatus {
        match self {
            ExtraPayAction::Approve => ExtraPayStatus::Approved,
            ExtraPayAction::Reject => ExtraPayStatus::Rejected,
            ExtraPayAction::MarkPaid => ExtraPayStatus::Paid,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExtraPayAction::Approve => "approve",
            ExtraPayAction::Reject => "reject",
            ExtraPayAction::MarkPaid => "mark_paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAction {
    Sign,
    Decline,
}

impl StatusTransition for SignatureAction {
    type Status = SignatureStatus;

    fn allowed_from(&self) -> &'static [SignatureStatus] {
        &[SignatureStatus::Pending]
    }

    fn target(&self) -> SignatureStatus {
        match self {
            SignatureAction::Sign => SignatureStatus::Signed,
            SignatureAction::Decline => SignatureStatus::Declined,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SignatureAction::Sign => "sign",
            SignatureAction::Decline => "decline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PafAction {
    Submit,
    Review,
    Approve,
    Deny,
}

impl StatusTransition for PafAction {
    type Status = PafStatus;

    fn allowed_from(&self) -> &'static [PafStatus] {
        match self {
            PafAction::Submit => &[PafStatus::Draft],
            PafAction::Review => &[PafStatus::Submitted],
            PafAction::Approve | PafAction::Deny => &[PafStatus::Submitted, PafStatus::UnderReview],
        }
    }

    fn target(&self) -> PafStatus {
        match self {
            PafAction::Submit => PafStatus::Submitted,
            PafAction::Review => PafStatus::UnderReview,
            PafAction::Approve => PafStatus::Approved,
            PafAction::Deny => PafStatus::Denied,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PafAction::Submit => "submit",
            PafAction::Review => "review",
            PafAction::Approve => "approve",
            PafAction::Deny => "deny",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountAction {
    GrantAccess,
    Suspend,
    RevokeAccess,
}

impl StatusTransition for AccountAction {
    type Status = AccountStatus;

    fn allowed_from(&self) -> &'static [AccountStatus] {
        use AccountStatus::*;
        match self {
            AccountAction::GrantAccess => &[Pending, Suspended],
            AccountAction::Suspend => &[Active],
            AccountAction::RevokeAccess => &[Pending, Active, Suspended],
        }
    }

    fn target(&self) -> AccountStatus {
        match self {
            AccountAction::GrantAccess => AccountStatus::Active,
            AccountAction::Suspend => AccountStatus::Suspended,
            AccountAction::RevokeAccess => AccountStatus::Revoked,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AccountAction::GrantAccess => "grant_access",
            AccountAction::Suspend => "suspend",
            AccountAction::RevokeAccess => "revoke_access",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecard_stages_only_move_forward_one_step() {
        assert!(TimecardAction::Submit.permits(TimecardStatus::Draft));
        assert!(TimecardAction::EmployeeApprove.permits(TimecardStatus::SecretarySubmitted));
        assert!(!TimecardAction::AdminApprove.permits(TimecardStatus::SecretarySubmitted));
        assert!(!TimecardAction::PayrollProcess.permits(TimecardStatus::EmployeeApproved));
        assert!(!TimecardAction::Reject.permits(TimecardStatus::PayrollProcessed));
    }

    #[test]
    fn rejected_timecard_can_be_resubmitted() {
        assert!(TimecardAction::Submit.permits(TimecardStatus::Rejected));
        assert_eq!(TimecardAction::Submit.target(), TimecardStatus::SecretarySubmitted);
    }

    #[test]
    fn extra_pay_must_be_approved_before_payment() {
        assert!(!ExtraPayAction::MarkPaid.permits(ExtraPayStatus::Pending));
        assert!(ExtraPayAction::MarkPaid.permits(ExtraPayStatus::Approved));
        assert!(!ExtraPayAction::Approve.permits(ExtraPayStatus::Paid));
    }

    #[test]
    fn revoked_account_is_terminal() {
        for action in [
            AccountAction::GrantAccess,
            AccountAction::Suspend,
            AccountAction::RevokeAccess,
        ] {
            assert!(!action.permits(AccountStatus::Revoked));
        }
    }

    #[test]
    fn allowed_labels_match_column_values() {
        assert_eq!(
            PafAction::Approve.allowed_labels(),
            vec!["submitted".to_string(), "under_review".to_string()]
        );
    }
}
