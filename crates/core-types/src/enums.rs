use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fixed vocabulary that is stored as a lowercase text column.
pub trait StatusLabel: Copy + PartialEq + 'static {
    fn as_str(&self) -> &'static str;
}

/// Column labels for a set of statuses, ready to bind as `text[]`.
pub fn labels<S: StatusLabel>(statuses: &[S]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Declares a text-backed enum. The same label is used for serde, `Display`,
/// `FromStr` and the database column, so the three can never drift apart.
/// The first variant is the default.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl StatusLabel for $name {
            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

text_enum! {
    /// What a signed-in user is allowed to do in the UI.
    UserRole, "user role" {
        Employee => "employee",
        Secretary => "secretary",
        Admin => "admin",
        Hr => "hr",
        Payroll => "payroll",
    }
}

text_enum! {
    EmployeeStatus, "employee status" {
        Active => "active",
        Inactive => "inactive",
        OnLeave => "on_leave",
        Terminated => "terminated",
    }
}

text_enum! {
    LeaveStatus, "leave status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Approval stage of a time card. Cards move secretary → employee →
    /// admin → payroll; `Rejected` sends them back to the secretary.
    TimecardStatus, "timecard status" {
        Draft => "draft",
        SecretarySubmitted => "secretary_submitted",
        EmployeeApproved => "employee_approved",
        AdminApproved => "admin_approved",
        PayrollProcessed => "payroll_processed",
        Rejected => "rejected",
    }
}

text_enum! {
    PayrollStatus, "payroll status" {
        Pending => "pending",
        Processed => "processed",
        Paid => "paid",
    }
}

text_enum! {
    ContractStatus, "contract status" {
        Active => "active",
        Inactive => "inactive",
        Completed => "completed",
    }
}

text_enum! {
    ExtraPayStatus, "extra pay status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Paid => "paid",
    }
}

text_enum! {
    OnboardingStatus, "onboarding status" {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

text_enum! {
    SubmissionStatus, "submission status" {
        Submitted => "submitted",
        Reviewed => "reviewed",
    }
}

text_enum! {
    SignatureStatus, "signature status" {
        Pending => "pending",
        Signed => "signed",
        Declined => "declined",
        Expired => "expired",
    }
}

text_enum! {
    PafStatus, "PAF status" {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Denied => "denied",
    }
}

text_enum! {
    /// The kind of staffing change a personnel action form requests.
    PafType, "PAF type" {
        NewPosition => "new_position",
        Replacement => "replacement",
        Vacancy => "vacancy",
        Change => "change",
    }
}

text_enum! {
    AccountStatus, "account status" {
        Pending => "pending",
        Active => "active",
        Suspended => "suspended",
        Revoked => "revoked",
    }
}

text_enum! {
    AccessLevel, "access level" {
        NoAccess => "none",
        Basic => "basic",
        Standard => "standard",
        Admin => "admin",
    }
}

text_enum! {
    TemplateCategory, "template category" {
        General => "general",
        Timecard => "timecard",
        Paf => "paf",
        Onboarding => "onboarding",
        Leave => "leave",
        ExtraPay => "extra_pay",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for status in TimecardStatus::ALL {
            assert_eq!(status.as_str().parse::<TimecardStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn serde_uses_the_column_label() {
        let json = serde_json::to_string(&TimecardStatus::SecretarySubmitted).unwrap();
        assert_eq!(json, "\"secretary_submitted\"");
        let parsed: EmployeeStatus = serde_json::from_str("\"on_leave\"").unwrap();
        assert_eq!(parsed, EmployeeStatus::OnLeave);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "archived".parse::<PafStatus>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownVariant {
                kind: "PAF status",
                value: "archived".to_string()
            }
        );
    }

    #[test]
    fn first_variant_is_the_default() {
        assert_eq!(TimecardStatus::default(), TimecardStatus::Draft);
        assert_eq!(ExtraPayStatus::default(), ExtraPayStatus::Pending);
        assert_eq!(UserRole::default(), UserRole::Employee);
    }
}
