use crate::enums::PayrollStatus;
use crate::error::CoreError;
use crate::validation::{require_date_order, require_non_negative};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: i64,
    pub employee_id: i64,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub gross_pay: Decimal,
    pub deductions: Decimal,
    pub net_pay: Decimal,
    #[sqlx(try_from = "String")]
    pub status: PayrollStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayrollRecord {
    pub employee_id: i64,
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
    pub gross_pay: Decimal,
    #[serde(default)]
    pub deductions: Decimal,
    /// Defaults to `gross_pay - deductions`.
    pub net_pay: Option<Decimal>,
}

impl NewPayrollRecord {
    pub fn resolved_net_pay(&self) -> Decimal {
        self.net_pay.unwrap_or(self.gross_pay - self.deductions)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_date_order(
            "payPeriodStart",
            self.pay_period_start,
            "payPeriodEnd",
            self.pay_period_end,
        )?;
        require_non_negative("grossPay", self.gross_pay)?;
        require_non_negative("deductions", self.deductions)?;
        require_non_negative("netPay", self.resolved_net_pay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(gross: Decimal, deductions: Decimal, net: Option<Decimal>) -> NewPayrollRecord {
        NewPayrollRecord {
            employee_id: 7,
            pay_period_start: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            pay_period_end: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
            gross_pay: gross,
            deductions,
            net_pay: net,
        }
    }

    #[test]
    fn net_pay_defaults_to_gross_minus_deductions() {
        assert_eq!(record(dec!(4200.00), dec!(812.35), None).resolved_net_pay(), dec!(3387.65));
        assert_eq!(
            record(dec!(4200.00), dec!(812.35), Some(dec!(3000))).resolved_net_pay(),
            dec!(3000)
        );
    }

    #[test]
    fn deductions_above_gross_are_rejected() {
        assert!(record(dec!(100), dec!(150), None).validate().is_err());
    }
}
