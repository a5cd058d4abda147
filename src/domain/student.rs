use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, CourseName, LedgerError};

pub type StudentId = u32;

/// Lowest id handed out to a student (inclusive).
pub const MIN_STUDENT_ID: StudentId = 10_000;
/// Highest id handed out to a student (inclusive).
pub const MAX_STUDENT_ID: StudentId = 99_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Jazzcash,
    Easypaisa,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::Jazzcash,
        PaymentMethod::Easypaisa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Jazzcash => "Jazzcash",
            PaymentMethod::Easypaisa => "Easypaisa",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bank transfer" | "bank_transfer" | "bank" => Some(PaymentMethod::BankTransfer),
            "jazzcash" => Some(PaymentMethod::Jazzcash),
            "easypaisa" => Some(PaymentMethod::Easypaisa),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single accepted tuition payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    pub amount: Amount,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(method: PaymentMethod, amount: Amount) -> Self {
        Self {
            method,
            amount,
            paid_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub courses: Vec<CourseName>,
    /// Sum of every accepted payment.
    pub tuition_fee_paid: Amount,
    /// Credit carried between operations; never negative.
    pub balance: Amount,
    pub payments: Vec<Payment>,
    pub enrolled_at: DateTime<Utc>,
}

impl Student {
    /// Build a freshly enrolled student from an accepted first payment.
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        courses: Vec<CourseName>,
        payment: Payment,
        balance: Amount,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            courses,
            tuition_fee_paid: payment.amount,
            balance,
            payments: vec![payment],
            enrolled_at: Utc::now(),
        }
    }

    pub fn is_enrolled_in(&self, course: &str) -> bool {
        self.courses.iter().any(|c| c == course)
    }

    /// Record an accepted payment on the running total and history.
    /// Leaves the student untouched when the total would overflow.
    pub fn record_payment(&mut self, payment: Payment) -> Result<(), LedgerError> {
        self.tuition_fee_paid = self
            .tuition_fee_paid
            .checked_add(payment.amount)
            .ok_or(LedgerError::AmountOutOfRange)?;
        self.payments.push(payment);
        Ok(())
    }

    /// Swap the first occurrence of `old` for `new`.
    /// Returns false when `old` is not enrolled.
    pub fn substitute_course(&mut self, old: &str, new: impl Into<CourseName>) -> bool {
        match self.courses.iter().position(|c| c == old) {
            Some(index) => {
                self.courses[index] = new.into();
                true
            }
            None => false,
        }
    }
}
