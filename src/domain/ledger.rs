use thiserror::Error;

use super::{Amount, Catalog, CatalogError, CourseName};

/// How the add-course evaluator treats courses the student already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateCoursePolicy {
    /// Enroll again and charge again.
    #[default]
    Allow,
    /// Refuse courses already enrolled or listed twice in one request.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Course already enrolled: {0}")]
    DuplicateCourse(String),

    #[error(transparent)]
    Shortfall(#[from] PaymentShortfall),

    #[error("Amount out of range")]
    AmountOutOfRange,
}

/// A follow-up payment that does not cover the shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Insufficient payment: required {required}, paid {paid}")]
pub struct PaymentShortfall {
    pub required: Amount,
    pub paid: Amount,
}

/// Sum of the prices of `courses`. An empty list costs nothing.
pub fn total_fee<S: AsRef<str>>(
    catalog: &Catalog,
    courses: &[S],
) -> Result<Amount, CatalogError> {
    courses
        .iter()
        .map(|c| catalog.price_of(c.as_ref()))
        .sum()
}

/// What still has to be paid for `courses` once `credit_applied` is used up.
pub fn required_payment<S: AsRef<str>>(
    catalog: &Catalog,
    courses: &[S],
    credit_applied: Amount,
) -> Result<Amount, CatalogError> {
    Ok((total_fee(catalog, courses)? - credit_applied).max(0))
}

/// Shared rule for follow-up payments: `paid` must cover `shortfall`,
/// whatever is left over becomes the new balance.
pub fn resolve_payment(shortfall: Amount, paid: Amount) -> Result<Amount, PaymentShortfall> {
    if paid >= shortfall {
        Ok(paid - shortfall)
    } else {
        Err(PaymentShortfall {
            required: shortfall,
            paid,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentDecision {
    pub accepted: bool,
    pub total_fee: Amount,
    /// Credit left after paying the fee; zero when rejected.
    pub balance: Amount,
    /// Missing amount; zero when accepted.
    pub shortfall: Amount,
}

/// Decide whether `amount_paid` covers enrollment in `courses`.
pub fn evaluate_enrollment_payment<S: AsRef<str>>(
    catalog: &Catalog,
    courses: &[S],
    amount_paid: Amount,
) -> Result<EnrollmentDecision, CatalogError> {
    let fee = total_fee(catalog, courses)?;
    let decision = if amount_paid >= fee {
        EnrollmentDecision {
            accepted: true,
            total_fee: fee,
            balance: amount_paid - fee,
            shortfall: 0,
        }
    } else {
        EnrollmentDecision {
            accepted: false,
            total_fee: fee,
            balance: 0,
            shortfall: fee - amount_paid,
        }
    };
    Ok(decision)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddCoursesDecision {
    /// Total price of the courses being added.
    pub fee: Amount,
    pub needs_payment: bool,
    pub shortfall: Amount,
    /// Balance before any follow-up payment. Zero when a payment is needed:
    /// the existing credit has been fully spent against the fee.
    pub auto_balance: Amount,
}

impl AddCoursesDecision {
    /// Balance after applying an optional follow-up payment.
    pub fn resulting_balance(&self, paid: Option<Amount>) -> Result<Amount, LedgerError> {
        settle(self.needs_payment, self.shortfall, self.auto_balance, paid)
    }
}

/// Apply `policy` to a request for `new_courses` on top of `enrolled`.
pub fn check_duplicates<S: AsRef<str>>(
    enrolled: &[CourseName],
    new_courses: &[S],
    policy: DuplicateCoursePolicy,
) -> Result<(), LedgerError> {
    if policy == DuplicateCoursePolicy::Allow {
        return Ok(());
    }
    for (i, course) in new_courses.iter().enumerate() {
        let course = course.as_ref();
        let repeated = new_courses[..i].iter().any(|c| c.as_ref() == course);
        if repeated || enrolled.iter().any(|c| c == course) {
            return Err(LedgerError::DuplicateCourse(course.to_string()));
        }
    }
    Ok(())
}

/// Price `new_courses` against the student's existing credit.
pub fn evaluate_add_courses<S: AsRef<str>>(
    catalog: &Catalog,
    existing_balance: Amount,
    enrolled: &[CourseName],
    new_courses: &[S],
    policy: DuplicateCoursePolicy,
) -> Result<AddCoursesDecision, LedgerError> {
    check_duplicates(enrolled, new_courses, policy)?;

    let fee = total_fee(catalog, new_courses)?;
    let decision = if fee <= existing_balance {
        AddCoursesDecision {
            fee,
            needs_payment: false,
            shortfall: 0,
            auto_balance: existing_balance - fee,
        }
    } else {
        AddCoursesDecision {
            fee,
            needs_payment: true,
            shortfall: fee - existing_balance,
            auto_balance: 0,
        }
    };
    Ok(decision)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceCourseDecision {
    pub old_price: Amount,
    pub new_price: Amount,
    /// `new_price - old_price`; negative when the new course is cheaper.
    pub difference: Amount,
    pub needs_payment: bool,
    pub shortfall: Amount,
    pub auto_balance: Amount,
}

impl ReplaceCourseDecision {
    /// Balance after applying an optional follow-up payment.
    pub fn resulting_balance(&self, paid: Option<Amount>) -> Result<Amount, LedgerError> {
        settle(self.needs_payment, self.shortfall, self.auto_balance, paid)
    }
}

/// Price swapping `old_course` for `new_course`.
///
/// A cheaper replacement goes through the same formula: the negative
/// difference is subtracted, so the balance grows by the price gap.
/// Whether `old_course` is actually enrolled is not checked here.
pub fn evaluate_replace_course(
    catalog: &Catalog,
    existing_balance: Amount,
    old_course: &str,
    new_course: &str,
) -> Result<ReplaceCourseDecision, LedgerError> {
    let old_price = catalog.price_of(old_course)?;
    let new_price = catalog.price_of(new_course)?;
    let difference = new_price - old_price;

    let decision = if difference <= existing_balance {
        ReplaceCourseDecision {
            old_price,
            new_price,
            difference,
            needs_payment: false,
            shortfall: 0,
            auto_balance: existing_balance
                .checked_sub(difference)
                .ok_or(LedgerError::AmountOutOfRange)?,
        }
    } else {
        ReplaceCourseDecision {
            old_price,
            new_price,
            difference,
            needs_payment: true,
            shortfall: difference - existing_balance,
            auto_balance: 0,
        }
    };
    Ok(decision)
}

fn settle(
    needs_payment: bool,
    shortfall: Amount,
    auto_balance: Amount,
    paid: Option<Amount>,
) -> Result<Amount, LedgerError> {
    let paid = paid.unwrap_or(0);
    let credit = if needs_payment {
        resolve_payment(shortfall, paid)?
    } else {
        // Nothing was owed, the whole payment becomes credit
        paid
    };
    auto_balance
        .checked_add(credit)
        .ok_or(LedgerError::AmountOutOfRange)
}
