use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{
    AddCoursesDecision, Amount, Catalog, CourseName, DuplicateCoursePolicy, Payment,
    ReplaceCourseDecision, Student, StudentId, MAX_STUDENT_ID, MIN_STUDENT_ID, check_duplicates,
    evaluate_add_courses, evaluate_enrollment_payment, evaluate_replace_course, required_payment,
};
use crate::storage::Roster;

use super::AppError;

/// How many random ids are drawn before giving up on a collision.
pub const MAX_ID_ATTEMPTS: usize = 32;

/// Application service providing the student operations.
/// Owns the roster for the whole session; the CLI and the tests drive it.
///
/// Every mutating operation evaluates the ledger first and touches the
/// roster only once the decision (and any follow-up payment) succeeded.
pub struct EnrollmentService<R = StdRng> {
    roster: Roster,
    catalog: Catalog,
    policy: DuplicateCoursePolicy,
    rng: R,
}

impl EnrollmentService<StdRng> {
    /// Create a service with an entropy-seeded id generator.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    /// Create a service whose ids are reproducible from `seed`.
    pub fn seeded(catalog: Catalog, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EnrollmentService<R> {
    pub fn with_rng(catalog: Catalog, rng: R) -> Self {
        Self {
            roster: Roster::new(),
            catalog,
            policy: DuplicateCoursePolicy::default(),
            rng,
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateCoursePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    // ========================
    // Enrollment
    // ========================

    /// Amount a new student must pay to enroll in `courses`.
    pub fn quote_enrollment(&self, courses: &[CourseName]) -> Result<Amount, AppError> {
        Ok(required_payment(&self.catalog, courses, 0)?)
    }

    /// Enroll a new student. Nothing is stored unless the payment covers
    /// the total fee.
    pub fn enroll_student(
        &mut self,
        name: &str,
        courses: Vec<CourseName>,
        payment: Payment,
    ) -> Result<Student, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidName);
        }
        validate_payment(&payment)?;
        check_duplicates(&[], &courses, self.policy)?;

        let decision = evaluate_enrollment_payment(&self.catalog, &courses, payment.amount)?;
        if !decision.accepted {
            warn!(
                "Enrollment of {} rejected: fee {}, paid {}",
                name, decision.total_fee, payment.amount
            );
            return Err(AppError::InsufficientPayment {
                required: decision.total_fee,
                paid: payment.amount,
            });
        }

        let id = self.generate_id()?;
        let student = Student::new(id, name, courses, payment, decision.balance);
        self.roster.add(student.clone())?;

        info!(
            "Enrolled {} ({}) in {} course(s), balance {}",
            student.name,
            student.id,
            student.courses.len(),
            student.balance
        );
        Ok(student)
    }

    // ========================
    // Adding courses
    // ========================

    /// Price adding `courses` to a student, without changing anything.
    pub fn quote_add_courses(
        &self,
        id: StudentId,
        courses: &[CourseName],
    ) -> Result<AddCoursesDecision, AppError> {
        let student = self.roster.find_by_id(id)?;
        let decision = evaluate_add_courses(
            &self.catalog,
            student.balance,
            &student.courses,
            courses,
            self.policy,
        )?;
        debug!("Add-courses quote for {}: {:?}", id, decision);
        Ok(decision)
    }

    /// Add `courses` to a student, settling any shortfall with `payment`.
    pub fn add_courses(
        &mut self,
        id: StudentId,
        courses: Vec<CourseName>,
        payment: Option<Payment>,
    ) -> Result<Student, AppError> {
        if let Some(payment) = &payment {
            validate_payment(payment)?;
        }
        let decision = self.quote_add_courses(id, &courses)?;
        let balance = decision
            .resulting_balance(payment.as_ref().map(|p| p.amount))
            .inspect_err(|e| warn!("Adding courses for {} failed: {}", id, e))?;

        let student = self.roster.find_by_id_mut(id)?;
        if let Some(payment) = payment {
            student
                .record_payment(payment)
                .inspect_err(|e| warn!("Adding courses for {} failed: {}", id, e))?;
        }
        student.courses.extend(courses);
        student.balance = balance;

        info!(
            "Added courses for {} ({}), balance {}",
            student.name, student.id, student.balance
        );
        Ok(student.clone())
    }

    // ========================
    // Replacing a course
    // ========================

    /// Price swapping `old_course` for `new_course`, without changing anything.
    pub fn quote_replace_course(
        &self,
        id: StudentId,
        old_course: &str,
        new_course: &str,
    ) -> Result<ReplaceCourseDecision, AppError> {
        let student = self.roster.find_by_id(id)?;
        if !student.is_enrolled_in(old_course) {
            return Err(AppError::CourseNotEnrolled {
                id,
                course: old_course.to_string(),
            });
        }
        if new_course != old_course {
            check_duplicates(&student.courses, &[new_course], self.policy)?;
        }

        let decision =
            evaluate_replace_course(&self.catalog, student.balance, old_course, new_course)?;
        debug!("Replace quote for {}: {:?}", id, decision);
        Ok(decision)
    }

    /// Replace the first occurrence of `old_course` with `new_course`.
    pub fn replace_course(
        &mut self,
        id: StudentId,
        old_course: &str,
        new_course: &str,
        payment: Option<Payment>,
    ) -> Result<Student, AppError> {
        if let Some(payment) = &payment {
            validate_payment(payment)?;
        }
        let decision = self.quote_replace_course(id, old_course, new_course)?;
        let balance = decision
            .resulting_balance(payment.as_ref().map(|p| p.amount))
            .inspect_err(|e| warn!("Replacing {} for {} failed: {}", old_course, id, e))?;

        let student = self.roster.find_by_id_mut(id)?;
        if !student.is_enrolled_in(old_course) {
            return Err(AppError::CourseNotEnrolled {
                id,
                course: old_course.to_string(),
            });
        }
        if let Some(payment) = payment {
            student
                .record_payment(payment)
                .inspect_err(|e| warn!("Replacing {} for {} failed: {}", old_course, id, e))?;
        }
        student.substitute_course(old_course, new_course);
        student.balance = balance;

        info!(
            "Replaced {} with {} for {} ({}), balance {}",
            old_course, new_course, student.name, student.id, student.balance
        );
        Ok(student.clone())
    }

    // ========================
    // Lookup and removal
    // ========================

    pub fn get_student(&self, id: StudentId) -> Result<&Student, AppError> {
        Ok(self.roster.find_by_id(id)?)
    }

    pub fn delete_student(&mut self, id: StudentId) -> Result<Student, AppError> {
        let student = self.roster.remove(id)?;
        info!("Deleted {} ({})", student.name, student.id);
        Ok(student)
    }

    /// All students in enrollment order.
    pub fn list_students(&self) -> impl Iterator<Item = &Student> + '_ {
        self.roster.list()
    }

    /// Draw ids until one is free, up to [`MAX_ID_ATTEMPTS`] times.
    fn generate_id(&mut self) -> Result<StudentId, AppError> {
        let mut id = MIN_STUDENT_ID;
        for attempt in 1..=MAX_ID_ATTEMPTS {
            id = self.rng.gen_range(MIN_STUDENT_ID..=MAX_STUDENT_ID);
            if !self.roster.contains(id) {
                return Ok(id);
            }
            debug!("Student ID {} taken (attempt {})", id, attempt);
        }
        Err(AppError::DuplicateId(id))
    }
}

fn validate_payment(payment: &Payment) -> Result<(), AppError> {
    if payment.amount < 0 {
        return Err(AppError::InvalidAmount(
            "Amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::domain::PaymentMethod;

    fn catalog() -> Catalog {
        Catalog::new([("HTML&CSS", 2000), ("Python", 6000)]).unwrap()
    }

    fn pay(amount: Amount) -> Payment {
        Payment::new(PaymentMethod::BankTransfer, amount)
    }

    #[test]
    fn test_generated_ids_are_in_range() {
        let mut service = EnrollmentService::seeded(catalog(), 7);
        for _ in 0..50 {
            let student = service.enroll_student("Student", vec![], pay(0)).unwrap();
            assert!((MIN_STUDENT_ID..=MAX_STUDENT_ID).contains(&student.id));
        }
        assert_eq!(service.roster().len(), 50);
    }

    #[test]
    fn test_id_collision_exhausts_attempts() {
        // A constant generator always draws the same id
        let mut service = EnrollmentService::with_rng(catalog(), StepRng::new(0, 0));
        let first = service.enroll_student("Ali", vec![], pay(0)).unwrap();

        let second = service.enroll_student("Sara", vec![], pay(0));
        assert_eq!(second, Err(AppError::DuplicateId(first.id)));
        assert_eq!(service.roster().len(), 1);
    }

    #[test]
    fn test_enroll_trims_name() {
        let mut service = EnrollmentService::seeded(catalog(), 1);
        let student = service
            .enroll_student("  Hina  ", vec!["Python".into()], pay(6000))
            .unwrap();
        assert_eq!(student.name, "Hina");
    }

    #[test]
    fn test_negative_follow_up_payment_rejected() {
        let mut service = EnrollmentService::seeded(catalog(), 1);
        let student = service
            .enroll_student("Hina", vec!["HTML&CSS".into()], pay(2000))
            .unwrap();

        let result = service.add_courses(student.id, vec!["Python".into()], Some(pay(-1)));
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }
}
