// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use rand::Rng;
use rand::rngs::mock::StepRng;
use tuition::application::EnrollmentService;
use tuition::cli::{OutputFormat, Session};
use tuition::domain::{Amount, Catalog, CourseName, Payment, PaymentMethod, rupees};

/// The two-course catalog used by the worked scenarios, in whole rupees.
pub fn scenario_catalog() -> Catalog {
    Catalog::new([("HTML&CSS", 2000), ("Python", 6000), ("MS.Office", 1000)]).unwrap()
}

/// Service over the scenario catalog with a fixed id sequence.
pub fn scenario_service() -> EnrollmentService {
    EnrollmentService::seeded(scenario_catalog(), 42)
}

/// Service over the standard catalog whose first student always gets id 10000.
pub fn standard_service() -> EnrollmentService<StepRng> {
    EnrollmentService::with_rng(Catalog::standard().clone(), StepRng::new(0, 0))
}

pub fn pay(amount: Amount) -> Payment {
    Payment::new(PaymentMethod::BankTransfer, amount)
}

pub fn pay_rupees(units: i64) -> Payment {
    pay(rupees(units))
}

pub fn courses(names: &[&str]) -> Vec<CourseName> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Drive a scripted interactive session and return the final service and transcript.
pub async fn run_script<G: Rng>(
    service: EnrollmentService<G>,
    script: &str,
    format: OutputFormat,
) -> Result<(EnrollmentService<G>, String)> {
    let mut session = Session::new(service, script.as_bytes(), Vec::new(), format);
    session.run().await?;
    let (service, output) = session.into_parts();
    Ok((service, String::from_utf8(output)?))
}
