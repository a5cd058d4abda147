mod common;

use common::scenario_catalog;
use tuition::domain::{
    Catalog, CatalogError, CourseName, DuplicateCoursePolicy, LedgerError, PaymentShortfall,
    evaluate_add_courses, evaluate_enrollment_payment, evaluate_replace_course, required_payment,
    total_fee,
};

/// Every subset of the standard catalog, as course-name lists.
fn all_subsets(catalog: &Catalog) -> Vec<Vec<CourseName>> {
    let names: Vec<CourseName> = catalog.courses().map(|c| c.name.clone()).collect();
    (0..1u32 << names.len())
        .map(|mask| {
            names
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, name)| name.clone())
                .collect()
        })
        .collect()
}

#[test]
fn test_total_fee_matches_sum_of_prices_for_every_subset() {
    let catalog = Catalog::standard();
    let subsets = all_subsets(catalog);
    assert_eq!(subsets.len(), 64);

    for subset in &subsets {
        let expected: i64 = subset
            .iter()
            .map(|c| catalog.price_of(c).unwrap())
            .sum();
        assert_eq!(total_fee(catalog, subset), Ok(expected), "{:?}", subset);
    }

    let none: Vec<CourseName> = Vec::new();
    assert_eq!(total_fee(catalog, &none), Ok(0));
}

#[test]
fn test_enrollment_accepts_iff_payment_covers_fee() {
    let catalog = Catalog::standard();
    for subset in all_subsets(catalog) {
        let fee = total_fee(catalog, &subset).unwrap();
        for paid in [0, fee - 1, fee, fee + 1, fee + 250_000] {
            let decision = evaluate_enrollment_payment(catalog, &subset, paid).unwrap();
            assert_eq!(decision.accepted, paid >= fee);
            if decision.accepted {
                assert_eq!(decision.balance, paid - fee);
                assert!(decision.balance >= 0);
            } else {
                assert_eq!(decision.shortfall, fee - paid);
            }
        }
    }
}

#[test]
fn test_add_courses_never_goes_negative() {
    let catalog = Catalog::standard();
    for subset in all_subsets(catalog) {
        for balance in [0, 50_000, 200_000, 1_000_000, 3_000_000] {
            let decision =
                evaluate_add_courses(catalog, balance, &[], &subset, DuplicateCoursePolicy::Allow)
                    .unwrap();
            let paid = decision.needs_payment.then_some(decision.shortfall);
            let result = decision.resulting_balance(paid).unwrap();
            assert!(result >= 0);
            assert_eq!(result, (balance - decision.fee).max(0));
        }
    }
}

#[test]
fn test_replace_result_is_balance_minus_difference() {
    let catalog = Catalog::standard();
    let names: Vec<CourseName> = catalog.courses().map(|c| c.name.clone()).collect();

    for old in &names {
        for new in &names {
            for balance in [0, 100_000, 500_000] {
                let decision = evaluate_replace_course(catalog, balance, old, new).unwrap();
                if decision.needs_payment {
                    // Paying exactly the difference leaves the prior credit intact
                    let result = decision.resulting_balance(Some(decision.difference)).unwrap();
                    assert_eq!(result, balance);
                    assert!(decision.resulting_balance(Some(decision.shortfall - 1)).is_err());
                } else {
                    let result = decision.resulting_balance(None).unwrap();
                    assert_eq!(result, balance - decision.difference);
                    assert!(result >= 0);
                }
            }
        }
    }
}

#[test]
fn test_scenario_a_full_payment() {
    let catalog = scenario_catalog();
    let decision = evaluate_enrollment_payment(&catalog, &["HTML&CSS", "Python"], 8000).unwrap();
    assert!(decision.accepted);
    assert_eq!(decision.balance, 0);
}

#[test]
fn test_scenario_b_short_payment() {
    let catalog = scenario_catalog();
    let decision = evaluate_enrollment_payment(&catalog, &["HTML&CSS", "Python"], 5000).unwrap();
    assert!(!decision.accepted);
    assert_eq!(decision.shortfall, 3000);
    assert_eq!(required_payment(&catalog, &["HTML&CSS", "Python"], 0), Ok(8000));
}

#[test]
fn test_scenario_c_add_course_with_shortfall() {
    let catalog = scenario_catalog();
    let decision = evaluate_add_courses(
        &catalog,
        1000,
        &[],
        &["HTML&CSS"],
        DuplicateCoursePolicy::Allow,
    )
    .unwrap();
    assert!(decision.needs_payment);
    assert_eq!(decision.shortfall, 1000);
    assert_eq!(decision.resulting_balance(Some(1000)), Ok(0));
}

#[test]
fn test_scenario_d_replace_with_shortfall() {
    let catalog = scenario_catalog();
    let decision = evaluate_replace_course(&catalog, 500, "HTML&CSS", "Python").unwrap();
    assert_eq!(decision.difference, 4000);
    assert!(decision.needs_payment);
    assert_eq!(decision.shortfall, 3500);
    assert_eq!(decision.resulting_balance(Some(4000)), Ok(500));
    assert_eq!(
        decision.resulting_balance(Some(3000)),
        Err(LedgerError::Shortfall(PaymentShortfall {
            required: 3500,
            paid: 3000
        }))
    );
}

#[test]
fn test_unknown_course_propagates() {
    let catalog = scenario_catalog();
    assert_eq!(
        evaluate_enrollment_payment(&catalog, &["Haskell"], 100_000).map(|d| d.accepted),
        Err(CatalogError::UnknownCourse("Haskell".into()))
    );
}
