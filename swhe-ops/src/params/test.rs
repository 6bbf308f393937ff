//! Tests for the parameter generator.

use crate::params::{estimated_security, generate, Expr};

#[test]
fn leaf_estimates() {
    // A leaf below the base is a single digit: degree 0, norm M.
    let bound = Expr::value(1).estimate(2);
    assert_eq!(bound.degree, 0);
    assert_eq!(bound.inf_norm, 1);

    // 5 in base 2 takes 3 digits (degree 2), each below the base.
    let bound = Expr::value(5).estimate(2);
    assert_eq!(bound.degree, 2);
    assert_eq!(bound.inf_norm, 1);

    // 5 in base 10 is one digit of value 5.
    let bound = Expr::value(5).estimate(10);
    assert_eq!(bound.degree, 0);
    assert_eq!(bound.inf_norm, 5);
}

#[test]
fn addition_adds_norms_and_keeps_the_larger_degree() {
    let expr = Expr::plus(Expr::value(5), Expr::value(9));

    let bound = expr.estimate(10);
    assert_eq!(bound.degree, 0);
    assert_eq!(bound.inf_norm, 14);
}

#[test]
fn multiplication_adds_degrees_and_scales_norms() {
    // 255 in base 2: degree 7, norm 1; 15: degree 3, norm 1.
    let expr = Expr::multiply(Expr::value(255), Expr::value(15));

    let bound = expr.estimate(2);
    assert_eq!(bound.degree, 10);
    // 2 * (min(7, 3) + 1) * 1 * 1.
    assert_eq!(bound.inf_norm, 8);
}

#[test]
fn mult_depth_counts_sequential_multiplications() {
    let v = || Expr::value(2);

    assert_eq!(v().mult_depth(), 0);
    assert_eq!(Expr::plus(v(), v()).mult_depth(), 0);
    assert_eq!(Expr::multiply(v(), v()).mult_depth(), 1);
    assert_eq!(
        Expr::multiply(Expr::multiply(v(), v()), v()).mult_depth(),
        2
    );
    assert_eq!(
        Expr::plus(Expr::multiply(v(), v()), Expr::multiply(v(), v())).mult_depth(),
        1
    );
}

/// The depth-3 sample circuit: `1 * 2 + 1 * 2`.
fn sample_tree() -> Expr {
    Expr::plus(
        Expr::multiply(Expr::value(1), Expr::value(2)),
        Expr::multiply(Expr::value(1), Expr::value(2)),
    )
}

#[test]
fn generated_parameters_validate_and_meet_the_target() {
    let security_level = 128;
    let settings = generate(&sample_tree(), security_level, 20);

    assert!(settings.validate().is_ok());

    // Recompute the security estimate from the accepted parameters.
    let bound = sample_tree().estimate(settings.b);
    let security = estimated_security(settings.n(), settings.q_bits(), bound.inf_norm);
    assert!(
        security >= security_level,
        "estimated security {security} below target {security_level}"
    );

    // The result polynomial fits into the ring.
    assert!(bound.degree < settings.n() as u64);
}

#[test]
fn generated_plaintext_modulus_covers_the_norm_bound() {
    let settings = generate(&sample_tree(), 128, 20);

    let bound = sample_tree().estimate(settings.b);
    assert!(settings.t.is_power_of_two());
    assert!(u128::from(settings.t) > bound.inf_norm);

    // D = 2 + multiplicative depth.
    assert_eq!(settings.max_len as u64, 2 + sample_tree().mult_depth());
}

#[test]
fn unbounded_improvement_reaches_the_congruence() {
    use num_bigint_dig::BigUint;
    use num_traits::One;

    // Any security level is acceptable here; the point is the congruence,
    // so the first n the search tries is taken.
    let settings = generate(&sample_tree(), -200, -1);
    let q = settings.ring.q.to_biguint().expect("q is positive");
    let two_n = BigUint::from(2 * settings.n() as u64);

    assert_eq!(&q % &two_n, BigUint::one());
}
