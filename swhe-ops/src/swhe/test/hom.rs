//! Tests for the homomorphic operations.

use rand::thread_rng;

use crate::{
    error::Error,
    primitives::gauss::Ziggurat,
    settings::Settings,
    swhe::{test::test_scheme, Swhe},
};

#[test]
fn addition_is_homomorphic() {
    let mut rng = thread_rng();
    let (scheme, mut gauss) = test_scheme();
    let key = scheme.keygen(&mut rng, &mut gauss);

    let m1 = scheme.sample_message(&mut rng);
    let m2 = scheme.sample_message(&mut rng);
    let c1 = scheme.encrypt(&m1, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c2 = scheme.encrypt(&m2, &key, &mut gauss).expect("fresh ciphertexts fit");

    let sum = scheme.eval_add(&c1, &c2);
    let decrypted = scheme.decrypt(&sum, &key);

    assert_eq!(decrypted, scheme.centered(&(&m1 + &m2)));
}

#[test]
fn multiplication_is_homomorphic() {
    let mut rng = thread_rng();
    let (scheme, mut gauss) = test_scheme();
    let key = scheme.keygen(&mut rng, &mut gauss);

    let m1 = scheme.sample_message(&mut rng);
    let m2 = scheme.sample_message(&mut rng);
    let c1 = scheme.encrypt(&m1, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c2 = scheme.encrypt(&m2, &key, &mut gauss).expect("fresh ciphertexts fit");

    let prod = scheme.eval_mul(&c1, &c2).expect("a length-3 result fits");
    assert_eq!(prod.len(), 3);

    let decrypted = scheme.decrypt(&prod, &key);
    assert_eq!(decrypted, scheme.centered(&(&m1 * &m2)));
}

#[test]
fn addition_pads_ciphertexts_of_different_lengths() {
    let mut rng = thread_rng();
    let (scheme, mut gauss) = test_scheme();
    let key = scheme.keygen(&mut rng, &mut gauss);

    let m1 = scheme.sample_message(&mut rng);
    let m2 = scheme.sample_message(&mut rng);
    let m3 = scheme.sample_message(&mut rng);
    let c1 = scheme.encrypt(&m1, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c2 = scheme.encrypt(&m2, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c3 = scheme.encrypt(&m3, &key, &mut gauss).expect("fresh ciphertexts fit");

    // Length 3 + length 2: every index of the shorter side must pad.
    let prod = scheme.eval_mul(&c1, &c2).expect("a length-3 result fits");
    let sum = scheme.eval_add(&prod, &c3);
    assert_eq!(sum.len(), 3);

    let expected = scheme.centered(&(&(&m1 * &m2) + &m3));
    assert_eq!(scheme.decrypt(&sum, &key), expected);

    // Same result with the operands swapped.
    let sum = scheme.eval_add(&c3, &prod);
    assert_eq!(sum.len(), 3);
    assert_eq!(scheme.decrypt(&sum, &key), expected);
}

#[test]
fn plaintext_operations_are_homomorphic() {
    let mut rng = thread_rng();
    let (scheme, mut gauss) = test_scheme();
    let key = scheme.keygen(&mut rng, &mut gauss);

    let m = scheme.sample_message(&mut rng);
    let plain = scheme.sample_message(&mut rng);
    let c = scheme.encrypt(&m, &key, &mut gauss).expect("fresh ciphertexts fit");

    let sum = scheme.eval_add_plain(&c, &plain);
    assert_eq!(scheme.decrypt(&sum, &key), scheme.centered(&(&m + &plain)));

    let prod = scheme.eval_mul_plain(&c, &plain);
    assert_eq!(scheme.decrypt(&prod, &key), scheme.centered(&(&m * &plain)));
}

#[test]
fn undersized_and_oversized_multiplications_are_rejected() {
    let mut rng = thread_rng();
    let (scheme, mut gauss) = test_scheme();
    let key = scheme.keygen(&mut rng, &mut gauss);

    let m1 = scheme.sample_message(&mut rng);
    let m2 = scheme.sample_message(&mut rng);
    let c1 = scheme.encrypt(&m1, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c2 = scheme.encrypt(&m2, &key, &mut gauss).expect("fresh ciphertexts fit");

    // 3 + 3 - 1 = 5 exceeds max_len = 4.
    let prod = scheme.eval_mul(&c1, &c2).expect("a length-3 result fits");
    assert!(matches!(
        scheme.eval_mul(&prod, &prod),
        Err(Error::LengthUnsupported { len: 5, .. })
    ));
}

/// Encrypts two integers, multiplies, doubles, then applies the plaintext
/// operations, decrypting to `((-3 * 6) * 2 + 2) * 2 = -68`.
#[test]
fn integer_evaluation_end_to_end() {
    let mut rng = thread_rng();
    let settings = Settings::with_generated_prime(&mut rng, 10, 100, 200_000, 2, 4);
    let scheme = Swhe::new(settings);
    let mut gauss = Ziggurat::new(&mut rng);
    let key = scheme.keygen(&mut rng, &mut gauss);

    let c1 = scheme.encrypt_int(-3, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c2 = scheme.encrypt_int(6, &key, &mut gauss).expect("fresh ciphertexts fit");

    let mut c = scheme.eval_mul(&c1, &c2).expect("a length-3 result fits"); // -18
    c = scheme.eval_add(&c, &c); // -36
    c = scheme.eval_add_plain_int(&c, 2).expect("the base is valid"); // -34
    c = scheme.eval_mul_plain_int(&c, 2).expect("the base is valid"); // -68

    let result = scheme.decrypt_int(&c, &key).expect("the base is valid");
    assert_eq!(result, (-68).into());
}

/// Full-size parameters: `n = 2^14`, a 500-bit modulus, and a
/// multiply-then-add evaluation decrypting to `-3600`.
#[test]
#[ignore = "full-size parameters take several minutes"]
fn full_size_evaluation_end_to_end() {
    let mut rng = thread_rng();
    let settings = Settings::with_generated_prime(&mut rng, 14, 500, 20_000, 2, 4);
    let scheme = Swhe::new(settings);
    let mut gauss = Ziggurat::new(&mut rng);
    let key = scheme.keygen(&mut rng, &mut gauss);

    let c1 = scheme.encrypt_int(-3, &key, &mut gauss).expect("fresh ciphertexts fit");
    let c2 = scheme.encrypt_int(600, &key, &mut gauss).expect("fresh ciphertexts fit");

    let mut c = scheme.eval_mul(&c1, &c2).expect("a length-3 result fits"); // -1800
    c = scheme.eval_add(&c, &c); // -3600

    let result = scheme.decrypt_int(&c, &key).expect("the base is valid");
    assert_eq!(result, (-3600).into());
}
