//! Demonstration driver for the SHE scheme.
//!
//! Runs the encrypt/evaluate/decrypt flows end to end, including
//! relinearization, the plaintext operations, two homomorphic evaluations on
//! separate threads, and the parameter generator.

use std::{sync::Arc, thread, time::Instant};

use log::info;
use rand::thread_rng;

use swhe_ops::{
    params::{generate, Expr},
    primitives::gauss::Ziggurat,
    settings::Settings,
    swhe::{Ciphertext, Swhe},
    Error,
};

fn main() -> Result<(), Error> {
    env_logger::init();

    encrypt_eval_relin_decrypt()?;
    encrypt_eval_plain_decrypt()?;
    threaded_addition()?;
    generate_params_for_sample_tree();

    Ok(())
}

/// Encrypts two integers, multiplies and doubles them, then relinearizes
/// before decrypting: `(2 * 40) * 2 = 160`.
fn encrypt_eval_relin_decrypt() -> Result<(), Error> {
    let mut rng = thread_rng();
    let settings = Settings::with_generated_prime(&mut rng, 10, 110, 2000, 10, 4);
    settings.validate()?;

    let scheme = Swhe::new(settings);
    let mut gauss = Ziggurat::new(&mut rng);

    info!("keygen");
    let key = scheme.keygen(&mut rng, &mut gauss);

    info!("encrypt");
    let c1 = scheme.encrypt_int(2, &key, &mut gauss)?;
    let c2 = scheme.encrypt_int(40, &key, &mut gauss)?;

    info!("evaluate");
    let mut c = scheme.eval_mul(&c1, &c2)?; // 80
    c = scheme.eval_add(&c, &c); // 160

    info!("eval keygen");
    let eval_key = scheme.eval_keygen(&key, 2, &mut rng, &mut gauss)?;

    info!("relinearize");
    let start = Instant::now();
    c = scheme.relinearize(&c, &eval_key)?;
    info!("relinearization took {:?}", start.elapsed());

    let result = scheme.decrypt_int(&c, &key)?;
    println!("(2 * 40) + (2 * 40) = {result}");

    Ok(())
}

/// Mixes ciphertext and plaintext operations:
/// `((-3 * 6) * 2 + 2) * 2 = -68`.
fn encrypt_eval_plain_decrypt() -> Result<(), Error> {
    let mut rng = thread_rng();
    let settings = Settings::with_generated_prime(&mut rng, 10, 100, 200_000, 2, 4);
    settings.validate()?;

    let scheme = Swhe::new(settings);
    let mut gauss = Ziggurat::new(&mut rng);
    let key = scheme.keygen(&mut rng, &mut gauss);

    let c1 = scheme.encrypt_int(-3, &key, &mut gauss)?;
    let c2 = scheme.encrypt_int(6, &key, &mut gauss)?;

    let mut c = scheme.eval_mul(&c1, &c2)?; // -18
    c = scheme.eval_add(&c, &c); // -36
    c = scheme.eval_add_plain_int(&c, 2)?; // -34
    c = scheme.eval_mul_plain_int(&c, 2)?; // -68

    let result = scheme.decrypt_int(&c, &key)?;
    println!("((-3 * 6) * 2 + 2) * 2 = {result}");

    Ok(())
}

/// Runs two independent homomorphic additions on separate threads, then
/// combines the results: `(1 + 2) * (3 + 4) = 21`.
///
/// The threads share only the read-only key; each one owns its operand
/// ciphertexts and its own Gaussian sampler.
fn threaded_addition() -> Result<(), Error> {
    let mut rng = thread_rng();
    let settings = Settings::with_generated_prime(&mut rng, 10, 100, 20_000, 2, 4);
    settings.validate()?;

    let scheme = Swhe::new(settings);
    let mut gauss = Ziggurat::new(&mut rng);
    let key = scheme.keygen(&mut rng, &mut gauss);

    let c1 = scheme.encrypt_int(1, &key, &mut gauss)?;
    let c2 = scheme.encrypt_int(2, &key, &mut gauss)?;
    let c3 = scheme.encrypt_int(3, &key, &mut gauss)?;
    let c4 = scheme.encrypt_int(4, &key, &mut gauss)?;

    let (sum12, sum34) = parallel_eval(
        || scheme.eval_add(&c1, &c2),
        || scheme.eval_add(&c3, &c4),
    );

    let c = scheme.eval_mul(&sum12, &sum34)?; // 3 * 7 = 21
    let result = scheme.decrypt_int(&c, &key)?;
    println!("(1 + 2) * (3 + 4) = {result}");

    Ok(())
}

/// Submits two evaluations to worker threads and joins both results.
fn parallel_eval<F1, F2>(eval1: F1, eval2: F2) -> (Ciphertext, Ciphertext)
where
    F1: FnOnce() -> Ciphertext + Send,
    F2: FnOnce() -> Ciphertext + Send,
{
    thread::scope(|scope| {
        let worker1 = scope.spawn(eval1);
        let worker2 = scope.spawn(eval2);
        (
            worker1.join().expect("evaluation threads do not panic"),
            worker2.join().expect("evaluation threads do not panic"),
        )
    })
}

/// Generates parameters for the sample circuit `1 * 2 + 1 * 2` at security
/// level 128 and prints them.
fn generate_params_for_sample_tree() {
    let tree = Expr::plus(
        Expr::multiply(Expr::value(1), Expr::value(2)),
        Expr::multiply(Expr::value(1), Expr::value(2)),
    );

    let start = Instant::now();
    let settings = generate(&tree, 128, 20);
    info!("parameter generation took {:?}", start.elapsed());

    print_settings(&settings);
}

fn print_settings(settings: &Arc<Settings>) {
    println!("Settings");
    println!("----------------------------------");
    println!("n: {}", settings.n());
    println!("q: {}", settings.ring.q);
    println!("lg2(q): {}", settings.q_bits());
    println!("t: {}", settings.t);
    println!("b: {}", settings.b);
    println!("D: {}", settings.max_len);
    println!("----------------------------------");
}
