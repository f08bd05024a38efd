use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hexec::{
    kernel,
    CallGraphPass,
    Ciphertext,
    ElementType,
    EncryptionParameters,
    Function,
    HeContext,
    InsertRelinearize,
    Plaintext,
    SchemeType,
    TransparentEvaluator,
};

fn create_evaluator(poly_degree: usize) -> TransparentEvaluator {
    let params = EncryptionParameters::new(SchemeType::CKKS)
        .set_poly_modulus_degree(poly_degree)
        .set_coeff_modulus_bits(&[60, 40, 40, 60]);
    TransparentEvaluator::new(HeContext::new(params).unwrap())
}

fn bench_add_kernels(c: &mut Criterion) {
    let slots = 4096;
    let ty = ElementType::F64;
    let evaluator = create_evaluator(slots);
    let context = hexec::Backend::context(&evaluator).clone();
    let mut rng = rand::thread_rng();

    let message: Vec<f64> = (0..slots).map(|i| i as f64 * 0.5).collect();
    let plain: Plaintext = evaluator.encode(&message, ty);
    let cipher1 = evaluator.encrypt(&plain, &mut rng).unwrap();
    let cipher2 = evaluator.encrypt(&plain, &mut rng).unwrap();
    let mut cipher_out = Ciphertext::allocate(&context, ty, slots);
    let mut plain_out = Plaintext::allocate(ty, slots);

    let get_name = |name: &str| format!("{name}/N={slots}");
    c.bench_function(&get_name("AddCipherCipher"), |b| b.iter(|| {
        kernel::add_cipher_cipher(black_box(&cipher1), &cipher2, &mut cipher_out, ty, &evaluator)
    }));
    c.bench_function(&get_name("AddCipherPlain"), |b| b.iter(|| {
        kernel::add_cipher_plain(black_box(&cipher1), &plain, &mut cipher_out, ty, &evaluator)
    }));
    c.bench_function(&get_name("AddPlainCipher"), |b| b.iter(|| {
        kernel::add_plain_cipher(black_box(&plain), &cipher1, &mut cipher_out, ty, &evaluator)
    }));
    c.bench_function(&get_name("AddPlainPlain"), |b| b.iter(|| {
        kernel::add_plain_plain(black_box(&plain), &plain, &mut plain_out, ty, &evaluator)
    }));
}

fn deep_function(depth: usize) -> Function {
    let mut f = Function::new();
    let x = f.parameter(ElementType::I64, true);
    let c = f.constant(ElementType::I64);
    let mut value = x;
    for i in 0..depth {
        value = match i % 3 {
            0 => f.multiply(value, value),
            1 => f.add(value, c),
            _ => f.multiply(value, x),
        };
    }
    f.result(value);
    f
}

fn bench_insert_relinearize(c: &mut Criterion) {
    for depth in [64, 1024] {
        let function = deep_function(depth);
        c.bench_function(&format!("InsertRelinearize/depth={depth}"), |b| b.iter(|| {
            let mut f = function.clone();
            InsertRelinearize::new().run_on_call_graph(black_box(&mut f)).unwrap()
        }));
    }
}

criterion_group!(benches, bench_add_kernels, bench_insert_relinearize);
criterion_main!(benches);
