use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use hexec::{
    CallGraphPass, ElementType, EncryptedValue, EncryptionParameters, Executor, Function,
    HeContext, InsertRelinearize, NodeId, NoiseModel, SchemeType, TransparentEvaluator,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a chain of encrypted squarings")]
struct Arguments {

    /// JSON file holding `parameters` and optionally `noise`
    #[arg(long)]
    params: Option<PathBuf>,

    /// Number of chained squarings
    #[arg(short = 'd', long, default_value_t = 3)]
    depth: usize,

    /// Number of values per ciphertext
    #[arg(short = 's', long, default_value_t = 4)]
    slots: usize,

    /// Evaluate without inserting relinearizations
    #[arg(long = "skip-pass", action = clap::ArgAction::SetTrue)]
    skip_pass: bool,

}

#[derive(serde::Deserialize)]
struct RunConfig {
    parameters: EncryptionParameters,
    #[serde(default)]
    noise: NoiseModel,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            parameters: EncryptionParameters::new(SchemeType::CKKS)
                .set_poly_modulus_degree(8192)
                .set_coeff_modulus_bits(&[60, 40, 40, 60]),
            noise: NoiseModel::default(),
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("cannot parse {}", path.display()))
}

/// `x^(2^depth)`, returning the graph and its input node.
fn squaring_chain(depth: usize) -> (Function, NodeId) {
    let mut f = Function::new();
    let input = f.parameter(ElementType::I64, true);
    let mut value = input;
    for _ in 0..depth {
        value = f.multiply(value, value);
    }
    f.result(value);
    (f, input)
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    // Verbosity through RUST_LOG, e.g. `RUST_LOG=hexec=debug`
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .without_time()
        .init();

    let config = load_config(args.params.as_ref())?;
    let context = HeContext::new(config.parameters)?;
    if args.slots == 0 || args.slots > context.slot_count() {
        bail!("slots must be between 1 and {}", context.slot_count());
    }
    let evaluator = TransparentEvaluator::new(context).with_noise_model(config.noise);

    let (mut function, input_node) = squaring_chain(args.depth);
    if !args.skip_pass {
        let mut pass = InsertRelinearize::new();
        pass.run_on_call_graph(&mut function)?;
        println!("{}: inserted {} node(s)", pass.name(), pass.inserted().len());
    }

    let message: Vec<f64> = (0..args.slots).map(|i| (i % 3) as f64 + 1.0).collect();
    let plain = evaluator.encode(&message, ElementType::I64);
    let input = evaluator.encrypt(&plain, &mut rand::thread_rng())?;
    let inputs = HashMap::from([(input_node, EncryptedValue::from(input))]);

    let results = Executor::new(&evaluator).call(&function, inputs)?;
    for (node, value) in results {
        let EncryptedValue::Cipher(cipher) = value else {
            bail!("result {node} is not encrypted");
        };
        let decoded = evaluator.decrypt(&cipher)?;
        let words: Vec<i64> = decoded.data().iter().map(|&w| w as i64).collect();
        println!(
            "{node}: size {}, noise budget {} bits, values {:?}",
            cipher.size(), cipher.noise_budget(), words
        );
    }
    Ok(())
}
