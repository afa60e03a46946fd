//! Command-line front end for threshold Coconut credentials.
//!
//! Every key and signature crosses the command line as standard base64 of its
//! compressed encoding. Lists are whitespace-separated.
//!
//! ```bash
//! coconut-cli init-issuers -a 2 -t 2 -n 3
//! coconut-cli sign --key <sk> --attributes "foomp 100"
//! coconut-cli aggregate-sigs --sigs "<s1> <s3>" --indices "1 3"
//! coconut-cli aggregate-keys --keys "<k1> <k3>" --indices "1 3"
//! coconut-cli verify --key <vk> --sig <sig> --attributes "foomp 100"
//! ```

use ark_bls12_381::Bls12_381 as Curve;
use ark_ec::pairing::Pairing;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::{Parser, Subcommand};
use threshold_coconut::{
    aggregate_signatures, aggregate_verification_keys, sign, ttp_keygen,
    utils::{hash_to_scalar, secure_rng},
    verify, CoconutError, Parameters, SecretKey, Signature, SignerIndex, VerificationKey,
};

type Fr = <Curve as Pairing>::ScalarField;
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(about = "Threshold Coconut credential tool", author, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deal threshold keys; prints secret key and verification key per authority
    InitIssuers {
        /// Number of attributes per credential
        #[arg(short = 'a', long)]
        attributes: usize,
        /// Number of authorities needed to issue a credential
        #[arg(short = 't', long)]
        threshold: usize,
        /// Total number of authorities
        #[arg(short = 'n', long)]
        authorities: usize,
    },
    /// Sign attributes with one authority's secret key
    Sign {
        #[arg(long)]
        key: String,
        #[arg(long)]
        attributes: String,
    },
    /// Aggregate partial signatures
    AggregateSigs {
        #[arg(long)]
        sigs: String,
        #[arg(long)]
        indices: String,
    },
    /// Aggregate verification key shares
    AggregateKeys {
        #[arg(long)]
        keys: String,
        #[arg(long)]
        indices: String,
    },
    /// Re-randomize a signature
    Randomize {
        #[arg(long)]
        sig: String,
    },
    /// Verify a signature; prints `ok` or `invalid`
    Verify {
        #[arg(long)]
        key: String,
        #[arg(long)]
        sig: String,
        #[arg(long)]
        attributes: String,
    },
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::InitIssuers {
            attributes,
            threshold,
            authorities,
        } => {
            let params = Parameters::<Curve>::new(attributes)?;
            let keypairs = ttp_keygen(&params, threshold, authorities, &mut secure_rng())?;
            for keypair in keypairs {
                println!("{}", BASE64.encode(keypair.secret_key.to_bytes()?));
                println!("{}", BASE64.encode(keypair.verification_key.to_bytes()?));
                println!();
            }
        }
        Command::Sign { key, attributes } => {
            let sk = SecretKey::<Curve>::from_bytes(&BASE64.decode(key.trim())?)?;
            let sig = sign(&sk, &parse_attributes(&attributes))?;
            println!("{}", BASE64.encode(sig.to_bytes()?));
        }
        Command::AggregateSigs { sigs, indices } => {
            let sigs = sigs
                .split_whitespace()
                .map(|s| Ok(Signature::<Curve>::from_bytes(&BASE64.decode(s)?)?))
                .collect::<CliResult<Vec<_>>>()?;
            let aggr = aggregate_signatures(&sigs, &parse_indices(&indices)?)?;
            print!("{}", BASE64.encode(aggr.to_bytes()?));
        }
        Command::AggregateKeys { keys, indices } => {
            let keys = keys
                .split_whitespace()
                .map(|k| Ok(VerificationKey::<Curve>::from_bytes(&BASE64.decode(k)?)?))
                .collect::<CliResult<Vec<_>>>()?;
            let aggr = aggregate_verification_keys(&keys, &parse_indices(&indices)?)?;
            print!("{}", BASE64.encode(aggr.to_bytes()?));
        }
        Command::Randomize { sig } => {
            let sig = Signature::<Curve>::from_bytes(&BASE64.decode(sig.trim())?)?;
            print!("{}", BASE64.encode(sig.randomize(&mut secure_rng()).to_bytes()?));
        }
        Command::Verify {
            key,
            sig,
            attributes,
        } => {
            let vk = VerificationKey::<Curve>::from_bytes(&BASE64.decode(key.trim())?)?;
            let sig = Signature::<Curve>::from_bytes(&BASE64.decode(sig.trim())?)?;
            let params = Parameters::<Curve>::new(vk.beta().len())?;
            if verify(&params, &vk, &parse_attributes(&attributes), &sig) {
                println!("ok");
            } else {
                println!("invalid");
            }
        }
    }
    Ok(())
}

fn parse_indices(raw: &str) -> Result<Vec<SignerIndex>, CoconutError> {
    raw.split_whitespace().map(str::parse).collect()
}

fn parse_attributes(raw: &str) -> Vec<Fr> {
    raw.split_whitespace()
        .map(|attribute| hash_to_scalar(attribute.as_bytes()))
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .try_init();
}
