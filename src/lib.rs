//! Threshold Coconut
//!
//! This library implements the algebraic core of the Coconut threshold
//! credential scheme described in [arXiv:1802.07344](https://arxiv.org/abs/1802.07344).
//!
//! ## Overview
//!
//! A set of `n` independent signing authorities each hold a share of a master
//! signing key. Any `t` of them can produce partial signatures over a vector of
//! attributes which combine into a single credential that verifies under the
//! combined verification key, while no authority ever learns the master key.
//!
//! ## Key Components
//!
//! - **Utils**: signer indices, random scalars, polynomial evaluation and
//!   Lagrange coefficients at zero
//! - **Setup**: parameters and trusted-dealer threshold key generation
//! - **Signature**: partial signing, re-randomization and pairing verification
//! - **Aggregation**: Lagrange interpolation in the exponent for keys and signatures
//!
//! ## Example
//!
//! ```rust,no_run
//! use ark_bls12_381::Bls12_381;
//! use threshold_coconut::{
//!     aggregation::{aggregate_signatures, aggregate_verification_keys},
//!     setup::{ttp_keygen, Parameters},
//!     signature::{sign, verify},
//!     utils::SignerIndex,
//! };
//!
//! type E = Bls12_381;
//!
//! let mut rng = ark_std::test_rng();
//! let params = Parameters::<E>::new(2).unwrap();
//! let attributes = params.n_random_scalars(2, &mut rng);
//!
//! // 3-of-5 authorities
//! let keypairs = ttp_keygen(&params, 3, 5, &mut rng).unwrap();
//!
//! // Any three of them sign
//! let quorum = &keypairs[1..4];
//! let sigs: Vec<_> = quorum
//!     .iter()
//!     .map(|kp| sign(&kp.secret_key, &attributes).unwrap())
//!     .collect();
//! let vks: Vec<_> = quorum.iter().map(|kp| kp.verification_key.clone()).collect();
//! let indices: Vec<SignerIndex> = quorum.iter().map(|kp| kp.index).collect();
//!
//! let sig = aggregate_signatures(&sigs, &indices).unwrap();
//! let vk = aggregate_verification_keys(&vks, &indices).unwrap();
//! assert!(verify(&params, &vk, &attributes, &sig));
//!
//! // Re-randomize before showing the credential
//! let shown = sig.randomize(&mut rng);
//! assert!(verify(&params, &vk, &attributes, &shown));
//! ```

pub mod aggregation;
pub mod error;
pub mod setup;
pub mod signature;
pub mod utils;

pub use aggregation::{aggregate, aggregate_signatures, aggregate_verification_keys, Aggregatable};
pub use error::CoconutError;
pub use setup::{keygen, ttp_keygen, KeyPair, Parameters, SecretKey, Threshold, VerificationKey};
pub use signature::{hash_attributes, sign, verify, Signature};
pub use utils::SignerIndex;
