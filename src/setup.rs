use crate::error::CoconutError;
use crate::utils::{evaluate_polynomial, random_polynomial, random_scalars, SignerIndex};
use ark_ec::{pairing::Pairing, PrimeGroup};
use ark_serialize::*;
use ark_std::{rand::RngCore, UniformRand, Zero};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public parameters shared by every authority and verifier.
///
/// Fixes the number of attributes a credential carries and the group generators.
#[derive(Clone, Debug)]
pub struct Parameters<E: Pairing> {
    attribute_count: usize,
    g1: E::G1,
    g2: E::G2,
}

impl<E: Pairing> Parameters<E> {
    /// Creates parameters for credentials over `attribute_count` attributes,
    /// using the canonical generators of G1 and G2.
    ///
    /// # Errors
    /// Returns an error if `attribute_count` is zero
    pub fn new(attribute_count: usize) -> Result<Self, CoconutError> {
        if attribute_count == 0 {
            return Err(CoconutError::InvalidParameter(
                "attribute count must be at least 1".to_string(),
            ));
        }
        Ok(Parameters {
            attribute_count,
            g1: E::G1::generator(),
            g2: E::G2::generator(),
        })
    }

    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    pub fn g1(&self) -> &E::G1 {
        &self.g1
    }

    pub fn g2(&self) -> &E::G2 {
        &self.g2
    }

    /// Samples `n` random scalars, e.g. a fresh attribute vector.
    pub fn n_random_scalars<R: RngCore>(&self, n: usize, rng: &mut R) -> Vec<E::ScalarField> {
        random_scalars(n, rng)
    }
}

/// A validated `t`-of-`n` relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Threshold {
    threshold: usize,
    total: usize,
}

impl Threshold {
    /// # Errors
    /// Returns `InvalidThreshold` unless `1 <= threshold <= total`
    pub fn new(threshold: usize, total: usize) -> Result<Self, CoconutError> {
        if threshold == 0 || threshold > total {
            return Err(CoconutError::InvalidThreshold { threshold, total });
        }
        Ok(Threshold { threshold, total })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Indices `1..=total`, in order.
    pub fn signer_indices(&self) -> impl Iterator<Item = SignerIndex> {
        (0..self.total).map(SignerIndex::from_position)
    }
}

/// Secret key (or secret key share) of a signing authority.
///
/// Holds `x` and one `y` per attribute. Zeroized on drop.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone)]
pub struct SecretKey<E: Pairing> {
    x: E::ScalarField,
    ys: Vec<E::ScalarField>,
}

/// Verification key (or verification key share): `alpha = x * g2`, `beta_k = y_k * g2`.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerificationKey<E: Pairing> {
    pub(crate) alpha: E::G2,
    pub(crate) beta: Vec<E::G2>,
}

/// One authority's key material together with the index it was dealt to.
#[derive(Clone, Debug)]
pub struct KeyPair<E: Pairing> {
    pub index: SignerIndex,
    pub secret_key: SecretKey<E>,
    pub verification_key: VerificationKey<E>,
}

impl<E: Pairing> SecretKey<E> {
    /// Creates a fresh, non-shared secret key supporting `attribute_count` attributes.
    pub fn new<R: RngCore>(attribute_count: usize, rng: &mut R) -> Self {
        SecretKey {
            x: E::ScalarField::rand(rng),
            ys: random_scalars(attribute_count, rng),
        }
    }

    pub(crate) fn x(&self) -> &E::ScalarField {
        &self.x
    }

    pub(crate) fn ys(&self) -> &[E::ScalarField] {
        &self.ys
    }

    /// Number of attributes this key can sign.
    pub fn attribute_count(&self) -> usize {
        self.ys.len()
    }

    /// Derives the public verification key.
    pub fn verification_key(&self, params: &Parameters<E>) -> VerificationKey<E> {
        let g2 = *params.g2();
        VerificationKey {
            alpha: g2 * self.x,
            beta: self.ys.iter().map(|y| g2 * *y).collect(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoconutError> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// # Errors
    /// Returns an error if the bytes are malformed or not fully consumed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoconutError> {
        let mut reader = bytes;
        let sk = Self::deserialize_compressed(&mut reader)?;
        if !reader.is_empty() {
            return Err(CoconutError::Serialization(format!(
                "{} trailing bytes after secret key",
                reader.len()
            )));
        }
        Ok(sk)
    }
}

impl<E: Pairing> Zeroize for SecretKey<E> {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.ys.zeroize();
    }
}

impl<E: Pairing> ZeroizeOnDrop for SecretKey<E> {}

impl<E: Pairing> Drop for SecretKey<E> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// Prevent debug output from leaking the key
impl<E: Pairing> std::fmt::Debug for SecretKey<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl<E: Pairing> VerificationKey<E> {
    pub fn new(alpha: E::G2, beta: Vec<E::G2>) -> Self {
        VerificationKey { alpha, beta }
    }

    pub fn alpha(&self) -> &E::G2 {
        &self.alpha
    }

    pub fn beta(&self) -> &[E::G2] {
        &self.beta
    }

    /// Encoding: compressed alpha, `u64` beta count (little endian), compressed betas.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoconutError> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// # Errors
    /// Returns an error if the bytes are malformed or not fully consumed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoconutError> {
        let mut reader = bytes;
        let vk = Self::deserialize_compressed(&mut reader)?;
        if !reader.is_empty() {
            return Err(CoconutError::Serialization(format!(
                "{} trailing bytes after verification key",
                reader.len()
            )));
        }
        Ok(vk)
    }
}

/// Generates a single, non-threshold keypair (index 1).
pub fn keygen<E: Pairing, R: RngCore>(params: &Parameters<E>, rng: &mut R) -> KeyPair<E> {
    let secret_key = SecretKey::new(params.attribute_count(), rng);
    let verification_key = secret_key.verification_key(params);
    KeyPair {
        index: SignerIndex::from_position(0),
        secret_key,
        verification_key,
    }
}

/// Trusted-dealer key generation for a `threshold`-of-`total` scheme.
///
/// Samples one degree `threshold - 1` polynomial for `x` and one per attribute,
/// then hands authority `i` the evaluations at `x = i`. The master secrets
/// (constant terms) are wiped before returning.
///
/// # Arguments
/// * `params` - Scheme parameters (fixes the attribute count)
/// * `threshold` - Number of authorities needed to reconstruct (`t`)
/// * `total` - Number of authorities (`n`)
/// * `rng` - A random number generator
///
/// # Errors
/// Returns an error unless `1 <= threshold <= total`
pub fn ttp_keygen<E: Pairing, R: RngCore>(
    params: &Parameters<E>,
    threshold: usize,
    total: usize,
    rng: &mut R,
) -> Result<Vec<KeyPair<E>>, CoconutError> {
    let threshold = Threshold::new(threshold, total)?;
    debug!(
        attributes = params.attribute_count(),
        threshold = threshold.threshold(),
        total = threshold.total(),
        "dealing threshold keys"
    );

    let degree = threshold.threshold() - 1;
    let mut v = random_polynomial::<E::ScalarField, _>(degree, rng);
    let mut ws: Vec<_> = (0..params.attribute_count())
        .map(|_| random_polynomial::<E::ScalarField, _>(degree, rng))
        .collect();

    let keypairs = threshold
        .signer_indices()
        .map(|index| {
            let at = index.to_scalar::<E::ScalarField>();
            let secret_key = SecretKey {
                x: evaluate_polynomial(&v.coeffs, &at),
                ys: ws
                    .iter()
                    .map(|w| evaluate_polynomial(&w.coeffs, &at))
                    .collect(),
            };
            let verification_key = secret_key.verification_key(params);
            KeyPair {
                index,
                secret_key,
                verification_key,
            }
        })
        .collect();

    v.coeffs.zeroize();
    ws.iter_mut().for_each(|w| w.coeffs.zeroize());

    Ok(keypairs)
}

impl<E: Pairing> KeyPair<E> {
    /// Whether the verification key is consistent with the secret key.
    pub fn is_consistent(&self, params: &Parameters<E>) -> bool {
        self.secret_key.verification_key(params) == self.verification_key
            && !self.verification_key.alpha.is_zero()
    }
}
