//! Threshold aggregation of verification keys and signatures.
//!
//! Both are combined by Lagrange interpolation in the exponent: given values
//! `v_i` from authorities with indices `x_i`, the aggregate is
//! `sum_i L_i(0) * v_i`. Any `t` or more genuine shares yield the same value;
//! fewer shares, or shares labelled with the wrong indices, silently yield a
//! different one.
//!
//! Partial signatures over the same attributes share `sig1`, so only `sig2`
//! is interpolated. The Lagrange coefficients sum to one, which leaves the
//! shared `sig1` unchanged.

use ark_ec::pairing::Pairing;
use ark_ff::PrimeField;
use rayon::prelude::*;
use tracing::debug;

use crate::error::CoconutError;
use crate::setup::VerificationKey;
use crate::signature::Signature;
use crate::utils::{find_duplicate, lagrange_coefficients, SignerIndex};

/// A value that can be combined by scalar-weighted group addition.
pub trait Aggregatable: Sized + Clone + Send + Sync {
    type Scalar: PrimeField;

    /// Rejects a batch whose members do not share the same shape.
    fn check_shapes(_items: &[Self]) -> Result<(), CoconutError> {
        Ok(())
    }

    /// Multiplies every group element by `coefficient`.
    fn scale(&self, coefficient: &Self::Scalar) -> Self;

    /// Adds `other` element-wise.
    fn combine(&mut self, other: &Self);
}

impl<E: Pairing> Aggregatable for Signature<E> {
    type Scalar = E::ScalarField;

    fn check_shapes(items: &[Self]) -> Result<(), CoconutError> {
        let Some(first) = items.first() else {
            return Ok(());
        };
        match items.iter().position(|sig| sig.sig1 != first.sig1) {
            Some(position) => Err(CoconutError::MismatchedSig1 { position }),
            None => Ok(()),
        }
    }

    fn scale(&self, coefficient: &Self::Scalar) -> Self {
        Signature {
            sig1: self.sig1,
            sig2: self.sig2 * *coefficient,
        }
    }

    fn combine(&mut self, other: &Self) {
        self.sig2 += other.sig2;
    }
}

impl<E: Pairing> Aggregatable for VerificationKey<E> {
    type Scalar = E::ScalarField;

    fn check_shapes(items: &[Self]) -> Result<(), CoconutError> {
        let Some(first) = items.first() else {
            return Ok(());
        };
        let expected = first.beta.len();
        match items.iter().find(|vk| vk.beta.len() != expected) {
            Some(vk) => Err(CoconutError::DimensionMismatch {
                expected,
                found: vk.beta.len(),
            }),
            None => Ok(()),
        }
    }

    fn scale(&self, coefficient: &Self::Scalar) -> Self {
        VerificationKey {
            alpha: self.alpha * *coefficient,
            beta: self.beta.iter().map(|b| *b * *coefficient).collect(),
        }
    }

    fn combine(&mut self, other: &Self) {
        self.alpha += other.alpha;
        for (b, o) in self.beta.iter_mut().zip(&other.beta) {
            *b += o;
        }
    }
}

/// Interpolates `items[i]` (held by authority `indices[i]`) at zero.
///
/// # Errors
/// * `EmptyAggregationSet` if either list is empty or their lengths differ
/// * `DuplicateIndex` if an index appears twice
/// * `DimensionMismatch` if verification keys have different beta lengths
/// * `MismatchedSig1` if partial signatures do not share the same `sig1`
pub fn aggregate<T: Aggregatable>(items: &[T], indices: &[SignerIndex]) -> Result<T, CoconutError> {
    if items.is_empty() || indices.is_empty() || items.len() != indices.len() {
        return Err(CoconutError::EmptyAggregationSet {
            items: items.len(),
            indices: indices.len(),
        });
    }
    if let Some(index) = find_duplicate(indices) {
        return Err(CoconutError::DuplicateIndex(index));
    }
    T::check_shapes(items)?;

    debug!(count = items.len(), ?indices, "aggregating");

    let coefficients = lagrange_coefficients::<T::Scalar>(indices)?;

    items
        .par_iter()
        .zip(indices.par_iter())
        .map(|(item, index)| item.scale(&coefficients[index]))
        .reduce_with(|mut acc, term| {
            acc.combine(&term);
            acc
        })
        .ok_or(CoconutError::EmptyAggregationSet {
            items: items.len(),
            indices: indices.len(),
        })
}

/// Aggregates verification key shares into the quorum verification key.
pub fn aggregate_verification_keys<E: Pairing>(
    keys: &[VerificationKey<E>],
    indices: &[SignerIndex],
) -> Result<VerificationKey<E>, CoconutError> {
    aggregate(keys, indices)
}

/// Aggregates partial signatures into the quorum signature.
pub fn aggregate_signatures<E: Pairing>(
    signatures: &[Signature<E>],
    indices: &[SignerIndex],
) -> Result<Signature<E>, CoconutError> {
    aggregate(signatures, indices)
}
