/// Error types for the threshold credential library
use crate::utils::SignerIndex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoconutError {
    /// Threshold parameters violate `1 <= t <= n`
    #[error("Invalid threshold: {threshold} of {total} (need 1 <= t <= n)")]
    InvalidThreshold { threshold: usize, total: usize },
    /// Aggregation called with no items, no indices, or lists of different length
    #[error("Empty aggregation set: {items} items, {indices} indices")]
    EmptyAggregationSet { items: usize, indices: usize },
    /// The same signer index was supplied more than once
    #[error("Duplicate signer index: {0}")]
    DuplicateIndex(SignerIndex),
    /// Verification keys with differing beta lengths
    #[error("Dimension mismatch: expected {expected} beta elements, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// Partial signatures over different attributes, or one already re-randomized
    #[error("Mismatched sig1 at position {position}: partial signatures must share the same base")]
    MismatchedSig1 { position: usize },
    /// Lagrange interpolation over an empty set or coinciding x-coordinates
    #[error("Degenerate index set for Lagrange interpolation")]
    DegenerateIndexSet,
    /// Attribute vector length differs from the key's dimensionality
    #[error("Attribute count mismatch: key supports {expected}, got {found}")]
    AttributeCountMismatch { expected: usize, found: usize },
    /// Invalid scheme parameter (e.g., zero attributes)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Signer indices are 1-based; zero is never a valid index
    #[error("Invalid signer index: indices start at 1")]
    InvalidSignerIndex,
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ark_serialize::SerializationError> for CoconutError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        CoconutError::Serialization(err.to_string())
    }
}
