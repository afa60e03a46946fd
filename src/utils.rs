use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use ark_ec::AffineRepr;
use ark_ff::{batch_inversion, PrimeField};
use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial};
use ark_std::rand::{rngs::StdRng, RngCore, SeedableRng};
use ark_std::{One, UniformRand, Zero};
use blake2::{Blake2b512, Digest};

use crate::error::CoconutError;

/// Identifier of one signing authority.
///
/// Authorities are numbered `1..=n` and the number doubles as the x-coordinate
/// of the authority's share. It is never used as a storage offset directly:
/// go through [`SignerIndex::from_position`] and [`SignerIndex::position`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignerIndex(NonZeroU64);

impl SignerIndex {
    /// Creates an index from its 1-based value.
    ///
    /// # Errors
    /// Returns an error if `value` is zero
    pub fn new(value: u64) -> Result<Self, CoconutError> {
        NonZeroU64::new(value)
            .map(SignerIndex)
            .ok_or(CoconutError::InvalidSignerIndex)
    }

    /// Maps a 0-based storage position to the authority index (`position + 1`).
    ///
    /// Storage offsets never exceed `isize::MAX`, and `usize` is at most 64 bits
    /// wide, so `position + 1` always fits in a `u64`.
    pub fn from_position(position: usize) -> Self {
        debug_assert!(position <= isize::MAX as usize);
        SignerIndex(NonZeroU64::MIN.saturating_add(position as u64))
    }

    /// Maps the authority index back to its 0-based storage position.
    ///
    /// # Errors
    /// Returns `InvalidSignerIndex` if the position does not fit in `usize`
    /// (only reachable on targets narrower than 64 bits)
    pub fn position(self) -> Result<usize, CoconutError> {
        usize::try_from(self.0.get() - 1).map_err(|_| CoconutError::InvalidSignerIndex)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// The index as an x-coordinate in the scalar field.
    pub fn to_scalar<F: PrimeField>(self) -> F {
        F::from(self.0.get())
    }
}

impl TryFrom<u64> for SignerIndex {
    type Error = CoconutError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        SignerIndex::new(value)
    }
}

impl FromStr for SignerIndex {
    type Err = CoconutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|_| CoconutError::InvalidSignerIndex)?;
        SignerIndex::new(value)
    }
}

impl fmt::Display for SignerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns a call-local generator seeded from the OS-backed thread generator.
pub fn secure_rng() -> StdRng {
    use rand::RngCore as _;

    let mut seed = <StdRng as SeedableRng>::Seed::default();
    rand::rng().fill_bytes(&mut seed);
    StdRng::from_seed(seed)
}

/// Samples a uniformly random scalar.
pub fn random_scalar<F: UniformRand, R: RngCore>(rng: &mut R) -> F {
    F::rand(rng)
}

/// Samples `n` independent random scalars.
pub fn random_scalars<F: UniformRand, R: RngCore>(n: usize, rng: &mut R) -> Vec<F> {
    (0..n).map(|_| random_scalar(rng)).collect()
}

/// Samples a polynomial of degree `degree` with uniformly random coefficients.
///
/// The constant term is the secret being shared.
pub fn random_polynomial<F: PrimeField, R: RngCore>(
    degree: usize,
    rng: &mut R,
) -> DensePolynomial<F> {
    DensePolynomial::from_coefficients_vec(random_scalars(degree + 1, rng))
}

/// Evaluates the polynomial with the given coefficients (constant term first)
/// at `at` using Horner's rule.
pub fn evaluate_polynomial<F: PrimeField>(coefficients: &[F], at: &F) -> F {
    coefficients
        .iter()
        .rev()
        .fold(F::zero(), |acc, coeff| acc * at + coeff)
}

/// Maps arbitrary bytes into the scalar field (Blake2b-512, reduced mod the field order).
pub fn hash_to_scalar<F: PrimeField>(bytes: &[u8]) -> F {
    let digest = Blake2b512::digest(bytes);
    F::from_le_bytes_mod_order(&digest)
}

/// Computes the Lagrange basis coefficients `L_i(0)` for every index in `indices`.
///
/// `L_i(0) = prod_{j != i} x_j / (x_j - x_i)`, where `x` is the index mapped into the field.
/// All denominators are inverted in one batch.
///
/// # Errors
/// Returns `DegenerateIndexSet` if `indices` is empty or contains a repeated index
pub fn lagrange_coefficients<F: PrimeField>(
    indices: &[SignerIndex],
) -> Result<BTreeMap<SignerIndex, F>, CoconutError> {
    if indices.is_empty() {
        return Err(CoconutError::DegenerateIndexSet);
    }

    let xs: Vec<F> = indices.iter().map(|index| index.to_scalar()).collect();

    let mut numerators = Vec::with_capacity(xs.len());
    let mut denominators = Vec::with_capacity(xs.len());
    for (i, x_i) in xs.iter().enumerate() {
        let mut numerator = F::one();
        let mut denominator = F::one();
        for (j, x_j) in xs.iter().enumerate() {
            if i == j {
                continue;
            }
            numerator *= x_j;
            denominator *= *x_j - x_i;
        }
        if denominator.is_zero() {
            return Err(CoconutError::DegenerateIndexSet);
        }
        numerators.push(numerator);
        denominators.push(denominator);
    }

    batch_inversion(&mut denominators);

    let coefficients: BTreeMap<SignerIndex, F> = indices
        .iter()
        .copied()
        .zip(numerators.into_iter().zip(denominators).map(|(n, d)| n * d))
        .collect();
    Ok(coefficients)
}

/// Hashes bytes onto the prime-order subgroup of `G` by try-and-increment.
///
/// The discrete logarithm of the result is unknown to everyone. Not constant
/// time, so only public inputs may be hashed.
pub fn hash_to_curve<G: AffineRepr>(bytes: &[u8]) -> G::Group {
    let mut attempt = 0u64;
    loop {
        let mut hasher = Blake2b512::new();
        hasher.update(bytes);
        hasher.update(attempt.to_le_bytes());
        let digest = hasher.finalize();
        if let Some(point) = G::from_random_bytes(&digest) {
            let point = point.clear_cofactor();
            if !point.is_zero() {
                return point.into_group();
            }
        }
        attempt += 1;
    }
}

/// Returns the first index that appears more than once, if any.
pub(crate) fn find_duplicate(indices: &[SignerIndex]) -> Option<SignerIndex> {
    let mut seen = BTreeSet::new();
    indices.iter().copied().find(|index| !seen.insert(*index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_poly::Polynomial;

    type Fr = ark_bls12_381::Fr;

    fn indices(values: &[u64]) -> Vec<SignerIndex> {
        values.iter().map(|v| SignerIndex::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_signer_index_mapping() {
        assert_eq!(SignerIndex::new(0), Err(CoconutError::InvalidSignerIndex));
        assert_eq!(SignerIndex::from_position(0).get(), 1);
        assert_eq!(SignerIndex::from_position(4).get(), 5);
        assert_eq!(SignerIndex::new(7).unwrap().position(), Ok(6));
        for position in [0usize, 1, 41, 1000] {
            assert_eq!(SignerIndex::from_position(position).position(), Ok(position));
        }
        assert_eq!("3".parse::<SignerIndex>().unwrap().get(), 3);
        assert!("0".parse::<SignerIndex>().is_err());
        assert!("abc".parse::<SignerIndex>().is_err());
    }

    #[test]
    fn test_horner_matches_dense_polynomial() {
        let mut rng = ark_std::test_rng();
        let poly = random_polynomial::<Fr, _>(4, &mut rng);
        for _ in 0..10 {
            let at = Fr::rand(&mut rng);
            assert_eq!(evaluate_polynomial(&poly.coeffs, &at), poly.evaluate(&at));
        }
        assert_eq!(evaluate_polynomial::<Fr>(&[], &Fr::one()), Fr::zero());
    }

    #[test]
    fn test_lagrange_interpolates_secret() {
        let mut rng = ark_std::test_rng();
        let t = 3;
        let poly = random_polynomial::<Fr, _>(t - 1, &mut rng);
        let secret = poly.coeffs[0];

        for subset in [vec![1, 2, 3], vec![3, 4, 5], vec![5, 1, 4], vec![1, 2, 3, 4, 5]] {
            let subset = indices(&subset);
            let coefficients = lagrange_coefficients::<Fr>(&subset).unwrap();
            let reconstructed: Fr = subset
                .iter()
                .map(|i| coefficients[i] * evaluate_polynomial(&poly.coeffs, &i.to_scalar()))
                .sum();
            assert_eq!(reconstructed, secret);
        }

        // below threshold the interpolation silently lands somewhere else
        let subset = indices(&[1, 2]);
        let coefficients = lagrange_coefficients::<Fr>(&subset).unwrap();
        let reconstructed: Fr = subset
            .iter()
            .map(|i| coefficients[i] * evaluate_polynomial(&poly.coeffs, &i.to_scalar()))
            .sum();
        assert_ne!(reconstructed, secret);
    }

    #[test]
    fn test_lagrange_coefficients_sum_to_one() {
        let coefficients = lagrange_coefficients::<Fr>(&indices(&[2, 9, 4, 11])).unwrap();
        assert_eq!(coefficients.values().copied().sum::<Fr>(), Fr::one());

        let single = lagrange_coefficients::<Fr>(&indices(&[6])).unwrap();
        assert_eq!(single[&SignerIndex::new(6).unwrap()], Fr::one());
    }

    #[test]
    fn test_lagrange_degenerate_sets() {
        assert_eq!(
            lagrange_coefficients::<Fr>(&[]),
            Err(CoconutError::DegenerateIndexSet)
        );
        assert_eq!(
            lagrange_coefficients::<Fr>(&indices(&[1, 2, 1])),
            Err(CoconutError::DegenerateIndexSet)
        );
    }

    #[test]
    fn test_hash_to_scalar_is_deterministic() {
        let a: Fr = hash_to_scalar(b"foomp");
        let b: Fr = hash_to_scalar(b"foomp");
        let c: Fr = hash_to_scalar(b"100");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_to_curve_lands_in_subgroup() {
        use ark_ec::CurveGroup;
        type G1Affine = ark_bls12_381::G1Affine;

        let a = hash_to_curve::<G1Affine>(b"foomp");
        let b = hash_to_curve::<G1Affine>(b"foomp");
        let c = hash_to_curve::<G1Affine>(b"100");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());
        assert!(a.into_affine().is_in_correct_subgroup_assuming_on_curve());
    }

    #[test]
    fn test_find_duplicate() {
        assert_eq!(find_duplicate(&indices(&[1, 2, 3])), None);
        assert_eq!(
            find_duplicate(&indices(&[4, 2, 4])),
            Some(SignerIndex::new(4).unwrap())
        );
    }
}
