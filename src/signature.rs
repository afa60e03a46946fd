use crate::error::CoconutError;
use crate::setup::{Parameters, SecretKey, VerificationKey};
use crate::utils::hash_to_curve;
use ark_ec::pairing::Pairing;
use ark_serialize::*;
use ark_std::{rand::RngCore, UniformRand, Zero};

/// A (partial or aggregated) credential signature.
///
/// `sig1 = h` is a G1 base with unknown discrete log, and
/// `sig2 = (x + sum_k m_k * y_k) * sig1`.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Signature<E: Pairing> {
    pub(crate) sig1: E::G1,
    pub(crate) sig2: E::G1,
}

impl<E: Pairing> Signature<E> {
    pub fn new(sig1: E::G1, sig2: E::G1) -> Self {
        Signature { sig1, sig2 }
    }

    pub fn sig1(&self) -> &E::G1 {
        &self.sig1
    }

    pub fn sig2(&self) -> &E::G1 {
        &self.sig2
    }

    /// Size of the encoding: two compressed G1 elements.
    pub fn encoded_len() -> usize {
        2 * E::G1::zero().compressed_size()
    }

    /// Re-randomizes the signature to `(r * sig1, r * sig2)`.
    ///
    /// The result verifies under the same key and attributes but cannot be
    /// linked to the original.
    pub fn randomize<R: RngCore>(&self, rng: &mut R) -> Self {
        let r = E::ScalarField::rand(rng);
        Signature {
            sig1: self.sig1 * r,
            sig2: self.sig2 * r,
        }
    }

    /// Concatenation of the compressed encodings of `sig1` and `sig2`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoconutError> {
        let mut bytes = Vec::with_capacity(Self::encoded_len());
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    /// # Errors
    /// Returns an error if `bytes` has the wrong length or holds an invalid point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoconutError> {
        if bytes.len() != Self::encoded_len() {
            return Err(CoconutError::Serialization(format!(
                "signature must be {} bytes, got {}",
                Self::encoded_len(),
                bytes.len()
            )));
        }
        Ok(Self::deserialize_compressed(bytes)?)
    }
}

/// Domain separator for hashing attribute vectors onto G1.
const ATTRIBUTE_HASH_DST: &[u8] = b"threshold-coconut/sig1";

/// Hashes an attribute vector to the shared base `h` in G1.
///
/// Every authority signing the same attributes derives the same `h`, which is
/// what lets their partial signatures be interpolated.
pub fn hash_attributes<E: Pairing>(
    attributes: &[E::ScalarField],
) -> Result<E::G1, CoconutError> {
    let mut bytes = ATTRIBUTE_HASH_DST.to_vec();
    (attributes.len() as u64).serialize_compressed(&mut bytes)?;
    for attribute in attributes {
        attribute.serialize_compressed(&mut bytes)?;
    }
    Ok(hash_to_curve::<E::G1Affine>(&bytes))
}

/// Signs an attribute vector with a (share of a) secret key.
///
/// `sig1 = h` is derived from the attributes, so partial signatures from
/// different authorities over the same attributes share it. Use
/// [`Signature::randomize`] on the aggregate to get an unlinkable credential.
///
/// # Arguments
/// * `secret_key` - The signer's secret key share
/// * `attributes` - One scalar per attribute the key supports
///
/// # Errors
/// Returns an error if `attributes.len()` differs from the key's attribute count
pub fn sign<E: Pairing>(
    secret_key: &SecretKey<E>,
    attributes: &[E::ScalarField],
) -> Result<Signature<E>, CoconutError> {
    if attributes.len() != secret_key.attribute_count() {
        return Err(CoconutError::AttributeCountMismatch {
            expected: secret_key.attribute_count(),
            found: attributes.len(),
        });
    }

    let h = hash_attributes::<E>(attributes)?;

    let exponent = secret_key
        .ys()
        .iter()
        .zip(attributes)
        .fold(*secret_key.x(), |acc, (y, m)| acc + *y * m);

    Ok(Signature {
        sig1: h,
        sig2: h * exponent,
    })
}

/// Checks `e(sig1, alpha + sum_k m_k * beta_k) == e(sig2, g2)`.
///
/// Returns `false` (never an error) when the equation does not hold, when
/// `sig1` is the identity, or when the number of attributes differs from the
/// number of beta elements in the key.
pub fn verify<E: Pairing>(
    params: &Parameters<E>,
    verification_key: &VerificationKey<E>,
    attributes: &[E::ScalarField],
    signature: &Signature<E>,
) -> bool {
    if signature.sig1.is_zero() {
        return false;
    }
    if attributes.len() != verification_key.beta.len() {
        return false;
    }

    let kappa = verification_key
        .beta
        .iter()
        .zip(attributes)
        .fold(verification_key.alpha, |acc, (beta, m)| acc + *beta * *m);

    E::multi_pairing([signature.sig1, -signature.sig2], [kappa, *params.g2()]).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{keygen, ttp_keygen};

    type E = ark_bls12_381::Bls12_381;
    type G1 = <E as Pairing>::G1;
    type Fr = <E as Pairing>::ScalarField;

    #[test]
    fn test_sign_and_verify() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(3).unwrap();
        let keypair = keygen(&params, &mut rng);
        let attributes = params.n_random_scalars(3, &mut rng);

        let sig = sign(&keypair.secret_key, &attributes).unwrap();
        assert!(verify(&params, &keypair.verification_key, &attributes, &sig));

        let other_attributes = params.n_random_scalars(3, &mut rng);
        assert!(!verify(&params, &keypair.verification_key, &other_attributes, &sig));

        let other_key = keygen(&params, &mut rng);
        assert!(!verify(&params, &other_key.verification_key, &attributes, &sig));
    }

    #[test]
    fn test_signers_share_sig1_for_same_attributes() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(2).unwrap();
        let keypairs = ttp_keygen(&params, 2, 3, &mut rng).unwrap();
        let attributes = params.n_random_scalars(2, &mut rng);

        let sigs: Vec<_> = keypairs
            .iter()
            .map(|kp| sign(&kp.secret_key, &attributes).unwrap())
            .collect();
        let h = hash_attributes::<E>(&attributes).unwrap();
        for sig in &sigs {
            assert_eq!(sig.sig1(), &h);
        }
        assert_ne!(sigs[0].sig2(), sigs[1].sig2());

        let other = params.n_random_scalars(2, &mut rng);
        assert_ne!(hash_attributes::<E>(&other).unwrap(), h);
    }

    #[test]
    fn test_randomized_signatures_are_unlinkable() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(2).unwrap();
        let keypair = keygen(&params, &mut rng);
        let attributes = params.n_random_scalars(2, &mut rng);

        let sig = sign(&keypair.secret_key, &attributes).unwrap();
        let a = sig.randomize(&mut rng);
        let b = sig.randomize(&mut rng);
        assert_ne!(a, b);
        assert_ne!(a, sig);
        assert!(verify(&params, &keypair.verification_key, &attributes, &a));
        assert!(verify(&params, &keypair.verification_key, &attributes, &b));
    }

    #[test]
    fn test_attribute_count_mismatch() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(3).unwrap();
        let keypair = keygen(&params, &mut rng);
        let attributes = params.n_random_scalars(2, &mut rng);

        assert_eq!(
            sign(&keypair.secret_key, &attributes).unwrap_err(),
            CoconutError::AttributeCountMismatch { expected: 3, found: 2 }
        );

        let attributes = params.n_random_scalars(3, &mut rng);
        let sig = sign(&keypair.secret_key, &attributes).unwrap();
        let too_many = params.n_random_scalars(4, &mut rng);
        assert!(!verify(&params, &keypair.verification_key, &too_many, &sig));
        assert!(!verify(&params, &keypair.verification_key, &attributes[..2], &sig));
    }

    #[test]
    fn test_zero_blinding_is_rejected() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(1).unwrap();
        let keypair = keygen(&params, &mut rng);
        let attributes = params.n_random_scalars(1, &mut rng);

        // (0, 0) satisfies the pairing equation trivially
        let degenerate = Signature::<E>::new(G1::zero(), G1::zero());
        assert!(!verify(&params, &keypair.verification_key, &attributes, &degenerate));

        let degenerate = Signature::<E>::new(G1::zero(), G1::rand(&mut rng));
        assert!(!verify(&params, &keypair.verification_key, &attributes, &degenerate));
    }

    #[test]
    fn test_partial_signatures_verify_against_their_share() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(2).unwrap();
        let keypairs = ttp_keygen(&params, 2, 3, &mut rng).unwrap();
        let attributes: Vec<Fr> = params.n_random_scalars(2, &mut rng);

        for keypair in &keypairs {
            let sig = sign(&keypair.secret_key, &attributes).unwrap();
            assert!(verify(&params, &keypair.verification_key, &attributes, &sig));
        }
    }

    #[test]
    fn test_signature_encoding() {
        let mut rng = ark_std::test_rng();
        let params = Parameters::<E>::new(1).unwrap();
        let keypair = keygen(&params, &mut rng);
        let attributes = params.n_random_scalars(1, &mut rng);
        let sig = sign(&keypair.secret_key, &attributes).unwrap();

        let bytes = sig.to_bytes().unwrap();
        assert_eq!(bytes.len(), 96);
        assert_eq!(Signature::<E>::encoded_len(), 96);
        assert_eq!(Signature::<E>::from_bytes(&bytes).unwrap(), sig);

        assert!(Signature::<E>::from_bytes(&bytes[..95]).is_err());
        assert!(Signature::<E>::from_bytes(&[0xff; 96]).is_err());
    }
}
