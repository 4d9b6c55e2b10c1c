//! Typed BLS signing/verification envelopes, separated from pairing math itself (`blst`
//! owns that) and from hash-tree-root (`tree_hash` owns that).
//!
//! A signed message's `signing_root` is always `hash_tree_root` of the message with its
//! `signature` field zeroed; callers compute that with `tree_hash` on the concrete message
//! type and pass the resulting root in here together with the domain from
//! `ChainSpec::get_domain`.

use blst::min_pk::{AggregatePublicKey, AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use types::{Hash256, PublicKeyBytes, SignatureBytes};

const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSZ_RO_POP_";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlsError {
    BadSignature,
    BadDomain,
    InvalidSecretKey,
    InvalidPublicKey,
    EmptyAggregate,
    LengthMismatch,
}

/// Message actually fed to the pairing: the domain tag prepended to the signing root, so that
/// a signature can never be replayed across message kinds or forks.
fn domain_separated_message(domain: [u8; 8], signing_root: Hash256) -> Vec<u8> {
    let mut msg = Vec::with_capacity(8 + 32);
    msg.extend_from_slice(&domain);
    msg.extend_from_slice(signing_root.as_bytes());
    msg
}

pub struct SecretKeyPair {
    secret: SecretKey,
}

impl SecretKeyPair {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlsError> {
        let secret = SecretKey::from_bytes(bytes).map_err(|_| BlsError::InvalidSecretKey)?;
        Ok(SecretKeyPair { secret })
    }

    /// Derives a key pair from arbitrary key material via `blst`'s `key_gen`, for tests and
    /// interop genesis generation where callers have seed bytes rather than a raw scalar.
    pub fn from_seed(ikm: &[u8]) -> Result<Self, BlsError> {
        let secret = SecretKey::key_gen(ikm, &[]).map_err(|_| BlsError::InvalidSecretKey)?;
        Ok(SecretKeyPair { secret })
    }

    pub fn public_key(&self) -> PublicKeyBytes {
        let pk = self.secret.sk_to_pk();
        PublicKeyBytes::from_slice(&pk.to_bytes()).expect("blst public key is 48 bytes")
    }
}

/// Signs `signing_root` under `domain`, returning the raw signature bytes.
pub fn sign(secret: &SecretKeyPair, domain: [u8; 8], signing_root: Hash256) -> SignatureBytes {
    let msg = domain_separated_message(domain, signing_root);
    let sig = secret.secret.sign(&msg, DST, &[]);
    SignatureBytes::from_slice(&sig.to_bytes()).expect("blst signature is 96 bytes")
}

/// Verifies a single signature against a single public key.
pub fn verify(
    domain: [u8; 8],
    signing_root: Hash256,
    pubkey: &PublicKeyBytes,
    signature: &SignatureBytes,
) -> bool {
    let (pk, sig) = match (decode_pubkey(pubkey), decode_signature(signature)) {
        (Ok(pk), Ok(sig)) => (pk, sig),
        _ => return false,
    };
    let msg = domain_separated_message(domain, signing_root);
    sig.verify(true, &msg, DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS
}

/// Aggregates individual signatures into one, per C2. Returns `EmptyAggregate` if `sigs` is
/// empty — an empty aggregate has no well-defined signer set.
pub fn aggregate_sigs(sigs: &[SignatureBytes]) -> Result<SignatureBytes, BlsError> {
    if sigs.is_empty() {
        return Err(BlsError::EmptyAggregate);
    }
    let decoded: Result<Vec<Signature>, BlsError> = sigs.iter().map(decode_signature).collect();
    let decoded = decoded?;
    let refs: Vec<&Signature> = decoded.iter().collect();
    let agg = AggregateSignature::aggregate(&refs, true).map_err(|_| BlsError::BadSignature)?;
    let sig = agg.to_signature();
    Ok(SignatureBytes::from_slice(&sig.to_bytes()).expect("blst signature is 96 bytes"))
}

/// Verifies that `signature` is the aggregate of each `pubkeys[i]` signing `signing_roots[i]`
/// under `domain`. `signing_roots` and `pubkeys` must have matching length.
pub fn verify_aggregate(
    domain: [u8; 8],
    signing_roots: &[Hash256],
    pubkeys: &[PublicKeyBytes],
    signature: &SignatureBytes,
) -> Result<bool, BlsError> {
    if signing_roots.len() != pubkeys.len() {
        return Err(BlsError::LengthMismatch);
    }
    if signing_roots.is_empty() {
        return Err(BlsError::EmptyAggregate);
    }

    let sig = decode_signature(signature)?;
    let pks: Result<Vec<PublicKey>, BlsError> = pubkeys.iter().map(decode_pubkey).collect();
    let pks = pks?;
    let pk_refs: Vec<&PublicKey> = pks.iter().collect();

    let msgs: Vec<Vec<u8>> = signing_roots
        .iter()
        .map(|root| domain_separated_message(domain, *root))
        .collect();
    let msg_refs: Vec<&[u8]> = msgs.iter().map(|m| m.as_slice()).collect();

    let result = sig.aggregate_verify(true, &msg_refs, DST, &pk_refs, true);
    Ok(result == BLST_ERROR::BLST_SUCCESS)
}

/// Verifies that `signature` is the aggregate of every `pubkeys[i]` signing the *same*
/// `signing_root` under `domain` — the common case of one attestation's committee co-signing
/// one vote.
pub fn verify_aggregate_common_message(
    domain: [u8; 8],
    signing_root: Hash256,
    pubkeys: &[PublicKeyBytes],
    signature: &SignatureBytes,
) -> Result<bool, BlsError> {
    if pubkeys.is_empty() {
        return Err(BlsError::EmptyAggregate);
    }
    let sig = decode_signature(signature)?;
    let pks: Result<Vec<PublicKey>, BlsError> = pubkeys.iter().map(decode_pubkey).collect();
    let pks = pks?;
    let pk_refs: Vec<&PublicKey> = pks.iter().collect();
    let agg_pk = AggregatePublicKey::aggregate(&pk_refs, true).map_err(|_| BlsError::InvalidPublicKey)?;
    let pk = agg_pk.to_public_key();

    let msg = domain_separated_message(domain, signing_root);
    Ok(sig.verify(true, &msg, DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS)
}

fn decode_pubkey(bytes: &PublicKeyBytes) -> Result<PublicKey, BlsError> {
    PublicKey::from_bytes(bytes.as_bytes()).map_err(|_| BlsError::InvalidPublicKey)
}

fn decode_signature(bytes: &SignatureBytes) -> Result<Signature, BlsError> {
    Signature::from_bytes(bytes.as_bytes()).map_err(|_| BlsError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn random_secret() -> SecretKeyPair {
        let mut ikm = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut ikm);
        SecretKeyPair {
            secret: SecretKey::key_gen(&ikm, &[]).unwrap(),
        }
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let secret = random_secret();
        let pubkey = secret.public_key();
        let root = Hash256::repeat_byte(9);
        let domain = [1, 2, 3, 4, 5, 6, 7, 8];

        let sig = sign(&secret, domain, root);
        assert!(verify(domain, root, &pubkey, &sig));
        assert!(!verify(domain, Hash256::repeat_byte(8), &pubkey, &sig));
    }

    #[test]
    fn aggregate_common_message() {
        let secrets: Vec<_> = (0..4).map(|_| random_secret()).collect();
        let pubkeys: Vec<_> = secrets.iter().map(|s| s.public_key()).collect();
        let root = Hash256::repeat_byte(3);
        let domain = [0u8; 8];

        let sigs: Vec<_> = secrets.iter().map(|s| sign(s, domain, root)).collect();
        let agg = aggregate_sigs(&sigs).unwrap();

        assert!(verify_aggregate_common_message(domain, root, &pubkeys, &agg).unwrap());
    }

    #[test]
    fn empty_aggregate_rejected() {
        assert_eq!(aggregate_sigs(&[]), Err(BlsError::EmptyAggregate));
    }
}
