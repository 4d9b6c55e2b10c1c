//! Fixed-size byte wrappers for BLS public keys and signatures.
//!
//! `types` only needs to move these values around, (de)serialize them and hash them; the actual
//! point decompression, signing and verification live in `bls_envelope`, which depends on this
//! crate rather than the other way around.

use serde::de::{Error as DeError, Visitor};
use serde::{Deserializer, Serializer};
use ssz::{Decode, DecodeError, Encode};
use std::fmt;
use tree_hash::TreeHash;

macro_rules! fixed_bytes_type {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub fn zero() -> Self {
                $name([0u8; $len])
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self, &'static str> {
                if bytes.len() != $len {
                    return Err("incorrect byte length");
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok($name(out))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(&self.0[..]))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl Encode for $name {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $len
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.0);
            }

            fn ssz_bytes_len(&self) -> usize {
                $len
            }
        }

        impl Decode for $name {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $len
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
                if bytes.len() != $len {
                    return Err(DecodeError::InvalidByteLength {
                        len: bytes.len(),
                        expected: $len,
                    });
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok($name(out))
            }
        }

        impl TreeHash for $name {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> Vec<u8> {
                unreachable!("fixed-size byte blobs are not packed directly")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("fixed-size byte blobs are not packed directly")
            }

            fn tree_hash_root(&self) -> Vec<u8> {
                tree_hash::merkle_root(&self.0, 0)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&format!("0x{}", hex::encode(&self.0[..])))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                struct HexVisitor;
                impl<'de> Visitor<'de> for HexVisitor {
                    type Value = $name;
                    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        write!(f, "a 0x-prefixed hex string of {} bytes", $len)
                    }
                    fn visit_str<E: DeError>(self, v: &str) -> Result<$name, E> {
                        let stripped = v.strip_prefix("0x").unwrap_or(v);
                        let bytes = hex::decode(stripped).map_err(E::custom)?;
                        $name::from_slice(&bytes).map_err(E::custom)
                    }
                }
                d.deserialize_str(HexVisitor)
            }
        }
    };
}

fixed_bytes_type!(PublicKeyBytes, 48);
fixed_bytes_type!(SignatureBytes, 96);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssz_round_trip() {
        let mut bytes = [0u8; 48];
        bytes[0] = 7;
        let key = PublicKeyBytes(bytes);
        let encoded = key.as_ssz_bytes();
        let decoded = PublicKeyBytes::from_ssz_bytes(&encoded).unwrap();
        assert_eq!(key, decoded);
    }
}
