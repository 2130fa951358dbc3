use std::sync::OnceLock;

use crate::{
    errors::HasherError,
    zero_bytes::{ZeroBytes, ZERO_BYTES_LEN},
    Hash, Hasher,
};

#[derive(Clone, Copy, Debug)]
pub struct Poseidon;

static ZERO_BYTES: OnceLock<ZeroBytes> = OnceLock::new();

impl Hasher for Poseidon {
    fn hash(val: &[u8]) -> Result<Hash, HasherError> {
        Self::hashv(&[val])
    }

    fn hashv(vals: &[&[u8]]) -> Result<Hash, HasherError> {
        use ark_bn254::Fr;
        use light_poseidon::{Poseidon, PoseidonBytesHasher};

        let mut hasher = Poseidon::<Fr>::new_circom(vals.len())?;
        let res = hasher.hash_bytes_be(vals)?;

        Ok(res)
    }

    fn zero_bytes() -> ZeroBytes {
        // The table is deterministic, computing it lazily once per process
        // replaces the pregenerated table a codegen step would emit.
        *ZERO_BYTES.get_or_init(|| {
            let mut bytes = [[0u8; 32]; ZERO_BYTES_LEN];
            for i in 1..ZERO_BYTES_LEN {
                let child = bytes[i - 1];
                bytes[i] = Self::hashv(&[&child, &child])
                    .expect("poseidon hash of two field elements");
            }
            bytes
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero_bytes_are_iterated_hashes() {
        let zero_bytes = Poseidon::zero_bytes();
        assert_eq!(zero_bytes[0], [0u8; 32]);
        for i in 0..ZERO_BYTES_LEN - 1 {
            let expected = Poseidon::hashv(&[&zero_bytes[i], &zero_bytes[i]]).unwrap();
            assert_eq!(zero_bytes[i + 1], expected);
        }
    }

    #[test]
    fn test_hashv_is_deterministic_and_arity_sensitive() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let h1 = Poseidon::hashv(&[&a, &b]).unwrap();
        let h2 = Poseidon::hashv(&[&a, &b]).unwrap();
        assert_eq!(h1, h2);
        let h3 = Poseidon::hashv(&[&b, &a]).unwrap();
        assert_ne!(h1, h3);
        let h4 = Poseidon::hashv(&[&a]).unwrap();
        assert_ne!(h1, h4);
    }
}
