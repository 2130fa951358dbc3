use crate::{Hasher, HasherError, Poseidon};

/// Creates a hash chain from an array of [u8;32] arrays.
pub fn create_hash_chain_from_array<const T: usize>(
    inputs: [[u8; 32]; T],
) -> Result<[u8; 32], HasherError> {
    create_hash_chain_from_slice(&inputs)
}

/// Creates a hash chain from a slice of [u8;32] arrays.
///
/// A single input is its own chain, the empty chain is zero.
pub fn create_hash_chain_from_slice(inputs: &[[u8; 32]]) -> Result<[u8; 32], HasherError> {
    if inputs.is_empty() {
        return Ok([0u8; 32]);
    }
    let mut hash_chain = inputs[0];
    for input in inputs.iter().skip(1) {
        hash_chain = Poseidon::hashv(&[&hash_chain, input])?;
    }
    Ok(hash_chain)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_chain_is_zero() {
        assert_eq!(create_hash_chain_from_slice(&[]).unwrap(), [0u8; 32]);
    }

    #[test]
    fn test_single_element_chain_is_identity() {
        let input = [3u8; 32];
        assert_eq!(create_hash_chain_from_slice(&[input]).unwrap(), input);
    }

    #[test]
    fn test_chain_extends_pairwise() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let c = [3u8; 32];
        let chain = create_hash_chain_from_array([a, b, c]).unwrap();
        let ab = Poseidon::hashv(&[&a, &b]).unwrap();
        let expected = Poseidon::hashv(&[&ab, &c]).unwrap();
        assert_eq!(chain, expected);
    }
}
