pub mod errors;
pub mod hash_chain;
pub mod poseidon;
pub mod zero_bytes;

pub use errors::HasherError;
pub use poseidon::Poseidon;

use crate::zero_bytes::ZeroBytes;

pub const HASH_BYTES: usize = 32;

pub type Hash = [u8; HASH_BYTES];

pub trait Hasher {
    fn hash(val: &[u8]) -> Result<Hash, HasherError>;
    fn hashv(vals: &[&[u8]]) -> Result<Hash, HasherError>;
    fn zero_bytes() -> ZeroBytes;
}
