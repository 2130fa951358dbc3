use light_poseidon::PoseidonError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HasherError {
    #[error("Integer overflow, value too large")]
    IntegerOverflow,
    #[error("Poseidon hasher error: {0}")]
    Poseidon(#[from] PoseidonError),
    #[error("Allowed input length {0} provided {1}")]
    InvalidInputLength(usize, usize),
    #[error("Empty input")]
    EmptyInput,
}

impl From<HasherError> for u32 {
    fn from(e: HasherError) -> u32 {
        match e {
            HasherError::IntegerOverflow => 7001,
            HasherError::Poseidon(_) => 7002,
            HasherError::InvalidInputLength(_, _) => 7003,
            HasherError::EmptyInput => 7004,
        }
    }
}
