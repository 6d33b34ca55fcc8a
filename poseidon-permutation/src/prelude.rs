pub use num_bigint::BigInt;
pub use num_bigint::BigUint;

pub use crate::error::ConfigError;
pub use crate::error::PartitionError;
pub use crate::error::PermutationError;
pub use crate::error::TableError;
pub use crate::field;
pub use crate::field::BigPrimeField;
pub use crate::field::Field;
pub use crate::field::Goldilocks;
pub use crate::field::GoldilocksElement;
pub use crate::field::PrimeField64;
pub use crate::poseidon;
pub use crate::poseidon::Poseidon;
pub use crate::poseidon::PoseidonOptions;
pub use crate::poseidon::PoseidonParams;
pub use crate::poseidon::RoundKind;
pub use crate::poseidon::RoundTrace;
pub use crate::poseidon::SboxPower;
pub use crate::poseidon::split_constants;
pub use crate::scalars;
