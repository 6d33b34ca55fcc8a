use num_bigint::BigInt;
use thiserror::Error;

/// Reasons why a set of [Poseidon options](crate::poseidon::PoseidonOptions) cannot be
/// turned into [parameters](crate::poseidon::PoseidonParams).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: i64 },

    #[error("S-box power must be one of 3, 5, or 7, but got {0}")]
    InvalidSboxPower(i64),

    #[error("number of full rounds must be even, but got {0}")]
    OddFullRounds(usize),

    #[error("invalid round constants: {0}")]
    InvalidRoundConstants(TableError),

    #[error("invalid MDS matrix: {0}")]
    InvalidMds(TableError),
}

/// Shape or content defects of a table of field elements, _i.e._, the round
/// constants or the MDS matrix.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum TableError {
    #[error("expected {expected} rows, but got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row} has {actual} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("entry ({row}, {column}) is not a field element: {value}")]
    Element {
        row: usize,
        column: usize,
        value: BigInt,
    },
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum PermutationError {
    #[error("expected state of length {expected}, but got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },

    #[error("state element {index} is not a field element: {value}")]
    InvalidElement { index: usize, value: BigInt },

    /// Internal invariant violation. Unreachable for validated parameters.
    #[error("executed {executed} rounds, but parameters demand {expected}")]
    RoundCountMismatch { executed: usize, expected: usize },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[non_exhaustive]
pub enum PartitionError {
    #[error("cannot split {len} constants into rows of width {width}")]
    InvalidWidth { len: usize, width: usize },

    #[error("row width must be a positive integer, but got {0}")]
    InvalidPartitionParameter(i64),
}
