#![deny(clippy::shadow_unrelated)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The Poseidon permutation over arbitrary prime fields.
//!
//! Describe an instance with [`PoseidonOptions`][options], validate it against
//! a [field][field] to get a [`Poseidon`][poseidon] permutation, then permute
//! as many states as needed.
//!
//! ```
//! # use poseidon_permutation::prelude::*;
//! let field = PrimeField64::new(7)?;
//! let options = PoseidonOptions {
//!     t: 2,
//!     rounds_full: 2,
//!     rounds_partial: 1,
//!     sbox_power: Some(3),
//!     reverse_partial_power_index: None,
//!     mds: vec![scalars![1, 0], scalars![0, 1]],
//!     round_constants: vec![scalars![0, 0]; 3],
//! };
//! let poseidon = Poseidon::new(&field, &options)?;
//! assert_eq!(vec![1, 1], poseidon.permute(&[1, 2])?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [options]: poseidon::PoseidonOptions
//! [field]: field::Field
//! [poseidon]: poseidon::Poseidon

pub mod config;
pub mod error;
pub mod field;
pub mod prelude;
pub mod poseidon;

// re-export crates used in our public API
pub use num_bigint;
