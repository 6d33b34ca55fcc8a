//! The arithmetization-oriented permutation Poseidon.
//!
//! This module implements the permutation of [“Poseidon: A New Hash Function for
//! Zero-Knowledge Proof Systems”](https://eprint.iacr.org/2019/458.pdf) over any
//! [field](crate::field::Field), for any state width, number of rounds, S-box
//! power, round constants, and MDS matrix. Sponge constructions are out of
//! scope; the permutation returns the full state.
//!
//! Each round adds the round constants, applies the S-box `x ↦ x^α`, and
//! multiplies the state with the MDS matrix. The first and last `R_F / 2`
//! rounds are full rounds, applying the S-box to every state element. The
//! `R_P` rounds in between are partial rounds, applying the S-box to a single
//! state element.

use itertools::Itertools;
use num_bigint::BigInt;
use rayon::prelude::*;
use tracing::trace;

use crate::config;
use crate::error::ConfigError;
use crate::error::PermutationError;
use crate::field::Field;

pub mod constants;
pub mod params;
pub mod sbox;

pub use constants::split_constants;
pub use params::PoseidonOptions;
pub use params::PoseidonParams;
pub use sbox::SboxPower;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RoundKind {
    /// The S-box is applied to every state element.
    Full,

    /// The S-box is applied to exactly one state element.
    Partial,
}

/// The state right after some round, including that round's MDS multiplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrace<E> {
    pub index: usize,
    pub kind: RoundKind,
    pub state: Vec<E>,
}

/// An instance of the Poseidon permutation, closed over validated
/// [parameters](PoseidonParams).
///
/// The instance is immutable. It can be shared between threads and used for
/// any number of concurrent permutations.
#[derive(Debug)]
pub struct Poseidon<'f, F: Field> {
    params: PoseidonParams<'f, F>,
}

impl<F: Field> Clone for Poseidon<'_, F> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
        }
    }
}

impl<'f, F: Field> Poseidon<'f, F> {
    pub fn new(field: &'f F, options: &PoseidonOptions) -> Result<Self, ConfigError> {
        PoseidonParams::new(field, options).map(Self::from_params)
    }

    pub fn from_params(params: PoseidonParams<'f, F>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PoseidonParams<'f, F> {
        &self.params
    }

    /// The canonicalized round constants, one row per round.
    pub fn round_constants(&self) -> &[Vec<F::Element>] {
        self.params.round_constants()
    }

    /// The canonicalized MDS matrix.
    pub fn mds(&self) -> &[Vec<F::Element>] {
        self.params.mds()
    }

    /// Apply the permutation to a state of length `t`.
    pub fn permute(&self, state: &[F::Element]) -> Result<Vec<F::Element>, PermutationError> {
        self.check_state_length(state.len())?;
        self.run(state.to_vec(), |_, _, _| ())
    }

    /// Apply the permutation to a state of raw scalars. Every scalar must be a
    /// [valid](Field::is_valid) field element.
    pub fn permute_raw(&self, state: &[BigInt]) -> Result<Vec<F::Element>, PermutationError> {
        self.check_state_length(state.len())?;

        let field = self.params.field();
        let state = state
            .iter()
            .enumerate()
            .map(|(index, value)| {
                if !field.is_valid(value) {
                    let value = value.clone();
                    return Err(PermutationError::InvalidElement { index, value });
                }

                Ok(field.create(value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.run(state, |_, _, _| ())
    }

    /// Like [`Self::permute`], but additionally records the state after every
    /// round. Useful to pinpoint the first diverging round when comparing
    /// against reference implementations.
    pub fn permute_with_trace(
        &self,
        state: &[F::Element],
    ) -> Result<(Vec<F::Element>, Vec<RoundTrace<F::Element>>), PermutationError> {
        self.check_state_length(state.len())?;

        let mut traces = Vec::with_capacity(self.params.rounds());
        let record = |index, kind, round_state: &[F::Element]| {
            let state = round_state.to_vec();
            traces.push(RoundTrace { index, kind, state });
        };
        let final_state = self.run(state.to_vec(), record)?;

        Ok((final_state, traces))
    }

    /// Permute many independent states. The result is in the same order as the
    /// input. Fails if any one state cannot be permuted.
    ///
    /// Batches at least as large as the
    /// [cutoff](config::set_batch_parallelization_cutoff) are permuted in
    /// parallel.
    pub fn permute_batch(
        &self,
        states: &[Vec<F::Element>],
    ) -> Result<Vec<Vec<F::Element>>, PermutationError> {
        let cutoff = config::batch_parallelization_cutoff();
        if states.len() < cutoff {
            trace!(batch_size = states.len(), cutoff, "permuting batch sequentially");
            return states.iter().map(|state| self.permute(state)).collect();
        }

        trace!(batch_size = states.len(), cutoff, "permuting batch in parallel");
        states.par_iter().map(|state| self.permute(state)).collect()
    }

    fn check_state_length(&self, actual: usize) -> Result<(), PermutationError> {
        let expected = self.params.t();
        if actual != expected {
            return Err(PermutationError::InvalidInputLength { expected, actual });
        }

        Ok(())
    }

    fn run(
        &self,
        mut state: Vec<F::Element>,
        mut observe: impl FnMut(usize, RoundKind, &[F::Element]),
    ) -> Result<Vec<F::Element>, PermutationError> {
        let rounds = self.params.schedule().zip(self.params.round_constants());

        let mut executed = 0;
        for (index, (kind, round_constants)) in rounds.enumerate() {
            state = self.round(&state, kind, round_constants);
            observe(index, kind, &state);
            executed += 1;
        }

        let expected = self.params.rounds();
        if executed != expected {
            return Err(PermutationError::RoundCountMismatch { executed, expected });
        }

        Ok(state)
    }

    #[inline]
    fn round(
        &self,
        state: &[F::Element],
        kind: RoundKind,
        round_constants: &[F::Element],
    ) -> Vec<F::Element> {
        let field = self.params.field();
        let sbox = self.params.sbox();

        let mut state = state
            .iter()
            .zip_eq(round_constants)
            .map(|(x, c)| field.add(x, c))
            .collect_vec();

        match kind {
            RoundKind::Full => {
                for x in &mut state {
                    *x = sbox.apply(field, x);
                }
            }
            RoundKind::Partial => {
                let i = self.params.partial_sbox_index();
                state[i] = sbox.apply(field, &state[i]);
            }
        }

        self.params
            .mds()
            .iter()
            .map(|row| {
                row.iter()
                    .zip_eq(&state)
                    .fold(field.zero(), |acc, (m, x)| field.add(&acc, &field.mul(m, x)))
            })
            .collect()
    }
}
