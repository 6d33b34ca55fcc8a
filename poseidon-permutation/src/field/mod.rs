//! The field capability the Poseidon permutation is generic over.
//!
//! The permutation never does arithmetic on its own. Instead, it borrows a
//! field handle implementing [`Field`] and routes every addition,
//! multiplication, and squaring through it. This allows instantiations with
//! different moduli and different internal representations, for example
//! Montgomery form as used by [`Goldilocks`].

use std::fmt::Debug;

use num_bigint::BigInt;
use num_bigint::BigUint;
use num_bigint::Sign;
use num_traits::ToPrimitive;

use crate::error::ConfigError;

pub mod big_prime_field;
pub mod goldilocks;
pub mod prime_field_64;

pub use big_prime_field::BigPrimeField;
pub use goldilocks::Goldilocks;
pub use goldilocks::GoldilocksElement;
pub use prime_field_64::PrimeField64;

/// Simplifies constructing vectors of raw scalars, _i.e._, [`BigInt`]s.
///
/// # Examples
///
/// ```
/// # use poseidon_permutation::prelude::*;
/// let a = scalars![1, 2, 3];
/// let b = vec![BigInt::from(1), BigInt::from(2), BigInt::from(3)];
/// assert_eq!(a, b);
///
/// let c = scalars![0; 4];
/// assert_eq!(vec![BigInt::from(0); 4], c);
/// ```
#[macro_export]
macro_rules! scalars {
    ($b:expr; $n:expr) => {
        vec![$crate::num_bigint::BigInt::from($b); $n]
    };
    ($($b:expr),* $(,)?) => {
        vec![$($crate::num_bigint::BigInt::from($b)),*]
    };
}

/// A prime field, handed to the permutation as an explicit capability.
///
/// Raw scalars are [`BigInt`]s. Only those accepted by [`Field::is_valid`] are
/// legal field elements; [`Field::create`] maps them into the internal
/// representation [`Field::Element`]. None of the arithmetic methods mutate
/// their operands.
pub trait Field: Debug + Send + Sync {
    type Element: Clone + Debug + Eq + Send + Sync;

    /// The field's prime.
    fn modulus(&self) -> BigUint;

    /// The additive identity.
    fn zero(&self) -> Self::Element;

    /// The multiplicative identity.
    fn one(&self) -> Self::Element;

    /// Whether the raw scalar is a canonical residue, _i.e._, lies in
    /// `[0, modulus)`.
    fn is_valid(&self, raw: &BigInt) -> bool {
        raw.sign() != Sign::Minus && raw.magnitude() < &self.modulus()
    }

    /// Canonicalize a raw scalar. Scalars outside `[0, modulus)` are reduced.
    fn create(&self, raw: &BigInt) -> Self::Element;

    fn add(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element;

    fn mul(&self, lhs: &Self::Element, rhs: &Self::Element) -> Self::Element;

    fn square(&self, x: &Self::Element) -> Self::Element {
        self.mul(x, x)
    }

    /// `base^exponent`, by left-to-right square-and-multiply.
    fn pow(&self, base: &Self::Element, exponent: u64) -> Self::Element {
        let mut acc = self.one();
        let bit_length = u64::BITS - exponent.leading_zeros();
        for i in (0..bit_length).rev() {
            acc = self.square(&acc);
            if (exponent >> i) & 1 == 1 {
                acc = self.mul(&acc, base);
            }
        }

        acc
    }

    /// The canonical value of an element.
    fn to_biguint(&self, x: &Self::Element) -> BigUint;
}

/// Check that the field handle honors the [`Field`] contract.
///
/// This does not test primality of the modulus.
pub fn validate_field<F: Field>(field: &F) -> Result<(), ConfigError> {
    let modulus = field.modulus();
    if modulus < BigUint::from(2_u32) {
        return Err(ConfigError::InvalidField("modulus must be at least 2"));
    }

    let modulus = BigInt::from(modulus);
    let zero = BigInt::ZERO;
    let one = BigInt::from(1);
    if !field.is_valid(&zero) || !field.is_valid(&(&modulus - &one)) {
        return Err(ConfigError::InvalidField("validity predicate rejects [0, modulus)"));
    }
    if field.is_valid(&modulus) || field.is_valid(&-&one) {
        return Err(ConfigError::InvalidField("validity predicate accepts non-residues"));
    }

    let field_zero = field.zero();
    let field_one = field.one();
    if field.create(&zero) != field_zero || field.create(&one) != field_one {
        return Err(ConfigError::InvalidField("identities disagree with `create`"));
    }
    if field.add(&field_zero, &field_one) != field_one {
        return Err(ConfigError::InvalidField("zero is not the additive identity"));
    }
    if field.mul(&field_one, &field_one) != field_one || field.square(&field_one) != field_one {
        return Err(ConfigError::InvalidField("one is not the multiplicative identity"));
    }

    Ok(())
}

/// Reduce a raw scalar into `[0, modulus)`.
///
/// The modulus must be non-zero.
pub(crate) fn reduce_to_u64(raw: &BigInt, modulus: u64) -> u64 {
    if let Some(value) = raw.to_u64() {
        return value % modulus;
    }

    let modulus_bigint = BigInt::from(modulus);
    let mut reduced = raw % &modulus_bigint;
    if reduced.sign() == Sign::Minus {
        reduced += &modulus_bigint;
    }

    // `reduced` fits into one digit; zero has no digits at all
    reduced.magnitude().iter_u64_digits().next().unwrap_or(0)
}
