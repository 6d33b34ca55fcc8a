use num_bigint::BigInt;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::Field;
use super::reduce_to_u64;
use crate::error::ConfigError;

/// A prime field with a modulus that fits into a `u64`. Elements are kept in
/// canonical form; products are computed in `u128`.
///
/// Suitable for small toy fields as well as for 31- and 64-bit fields like
/// BabyBear or Mersenne-31. Primality of the modulus is not checked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PrimeField64 {
    modulus: u64,
}

impl PrimeField64 {
    pub const BABY_BEAR: Self = Self {
        modulus: 0x7800_0001,
    };

    pub const MERSENNE_31: Self = Self {
        modulus: 0x7fff_ffff,
    };

    pub fn new(modulus: u64) -> Result<Self, ConfigError> {
        if modulus < 2 {
            return Err(ConfigError::InvalidField("modulus must be at least 2"));
        }

        Ok(Self { modulus })
    }

    pub const fn modulus_u64(&self) -> u64 {
        self.modulus
    }
}

impl Field for PrimeField64 {
    type Element = u64;

    fn modulus(&self) -> BigUint {
        BigUint::from(self.modulus)
    }

    fn zero(&self) -> u64 {
        0
    }

    fn one(&self) -> u64 {
        1
    }

    fn is_valid(&self, raw: &BigInt) -> bool {
        raw.to_u64().is_some_and(|v| v < self.modulus)
    }

    fn create(&self, raw: &BigInt) -> u64 {
        reduce_to_u64(raw, self.modulus)
    }

    fn add(&self, lhs: &u64, rhs: &u64) -> u64 {
        ((u128::from(*lhs) + u128::from(*rhs)) % u128::from(self.modulus)) as u64
    }

    fn mul(&self, lhs: &u64, rhs: &u64) -> u64 {
        ((u128::from(*lhs) * u128::from(*rhs)) % u128::from(self.modulus)) as u64
    }

    fn to_biguint(&self, x: &u64) -> BigUint {
        BigUint::from(*x)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::field::validate_field;

    #[test]
    fn degenerate_moduli_are_rejected() {
        assert!(PrimeField64::new(0).is_err());
        assert!(PrimeField64::new(1).is_err());
        assert!(PrimeField64::new(2).is_ok());
    }

    #[test]
    fn well_known_fields_honor_the_contract() {
        assert_eq!(Ok(()), validate_field(&PrimeField64::BABY_BEAR));
        assert_eq!(Ok(()), validate_field(&PrimeField64::MERSENNE_31));
    }

    #[test]
    fn arithmetic_in_tiny_field() {
        let field = PrimeField64::new(7).unwrap();
        assert_eq!(1, field.add(&3, &5));
        assert_eq!(1, field.mul(&3, &5));
        assert_eq!(2, field.square(&3));
        assert_eq!(6, field.pow(&3, 3));
        assert_eq!(5, field.create(&BigInt::from(-2)));
    }

    #[proptest]
    fn arithmetic_does_not_overflow_for_largest_modulus(
        #[strategy(0..u64::MAX)] a: u64,
        #[strategy(0..u64::MAX)] b: u64,
    ) {
        let field = PrimeField64::new(u64::MAX).unwrap();
        let sum = field.add(&a, &b);
        let product = field.mul(&a, &b);
        prop_assert!(sum < u64::MAX);
        prop_assert!(product < u64::MAX);
    }
}
