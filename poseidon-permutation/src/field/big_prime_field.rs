use num_bigint::BigInt;
use num_bigint::BigUint;
use num_bigint::Sign;
use num_traits::Num;

use super::Field;
use crate::error::ConfigError;

/// A prime field with an arbitrarily large modulus, _e.g._, the scalar fields
/// of BN254 or BLS12-381. Elements are canonical [`BigUint`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigPrimeField {
    modulus: BigUint,
    modulus_bigint: BigInt,
}

impl BigPrimeField {
    pub fn new(modulus: BigUint) -> Result<Self, ConfigError> {
        if modulus < BigUint::from(2_u32) {
            return Err(ConfigError::InvalidField("modulus must be at least 2"));
        }

        let modulus_bigint = BigInt::from(modulus.clone());
        Ok(Self {
            modulus,
            modulus_bigint,
        })
    }

    pub fn from_decimal_str(modulus: &str) -> Result<Self, ConfigError> {
        let modulus = BigUint::from_str_radix(modulus, 10)
            .map_err(|_| ConfigError::InvalidField("modulus is not a decimal number"))?;
        Self::new(modulus)
    }
}

impl Field for BigPrimeField {
    type Element = BigUint;

    fn modulus(&self) -> BigUint {
        self.modulus.clone()
    }

    fn zero(&self) -> BigUint {
        BigUint::ZERO
    }

    fn one(&self) -> BigUint {
        BigUint::from(1_u32)
    }

    fn is_valid(&self, raw: &BigInt) -> bool {
        raw.sign() != Sign::Minus && raw.magnitude() < &self.modulus
    }

    fn create(&self, raw: &BigInt) -> BigUint {
        let mut reduced = raw % &self.modulus_bigint;
        if reduced.sign() == Sign::Minus {
            reduced += &self.modulus_bigint;
        }

        reduced.magnitude().clone()
    }

    fn add(&self, lhs: &BigUint, rhs: &BigUint) -> BigUint {
        (lhs + rhs) % &self.modulus
    }

    fn mul(&self, lhs: &BigUint, rhs: &BigUint) -> BigUint {
        (lhs * rhs) % &self.modulus
    }

    fn pow(&self, base: &BigUint, exponent: u64) -> BigUint {
        base.modpow(&BigUint::from(exponent), &self.modulus)
    }

    fn to_biguint(&self, x: &BigUint) -> BigUint {
        x.clone()
    }
}
