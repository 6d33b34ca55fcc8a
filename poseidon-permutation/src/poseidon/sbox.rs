use arbitrary::Arbitrary;

use crate::error::ConfigError;
use crate::field::Field;

/// The exponent of the S-box `x ↦ x^α`.
///
/// The strategy for evaluating the S-box is fixed once, when the parameters are
/// validated. Exponents 3 and 5 use dedicated square-and-multiply chains, all
/// others go through [`Field::pow`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Arbitrary)]
pub enum SboxPower {
    Cube,

    #[default]
    Quint,

    Septic,
}

impl SboxPower {
    pub const fn exponent(self) -> u64 {
        match self {
            Self::Cube => 3,
            Self::Quint => 5,
            Self::Septic => 7,
        }
    }

    #[inline]
    pub fn apply<F: Field>(self, field: &F, x: &F::Element) -> F::Element {
        match self {
            Self::Cube => field.mul(&field.square(x), x),
            Self::Quint => field.mul(&field.square(&field.square(x)), x),
            Self::Septic => field.pow(x, 7),
        }
    }

    /// The S-box through general exponentiation, regardless of specialization.
    pub fn apply_generic<F: Field>(self, field: &F, x: &F::Element) -> F::Element {
        field.pow(x, self.exponent())
    }
}

impl TryFrom<i64> for SboxPower {
    type Error = ConfigError;

    fn try_from(power: i64) -> Result<Self, Self::Error> {
        match power {
            3 => Ok(Self::Cube),
            5 => Ok(Self::Quint),
            7 => Ok(Self::Septic),
            _ => Err(ConfigError::InvalidSboxPower(power)),
        }
    }
}
