use std::fmt;
use std::fmt::Formatter;
use std::hash::Hash;
use std::ops::Add;
use std::ops::Mul;

use arbitrary::Arbitrary;
use arbitrary::Unstructured;
use num_bigint::BigInt;
use num_bigint::BigUint;
use num_traits::ConstOne;
use num_traits::ConstZero;
use num_traits::One;
use num_traits::ToPrimitive;
use num_traits::Zero;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::StandardUniform;

use super::Field;
use super::reduce_to_u64;

/// Element of the Goldilocks field ℤ_{2^64 - 2^32 + 1}.
///
/// In Montgomery representation. This implementation follows <https://eprint.iacr.org/2022/274.pdf>
/// and <https://github.com/novifinancial/winterfell/pull/101/files>.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct GoldilocksElement(u64);

impl fmt::Debug for GoldilocksElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GoldilocksElement").field(&self.value()).finish()
    }
}

impl fmt::Display for GoldilocksElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl<'a> Arbitrary<'a> for GoldilocksElement {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        u.arbitrary().map(GoldilocksElement::new)
    }
}

impl Distribution<GoldilocksElement> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GoldilocksElement {
        GoldilocksElement::new(rng.random_range(0..=GoldilocksElement::MAX))
    }
}

impl GoldilocksElement {
    /// The field's prime, _i.e._, 2^64 - 2^32 + 1.
    pub const P: u64 = 0xffff_ffff_0000_0001;
    pub const MAX: u64 = Self::P - 1;

    /// 2^128 mod P; this is used for conversion of elements into Montgomery representation.
    const R2: u64 = 0xffff_fffe_0000_0001;

    /// Values greater than or equal to [`Self::P`] are reduced.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(Self::montyred((value as u128) * (Self::R2 as u128)))
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        Self::montyred(self.0 as u128)
    }

    #[must_use]
    #[inline]
    pub const fn square(self) -> Self {
        Self(Self::montyred(self.0 as u128 * self.0 as u128))
    }

    #[must_use]
    #[inline]
    pub const fn mod_pow(&self, exp: u64) -> Self {
        let mut acc = GoldilocksElement::ONE;
        let bit_length = u64::BITS - exp.leading_zeros();
        let mut i = 0;
        while i < bit_length {
            acc = acc.square();
            if exp & (1 << (bit_length - 1 - i)) != 0 {
                acc = Self(Self::montyred(acc.0 as u128 * self.0 as u128));
            }
            i += 1;
        }

        acc
    }

    /// Montgomery reduction
    #[inline(always)]
    const fn montyred(x: u128) -> u64 {
        // See reference above for a description of the following implementation.
        let xl = x as u64;
        let xh = (x >> 64) as u64;
        let (a, e) = xl.overflowing_add(xl << 32);

        let b = a.wrapping_sub(a >> 32).wrapping_sub(e as u64);

        let (r, c) = xh.overflowing_sub(b);
        r.wrapping_sub((1 + !Self::P) * c as u64)
    }
}

impl Zero for GoldilocksElement {
    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

impl ConstZero for GoldilocksElement {
    const ZERO: Self = Self::new(0);
}

impl One for GoldilocksElement {
    #[inline]
    fn one() -> Self {
        Self::ONE
    }

    #[inline]
    fn is_one(&self) -> bool {
        self == &Self::ONE
    }
}

impl ConstOne for GoldilocksElement {
    const ONE: Self = Self::new(1);
}

impl Add for GoldilocksElement {
    type Output = Self;

    #[expect(clippy::suspicious_arithmetic_impl)]
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        // Compute a + b = a - (p - b).
        let (x1, c1) = self.0.overflowing_sub(Self::P - rhs.0);
        if c1 {
            Self(x1.wrapping_add(Self::P))
        } else {
            Self(x1)
        }
    }
}

impl Mul for GoldilocksElement {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(Self::montyred((self.0 as u128) * (rhs.0 as u128)))
    }
}

/// Handle for the Goldilocks field, see [`GoldilocksElement`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Goldilocks;

impl Field for Goldilocks {
    type Element = GoldilocksElement;

    fn modulus(&self) -> BigUint {
        BigUint::from(GoldilocksElement::P)
    }

    fn zero(&self) -> GoldilocksElement {
        GoldilocksElement::ZERO
    }

    fn one(&self) -> GoldilocksElement {
        GoldilocksElement::ONE
    }

    fn is_valid(&self, raw: &BigInt) -> bool {
        raw.to_u64().is_some_and(|v| v < GoldilocksElement::P)
    }

    fn create(&self, raw: &BigInt) -> GoldilocksElement {
        GoldilocksElement::new(reduce_to_u64(raw, GoldilocksElement::P))
    }

    fn add(&self, lhs: &GoldilocksElement, rhs: &GoldilocksElement) -> GoldilocksElement {
        *lhs + *rhs
    }

    fn mul(&self, lhs: &GoldilocksElement, rhs: &GoldilocksElement) -> GoldilocksElement {
        *lhs * *rhs
    }

    fn square(&self, x: &GoldilocksElement) -> GoldilocksElement {
        x.square()
    }

    fn pow(&self, base: &GoldilocksElement, exponent: u64) -> GoldilocksElement {
        base.mod_pow(exponent)
    }

    fn to_biguint(&self, x: &GoldilocksElement) -> BigUint {
        BigUint::from(x.value())
    }
}
