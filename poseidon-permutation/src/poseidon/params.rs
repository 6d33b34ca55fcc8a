use std::iter;

use num_bigint::BigInt;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::RoundKind;
use super::sbox::SboxPower;
use crate::error::ConfigError;
use crate::error::TableError;
use crate::field::Field;
use crate::field::validate_field;

/// The largest integer that survives a round trip through an IEEE 754 double,
/// which is how most published parameter sets encode their integers.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

pub const MIN_STATE_WIDTH: usize = 2;

/// Raw, unvalidated description of a Poseidon instance.
///
/// Turn it into [`PoseidonParams`] before use. In their serialized form, all
/// scalars are strings, either decimal or hexadecimal with prefix `0x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoseidonOptions {
    /// The state width.
    pub t: i64,

    /// The total number of full rounds, split evenly around the partial rounds.
    pub rounds_full: i64,

    pub rounds_partial: i64,

    /// Defaults to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sbox_power: Option<i64>,

    /// Apply the partial rounds' S-box to the last state element instead of the
    /// first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_partial_power_index: Option<bool>,

    #[serde(with = "scalar_table")]
    pub mds: Vec<Vec<BigInt>>,

    #[serde(with = "scalar_table")]
    pub round_constants: Vec<Vec<BigInt>>,
}

impl PoseidonOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Validated, immutable parameters of a Poseidon instance.
///
/// All constants are canonicalized into the field's internal representation.
#[derive(Debug)]
pub struct PoseidonParams<'f, F: Field> {
    field: &'f F,
    t: usize,
    rounds_full: usize,
    rounds_partial: usize,
    rounds: usize,
    sbox: SboxPower,
    partial_sbox_index: usize,
    mds: Vec<Vec<F::Element>>,
    round_constants: Vec<Vec<F::Element>>,
}

impl<F: Field> Clone for PoseidonParams<'_, F> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            t: self.t,
            rounds_full: self.rounds_full,
            rounds_partial: self.rounds_partial,
            rounds: self.rounds,
            sbox: self.sbox,
            partial_sbox_index: self.partial_sbox_index,
            mds: self.mds.clone(),
            round_constants: self.round_constants.clone(),
        }
    }
}

impl<'f, F: Field> PoseidonParams<'f, F> {
    /// Validate the options against the field.
    ///
    /// Checks are performed in a fixed order: the field handle, the integer
    /// parameters, the S-box power, the parity of the full rounds, the round
    /// constants, and finally the MDS matrix. The first violation is reported.
    pub fn new(field: &'f F, options: &PoseidonOptions) -> Result<Self, ConfigError> {
        let params = Self::validate(field, options)
            .inspect_err(|err| debug!(%err, "rejected Poseidon options"))?;

        debug!(
            t = params.t,
            rounds_full = params.rounds_full,
            rounds_partial = params.rounds_partial,
            sbox_power = params.sbox.exponent(),
            partial_sbox_index = params.partial_sbox_index,
            "accepted Poseidon options"
        );

        Ok(params)
    }

    fn validate(field: &'f F, options: &PoseidonOptions) -> Result<Self, ConfigError> {
        validate_field(field)?;

        let t = non_negative_safe_integer("t", options.t)?;
        let rounds_full = non_negative_safe_integer("rounds_full", options.rounds_full)?;
        let rounds_partial = non_negative_safe_integer("rounds_partial", options.rounds_partial)?;
        if t < MIN_STATE_WIDTH {
            let value = options.t;
            return Err(ConfigError::InvalidParameter { name: "t", value });
        }

        let sbox = options
            .sbox_power
            .map_or(Ok(SboxPower::default()), SboxPower::try_from)?;

        if rounds_full % 2 != 0 {
            return Err(ConfigError::OddFullRounds(rounds_full));
        }
        let rounds = rounds_full + rounds_partial;

        let round_constants = canonicalize_table(field, &options.round_constants, rounds, t)
            .map_err(ConfigError::InvalidRoundConstants)?;
        let mds =
            canonicalize_table(field, &options.mds, t, t).map_err(ConfigError::InvalidMds)?;

        let partial_sbox_index = match options.reverse_partial_power_index {
            Some(true) => t - 1,
            Some(false) | None => 0,
        };

        Ok(Self {
            field,
            t,
            rounds_full,
            rounds_partial,
            rounds,
            sbox,
            partial_sbox_index,
            mds,
            round_constants,
        })
    }

    pub fn field(&self) -> &'f F {
        self.field
    }

    /// The state width.
    pub fn t(&self) -> usize {
        self.t
    }

    pub fn rounds_full(&self) -> usize {
        self.rounds_full
    }

    pub fn rounds_partial(&self) -> usize {
        self.rounds_partial
    }

    /// The total number of rounds, full and partial.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn sbox(&self) -> SboxPower {
        self.sbox
    }

    /// The state index the S-box is applied to in partial rounds.
    pub fn partial_sbox_index(&self) -> usize {
        self.partial_sbox_index
    }

    pub fn mds(&self) -> &[Vec<F::Element>] {
        &self.mds
    }

    pub fn round_constants(&self) -> &[Vec<F::Element>] {
        &self.round_constants
    }

    /// The kinds of all rounds, in order of execution.
    pub fn schedule(&self) -> impl Iterator<Item = RoundKind> {
        let half_rounds_full = self.rounds_full / 2;

        iter::repeat_n(RoundKind::Full, half_rounds_full)
            .chain(iter::repeat_n(RoundKind::Partial, self.rounds_partial))
            .chain(iter::repeat_n(RoundKind::Full, half_rounds_full))
    }
}

fn non_negative_safe_integer(name: &'static str, value: i64) -> Result<usize, ConfigError> {
    if !(0..=MAX_SAFE_INTEGER).contains(&value) {
        return Err(ConfigError::InvalidParameter { name, value });
    }

    usize::try_from(value).map_err(|_| ConfigError::InvalidParameter { name, value })
}

fn canonicalize_table<F: Field>(
    field: &F,
    table: &[Vec<BigInt>],
    num_rows: usize,
    width: usize,
) -> Result<Vec<Vec<F::Element>>, TableError> {
    if table.len() != num_rows {
        let actual = table.len();
        return Err(TableError::RowCount {
            expected: num_rows,
            actual,
        });
    }

    let canonicalize_row = |(row, entries): (usize, &Vec<BigInt>)| {
        if entries.len() != width {
            let actual = entries.len();
            let expected = width;
            return Err(TableError::RowLength { row, expected, actual });
        }

        entries
            .iter()
            .enumerate()
            .map(|(column, value)| {
                if !field.is_valid(value) {
                    let value = value.clone();
                    return Err(TableError::Element { row, column, value });
                }

                Ok(field.create(value))
            })
            .collect::<Result<Vec<_>, _>>()
    };

    table.iter().enumerate().map(canonicalize_row).collect()
}

/// (De)serialization of tables of scalars as strings.
mod scalar_table {
    use num_bigint::BigInt;
    use num_traits::Num;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serialize;
    use serde::Serializer;
    use serde::de::Error;

    pub fn serialize<S>(table: &[Vec<BigInt>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let table = table
            .iter()
            .map(|row| row.iter().map(BigInt::to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        table.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<BigInt>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let table = Vec::<Vec<String>>::deserialize(deserializer)?;
        table
            .iter()
            .map(|row| row.iter().map(|s| parse_scalar(s)).collect::<Result<Vec<_>, _>>())
            .collect::<Result<_, _>>()
            .map_err(D::Error::custom)
    }

    pub(super) fn parse_scalar(s: &str) -> Result<BigInt, String> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (digits, radix) = match unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (unsigned, 10),
        };

        if digits.starts_with(['+', '-']) {
            return Err(format!("invalid scalar `{s}`"));
        }
        let magnitude = BigInt::from_str_radix(digits, radix)
            .map_err(|_| format!("invalid scalar `{s}`"))?;

        Ok(if negative { -magnitude } else { magnitude })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use std::sync::LazyLock;

    use num_bigint::BigUint;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::*;
    use crate::field::Goldilocks;
    use crate::field::GoldilocksElement;
    use crate::field::PrimeField64;
    use crate::scalars;

    /// A valid instance over ℤ_7 with `t = 2`, `R_F = 2`, and `R_P = 1`.
    pub(crate) fn tiny_options() -> PoseidonOptions {
        PoseidonOptions {
            t: 2,
            rounds_full: 2,
            rounds_partial: 1,
            sbox_power: Some(3),
            reverse_partial_power_index: None,
            mds: vec![scalars![1, 0], scalars![0, 1]],
            round_constants: vec![scalars![0, 0]; 3],
        }
    }

    pub(crate) static TINY_FIELD: LazyLock<PrimeField64> =
        LazyLock::new(|| PrimeField64::new(7).unwrap());

    fn validate(
        options: &PoseidonOptions,
    ) -> Result<PoseidonParams<'static, PrimeField64>, ConfigError> {
        PoseidonParams::new(&*TINY_FIELD, options)
    }

    #[test]
    fn tiny_options_are_valid() {
        let params = validate(&tiny_options()).unwrap();
        assert_eq!(2, params.t());
        assert_eq!(3, params.rounds());
        assert_eq!(SboxPower::Cube, params.sbox());
        assert_eq!(0, params.partial_sbox_index());
    }

    #[test]
    fn sbox_power_defaults_to_five() {
        let options = PoseidonOptions {
            sbox_power: None,
            ..tiny_options()
        };
        let params = validate(&options).unwrap();
        assert_eq!(SboxPower::Quint, params.sbox());
    }

    #[test]
    fn reversal_flag_moves_partial_sbox_to_last_index() {
        let options = PoseidonOptions {
            t: 3,
            reverse_partial_power_index: Some(true),
            mds: vec![scalars![1, 0, 0], scalars![0, 1, 0], scalars![0, 0, 1]],
            round_constants: vec![scalars![0, 0, 0]; 3],
            ..tiny_options()
        };
        let reversed = validate(&options).unwrap();
        assert_eq!(2, reversed.partial_sbox_index());

        let forward_options = PoseidonOptions {
            reverse_partial_power_index: Some(false),
            ..options
        };
        let forward = validate(&forward_options).unwrap();
        assert_eq!(0, forward.partial_sbox_index());
    }

    #[test]
    fn degenerate_field_is_rejected_before_anything_else() {
        #[derive(Debug)]
        struct EmptyField;

        impl Field for EmptyField {
            type Element = ();

            fn modulus(&self) -> BigUint {
                BigUint::ZERO
            }

            fn zero(&self) {}

            fn one(&self) {}

            fn create(&self, _: &BigInt) {}

            fn add(&self, _: &(), _: &()) {}

            fn mul(&self, _: &(), _: &()) {}

            fn to_biguint(&self, _: &()) -> BigUint {
                BigUint::ZERO
            }
        }

        let options = PoseidonOptions {
            rounds_full: 3,
            ..tiny_options()
        };
        let err = PoseidonParams::new(&EmptyField, &options).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField(_)));
    }

    #[proptest]
    fn negative_integer_parameters_are_rejected(#[strategy(i64::MIN..0)] value: i64) {
        let base = tiny_options();
        let cases = [
            ("t", PoseidonOptions { t: value, ..base.clone() }),
            ("rounds_full", PoseidonOptions { rounds_full: value, ..base.clone() }),
            ("rounds_partial", PoseidonOptions { rounds_partial: value, ..base }),
        ];

        for (name, options) in cases {
            let err = validate(&options).unwrap_err();
            prop_assert_eq!(ConfigError::InvalidParameter { name, value }, err);
        }
    }

    #[test]
    fn unsafe_integer_parameters_are_rejected() {
        let value = MAX_SAFE_INTEGER + 1;
        let options = PoseidonOptions {
            rounds_partial: value,
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        let expected = ConfigError::InvalidParameter {
            name: "rounds_partial",
            value,
        };
        assert_eq!(expected, err);
    }

    #[test]
    fn state_width_below_two_is_rejected() {
        for value in [0, 1] {
            let options = PoseidonOptions {
                t: value,
                ..tiny_options()
            };
            let err = validate(&options).unwrap_err();
            assert_eq!(ConfigError::InvalidParameter { name: "t", value }, err);
        }
    }

    #[test]
    fn unsupported_sbox_power_is_rejected_before_odd_full_rounds() {
        let options = PoseidonOptions {
            sbox_power: Some(4),
            rounds_full: 3,
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        assert_eq!(ConfigError::InvalidSboxPower(4), err);
    }

    #[proptest]
    fn odd_number_of_full_rounds_is_rejected(#[strategy(0_i64..1000)] half: i64) {
        let rounds_full = 2 * half + 1;
        let options = PoseidonOptions {
            rounds_full,
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        prop_assert_eq!(ConfigError::OddFullRounds(rounds_full as usize), err);
    }

    #[proptest]
    fn round_constants_of_wrong_length_are_rejected(#[strategy(0_usize..10)] num_rows: usize) {
        prop_assume!(num_rows != 3);
        let options = PoseidonOptions {
            round_constants: vec![scalars![0, 0]; num_rows],
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        let expected = TableError::RowCount {
            expected: 3,
            actual: num_rows,
        };
        prop_assert_eq!(ConfigError::InvalidRoundConstants(expected), err);
    }

    #[test]
    fn round_constant_row_of_wrong_width_is_rejected() {
        let options = PoseidonOptions {
            round_constants: vec![scalars![0, 0], scalars![0, 0, 0], scalars![0, 0]],
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        let expected = TableError::RowLength {
            row: 1,
            expected: 2,
            actual: 3,
        };
        assert_eq!(ConfigError::InvalidRoundConstants(expected), err);
    }

    #[test]
    fn round_constants_outside_the_field_are_rejected() {
        for value in [-1, 7, 8] {
            let options = PoseidonOptions {
                round_constants: vec![scalars![0, 0], scalars![0, 0], scalars![0, value]],
                ..tiny_options()
            };
            let err = validate(&options).unwrap_err();
            let expected = TableError::Element {
                row: 2,
                column: 1,
                value: BigInt::from(value),
            };
            assert_eq!(ConfigError::InvalidRoundConstants(expected), err);
        }
    }

    #[test]
    fn non_square_mds_matrix_is_rejected() {
        let options = PoseidonOptions {
            mds: vec![scalars![1, 0], scalars![0, 1], scalars![1, 1]],
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        let too_many_rows = TableError::RowCount {
            expected: 2,
            actual: 3,
        };
        assert_eq!(ConfigError::InvalidMds(too_many_rows), err);

        let wide_options = PoseidonOptions {
            mds: vec![scalars![1, 0, 0], scalars![0, 1, 0]],
            ..tiny_options()
        };
        let wide_err = validate(&wide_options).unwrap_err();
        let row_too_long = TableError::RowLength {
            row: 0,
            expected: 2,
            actual: 3,
        };
        assert_eq!(ConfigError::InvalidMds(row_too_long), wide_err);
    }

    #[test]
    fn mds_entries_outside_the_field_are_rejected() {
        let options = PoseidonOptions {
            mds: vec![scalars![1, 0], scalars![7, 1]],
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        let expected = TableError::Element {
            row: 1,
            column: 0,
            value: BigInt::from(7),
        };
        assert_eq!(ConfigError::InvalidMds(expected), err);
    }

    #[test]
    fn round_constants_are_checked_before_mds_matrix() {
        let options = PoseidonOptions {
            mds: vec![],
            round_constants: vec![],
            ..tiny_options()
        };
        let err = validate(&options).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoundConstants(_)));
    }

    #[test]
    fn zero_partial_rounds_are_accepted() {
        let options = PoseidonOptions {
            rounds_full: 4,
            rounds_partial: 0,
            round_constants: vec![scalars![0, 0]; 4],
            ..tiny_options()
        };
        let params = validate(&options).unwrap();
        let schedule = params.schedule().collect::<Vec<_>>();
        assert_eq!(vec![RoundKind::Full; 4], schedule);
    }

    #[proptest]
    fn schedule_is_full_partial_full(
        #[strategy(0_usize..10)] half_rounds_full: usize,
        #[strategy(0_usize..30)] rounds_partial: usize,
    ) {
        let rounds = 2 * half_rounds_full + rounds_partial;
        let options = PoseidonOptions {
            rounds_full: 2 * half_rounds_full as i64,
            rounds_partial: rounds_partial as i64,
            round_constants: vec![scalars![0, 0]; rounds],
            ..tiny_options()
        };
        let params = validate(&options)?;
        let schedule = params.schedule().collect::<Vec<_>>();
        prop_assert_eq!(rounds, schedule.len());

        let (head, rest) = schedule.split_at(half_rounds_full);
        let (middle, tail) = rest.split_at(rounds_partial);
        prop_assert!(head.iter().all(|&kind| kind == RoundKind::Full));
        prop_assert!(middle.iter().all(|&kind| kind == RoundKind::Partial));
        prop_assert!(tail.iter().all(|&kind| kind == RoundKind::Full));
    }

    #[test]
    fn constants_are_canonicalized_into_field_representation() {
        let options = PoseidonOptions {
            round_constants: vec![scalars![1, 2], scalars![3, 4], scalars![5, 6]],
            ..tiny_options()
        };
        let params = PoseidonParams::new(&Goldilocks, &options).unwrap();
        let expected = [[1, 2], [3, 4], [5, 6]].map(|row| row.map(GoldilocksElement::new));
        assert_eq!(expected.map(Vec::from).to_vec(), params.round_constants());
    }

    #[test]
    fn parse_decimal_and_hexadecimal_scalars() {
        use scalar_table::parse_scalar;

        assert_eq!(Ok(BigInt::from(42)), parse_scalar("42"));
        assert_eq!(Ok(BigInt::from(42)), parse_scalar(" 0x2a "));
        assert_eq!(Ok(BigInt::from(42)), parse_scalar("0X2A"));
        assert_eq!(Ok(BigInt::from(-42)), parse_scalar("-0x2a"));
        assert_eq!(Ok(BigInt::from(-7)), parse_scalar("-7"));
        assert!(parse_scalar("").is_err());
        assert!(parse_scalar("0x").is_err());
        assert!(parse_scalar("--7").is_err());
        assert!(parse_scalar("0x-7").is_err());
        assert!(parse_scalar("seven").is_err());
    }

    #[test]
    fn options_survive_json_round_trip() {
        let options = PoseidonOptions {
            reverse_partial_power_index: Some(true),
            ..tiny_options()
        };
        let json = options.to_json().unwrap();
        assert_eq!(options, PoseidonOptions::from_json(&json).unwrap());
    }

    #[test]
    fn options_can_be_read_from_published_json() {
        let json = r#"{
            "t": 2,
            "rounds_full": 2,
            "rounds_partial": 1,
            "sbox_power": 3,
            "mds": [["0x1", "0"], ["0", "0x1"]],
            "round_constants": [["0", "0"], ["0", "0"], ["0x0", "0"]]
        }"#;
        let options = PoseidonOptions::from_json(json).unwrap();
        assert_eq!(tiny_options(), options);
    }

    #[test]
    fn json_with_malformed_scalars_or_unknown_fields_is_rejected() {
        let malformed_scalar = r#"{
            "t": 2, "rounds_full": 2, "rounds_partial": 1,
            "mds": [["one", "0"], ["0", "1"]],
            "round_constants": [["0", "0"], ["0", "0"], ["0", "0"]]
        }"#;
        assert!(PoseidonOptions::from_json(malformed_scalar).is_err());

        let unknown_field = r#"{
            "t": 2, "rounds_full": 2, "rounds_partial": 1, "rate": 1,
            "mds": [["1", "0"], ["0", "1"]],
            "round_constants": [["0", "0"], ["0", "0"], ["0", "0"]]
        }"#;
        assert!(PoseidonOptions::from_json(unknown_field).is_err());

        let ill_typed_flag = r#"{
            "t": 2, "rounds_full": 2, "rounds_partial": 1,
            "reverse_partial_power_index": "yes",
            "mds": [["1", "0"], ["0", "1"]],
            "round_constants": [["0", "0"], ["0", "0"], ["0", "0"]]
        }"#;
        assert!(PoseidonOptions::from_json(ill_typed_flag).is_err());
    }
}
