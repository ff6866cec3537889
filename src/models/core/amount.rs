//! Balance amounts and the arithmetic used for movement evaluation.
//!
//! Balances are unsigned 256-bit integers in the chain's smallest unit and travel
//! through JSON as decimal strings. Differences between two balances are kept as
//! sign plus magnitude so `current - previous` is exact for every pair of inputs.

use alloy::primitives::{aliases::U512, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{cmp::Ordering, fmt};

/// Parses a non-negative decimal integer into a balance.
///
/// Only ASCII digits are accepted: no sign, no hex prefix, no separators.
pub fn parse_amount(input: &str) -> Result<U256, String> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err("amount must not be empty".to_string());
	}
	if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
		return Err(format!("amount '{}' is not a decimal integer", trimmed));
	}
	U256::from_str_radix(trimmed, 10)
		.map_err(|e| format!("amount '{}' is out of range: {}", trimmed, e))
}

/// Serde adapter for `U256` fields stored as decimal strings.
///
/// Deserialization also accepts non-negative JSON integers, which keeps hand
/// written configuration files readable for small thresholds.
pub mod decimal_amount {
	use super::*;

	pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
		deserializer.deserialize_any(AmountVisitor)
	}

	struct AmountVisitor;

	impl de::Visitor<'_> for AmountVisitor {
		type Value = U256;

		fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
			f.write_str("a non-negative integer or a decimal string")
		}

		fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
			Ok(U256::from(v))
		}

		fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
			u64::try_from(v)
				.map(U256::from)
				.map_err(|_| E::custom(format!("amount must not be negative, got {}", v)))
		}

		fn visit_f64<E: de::Error>(self, v: f64) -> Result<U256, E> {
			Err(E::custom(format!(
				"amount must be an integer in the smallest unit, got {}",
				v
			)))
		}

		fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
			parse_amount(v).map_err(E::custom)
		}
	}
}

/// Signed difference between two balances.
///
/// Zero is always represented with `negative == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedAmount {
	negative: bool,
	magnitude: U256,
}

impl SignedAmount {
	pub const ZERO: Self = Self {
		negative: false,
		magnitude: U256::ZERO,
	};

	/// Exact `current - previous`.
	pub fn difference(current: U256, previous: U256) -> Self {
		match current.cmp(&previous) {
			Ordering::Less => Self {
				negative: true,
				magnitude: previous - current,
			},
			_ => Self {
				negative: false,
				magnitude: current - previous,
			},
		}
	}

	pub fn is_zero(&self) -> bool {
		self.magnitude.is_zero()
	}

	pub fn is_negative(&self) -> bool {
		self.negative
	}

	pub fn is_positive(&self) -> bool {
		!self.negative && !self.magnitude.is_zero()
	}

	/// Absolute value of the difference.
	pub fn magnitude(&self) -> U256 {
		self.magnitude
	}
}

impl fmt::Display for SignedAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.negative {
			write!(f, "-{}", self.magnitude)
		} else {
			write!(f, "{}", self.magnitude)
		}
	}
}

impl Serialize for SignedAmount {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for SignedAmount {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		let (negative, digits) = match raw.strip_prefix('-') {
			Some(rest) => (true, rest),
			None => (false, raw.as_str()),
		};
		let magnitude = parse_amount(digits).map_err(de::Error::custom)?;
		Ok(Self {
			negative: negative && !magnitude.is_zero(),
			magnitude,
		})
	}
}

/// Relative change between two balances, held in basis points.
///
/// Computed as `delta * 10000 / previous` with integer division, which truncates
/// toward zero. The result reads as a percentage with two decimal places, so a
/// move from 3 to 4 is 33.33 and a move from 4 to 3 is -25.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PercentageChange(i128);

impl PercentageChange {
	const BASIS_POINTS: u64 = 10_000;

	/// Builds the change from `previous` to `current`.
	///
	/// A zero `previous` reads as 100 when the balance appeared and 0 when it
	/// stayed empty. Values beyond the `i128` basis point range saturate.
	pub fn between(previous: U256, current: U256) -> Self {
		if previous.is_zero() {
			return if current.is_zero() {
				Self(0)
			} else {
				Self::from_percent(100)
			};
		}

		let delta = SignedAmount::difference(current, previous);
		let scaled =
			U512::from(delta.magnitude()) * U512::from(Self::BASIS_POINTS) / U512::from(previous);
		let magnitude = saturating_i128(scaled);

		if delta.is_negative() {
			Self(-magnitude)
		} else {
			Self(magnitude)
		}
	}

	pub fn from_basis_points(basis_points: i128) -> Self {
		Self(basis_points)
	}

	pub fn from_percent(percent: i64) -> Self {
		Self(i128::from(percent) * i128::from(Self::BASIS_POINTS) / 100)
	}

	pub fn basis_points(&self) -> i128 {
		self.0
	}

	/// Value as a percentage, e.g. `10.0` for ten percent.
	pub fn as_f64(&self) -> f64 {
		self.0 as f64 / 100.0
	}

	/// Whether `|self| >= threshold_percent`.
	///
	/// The threshold is converted to basis points first so the comparison stays in
	/// integers; an exact match counts as reaching the threshold.
	pub fn reaches(&self, threshold_percent: f64) -> bool {
		let threshold_bps = (threshold_percent.abs() * 100.0).round();
		if threshold_bps >= i128::MAX as f64 {
			return false;
		}
		self.0.unsigned_abs() >= threshold_bps as u128
	}
}

fn saturating_i128(value: U512) -> i128 {
	if value > U512::from(i128::MAX as u128) {
		return i128::MAX;
	}
	let limbs = value.as_limbs();
	(u128::from(limbs[0]) | (u128::from(limbs[1]) << 64)) as i128
}

impl fmt::Display for PercentageChange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sign = if self.0 < 0 { "-" } else { "" };
		let abs = self.0.unsigned_abs();
		write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
	}
}

impl Serialize for PercentageChange {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_f64(self.as_f64())
	}
}
