//! Rating value objects used by the pain and buyer steps.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::ValidationError;

/// One FIRE component rating: 1 (low) to 3 (high).
///
/// Stored scores are read leniently: values outside 1-3 are clamped and
/// anything that is not a number reads as [`FireLevel::Low`], so one bad
/// score never makes a whole workshop document unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum FireLevel {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl FireLevel {
    /// Creates a FireLevel from an integer, returning error if out of range.
    pub fn try_from_u8(value: u8) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(FireLevel::Low),
            2 => Ok(FireLevel::Medium),
            3 => Ok(FireLevel::High),
            _ => Err(ValidationError::out_of_range("fire_score", 1, 3, value as i32)),
        }
    }

    /// Clamps any integer into range; 0 and below read as `Low`.
    pub fn clamped(value: i64) -> Self {
        match value {
            i64::MIN..=1 => FireLevel::Low,
            2 => FireLevel::Medium,
            _ => FireLevel::High,
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            FireLevel::Low => "Low",
            FireLevel::Medium => "Medium",
            FireLevel::High => "High",
        }
    }
}

impl TryFrom<u8> for FireLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from_u8(value)
    }
}

impl From<FireLevel> for u8 {
    fn from(level: FireLevel) -> Self {
        level.value()
    }
}

impl<'de> Deserialize<'de> for FireLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(StoredScore::deserialize(deserializer)?
            .as_int()
            .map_or(FireLevel::default(), FireLevel::clamped))
    }
}

impl fmt::Display for FireLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A 1-5 buyer-segment rating, where 0 means "not rated yet".
///
/// Read leniently like [`FireLevel`]: stored values are clamped to 0-5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct BuyerRating(u8);

impl BuyerRating {
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// The unrated value.
    pub const UNRATED: BuyerRating = BuyerRating(0);

    /// Creates a rating, returning error if above 5.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::out_of_range(
                "buyer_rating",
                0,
                Self::MAX as i32,
                value as i32,
            ));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns true if the buyer has been rated on this dimension.
    pub fn is_rated(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<u8> for BuyerRating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BuyerRating> for u8 {
    fn from(rating: BuyerRating) -> Self {
        rating.0
    }
}

impl<'de> Deserialize<'de> for BuyerRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = StoredScore::deserialize(deserializer)?.as_int().unwrap_or(0);
        Ok(BuyerRating(value.clamp(0, Self::MAX as i64) as u8))
    }
}

/// Whatever a stored score field holds.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScore {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl StoredScore {
    fn as_int(&self) -> Option<i64> {
        match self {
            StoredScore::Int(v) => Some(*v),
            StoredScore::Float(v) if v.is_finite() => Some(v.round() as i64),
            StoredScore::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_level_accepts_one_to_three() {
        assert_eq!(FireLevel::try_from_u8(1).unwrap(), FireLevel::Low);
        assert_eq!(FireLevel::try_from_u8(2).unwrap(), FireLevel::Medium);
        assert_eq!(FireLevel::try_from_u8(3).unwrap(), FireLevel::High);
    }

    #[test]
    fn fire_level_rejects_out_of_range() {
        assert!(FireLevel::try_from_u8(0).is_err());
        assert!(FireLevel::try_from_u8(4).is_err());
    }

    #[test]
    fn fire_level_default_is_low() {
        assert_eq!(FireLevel::default().value(), 1);
    }

    #[test]
    fn fire_level_serializes_as_number() {
        assert_eq!(serde_json::to_string(&FireLevel::High).unwrap(), "3");
        let level: FireLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level, FireLevel::Medium);
    }

    #[test]
    fn stored_fire_level_out_of_range_is_clamped() {
        let read = |json: &str| serde_json::from_str::<FireLevel>(json).unwrap();
        assert_eq!(read("0"), FireLevel::Low);
        assert_eq!(read("-4"), FireLevel::Low);
        assert_eq!(read("7"), FireLevel::High);
        assert_eq!(read("2.0"), FireLevel::Medium);
        assert_eq!(read(r#""3""#), FireLevel::High);
        assert_eq!(read("null"), FireLevel::Low);
        assert_eq!(read(r#""high""#), FireLevel::Low);
    }

    #[test]
    fn buyer_rating_defaults_to_unrated() {
        assert_eq!(BuyerRating::default(), BuyerRating::UNRATED);
        assert!(!BuyerRating::default().is_rated());
    }

    #[test]
    fn buyer_rating_accepts_zero_to_five() {
        for v in 0..=5 {
            assert_eq!(BuyerRating::new(v).unwrap().value(), v);
        }
        assert!(BuyerRating::new(6).is_err());
    }

    #[test]
    fn buyer_rating_deserializes_from_number() {
        let rating: BuyerRating = serde_json::from_str("4").unwrap();
        assert!(rating.is_rated());
    }

    #[test]
    fn stored_buyer_rating_out_of_range_is_clamped() {
        let read = |json: &str| serde_json::from_str::<BuyerRating>(json).unwrap().value();
        assert_eq!(read("9"), 5);
        assert_eq!(read("-1"), 0);
        assert_eq!(read(r#""""#), 0);
    }
}
