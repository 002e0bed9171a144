//! Pains and the FIRE score.
//!
//! FIRE = Frequency, Intensity, Recurring, Expensive. Each component is rated
//! 1-3, so the composite ranges 4-12. A pain is a "fire" once the composite
//! reaches [`FIRE_THRESHOLD`].
//!
//! `calculated_fire_score` and `is_fire` are derived state. They are private,
//! recomputed by [`Pain::rate`], and recomputed again whenever a pain is
//! deserialized, so a stored document can never carry a contradicting flag.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FireLevel, PainId};

use super::Describe;

/// Composite score at or above which a pain is flagged as a fire.
pub const FIRE_THRESHOLD: u8 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PainType {
    #[default]
    Functional,
    Emotional,
    Social,
    Anticipated,
}

/// The four FIRE component ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FireScores {
    pub frequency: FireLevel,
    pub intensity: FireLevel,
    pub recurring: FireLevel,
    pub expensive: FireLevel,
}

impl FireScores {
    pub fn new(
        frequency: FireLevel,
        intensity: FireLevel,
        recurring: FireLevel,
        expensive: FireLevel,
    ) -> Self {
        Self {
            frequency,
            intensity,
            recurring,
            expensive,
        }
    }

    /// Composite FIRE score, 4-12.
    pub fn total(&self) -> u8 {
        self.frequency.value() + self.intensity.value() + self.recurring.value() + self.expensive.value()
    }

    pub fn is_fire(&self) -> bool {
        self.total() >= FIRE_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PainRecord", rename_all = "camelCase")]
pub struct Pain {
    pub id: PainId,
    pub description: String,
    pub buyer_segment: String,
    #[serde(rename = "type")]
    pub pain_type: PainType,
    is_fire: bool,
    fire_scores: FireScores,
    calculated_fire_score: u8,
}

impl Pain {
    /// Creates a functional pain with a fresh id and the lowest FIRE rating.
    pub fn new(description: impl Into<String>, buyer_segment: impl Into<String>) -> Self {
        Self::with_id(PainId::generate(), description, buyer_segment, PainType::Functional)
    }

    pub fn with_id(
        id: PainId,
        description: impl Into<String>,
        buyer_segment: impl Into<String>,
        pain_type: PainType,
    ) -> Self {
        let fire_scores = FireScores::default();
        Self {
            id,
            description: description.into(),
            buyer_segment: buyer_segment.into(),
            pain_type,
            is_fire: fire_scores.is_fire(),
            fire_scores,
            calculated_fire_score: fire_scores.total(),
        }
    }

    /// Replaces the FIRE ratings and recomputes the derived fields.
    pub fn rate(&mut self, scores: FireScores) {
        self.fire_scores = scores;
        self.calculated_fire_score = scores.total();
        self.is_fire = scores.is_fire();
    }

    /// Builder form of [`Pain::rate`].
    pub fn rated(mut self, scores: FireScores) -> Self {
        self.rate(scores);
        self
    }

    pub fn fire_scores(&self) -> &FireScores {
        &self.fire_scores
    }

    pub fn calculated_fire_score(&self) -> u8 {
        self.calculated_fire_score
    }

    pub fn is_fire(&self) -> bool {
        self.is_fire
    }
}

impl Describe for Pain {
    fn description(&self) -> &str {
        &self.description
    }
}

/// Wire shape of a pain; derived fields in the input are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PainRecord {
    id: PainId,
    #[serde(default)]
    description: String,
    #[serde(default)]
    buyer_segment: String,
    #[serde(default, rename = "type")]
    pain_type: PainType,
    #[serde(default)]
    fire_scores: FireScores,
}

impl From<PainRecord> for Pain {
    fn from(record: PainRecord) -> Self {
        Pain::with_id(
            record.id,
            record.description,
            record.buyer_segment,
            record.pain_type,
        )
        .rated(record.fire_scores)
    }
}
