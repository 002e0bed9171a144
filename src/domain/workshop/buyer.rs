//! Target buyer segments and their five 1-5 ratings.
//!
//! At most [`MAX_TOP_THREE`] buyers can carry the top-three flag at any time.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BuyerId, BuyerRating};

use super::{Describe, EntrySource, WorkshopError};

/// Maximum number of buyers that can be marked top three.
pub const MAX_TOP_THREE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetBuyer {
    pub id: BuyerId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: EntrySource,
    #[serde(default)]
    pub urgency: BuyerRating,
    #[serde(default)]
    pub willingness: BuyerRating,
    #[serde(default)]
    pub long_term_value: BuyerRating,
    #[serde(default)]
    pub solution_fit: BuyerRating,
    #[serde(default)]
    pub accessibility: BuyerRating,
    #[serde(default)]
    pub shortlisted: bool,
    #[serde(default)]
    pub is_top_three: bool,
}

impl TargetBuyer {
    /// Creates an unrated, user-authored buyer with a fresh id.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_id(BuyerId::generate(), description, EntrySource::User)
    }

    pub fn with_id(id: BuyerId, description: impl Into<String>, source: EntrySource) -> Self {
        Self {
            id,
            description: description.into(),
            source,
            urgency: BuyerRating::UNRATED,
            willingness: BuyerRating::UNRATED,
            long_term_value: BuyerRating::UNRATED,
            solution_fit: BuyerRating::UNRATED,
            accessibility: BuyerRating::UNRATED,
            shortlisted: false,
            is_top_three: false,
        }
    }

    fn ratings(&self) -> [BuyerRating; 5] {
        [
            self.urgency,
            self.willingness,
            self.long_term_value,
            self.solution_fit,
            self.accessibility,
        ]
    }

    /// Sum of the five ratings (0-25). Unrated dimensions count as zero.
    pub fn total_score(&self) -> u8 {
        self.ratings().iter().map(BuyerRating::value).sum()
    }

    /// True once every dimension has a rating.
    pub fn is_fully_rated(&self) -> bool {
        self.ratings().iter().all(BuyerRating::is_rated)
    }
}

impl Describe for TargetBuyer {
    fn description(&self) -> &str {
        &self.description
    }
}

/// Number of buyers currently flagged top three.
pub fn top_three_count(buyers: &[TargetBuyer]) -> usize {
    buyers.iter().filter(|b| b.is_top_three).count()
}

/// Flags `id` as top three, rejecting a fourth selection.
///
/// Re-marking a buyer that is already flagged is a no-op.
pub fn mark_top_three(buyers: &mut [TargetBuyer], id: &BuyerId) -> Result<(), WorkshopError> {
    let count = top_three_count(buyers);
    let buyer = buyers
        .iter_mut()
        .find(|b| &b.id == id)
        .ok_or_else(|| WorkshopError::unknown("Target buyer", id))?;

    if buyer.is_top_three {
        return Ok(());
    }
    if count >= MAX_TOP_THREE {
        return Err(WorkshopError::TopThreeFull { max: MAX_TOP_THREE });
    }
    buyer.is_top_three = true;
    Ok(())
}

/// Removes the top-three flag from `id`.
pub fn unmark_top_three(buyers: &mut [TargetBuyer], id: &BuyerId) -> Result<(), WorkshopError> {
    let buyer = buyers
        .iter_mut()
        .find(|b| &b.id == id)
        .ok_or_else(|| WorkshopError::unknown("Target buyer", id))?;
    buyer.is_top_three = false;
    Ok(())
}

/// Clears top-three flags beyond the first three, in list order.
/// Returns how many flags were cleared.
pub(crate) fn cap_top_three(buyers: &mut [TargetBuyer]) -> usize {
    let mut kept = 0;
    let mut cleared = 0;
    for buyer in buyers.iter_mut().filter(|b| b.is_top_three) {
        if kept < MAX_TOP_THREE {
            kept += 1;
        } else {
            buyer.is_top_three = false;
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyers(n: usize) -> Vec<TargetBuyer> {
        (0..n)
            .map(|i| {
                TargetBuyer::with_id(
                    BuyerId::new(format!("b{}", i)).unwrap(),
                    format!("Segment {}", i),
                    EntrySource::User,
                )
            })
            .collect()
    }

    fn id(s: &str) -> BuyerId {
        BuyerId::new(s).unwrap()
    }

    #[test]
    fn new_buyer_is_unrated() {
        let buyer = TargetBuyer::new("Freelance designers");
        assert_eq!(buyer.total_score(), 0);
        assert!(!buyer.is_fully_rated());
        assert!(!buyer.is_top_three);
    }

    #[test]
    fn total_score_sums_ratings() {
        let mut buyer = TargetBuyer::new("Agencies");
        buyer.urgency = BuyerRating::new(5).unwrap();
        buyer.willingness = BuyerRating::new(4).unwrap();
        buyer.long_term_value = BuyerRating::new(3).unwrap();
        buyer.solution_fit = BuyerRating::new(2).unwrap();
        buyer.accessibility = BuyerRating::new(1).unwrap();
        assert_eq!(buyer.total_score(), 15);
        assert!(buyer.is_fully_rated());
    }

    #[test]
    fn fourth_top_three_is_rejected() {
        let mut list = buyers(4);
        mark_top_three(&mut list, &id("b0")).unwrap();
        mark_top_three(&mut list, &id("b1")).unwrap();
        mark_top_three(&mut list, &id("b2")).unwrap();

        let result = mark_top_three(&mut list, &id("b3"));

        assert_eq!(result, Err(WorkshopError::TopThreeFull { max: 3 }));
        assert_eq!(top_three_count(&list), 3);
        assert!(!list[3].is_top_three);
    }

    #[test]
    fn remarking_a_flagged_buyer_is_noop_even_when_full() {
        let mut list = buyers(3);
        for i in 0..3 {
            mark_top_three(&mut list, &id(&format!("b{}", i))).unwrap();
        }
        assert!(mark_top_three(&mut list, &id("b1")).is_ok());
        assert_eq!(top_three_count(&list), 3);
    }

    #[test]
    fn unmark_frees_a_slot() {
        let mut list = buyers(4);
        for i in 0..3 {
            mark_top_three(&mut list, &id(&format!("b{}", i))).unwrap();
        }
        unmark_top_three(&mut list, &id("b0")).unwrap();
        mark_top_three(&mut list, &id("b3")).unwrap();
        assert_eq!(top_three_count(&list), 3);
        assert!(list[3].is_top_three);
    }

    #[test]
    fn mark_unknown_buyer_fails() {
        let mut list = buyers(1);
        assert!(matches!(
            mark_top_three(&mut list, &id("nope")),
            Err(WorkshopError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn cap_clears_flags_past_the_third() {
        let mut list = buyers(5);
        for buyer in list.iter_mut() {
            buyer.is_top_three = true;
        }
        assert_eq!(cap_top_three(&mut list), 2);
        assert_eq!(top_three_count(&list), 3);
        assert!(list[0].is_top_three && list[1].is_top_three && list[2].is_top_three);
    }

    #[test]
    fn ratings_default_to_zero_when_absent() {
        let buyer: TargetBuyer =
            serde_json::from_str(r#"{"id":"b1","description":"x","urgency":4}"#).unwrap();
        assert_eq!(buyer.urgency.value(), 4);
        assert_eq!(buyer.willingness, BuyerRating::UNRATED);
    }

    #[test]
    fn out_of_range_rating_fails_to_deserialize() {
        let result: Result<TargetBuyer, _> =
            serde_json::from_str(r#"{"id":"b1","solutionFit":6}"#);
        assert!(result.is_err());
    }
}
