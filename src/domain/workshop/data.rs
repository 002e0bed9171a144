//! The workshop aggregate.
//!
//! # Invariants
//!
//! - At most one job is overarching
//! - At most [`MAX_TOP_THREE`] buyers are top three
//! - The problem-up selects at most [`MAX_SELECTED_PAINS`] pains
//! - Every pain's derived FIRE fields agree with its ratings
//!
//! [`WorkshopData::merge`] is the only mutation path the session store uses.
//! It replaces whole top-level fields and then normalizes just those fields,
//! capping rather than rejecting, so a merge never fails.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::foundation::{BuyerId, JobId, PainId, TriggerId, WorkshopStep};

use super::buyer::{cap_top_three, MAX_TOP_THREE};
use super::job::normalize_overarching;
use super::problem_up::MAX_SELECTED_PAINS;
use super::{
    Idea, Job, NextSteps, Pain, ProblemUp, Reference, Reflections, TargetBuyer,
    TargetMarketProfile, TriggerEvent, WorkshopField, WorkshopPatch,
};

/// Every answer in one workshop session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkshopData {
    pub big_idea: Idea,
    pub refined_idea: Idea,
    pub trigger_events: Vec<TriggerEvent>,
    pub jobs: Vec<Job>,
    pub target_buyers: Vec<TargetBuyer>,
    pub pains: Vec<Pain>,
    pub problem_up: ProblemUp,
    pub target_market_profile: TargetMarketProfile,
    pub next_steps: NextSteps,
    pub reflections: Reflections,
}

impl Default for WorkshopData {
    /// The empty document every new session starts from.
    fn default() -> Self {
        Self {
            big_idea: Idea::initial(),
            refined_idea: Idea::refined(),
            trigger_events: Vec::new(),
            jobs: Vec::new(),
            target_buyers: Vec::new(),
            pains: Vec::new(),
            problem_up: ProblemUp::default(),
            target_market_profile: TargetMarketProfile::default(),
            next_steps: NextSteps::default(),
            reflections: Reflections::default(),
        }
    }
}

impl WorkshopData {
    /// Creates the empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Replaces every field present in `patch`, then normalizes those fields.
    ///
    /// Returns the fields that were replaced.
    pub fn merge(&mut self, patch: WorkshopPatch) -> Vec<WorkshopField> {
        let fields = patch.fields();
        let WorkshopPatch {
            big_idea,
            refined_idea,
            trigger_events,
            jobs,
            target_buyers,
            pains,
            problem_up,
            target_market_profile,
            next_steps,
            reflections,
        } = patch;

        if let Some(value) = big_idea {
            self.big_idea = value;
        }
        if let Some(value) = refined_idea {
            self.refined_idea = value;
        }
        if let Some(value) = trigger_events {
            self.trigger_events = value;
        }
        if let Some(mut value) = jobs {
            let cleared = normalize_overarching(&mut value);
            if cleared > 0 {
                warn!(cleared, "More than one overarching job; kept the first");
            }
            self.jobs = value;
        }
        if let Some(mut value) = target_buyers {
            let cleared = cap_top_three(&mut value);
            if cleared > 0 {
                warn!(cleared, max = MAX_TOP_THREE, "Top-three buyers over the cap; extra flags cleared");
            }
            self.target_buyers = value;
        }
        if let Some(value) = pains {
            self.pains = value;
        }
        if let Some(mut value) = problem_up {
            let dropped = value.truncate_selected_pains();
            if dropped > 0 {
                warn!(dropped, max = MAX_SELECTED_PAINS, "Problem-up pain selection over the cap; truncated");
            }
            self.problem_up = value;
        }
        if let Some(value) = target_market_profile {
            self.target_market_profile = value;
        }
        if let Some(value) = next_steps {
            self.next_steps = value;
        }
        if let Some(value) = reflections {
            self.reflections = value;
        }

        fields
    }

    /// Copies the current value of each listed field into a patch.
    pub fn project(&self, fields: &[WorkshopField]) -> WorkshopPatch {
        let mut patch = WorkshopPatch::new();
        for field in fields {
            patch = match field {
                WorkshopField::BigIdea => patch.big_idea(self.big_idea.clone()),
                WorkshopField::RefinedIdea => patch.refined_idea(self.refined_idea.clone()),
                WorkshopField::TriggerEvents => patch.trigger_events(self.trigger_events.clone()),
                WorkshopField::Jobs => patch.jobs(self.jobs.clone()),
                WorkshopField::TargetBuyers => patch.target_buyers(self.target_buyers.clone()),
                WorkshopField::Pains => patch.pains(self.pains.clone()),
                WorkshopField::ProblemUp => patch.problem_up(self.problem_up.clone()),
                WorkshopField::TargetMarketProfile => {
                    patch.target_market_profile(self.target_market_profile.clone())
                }
                WorkshopField::NextSteps => patch.next_steps(self.next_steps.clone()),
                WorkshopField::Reflections => patch.reflections(self.reflections.clone()),
            };
        }
        patch
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn find_trigger(&self, id: &TriggerId) -> Option<&TriggerEvent> {
        self.trigger_events.iter().find(|t| &t.id == id)
    }

    pub fn find_job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| &j.id == id)
    }

    pub fn find_buyer(&self, id: &BuyerId) -> Option<&TargetBuyer> {
        self.target_buyers.iter().find(|b| &b.id == id)
    }

    pub fn find_pain(&self, id: &PainId) -> Option<&Pain> {
        self.pains.iter().find(|p| &p.id == id)
    }

    /// The problem-up's selected pains, in selection order.
    pub fn resolve_selected_pains(&self) -> Vec<Reference<'_, PainId, Pain>> {
        self.problem_up
            .selected_pains
            .iter()
            .map(|id| Reference::resolve(id, |id| self.find_pain(id)))
            .collect()
    }

    /// The problem-up's selected buyers, in selection order.
    pub fn resolve_selected_buyers(&self) -> Vec<Reference<'_, BuyerId, TargetBuyer>> {
        self.problem_up
            .selected_buyers
            .iter()
            .map(|id| Reference::resolve(id, |id| self.find_buyer(id)))
            .collect()
    }

    /// The problem-up's relevant triggers, in selection order.
    pub fn resolve_relevant_triggers(&self) -> Vec<Reference<'_, TriggerId, TriggerEvent>> {
        self.problem_up
            .relevant_trigger_ids
            .iter()
            .map(|id| Reference::resolve(id, |id| self.find_trigger(id)))
            .collect()
    }

    /// Number of problem-up ids that do not resolve.
    pub fn dangling_reference_count(&self) -> usize {
        let pains = self.resolve_selected_pains().iter().filter(|r| !r.is_found()).count();
        let buyers = self.resolve_selected_buyers().iter().filter(|r| !r.is_found()).count();
        let triggers = self.resolve_relevant_triggers().iter().filter(|r| !r.is_found()).count();
        pains + buyers + triggers
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived views
    // ─────────────────────────────────────────────────────────────────────────

    pub fn overarching_job(&self) -> Option<&Job> {
        self.jobs.iter().find(|j| j.is_overarching)
    }

    pub fn top_three_buyers(&self) -> Vec<&TargetBuyer> {
        self.target_buyers.iter().filter(|b| b.is_top_three).collect()
    }

    pub fn shortlisted_buyers(&self) -> Vec<&TargetBuyer> {
        self.target_buyers.iter().filter(|b| b.shortlisted).collect()
    }

    /// Buyers by descending total rating; ties keep list order.
    pub fn ranked_buyers(&self) -> Vec<&TargetBuyer> {
        let mut ranked: Vec<&TargetBuyer> = self.target_buyers.iter().collect();
        ranked.sort_by(|a, b| b.total_score().cmp(&a.total_score()));
        ranked
    }

    /// Pains flagged as fires, highest score first.
    pub fn fire_pains(&self) -> Vec<&Pain> {
        let mut fires: Vec<&Pain> = self.pains.iter().filter(|p| p.is_fire()).collect();
        fires.sort_by(|a, b| b.calculated_fire_score().cmp(&a.calculated_fire_score()));
        fires
    }
}

/// Fields each workshop step edits.
pub fn step_fields(step: WorkshopStep) -> &'static [WorkshopField] {
    match step {
        WorkshopStep::BigIdea => &[WorkshopField::BigIdea],
        WorkshopStep::TriggerEvents => &[WorkshopField::TriggerEvents],
        WorkshopStep::Jobs => &[WorkshopField::Jobs],
        WorkshopStep::TargetBuyers => &[WorkshopField::TargetBuyers],
        WorkshopStep::Pains => &[WorkshopField::Pains],
        WorkshopStep::ProblemUp => &[WorkshopField::ProblemUp],
        WorkshopStep::RefinedIdea => &[WorkshopField::RefinedIdea],
        WorkshopStep::TargetMarket => &[WorkshopField::TargetMarketProfile],
        WorkshopStep::NextSteps => &[WorkshopField::NextSteps],
        WorkshopStep::Reflections => &[WorkshopField::Reflections],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BuyerRating, FireLevel};
    use crate::domain::workshop::{EntrySource, FireScores, IdeaVersion, Reflections, NOT_FOUND_LABEL};
    use proptest::collection::vec;
    use proptest::option;
    use proptest::prelude::*;

    fn trigger(id: &str, description: &str) -> TriggerEvent {
        TriggerEvent::with_id(TriggerId::new(id).unwrap(), description, EntrySource::User)
    }

    fn buyer(id: &str) -> TargetBuyer {
        TargetBuyer::with_id(BuyerId::new(id).unwrap(), format!("Buyer {}", id), EntrySource::User)
    }

    fn pain(id: &str, score: [u8; 4]) -> Pain {
        let l = |v| FireLevel::try_from_u8(v).unwrap();
        Pain::with_id(PainId::new(id).unwrap(), format!("Pain {}", id), "Segment", Default::default())
            .rated(FireScores::new(l(score[0]), l(score[1]), l(score[2]), l(score[3])))
    }

    #[test]
    fn empty_document_has_tagged_ideas_and_no_entries() {
        let data = WorkshopData::empty();
        assert_eq!(data.big_idea.version, IdeaVersion::Initial);
        assert_eq!(data.refined_idea.version, IdeaVersion::Refined);
        assert!(data.trigger_events.is_empty());
        assert!(data.pains.is_empty());
        assert!(data.problem_up.selected_pains.is_empty());
    }

    #[test]
    fn merging_trigger_events_leaves_everything_else_empty() {
        let mut data = WorkshopData::empty();
        let patch = WorkshopPatch::new().trigger_events(vec![trigger("t1", "Lost a client")]);

        let fields = data.merge(patch);

        assert_eq!(fields, vec![WorkshopField::TriggerEvents]);
        assert_eq!(data.trigger_events, vec![trigger("t1", "Lost a client")]);
        let mut expected = WorkshopData::empty();
        expected.trigger_events = data.trigger_events.clone();
        assert_eq!(data, expected);
    }

    #[test]
    fn merge_caps_top_three_silently() {
        let mut data = WorkshopData::empty();
        let mut buyers: Vec<_> = ["b1", "b2", "b3", "b4"].iter().map(|id| buyer(id)).collect();
        for b in buyers.iter_mut() {
            b.is_top_three = true;
        }

        data.merge(WorkshopPatch::new().target_buyers(buyers));

        assert_eq!(data.top_three_buyers().len(), 3);
        assert!(!data.target_buyers[3].is_top_three);
    }

    #[test]
    fn merge_keeps_single_overarching_job() {
        let mut data = WorkshopData::empty();
        let mut jobs = vec![Job::new("a"), Job::new("b")];
        jobs[0].is_overarching = true;
        jobs[1].is_overarching = true;

        data.merge(WorkshopPatch::new().jobs(jobs));

        assert_eq!(data.overarching_job().map(|j| j.description.as_str()), Some("a"));
        assert_eq!(data.jobs.iter().filter(|j| j.is_overarching).count(), 1);
    }

    #[test]
    fn merge_truncates_selected_pains() {
        let mut data = WorkshopData::empty();
        let problem = ProblemUp {
            selected_pains: (0..8).map(|i| PainId::new(format!("p{}", i)).unwrap()).collect(),
            ..Default::default()
        };
        data.merge(WorkshopPatch::new().problem_up(problem));
        assert_eq!(data.problem_up.selected_pains.len(), MAX_SELECTED_PAINS);
    }

    #[test]
    fn dangling_pain_resolves_as_not_found() {
        let mut data = WorkshopData::empty();
        data.pains = vec![pain("p1", [1, 1, 1, 1])];
        data.problem_up.selected_pains = vec![
            PainId::new("p1").unwrap(),
            PainId::new("deleted").unwrap(),
        ];

        let resolved = data.resolve_selected_pains();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].label(), "Pain p1");
        assert_eq!(resolved[1].label(), NOT_FOUND_LABEL);
        assert_eq!(data.dangling_reference_count(), 1);
    }

    #[test]
    fn resolves_buyers_and_triggers() {
        let mut data = WorkshopData::empty();
        data.target_buyers = vec![buyer("b1")];
        data.trigger_events = vec![trigger("t1", "Tax deadline")];
        data.problem_up.selected_buyers = vec![BuyerId::new("b1").unwrap()];
        data.problem_up.relevant_trigger_ids =
            vec![TriggerId::new("t1").unwrap(), TriggerId::new("t2").unwrap()];

        assert!(data.resolve_selected_buyers()[0].is_found());
        let triggers = data.resolve_relevant_triggers();
        assert_eq!(triggers[0].label(), "Tax deadline");
        assert!(!triggers[1].is_found());
    }

    #[test]
    fn ranked_buyers_sort_by_total_score() {
        let mut data = WorkshopData::empty();
        let mut low = buyer("low");
        low.urgency = BuyerRating::new(1).unwrap();
        let mut high = buyer("high");
        high.urgency = BuyerRating::new(5).unwrap();
        high.solution_fit = BuyerRating::new(5).unwrap();
        data.target_buyers = vec![low, high];

        let ranked = data.ranked_buyers();
        assert_eq!(ranked[0].id.as_str(), "high");
        assert_eq!(ranked[1].id.as_str(), "low");
    }

    #[test]
    fn fire_pains_are_filtered_and_sorted() {
        let mut data = WorkshopData::empty();
        data.pains = vec![
            pain("cold", [1, 1, 1, 1]),
            pain("warm", [2, 2, 2, 1]),
            pain("hot", [3, 3, 3, 3]),
        ];
        let fires: Vec<_> = data.fire_pains().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(fires, vec!["hot", "warm"]);
    }

    #[test]
    fn project_copies_requested_fields() {
        let mut data = WorkshopData::empty();
        data.reflections = Reflections {
            key_insights: "Start narrow".to_string(),
            ..Default::default()
        };
        let patch = data.project(&[WorkshopField::Reflections]);
        assert_eq!(patch.fields(), vec![WorkshopField::Reflections]);
        assert_eq!(patch.reflections.unwrap().key_insights, "Start narrow");
    }

    #[test]
    fn every_step_edits_at_least_one_field() {
        for step in WorkshopStep::all() {
            assert!(!step_fields(*step).is_empty());
        }
    }

    #[test]
    fn empty_json_object_deserializes_to_empty_document() {
        let data: WorkshopData = serde_json::from_str("{}").unwrap();
        assert_eq!(data, WorkshopData::empty());
    }

    #[test]
    fn partial_document_keeps_defaults_for_missing_fields() {
        let json = r#"{"triggerEvents":[{"id":"t1","description":"Lost a client","source":"user"}]}"#;
        let data: WorkshopData = serde_json::from_str(json).unwrap();
        assert_eq!(data.trigger_events.len(), 1);
        assert_eq!(data.refined_idea.version, IdeaVersion::Refined);
    }

    #[test]
    fn bad_pain_score_does_not_sink_the_document() {
        let yaml = r#"
triggerEvents:
  - id: t1
    description: Lost a client
    source: user
pains:
  - id: p1
    description: Late invoices
    fireScores:
      frequency: 0
      intensity: 9
"#;
        let data: WorkshopData = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(data.trigger_events.len(), 1);
        assert_eq!(data.pains.len(), 1);
        assert_eq!(data.pains[0].calculated_fire_score(), 6);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────────

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-z ]{0,12}"
    }

    fn arb_idea() -> impl Strategy<Value = Idea> {
        (arb_text(), arb_text()).prop_map(|(description, target_customers)| Idea {
            description,
            target_customers,
            ..Idea::initial()
        })
    }

    fn arb_triggers() -> impl Strategy<Value = Vec<TriggerEvent>> {
        vec(("[a-z0-9]{1,6}", arb_text()), 0..4).prop_map(|items| {
            items.into_iter().map(|(id, d)| trigger(&id, &d)).collect()
        })
    }

    fn arb_jobs() -> impl Strategy<Value = Vec<Job>> {
        vec(arb_text(), 0..4).prop_map(|items| items.into_iter().map(Job::new).collect())
    }

    fn arb_buyers() -> impl Strategy<Value = Vec<TargetBuyer>> {
        vec(("[a-z0-9]{1,6}", 0u8..=5), 0..4).prop_map(|items| {
            items
                .into_iter()
                .map(|(id, rating)| {
                    let mut b = buyer(&id);
                    b.urgency = BuyerRating::new(rating).unwrap();
                    b
                })
                .collect()
        })
    }

    fn arb_pains() -> impl Strategy<Value = Vec<Pain>> {
        vec(("[a-z0-9]{1,6}", [1u8..=3, 1u8..=3, 1u8..=3, 1u8..=3]), 0..4)
            .prop_map(|items| items.into_iter().map(|(id, s)| pain(&id, s)).collect())
    }

    fn arb_problem_up() -> impl Strategy<Value = ProblemUp> {
        (vec("[a-z0-9]{1,4}", 0..=5), arb_text()).prop_map(|(ids, notes)| ProblemUp {
            selected_pains: ids.into_iter().map(|id| PainId::new(id).unwrap()).collect(),
            notes,
            ..Default::default()
        })
    }

    fn arb_patch() -> impl Strategy<Value = WorkshopPatch> {
        (
            option::of(arb_idea()),
            option::of(arb_idea().prop_map(|i| i.to_refined())),
            option::of(arb_triggers()),
            option::of(arb_jobs()),
            option::of(arb_buyers()),
            option::of(arb_pains()),
            option::of(arb_problem_up()),
            option::of(arb_text().prop_map(|name| TargetMarketProfile {
                name,
                ..Default::default()
            })),
            option::of(vec(arb_text(), 0..3).prop_map(|items| NextSteps {
                pre_sell_plan_items: items,
                ..Default::default()
            })),
            option::of(arb_text().prop_map(|key_insights| Reflections {
                key_insights,
                ..Default::default()
            })),
        )
            .prop_map(|(bi, ri, te, jo, tb, pa, pu, tm, ns, re)| WorkshopPatch {
                big_idea: bi,
                refined_idea: ri,
                trigger_events: te,
                jobs: jo,
                target_buyers: tb,
                pains: pa,
                problem_up: pu,
                target_market_profile: tm,
                next_steps: ns,
                reflections: re,
            })
    }

    /// The single-field slice of `patch`, through the wire format.
    fn restrict(patch: &WorkshopPatch, field: WorkshopField) -> WorkshopPatch {
        let mut json = serde_json::to_value(patch).unwrap();
        let map = json.as_object_mut().unwrap();
        map.retain(|k, _| k == field.wire_name());
        serde_json::from_value(json).unwrap()
    }

    proptest! {
        #[test]
        fn merge_replaces_exactly_the_patched_fields(patches in vec(arb_patch(), 1..6)) {
            let mut data = WorkshopData::empty();
            for patch in patches {
                let before = data.clone();
                let touched = patch.fields();
                let applied = patch.clone();

                let reported = data.merge(patch);
                prop_assert_eq!(&reported, &touched);

                for field in WorkshopField::all() {
                    let now = data.project(&[*field]);
                    if touched.contains(field) {
                        prop_assert_eq!(now, restrict(&applied, *field));
                    } else {
                        prop_assert_eq!(now, before.project(&[*field]));
                    }
                }
            }
        }

        #[test]
        fn top_three_never_exceeds_cap(flags in vec(any::<bool>(), 0..10)) {
            let mut data = WorkshopData::empty();
            let buyers = flags
                .iter()
                .enumerate()
                .map(|(i, flag)| {
                    let mut b = buyer(&format!("b{}", i));
                    b.is_top_three = *flag;
                    b
                })
                .collect();
            data.merge(WorkshopPatch::new().target_buyers(buyers));
            prop_assert!(data.top_three_buyers().len() <= MAX_TOP_THREE);
        }
    }
}
