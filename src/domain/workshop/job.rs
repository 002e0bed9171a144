//! Jobs to be done.
//!
//! One job may be flagged as the overarching job; the flag is exclusive.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::JobId;

use super::{Describe, EntrySource, WorkshopError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: EntrySource,
    #[serde(default)]
    pub is_overarching: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Job {
    /// Creates a user-authored job with a fresh id.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_id(JobId::generate(), description, EntrySource::User)
    }

    pub fn with_id(id: JobId, description: impl Into<String>, source: EntrySource) -> Self {
        Self {
            id,
            description: description.into(),
            source,
            is_overarching: false,
            selected: false,
        }
    }
}

impl Describe for Job {
    fn description(&self) -> &str {
        &self.description
    }
}

/// Makes `id` the overarching job and clears the flag everywhere else.
pub fn set_overarching(jobs: &mut [Job], id: &JobId) -> Result<(), WorkshopError> {
    if !jobs.iter().any(|j| &j.id == id) {
        return Err(WorkshopError::unknown("Job", id));
    }
    for job in jobs.iter_mut() {
        job.is_overarching = &job.id == id;
    }
    Ok(())
}

/// Clears the overarching flag on every job.
pub fn clear_overarching(jobs: &mut [Job]) {
    for job in jobs.iter_mut() {
        job.is_overarching = false;
    }
}

/// Keeps the flag on the first overarching job only. Returns how many flags were cleared.
pub(crate) fn normalize_overarching(jobs: &mut [Job]) -> usize {
    let mut seen = false;
    let mut cleared = 0;
    for job in jobs.iter_mut().filter(|j| j.is_overarching) {
        if seen {
            job.is_overarching = false;
            cleared += 1;
        }
        seen = true;
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs() -> Vec<Job> {
        vec![Job::new("Get paid faster"), Job::new("Look professional"), Job::new("Save time")]
    }

    #[test]
    fn set_overarching_is_exclusive() {
        let mut jobs = jobs();
        let first = jobs[0].id.clone();
        let second = jobs[1].id.clone();

        set_overarching(&mut jobs, &first).unwrap();
        set_overarching(&mut jobs, &second).unwrap();

        let flagged: Vec<_> = jobs.iter().filter(|j| j.is_overarching).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, second);
    }

    #[test]
    fn set_overarching_rejects_unknown_id() {
        let mut jobs = jobs();
        let result = set_overarching(&mut jobs, &JobId::new("missing").unwrap());
        assert!(matches!(result, Err(WorkshopError::UnknownEntity { .. })));
        assert!(jobs.iter().all(|j| !j.is_overarching));
    }

    #[test]
    fn normalize_keeps_first_flag_only() {
        let mut jobs = jobs();
        for job in jobs.iter_mut() {
            job.is_overarching = true;
        }
        assert_eq!(normalize_overarching(&mut jobs), 2);
        assert!(jobs[0].is_overarching);
        assert!(!jobs[1].is_overarching);
        assert!(!jobs[2].is_overarching);
    }

    #[test]
    fn clear_overarching_clears_all() {
        let mut jobs = jobs();
        let id = jobs[2].id.clone();
        set_overarching(&mut jobs, &id).unwrap();
        clear_overarching(&mut jobs);
        assert!(jobs.iter().all(|j| !j.is_overarching));
    }

    #[test]
    fn deserializes_with_defaults() {
        let job: Job = serde_json::from_str(r#"{"id":"j1","description":"x"}"#).unwrap();
        assert!(!job.is_overarching);
        assert!(!job.selected);
    }
}
