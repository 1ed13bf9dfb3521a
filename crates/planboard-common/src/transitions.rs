//! Board transition rules.
//!
//! A board restricts which status changes an issue may go through. The
//! rules are an adjacency set `from -> {to}` edited client-side and then
//! saved back to the board as a flat, sorted list of `{from, to}` pairs.
//!
//! Membership is strict: a transition is allowed only if it was added.
//! An empty rule set allows nothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A status cannot transition to itself ('{0}')")]
    SelfTransition(String),

    #[error("Status names must not be empty")]
    EmptyStatus,

    #[error("Status '{0}' already exists")]
    StatusExists(String),
}

/// One allowed status change.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Transition>", into = "Vec<Transition>")]
pub struct TransitionRules {
    edges: BTreeMap<String, BTreeSet<String>>,
}

fn check_pair(from: &str, to: &str) -> Result<(), TransitionError> {
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(TransitionError::EmptyStatus);
    }
    if from == to {
        return Err(TransitionError::SelfTransition(from.to_string()));
    }
    Ok(())
}

impl TransitionRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow every transition between distinct statuses in `statuses`.
    pub fn allow_all<S: AsRef<str>>(statuses: &[S]) -> Result<Self, TransitionError> {
        let mut rules = Self::new();
        for from in statuses {
            for to in statuses {
                if from.as_ref() != to.as_ref() {
                    rules.allow(from.as_ref(), to.as_ref())?;
                }
            }
        }
        Ok(rules)
    }

    /// Add `from -> to`. Returns `true` if the rule was new.
    pub fn allow(&mut self, from: &str, to: &str) -> Result<bool, TransitionError> {
        check_pair(from, to)?;
        Ok(self
            .edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string()))
    }

    /// Remove `from -> to`. Returns `true` if the rule existed.
    pub fn disallow(&mut self, from: &str, to: &str) -> bool {
        let Some(targets) = self.edges.get_mut(from) else {
            return false;
        };
        let removed = targets.remove(to);
        if targets.is_empty() {
            self.edges.remove(from);
        }
        removed
    }

    /// Flip `from -> to`, as a checkbox in the rules matrix does.
    /// Returns whether the transition is allowed afterwards.
    pub fn toggle(&mut self, from: &str, to: &str) -> Result<bool, TransitionError> {
        if self.disallow(from, to) {
            Ok(false)
        } else {
            self.allow(from, to)?;
            Ok(true)
        }
    }

    pub fn is_allowed(&self, from: &str, to: &str) -> bool {
        self.edges
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// Statuses reachable from `from` in one step, sorted.
    pub fn targets(&self, from: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(from)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Drop every rule that mentions `status`, e.g. when a column is deleted.
    pub fn remove_status(&mut self, status: &str) {
        self.edges.remove(status);
        self.edges.retain(|_, targets| {
            targets.remove(status);
            !targets.is_empty()
        });
    }

    /// Rewrite every rule that mentions `old` to use `new` instead.
    pub fn rename_status(&mut self, old: &str, new: &str) -> Result<(), TransitionError> {
        if new.trim().is_empty() {
            return Err(TransitionError::EmptyStatus);
        }
        if old == new {
            return Ok(());
        }
        if self.mentions(new) {
            return Err(TransitionError::StatusExists(new.to_string()));
        }
        if let Some(targets) = self.edges.remove(old) {
            self.edges.insert(new.to_string(), targets);
        }
        for targets in self.edges.values_mut() {
            if targets.remove(old) {
                targets.insert(new.to_string());
            }
        }
        Ok(())
    }

    /// Number of allowed transitions.
    pub fn len(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().flat_map(|(from, targets)| {
            targets.iter().map(move |to| (from.as_str(), to.as_str()))
        })
    }

    /// Check the rules against the board's statuses and return any warnings.
    pub fn validate<S: AsRef<str>>(&self, statuses: &[S]) -> Vec<String> {
        let known: BTreeSet<&str> = statuses.iter().map(|s| s.as_ref()).collect();
        let mut warnings = Vec::new();
        for (from, to) in self.iter() {
            for status in [from, to] {
                if !known.contains(status) {
                    warnings.push(format!(
                        "Rule '{} -> {}' references unknown status '{}'",
                        from, to, status
                    ));
                }
            }
        }
        warnings
    }

    fn mentions(&self, status: &str) -> bool {
        self.edges.contains_key(status) || self.edges.values().any(|t| t.contains(status))
    }
}

impl TryFrom<Vec<Transition>> for TransitionRules {
    type Error = TransitionError;

    fn try_from(pairs: Vec<Transition>) -> Result<Self, Self::Error> {
        let mut rules = Self::new();
        for Transition { from, to } in pairs {
            rules.allow(&from, &to)?;
        }
        Ok(rules)
    }
}

impl From<TransitionRules> for Vec<Transition> {
    fn from(rules: TransitionRules) -> Self {
        rules
            .iter()
            .map(|(from, to)| Transition {
                from: from.to_string(),
                to: to.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransitionRules {
        let mut rules = TransitionRules::new();
        rules.allow("todo", "in_progress").unwrap();
        rules.allow("in_progress", "review").unwrap();
        rules.allow("review", "done").unwrap();
        rules.allow("review", "in_progress").unwrap();
        rules
    }

    #[test]
    fn test_empty_rules_allow_nothing() {
        let rules = TransitionRules::new();
        assert!(rules.is_empty());
        assert!(!rules.is_allowed("todo", "done"));
    }

    #[test]
    fn test_allow_is_directional() {
        let rules = sample();
        assert!(rules.is_allowed("todo", "in_progress"));
        assert!(!rules.is_allowed("in_progress", "todo"));
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_allow_reports_duplicates() {
        let mut rules = sample();
        assert!(!rules.allow("todo", "in_progress").unwrap());
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_self_transition_rejected() {
        let mut rules = TransitionRules::new();
        assert_eq!(
            rules.allow("done", "done"),
            Err(TransitionError::SelfTransition("done".into()))
        );
        assert_eq!(rules.allow("", "done"), Err(TransitionError::EmptyStatus));
    }

    #[test]
    fn test_toggle_flips_state() {
        let mut rules = sample();
        assert!(!rules.toggle("todo", "in_progress").unwrap());
        assert!(!rules.is_allowed("todo", "in_progress"));
        assert!(rules.toggle("todo", "in_progress").unwrap());
        assert!(rules.is_allowed("todo", "in_progress"));
    }

    #[test]
    fn test_disallow_last_target_drops_source() {
        let mut rules = TransitionRules::new();
        rules.allow("a", "b").unwrap();
        assert!(rules.disallow("a", "b"));
        assert!(rules.is_empty());
        assert!(!rules.disallow("a", "b"));
    }

    #[test]
    fn test_targets_sorted() {
        let rules = sample();
        let targets: Vec<&str> = rules.targets("review").collect();
        assert_eq!(targets, vec!["done", "in_progress"]);
        assert_eq!(rules.targets("unknown").count(), 0);
    }

    #[test]
    fn test_remove_status_drops_incoming_and_outgoing() {
        let mut rules = sample();
        rules.remove_status("in_progress");
        assert!(!rules.is_allowed("todo", "in_progress"));
        assert!(!rules.is_allowed("in_progress", "review"));
        assert!(rules.is_allowed("review", "done"));
        assert_eq!(rules.len(), 1);
        // "todo" had only one target and must disappear entirely
        assert_eq!(rules.targets("todo").count(), 0);
    }

    #[test]
    fn test_rename_status_rewrites_both_directions() {
        let mut rules = sample();
        rules.rename_status("review", "qa").unwrap();
        assert!(rules.is_allowed("in_progress", "qa"));
        assert!(rules.is_allowed("qa", "done"));
        assert!(!rules.is_allowed("in_progress", "review"));
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_rename_to_existing_status_fails() {
        let mut rules = sample();
        assert_eq!(
            rules.rename_status("review", "done"),
            Err(TransitionError::StatusExists("done".into()))
        );
    }

    #[test]
    fn test_allow_all_builds_complete_graph() {
        let rules = TransitionRules::allow_all(&["a", "b", "c"]).unwrap();
        assert_eq!(rules.len(), 6);
        assert!(rules.is_allowed("c", "a"));
        assert!(!rules.is_allowed("a", "a"));
    }

    #[test]
    fn test_validate_flags_unknown_statuses() {
        let rules = sample();
        let warnings = rules.validate(&["todo", "in_progress", "done"]);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.contains("'review'")));
        assert!(sample().validate(&["todo", "in_progress", "review", "done"]).is_empty());
    }

    #[test]
    fn test_serializes_as_sorted_pairs() {
        let mut rules = TransitionRules::new();
        rules.allow("b", "a").unwrap();
        rules.allow("a", "b").unwrap();
        let json = serde_json::to_value(&rules).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"from": "a", "to": "b"},
                {"from": "b", "to": "a"}
            ])
        );
    }

    #[test]
    fn test_deserialize_rejects_self_transition() {
        let json = serde_json::json!([{"from": "a", "to": "a"}]);
        assert!(serde_json::from_value::<TransitionRules>(json).is_err());
    }
}
