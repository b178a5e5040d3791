use serde::{Deserialize, Serialize};

use crate::error::ForestError;
use crate::models::Stand;

/// Identifies a tree across every snapshot of a trajectory: its cohort
/// position and the capacity index it was assigned at period 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeKey {
    pub cohort: usize,
    pub tree: usize,
}

impl TreeKey {
    pub fn new(cohort: usize, tree: usize) -> Self {
        Self { cohort, tree }
    }
}

/// Period at which each tree is harvested, if any.
///
/// Sized once from the period-0 cohort capacities. Caller edits are tracked
/// so the owning trajectory knows the earliest period they can affect.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalSelection {
    periods: Vec<Vec<Option<usize>>>,
    earliest_change: Option<usize>,
}

impl RemovalSelection {
    pub fn for_stand(stand: &Stand) -> Self {
        Self {
            periods: stand
                .cohorts()
                .iter()
                .map(|c| vec![None; c.capacity()])
                .collect(),
            earliest_change: None,
        }
    }

    pub fn num_cohorts(&self) -> usize {
        self.periods.len()
    }

    pub fn cohort_capacity(&self, cohort: usize) -> usize {
        self.periods.get(cohort).map_or(0, Vec::len)
    }

    fn slot(&self, key: TreeKey) -> Result<&Option<usize>, ForestError> {
        self.periods
            .get(key.cohort)
            .and_then(|c| c.get(key.tree))
            .ok_or_else(|| out_of_range(key))
    }

    fn slot_mut(&mut self, key: TreeKey) -> Result<&mut Option<usize>, ForestError> {
        self.periods
            .get_mut(key.cohort)
            .and_then(|c| c.get_mut(key.tree))
            .ok_or_else(|| out_of_range(key))
    }

    pub fn get(&self, key: TreeKey) -> Result<Option<usize>, ForestError> {
        self.slot(key).copied()
    }

    /// Schedule `key` for removal at `period`, or clear it with `None`.
    pub fn set(&mut self, key: TreeKey, period: Option<usize>) -> Result<(), ForestError> {
        if period == Some(0) {
            return Err(ForestError::ConfigurationRange(
                "trees cannot be harvested at period 0".to_string(),
            ));
        }
        let slot = self.slot_mut(key)?;
        let previous = std::mem::replace(slot, period);
        if previous != period {
            let touched = [previous, period].into_iter().flatten().min();
            self.earliest_change = match (self.earliest_change, touched) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        Ok(())
    }

    /// Trees scheduled for `period`, by cohort then capacity index.
    pub fn selected_for(&self, period: usize) -> impl Iterator<Item = TreeKey> + '_ {
        self.periods.iter().enumerate().flat_map(move |(cohort, trees)| {
            trees
                .iter()
                .enumerate()
                .filter(move |(_, p)| **p == Some(period))
                .map(move |(tree, _)| TreeKey { cohort, tree })
        })
    }

    pub fn has_selections_for(&self, period: usize) -> bool {
        self.selected_for(period).next().is_some()
    }

    /// Replace the trees scheduled for `period` without recording a caller
    /// change. Used by policies while that period is being simulated.
    pub(crate) fn assign_period(&mut self, period: usize, keys: &[TreeKey]) -> Result<(), ForestError> {
        for trees in &mut self.periods {
            for slot in trees.iter_mut().filter(|p| **p == Some(period)) {
                *slot = None;
            }
        }
        for &key in keys {
            *self.slot_mut(key)? = Some(period);
        }
        Ok(())
    }

    pub fn has_pending_change(&self) -> bool {
        self.earliest_change.is_some()
    }

    pub(crate) fn take_earliest_change(&mut self) -> Option<usize> {
        self.earliest_change.take()
    }
}

fn out_of_range(key: TreeKey) -> ForestError {
    ForestError::StructuralInput(format!(
        "selection key (cohort {}, tree {}) is outside the initial stand",
        key.cohort, key.tree
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SiteQuality, Species, TreeRecord};

    fn selection() -> RemovalSelection {
        let records: Vec<TreeRecord> = (0..6)
            .map(|i| TreeRecord {
                tag: i,
                species: if i < 4 {
                    Species::DouglasFir
                } else {
                    Species::WesternHemlock
                },
                dbh: 10.0 + i as f64,
                height: 70.0,
                crown_ratio: 0.5,
                expansion_factor: 5.0,
            })
            .collect();
        let site = SiteQuality {
            primary_site_index: 120.0,
            secondary_site_index: 100.0,
        };
        RemovalSelection::for_stand(&Stand::from_records(&records, site, 30.0).unwrap())
    }

    #[test]
    fn test_shape_follows_stand() {
        let sel = selection();
        assert_eq!(sel.num_cohorts(), 2);
        assert_eq!(sel.cohort_capacity(0), 4);
        assert_eq!(sel.cohort_capacity(1), 2);
        assert_eq!(sel.cohort_capacity(5), 0);
    }

    #[test]
    fn test_set_tracks_earliest_change() {
        let mut sel = selection();
        assert!(!sel.has_pending_change());
        sel.set(TreeKey::new(0, 1), Some(4)).unwrap();
        sel.set(TreeKey::new(1, 0), Some(2)).unwrap();
        sel.set(TreeKey::new(0, 1), Some(6)).unwrap();
        assert_eq!(sel.take_earliest_change(), Some(2));
        assert_eq!(sel.take_earliest_change(), None);

        sel.set(TreeKey::new(0, 1), None).unwrap();
        assert_eq!(sel.take_earliest_change(), Some(6));
    }

    #[test]
    fn test_unchanged_value_is_not_a_change() {
        let mut sel = selection();
        sel.set(TreeKey::new(0, 0), None).unwrap();
        assert!(!sel.has_pending_change());
    }

    #[test]
    fn test_out_of_range_key() {
        let mut sel = selection();
        let err = sel.set(TreeKey::new(1, 2), Some(3)).unwrap_err();
        assert!(matches!(err, ForestError::StructuralInput(_)));
        assert!(sel.get(TreeKey::new(2, 0)).is_err());
    }

    #[test]
    fn test_period_zero_rejected() {
        let mut sel = selection();
        let err = sel.set(TreeKey::new(0, 0), Some(0)).unwrap_err();
        assert!(matches!(err, ForestError::ConfigurationRange(_)));
    }

    #[test]
    fn test_selected_for_in_key_order() {
        let mut sel = selection();
        sel.set(TreeKey::new(1, 1), Some(3)).unwrap();
        sel.set(TreeKey::new(0, 2), Some(3)).unwrap();
        sel.set(TreeKey::new(0, 0), Some(5)).unwrap();
        let keys: Vec<TreeKey> = sel.selected_for(3).collect();
        assert_eq!(keys, vec![TreeKey::new(0, 2), TreeKey::new(1, 1)]);
        assert!(sel.has_selections_for(5));
        assert!(!sel.has_selections_for(4));
    }

    #[test]
    fn test_assign_period_replaces_silently() {
        let mut sel = selection();
        sel.set(TreeKey::new(0, 0), Some(2)).unwrap();
        sel.take_earliest_change();
        sel.assign_period(2, &[TreeKey::new(0, 3), TreeKey::new(1, 0)]).unwrap();
        assert_eq!(sel.get(TreeKey::new(0, 0)).unwrap(), None);
        assert_eq!(sel.selected_for(2).count(), 2);
        assert!(!sel.has_pending_change());
    }
}
