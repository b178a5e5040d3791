use serde::Serialize;

use super::species::Species;
use super::tree::{basal_area_sqft, validate_tree, TreeRecord};
use crate::error::ForestError;

/// All trees of one species within a stand snapshot.
///
/// Storage is a fixed-capacity arena of parallel arrays. Live trees occupy the
/// prefix `0..len()`; slots past `len()` are tombstones kept for reuse. Each
/// tree carries a capacity index assigned when it was added, which stays with
/// the tree through compaction and is the key harvest selections refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trees {
    species: Species,
    count: usize,
    next_capacity_index: usize,
    pub(crate) diameter: Vec<f64>,
    pub(crate) height: Vec<f64>,
    pub(crate) crown_ratio: Vec<f64>,
    pub(crate) live_expansion_factor: Vec<f64>,
    pub(crate) dead_expansion_factor: Vec<f64>,
    pub(crate) tag: Vec<u32>,
    pub(crate) capacity_index: Vec<usize>,
}

impl Trees {
    pub fn with_capacity(species: Species, capacity: usize) -> Self {
        Self {
            species,
            count: 0,
            next_capacity_index: 0,
            diameter: vec![0.0; capacity],
            height: vec![0.0; capacity],
            crown_ratio: vec![0.0; capacity],
            live_expansion_factor: vec![0.0; capacity],
            dead_expansion_factor: vec![0.0; capacity],
            tag: vec![0; capacity],
            capacity_index: vec![0; capacity],
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.diameter.len()
    }

    /// Append a tree to the live prefix and return its position.
    pub fn add(&mut self, record: &TreeRecord) -> Result<usize, ForestError> {
        if record.species != self.species {
            return Err(ForestError::StructuralInput(format!(
                "Tree {}: species {} added to {} cohort",
                record.tag, record.species, self.species
            )));
        }
        record.validate()?;
        if self.next_capacity_index >= self.capacity() {
            return Err(ForestError::StructuralInput(format!(
                "{} cohort is full ({} trees)",
                self.species,
                self.capacity()
            )));
        }

        let i = self.count;
        self.diameter[i] = record.dbh;
        self.height[i] = record.height;
        self.crown_ratio[i] = record.crown_ratio;
        self.live_expansion_factor[i] = record.expansion_factor;
        self.dead_expansion_factor[i] = 0.0;
        self.tag[i] = record.tag;
        self.capacity_index[i] = self.next_capacity_index;
        self.next_capacity_index += 1;
        self.count += 1;
        Ok(i)
    }

    pub fn diameters(&self) -> &[f64] {
        &self.diameter[..self.count]
    }

    pub fn heights(&self) -> &[f64] {
        &self.height[..self.count]
    }

    pub fn crown_ratios(&self) -> &[f64] {
        &self.crown_ratio[..self.count]
    }

    pub fn live_expansion_factors(&self) -> &[f64] {
        &self.live_expansion_factor[..self.count]
    }

    pub fn dead_expansion_factors(&self) -> &[f64] {
        &self.dead_expansion_factor[..self.count]
    }

    pub fn tags(&self) -> &[u32] {
        &self.tag[..self.count]
    }

    pub fn capacity_indices(&self) -> &[usize] {
        &self.capacity_index[..self.count]
    }

    /// Live position of the tree with the given capacity index, if still present.
    pub fn position_of(&self, capacity_index: usize) -> Option<usize> {
        self.capacity_indices().binary_search(&capacity_index).ok()
    }

    /// Snapshot of the live tree at `i` as a plain record.
    pub fn record(&self, i: usize) -> TreeRecord {
        TreeRecord {
            tag: self.tag[i],
            species: self.species,
            dbh: self.diameter[i],
            height: self.height[i],
            crown_ratio: self.crown_ratio[i],
            expansion_factor: self.live_expansion_factor[i],
        }
    }

    /// Zero the live weight of the tree at `i`, returning the weight removed.
    /// The tree stays in the live prefix until the next `compact()`.
    pub fn remove(&mut self, i: usize) -> f64 {
        let removed = self.live_expansion_factor[i];
        self.live_expansion_factor[i] = 0.0;
        removed
    }

    pub fn trees_per_acre(&self) -> f64 {
        self.live_expansion_factors().iter().sum()
    }

    pub fn basal_area(&self) -> f64 {
        self.diameters()
            .iter()
            .zip(self.live_expansion_factors())
            .map(|(&d, &ef)| basal_area_sqft(d) * ef)
            .sum()
    }

    /// Drop every live record whose weight is no longer positive.
    ///
    /// Survivors keep their relative order, capacity index and tag; removed
    /// records move to the tombstone tail. Returns the number of records dropped.
    pub fn compact(&mut self) -> Result<usize, ForestError> {
        self.check_capacity_order()?;

        let mut write = 0;
        for read in 0..self.count {
            if self.live_expansion_factor[read] > 0.0 {
                if write != read {
                    self.swap(read, write);
                }
                write += 1;
            }
        }
        let removed = self.count - write;
        self.count = write;
        Ok(removed)
    }

    /// Overwrite this cohort's state with `other`'s without reallocating.
    ///
    /// Both cohorts must describe the same species arena: same species and
    /// same capacity. Anything else means the identity mapping has diverged.
    pub fn copy_growth_from(&mut self, other: &Trees) -> Result<(), ForestError> {
        if self.species != other.species || self.capacity() != other.capacity() {
            return Err(ForestError::InvariantViolation(format!(
                "cannot copy {} cohort of capacity {} onto {} cohort of capacity {}",
                other.species,
                other.capacity(),
                self.species,
                self.capacity()
            )));
        }
        self.count = other.count;
        self.next_capacity_index = other.next_capacity_index;
        self.diameter.copy_from_slice(&other.diameter);
        self.height.copy_from_slice(&other.height);
        self.crown_ratio.copy_from_slice(&other.crown_ratio);
        self.live_expansion_factor
            .copy_from_slice(&other.live_expansion_factor);
        self.dead_expansion_factor
            .copy_from_slice(&other.dead_expansion_factor);
        self.tag.copy_from_slice(&other.tag);
        self.capacity_index.copy_from_slice(&other.capacity_index);
        Ok(())
    }

    /// Structural checks on every live tree.
    pub fn validate(&self) -> Result<(), ForestError> {
        for i in 0..self.count {
            validate_tree(
                self.tag[i],
                self.diameter[i],
                self.height[i],
                self.crown_ratio[i],
                self.live_expansion_factor[i],
            )?;
        }
        self.check_capacity_order()
    }

    fn check_capacity_order(&self) -> Result<(), ForestError> {
        let indices = self.capacity_indices();
        if let Some(&last) = indices.last() {
            if last >= self.capacity() {
                return Err(ForestError::InvariantViolation(format!(
                    "{} capacity index {last} outside arena of {}",
                    self.species,
                    self.capacity()
                )));
            }
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForestError::InvariantViolation(format!(
                "{} capacity indices are no longer strictly increasing",
                self.species
            )));
        }
        Ok(())
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.diameter.swap(a, b);
        self.height.swap(a, b);
        self.crown_ratio.swap(a, b);
        self.live_expansion_factor.swap(a, b);
        self.dead_expansion_factor.swap(a, b);
        self.tag.swap(a, b);
        self.capacity_index.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: u32, dbh: f64, ef: f64) -> TreeRecord {
        TreeRecord {
            tag,
            species: Species::DouglasFir,
            dbh,
            height: 60.0 + dbh,
            crown_ratio: 0.5,
            expansion_factor: ef,
        }
    }

    fn cohort_of(n: usize) -> Trees {
        let mut trees = Trees::with_capacity(Species::DouglasFir, n);
        for i in 0..n {
            trees.add(&record(100 + i as u32, 8.0 + i as f64, 10.0)).unwrap();
        }
        trees
    }

    #[test]
    fn test_add_assigns_sequential_capacity_indices() {
        let trees = cohort_of(4);
        assert_eq!(trees.len(), 4);
        assert_eq!(trees.capacity_indices(), &[0, 1, 2, 3]);
        assert_eq!(trees.tags(), &[100, 101, 102, 103]);
    }

    #[test]
    fn test_add_rejects_full_arena() {
        let mut trees = cohort_of(2);
        let err = trees.add(&record(9, 10.0, 1.0)).unwrap_err();
        assert!(matches!(err, ForestError::StructuralInput(_)));
    }

    #[test]
    fn test_add_rejects_other_species() {
        let mut trees = Trees::with_capacity(Species::DouglasFir, 2);
        let mut wh = record(1, 10.0, 1.0);
        wh.species = Species::WesternHemlock;
        assert!(trees.add(&wh).is_err());
        assert!(trees.is_empty());
    }

    #[test]
    fn test_add_rejects_invalid_tree() {
        let mut trees = Trees::with_capacity(Species::DouglasFir, 2);
        assert!(trees.add(&record(1, -2.0, 1.0)).is_err());
        assert_eq!(trees.len(), 0);
    }

    #[test]
    fn test_compact_preserves_population_and_order() {
        let mut trees = cohort_of(6);
        let before: f64 = trees.trees_per_acre();
        let removed_weight = trees.remove(1) + trees.remove(4);

        let dropped = trees.compact().unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(trees.len(), 4);
        assert_eq!(trees.capacity_indices(), &[0, 2, 3, 5]);
        assert_eq!(trees.tags(), &[100, 102, 103, 105]);
        assert_eq!(trees.diameters(), &[8.0, 10.0, 11.0, 13.0]);
        assert!((trees.trees_per_acre() - (before - removed_weight)).abs() < 1e-12);
    }

    #[test]
    fn test_compact_without_removals_is_noop() {
        let mut trees = cohort_of(3);
        let copy = trees.clone();
        assert_eq!(trees.compact().unwrap(), 0);
        assert_eq!(trees, copy);
    }

    #[test]
    fn test_compact_everything() {
        let mut trees = cohort_of(3);
        for i in 0..3 {
            trees.remove(i);
        }
        assert_eq!(trees.compact().unwrap(), 3);
        assert!(trees.is_empty());
        assert_eq!(trees.capacity(), 3);
    }

    #[test]
    fn test_compact_detects_diverged_mapping() {
        let mut trees = cohort_of(3);
        trees.capacity_index.swap(0, 2);
        let err = trees.compact().unwrap_err();
        assert!(matches!(err, ForestError::InvariantViolation(_)));
    }

    #[test]
    fn test_position_of_after_compaction() {
        let mut trees = cohort_of(5);
        trees.remove(0);
        trees.compact().unwrap();
        assert_eq!(trees.position_of(0), None);
        assert_eq!(trees.position_of(3), Some(2));
    }

    #[test]
    fn test_copy_growth_from_matches_source() {
        let source = {
            let mut t = cohort_of(4);
            t.remove(2);
            t.compact().unwrap();
            t.diameter[0] = 20.0;
            t
        };
        let mut target = cohort_of(4);
        target.copy_growth_from(&source).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_copy_growth_from_rejects_capacity_mismatch() {
        let source = cohort_of(4);
        let mut target = cohort_of(3);
        let err = target.copy_growth_from(&source).unwrap_err();
        assert!(matches!(err, ForestError::InvariantViolation(_)));
    }

    #[test]
    fn test_basal_area_sums_live_prefix() {
        let mut trees = Trees::with_capacity(Species::DouglasFir, 2);
        trees.add(&record(1, 12.0, 5.0)).unwrap();
        let expected = std::f64::consts::PI * 36.0 / 144.0 * 5.0;
        assert!((trees.basal_area() - expected).abs() < 1e-9);
    }
}
