mod yields;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ForestError;
use crate::growth::{CalibrationState, DensityProfile, GrowthPipeline};
use crate::harvest::{apply_harvest, HarvestOutcome, HarvestPolicy, RemovalSelection};
use crate::models::{Stand, TreatmentHistory, VolumeEquation};

pub use yields::{net_present_value, FinancialParameters, PeriodYield, TrajectorySummary};

/// Longest supported planning horizon, in periods.
pub const MAX_PERIODS: usize = 100;

/// Configuration shared by a trajectory and all of its clones.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySettings {
    pub pipeline: GrowthPipeline,
    pub volume: VolumeEquation,
    /// Number of growth periods after the initial snapshot.
    pub periods: usize,
}

impl TrajectorySettings {
    pub fn new(pipeline: GrowthPipeline, periods: usize) -> Self {
        Self {
            pipeline,
            volume: VolumeEquation::default(),
            periods,
        }
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if !(1..=MAX_PERIODS).contains(&self.periods) {
            return Err(ForestError::ConfigurationRange(format!(
                "number of periods must be in 1..={MAX_PERIODS}, got {}",
                self.periods
            )));
        }
        self.pipeline.validate()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    stand: Stand,
    density: DensityProfile,
    calibration: CalibrationState,
    period_yield: PeriodYield,
    version: u64,
}

/// A stand's simulated future under one harvest schedule.
///
/// Holds one snapshot per period. Snapshots before the first stale period
/// are current; editing the removal selection or the policies marks the
/// earliest affected period stale, and the next `simulate_through` resumes
/// there. Cloning deep-copies tree state and treatment history and shares
/// the settings, so candidate schedules can be explored on other threads.
#[derive(Debug, Clone)]
pub struct Trajectory {
    settings: Arc<TrajectorySettings>,
    slots: Vec<Option<Slot>>,
    first_stale: usize,
    next_version: u64,
    selection: RemovalSelection,
    policies: BTreeMap<usize, HarvestPolicy>,
    treatments: TreatmentHistory,
    summary: Option<TrajectorySummary>,
}

impl Trajectory {
    pub fn new(
        initial: Stand,
        settings: TrajectorySettings,
        calibration: CalibrationState,
        treatments: TreatmentHistory,
    ) -> Result<Self, ForestError> {
        settings.validate()?;
        if initial.period != 0 {
            return Err(ForestError::StructuralInput(format!(
                "initial stand must describe period 0, got period {}",
                initial.period
            )));
        }
        settings.pipeline.validate_inputs(&initial, &treatments)?;

        let density = DensityProfile::from_stand(&initial, settings.pipeline.variant)?;
        let period_yield = PeriodYield::from_stand(&initial, &settings.volume, None, None);
        let selection = RemovalSelection::for_stand(&initial);

        info!(
            variant = %settings.pipeline.variant,
            trees = initial.num_trees(),
            cohorts = initial.cohorts().len(),
            periods = settings.periods,
            "created trajectory"
        );

        let mut slots = vec![None; settings.periods + 1];
        slots[0] = Some(Slot {
            stand: initial,
            density,
            calibration,
            period_yield,
            version: 0,
        });

        Ok(Self {
            settings: Arc::new(settings),
            slots,
            first_stale: 1,
            next_version: 1,
            selection,
            policies: BTreeMap::new(),
            treatments,
            summary: None,
        })
    }

    pub fn settings(&self) -> &TrajectorySettings {
        &self.settings
    }

    pub fn periods(&self) -> usize {
        self.settings.periods
    }

    /// Last period whose snapshot is current.
    pub fn simulated_through(&self) -> usize {
        self.first_stale - 1
    }

    pub fn treatments(&self) -> &TreatmentHistory {
        &self.treatments
    }

    pub fn selection(&self) -> &RemovalSelection {
        &self.selection
    }

    /// Mutable access for schedule search. Edits take effect on the next
    /// `simulate_through`, which resumes at the earliest period they touch.
    pub fn selection_mut(&mut self) -> &mut RemovalSelection {
        &mut self.selection
    }

    pub fn policies(&self) -> impl Iterator<Item = &HarvestPolicy> {
        self.policies.values()
    }

    /// Bind a harvest policy to its trigger period.
    pub fn add_policy(&mut self, policy: HarvestPolicy) -> Result<(), ForestError> {
        policy.validate()?;
        let period = policy.period();
        if period > self.settings.periods {
            return Err(ForestError::ConfigurationRange(format!(
                "harvest at period {period} is beyond the {}-period horizon",
                self.settings.periods
            )));
        }
        if self.policies.contains_key(&period) {
            return Err(ForestError::ConfigurationRange(format!(
                "period {period} already has a harvest policy"
            )));
        }
        self.policies.insert(period, policy);
        self.invalidate_from(period);
        Ok(())
    }

    /// Unbind the policy at `period`, dropping the trees it had selected.
    pub fn remove_policy(&mut self, period: usize) -> Result<Option<HarvestPolicy>, ForestError> {
        let removed = self.policies.remove(&period);
        if removed.is_some() {
            self.selection.assign_period(period, &[])?;
            self.invalidate_from(period);
        }
        Ok(removed)
    }

    fn invalidate_from(&mut self, period: usize) {
        self.first_stale = self.first_stale.min(period.max(1));
        self.summary = None;
    }

    fn current(&self, period: usize) -> Option<&Slot> {
        if period < self.first_stale {
            self.slots.get(period).and_then(Option::as_ref)
        } else {
            None
        }
    }

    pub fn stand(&self, period: usize) -> Option<&Stand> {
        self.current(period).map(|s| &s.stand)
    }

    pub fn density(&self, period: usize) -> Option<&DensityProfile> {
        self.current(period).map(|s| &s.density)
    }

    pub fn calibration(&self, period: usize) -> Option<&CalibrationState> {
        self.current(period).map(|s| &s.calibration)
    }

    pub fn period_yield(&self, period: usize) -> Option<&PeriodYield> {
        self.current(period).map(|s| &s.period_yield)
    }

    /// Version stamp of a current snapshot. Changes only when the period is
    /// recomputed.
    pub fn version(&self, period: usize) -> Option<u64> {
        self.current(period).map(|s| s.version)
    }

    /// Yields of every current period, in order.
    pub fn yields(&self) -> Vec<PeriodYield> {
        (0..self.first_stale)
            .filter_map(|p| self.period_yield(p).cloned())
            .collect()
    }

    /// Whether aggregate outputs need another simulation pass.
    pub fn is_dirty(&self) -> bool {
        self.summary.is_none()
            || self.selection.has_pending_change()
            || self.first_stale <= self.settings.periods
    }

    /// Bring every period up to `through` current.
    pub fn simulate_through(&mut self, through: usize) -> Result<(), ForestError> {
        if through > self.settings.periods {
            return Err(ForestError::ConfigurationRange(format!(
                "cannot simulate through period {through} of a {}-period horizon",
                self.settings.periods
            )));
        }
        if let Some(changed) = self.selection.take_earliest_change() {
            self.invalidate_from(changed);
        }

        let resume = self.first_stale;
        if resume > through {
            debug!(through, "trajectory already current");
            return Ok(());
        }
        debug!(resume, through, "resimulating");

        let prior = self.slots[resume - 1].as_ref().ok_or_else(|| {
            ForestError::InvariantViolation(format!("no snapshot for period {}", resume - 1))
        })?;
        let mut stand = prior.stand.clone();
        let mut density = prior.density.clone();
        let mut calibration = prior.calibration.clone();
        self.treatments.discard_thinnings_from(resume);
        self.summary = None;

        let settings = Arc::clone(&self.settings);
        for period in resume..=through {
            let harvest = self.harvest(period, &mut stand, &mut density)?;
            let growth = settings
                .pipeline
                .grow(&mut stand, &density, &mut calibration, &self.treatments)?;
            stand.compact()?;
            let period_yield =
                PeriodYield::from_stand(&stand, &settings.volume, harvest.as_ref(), Some(&growth));
            density = growth.density;
            self.publish(period, &stand, &density, &calibration, period_yield)?;
            self.first_stale = period + 1;
        }
        Ok(())
    }

    fn harvest(
        &mut self,
        period: usize,
        stand: &mut Stand,
        density: &mut DensityProfile,
    ) -> Result<Option<HarvestOutcome>, ForestError> {
        let policy = match self.policies.get(&period) {
            Some(policy) => policy.clone(),
            None if self.selection.has_selections_for(period) => {
                HarvestPolicy::ExternalSelection { period }
            }
            None => return Ok(None),
        };
        let keys = policy.select(stand, density, &mut self.selection)?;
        if keys.is_empty() {
            return Ok(None);
        }
        let outcome = apply_harvest(stand, period, &keys, &self.settings.volume)?;
        if outcome.basal_area_removed <= 0.0 {
            return Ok(None);
        }
        self.treatments
            .record_thinning(period, outcome.basal_area_removed, outcome.basal_area_before)?;
        *density = DensityProfile::from_stand(stand, self.settings.pipeline.variant)?;
        Ok(Some(outcome))
    }

    fn publish(
        &mut self,
        period: usize,
        stand: &Stand,
        density: &DensityProfile,
        calibration: &CalibrationState,
        period_yield: PeriodYield,
    ) -> Result<(), ForestError> {
        let version = self.next_version;
        self.next_version += 1;
        let slot = self.slots.get_mut(period).ok_or_else(|| {
            ForestError::InvariantViolation(format!("period {period} has no slot"))
        })?;
        match slot {
            Some(existing) => {
                existing.stand.copy_from(stand)?;
                existing.density.clone_from(density);
                existing.calibration.clone_from(calibration);
                existing.period_yield = period_yield;
                existing.version = version;
            }
            None => {
                *slot = Some(Slot {
                    stand: stand.clone(),
                    density: density.clone(),
                    calibration: calibration.clone(),
                    period_yield,
                    version,
                });
            }
        }
        Ok(())
    }

    /// Totals over the whole horizon, simulating whatever is stale first.
    pub fn summary(&mut self) -> Result<&TrajectorySummary, ForestError> {
        if self.is_dirty() {
            self.simulate_through(self.settings.periods)?;
            self.summary = Some(TrajectorySummary::from_yields(&self.yields()));
        }
        self.summary
            .as_ref()
            .ok_or_else(|| ForestError::InvariantViolation("summary missing after simulation".to_string()))
    }

    /// Discounted value of the harvest schedule over the whole horizon.
    pub fn net_present_value(&mut self, params: &FinancialParameters) -> Result<f64, ForestError> {
        params.validate()?;
        self.simulate_through(self.settings.periods)?;
        let years = self.settings.pipeline.variant.period_length_years();
        Ok(net_present_value(&self.yields(), years, params))
    }
}
