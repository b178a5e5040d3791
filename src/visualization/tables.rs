use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::models::{Stand, VolumeEquation};
use crate::trajectory::{PeriodYield, TrajectorySummary};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Format an initial stand summary, one row per species cohort.
pub fn format_stand_summary(stand: &Stand, volume: &VolumeEquation) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Stand Summary".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut table = new_table(vec!["Species", "Records", "TPA", "BA/ac", "Share of BA"]);
    let total_ba = stand.basal_area();
    for cohort in stand.cohorts() {
        let ba = cohort.basal_area();
        let share = if total_ba > 0.0 { ba / total_ba * 100.0 } else { 0.0 };
        table.add_row(vec![
            Cell::new(cohort.species().to_string()),
            Cell::new(format!("{}", cohort.len())),
            Cell::new(format!("{:.1}", cohort.trees_per_acre())),
            Cell::new(format!("{:.1}", ba)),
            Cell::new(format!("{:.1}%", share)),
        ]);
    }
    output.push_str(&format!("{table}\n"));

    let (cubic, board) = stand.standing_volume(volume);
    output.push_str(&format!(
        "Age {:.0} yr | TPA {:.1} | BA {:.1} sq ft/ac | QMD {:.1} in | {:.0} cu ft/ac | {:.0} bd ft/ac\n",
        stand.age,
        stand.trees_per_acre(),
        total_ba,
        stand.quadratic_mean_diameter(),
        cubic,
        board
    ));
    output
}

/// Print a formatted stand summary.
pub fn print_stand_summary(stand: &Stand, volume: &VolumeEquation) {
    print!("{}", format_stand_summary(stand, volume));
}

/// Format per-period yields as a table. Harvest periods are highlighted.
pub fn format_yield_table(yields: &[PeriodYield]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Stand Trajectory".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(80)));

    let mut table = new_table(vec![
        "Period",
        "Age",
        "TPA",
        "BA/ac",
        "QMD",
        "Vol (cuft/ac)",
        "Vol (bdft/ac)",
        "Cut BA/ac",
        "Cut (bdft/ac)",
        "Mortality TPA",
    ]);

    for y in yields {
        let cut = if y.basal_area_removed > 0.0 {
            format!("{:.1}", y.basal_area_removed).yellow().to_string()
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(format!("{}", y.period)),
            Cell::new(format!("{:.0}", y.age)),
            Cell::new(format!("{:.1}", y.trees_per_acre)),
            Cell::new(format!("{:.1}", y.basal_area)),
            Cell::new(format!("{:.1}", y.quadratic_mean_diameter)),
            Cell::new(format!("{:.1}", y.standing_cubic_volume)),
            Cell::new(format!("{:.0}", y.standing_board_volume)),
            Cell::new(cut),
            Cell::new(format!("{:.0}", y.harvested_board_volume)),
            Cell::new(format!("{:.1}", y.mortality)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print per-period yields.
pub fn print_yield_table(yields: &[PeriodYield]) {
    print!("{}", format_yield_table(yields));
}

/// Format horizon totals and, when given, the net present value.
pub fn format_trajectory_summary(summary: &TrajectorySummary, npv: Option<f64>) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Harvest Summary".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table(vec!["Metric", "Value", "Unit"]);
    let periods = if summary.harvest_periods.is_empty() {
        "none".to_string()
    } else {
        summary
            .harvest_periods
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    table.add_row(vec![Cell::new("Harvest Periods"), Cell::new(periods), Cell::new("")]);
    table.add_row(vec![
        Cell::new("Basal Area Removed"),
        Cell::new(format!("{:.1}", summary.total_basal_area_removed)),
        Cell::new("sq ft/acre"),
    ]);
    table.add_row(vec![
        Cell::new("Harvested Volume"),
        Cell::new(format!("{:.0}", summary.total_harvested_board_volume)),
        Cell::new("bd ft/acre"),
    ]);
    table.add_row(vec![
        Cell::new("Final Standing Volume"),
        Cell::new(format!("{:.0}", summary.final_standing_board_volume)),
        Cell::new("bd ft/acre"),
    ]);
    if let Some(value) = npv {
        table.add_row(vec![
            Cell::new("Net Present Value"),
            Cell::new(format!("{:.2}", value)),
            Cell::new("$/acre"),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SiteQuality, Species, TreeRecord};

    fn stand() -> Stand {
        let records = vec![
            TreeRecord {
                tag: 1,
                species: Species::DouglasFir,
                dbh: 14.0,
                height: 90.0,
                crown_ratio: 0.5,
                expansion_factor: 20.0,
            },
            TreeRecord {
                tag: 2,
                species: Species::RedAlder,
                dbh: 10.0,
                height: 65.0,
                crown_ratio: 0.4,
                expansion_factor: 15.0,
            },
        ];
        let site = SiteQuality {
            primary_site_index: 120.0,
            secondary_site_index: 100.0,
        };
        Stand::from_records(&records, site, 35.0).unwrap()
    }

    fn yields() -> Vec<PeriodYield> {
        let volume = VolumeEquation::default();
        let s = stand();
        let mut later = PeriodYield::from_stand(&s, &volume, None, None);
        later.period = 1;
        later.basal_area_removed = 12.5;
        vec![PeriodYield::from_stand(&s, &volume, None, None), later]
    }

    #[test]
    fn test_stand_summary_lists_species() {
        let output = format_stand_summary(&stand(), &VolumeEquation::default());
        assert!(output.contains("Stand Summary"));
        assert!(output.contains("Douglas-fir"));
        assert!(output.contains("Red alder") || output.contains("RA"));
    }

    #[test]
    fn test_yield_table_has_every_period() {
        let output = format_yield_table(&yields());
        assert!(output.contains("Stand Trajectory"));
        assert!(output.contains("12.5"));
        assert!(output.contains("Mortality TPA"));
    }

    #[test]
    fn test_summary_with_npv() {
        let summary = TrajectorySummary::from_yields(&yields());
        let output = format_trajectory_summary(&summary, Some(1234.5));
        assert!(output.contains("Net Present Value"));
        assert!(output.contains("1234.50"));
        let without = format_trajectory_summary(&summary, None);
        assert!(!without.contains("Net Present Value"));
    }
}
