mod tables;

pub use tables::{
    format_stand_summary, format_trajectory_summary, format_yield_table, print_stand_summary,
    print_yield_table,
};
