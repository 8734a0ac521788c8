//! Statistics accumulators.
//!
//! [`CtStat`] integrates a step function of simulated time; [`DtStat`] summarizes discrete observations. Neither reads
//! a global clock: time-weighted operations take the current time as an argument, and the [`SimulationContext`]
//! supplies its own clock when statistics are driven through it.
//!
//! [`SimulationContext`]: crate::SimulationContext

mod ct_stat;
mod dt_stat;

pub use ct_stat::{CtStat, LevelOnClear};
pub use dt_stat::DtStat;
