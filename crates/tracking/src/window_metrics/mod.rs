//! Trailing-window aggregation over occupancy intervals.
//!
//! A query at time `T` with measuring window `M` and retention `R` walks one
//! segment's intervals once and produces a [`WindowSummary`]:
//!
//! - occupied time inside `[T-M, T]`
//! - number of visits that overlap the window
//! - average visit duration
//! - average traversal velocity over complete visits that started in the window
//!
//! Every query first sweeps closed intervals that ended before `T-R`. Since
//! `R >= M`, nothing the window still needs is ever removed.

mod query;
mod summary;
mod sweep;


pub use summary::{summarize, MetricsWindow, WindowSummary};
pub use sweep::sweep_expired;
