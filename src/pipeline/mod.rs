pub mod dispatch;
pub mod stats;

pub(crate) mod filter;
pub(crate) mod worker;

pub use dispatch::{Dispatch, Scanner};
pub use stats::StatsSnapshot;
