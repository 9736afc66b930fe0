pub mod flood;
pub mod pollution;
pub mod regions;

pub use flood::{flood, FloodOutcome, FloodSystem};
pub use pollution::{flooded_ratio, pollution_per_turn, PollutionSystem, PollutionTable};
pub use regions::{merge_water_regions, RegionMergeSystem, WaterRegion};
