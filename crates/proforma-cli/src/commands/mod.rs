pub mod analysis;
pub mod indicators;
pub mod projection;
pub mod schedules;
