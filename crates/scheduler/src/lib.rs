pub mod runner;
pub mod schedule;
