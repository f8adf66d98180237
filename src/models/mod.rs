pub mod club;
pub mod event;
pub mod player;

pub use club::{BestMatch, Club};
pub use event::{
  ActivitySample, Benchmark, BenchmarkValues, Event, EventKind, MeasurementSet, Measurements,
  Preparation, Report, ReportStats, SubSession, Substitution,
};
pub use player::{Player, Position};
