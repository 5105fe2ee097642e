pub mod assignment;
pub mod schedule;

pub use assignment::Assignment;
pub use schedule::ScheduleRow;
