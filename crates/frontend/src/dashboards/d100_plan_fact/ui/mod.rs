pub mod daily;
pub mod dashboard;
pub mod monthly;

pub use dashboard::PlanFactDashboard;
