//! HTTP API handlers

pub mod grievances;
pub mod health;
pub mod submission;

pub use grievances::grievance_routes;
pub use health::health_routes;
pub use submission::submission_routes;
