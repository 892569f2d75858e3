//! Report assembly and rendering.

pub mod dashboard;
pub mod generator;

pub use dashboard::{Dashboard, DashboardOptions};
pub use generator::{generate_json_report, generate_markdown_report};
