// src/dashboard/mod.rs

mod page;
mod routes;
mod state;

pub use routes::routes;
pub use state::{DashboardState, Snapshot};
