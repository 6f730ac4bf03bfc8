//! data_runtime: tuning schemas and loaders for the vehicle sim.
//!
//! Loads `data/config/vehicles.toml` with defaults and clamping so a missing
//! or partial file never fails the session.

pub mod configs {
    pub mod vehicles;
}
