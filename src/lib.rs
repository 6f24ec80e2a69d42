//! Finds when satellites pass through the view or main beam of a radio
//! telescope during a reservation, and estimates the power they deliver.

pub mod config;
pub mod gain;
pub mod overhead;
pub mod predict;
