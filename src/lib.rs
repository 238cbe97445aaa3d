//! Trip intake — conversational slot-filling intake for trip planning requests.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod form;
pub mod gateway;
pub mod presenter;
