pub mod check;
pub mod error;
pub mod setup;
pub mod targets;
pub mod transpile;
pub mod types;

#[cfg(test)]
mod setup_tests;
#[cfg(test)]
mod transpile_tests;
