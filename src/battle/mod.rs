pub mod battler;
pub mod commands;
pub mod damage;
pub mod dispatch;
pub mod engine;
pub mod field;
pub mod phases;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod status;
pub mod tags;
pub mod turn_order;
pub mod validation;

#[cfg(test)]
pub mod tests;
