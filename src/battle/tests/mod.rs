pub mod common;

mod test_abilities;
mod test_end_of_turn;
mod test_simulation;
mod test_stat_stages;
