pub mod assertion_steps;
pub mod fixture_steps;
pub mod world;
