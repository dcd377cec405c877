pub mod movement;
pub mod roster;
pub mod traffic;
