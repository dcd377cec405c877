pub mod clock;
pub mod dispatch;
pub mod ecs;
pub mod geo;
pub mod graph;
pub mod messages;
pub mod planner;
pub mod pricing;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod simulator;
pub mod systems;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
