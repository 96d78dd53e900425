pub mod world_state;

pub use world_state::{PlayerState, Sighting, WorldState};
