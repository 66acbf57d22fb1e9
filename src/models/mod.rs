pub mod game;
pub mod group;
pub mod participant;
pub mod team;

pub use game::*;
pub use group::*;
pub use participant::*;
pub use team::*;
