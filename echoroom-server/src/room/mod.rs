mod registry;
mod room;

pub use registry::{Departure, JoinOutcome, RoomRegistry};
pub use room::Room;
