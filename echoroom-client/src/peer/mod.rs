mod link;
mod link_set;
mod manager;

pub use link::{LinkRole, LinkState, PeerLink};
pub use link_set::PeerLinkSet;
pub use manager::PeerManager;
