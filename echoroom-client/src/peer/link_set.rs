use crate::peer::link::PeerLink;
use echoroom_core::ConnectionId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Links keyed by remote connection id. At most one link per remote: the
/// insert path is the single guard against doubling up on a peer.
#[derive(Default)]
pub struct PeerLinkSet {
    links: HashMap<ConnectionId, PeerLink>,
}

impl PeerLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a link for a remote that has none yet. If a link already
    /// exists the new one is handed back so the caller can close its
    /// transport instead of leaking it.
    pub fn insert_new(&mut self, link: PeerLink) -> Result<&mut PeerLink, PeerLink> {
        match self.links.entry(link.remote.clone()) {
            Entry::Occupied(_) => Err(link),
            Entry::Vacant(slot) => Ok(slot.insert(link)),
        }
    }

    pub fn contains(&self, remote: &ConnectionId) -> bool {
        self.links.contains_key(remote)
    }

    pub fn get(&self, remote: &ConnectionId) -> Option<&PeerLink> {
        self.links.get(remote)
    }

    pub fn get_mut(&mut self, remote: &ConnectionId) -> Option<&mut PeerLink> {
        self.links.get_mut(remote)
    }

    pub fn remove(&mut self, remote: &ConnectionId) -> Option<PeerLink> {
        self.links.remove(remote)
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.links.keys().cloned().collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PeerLink> {
        self.links.values_mut()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
