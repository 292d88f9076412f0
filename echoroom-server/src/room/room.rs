use echoroom_core::{ConnectionId, Participant, RoomId};

/// One live room. Participants stay in join order; the roster sent to
/// clients is this list verbatim.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    participants: Vec<Participant>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| &p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub(crate) fn add(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    pub(crate) fn remove(&mut self, id: &ConnectionId) -> Option<Participant> {
        let index = self.participants.iter().position(|p| &p.id == id)?;
        Some(self.participants.remove(index))
    }
}
