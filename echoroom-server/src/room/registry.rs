use crate::room::Room;
use echoroom_core::{ConnectionId, Participant, ParticipantProfile, RoomId};
use std::collections::HashMap;
use tracing::info;

/// All live room state. Owned by the relay loop, so no handler ever touches
/// it concurrently. Rooms appear on first join and disappear with the last
/// participant; nothing survives a restart.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    membership: HashMap<ConnectionId, RoomId>,
}

#[derive(Debug)]
pub enum JoinOutcome {
    /// Fresh membership. `others` is the roster as it stood before the join,
    /// in join order; the joiner dials exactly these.
    Joined {
        others: Vec<Participant>,
        roster: Vec<Participant>,
        /// Set when the connection switched rooms; the previous room has
        /// already seen the removal.
        departed: Option<Departure>,
    },
    /// Same connection, same room: membership is left untouched.
    Rejoined { roster: Vec<Participant> },
}

#[derive(Debug)]
pub struct Departure {
    pub room: RoomId,
    pub participant: Participant,
    pub remaining: Vec<Participant>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent join. A connection is a member of at most one room; joining
    /// a different room removes it from the previous one first.
    pub fn join(
        &mut self,
        room_id: RoomId,
        id: ConnectionId,
        profile: ParticipantProfile,
    ) -> JoinOutcome {
        let departed = match self.membership.get(&id) {
            Some(current) if *current == room_id => {
                return JoinOutcome::Rejoined {
                    roster: self.roster(&room_id),
                };
            }
            Some(_) => self.leave(&id),
            None => None,
        };

        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating room '{}'", room_id);
            Room::new(room_id.clone())
        });

        let others = room.participants().to_vec();
        room.add(Participant::from_profile(id.clone(), profile));
        let roster = room.participants().to_vec();
        self.membership.insert(id, room_id);

        JoinOutcome::Joined {
            others,
            roster,
            departed,
        }
    }

    /// Removes the connection from whichever room the stored association
    /// names. Callers never supply the room. Unknown connections are a no-op.
    pub fn leave(&mut self, id: &ConnectionId) -> Option<Departure> {
        let room_id = self.membership.remove(id)?;
        let room = self.rooms.get_mut(&room_id)?;
        let participant = room.remove(id)?;
        let remaining = room.participants().to_vec();

        if room.is_empty() {
            self.rooms.remove(&room_id);
            info!("Room '{}' is empty, deleting", room_id);
        }

        Some(Departure {
            room: room_id,
            participant,
            remaining,
        })
    }

    pub fn update_presence(
        &mut self,
        id: &ConnectionId,
        mic_on: bool,
        cam_on: bool,
    ) -> Option<(RoomId, Vec<Participant>)> {
        let room_id = self.membership.get(id)?.clone();
        let room = self.rooms.get_mut(&room_id)?;
        let participant = room.get_mut(id)?;
        participant.mic_on = mic_on;
        participant.cam_on = cam_on;
        Some((room_id, room.participants().to_vec()))
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<&RoomId> {
        self.membership.get(id)
    }

    pub fn participant(&self, id: &ConnectionId) -> Option<&Participant> {
        let room_id = self.membership.get(id)?;
        self.rooms.get(room_id)?.get(id)
    }

    pub fn is_member(&self, room_id: &RoomId, id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains(id))
    }

    pub fn roster(&self, room_id: &RoomId) -> Vec<Participant> {
        self.rooms
            .get(room_id)
            .map(|room| room.participants().to_vec())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
