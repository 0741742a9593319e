use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::MAX_PLAYERS_PER_ROUND;

/// Why a round was closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CloseReason {
    /// The round reached capacity during a join.
    Full = 0,
    /// The admin force-ended the round short of capacity.
    ForcedByAdmin = 1,
}

impl Write for CloseReason {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for CloseReason {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Full),
            1 => Ok(Self::ForcedByAdmin),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for CloseReason {
    const SIZE: usize = 1;
}

/// A capacity-bounded admission window. Once closed, a round is
/// immutable history: it stays queryable by id but is never mutated
/// again.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Round {
    pub id: u64,
    pub joined_players: Vec<PublicKey>,
    pub is_active: bool,
    /// Consensus view at which the round opened.
    pub started_at: u64,
    /// Consensus view at which the round closed (0 while active).
    pub ended_at: u64,
}

impl Round {
    pub fn new(id: u64, view: u64) -> Self {
        Self {
            id,
            joined_players: Vec::new(),
            is_active: true,
            started_at: view,
            ended_at: 0,
        }
    }

    pub fn contains_player(&self, player: &PublicKey) -> bool {
        self.joined_players.contains(player)
    }

    /// Add a player to the round. Returns false if they already joined
    /// or the round is at capacity.
    pub fn add_player(&mut self, player: PublicKey) -> bool {
        if self.contains_player(&player) || self.is_full() {
            return false;
        }
        self.joined_players.push(player);
        true
    }

    pub fn is_full(&self) -> bool {
        self.joined_players.len() >= MAX_PLAYERS_PER_ROUND
    }
}

impl Write for Round {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.joined_players.write(writer);
        self.is_active.write(writer);
        self.started_at.write(writer);
        self.ended_at.write(writer);
    }
}

impl Read for Round {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            joined_players: Vec::<PublicKey>::read_range(reader, 0..=MAX_PLAYERS_PER_ROUND)?,
            is_active: bool::read(reader)?,
            started_at: u64::read(reader)?,
            ended_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Round {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.joined_players.encode_size()
            + self.is_active.encode_size()
            + self.started_at.encode_size()
            + self.ended_at.encode_size()
    }
}
