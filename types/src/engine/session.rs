use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::PLAYS_PER_STAKE;

/// A player's allotment of plays purchased by one stake. Sessions are
/// keyed by owner: a player holds at most one, and a new stake may only
/// replace a session whose plays are exhausted. Sessions outlive the
/// round they originated in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: u64,
    pub owner: PublicKey,
    pub plays_remaining: u32,
    pub total_wins: u32,
    pub is_active: bool,
    pub origin_round: u64,
}

impl Session {
    pub fn new(id: u64, owner: PublicKey, origin_round: u64) -> Self {
        Self {
            id,
            owner,
            plays_remaining: PLAYS_PER_STAKE,
            total_wins: 0,
            is_active: true,
            origin_round,
        }
    }

    /// Read-only placeholder for a player who never staked.
    pub fn empty(owner: PublicKey) -> Self {
        Self {
            id: 0,
            owner,
            plays_remaining: 0,
            total_wins: 0,
            is_active: false,
            origin_round: 0,
        }
    }

    /// Whether the session can still consume a play.
    pub fn is_live(&self) -> bool {
        self.is_active && self.plays_remaining > 0
    }
}

impl Write for Session {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.owner.write(writer);
        self.plays_remaining.write(writer);
        self.total_wins.write(writer);
        self.is_active.write(writer);
        self.origin_round.write(writer);
    }
}

impl Read for Session {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            owner: PublicKey::read(reader)?,
            plays_remaining: u32::read(reader)?,
            total_wins: u32::read(reader)?,
            is_active: bool::read(reader)?,
            origin_round: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Session {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.owner.encode_size()
            + self.plays_remaining.encode_size()
            + self.total_wins.encode_size()
            + self.is_active.encode_size()
            + self.origin_round.encode_size()
    }
}
