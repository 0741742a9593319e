use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

/// The engine context object: the current-round pointer, the session id
/// allocator, and the shared pool that funds win payouts. All mutation
/// is routed through the serialized transaction log, so there is never
/// more than one writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HouseState {
    /// Id of the single active round.
    pub current_round: u64,
    /// Next session id to allocate (monotone, starts at 1).
    pub next_session_id: u64,
    /// Pool balance funding win payouts, replenished by stakes.
    pub pool_balance: u64,
    /// Lifetime stake volume (bookkeeping only).
    pub total_staked: u64,
    /// Lifetime win payouts (bookkeeping only).
    pub total_paid_out: u64,
    /// Lifetime treasury sweeps (bookkeeping only).
    pub total_swept: u64,
}

impl HouseState {
    pub fn new() -> Self {
        Self {
            current_round: 1,
            next_session_id: 1,
            pool_balance: 0,
            total_staked: 0,
            total_paid_out: 0,
            total_swept: 0,
        }
    }
}

impl Default for HouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for HouseState {
    fn write(&self, writer: &mut impl BufMut) {
        self.current_round.write(writer);
        self.next_session_id.write(writer);
        self.pool_balance.write(writer);
        self.total_staked.write(writer);
        self.total_paid_out.write(writer);
        self.total_swept.write(writer);
    }
}

impl Read for HouseState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            current_round: u64::read(reader)?,
            next_session_id: u64::read(reader)?,
            pool_balance: u64::read(reader)?,
            total_staked: u64::read(reader)?,
            total_paid_out: u64::read(reader)?,
            total_swept: u64::read(reader)?,
        })
    }
}

impl EncodeSize for HouseState {
    fn encode_size(&self) -> usize {
        self.current_round.encode_size()
            + self.next_session_id.encode_size()
            + self.pool_balance.encode_size()
            + self.total_staked.encode_size()
            + self.total_paid_out.encode_size()
            + self.total_swept.encode_size()
    }
}
