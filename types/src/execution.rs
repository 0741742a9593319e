use crate::engine::{read_string, string_encode_size, write_string, CloseReason};
use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_consensus::threshold_simplex::types::{Seed as CSeed, View};
use commonware_cryptography::{
    bls12381::primitives::variant::{MinSig, Variant},
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;

pub const NAMESPACE: &[u8] = b"_ROUNDPOT";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";

pub type Seed = CSeed<MinSig>;
pub type Identity = <MinSig as Variant>::Public;

/// Maximum length of an EngineError message on the wire.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 256;

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            Some(&transaction_namespace(NAMESPACE)),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            Some(&transaction_namespace(NAMESPACE)),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    // Engine instructions (tags 10-13)
    /// Credit the caller's balance (dev faucet).
    /// Binary: [10] [amount:u64 BE]
    Deposit { amount: u64 },

    /// Stake the exact join price to enter the current round and
    /// receive a fresh session of plays.
    /// Binary: [11] [amount:u64 BE]
    StakeToJoin { amount: u64 },

    /// Consume one play from the caller's session and resolve it.
    /// Binary: [12]
    PlayGame,

    /// Close the current round short of capacity (admin only).
    /// Binary: [13]
    ForceEndRound,
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Deposit { amount } => {
                10u8.write(writer);
                amount.write(writer);
            }
            Self::StakeToJoin { amount } => {
                11u8.write(writer);
                amount.write(writer);
            }
            Self::PlayGame => 12u8.write(writer),
            Self::ForceEndRound => 13u8.write(writer),
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match reader.get_u8() {
            10 => Self::Deposit {
                amount: u64::read(reader)?,
            },
            11 => Self::StakeToJoin {
                amount: u64::read(reader)?,
            },
            12 => Self::PlayGame,
            13 => Self::ForceEndRound,

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Deposit { .. } => 8,
                Self::StakeToJoin { .. } => 8,
                Self::PlayGame | Self::ForceEndRound => 0,
            }
    }
}

/// Per-address account record: replay protection plus the native
/// balance that stakes debit and payouts credit.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
    pub balance: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.balance.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
            balance: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size() + self.balance.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone)]
pub enum Key {
    /// Account for nonce and balance tracking (tag 0)
    Account(PublicKey),

    // Engine keys (tags 10-13)
    House,
    Round(u64),
    Session(PublicKey),
    Stats(PublicKey),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            // Account key (tag 0)
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }

            // Engine keys (tags 10-13)
            Self::House => 10u8.write(writer),
            Self::Round(id) => {
                11u8.write(writer);
                id.write(writer);
            }
            Self::Session(pk) => {
                12u8.write(writer);
                pk.write(writer);
            }
            Self::Stats(pk) => {
                13u8.write(writer);
                pk.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match reader.get_u8() {
            // Account key (tag 0)
            0 => Self::Account(PublicKey::read(reader)?),

            // Engine keys (tags 10-13)
            10 => Self::House,
            11 => Self::Round(u64::read(reader)?),
            12 => Self::Session(PublicKey::read(reader)?),
            13 => Self::Stats(PublicKey::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                // Account key
                Self::Account(_) => PublicKey::SIZE,

                // Engine keys
                Self::House => 0,
                Self::Round(_) => u64::SIZE,
                Self::Session(_) => PublicKey::SIZE,
                Self::Stats(_) => PublicKey::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    /// Account for nonce and balance tracking (tag 0)
    Account(Account),

    // System values
    Commit {
        height: u64,
        start: u64,
    },

    // Engine values (tags 10-13)
    House(crate::engine::HouseState),
    Round(crate::engine::Round),
    Session(crate::engine::Session),
    Stats(crate::engine::PlayerStats),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            // Account value (tag 0)
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }

            // System values
            Self::Commit { height, start } => {
                3u8.write(writer);
                height.write(writer);
                start.write(writer);
            }

            // Engine values (tags 10-13)
            Self::House(house) => {
                10u8.write(writer);
                house.write(writer);
            }
            Self::Round(round) => {
                11u8.write(writer);
                round.write(writer);
            }
            Self::Session(session) => {
                12u8.write(writer);
                session.write(writer);
            }
            Self::Stats(stats) => {
                13u8.write(writer);
                stats.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match reader.get_u8() {
            // Account value (tag 0)
            0 => Self::Account(Account::read(reader)?),

            // System values
            3 => Self::Commit {
                height: u64::read(reader)?,
                start: u64::read(reader)?,
            },

            // Engine values (tags 10-13)
            10 => Self::House(crate::engine::HouseState::read(reader)?),
            11 => Self::Round(crate::engine::Round::read(reader)?),
            12 => Self::Session(crate::engine::Session::read(reader)?),
            13 => Self::Stats(crate::engine::PlayerStats::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                // Account value
                Self::Account(account) => account.encode_size(),

                // System values
                Self::Commit { height, start } => height.encode_size() + start.encode_size(),

                // Engine values
                Self::House(house) => house.encode_size(),
                Self::Round(round) => round.encode_size(),
                Self::Session(session) => session.encode_size(),
                Self::Stats(stats) => stats.encode_size(),
            }
    }
}

/// Durable records external indexers and UIs rely on for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Engine events (tags 20-25)
    Deposited {
        player: PublicKey,
        amount: u64,
        balance: u64,
    },
    PlayerJoined {
        round_id: u64,
        session_id: u64,
        player: PublicKey,
    },
    PlayResolved {
        session_id: u64,
        player: PublicKey,
        play_number: u32,
        draw: u8,
        won: bool,
        payout: u64,
        plays_remaining: u32,
        limited_edition: bool,
    },
    RoundStarted {
        round_id: u64,
        started_at: u64,
    },
    RoundClosed {
        round_id: u64,
        reason: CloseReason,
        players: u32,
        ended_at: u64,
    },
    TreasurySwept {
        round_id: u64,
        amount: u64,
    },

    // Error event (tag 29)
    EngineError {
        player: PublicKey,
        code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            // Engine events (tags 20-25)
            Self::Deposited {
                player,
                amount,
                balance,
            } => {
                20u8.write(writer);
                player.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::PlayerJoined {
                round_id,
                session_id,
                player,
            } => {
                21u8.write(writer);
                round_id.write(writer);
                session_id.write(writer);
                player.write(writer);
            }
            Self::PlayResolved {
                session_id,
                player,
                play_number,
                draw,
                won,
                payout,
                plays_remaining,
                limited_edition,
            } => {
                22u8.write(writer);
                session_id.write(writer);
                player.write(writer);
                play_number.write(writer);
                draw.write(writer);
                won.write(writer);
                payout.write(writer);
                plays_remaining.write(writer);
                limited_edition.write(writer);
            }
            Self::RoundStarted {
                round_id,
                started_at,
            } => {
                23u8.write(writer);
                round_id.write(writer);
                started_at.write(writer);
            }
            Self::RoundClosed {
                round_id,
                reason,
                players,
                ended_at,
            } => {
                24u8.write(writer);
                round_id.write(writer);
                reason.write(writer);
                players.write(writer);
                ended_at.write(writer);
            }
            Self::TreasurySwept { round_id, amount } => {
                25u8.write(writer);
                round_id.write(writer);
                amount.write(writer);
            }

            // Error event (tag 29)
            Self::EngineError {
                player,
                code,
                message,
            } => {
                29u8.write(writer);
                player.write(writer);
                code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match reader.get_u8() {
            // Engine events (tags 20-25)
            20 => Self::Deposited {
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            21 => Self::PlayerJoined {
                round_id: u64::read(reader)?,
                session_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
            },
            22 => Self::PlayResolved {
                session_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                play_number: u32::read(reader)?,
                draw: u8::read(reader)?,
                won: bool::read(reader)?,
                payout: u64::read(reader)?,
                plays_remaining: u32::read(reader)?,
                limited_edition: bool::read(reader)?,
            },
            23 => Self::RoundStarted {
                round_id: u64::read(reader)?,
                started_at: u64::read(reader)?,
            },
            24 => Self::RoundClosed {
                round_id: u64::read(reader)?,
                reason: CloseReason::read(reader)?,
                players: u32::read(reader)?,
                ended_at: u64::read(reader)?,
            },
            25 => Self::TreasurySwept {
                round_id: u64::read(reader)?,
                amount: u64::read(reader)?,
            },

            // Error event (tag 29)
            29 => Self::EngineError {
                player: PublicKey::read(reader)?,
                code: u8::read(reader)?,
                message: read_string(reader, MAX_ERROR_MESSAGE_LENGTH)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                // Engine events (tags 20-25)
                Self::Deposited {
                    player,
                    amount,
                    balance,
                } => player.encode_size() + amount.encode_size() + balance.encode_size(),
                Self::PlayerJoined {
                    round_id,
                    session_id,
                    player,
                } => round_id.encode_size() + session_id.encode_size() + player.encode_size(),
                Self::PlayResolved {
                    session_id,
                    player,
                    play_number,
                    draw,
                    won,
                    payout,
                    plays_remaining,
                    limited_edition,
                } => {
                    session_id.encode_size()
                        + player.encode_size()
                        + play_number.encode_size()
                        + draw.encode_size()
                        + won.encode_size()
                        + payout.encode_size()
                        + plays_remaining.encode_size()
                        + limited_edition.encode_size()
                }
                Self::RoundStarted {
                    round_id,
                    started_at,
                } => round_id.encode_size() + started_at.encode_size(),
                Self::RoundClosed {
                    round_id,
                    reason,
                    players,
                    ended_at,
                } => {
                    round_id.encode_size()
                        + reason.encode_size()
                        + players.encode_size()
                        + ended_at.encode_size()
                }
                Self::TreasurySwept { round_id, amount } => {
                    round_id.encode_size() + amount.encode_size()
                }

                // Error event (tag 29)
                Self::EngineError {
                    player,
                    code,
                    message,
                } => player.encode_size() + code.encode_size() + string_encode_size(message),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
    Commit { height: u64, start: u64 },
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
            Self::Commit { height, start } => {
                2u8.write(writer);
                height.write(writer);
                start.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            2 => Ok(Self::Commit {
                height: u64::read(reader)?,
                start: u64::read(reader)?,
            }),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Event(event) => event.encode_size(),
            Self::Transaction(transaction) => transaction.encode_size(),
            Self::Commit { height, start } => height.encode_size() + start.encode_size(),
        }
    }
}

/// Roots and operation ranges for one executed block, the anchor for
/// auditing state and event history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub view: View,
    pub height: u64,
    pub block_digest: Digest,
    pub state_root: Digest,
    pub state_start_op: u64,
    pub state_end_op: u64,
    pub events_root: Digest,
    pub events_start_op: u64,
    pub events_end_op: u64,
}

impl Progress {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        view: View,
        height: u64,
        block_digest: Digest,
        state_root: Digest,
        state_start_op: u64,
        state_end_op: u64,
        events_root: Digest,
        events_start_op: u64,
        events_end_op: u64,
    ) -> Self {
        Self {
            view,
            height,
            block_digest,
            state_root,
            state_start_op,
            state_end_op,
            events_root,
            events_start_op,
            events_end_op,
        }
    }
}

impl Write for Progress {
    fn write(&self, writer: &mut impl BufMut) {
        self.view.write(writer);
        self.height.write(writer);
        self.block_digest.write(writer);
        self.state_root.write(writer);
        self.state_start_op.write(writer);
        self.state_end_op.write(writer);
        self.events_root.write(writer);
        self.events_start_op.write(writer);
        self.events_end_op.write(writer);
    }
}

impl Read for Progress {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            view: View::read(reader)?,
            height: u64::read(reader)?,
            block_digest: Digest::read(reader)?,
            state_root: Digest::read(reader)?,
            state_start_op: u64::read(reader)?,
            state_end_op: u64::read(reader)?,
            events_root: Digest::read(reader)?,
            events_start_op: u64::read(reader)?,
            events_end_op: u64::read(reader)?,
        })
    }
}

impl FixedSize for Progress {
    const SIZE: usize = View::SIZE
        + u64::SIZE
        + Digest::SIZE
        + Digest::SIZE
        + u64::SIZE
        + u64::SIZE
        + Digest::SIZE
        + u64::SIZE
        + u64::SIZE;
}

impl Digestible for Progress {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        Sha256::hash(&self.encode())
    }
}
