/// Exact stake required to join a round, in base units (9 decimals).
/// 5_000_000 base units = 0.005 native.
pub const STAKE_AMOUNT: u64 = 5_000_000;

/// Distinct players admitted per round before it auto-closes.
pub const MAX_PLAYERS_PER_ROUND: usize = 10;

/// Win chance per play, in percent. A draw in [0, 100) wins iff it is
/// strictly below this value.
pub const WIN_PERCENTAGE: u8 = 10;

/// Plays granted per accepted stake.
pub const PLAYS_PER_STAKE: u32 = 3;

/// Win payout as a multiple of the stake.
pub const WIN_PAYOUT_MULTIPLIER: u64 = 2;

/// Chance (in percent of winning plays) that a win is additionally
/// flagged as a limited edition win.
pub const LIMITED_EDITION_PERCENTAGE: u8 = 1;

/// Share of the pool swept to the treasury on each round close,
/// in basis points.
pub const TREASURY_SHARE_BPS: u64 = 500;

/// Error codes for EngineError events.
// Admission errors: retry under corrected conditions.
pub const ERROR_INSUFFICIENT_STAKE: u8 = 1;
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 2;
pub const ERROR_ROUND_NOT_ACTIVE: u8 = 3;
pub const ERROR_ALREADY_STAKED_IN_ROUND: u8 = 4;
pub const ERROR_SESSION_ALREADY_ACTIVE: u8 = 5;
pub const ERROR_ROUND_FULL: u8 = 6;
// Session errors: caller misuse of PlayGame without a prior stake.
pub const ERROR_NO_ACTIVE_SESSION: u8 = 7;
// Authorization errors: admin path guards.
pub const ERROR_UNAUTHORIZED: u8 = 8;
pub const ERROR_ROUND_ALREADY_INACTIVE: u8 = 9;
// Settlement errors: fatal for the operation, never degraded payouts.
pub const ERROR_INSUFFICIENT_POOL_BALANCE: u8 = 10;
