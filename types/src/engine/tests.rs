use super::*;
use commonware_codec::{Encode, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, PrivateKeyExt, Signer};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_close_reason_roundtrip() {
    for reason in [CloseReason::Full, CloseReason::ForcedByAdmin] {
        let encoded = reason.encode();
        let decoded = CloseReason::read(&mut &encoded[..]).unwrap();
        assert_eq!(reason, decoded);
    }
}

#[test]
fn test_round_roundtrip() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut round = Round::new(7, 100);
    for _ in 0..3 {
        assert!(round.add_player(PrivateKey::from_rng(&mut rng).public_key()));
    }

    let encoded = round.encode();
    let decoded = Round::read(&mut &encoded[..]).unwrap();
    assert_eq!(round, decoded);
}

#[test]
fn test_round_rejects_duplicate_player() {
    let mut rng = StdRng::seed_from_u64(42);
    let player = PrivateKey::from_rng(&mut rng).public_key();

    let mut round = Round::new(1, 0);
    assert!(round.add_player(player.clone()));
    assert!(!round.add_player(player.clone()));
    assert_eq!(round.joined_players.len(), 1);
    assert!(round.contains_player(&player));
}

#[test]
fn test_round_fills_at_capacity() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut round = Round::new(1, 0);

    for _ in 0..MAX_PLAYERS_PER_ROUND {
        assert!(!round.is_full());
        assert!(round.add_player(PrivateKey::from_rng(&mut rng).public_key()));
    }
    assert!(round.is_full());

    // Capacity is a hard bound
    assert!(!round.add_player(PrivateKey::from_rng(&mut rng).public_key()));
    assert_eq!(round.joined_players.len(), MAX_PLAYERS_PER_ROUND);
}

#[test]
fn test_session_roundtrip() {
    let mut rng = StdRng::seed_from_u64(42);
    let owner = PrivateKey::from_rng(&mut rng).public_key();

    let session = Session::new(3, owner, 2);
    assert_eq!(session.plays_remaining, PLAYS_PER_STAKE);
    assert!(session.is_live());

    let encoded = session.encode();
    let decoded = Session::read(&mut &encoded[..]).unwrap();
    assert_eq!(session, decoded);
}

#[test]
fn test_session_liveness() {
    let mut rng = StdRng::seed_from_u64(42);
    let owner = PrivateKey::from_rng(&mut rng).public_key();

    let empty = Session::empty(owner.clone());
    assert!(!empty.is_live());

    let mut session = Session::new(1, owner, 1);
    session.plays_remaining = 0;
    assert!(!session.is_live());

    session.plays_remaining = 1;
    session.is_active = false;
    assert!(!session.is_live());
}

#[test]
fn test_stats_record() {
    let mut stats = PlayerStats::default();
    stats.record(true, false);
    stats.record(false, false);
    stats.record(true, true);

    assert_eq!(stats.total_games, 3);
    assert_eq!(stats.total_wins, 2);
    assert_eq!(stats.limited_edition_wins, 1);
    assert!(stats.has_limited_edition);

    // The flag never reverts
    stats.record(false, false);
    assert!(stats.has_limited_edition);

    let encoded = stats.encode();
    let decoded = PlayerStats::read(&mut &encoded[..]).unwrap();
    assert_eq!(stats, decoded);
}

#[test]
fn test_house_state_roundtrip() {
    let house = HouseState {
        current_round: 4,
        next_session_id: 31,
        pool_balance: 12_500_000,
        total_staked: 150_000_000,
        total_paid_out: 80_000_000,
        total_swept: 7_500_000,
    };

    let encoded = house.encode();
    let decoded = HouseState::read(&mut &encoded[..]).unwrap();
    assert_eq!(house, decoded);
}

#[test]
fn test_house_state_initial() {
    let house = HouseState::new();
    assert_eq!(house.current_round, 1);
    assert_eq!(house.next_session_id, 1);
    assert_eq!(house.pool_balance, 0);
}
