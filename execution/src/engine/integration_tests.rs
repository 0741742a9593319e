//! Integration tests for the staking rounds engine.
//!
//! These tests drive full blocks through real state and event
//! databases, from deposits through round close to play settlement.

#[cfg(test)]
mod tests {
    use crate::mocks::{create_account_keypair, create_adbs, create_network_keypair, execute_block};
    use crate::state;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;
    use roundpot_types::engine::{
        MAX_PLAYERS_PER_ROUND, PLAYS_PER_STAKE, STAKE_AMOUNT, TREASURY_SHARE_BPS,
        WIN_PAYOUT_MULTIPLIER,
    };
    use roundpot_types::execution::{Instruction, Transaction};

    #[test]
    fn test_full_round_lifecycle() {
        let executor = Runner::default();
        executor.start(|context| async move {
            let (network_secret, _) = create_network_keypair();
            let (mut adb_state, mut adb_events) = create_adbs(&context).await;
            let (_, admin) = create_account_keypair(0);

            let signers: Vec<_> = (1..=MAX_PLAYERS_PER_ROUND as u64)
                .map(create_account_keypair)
                .collect();

            // Block 1: everyone funds their account
            let deposits = signers
                .iter()
                .map(|(private, _)| {
                    Transaction::sign(
                        private,
                        0,
                        Instruction::Deposit {
                            amount: STAKE_AMOUNT * 10,
                        },
                    )
                })
                .collect();
            let (_, progress1) = execute_block(
                &network_secret,
                admin.clone(),
                &mut adb_state,
                &mut adb_events,
                1,
                deposits,
            )
            .await;

            // Block 2: everyone stakes, filling and closing round 1
            let stakes = signers
                .iter()
                .map(|(private, _)| {
                    Transaction::sign(
                        private,
                        1,
                        Instruction::StakeToJoin {
                            amount: STAKE_AMOUNT,
                        },
                    )
                })
                .collect();
            let (_, progress2) = execute_block(
                &network_secret,
                admin.clone(),
                &mut adb_state,
                &mut adb_events,
                2,
                stakes,
            )
            .await;

            let house = state::house(&adb_state).await;
            let staked = STAKE_AMOUNT * MAX_PLAYERS_PER_ROUND as u64;
            let sweep = staked * TREASURY_SHARE_BPS / 10_000;
            assert_eq!(house.current_round, 2);
            assert_eq!(house.total_staked, staked);
            assert_eq!(house.total_swept, sweep);
            assert_eq!(house.pool_balance, staked - sweep);
            assert_eq!(state::balance(&adb_state, &admin).await, sweep);

            // Round 2 opened empty; round 1 is closed history
            let round = state::current_round(&adb_state).await.unwrap();
            assert_eq!(round.id, 2);
            assert!(round.is_active);
            assert!(round.joined_players.is_empty());

            // Block 3: the first staker burns through their session
            let (player_private, player) = &signers[0];
            let plays = (0..PLAYS_PER_STAKE as u64)
                .map(|i| Transaction::sign(player_private, 2 + i, Instruction::PlayGame))
                .collect();
            let (_, progress3) = execute_block(
                &network_secret,
                admin.clone(),
                &mut adb_state,
                &mut adb_events,
                3,
                plays,
            )
            .await;

            let session = state::player_session(&adb_state, player).await;
            assert_eq!(session.plays_remaining, 0);
            assert!(!session.is_active);
            assert_eq!(session.origin_round, 1);

            let stats = state::player_stats(&adb_state, player).await;
            assert_eq!(stats.total_games, PLAYS_PER_STAKE as u64);
            assert_eq!(stats.total_wins, session.total_wins as u64);

            // Every recorded win is a paid win
            let payout = STAKE_AMOUNT * WIN_PAYOUT_MULTIPLIER;
            let paid = session.total_wins as u64 * payout;
            let house = state::house(&adb_state).await;
            assert_eq!(house.total_paid_out, paid);
            assert_eq!(house.pool_balance, staked - sweep - paid);
            assert_eq!(
                state::balance(&adb_state, player).await,
                STAKE_AMOUNT * 10 - STAKE_AMOUNT + paid
            );

            // Value conservation: every unit deposited or swept is
            // still accounted for somewhere.
            let mut total = state::balance(&adb_state, &admin).await + house.pool_balance;
            for (_, public) in &signers {
                total += state::balance(&adb_state, public).await;
            }
            assert_eq!(total, STAKE_AMOUNT * 10 * MAX_PLAYERS_PER_ROUND as u64);

            // Each block advanced the state commitment
            assert_ne!(progress1.state_root, progress2.state_root);
            assert_ne!(progress2.state_root, progress3.state_root);
            assert_eq!(progress3.height, 3);
        });
    }

    #[test]
    fn test_round_two_fills_independently() {
        let executor = Runner::default();
        executor.start(|context| async move {
            let (network_secret, _) = create_network_keypair();
            let (mut adb_state, mut adb_events) = create_adbs(&context).await;
            let (_, admin) = create_account_keypair(0);

            // Two full cohorts across two rounds
            let mut txs = Vec::new();
            for seed in 1..=(2 * MAX_PLAYERS_PER_ROUND as u64) {
                let (private, _) = create_account_keypair(seed);
                txs.push(Transaction::sign(
                    &private,
                    0,
                    Instruction::Deposit {
                        amount: STAKE_AMOUNT,
                    },
                ));
                txs.push(Transaction::sign(
                    &private,
                    1,
                    Instruction::StakeToJoin {
                        amount: STAKE_AMOUNT,
                    },
                ));
            }
            execute_block(
                &network_secret,
                admin,
                &mut adb_state,
                &mut adb_events,
                1,
                txs,
            )
            .await;

            // Both rounds filled and closed, a third opened
            let house = state::house(&adb_state).await;
            assert_eq!(house.current_round, 3);
            assert_eq!(
                house.total_staked,
                STAKE_AMOUNT * 2 * MAX_PLAYERS_PER_ROUND as u64
            );
            assert_eq!(house.next_session_id, 2 * MAX_PLAYERS_PER_ROUND as u64 + 1);
        });
    }
}
