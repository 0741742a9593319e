use super::super::*;
use roundpot_types::engine::{
    CloseReason, Session, ERROR_ALREADY_STAKED_IN_ROUND, ERROR_INSUFFICIENT_FUNDS,
    ERROR_INSUFFICIENT_STAKE, ERROR_ROUND_ALREADY_INACTIVE, ERROR_ROUND_FULL,
    ERROR_ROUND_NOT_ACTIVE, ERROR_SESSION_ALREADY_ACTIVE, ERROR_UNAUTHORIZED, STAKE_AMOUNT,
    TREASURY_SHARE_BPS,
};

impl<'a, S: State> Layer<'a, S> {
    // === Round Handler Methods ===

    pub(in crate::layer) async fn handle_stake_to_join(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Vec<Event> {
        // Admission checks run in a fixed order so a caller failing
        // several of them always sees the same error.
        if amount != STAKE_AMOUNT {
            return vec![Event::EngineError {
                player: public.clone(),
                code: ERROR_INSUFFICIENT_STAKE,
                message: format!("Stake must be exactly {}, got {}", STAKE_AMOUNT, amount),
            }];
        }

        let mut account = load_account(self, public).await;
        if account.balance < amount {
            return vec![Event::EngineError {
                player: public.clone(),
                code: ERROR_INSUFFICIENT_FUNDS,
                message: format!(
                    "Insufficient balance: have {}, need {}",
                    account.balance, amount
                ),
            }];
        }

        let mut house = self.get_or_init_house().await;
        let mut events = Vec::new();
        let mut round = match self.get_round(house.current_round).await {
            Some(round) => {
                if !round.is_active {
                    return vec![Event::EngineError {
                        player: public.clone(),
                        code: ERROR_ROUND_NOT_ACTIVE,
                        message: format!("Round {} is not active", round.id),
                    }];
                }
                round
            }
            // The very first stake opens round 1. Later rounds are
            // opened by the close of their predecessor.
            None => {
                let round = Round::new(house.current_round, self.seed.view);
                events.push(Event::RoundStarted {
                    round_id: round.id,
                    started_at: round.started_at,
                });
                round
            }
        };

        if round.contains_player(public) {
            return vec![Event::EngineError {
                player: public.clone(),
                code: ERROR_ALREADY_STAKED_IN_ROUND,
                message: format!("Already staked in round {}", round.id),
            }];
        }

        if let Some(Value::Session(session)) = self.get(&Key::Session(public.clone())).await {
            if session.is_live() {
                return vec![Event::EngineError {
                    player: public.clone(),
                    code: ERROR_SESSION_ALREADY_ACTIVE,
                    message: format!(
                        "Session {} still has {} plays remaining",
                        session.id, session.plays_remaining
                    ),
                }];
            }
        }

        // Unreachable while rounds auto-close at capacity, kept so a
        // full round can never be overfilled.
        if round.is_full() {
            return vec![Event::EngineError {
                player: public.clone(),
                code: ERROR_ROUND_FULL,
                message: format!("Round {} is full", round.id),
            }];
        }

        // All checks passed: route the stake into the pool and open
        // the session.
        account.balance -= amount;
        self.insert(Key::Account(public.clone()), Value::Account(account));

        house.pool_balance = house.pool_balance.saturating_add(amount);
        house.total_staked = house.total_staked.saturating_add(amount);

        let session_id = house.next_session_id;
        house.next_session_id += 1;
        self.insert(
            Key::Session(public.clone()),
            Value::Session(Session::new(session_id, public.clone(), round.id)),
        );

        round.add_player(public.clone());
        events.push(Event::PlayerJoined {
            round_id: round.id,
            session_id,
            player: public.clone(),
        });

        // The capacity-filling join closes the round within the same
        // operation, so no later join can observe a full open round.
        if round.is_full() {
            events.extend(
                self.close_round(&mut house, &mut round, CloseReason::Full)
                    .await,
            );
        }

        self.insert(Key::Round(round.id), Value::Round(round));
        self.insert(Key::House, Value::House(house));

        events
    }

    pub(in crate::layer) async fn handle_force_end_round(
        &mut self,
        public: &PublicKey,
    ) -> Vec<Event> {
        if public != &self.admin {
            return vec![Event::EngineError {
                player: public.clone(),
                code: ERROR_UNAUTHORIZED,
                message: "Only the admin may force-end a round".to_string(),
            }];
        }

        let mut house = self.get_or_init_house().await;
        let mut round = match self.get_round(house.current_round).await {
            Some(round) if round.is_active => round,
            _ => {
                return vec![Event::EngineError {
                    player: public.clone(),
                    code: ERROR_ROUND_ALREADY_INACTIVE,
                    message: "No open round to end".to_string(),
                }]
            }
        };

        let events = self
            .close_round(&mut house, &mut round, CloseReason::ForcedByAdmin)
            .await;

        self.insert(Key::Round(round.id), Value::Round(round));
        self.insert(Key::House, Value::House(house));

        events
    }

    /// Close `round`, sweep the treasury share of the pool to the
    /// admin account, and open the successor round, all within the
    /// calling operation. The caller stages the mutated round and
    /// house.
    async fn close_round(
        &mut self,
        house: &mut HouseState,
        round: &mut Round,
        reason: CloseReason,
    ) -> Vec<Event> {
        round.is_active = false;
        round.ended_at = self.seed.view;

        let sweep = house.pool_balance.saturating_mul(TREASURY_SHARE_BPS) / 10_000;
        house.pool_balance -= sweep;
        house.total_swept = house.total_swept.saturating_add(sweep);

        let admin = self.admin.clone();
        let mut treasury = load_account(self, &admin).await;
        treasury.balance = treasury.balance.saturating_add(sweep);
        self.insert(Key::Account(admin), Value::Account(treasury));

        let mut events = vec![
            Event::RoundClosed {
                round_id: round.id,
                reason,
                players: round.joined_players.len() as u32,
                ended_at: round.ended_at,
            },
            Event::TreasurySwept {
                round_id: round.id,
                amount: sweep,
            },
        ];

        house.current_round += 1;
        let next = Round::new(house.current_round, self.seed.view);
        events.push(Event::RoundStarted {
            round_id: next.id,
            started_at: next.started_at,
        });
        self.insert(Key::Round(next.id), Value::Round(next));

        events
    }
}
