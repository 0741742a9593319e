use super::super::*;
use crate::engine::resolve_play;
use roundpot_types::engine::{
    PlayerStats, ERROR_INSUFFICIENT_POOL_BALANCE, ERROR_NO_ACTIVE_SESSION, PLAYS_PER_STAKE,
    STAKE_AMOUNT, WIN_PAYOUT_MULTIPLIER,
};

impl<'a, S: State> Layer<'a, S> {
    // === Play Handler Methods ===

    pub(in crate::layer) async fn handle_play_game(&mut self, public: &PublicKey) -> Vec<Event> {
        let mut session = match self.get(&Key::Session(public.clone())).await {
            Some(Value::Session(s)) if s.is_live() => s,
            _ => {
                return vec![Event::EngineError {
                    player: public.clone(),
                    code: ERROR_NO_ACTIVE_SESSION,
                    message: "No live session, stake to join a round first".to_string(),
                }]
            }
        };

        // Play numbers count up from zero within the session, keeping
        // every play on its own RNG domain.
        let play_number = PLAYS_PER_STAKE - session.plays_remaining;
        let outcome = resolve_play(&self.seed, session.id, play_number);

        let mut house = self.get_or_init_house().await;
        let payout = if outcome.won {
            STAKE_AMOUNT.saturating_mul(WIN_PAYOUT_MULTIPLIER)
        } else {
            0
        };

        // A win the pool cannot pay rejects the whole play without
        // consuming it, so a recorded win always implies a paid win.
        if payout > house.pool_balance {
            return vec![Event::EngineError {
                player: public.clone(),
                code: ERROR_INSUFFICIENT_POOL_BALANCE,
                message: format!(
                    "Pool balance {} cannot cover payout {}",
                    house.pool_balance, payout
                ),
            }];
        }

        if outcome.won {
            house.pool_balance -= payout;
            house.total_paid_out = house.total_paid_out.saturating_add(payout);
            session.total_wins += 1;

            let mut account = load_account(self, public).await;
            account.balance = account.balance.saturating_add(payout);
            self.insert(Key::Account(public.clone()), Value::Account(account));
        }

        session.plays_remaining -= 1;
        if session.plays_remaining == 0 {
            session.is_active = false;
        }

        let mut stats = match self.get(&Key::Stats(public.clone())).await {
            Some(Value::Stats(stats)) => stats,
            _ => PlayerStats::default(),
        };
        stats.record(outcome.won, outcome.limited_edition);

        let event = Event::PlayResolved {
            session_id: session.id,
            player: public.clone(),
            play_number,
            draw: outcome.draw,
            won: outcome.won,
            payout,
            plays_remaining: session.plays_remaining,
            limited_edition: outcome.limited_edition,
        };

        self.insert(Key::Stats(public.clone()), Value::Stats(stats));
        self.insert(Key::Session(public.clone()), Value::Session(session));
        self.insert(Key::House, Value::House(house));

        vec![event]
    }
}
