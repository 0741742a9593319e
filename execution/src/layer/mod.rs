use commonware_consensus::threshold_simplex::types::View;
use commonware_cryptography::ed25519::PublicKey;
#[cfg(feature = "parallel")]
use commonware_runtime::ThreadPool;
use roundpot_types::{
    engine::{HouseState, Round},
    execution::{Event, Instruction, Key, Output, Transaction, Value},
    Seed,
};
use std::collections::BTreeMap;

use crate::state::{load_account, validate_and_increment_nonce, PrepareError, State, Status};

mod handlers;

/// Transaction execution overlay for one block.
///
/// Reads fall through to the backing state, writes stage into a pending
/// map until [`Layer::commit`]. A handler that returns an error event
/// without staging anything leaves state untouched, which is how failed
/// instructions stay atomic.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,

    admin: PublicKey,
    seed: Seed,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, admin: PublicKey, seed: Seed) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),

            admin,
            seed,
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    pub fn view(&self) -> View {
        self.seed.view
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public).await;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        );

        Ok(())
    }

    async fn apply(&mut self, transaction: &Transaction) -> Vec<Event> {
        match &transaction.instruction {
            Instruction::Deposit { amount } => {
                self.handle_deposit(&transaction.public, *amount).await
            }
            Instruction::StakeToJoin { amount } => {
                self.handle_stake_to_join(&transaction.public, *amount).await
            }
            Instruction::PlayGame => self.handle_play_game(&transaction.public).await,
            Instruction::ForceEndRound => self.handle_force_end_round(&transaction.public).await,
        }
    }

    async fn get_or_init_house(&mut self) -> HouseState {
        match self.get(&Key::House).await {
            Some(Value::House(h)) => h,
            _ => HouseState::new(),
        }
    }

    /// Load the round the house points at. The round record itself is
    /// created lazily by the first join, so a missing record means an
    /// empty round that has not opened yet.
    async fn get_round(&mut self, id: u64) -> Option<Round> {
        match self.get(&Key::Round(id)).await {
            Some(Value::Round(round)) => Some(round),
            _ => None,
        }
    }

    pub async fn execute(
        &mut self,
        #[cfg(feature = "parallel")] _pool: ThreadPool,
        transactions: Vec<Transaction>,
    ) -> (Vec<Output>, BTreeMap<PublicKey, u64>) {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            if self.prepare(&tx).await.is_err() {
                continue;
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));
            outputs.extend(self.apply(&tx).await.into_iter().map(Output::Event));
            outputs.push(Output::Transaction(tx));
        }

        (outputs, processed_nonces)
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Option<Value> {
        match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await,
        }
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    async fn delete(&mut self, key: &Key) {
        self.pending.insert(key.clone(), Status::Delete);
    }
}
