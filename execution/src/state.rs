use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_runtime::{Clock, Metrics, Spawner, Storage};
use commonware_storage::{adb::any::variable::Any, translator::Translator};
use roundpot_types::{
    engine::{HouseState, PlayerStats, Round, Session},
    execution::{Account, Key, Transaction, Value},
};
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
};
use tracing::warn;

pub type Adb<E, T> = Any<E, Digest, Value, Sha256, T>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepareError {
    NonceMismatch { expected: u64, got: u64 },
}

pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Option<Value>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = ()>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = ()>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = ()> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await,
                    Status::Delete => self.delete(&key).await,
                }
            }
        }
    }
}

impl<E: Spawner + Metrics + Clock + Storage, T: Translator> State for Adb<E, T> {
    async fn get(&self, key: &Key) -> Option<Value> {
        let key = Sha256::hash(&key.encode());
        match self.get(&key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Database error during get operation: {:?}", e);
                None
            }
        }
    }

    async fn insert(&mut self, key: Key, value: Value) {
        let key = Sha256::hash(&key.encode());
        if let Err(e) = self.update(key, value).await {
            warn!("Database error during insert operation: {:?}", e);
        }
    }

    async fn delete(&mut self, key: &Key) {
        let key = Sha256::hash(&key.encode());
        if let Err(e) = self.delete(key).await {
            warn!("Database error during delete operation: {:?}", e);
        }
    }
}

#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl State for Memory {
    async fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
    }

    async fn delete(&mut self, key: &Key) {
        self.state.remove(key);
    }
}

#[derive(Clone)]
pub enum Status {
    Update(Value),
    Delete,
}

impl Write for Status {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Status::Update(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Status::Delete => 1u8.write(writer),
        }
    }
}

impl Read for Status {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Status::Update(Value::read(reader)?)),
            1 => Ok(Status::Delete),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Status {
    fn encode_size(&self) -> usize {
        1 + match self {
            Status::Update(value) => value.encode_size(),
            Status::Delete => 0,
        }
    }
}

pub async fn nonce<S: State>(state: &S, public: &PublicKey) -> u64 {
    load_account(state, public).await.nonce
}

pub async fn balance<S: State>(state: &S, public: &PublicKey) -> u64 {
    load_account(state, public).await.balance
}

/// Read the engine context, defaulting to the pristine state if no
/// transaction has touched it yet.
pub async fn house<S: State>(state: &S) -> HouseState {
    match state.get(&Key::House).await {
        Some(Value::House(house)) => house,
        _ => HouseState::new(),
    }
}

/// Read the currently open round, if any transaction has created it.
pub async fn current_round<S: State>(state: &S) -> Option<Round> {
    let house = house(state).await;
    match state.get(&Key::Round(house.current_round)).await {
        Some(Value::Round(round)) => Some(round),
        _ => None,
    }
}

/// Read a player's session, falling back to the inactive placeholder
/// for a player who never staked.
pub async fn player_session<S: State>(state: &S, public: &PublicKey) -> Session {
    match state.get(&Key::Session(public.clone())).await {
        Some(Value::Session(session)) => session,
        _ => Session::empty(public.clone()),
    }
}

pub async fn player_stats<S: State>(state: &S, public: &PublicKey) -> PlayerStats {
    match state.get(&Key::Stats(public.clone())).await {
        Some(Value::Stats(stats)) => stats,
        _ => PlayerStats::default(),
    }
}

pub(crate) async fn load_account<S: State>(state: &S, public: &PublicKey) -> Account {
    match state.get(&Key::Account(public.clone())).await {
        Some(Value::Account(account)) => account,
        _ => Account::default(),
    }
}

pub(crate) fn validate_and_increment_nonce(
    account: &mut Account,
    provided_nonce: u64,
) -> Result<(), PrepareError> {
    if account.nonce != provided_nonce {
        return Err(PrepareError::NonceMismatch {
            expected: account.nonce,
            got: provided_nonce,
        });
    }
    account.nonce += 1;
    Ok(())
}

pub struct Noncer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
}

impl<'a, S: State> Noncer<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
        }
    }

    pub async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public).await;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        )
        .await;

        Ok(())
    }
}

impl<'a, S: State> State for Noncer<'a, S> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;
    use roundpot_types::execution::Instruction;

    #[test]
    fn test_noncer_tracks_pending_nonces() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let mut noncer = Noncer::new(&state);

            let (signer, public) = create_account_keypair(1);

            // A fresh account admits only nonce 0, then each successor
            // in order, without touching the backing state.
            let tx = Transaction::sign(&signer, 0, Instruction::Deposit { amount: 1 });
            assert!(noncer.prepare(&tx).await.is_ok());
            let tx = Transaction::sign(&signer, 1, Instruction::Deposit { amount: 1 });
            assert!(noncer.prepare(&tx).await.is_ok());

            let tx = Transaction::sign(&signer, 1, Instruction::Deposit { amount: 1 });
            assert_eq!(
                noncer.prepare(&tx).await,
                Err(PrepareError::NonceMismatch {
                    expected: 2,
                    got: 1
                })
            );

            assert_eq!(nonce(&noncer, &public).await, 2);
            assert_eq!(nonce(&state, &public).await, 0);
        });
    }

    #[test]
    fn test_session_projection_defaults_for_unknown_player() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let (_, public) = create_account_keypair(7);

            // A player who never staked still projects a session, just
            // an inactive one with nothing to play.
            let session = player_session(&state, &public).await;
            assert_eq!(session.owner, public);
            assert_eq!(session.id, 0);
            assert_eq!(session.plays_remaining, 0);
            assert!(!session.is_active);
            assert!(!session.is_live());
            assert_eq!(session.origin_round, 0);
        });
    }

    #[test]
    fn test_status_codec_roundtrip() {
        use commonware_codec::Encode as _;

        let account = Account {
            nonce: 3,
            balance: 77,
        };
        let update = Status::Update(Value::Account(account.clone()));
        let encoded = update.encode();
        match Status::read(&mut &encoded[..]).unwrap() {
            Status::Update(Value::Account(decoded)) => assert_eq!(decoded, account),
            _ => panic!("expected account update"),
        }

        let encoded = Status::Delete.encode();
        assert!(matches!(
            Status::read(&mut &encoded[..]).unwrap(),
            Status::Delete
        ));
    }
}
