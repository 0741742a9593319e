use super::super::*;

impl<'a, S: State> Layer<'a, S> {
    // === Account Handler Methods ===

    pub(in crate::layer) async fn handle_deposit(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Vec<Event> {
        let mut account = load_account(self, public).await;
        account.balance = account.balance.saturating_add(amount);
        let balance = account.balance;

        self.insert(Key::Account(public.clone()), Value::Account(account));

        vec![Event::Deposited {
            player: public.clone(),
            amount,
            balance,
        }]
    }
}
