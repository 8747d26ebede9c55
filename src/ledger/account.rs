use super::config::Currency;
use rust_decimal::Decimal;
use std::collections::VecDeque;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("insufficient {currency} funds: requested {requested}, available {available}")]
    InsufficientFunds {
        currency: Currency,
        requested: Decimal,
        available: Decimal,
    },
}

/// Quantity of a currency acquired by a single buy, still waiting to be sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lot {
    pub amount: Decimal,
    /// Id of the buy that created this lot
    pub origin: usize,
}

/// Portion of a lot consumed by a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotMatch {
    pub amount: Decimal,
    pub origin: usize,
}

/// First-in-first-out queue of open lots. New lots go to the back,
/// withdrawals always consume from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotQueue {
    lots: VecDeque<Lot>,
}

impl LotQueue {
    pub fn push(&mut self, amount: Decimal, origin: usize) {
        self.lots.push_back(Lot { amount, origin });
    }

    /// Consume `amount` from the oldest lots, splitting the last one touched.
    ///
    /// On failure every lot has been consumed and the unmatched shortfall is
    /// returned.
    fn consume(&mut self, amount: Decimal) -> Result<Vec<LotMatch>, Decimal> {
        let mut needed = amount;
        let mut matches = Vec::new();
        while needed > Decimal::ZERO {
            let Some(mut lot) = self.lots.pop_front() else {
                return Err(needed);
            };
            if lot.amount >= needed {
                lot.amount -= needed;
                matches.push(LotMatch {
                    amount: needed,
                    origin: lot.origin,
                });
                if lot.amount > Decimal::ZERO {
                    self.lots.push_front(lot);
                }
                needed = Decimal::ZERO;
            } else {
                needed -= lot.amount;
                matches.push(LotMatch {
                    amount: lot.amount,
                    origin: lot.origin,
                });
            }
        }
        Ok(matches)
    }

    pub fn total(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }
}

/// Balance of a single currency.
///
/// The reference currency is tracked as a raw balance only; every other
/// currency also keeps a [`LotQueue`] so sales can be matched to the buys
/// they dispose of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: Currency,
    /// Balance held before the first entry; zero for accounts the calculator opens
    pub initial_funding: Decimal,
    /// Running total of deposits and withdrawals
    pub external_balance: Decimal,
    /// Running total of trade flow
    pub balance: Decimal,
    lots: Option<LotQueue>,
}

impl Account {
    /// Raw balance tracker without lot detail.
    pub fn plain(name: Currency) -> Self {
        Account {
            name,
            initial_funding: Decimal::ZERO,
            external_balance: Decimal::ZERO,
            balance: Decimal::ZERO,
            lots: None,
        }
    }

    /// Account that matches withdrawals against its lots, oldest first.
    pub fn fifo(name: Currency) -> Self {
        Account {
            lots: Some(LotQueue::default()),
            ..Account::plain(name)
        }
    }

    pub fn add_funds(&mut self, amount: Decimal, origin: usize) {
        if let Some(lots) = self.lots.as_mut() {
            lots.push(amount, origin);
        }
        self.balance += amount;
        log::debug!(
            "Account {} ADD: {} (lot origin {}). Balance: {}",
            self.name,
            amount,
            origin,
            self.balance
        );
    }

    /// Withdraw `amount`, returning the lots it was matched against
    /// (oldest first). A plain account never matches any lots.
    ///
    /// The balance is reduced by the full amount even when the lots cannot
    /// cover it, so a failed withdrawal leaves a negative balance behind.
    pub fn remove_funds(&mut self, amount: Decimal) -> Result<Vec<LotMatch>, AccountError> {
        self.balance -= amount;
        log::debug!(
            "Account {} REMOVE: {}. Balance: {}",
            self.name,
            amount,
            self.balance
        );
        let Some(lots) = self.lots.as_mut() else {
            return Ok(Vec::new());
        };
        let available = lots.total();
        lots.consume(amount)
            .map_err(|_shortfall| AccountError::InsufficientFunds {
                currency: self.name.clone(),
                requested: amount,
                available,
            })
    }

    pub fn track_external_transfer(&mut self, change: Decimal) {
        self.external_balance += change;
    }

    pub fn corrected_balance(&self) -> Decimal {
        self.initial_funding + self.external_balance + self.balance
    }

    pub fn lots(&self) -> Option<&LotQueue> {
        self.lots.as_ref()
    }

    pub fn has_lots(&self) -> bool {
        self.lots.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc() -> Account {
        Account::fifo(Currency::new("BTC"))
    }

    fn lot_amounts(account: &Account) -> Vec<(Decimal, usize)> {
        account
            .lots()
            .unwrap()
            .iter()
            .map(|lot| (lot.amount, lot.origin))
            .collect()
    }

    #[test]
    fn fifo_consumes_oldest_lots_first() {
        let mut account = btc();
        account.add_funds(dec!(2), 1);
        account.add_funds(dec!(3), 2);
        account.add_funds(dec!(1), 3);

        let matches = account.remove_funds(dec!(4)).unwrap();
        assert_eq!(
            matches,
            vec![
                LotMatch {
                    amount: dec!(2),
                    origin: 1
                },
                LotMatch {
                    amount: dec!(2),
                    origin: 2
                },
            ]
        );
        assert_eq!(lot_amounts(&account), vec![(dec!(1), 2), (dec!(1), 3)]);
        assert_eq!(account.balance, dec!(2));
    }

    #[test]
    fn exact_lot_is_removed_entirely() {
        let mut account = btc();
        account.add_funds(dec!(1.5), 0);
        account.add_funds(dec!(0.5), 1);

        let matches = account.remove_funds(dec!(1.5)).unwrap();
        assert_eq!(
            matches,
            vec![LotMatch {
                amount: dec!(1.5),
                origin: 0
            }]
        );
        assert_eq!(lot_amounts(&account), vec![(dec!(0.5), 1)]);
    }

    #[test]
    fn matched_amounts_sum_to_request_exactly() {
        let mut account = btc();
        account.add_funds(dec!(0.1), 0);
        account.add_funds(dec!(0.2), 1);
        account.add_funds(dec!(0.30000001), 2);

        let requested = dec!(0.56789);
        let matches = account.remove_funds(requested).unwrap();
        let total: Decimal = matches.iter().map(|m| m.amount).sum();
        assert_eq!(total, requested);
        assert_eq!(account.lots().unwrap().total(), account.balance);
        assert_eq!(account.balance, dec!(0.03211001));
    }

    #[test]
    fn insufficient_funds_empties_queue_and_decrements_balance() {
        let mut account = btc();
        account.add_funds(dec!(1.0), 0);

        let err = account.remove_funds(dec!(2.0)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                currency: Currency::new("BTC"),
                requested: dec!(2.0),
                available: dec!(1.0),
            }
        );
        assert!(account.lots().unwrap().is_empty());
        assert_eq!(account.balance, dec!(-1.0));
    }

    #[test]
    fn withdrawal_from_empty_account_fails() {
        let mut account = btc();
        assert!(account.remove_funds(dec!(0.1)).is_err());
        assert_eq!(account.balance, dec!(-0.1));
    }

    #[test]
    fn plain_account_tracks_raw_balance_only() {
        let mut account = Account::plain(Currency::new("EUR"));
        account.add_funds(dec!(100), 7);
        assert_eq!(account.remove_funds(dec!(250)), Ok(vec![]));
        assert_eq!(account.balance, dec!(-150));
        assert!(account.lots().is_none());
    }

    #[test]
    fn corrected_balance_includes_funding_and_transfers() {
        let mut account = btc();
        account.initial_funding = dec!(0.5);
        account.add_funds(dec!(2), 0);
        account.remove_funds(dec!(1)).unwrap();
        account.track_external_transfer(dec!(-0.25));
        assert_eq!(account.corrected_balance(), dec!(1.25));
    }
}
