use super::account::{Account, AccountError, LotMatch};
use super::config::{Config, Currency};
use super::events::{is_long_term, TaxEvent, TaxEventKind};
use super::transaction::{ExternalTransaction, LedgerEntry, Transaction};
use super::warnings::Warning;
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Per calendar year aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct YearTotals {
    pub fees: Decimal,
    /// Taxable gain/loss: long-term gains excluded, long-term losses included
    pub net_gain: Decimal,
}

/// Corrected balance of every account, keyed by currency
pub type BalanceSnapshot = BTreeMap<Currency, Decimal>;

/// Everything a single run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReport {
    pub tax_events: BTreeMap<i32, Vec<TaxEvent>>,
    pub totals: BTreeMap<i32, YearTotals>,
    /// End of year balances
    pub snapshots: BTreeMap<i32, BalanceSnapshot>,
    /// Account state after the last transaction
    pub accounts: BTreeMap<Currency, Account>,
    pub warnings: Vec<Warning>,
}

impl LedgerReport {
    /// Years with at least one tax event, ascending
    pub fn years(&self) -> Vec<i32> {
        self.tax_events.keys().copied().collect()
    }

    /// All tax events in processing (chronological) order
    pub fn events(&self) -> impl Iterator<Item = &TaxEvent> {
        self.tax_events.values().flatten()
    }

    pub fn events_in(&self, year: i32) -> &[TaxEvent] {
        self.tax_events
            .get(&year)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn totals_for(&self, year: i32) -> YearTotals {
        self.totals.get(&year).copied().unwrap_or_default()
    }

    /// Sum of long-term gains left out of the year's net gain
    pub fn exempt_gain(&self, year: i32) -> Decimal {
        self.events_in(year)
            .iter()
            .filter(|e| !e.counts_towards_gain())
            .map(|e| e.realized_gain)
            .sum()
    }

    pub fn snapshot(&self, year: i32) -> Option<&BalanceSnapshot> {
        self.snapshots.get(&year)
    }
}

enum Classification {
    Sell { rate: Decimal, matches: Vec<LotMatch> },
    Buy { rate: Decimal },
    Unclassifiable,
}

/// Builds the tax ledger from a batch of entries. One instance handles
/// exactly one run; [`Calculator::run`] consumes it.
#[derive(Debug)]
pub struct Calculator {
    config: Config,
    accounts: BTreeMap<Currency, Account>,
    tax_events: BTreeMap<i32, Vec<TaxEvent>>,
    buy_events: HashMap<usize, Arc<TaxEvent>>,
    snapshots: BTreeMap<i32, BalanceSnapshot>,
    warnings: Vec<Warning>,
    next_buy_id: usize,
    next_sell_id: usize,
    next_external_id: usize,
}

impl Calculator {
    pub fn new(config: Config) -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert(config.fiat.clone(), Account::plain(config.fiat.clone()));
        Calculator {
            config,
            accounts,
            tax_events: BTreeMap::new(),
            buy_events: HashMap::new(),
            snapshots: BTreeMap::new(),
            warnings: Vec::new(),
            next_buy_id: 0,
            next_sell_id: 0,
            next_external_id: 0,
        }
    }

    /// Process `entries` in timestamp order (ties keep their input order)
    /// and return the resulting ledger.
    pub fn run(mut self, mut entries: Vec<LedgerEntry>) -> LedgerReport {
        entries.sort_by_key(LedgerEntry::timestamp);
        log::info!(
            "Processing {} entries against {}",
            entries.len(),
            self.config.fiat
        );

        let mut current_year: Option<i32> = None;
        for entry in &entries {
            let year = entry.timestamp().year();
            if current_year != Some(year) {
                if let Some(previous) = current_year {
                    self.snapshot_accounts(previous);
                }
                current_year = Some(year);
            }

            match entry {
                LedgerEntry::Trade(tx) => self.process_trade(tx),
                LedgerEntry::External(ext) => self.process_external(ext),
            }
        }
        if let Some(year) = current_year {
            self.snapshot_accounts(year);
        }

        let totals = self
            .tax_events
            .iter()
            .map(|(year, events)| (*year, totals_for_events(events)))
            .collect();

        LedgerReport {
            tax_events: self.tax_events,
            totals,
            snapshots: self.snapshots,
            accounts: self.accounts,
            warnings: self.warnings,
        }
    }

    fn process_external(&mut self, ext: &ExternalTransaction) {
        self.account_mut(&ext.currency)
            .track_external_transfer(ext.change_amount);

        let id = self.next_external_id;
        self.next_external_id += 1;
        self.record(TaxEvent {
            id,
            kind: TaxEventKind::External,
            timestamp: ext.timestamp,
            currency: ext.currency.clone(),
            realized_gain: Decimal::ZERO,
            exchange_rate: Decimal::ZERO,
            fiat_amount: Decimal::ZERO,
            crypto_amount: ext.change_amount,
            reference: ext.reference.clone(),
            fees: Decimal::ZERO,
            source_event: None,
            long_term: false,
        });
    }

    fn process_trade(&mut self, tx: &Transaction) {
        let matches = match self.account_mut(&tx.source_currency).remove_funds(tx.source_amount) {
            Ok(matches) => matches,
            Err(AccountError::InsufficientFunds {
                currency,
                requested,
                available,
            }) => {
                log::warn!(
                    "Insufficient funds for {}: tried to remove {} {} with {} available",
                    tx,
                    requested,
                    currency,
                    available
                );
                self.warnings.push(Warning::InsufficientFunds {
                    timestamp: tx.timestamp,
                    reference: tx.reference.clone(),
                    currency,
                    requested,
                    available,
                });
                Vec::new()
            }
        };

        // Lots created by this trade belong to the next buy id; the id is
        // only registered if the trade turns out to be a buy.
        let lot_origin = self.next_buy_id;
        let target = self.account_mut(&tx.target_currency);
        target.add_funds(tx.target_amount, lot_origin);
        let target_has_lots = target.has_lots();

        match self.classify(tx, matches) {
            Classification::Sell { rate, matches } => self.record_sells(tx, rate, matches),
            Classification::Buy { rate } => self.record_buy(tx, rate),
            Classification::Unclassifiable => {
                if target_has_lots {
                    // keep the orphaned lots from being attributed to a later buy
                    self.next_buy_id += 1;
                }
                log::warn!("Skipping unclassifiable trade: {}", tx);
                self.warnings.push(Warning::UnclassifiableTrade {
                    timestamp: tx.timestamp,
                    reference: tx.reference.clone(),
                    source_currency: tx.source_currency.clone(),
                    target_currency: tx.target_currency.clone(),
                });
            }
        }
    }

    fn classify(&self, tx: &Transaction, matches: Vec<LotMatch>) -> Classification {
        let fiat = &self.config.fiat;
        match tx.exchange_rate(fiat) {
            Some(rate) if tx.target_currency == *fiat && !matches.is_empty() => {
                Classification::Sell { rate, matches }
            }
            Some(rate) if tx.source_currency == *fiat => Classification::Buy { rate },
            _ => Classification::Unclassifiable,
        }
    }

    fn record_sells(&mut self, tx: &Transaction, rate: Decimal, matches: Vec<LotMatch>) {
        for lot in matches {
            let Some(buy) = self.buy_events.get(&lot.origin).cloned() else {
                log::warn!(
                    "No buy recorded for lot {} consumed by {}, skipping {} {}",
                    lot.origin,
                    tx,
                    lot.amount,
                    tx.source_currency
                );
                self.warnings.push(Warning::UnknownLotOrigin {
                    timestamp: tx.timestamp,
                    reference: tx.reference.clone(),
                    currency: tx.source_currency.clone(),
                    amount: lot.amount,
                });
                continue;
            };

            let buy_price = lot.amount * buy.exchange_rate;
            let sell_price = lot.amount * rate;
            let long_term = is_long_term(buy.timestamp, tx.timestamp);
            log::debug!(
                "Sell {} {} matched {}: cost {}, proceeds {}, long term {}",
                lot.amount,
                tx.source_currency,
                buy.display_id(),
                buy_price,
                sell_price,
                long_term
            );

            let id = self.next_sell_id;
            self.next_sell_id += 1;
            self.record(TaxEvent {
                id,
                kind: TaxEventKind::Sell,
                timestamp: tx.timestamp,
                currency: tx.source_currency.clone(),
                realized_gain: sell_price - buy_price,
                exchange_rate: rate,
                fiat_amount: sell_price,
                crypto_amount: lot.amount,
                reference: tx.reference.clone(),
                fees: tx.fees,
                source_event: Some(buy),
                long_term,
            });
        }
    }

    fn record_buy(&mut self, tx: &Transaction, rate: Decimal) {
        let id = self.next_buy_id;
        self.next_buy_id += 1;
        let event = Arc::new(TaxEvent {
            id,
            kind: TaxEventKind::Buy,
            timestamp: tx.timestamp,
            currency: tx.target_currency.clone(),
            realized_gain: Decimal::ZERO,
            exchange_rate: rate,
            fiat_amount: tx.source_amount,
            crypto_amount: tx.target_amount,
            reference: tx.reference.clone(),
            fees: tx.fees,
            source_event: None,
            long_term: false,
        });
        self.buy_events.insert(id, Arc::clone(&event));
        self.record(TaxEvent::clone(&event));
    }

    fn record(&mut self, event: TaxEvent) {
        self.tax_events
            .entry(event.timestamp.year())
            .or_default()
            .push(event);
    }

    fn account_mut(&mut self, currency: &Currency) -> &mut Account {
        self.accounts
            .entry(currency.clone())
            .or_insert_with(|| Account::fifo(currency.clone()))
    }

    fn snapshot_accounts(&mut self, year: i32) {
        let snapshot = self
            .accounts
            .iter()
            .map(|(currency, account)| (currency.clone(), account.corrected_balance()))
            .collect();
        self.snapshots.insert(year, snapshot);
    }
}

fn totals_for_events(events: &[TaxEvent]) -> YearTotals {
    YearTotals {
        fees: events.iter().map(|e| e.fees).sum(),
        net_gain: events
            .iter()
            .filter(|e| e.counts_towards_gain())
            .map(|e| e.realized_gain)
            .sum(),
    }
}
