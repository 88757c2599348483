use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use log::{debug, error};
use rust_decimal::Decimal;

use super::dividends_model::{
    DividendRecord, DividendStatistics, MonthlyDividend, StatementTransaction, YearChange,
};
use super::statement_parser::parse_dividend;
use crate::errors::Result;
use crate::metadata::MetadataRegistryTrait;
use crate::storage::DividendLedgerTrait;

pub trait DividendServiceTrait: Send + Sync {
    /// Reconciles a statement batch against the durable ledger and returns
    /// the merged ledger. New records are appended; the ledger file is only
    /// touched when there is something new to write.
    fn sync_ledger(&self, statements: &[StatementTransaction]) -> Result<Vec<DividendRecord>>;

    /// Aggregated dividend statistics over the whole ledger as of `today`.
    fn statistics(&self, today: NaiveDate) -> Result<DividendStatistics>;
}

pub struct DividendService {
    ledger: Arc<dyn DividendLedgerTrait>,
    registry: Arc<dyn MetadataRegistryTrait>,
}

impl DividendService {
    pub fn new(
        ledger: Arc<dyn DividendLedgerTrait>,
        registry: Arc<dyn MetadataRegistryTrait>,
    ) -> Self {
        DividendService { ledger, registry }
    }
}

impl DividendServiceTrait for DividendService {
    fn sync_ledger(&self, statements: &[StatementTransaction]) -> Result<Vec<DividendRecord>> {
        let mut all = self.ledger.get_all()?;
        let mut seen: HashSet<_> = all.iter().map(DividendRecord::identity).collect();

        let mut new_records = Vec::new();
        for txn in statements {
            let Some(record) = parse_dividend(txn, self.registry.as_ref()) else {
                continue;
            };
            if seen.contains(&record.identity()) {
                // Two distinct same-day payouts with equal amounts from one
                // company collide on this key; flagged for clarification.
                if let Some(existing) = all
                    .iter()
                    .find(|r| r.identity() == record.identity() && r.wkn != record.wkn)
                {
                    debug!(
                        "Dividend key collision on {} / {} between WKNs {:?} and {:?}",
                        record.date, record.company, existing.wkn, record.wkn
                    );
                }
                continue;
            }
            seen.insert(record.identity());
            new_records.push(record);
        }

        if new_records.is_empty() {
            debug!("No new dividends found in statement batch");
        } else {
            match self.ledger.append(&new_records) {
                Ok(()) => debug!("Stored {} new dividends to the ledger", new_records.len()),
                // Skip this cycle's write; the records are re-staged on the
                // next run since the durable ledger never saw them.
                Err(e) => error!("Failed to persist dividend ledger: {}", e),
            }
        }

        all.extend(new_records);
        Ok(all)
    }

    fn statistics(&self, today: NaiveDate) -> Result<DividendStatistics> {
        let ledger = self.ledger.get_all()?;
        if ledger.is_empty() {
            return Ok(DividendStatistics::default());
        }

        let total: Decimal = ledger.iter().map(|r| r.amount).sum();

        let mut per_year: BTreeMap<i32, Decimal> = BTreeMap::new();
        for record in &ledger {
            *per_year.entry(record.date.year()).or_default() += record.amount;
        }

        let mut year_changes = Vec::with_capacity(per_year.len());
        let mut previous: Option<Decimal> = None;
        for (&year, &amount) in &per_year {
            let change_pct = previous
                .filter(|prev| *prev > Decimal::ZERO)
                .map(|prev| (amount - prev) / prev * Decimal::ONE_HUNDRED);
            year_changes.push(YearChange {
                year,
                amount,
                change_pct,
            });
            previous = Some(amount);
        }

        let window_start = today - Duration::days(365);
        let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
        for record in &ledger {
            if record.date >= window_start {
                *by_month
                    .entry((record.date.year(), record.date.month()))
                    .or_default() += record.amount;
            }
        }

        let window_total: Decimal = by_month.values().copied().sum();
        let avg_12_months = if by_month.is_empty() {
            Decimal::ZERO
        } else {
            window_total / Decimal::from(12)
        };

        let last_12_months = by_month
            .into_iter()
            .map(|((year, month), amount)| MonthlyDividend {
                month: month_label(year, month),
                amount,
            })
            .collect();

        Ok(DividendStatistics {
            total,
            per_year,
            year_changes,
            avg_12_months,
            last_12_months,
        })
    }
}

fn month_label(year: i32, month: u32) -> String {
    // chrono's %b needs a full date; the first of the month works
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}
