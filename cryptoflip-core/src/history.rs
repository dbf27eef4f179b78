//! Projection of the contract's game history into display-ready entries.
//!
//! Placeholder entries can be shown when a player has no games yet, but they
//! are always tagged `Illustrative` and never counted as settled data.

use crate::amount::{format_ether, parse_ether};
use crate::types::{HistoryRecord, Side};
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    OnChain,
    Illustrative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub record: HistoryRecord,
    pub provenance: Provenance,
}

impl HistoryEntry {
    pub fn is_authoritative(&self) -> bool {
        self.provenance == Provenance::OnChain
    }

    /// `+0.01 ETH` for a win, `-0.01 ETH` for a loss.
    pub fn signed_amount(&self) -> String {
        let sign = if self.record.won { '+' } else { '-' };
        format!("{}{} ETH", sign, format_ether(self.record.stake))
    }

    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        relative_time(self.record.timestamp, now)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub won: U256,
    pub lost: U256,
}

impl HistorySummary {
    pub fn net_display(&self) -> String {
        if self.won >= self.lost {
            format!("+{} ETH", format_ether(self.won - self.lost))
        } else {
            format!("-{} ETH", format_ether(self.lost - self.won))
        }
    }
}

impl HistoryView {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// No records at all: neither on-chain nor illustrative.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_illustrative(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| !e.is_authoritative())
    }

    pub fn settled_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(|e| e.is_authoritative())
    }

    /// Totals over settled entries only.
    pub fn summary(&self) -> HistorySummary {
        self.settled_entries()
            .fold(HistorySummary::default(), |mut summary, entry| {
                summary.games += 1;
                if entry.record.won {
                    summary.wins += 1;
                    summary.won += entry.record.stake;
                } else {
                    summary.losses += 1;
                    summary.lost += entry.record.stake;
                }
                summary
            })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryProjector {
    illustrative: bool,
}

impl HistoryProjector {
    pub fn new(illustrative: bool) -> Self {
        Self { illustrative }
    }

    /// Keeps the collaborator's order; it is usually newest first but that is
    /// not guaranteed, so nothing here re-sorts.
    pub fn project(
        &self,
        records: Vec<HistoryRecord>,
        player: Address,
        now: DateTime<Utc>,
    ) -> HistoryView {
        if records.is_empty() && self.illustrative {
            return HistoryView {
                entries: placeholder_records(player, now)
                    .into_iter()
                    .map(|record| HistoryEntry {
                        record,
                        provenance: Provenance::Illustrative,
                    })
                    .collect(),
            };
        }

        HistoryView {
            entries: records
                .into_iter()
                .map(|record| HistoryEntry {
                    record,
                    provenance: Provenance::OnChain,
                })
                .collect(),
        }
    }
}

fn placeholder_records(player: Address, now: DateTime<Utc>) -> Vec<HistoryRecord> {
    let sample = |id: u64, stake: &str, chosen: Side, landed: Side, minutes_ago: i64| {
        HistoryRecord {
            id: U256::from(id),
            player,
            stake: parse_ether(stake).unwrap_or_default(),
            chosen_side: chosen,
            landed_side: landed,
            won: chosen == landed,
            timestamp: now - Duration::minutes(minutes_ago),
        }
    };

    vec![
        sample(1, "0.01", Side::Heads, Side::Tails, 5),
        sample(2, "0.02", Side::Tails, Side::Tails, 15),
        sample(3, "0.005", Side::Heads, Side::Heads, 60),
    ]
}

/// Latest projection for the connected player.
#[derive(Debug)]
pub struct HistoryBook {
    projector: HistoryProjector,
    view: RwLock<HistoryView>,
}

impl HistoryBook {
    pub fn new(projector: HistoryProjector) -> Self {
        Self {
            projector,
            view: RwLock::new(HistoryView::default()),
        }
    }

    pub fn update(&self, records: Vec<HistoryRecord>, player: Address) -> HistoryView {
        let view = self.projector.project(records, player, Utc::now());
        *self.view.write() = view.clone();
        view
    }

    pub fn view(&self) -> HistoryView {
        self.view.read().clone()
    }

    pub fn clear(&self) {
        *self.view.write() = HistoryView::default();
    }
}

pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed < Duration::zero() {
        return "just now".to_string();
    }

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "less than a minute ago".to_string()
    } else if minutes == 1 {
        "1 minute ago".to_string()
    } else if minutes < 45 {
        format!("{} minutes ago", minutes)
    } else if minutes < 90 {
        "about 1 hour ago".to_string()
    } else if hours < 24 {
        format!("about {} hours ago", (minutes + 30) / 60)
    } else if hours < 48 {
        "1 day ago".to_string()
    } else if days < 30 {
        format!("{} days ago", days)
    } else {
        format!("on {}", then.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn record(id: u64, won: bool, stake_wei: u64) -> HistoryRecord {
        HistoryRecord {
            id: U256::from(id),
            player: Address::repeat_byte(0xaa),
            stake: U256::from(stake_wei),
            chosen_side: Side::Heads,
            landed_side: if won { Side::Heads } else { Side::Tails },
            won,
            timestamp: now() - Duration::minutes(id as i64),
        }
    }

    #[test]
    fn test_preserves_collaborator_order() {
        let projector = HistoryProjector::new(false);
        let records = vec![record(1, true, 10), record(3, false, 10), record(2, true, 10)];
        let view = projector.project(records, Address::ZERO, now());

        let ids: Vec<U256> = view.entries().iter().map(|e| e.record.id).collect();
        assert_eq!(ids, vec![U256::from(1u64), U256::from(3u64), U256::from(2u64)]);
        assert!(view.entries().iter().all(HistoryEntry::is_authoritative));
    }

    #[test]
    fn test_empty_without_placeholders() {
        let view = HistoryProjector::new(false).project(Vec::new(), Address::ZERO, now());
        assert!(view.is_empty());
        assert!(!view.is_illustrative());
    }

    #[test]
    fn test_placeholders_are_tagged_and_excluded() {
        let player = Address::repeat_byte(0x11);
        let view = HistoryProjector::new(true).project(Vec::new(), player, now());

        assert_eq!(view.entries().len(), 3);
        assert!(view.is_illustrative());
        assert!(view
            .entries()
            .iter()
            .all(|e| e.provenance == Provenance::Illustrative && e.record.player == player));
        assert_eq!(view.settled_entries().count(), 0);
        assert_eq!(view.summary(), HistorySummary::default());
    }

    #[test]
    fn test_real_records_suppress_placeholders() {
        let view =
            HistoryProjector::new(true).project(vec![record(1, false, 10)], Address::ZERO, now());
        assert_eq!(view.entries().len(), 1);
        assert!(!view.is_illustrative());
    }

    #[test]
    fn test_summary_and_signed_amounts() {
        let view = HistoryProjector::new(false).project(
            vec![record(1, true, 30), record(2, false, 10), record(3, false, 5)],
            Address::ZERO,
            now(),
        );

        let summary = view.summary();
        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 2);
        assert_eq!(summary.net_display(), "+0.000000000000000015 ETH");
        assert_eq!(view.entries()[0].signed_amount(), "+0.00000000000000003 ETH");
        assert_eq!(view.entries()[1].signed_amount(), "-0.00000000000000001 ETH");
    }

    #[test]
    fn test_relative_time() {
        let now = now();
        assert_eq!(relative_time(now, now), "less than a minute ago");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::minutes(60), now), "about 1 hour ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "about 5 hours ago");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
        assert_eq!(relative_time(now + Duration::minutes(1), now), "just now");
    }

    #[test]
    fn test_book_keeps_latest_view() {
        let book = HistoryBook::new(HistoryProjector::new(false));
        assert!(book.view().is_empty());

        book.update(vec![record(1, true, 10)], Address::ZERO);
        assert_eq!(book.view().entries().len(), 1);

        book.clear();
        assert!(book.view().is_empty());
    }
}
