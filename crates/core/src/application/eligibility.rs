//! Eligibility - Decides whether a waiting customer should be alerted now
//!
//! Two queueing disciplines:
//! - Specific barber: a dedicated FIFO per barber, only its head is alerted
//! - Any barber: the shop-wide FIFO, alerted at the front or once the
//!   optimistic wait estimate drops to the shop's threshold

use crate::domain::{Barber, EntryStatus, QueueEntry};
use crate::port::QueueScope;

/// Shop snapshot an entry is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct ShopSnapshot<'a> {
    /// Waiting entries ordered by `joined_at` ascending
    pub queue: &'a [QueueEntry],
    pub barbers: &'a [Barber],
    pub notify_threshold: i64,
}

/// Why an entry is (or is not) eligible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// First in line for the barber it requested
    HeadOfBarberLine,
    /// Someone is ahead of it in its barber's line
    BehindInBarberLine { position: usize },
    /// First in the shop-wide line
    FrontOfShop,
    WithinThreshold { position: usize, estimated_wait: i64 },
    BeyondThreshold { position: usize, estimated_wait: i64 },
    /// No barber to base an estimate on
    NoEstimate { position: usize },
    /// The entry is not in the waiting line it belongs to
    NotInQueue,
}

impl Assessment {
    pub fn should_notify(&self) -> bool {
        matches!(
            self,
            Assessment::HeadOfBarberLine
                | Assessment::FrontOfShop
                | Assessment::WithinThreshold { .. }
        )
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Assessment::HeadOfBarberLine | Assessment::FrontOfShop => Some(0),
            Assessment::BehindInBarberLine { position }
            | Assessment::WithinThreshold { position, .. }
            | Assessment::BeyondThreshold { position, .. }
            | Assessment::NoEstimate { position } => Some(*position),
            Assessment::NotInQueue => None,
        }
    }

    pub fn estimated_wait(&self) -> Option<i64> {
        match self {
            Assessment::WithinThreshold { estimated_wait, .. }
            | Assessment::BeyondThreshold { estimated_wait, .. } => Some(*estimated_wait),
            _ => None,
        }
    }
}

/// Fastest barber's average cut time, missing values counted as the default.
/// `None` when the shop has no barbers.
pub fn fastest_cut_time(barbers: &[Barber]) -> Option<i64> {
    barbers.iter().map(Barber::effective_cut_time).min()
}

/// Assess one entry against its shop snapshot
///
/// The snapshot's queue may be the whole shop or already narrowed to the
/// entry's barber; the line the entry belongs to is rebuilt from it either
/// way, preserving order.
pub fn assess(target: &QueueEntry, shop: &ShopSnapshot<'_>) -> Assessment {
    let scope = QueueScope::for_entry(target);
    let position = shop
        .queue
        .iter()
        .filter(|e| e.shop_id == target.shop_id && e.status == EntryStatus::Waiting)
        .filter(|e| match &scope {
            QueueScope::WholeShop => true,
            QueueScope::Barber(id) => e.requested_barber_id.as_ref() == Some(id),
        })
        .position(|e| e.id == target.id);

    let Some(position) = position else {
        return Assessment::NotInQueue;
    };

    match scope {
        QueueScope::Barber(_) if position == 0 => Assessment::HeadOfBarberLine,
        QueueScope::Barber(_) => Assessment::BehindInBarberLine { position },
        QueueScope::WholeShop if position == 0 => Assessment::FrontOfShop,
        QueueScope::WholeShop => {
            let Some(per_customer) = fastest_cut_time(shop.barbers) else {
                return Assessment::NoEstimate { position };
            };
            let estimated_wait = per_customer.saturating_mul(position as i64);
            if estimated_wait <= shop.notify_threshold {
                Assessment::WithinThreshold {
                    position,
                    estimated_wait,
                }
            } else {
                Assessment::BeyondThreshold {
                    position,
                    estimated_wait,
                }
            }
        }
    }
}

/// Whether the entry should be alerted right now
pub fn should_notify(target: &QueueEntry, shop: &ShopSnapshot<'_>) -> bool {
    assess(target, shop).should_notify()
}
