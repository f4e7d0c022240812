//! # Query Filters
//!
//! Optional predicates composed with AND semantics. An absent filter is a
//! no-op. Stores translate these into SQL; [`SaleFilter::matches`] and
//! friends express the same semantics in memory.
//!
//! ## Range Bounds
//! ```text
//!   Sales:            [from, to)     from included, to excluded
//!   Salaries:         [from, to]     both ends included
//!   Worker dates:     [from, to]     both ends included
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Sale, Worker};

// =============================================================================
// Date Range
// =============================================================================

/// A checked date range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl DateRange {
    /// Fails with [`CoreError::IncorrectDates`] when `from > to`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use giftshop_core::DateRange;
    ///
    /// let now = Utc::now();
    /// assert!(DateRange::new(now, now).is_ok());
    /// assert!(DateRange::new(now, now - Duration::days(1)).is_err());
    /// ```
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> CoreResult<Self> {
        if from > to {
            return Err(CoreError::IncorrectDates { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// `from <= at < to`
    pub fn contains_half_open(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.to
    }

    /// `from <= at <= to`
    pub fn contains_inclusive(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

// =============================================================================
// Sale Filter
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    /// Half-open period on `sale_date`.
    pub period: Option<DateRange>,
    pub worker_id: Option<String>,
    pub buyer_id: Option<String>,
    /// Sale must contain a line item for this gift.
    pub gift_id: Option<String>,
}

impl SaleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, range: DateRange) -> Self {
        self.period = Some(range);
        self
    }

    pub fn worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    pub fn buyer(mut self, buyer_id: impl Into<String>) -> Self {
        self.buyer_id = Some(buyer_id.into());
        self
    }

    pub fn gift(mut self, gift_id: impl Into<String>) -> Self {
        self.gift_id = Some(gift_id.into());
        self
    }

    /// In-memory evaluation of the filter against a loaded sale.
    pub fn matches(&self, sale: &Sale) -> bool {
        self.period
            .map_or(true, |p| p.contains_half_open(sale.sale_date))
            && self
                .worker_id
                .as_ref()
                .map_or(true, |id| &sale.worker_id == id)
            && self
                .buyer_id
                .as_ref()
                .map_or(true, |id| sale.buyer_id.as_ref() == Some(id))
            && self
                .gift_id
                .as_ref()
                .map_or(true, |id| sale.contains_gift(id))
    }
}

// =============================================================================
// Worker Filter
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFilter {
    /// Skip soft-deleted workers. Defaults to true.
    pub only_active: bool,
    pub post_id: Option<String>,
    /// Inclusive range on `birth_date`.
    pub birth_date: Option<DateRange>,
    /// Inclusive range on `employment_date`.
    pub employment_date: Option<DateRange>,
}

impl Default for WorkerFilter {
    fn default() -> Self {
        Self {
            only_active: true,
            post_id: None,
            birth_date: None,
            employment_date: None,
        }
    }
}

impl WorkerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_deleted(mut self) -> Self {
        self.only_active = false;
        self
    }

    pub fn post(mut self, post_id: impl Into<String>) -> Self {
        self.post_id = Some(post_id.into());
        self
    }

    pub fn born_between(mut self, range: DateRange) -> Self {
        self.birth_date = Some(range);
        self
    }

    pub fn employed_between(mut self, range: DateRange) -> Self {
        self.employment_date = Some(range);
        self
    }

    pub fn matches(&self, worker: &Worker) -> bool {
        (!self.only_active || !worker.is_deleted)
            && self
                .post_id
                .as_ref()
                .map_or(true, |id| &worker.post_id == id)
            && self
                .birth_date
                .map_or(true, |r| r.contains_inclusive(worker.birth_date))
            && self
                .employment_date
                .map_or(true, |r| r.contains_inclusive(worker.employment_date))
    }
}

// =============================================================================
// Gift Filter
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftFilter {
    /// Skip soft-deleted gifts. Defaults to true.
    pub only_active: bool,
    pub manufacturer_id: Option<String>,
}

impl Default for GiftFilter {
    fn default() -> Self {
        Self {
            only_active: true,
            manufacturer_id: None,
        }
    }
}

impl GiftFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_deleted(mut self) -> Self {
        self.only_active = false;
        self
    }

    pub fn manufacturer(mut self, manufacturer_id: impl Into<String>) -> Self {
        self.manufacturer_id = Some(manufacturer_id.into());
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::DiscountType;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    fn sale_on(date: DateTime<Utc>) -> Sale {
        let mut sale = Sale::new("w1", Some("b1".to_string()), Money::from_cents(100), DiscountType::None, Money::zero())
            .with_gift("g1", 1);
        sale.sale_date = date;
        sale
    }

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let err = DateRange::new(day(2), day(1)).unwrap_err();
        assert!(matches!(err, CoreError::IncorrectDates { .. }));
        assert!(DateRange::new(day(1), day(1)).is_ok());
    }

    #[test]
    fn test_sale_period_is_half_open() {
        let filter = SaleFilter::new().period(DateRange::new(day(1), day(10)).unwrap());

        assert!(filter.matches(&sale_on(day(1))));
        assert!(filter.matches(&sale_on(day(10) - Duration::seconds(1))));
        assert!(!filter.matches(&sale_on(day(10))));
        assert!(!filter.matches(&sale_on(day(1) - Duration::seconds(1))));
    }

    #[test]
    fn test_sale_filters_compose_with_and() {
        let sale = sale_on(day(5));

        assert!(SaleFilter::new().matches(&sale));
        assert!(SaleFilter::new().worker("w1").buyer("b1").gift("g1").matches(&sale));
        assert!(!SaleFilter::new().worker("w1").gift("g2").matches(&sale));
        assert!(!SaleFilter::new().buyer("b2").matches(&sale));
    }

    #[test]
    fn test_worker_date_ranges_are_inclusive() {
        let mut worker = Worker::new("Petrov", "p1", day(1), day(20));
        let filter = WorkerFilter::new()
            .born_between(DateRange::new(day(1), day(1)).unwrap())
            .employed_between(DateRange::new(day(10), day(20)).unwrap());
        assert!(filter.matches(&worker));

        worker.is_deleted = true;
        assert!(!filter.matches(&worker));
        assert!(filter.clone().include_deleted().matches(&worker));
    }
}
