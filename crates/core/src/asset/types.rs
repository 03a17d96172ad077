//! Asset domain types.
//!
//! An [`Asset`] owns its ordered list of [`DepreciationMove`]s. Amounts are
//! `Decimal` in the asset currency; day counts use the 30-day convention from
//! [`crate::calendar`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use deprecia_shared::types::{AccountId, AssetId, Currency, Money, MoveId};

use crate::calendar::{
    DAYS_PER_MONTH, MethodPeriod, ProrataConvention, add_months, days_between, end_of_period,
    next_day, previous_day, start_of_period,
};
use crate::fiscal::{LockDates, ensure_mutable};

use super::error::AssetError;

/// Depreciation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepreciationMethod {
    /// Straight-line depreciation over the lifetime.
    #[default]
    Linear,
}

/// Lifecycle status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    /// Parameters can still change; no board yet.
    #[default]
    Draft,
    /// Validated and depreciating.
    Open,
    /// Disposed or fully closed.
    Closed,
}

impl AssetStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Posting state of a depreciation move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    /// Not yet confirmed; freely regenerable.
    Draft,
    /// Confirmed in the ledger; never changes value.
    Posted,
}

impl MoveState {
    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }

    /// Returns true for posted moves.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

impl fmt::Display for MoveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a move records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Regular or partial-period depreciation.
    Depreciation,
    /// Value decrease booked by a reevaluation.
    ValueDecrease,
    /// Terminal move writing off the residual on disposal.
    Disposal,
}

impl MoveKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depreciation => "depreciation",
            Self::ValueDecrease => "value_decrease",
            Self::Disposal => "disposal",
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Acquisition parameters of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    /// Display name.
    pub name: String,
    /// Currency of all amounts.
    #[serde(default)]
    pub currency: Currency,
    /// Date the asset was acquired.
    pub acquisition_date: NaiveDate,
    /// Gross value.
    pub original_value: Decimal,
    /// Value not subject to depreciation.
    #[serde(default)]
    pub salvage_value: Decimal,
    /// Depreciation method.
    #[serde(default)]
    pub method: DepreciationMethod,
    /// Number of periods.
    pub method_number: u32,
    /// Length of one period.
    pub method_period: MethodPeriod,
    /// First-period prorata convention.
    #[serde(default)]
    pub prorata_computation_type: ProrataConvention,
    /// Depreciation already booked before the asset entered the system.
    #[serde(default)]
    pub already_depreciated_amount_import: Decimal,
}

impl AssetParams {
    /// Monthly constant-period linear parameters with no salvage or import.
    #[must_use]
    pub fn linear_monthly(
        name: impl Into<String>,
        acquisition_date: NaiveDate,
        original_value: Decimal,
        method_number: u32,
    ) -> Self {
        Self {
            name: name.into(),
            currency: Currency::default(),
            acquisition_date,
            original_value,
            salvage_value: Decimal::ZERO,
            method: DepreciationMethod::Linear,
            method_number,
            method_period: MethodPeriod::Monthly,
            prorata_computation_type: ProrataConvention::ConstantPeriods,
            already_depreciated_amount_import: Decimal::ZERO,
        }
    }
}

/// Weak back-reference from a child asset to the asset whose increase spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    /// The parent asset.
    pub parent_id: AssetId,
    /// The parent's final depreciation date, shared by the child.
    pub final_date: NaiveDate,
    /// Account the increase is booked against.
    pub counterpart_account: AccountId,
}

/// One entry of a depreciation board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationMove {
    /// Move identifier.
    pub id: MoveId,
    /// Creation order within the asset; breaks ties between same-day moves.
    pub sequence: u32,
    /// What the move records.
    pub kind: MoveKind,
    /// Accounting date, possibly moved out of a locked period.
    pub date: NaiveDate,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Days covered under the 30-day convention.
    pub days: Decimal,
    /// Amount expensed by this move.
    pub depreciation_value: Decimal,
    /// Value still to depreciate after this move.
    pub asset_remaining_value: Decimal,
    /// Cumulative depreciation after this move, imported amount included.
    pub asset_depreciated_value: Decimal,
    /// Posting state.
    pub state: MoveState,
    /// Account an adjustment is booked against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart_account: Option<AccountId>,
}

impl DepreciationMove {
    /// Creates a move with cumulative values still to be filled in.
    #[must_use]
    pub fn new(
        kind: MoveKind,
        sequence: u32,
        date: NaiveDate,
        period: (NaiveDate, NaiveDate),
        days: Decimal,
        depreciation_value: Decimal,
        state: MoveState,
    ) -> Self {
        Self {
            id: MoveId::new(),
            sequence,
            kind,
            date,
            period_start: period.0,
            period_end: period.1,
            days,
            depreciation_value,
            asset_remaining_value: Decimal::ZERO,
            asset_depreciated_value: Decimal::ZERO,
            state,
            counterpart_account: None,
        }
    }

    /// Sets the counterpart account.
    #[must_use]
    pub fn with_counterpart(mut self, account: Option<AccountId>) -> Self {
        self.counterpart_account = account;
        self
    }

    /// Ordering key on a board.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, u32) {
        (self.date, self.sequence)
    }

    /// Returns true if the move is posted.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.state.is_posted()
    }
}

/// Inputs every generation or reevaluation call needs besides the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleContext {
    /// Reference date: moves dated on or before it are due.
    pub as_of: NaiveDate,
    /// Company lock dates.
    #[serde(default)]
    pub lock_dates: LockDates,
    /// Post due moves as they are generated.
    #[serde(default = "default_auto_post")]
    pub auto_post: bool,
}

fn default_auto_post() -> bool {
    true
}

impl ScheduleContext {
    /// Context with no lock and auto-posting enabled.
    #[must_use]
    pub const fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            lock_dates: LockDates::unlocked(),
            auto_post: true,
        }
    }

    /// Replaces the lock dates.
    #[must_use]
    pub const fn with_lock_dates(mut self, lock_dates: LockDates) -> Self {
        self.lock_dates = lock_dates;
        self
    }

    /// Enables or disables auto-posting.
    #[must_use]
    pub const fn with_auto_post(mut self, auto_post: bool) -> Self {
        self.auto_post = auto_post;
        self
    }

    /// The effective lock date.
    #[must_use]
    pub fn lock(&self) -> Option<NaiveDate> {
        self.lock_dates.effective()
    }

    /// State of a generated move dated `date`.
    #[must_use]
    pub fn state_for(&self, date: NaiveDate) -> MoveState {
        if self.auto_post && date <= self.as_of {
            MoveState::Posted
        } else {
            MoveState::Draft
        }
    }
}

/// A depreciable asset and its board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier.
    pub id: AssetId,
    /// Acquisition parameters.
    #[serde(flatten)]
    pub params: AssetParams,
    /// Lifecycle status.
    #[serde(default)]
    pub status: AssetStatus,
    /// Set on assets spawned by a value increase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentLink>,
    /// Depreciation board, ordered by `(date, sequence)`.
    #[serde(default)]
    pub moves: Vec<DepreciationMove>,
}

impl Asset {
    /// Creates a draft asset with an empty board.
    #[must_use]
    pub fn new(params: AssetParams) -> Self {
        Self {
            id: AssetId::new(),
            params,
            status: AssetStatus::Draft,
            parent: None,
            moves: Vec::new(),
        }
    }

    /// Date depreciation starts.
    #[must_use]
    pub fn prorata_date(&self) -> NaiveDate {
        let acquisition = self.params.acquisition_date;
        if self.parent.is_some() {
            return next_day(acquisition);
        }
        match self.params.prorata_computation_type {
            ProrataConvention::ConstantPeriods => acquisition,
            ProrataConvention::None => start_of_period(acquisition, self.params.method_period),
        }
    }

    /// Last day of the last period.
    #[must_use]
    pub fn final_date(&self) -> NaiveDate {
        if let Some(parent) = &self.parent {
            return parent.final_date;
        }
        let months = self
            .params
            .method_period
            .months()
            .saturating_mul(self.params.method_number);
        let last_day = previous_day(add_months(self.prorata_date(), months));
        end_of_period(last_day, self.params.method_period)
    }

    /// Lifetime in 30-day-convention days.
    #[must_use]
    pub fn lifetime_days(&self) -> Decimal {
        if self.parent.is_some() {
            return days_between(self.prorata_date(), self.final_date());
        }
        let months = u64::from(self.params.method_period.months())
            * u64::from(self.params.method_number);
        Decimal::from(months) * DAYS_PER_MONTH
    }

    /// Original value less salvage.
    #[must_use]
    pub fn total_depreciable(&self) -> Decimal {
        self.params.original_value - self.params.salvage_value
    }

    /// Amount the board itself has to expense.
    #[must_use]
    pub fn depreciable_base(&self) -> Decimal {
        self.total_depreciable() - self.params.already_depreciated_amount_import
    }

    /// Value still to depreciate across the whole board.
    #[must_use]
    pub fn residual(&self) -> Decimal {
        let expensed: Decimal = self.moves.iter().map(|m| m.depreciation_value).sum();
        self.depreciable_base() - expensed
    }

    /// Net book value: original value less the import and every posted
    /// depreciation. Draft moves do not count.
    #[must_use]
    pub fn book_value(&self) -> Money {
        let posted: Decimal = self
            .moves
            .iter()
            .filter(|m| m.is_posted())
            .map(|m| m.depreciation_value)
            .sum();
        Money::new(
            self.params.salvage_value + self.depreciable_base() - posted,
            self.params.currency,
        )
    }

    /// Sequence number for the next created move.
    #[must_use]
    pub fn next_sequence(&self) -> u32 {
        self.moves.iter().map(|m| m.sequence + 1).max().unwrap_or(0)
    }

    /// Date of the latest value decrease, if any.
    #[must_use]
    pub fn last_adjustment_date(&self) -> Option<NaiveDate> {
        self.moves
            .iter()
            .filter(|m| m.kind == MoveKind::ValueDecrease)
            .map(|m| m.date)
            .max()
    }

    /// Sorts the board by `(date, sequence)`.
    pub fn sort_moves(&mut self) {
        self.moves.sort_by_key(DepreciationMove::sort_key);
    }

    /// Returns true if the asset is depreciating.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == AssetStatus::Open
    }

    /// Posts every draft move dated on or before `as_of`.
    ///
    /// Returns the number of moves posted.
    pub fn post_through(&mut self, as_of: NaiveDate) -> usize {
        let mut posted = 0;
        for mv in self
            .moves
            .iter_mut()
            .filter(|m| !m.is_posted() && m.date <= as_of)
        {
            mv.state = MoveState::Posted;
            posted += 1;
        }
        posted
    }

    /// Returns a posted move to draft.
    ///
    /// # Errors
    ///
    /// Returns `MoveNotFound` for an unknown move and `LockViolation` for a
    /// move dated on or before `lock`.
    pub fn reset_to_draft(
        &mut self,
        move_id: MoveId,
        lock: Option<NaiveDate>,
    ) -> Result<(), AssetError> {
        let mv = self
            .moves
            .iter_mut()
            .find(|m| m.id == move_id)
            .ok_or(AssetError::MoveNotFound(move_id))?;
        ensure_mutable(mv.date, mv.is_posted(), lock)?;
        mv.state = MoveState::Draft;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_constant_periods_dates() {
        let asset = Asset::new(AssetParams::linear_monthly(
            "Car",
            date(2022, 2, 15),
            dec!(7200),
            12,
        ));
        assert_eq!(asset.prorata_date(), date(2022, 2, 15));
        assert_eq!(asset.final_date(), date(2023, 2, 28));
        assert_eq!(asset.lifetime_days(), dec!(360));
    }

    #[test]
    fn test_prorata_none_starts_at_period_start() {
        let mut params = AssetParams::linear_monthly("Desk", date(2022, 3, 15), dec!(1000), 5);
        params.method_period = MethodPeriod::Yearly;
        params.prorata_computation_type = ProrataConvention::None;
        let asset = Asset::new(params);
        assert_eq!(asset.prorata_date(), date(2022, 1, 1));
        assert_eq!(asset.final_date(), date(2026, 12, 31));
        assert_eq!(asset.lifetime_days(), dec!(1800));
    }

    #[test]
    fn test_child_shares_parent_final_date() {
        let mut child = Asset::new(AssetParams::linear_monthly(
            "Car (increase)",
            date(2022, 4, 15),
            dec!(8500),
            9,
        ));
        child.parent = Some(ParentLink {
            parent_id: AssetId::new(),
            final_date: date(2022, 12, 31),
            counterpart_account: AccountId::new(),
        });
        assert_eq!(child.prorata_date(), date(2022, 4, 16));
        assert_eq!(child.final_date(), date(2022, 12, 31));
        assert_eq!(child.lifetime_days(), dec!(255));
    }

    #[test]
    fn test_base_excludes_salvage_and_import() {
        let mut params = AssetParams::linear_monthly("Server", date(2022, 1, 1), dec!(10000), 10);
        params.salvage_value = dec!(1000);
        params.already_depreciated_amount_import = dec!(3000);
        let asset = Asset::new(params);
        assert_eq!(asset.total_depreciable(), dec!(9000));
        assert_eq!(asset.depreciable_base(), dec!(6000));
        assert_eq!(asset.residual(), dec!(6000));
        assert_eq!(asset.book_value().amount, dec!(7000));
    }

    #[test]
    fn test_context_state_for() {
        let ctx = ScheduleContext::new(date(2022, 6, 30));
        assert_eq!(ctx.state_for(date(2022, 6, 30)), MoveState::Posted);
        assert_eq!(ctx.state_for(date(2022, 7, 31)), MoveState::Draft);
        assert_eq!(
            ctx.with_auto_post(false).state_for(date(2022, 1, 31)),
            MoveState::Draft
        );
    }

    #[test]
    fn test_post_through_and_reset() {
        let mut asset = Asset::new(AssetParams::linear_monthly(
            "Car",
            date(2022, 1, 1),
            dec!(1200),
            2,
        ));
        for (sequence, end) in [(0, date(2022, 1, 31)), (1, date(2022, 2, 28))] {
            asset.moves.push(DepreciationMove::new(
                MoveKind::Depreciation,
                sequence,
                end,
                (date(2022, end.month(), 1), end),
                dec!(30),
                dec!(600),
                MoveState::Draft,
            ));
        }

        assert_eq!(asset.post_through(date(2022, 1, 31)), 1);
        assert_eq!(asset.post_through(date(2022, 1, 31)), 0);
        assert!(asset.moves[0].is_posted());
        assert!(!asset.moves[1].is_posted());

        let first = asset.moves[0].id;
        let err = asset
            .reset_to_draft(first, Some(date(2022, 1, 31)))
            .unwrap_err();
        assert!(matches!(err, AssetError::LockViolation(_)));
        asset.reset_to_draft(first, None).unwrap();
        assert_eq!(asset.moves[0].state, MoveState::Draft);

        assert!(matches!(
            asset.reset_to_draft(MoveId::new(), None),
            Err(AssetError::MoveNotFound(_))
        ));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AssetStatus::Closed.to_string(), "closed");
        assert_eq!(AssetStatus::Open.as_str(), "open");
    }
}
