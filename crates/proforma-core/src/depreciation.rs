use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{DepreciationMethod, Investment};
use crate::types::{Money, Percent, Year};

/// Asset-level inputs to the depreciation kernel.
///
/// The kernel knows nothing about investment categories; callers filter
/// out non-depreciable assets (land, working capital) before invoking it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDepreciation {
    pub cost: Money,
    pub salvage_value: Money,
    pub useful_life: Year,
    /// Declining-balance rate in percent; ignored by other methods
    pub rate: Percent,
    pub method: DepreciationMethod,
    /// Absolute year the asset enters service
    pub purchase_year: Year,
}

impl From<&Investment> for AssetDepreciation {
    fn from(inv: &Investment) -> Self {
        AssetDepreciation {
            cost: inv.amount,
            salvage_value: inv.salvage_value,
            useful_life: inv.useful_life,
            rate: inv.depreciation_rate,
            method: inv.depreciation_method,
            purchase_year: inv.year,
        }
    }
}

/// One year of an asset's depreciation schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationRow {
    pub year: Year,
    pub charge: Money,
    pub accumulated: Money,
    pub book_value: Money,
}

/// Depreciation charge attributable to a single year.
///
/// Zero outside the asset's life, for a zero useful life, and whenever
/// cost does not exceed salvage. Declining balance clamps so book value
/// never falls below salvage.
pub fn annual_charge(asset: &AssetDepreciation, query_year: Year) -> Money {
    if asset.useful_life == 0 || query_year < asset.purchase_year {
        return Decimal::ZERO;
    }
    let age = query_year - asset.purchase_year;
    if age >= asset.useful_life {
        return Decimal::ZERO;
    }
    let base = asset.cost - asset.salvage_value;
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match asset.method {
        DepreciationMethod::None => Decimal::ZERO,
        DepreciationMethod::StraightLine => base / Decimal::from(asset.useful_life),
        DepreciationMethod::DecliningBalance => {
            let rate = asset.rate / dec!(100);
            let mut book = asset.cost;
            for _ in 0..age {
                book -= declining_charge(book, asset.salvage_value, rate);
            }
            declining_charge(book, asset.salvage_value, rate)
        }
    }
}

/// Accumulated depreciation from purchase through `query_year` inclusive,
/// clamped to the depreciable base.
pub fn accumulated(asset: &AssetDepreciation, query_year: Year) -> Money {
    if asset.useful_life == 0 || query_year < asset.purchase_year {
        return Decimal::ZERO;
    }
    let base = (asset.cost - asset.salvage_value).max(Decimal::ZERO);
    let mut total = Decimal::ZERO;
    for year in asset.purchase_year..=query_year {
        if year - asset.purchase_year >= asset.useful_life {
            break;
        }
        total += annual_charge(asset, year);
    }
    total.min(base)
}

/// Full per-year schedule over the asset's useful life.
pub fn full_schedule(asset: &AssetDepreciation) -> Vec<DepreciationRow> {
    let mut rows = Vec::with_capacity(asset.useful_life as usize);
    let mut accumulated_total = Decimal::ZERO;
    for offset in 0..asset.useful_life {
        let year = asset.purchase_year + offset;
        let charge = annual_charge(asset, year);
        accumulated_total += charge;
        rows.push(DepreciationRow {
            year,
            charge,
            accumulated: accumulated_total,
            book_value: asset.cost - accumulated_total,
        });
    }
    rows
}

/// First year in which a declining-balance asset's charge hits zero while
/// still inside its useful life (book value stuck at salvage). `None` for
/// other methods or when the floor is never reached early.
pub fn salvage_floor_year(asset: &AssetDepreciation) -> Option<Year> {
    if asset.method != DepreciationMethod::DecliningBalance
        || asset.useful_life == 0
        || asset.cost <= asset.salvage_value
        || asset.rate <= Decimal::ZERO
    {
        return None;
    }
    for offset in 0..asset.useful_life {
        let year = asset.purchase_year + offset;
        if annual_charge(asset, year).is_zero() {
            return Some(year);
        }
    }
    None
}

fn declining_charge(book: Money, salvage: Money, rate: Decimal) -> Money {
    if book <= salvage {
        return Decimal::ZERO;
    }
    (book * rate).min(book - salvage)
}
