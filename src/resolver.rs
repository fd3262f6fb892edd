//! Reference closure.
//!
//! Items selected directly may reference items outside the selection
//! (`> $EII.B21`). Resolution loads every such item, and every item those
//! reference in turn, until all binary constraints point inside the pool.
//!
//! Each pass scans the pool from the start and stops at the first missing
//! key; the item is loaded, appended, and the scan restarts. Resolved
//! items are never loaded twice because the pool already contains them.

use tracing::info;

use crate::builder;
use crate::config::ExamConfig;
use crate::error::Result;
use crate::models::{CellRef, ItemPool};
use crate::workbook::Workbook;

/// First referenced key not present in the pool, in pool order.
pub fn first_missing(pool: &ItemPool) -> Option<CellRef> {
    pool.iter()
        .flat_map(|item| item.referenced_keys())
        .find(|key| !pool.contains(key))
        .cloned()
}

/// Every dangling `(referrer, target)` pair, in pool order.
pub fn dangling_references(pool: &ItemPool) -> Vec<(CellRef, CellRef)> {
    pool.iter()
        .flat_map(move |item| {
            item.referenced_keys()
                .filter(move |key| !pool.contains(key))
                .map(move |key| (item.key().clone(), key.clone()))
        })
        .collect()
}

/// Loads referenced items until the pool is closed under references.
///
/// Returns the number of items added.
///
/// # Errors
/// [`ExamError::UnknownRegister`](crate::error::ExamError::UnknownRegister)
/// if a referenced coordinate holds no item, plus any error raised while
/// building the loaded item.
pub fn resolve_references(
    pool: &mut ItemPool,
    workbook: &Workbook,
    config: &ExamConfig,
) -> Result<usize> {
    let mut added = 0;

    while let Some(key) = first_missing(pool) {
        let item = builder::load_item_at(workbook, &key, config)?;
        info!(item = %item, "indirect item loaded");
        pool.push(item)?;
        added += 1;
    }

    Ok(added)
}
