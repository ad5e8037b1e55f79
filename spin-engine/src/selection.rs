// Copyright (c) James Kassemi, SC, US. All rights reserved.
//! Linear-scan weighted sampling over the prize table.

use core_types::PrizeEntry;
use rand::Rng;

use crate::error::SelectionError;

/// Sum of the relative weights; must be positive and finite to draw.
pub fn total_chance(prizes: &[PrizeEntry]) -> Result<f64, SelectionError> {
    if prizes.is_empty() {
        return Err(SelectionError::EmptyTable);
    }
    let total: f64 = prizes.iter().map(|p| p.chance).sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(SelectionError::NonPositiveTotal { total });
    }
    Ok(total)
}

/// Resolves a draw `r` in `[0, total)` to an index.
///
/// Entries are scanned in table order, subtracting each chance; the first
/// entry that takes the remainder to `<= 0` wins. When rounding leaves a
/// positive remainder past the end, the last entry wins.
pub fn pick_index(prizes: &[PrizeEntry], mut r: f64) -> usize {
    for (idx, prize) in prizes.iter().enumerate() {
        r -= prize.chance;
        if r <= 0.0 {
            return idx;
        }
    }
    prizes.len().saturating_sub(1)
}

pub fn select_weighted<R: Rng + ?Sized>(
    prizes: &[PrizeEntry],
    rng: &mut R,
) -> Result<usize, SelectionError> {
    let total = total_chance(prizes)?;
    let r = rng.gen_range(0.0..total);
    Ok(pick_index(prizes, r))
}
