use std::cmp::Ordering;

use crate::models::Node;

/// Calculates fractional orders for inserting a node among its siblings
pub struct FractionalOrderCalculator;

impl FractionalOrderCalculator {
    /// Calculate order value for inserting between prev and next
    ///
    /// # Examples
    /// ```
    /// # use outline_core::db::FractionalOrderCalculator as F;
    /// // First child of an empty parent
    /// assert_eq!(F::calculate_order(None, None), 1.0);
    ///
    /// // Insert at beginning: halfway between 0 and the first sibling
    /// assert_eq!(F::calculate_order(None, Some(2.0)), 1.0);
    ///
    /// // Insert at end (after all)
    /// assert_eq!(F::calculate_order(Some(3.0), None), 4.0);
    ///
    /// // Insert between two nodes
    /// assert_eq!(F::calculate_order(Some(1.0), Some(2.0)), 1.5);
    /// ```
    pub fn calculate_order(prev_order: Option<f64>, next_order: Option<f64>) -> f64 {
        match (prev_order, next_order) {
            (None, None) => 1.0,
            (None, Some(next)) if next > 0.0 => next / 2.0,
            (None, Some(next)) => next - 1.0,
            (Some(prev), None) => prev + 1.0,
            (Some(prev), Some(next)) => (prev + next) / 2.0,
        }
    }

    /// Calculate an order for a drop slot, treating a missing neighbor as the
    /// notional bound `0` (top) or `max_pos` (bottom).
    ///
    /// When a real neighbor already sits beyond its bound (e.g. a sibling at
    /// `pos > max_pos` after many appends) the bound is ignored and the
    /// unbounded offset rule applies, so the result still sorts on the right
    /// side of that neighbor.
    ///
    /// ```
    /// # use outline_core::db::FractionalOrderCalculator as F;
    /// assert_eq!(F::calculate_bounded_order(Some(2.0), Some(4.0), 10000.0), 3.0);
    /// assert_eq!(F::calculate_bounded_order(Some(5.0), None, 10000.0), 5002.5);
    /// assert_eq!(F::calculate_bounded_order(None, Some(2.0), 10000.0), 1.0);
    /// assert_eq!(F::calculate_bounded_order(Some(20000.0), None, 10000.0), 20001.0);
    /// ```
    pub fn calculate_bounded_order(
        prev_order: Option<f64>,
        next_order: Option<f64>,
        max_pos: f64,
    ) -> f64 {
        let lower = prev_order.unwrap_or(0.0);
        let upper = next_order.unwrap_or(max_pos);

        if lower < upper {
            (lower + upper) / 2.0
        } else {
            Self::calculate_order(prev_order, next_order)
        }
    }

    /// Number of digits after the decimal point in the shortest decimal
    /// representation of `pos`
    ///
    /// ```
    /// # use outline_core::db::FractionalOrderCalculator as F;
    /// assert_eq!(F::decimal_digits(3.0), 0);
    /// assert_eq!(F::decimal_digits(1.5), 1);
    /// assert_eq!(F::decimal_digits(1.00001), 5);
    /// ```
    pub fn decimal_digits(pos: f64) -> usize {
        if !pos.is_finite() {
            return 0;
        }
        let repr = pos.to_string();
        match repr.split_once('.') {
            Some((_, fraction)) => fraction.len(),
            None => 0,
        }
    }

    /// Check if a position has lost enough precision to need renormalization
    pub fn needs_renormalization(pos: f64, precision_digits: usize) -> bool {
        Self::decimal_digits(pos) >= precision_digits
    }

    /// Integer ranks for `count` siblings
    ///
    /// # Example
    /// Input:  4 children at [1.0, 1.00001, 1.00002, 1.00003]
    /// Output: [1.0, 2.0, 3.0, 4.0]
    pub fn rebalance(count: usize) -> Vec<f64> {
        (1..=count).map(|i| i as f64).collect()
    }

    /// Sibling order: ascending `pos`, ties broken by `id`
    pub fn sibling_cmp(a: &Node, b: &Node) -> Ordering {
        a.pos.total_cmp(&b.pos).then_with(|| a.id.cmp(&b.id))
    }

    /// Pinned-view order: ascending `pinned_pos`, ties broken by `id`
    pub fn pinned_cmp(a: &Node, b: &Node) -> Ordering {
        let a_pos = a.pinned_pos.unwrap_or(f64::MAX);
        let b_pos = b.pinned_pos.unwrap_or(f64::MAX);
        a_pos.total_cmp(&b_pos).then_with(|| a.id.cmp(&b.id))
    }
}
