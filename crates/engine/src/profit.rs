//! Profit reconciliation.
//!
//! [`reconcile`] is a pure function over whatever cost signals exist for an
//! invoice; it never touches the database. The priority order for the
//! effective cost, first applicable wins:
//!
//! 1. the manual override, when one is stored;
//! 2. the sum of linked-transaction allocations, when positive;
//! 3. the sum of blueprint-usage costs, when positive;
//! 4. zero.
//!
//! Batch callers pre-fetch allocation and usage sums keyed by invoice and
//! call [`reconcile`] per invoice without further queries.

use serde::{Deserialize, Serialize};

/// Which input the effective cost was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    Override,
    Transactions,
    Blueprint,
    None,
}

/// Cost signals for one invoice. All amounts are integer cents.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReconcileInputs {
    pub revenue_cents: i64,
    /// Stored total when `cost_override_by_user` is set.
    pub override_cost_cents: Option<i64>,
    /// Sum of the invoice's transaction allocations.
    pub transaction_cost_cents: i64,
    /// Sum of the invoice's blueprint-usage costs, when any usages exist.
    pub blueprint_cost_cents: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub effective_cost_cents: i64,
    pub profit_cents: i64,
    /// Percent; 0 when revenue is 0.
    pub margin: f64,
    pub cost_source: CostSource,
    /// `revenue - blueprint_cost`, when a blueprint estimate exists.
    pub estimated_profit_cents: Option<i64>,
    /// `profit - estimated_profit`, when a blueprint estimate exists.
    pub variance_cents: Option<i64>,
}

pub fn reconcile(inputs: ReconcileInputs) -> ProfitBreakdown {
    let (effective_cost_cents, cost_source) = match inputs {
        ReconcileInputs {
            override_cost_cents: Some(cost),
            ..
        } => (cost, CostSource::Override),
        ReconcileInputs {
            transaction_cost_cents: cost,
            ..
        } if cost > 0 => (cost, CostSource::Transactions),
        ReconcileInputs {
            blueprint_cost_cents: Some(cost),
            ..
        } if cost > 0 => (cost, CostSource::Blueprint),
        _ => (0, CostSource::None),
    };

    let profit_cents = inputs.revenue_cents - effective_cost_cents;
    let margin = if inputs.revenue_cents > 0 {
        profit_cents as f64 / inputs.revenue_cents as f64 * 100.0
    } else {
        0.0
    };

    // Budget-tracking figures, independent of which cost won above.
    let (estimated_profit_cents, variance_cents) = match inputs.blueprint_cost_cents {
        Some(blueprint_cost) if blueprint_cost > 0 => {
            let estimated = inputs.revenue_cents - blueprint_cost;
            (Some(estimated), Some(profit_cents - estimated))
        }
        _ => (None, None),
    };

    ProfitBreakdown {
        effective_cost_cents,
        profit_cents,
        margin,
        cost_source,
        estimated_profit_cents,
        variance_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_everything() {
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 100_000,
            override_cost_cents: Some(20_000),
            transaction_cost_cents: 50_000,
            blueprint_cost_cents: Some(10_000),
        });
        assert_eq!(breakdown.effective_cost_cents, 20_000);
        assert_eq!(breakdown.cost_source, CostSource::Override);
        assert_eq!(breakdown.profit_cents, 80_000);
    }

    #[test]
    fn transactions_win_over_blueprint() {
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 100_000,
            override_cost_cents: None,
            transaction_cost_cents: 50_000,
            blueprint_cost_cents: Some(10_000),
        });
        assert_eq!(breakdown.effective_cost_cents, 50_000);
        assert_eq!(breakdown.cost_source, CostSource::Transactions);
    }

    #[test]
    fn blueprint_is_the_fallback() {
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 100_000,
            override_cost_cents: None,
            transaction_cost_cents: 0,
            blueprint_cost_cents: Some(10_000),
        });
        assert_eq!(breakdown.effective_cost_cents, 10_000);
        assert_eq!(breakdown.cost_source, CostSource::Blueprint);
    }

    #[test]
    fn no_data_means_zero_cost() {
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 100_000,
            ..Default::default()
        });
        assert_eq!(breakdown.effective_cost_cents, 0);
        assert_eq!(breakdown.cost_source, CostSource::None);
        assert_eq!(breakdown.profit_cents, 100_000);
        assert_eq!(breakdown.estimated_profit_cents, None);
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 0,
            transaction_cost_cents: 5_000,
            ..Default::default()
        });
        assert_eq!(breakdown.profit_cents, -5_000);
        assert_eq!(breakdown.margin, 0.0);
    }

    #[test]
    fn margin_is_profit_over_revenue_percent() {
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 100_000,
            transaction_cost_cents: 25_000,
            ..Default::default()
        });
        assert!((breakdown.margin - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn variance_tracks_blueprint_estimate_even_when_transactions_win() {
        // Revenue 1000.00, actuals 500.00, estimate 100.00: the estimate
        // says 900.00 profit, reality says 500.00.
        let breakdown = reconcile(ReconcileInputs {
            revenue_cents: 100_000,
            override_cost_cents: None,
            transaction_cost_cents: 50_000,
            blueprint_cost_cents: Some(10_000),
        });
        assert_eq!(breakdown.estimated_profit_cents, Some(90_000));
        assert_eq!(breakdown.variance_cents, Some(-40_000));
    }
}
