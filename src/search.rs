//! Search for the full-time gross salary that yields a target net income at given hours.
//!
//! Net income is only piecewise monotonic in the gross salary: each insurance band applies its
//! rate to the whole salary, so net income dips a little at every band cutoff. The grid scan
//! finds the first salary reaching the target, bisection finds some crossing of the target.

use crate::calculator::TaxCalculator;
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakEven {
    /// Full-time monthly gross salary.
    pub gross_monthly_full_time: f64,
    /// Net monthly income actually reached at this salary.
    pub net_monthly: f64,
}

/// Smallest salary of an evenly spaced grid over `[0, max_salary]` whose net monthly income at
/// `working_hours` reaches `target_net_monthly`.
pub fn scan(
    calculator: &TaxCalculator,
    target_net_monthly: f64,
    working_hours: f64,
    max_salary: f64,
    samples: usize,
) -> Option<BreakEven> {
    debug!(
        "Scanning {samples} salaries up to {max_salary} for {target_net_monthly} net at {working_hours}h"
    );
    let last = samples.saturating_sub(1).max(1) as f64;
    (0..samples)
        .map(|i| max_salary * i as f64 / last)
        .map(|salary| BreakEven {
            gross_monthly_full_time: salary,
            net_monthly: calculator.annual_breakdown(salary, working_hours).net_monthly,
        })
        .find(|candidate| candidate.net_monthly >= target_net_monthly)
}

const MAX_ITERATIONS: usize = 200;

/// Bisection over `[0, max_salary]` until the bracket is narrower than `tolerance`, or as narrow
/// as floating point allows.
pub fn bisect(
    calculator: &TaxCalculator,
    target_net_monthly: f64,
    working_hours: f64,
    max_salary: f64,
    tolerance: f64,
) -> Option<BreakEven> {
    let net = |salary: f64| calculator.annual_breakdown(salary, working_hours).net_monthly;

    let mut low = 0.0;
    let mut high = max_salary;
    if net(high) < target_net_monthly {
        debug!("Target {target_net_monthly} unreachable below {max_salary}");
        return None;
    }
    if net(low) >= target_net_monthly {
        return Some(BreakEven {
            gross_monthly_full_time: low,
            net_monthly: net(low),
        });
    }

    let mut iteration = 0;
    while high - low > tolerance && iteration < MAX_ITERATIONS {
        let mid = f64::midpoint(low, high);
        // No representable salary left between the bounds.
        if mid <= low || mid >= high {
            break;
        }
        let value = net(mid);
        trace!("[{iteration}] net({mid}) = {value}");
        if value >= target_net_monthly {
            high = mid;
        } else {
            low = mid;
        }
        iteration += 1;
    }
    debug!("Bisection converged after {iteration} iterations");

    Some(BreakEven {
        gross_monthly_full_time: high,
        net_monthly: net(high),
    })
}
