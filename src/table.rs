use crate::schema::{BracketTableFile, StepTableFile};
use anyhow::{Result, anyhow};
use log::{debug, warn};

/// Contribution that depends only on which band the salary falls in: the band's rate applies
/// to the whole salary, and above the cap cutoff a constant amount is due.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable {
    steps: Vec<Step>,
    cap: Cap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    band_start: f64,
    rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cap {
    band_start: f64,
    amount: f64,
}

impl TryFrom<&StepTableFile> for StepTable {
    type Error = anyhow::Error;

    fn try_from(table: &StepTableFile) -> Result<Self, Self::Error> {
        let steps = table
            .steps
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                check_percent(entry.percent)?;
                if entry.from < 0.0 {
                    Err(anyhow!("Negative step start: {}", entry.from))
                } else if i > 0 && entry.from <= table.steps[i - 1].from {
                    Err(anyhow!(
                        "Steps are not strictly ascending: {} after {}",
                        entry.from,
                        table.steps[i - 1].from
                    ))
                } else if entry.from >= table.cap.from {
                    Err(anyhow!(
                        "Step at {} starts above the cap at {}",
                        entry.from,
                        table.cap.from
                    ))
                } else {
                    Ok(Step {
                        band_start: entry.from,
                        rate: entry.percent,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        if table.cap.amount < 0.0 {
            return Err(anyhow!("Negative capped amount: {}", table.cap.amount));
        }
        if steps.is_empty() {
            warn!("Step table without steps, only the cap applies");
        }

        Ok(StepTable {
            steps,
            cap: Cap {
                band_start: table.cap.from,
                amount: table.cap.amount,
            },
        })
    }
}

impl StepTable {
    pub fn eval(&self, x: f64) -> f64 {
        if x >= self.cap.band_start {
            return self.cap.amount;
        }
        for step in self.steps.iter().rev() {
            if x >= step.band_start {
                return x * step.rate / 100.0;
            }
        }
        0.0
    }

    /// Salaries at which the contribution rate changes, cap included.
    pub fn cutoffs(&self) -> impl Iterator<Item = f64> + '_ {
        self.steps
            .iter()
            .map(|step| step.band_start)
            .chain(std::iter::once(self.cap.band_start))
    }
}

/// Marginal tax table: each bracket's rate applies only to the slice of the base between its
/// lower and upper bound. An allowance is subtracted from the input before any bracket applies.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketTable {
    allowance: f64,
    /// Sorted by descending lower bound.
    brackets: Vec<Bracket>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    upper: f64,
    lower: f64,
    marginal_rate: f64,
}

impl TryFrom<&BracketTableFile> for BracketTable {
    type Error = anyhow::Error;

    fn try_from(table: &BracketTableFile) -> Result<Self, Self::Error> {
        if table.brackets.is_empty() {
            return Err(anyhow!("Empty bracket table"));
        }
        if table.allowance < 0.0 {
            return Err(anyhow!("Negative allowance: {}", table.allowance));
        }

        let brackets = table
            .brackets
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                check_percent(entry.percent)?;
                let upper = match (i, entry.upper) {
                    (0, None) => f64::INFINITY,
                    (0, Some(upper)) => {
                        debug!("Top bracket bounded at {upper}, treating it as open-ended");
                        f64::INFINITY
                    }
                    (_, None) => {
                        return Err(anyhow!(
                            "Only the top bracket may be open-ended, found one above {}",
                            entry.lower
                        ));
                    }
                    (_, Some(upper)) => {
                        let previous = table.brackets[i - 1].lower;
                        if upper != previous {
                            return Err(anyhow!(
                                "Bracket [{}, {}) doesn't continue the bracket starting at {}",
                                entry.lower,
                                upper,
                                previous
                            ));
                        }
                        upper
                    }
                };
                if entry.lower >= upper {
                    Err(anyhow!(
                        "Brackets are not strictly descending: {} >= {}",
                        entry.lower,
                        upper
                    ))
                } else if entry.lower < 0.0 {
                    Err(anyhow!("Negative bracket bound: {}", entry.lower))
                } else {
                    Ok(Bracket {
                        upper,
                        lower: entry.lower,
                        marginal_rate: entry.percent,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BracketTable {
            allowance: table.allowance,
            brackets,
        })
    }
}

impl BracketTable {
    pub fn eval(&self, x: f64) -> f64 {
        // A base below the allowance is below every bracket, so nothing is taxed.
        let base = x - self.allowance;
        let (_, tax) = self
            .brackets
            .iter()
            .fold((base, 0.0), |(base, tax), bracket| {
                if base > bracket.lower {
                    debug_assert!(base <= bracket.upper);
                    let slice = base - bracket.lower;
                    (bracket.lower, tax + slice * bracket.marginal_rate / 100.0)
                } else {
                    (base, tax)
                }
            });
        tax
    }

    pub fn allowance(&self) -> f64 {
        self.allowance
    }

    /// Lowest amount that is taxed at all, allowance included.
    pub fn tax_free_limit(&self) -> f64 {
        self.allowance + self.brackets.last().map_or(0.0, |bracket| bracket.lower)
    }
}

fn check_percent(percent: f64) -> Result<()> {
    if (0.0..=100.0).contains(&percent) {
        Ok(())
    } else {
        Err(anyhow!("Rate out of range: {percent}%"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::{BracketEntry, CapEntry, StepEntry};

    fn bracket(upper: Option<f64>, lower: f64, percent: f64) -> BracketEntry {
        BracketEntry {
            upper,
            lower,
            percent,
        }
    }

    fn step(from: f64, percent: f64) -> StepEntry {
        StepEntry { from, percent }
    }

    fn brackets(allowance: f64, brackets: Vec<BracketEntry>) -> BracketTableFile {
        BracketTableFile {
            allowance,
            brackets,
        }
    }

    fn two_brackets() -> BracketTable {
        BracketTable::try_from(&brackets(
            0.0,
            vec![bracket(None, 100.0, 50.0), bracket(Some(100.0), 10.0, 20.0)],
        ))
        .unwrap()
    }

    #[test]
    fn eval_brackets() {
        let table = two_brackets();
        assert_eq!(table.eval(0.0), 0.0);
        assert_eq!(table.eval(10.0), 0.0);
        assert_eq!(table.eval(60.0), 10.0);
        assert_eq!(table.eval(100.0), 18.0);
        assert_eq!(table.eval(200.0), 68.0);
        assert_eq!(table.tax_free_limit(), 10.0);
    }

    #[test]
    fn eval_brackets_with_allowance() {
        let table = BracketTable::try_from(&brackets(
            50.0,
            vec![bracket(None, 100.0, 50.0), bracket(Some(100.0), 10.0, 20.0)],
        ))
        .unwrap();
        assert_eq!(table.eval(-100.0), 0.0);
        assert_eq!(table.eval(50.0), 0.0);
        assert_eq!(table.eval(60.0), 0.0);
        assert_eq!(table.eval(110.0), 10.0);
        assert_eq!(table.tax_free_limit(), 60.0);
    }

    #[test]
    fn brackets_are_continuous_and_monotonic() {
        let table = two_brackets();
        let mut previous = 0.0;
        for i in 0..=3000 {
            let tax = table.eval(i as f64 / 10.0);
            assert!(tax >= previous, "tax decreased at {}", i as f64 / 10.0);
            assert!(tax - previous <= 0.05 + 1e-9);
            previous = tax;
        }
    }

    #[test]
    fn reject_unsorted_brackets() {
        let result = BracketTable::try_from(&brackets(
            0.0,
            vec![bracket(None, 10.0, 20.0), bracket(Some(10.0), 100.0, 50.0)],
        ));
        assert!(result.is_err());
    }

    #[test]
    fn reject_gap_between_brackets() {
        let result = BracketTable::try_from(&brackets(
            0.0,
            vec![bracket(None, 100.0, 50.0), bracket(Some(90.0), 10.0, 20.0)],
        ));
        assert!(result.is_err());
    }

    #[test]
    fn reject_open_ended_lower_bracket() {
        let result = BracketTable::try_from(&brackets(
            0.0,
            vec![bracket(None, 100.0, 50.0), bracket(None, 10.0, 20.0)],
        ));
        assert!(result.is_err());
    }

    #[test]
    fn reject_invalid_rates() {
        assert!(BracketTable::try_from(&brackets(0.0, vec![bracket(None, 10.0, 120.0)])).is_err());
        assert!(BracketTable::try_from(&brackets(0.0, vec![bracket(None, 10.0, -1.0)])).is_err());
        assert!(BracketTable::try_from(&brackets(0.0, vec![])).is_err());
    }

    #[test]
    fn eval_steps() {
        let table = StepTable::try_from(&StepTableFile {
            steps: vec![step(100.0, 10.0), step(200.0, 20.0)],
            cap: CapEntry {
                from: 1000.0,
                amount: 150.0,
            },
        })
        .unwrap();
        assert_eq!(table.eval(0.0), 0.0);
        assert_eq!(table.eval(99.99), 0.0);
        assert_eq!(table.eval(100.0), 10.0);
        assert_eq!(table.eval(199.0), 19.9);
        assert_eq!(table.eval(200.0), 40.0);
        assert_eq!(table.eval(999.0), 199.8);
        assert_eq!(table.eval(1000.0), 150.0);
        assert_eq!(table.eval(1e9), 150.0);
        assert_eq!(
            table.cutoffs().collect::<Vec<_>>(),
            vec![100.0, 200.0, 1000.0]
        );
    }

    #[test]
    fn reject_invalid_steps() {
        let cap = CapEntry {
            from: 1000.0,
            amount: 150.0,
        };
        assert!(
            StepTable::try_from(&StepTableFile {
                steps: vec![step(200.0, 10.0), step(100.0, 20.0)],
                cap,
            })
            .is_err()
        );
        assert!(
            StepTable::try_from(&StepTableFile {
                steps: vec![step(100.0, 10.0), step(2000.0, 20.0)],
                cap,
            })
            .is_err()
        );
        assert!(
            StepTable::try_from(&StepTableFile {
                steps: vec![step(100.0, 101.0)],
                cap,
            })
            .is_err()
        );
    }
}
