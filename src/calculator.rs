use crate::load::Schedule;
use log::trace;
use serde::Serialize;

/// Salaries paid per year: 12 regular ones and the 13th/14th "holiday" salaries.
pub const REGULAR_SALARIES: f64 = 12.0;
pub const HOLIDAY_SALARIES: f64 = 2.0;
pub const SALARIES_PER_YEAR: f64 = REGULAR_SALARIES + HOLIDAY_SALARIES;

/// Employment constants that don't belong to a tax year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub full_time_hours: f64,
    pub weeks_per_month: f64,
    /// Tax-free benefits, paid with each regular salary.
    pub monthly_benefits: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            full_time_hours: 38.5,
            weeks_per_month: 4.34524,
            monthly_benefits: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryBreakdown {
    pub gross_yearly: f64,
    pub income_tax_yearly: f64,
    pub insurance_tax_yearly: f64,
    pub net_yearly: f64,
    pub net_monthly: f64,
    /// EUR per hour actually worked.
    pub net_hourly: f64,
}

/// Gross to net conversion for one schedule. All methods are pure.
#[derive(Debug, Clone)]
pub struct TaxCalculator {
    schedule: Schedule,
    settings: Settings,
}

impl TaxCalculator {
    pub fn new(schedule: Schedule, settings: Settings) -> Self {
        Self { schedule, settings }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Monthly social insurance contribution on a regular salary.
    pub fn insurance_tax(&self, gross_monthly: f64) -> f64 {
        self.schedule.insurance.eval(gross_monthly)
    }

    /// Social insurance contribution on a holiday salary.
    pub fn holiday_insurance_tax(&self, gross_monthly: f64) -> f64 {
        self.schedule.holiday_insurance.eval(gross_monthly)
    }

    /// Monthly income tax on a regular salary.
    ///
    /// Insurance contributions are tax-free, so they are deducted from all salaries of the year
    /// before spreading the remainder evenly over the 14 salaries.
    pub fn income_tax(&self, gross_monthly: f64) -> f64 {
        let taxable_yearly = gross_monthly * SALARIES_PER_YEAR
            - REGULAR_SALARIES * self.insurance_tax(gross_monthly)
            - HOLIDAY_SALARIES * self.holiday_insurance_tax(gross_monthly);
        self.schedule
            .income_tax
            .eval(taxable_yearly / SALARIES_PER_YEAR)
    }

    /// Income tax on both holiday salaries together.
    pub fn holiday_income_tax(&self, gross_monthly: f64) -> f64 {
        self.schedule
            .holiday_income_tax
            .eval(gross_monthly * HOLIDAY_SALARIES)
    }

    /// Yearly figures for a full-time monthly gross salary, scaled down to the given weekly hours.
    ///
    /// Hours must be positive, otherwise the hourly income isn't finite.
    pub fn annual_breakdown(
        &self,
        gross_monthly_full_time: f64,
        working_hours: f64,
    ) -> SalaryBreakdown {
        let gross_monthly =
            gross_monthly_full_time * working_hours / self.settings.full_time_hours;

        let gross_yearly = gross_monthly * SALARIES_PER_YEAR;
        let income_tax_yearly = self.income_tax(gross_monthly) * REGULAR_SALARIES
            + self.holiday_income_tax(gross_monthly) * HOLIDAY_SALARIES;
        let insurance_tax_yearly = self.insurance_tax(gross_monthly) * REGULAR_SALARIES
            + self.holiday_insurance_tax(gross_monthly) * HOLIDAY_SALARIES;
        let net_yearly = gross_yearly - income_tax_yearly - insurance_tax_yearly
            + REGULAR_SALARIES * self.settings.monthly_benefits;
        let net_monthly = net_yearly / SALARIES_PER_YEAR;
        let net_hourly = net_monthly / self.settings.weeks_per_month / working_hours;

        trace!(
            "Breakdown for {gross_monthly_full_time} at {working_hours}h: gross={gross_yearly}, net={net_yearly}"
        );

        SalaryBreakdown {
            gross_yearly,
            income_tax_yearly,
            insurance_tax_yearly,
            net_yearly,
            net_monthly,
            net_hourly,
        }
    }

    pub fn full_time_breakdown(&self, gross_monthly: f64) -> SalaryBreakdown {
        self.annual_breakdown(gross_monthly, self.settings.full_time_hours)
    }
}
