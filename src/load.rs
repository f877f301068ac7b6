use crate::schema::ScheduleFile;
use crate::table::{BracketTable, StepTable};
use anyhow::{Context, Result};
use log::{debug, info, trace};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const AUSTRIA_2021: &str = include_str!("../data/austria-2021.json");

/// All tables of one tax year.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub year: u32,
    pub insurance: StepTable,
    pub holiday_insurance: StepTable,
    pub income_tax: BracketTable,
    pub holiday_income_tax: BracketTable,
}

impl Schedule {
    /// Schedule shipped with the binary.
    pub fn austria_2021() -> Result<Self> {
        debug!("Loading embedded schedule for 2021");
        Self::from_json(AUSTRIA_2021).context("Invalid embedded schedule for 2021")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading schedule from {}", path.display());
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let schedule: ScheduleFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Self::try_from(&schedule).with_context(|| format!("Invalid schedule in {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let schedule: ScheduleFile = serde_json::from_str(json)?;
        Self::try_from(&schedule)
    }
}

impl TryFrom<&ScheduleFile> for Schedule {
    type Error = anyhow::Error;

    fn try_from(schedule: &ScheduleFile) -> Result<Self, Self::Error> {
        trace!("Schedule file: {schedule:?}");
        Ok(Schedule {
            year: schedule.year,
            insurance: StepTable::try_from(&schedule.insurance).context("Insurance table")?,
            holiday_insurance: StepTable::try_from(&schedule.holiday_insurance)
                .context("Holiday insurance table")?,
            income_tax: BracketTable::try_from(&schedule.income_tax)
                .context("Income tax table")?,
            holiday_income_tax: BracketTable::try_from(&schedule.holiday_income_tax)
                .context("Holiday income tax table")?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_embedded_schedule() {
        let schedule = Schedule::austria_2021().unwrap();
        assert_eq!(schedule.year, 2021);
        assert_eq!(schedule.income_tax.allowance(), 0.0);
        assert_eq!(schedule.income_tax.tax_free_limit(), 1099.33);
        assert_eq!(schedule.holiday_income_tax.allowance(), 2100.0);
        assert_eq!(schedule.holiday_income_tax.tax_free_limit(), 2720.0);
        assert_eq!(
            schedule.insurance.cutoffs().collect::<Vec<_>>(),
            vec![478.81, 1790.0, 1953.0, 2117.0, 5550.0]
        );
        assert_eq!(
            schedule.holiday_insurance.cutoffs().collect::<Vec<_>>(),
            vec![475.86, 1790.0, 1953.0, 2117.0, 5550.0]
        );
    }

    #[test]
    fn load_from_path() {
        let path = std::env::temp_dir().join(format!("schedule-{}.json", std::process::id()));
        File::create(&path)
            .unwrap()
            .write_all(AUSTRIA_2021.as_bytes())
            .unwrap();
        let schedule = Schedule::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(schedule, Schedule::austria_2021().unwrap());
    }

    #[test]
    fn missing_file() {
        let error = Schedule::from_path("does/not/exist.json").unwrap_err();
        assert!(format!("{error:#}").contains("Failed to open"));
    }

    #[test]
    fn invalid_table_is_reported() {
        let json = AUSTRIA_2021.replace(
            r#"{ "Upper": 7516.0, "Lower": 5016.0, "Percent": 48.0 }"#,
            r#"{ "Upper": 7516.0, "Lower": 5016.0, "Percent": 148.0 }"#,
        );
        assert_ne!(json, AUSTRIA_2021);
        let error = Schedule::from_json(&json).unwrap_err();
        let message = format!("{error:#}");
        assert!(message.contains("Income tax table"), "{message}");
        assert!(message.contains("148"), "{message}");
    }
}
