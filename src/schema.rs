use serde::Deserialize;

// Schedule of one tax year
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ScheduleFile {
    pub year: u32,
    pub insurance: StepTableFile,
    pub holiday_insurance: StepTableFile,
    pub income_tax: BracketTableFile,
    pub holiday_income_tax: BracketTableFile,
}

// Insurance contributions
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct StepTableFile {
    pub steps: Vec<StepEntry>,
    pub cap: CapEntry,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct StepEntry {
    pub from: f64,
    pub percent: f64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct CapEntry {
    pub from: f64,
    pub amount: f64,
}

// Income taxes
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct BracketTableFile {
    #[serde(default)]
    pub allowance: f64,
    pub brackets: Vec<BracketEntry>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct BracketEntry {
    /// `None` for the open-ended top bracket.
    pub upper: Option<f64>,
    pub lower: f64,
    pub percent: f64,
}
