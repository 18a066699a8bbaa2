use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Position of an intake in the wizard. Steps only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ClientInformation,
    IncidentOverview,
    Compensation,
    Uploads,
    GenerateReport,
    RetrieveReports,
    /// Terminal; further retrievals are still accepted
    ReportsRetrieved,
}

impl WizardStep {
    /// 1-based screen number shown to the user
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::ClientInformation => 1,
            WizardStep::IncidentOverview => 2,
            WizardStep::Compensation => 3,
            WizardStep::Uploads => 4,
            WizardStep::GenerateReport => 5,
            WizardStep::RetrieveReports | WizardStep::ReportsRetrieved => 6,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::ClientInformation => Some(WizardStep::IncidentOverview),
            WizardStep::IncidentOverview => Some(WizardStep::Compensation),
            WizardStep::Compensation => Some(WizardStep::Uploads),
            WizardStep::Uploads => Some(WizardStep::GenerateReport),
            WizardStep::GenerateReport => Some(WizardStep::RetrieveReports),
            WizardStep::RetrieveReports => Some(WizardStep::ReportsRetrieved),
            WizardStep::ReportsRetrieved => None,
        }
    }

    /// Whether a submission for `submitted` is valid while the wizard is on `self`
    pub fn accepts(&self, submitted: WizardStep) -> bool {
        match submitted {
            WizardStep::RetrieveReports => matches!(
                self,
                WizardStep::RetrieveReports | WizardStep::ReportsRetrieved
            ),
            other => *self == other,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::ClientInformation => "Client Information",
            WizardStep::IncidentOverview => "Incident Overview",
            WizardStep::Compensation => "Compensation",
            WizardStep::Uploads => "Uploads",
            WizardStep::GenerateReport => "Generate Report",
            WizardStep::RetrieveReports => "Retrieve Reports",
            WizardStep::ReportsRetrieved => "Reports Retrieved",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
