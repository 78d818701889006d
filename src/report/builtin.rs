use std::time::Duration;

use async_trait::async_trait;

use super::{ReportError, ReportService};
use crate::models::FormInputs;

const INTRODUCTION: &str = "**Introduction:**\n\n\
Hello! Thank you for reaching out to AquaSentinel. We understand your concerns \
about the salty taste of your borewell water and the health issues affecting your \
children. Let's look at a plan to improve your water situation.";

const FINDINGS: &str = "**Key Findings:**\n\n\
- **High Salinity:** The salty taste is likely due to high levels of Total Dissolved \
Solids (TDS) in the groundwater, which is common in this region.\n\
- **Contamination Risk:** Stomach illnesses are often caused by bacterial contamination \
(like E. coli) which can enter borewells from nearby surface runoff or sanitation issues.";

const ACTIONS: &str = "**Recommended Actions:**\n\n\
1. **Boil Water:** The simplest and most effective way to kill harmful bacteria is to \
bring water to a rolling boil for at least 1 minute before drinking.\n\
2. **Consider a Biosand Filter:** For a long-term solution, a community biosand filter \
can effectively remove both contaminants and some of the unpleasant taste.\n\
3. **Protect the Borewell Area:** Ensure the area around the borewell is clean, \
elevated, and free from wastewater to prevent future contamination.";

const IMPACT: &str = "**Impact Estimation:**\n\n\
Following these steps, especially boiling water, can reduce the risk of waterborne \
illnesses by over 90%.";

const NEXT_STEPS: &str = "**Next Steps:**\n\n\
We can now create a seasonal plan or an awareness poster for your community. \
Just click on the other tabs!";

/// Offline backend returning the fixed advisory report.
#[derive(Debug, Clone)]
pub struct BuiltinReportService {
    latency: Duration,
}

impl BuiltinReportService {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
        }
    }

    /// The report text for a snapshot. Only the heading varies.
    pub fn render(inputs: &FormInputs) -> String {
        let location = inputs.location.trim();
        [
            format!("### Your AquaSentinel Water Report for {}", location),
            INTRODUCTION.to_string(),
            FINDINGS.to_string(),
            ACTIONS.to_string(),
            IMPACT.to_string(),
            NEXT_STEPS.to_string(),
        ]
        .join("\n\n")
    }
}

#[async_trait]
impl ReportService for BuiltinReportService {
    async fn generate_report(&self, inputs: &FormInputs) -> Result<String, ReportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(Self::render(inputs))
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WaterSource;

    fn inputs(location: &str) -> FormInputs {
        FormInputs {
            location: location.to_string(),
            water_source: WaterSource::Borewell,
            concerns: "Salty".to_string(),
        }
    }

    #[test]
    fn heading_names_location() {
        let text = BuiltinReportService::render(&inputs("  Pune "));
        assert!(text.starts_with("### Your AquaSentinel Water Report for Pune\n\n"));
    }

    #[test]
    fn report_has_all_sections() {
        let text = BuiltinReportService::render(&inputs("Chhattisgarh"));
        for section in [
            "**Introduction:**",
            "**Key Findings:**",
            "**Recommended Actions:**",
            "**Impact Estimation:**",
            "**Next Steps:**",
        ] {
            assert!(text.contains(section), "missing {}", section);
        }
    }

    #[tokio::test]
    async fn generate_report_succeeds_without_latency() {
        let service = BuiltinReportService::new(0);
        let text = service.generate_report(&inputs("Chhattisgarh")).await.unwrap();
        assert!(text.contains("Chhattisgarh"));
        assert_eq!(service.name(), "builtin");
    }
}
