//! Prompt text for model-backed report generation.

use crate::models::FormInputs;

pub const SYSTEM_PROMPT: &str = "You are AquaSentinel, a friendly water-safety advisor for \
rural households. Write a short report in markdown. Start with a level-3 heading \
\"Your AquaSentinel Water Report for <location>\", then the bold sections \
Introduction, Key Findings, Recommended Actions, Impact Estimation and Next Steps. \
Prefer low-cost actions a family can take today. Do not include raw HTML.";

/// User message describing one submission.
pub fn user_prompt(inputs: &FormInputs) -> String {
    format!(
        "Location: {}\nWater source: {}\nConcerns: {}",
        inputs.location.trim(),
        inputs.water_source.label(),
        inputs.concerns.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WaterSource;

    #[test]
    fn user_prompt_lists_all_fields() {
        let p = user_prompt(&FormInputs {
            location: " Pune ".into(),
            water_source: WaterSource::RiverStream,
            concerns: "Muddy after rain\n".into(),
        });
        assert_eq!(
            p,
            "Location: Pune\nWater source: River / Stream\nConcerns: Muddy after rain"
        );
    }
}
