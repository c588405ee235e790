use anyhow::Result;
use regex::Regex;

use crate::db::models::ComplianceClass;

/// Priority-ordered classifier for free-text compliance states.
///
/// Order matters: "Grace Period - Pending" would also match the compliant
/// group through other wording, and "Non-Compliant" contains "compliant".
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    groups: Vec<(Regex, ComplianceClass)>,
}

impl StatusClassifier {
    pub fn new() -> Result<Self> {
        let groups = vec![
            (Regex::new(r"(?i)grace")?, ComplianceClass::GracePeriod),
            (
                Regex::new(r"(?i)non[-\s]?compliant|fail|failing|out[-\s]?of[-\s]?comp")?,
                ComplianceClass::NonCompliant,
            ),
            (Regex::new(r"(?i)compliant|pass|passing")?, ComplianceClass::Compliant),
        ];
        Ok(Self { groups })
    }

    pub fn class_of(&self, text: &str) -> Option<ComplianceClass> {
        self.groups
            .iter()
            .find(|(regex, _)| regex.is_match(text))
            .map(|(_, class)| *class)
    }

    /// Classified label, or the input unchanged when no group matches.
    pub fn classify(&self, text: &str) -> String {
        match self.class_of(text) {
            Some(class) => class.as_str().to_string(),
            None => text.to_string(),
        }
    }
}
