use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The fixed set of normalized attributes every source column maps onto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Hostname,
    Os,
    DeviceType,
    ComplianceStatus,
    LastSeen,
    PercentPassing,
    EndOfLife,
    CrowdstrikeStatus,
    TaniumStatus,
    JamfStatus,
}

/// Built-in header patterns, evaluated top to bottom against the normalized
/// header. Patterns are anchored at the start; the percent rule is a prefix
/// match on purpose so "percent_of_checks_passing_(30d)" still maps.
const BUILTIN_RULES: &[(&str, CanonicalField)] = &[
    (
        r"^(host.?name|computer(_name)?|machine(_name)?|asset_?name|device_?name)$",
        CanonicalField::Hostname,
    ),
    (
        r"^((normalized_)?os(_platform|_name|_version)?|operating_system)$",
        CanonicalField::Os,
    ),
    (r"^(system|device)_?type$", CanonicalField::DeviceType),
    (
        r"^(endpoint_?compliance|compliance_?status)$",
        CanonicalField::ComplianceStatus,
    ),
    (
        r"^(compliance_?last_?scan(_date)?|last_?seen|last_?check[-_]?in)$",
        CanonicalField::LastSeen,
    ),
    (
        r"^percent.*passing|^%.*passing|^passing_?%$",
        CanonicalField::PercentPassing,
    ),
    (r"^(end_?of_?life|eol)$", CanonicalField::EndOfLife),
    (r"^crowdstrike_?status$", CanonicalField::CrowdstrikeStatus),
    (r"^tanium_?status$", CanonicalField::TaniumStatus),
    (r"^jamf_?status$", CanonicalField::JamfStatus),
];

/// Extra header pattern supplied through settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnAlias {
    pub pattern: String,
    pub field: CanonicalField,
}

/// Ordered (matcher, field) table. The first rule whose pattern matches a
/// normalized header decides the field.
#[derive(Debug, Clone)]
pub struct ColumnRules {
    rules: Vec<(Regex, CanonicalField)>,
}

impl ColumnRules {
    pub fn builtin() -> Result<Self> {
        Self::with_aliases(&[])
    }

    /// Built-in rules followed by `aliases` in the order given.
    pub fn with_aliases(aliases: &[ColumnAlias]) -> Result<Self> {
        let builtin = BUILTIN_RULES
            .iter()
            .map(|(pattern, field)| (pattern.to_string(), *field));
        let extra = aliases
            .iter()
            .map(|alias| (alias.pattern.clone(), alias.field));

        let rules = builtin
            .chain(extra)
            .map(|(pattern, field)| {
                let regex = Regex::new(&format!("(?i){pattern}"))
                    .with_context(|| format!("invalid column pattern '{pattern}'"))?;
                Ok((regex, field))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn field_for(&self, header: &str) -> Option<CanonicalField> {
        let normalized = normalize_header(header);
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(&normalized))
            .map(|(_, field)| *field)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Trim, lowercase, and collapse each whitespace run to `_`.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
