//! Accumulated validation findings.
//!
//! Factories, the layout overlay and the loader record problems here instead
//! of failing; the report is inspected at startup or on demand.

use std::fmt;

use serde::Serialize;

use crate::domain::value_objects::TypeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    pub type_name: TypeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub severity: Severity,
    /// Factory id, validator id or subsystem that raised the finding.
    pub origin: String,
    pub message: String,
}

impl ValidationFinding {
    pub fn warning(type_name: &TypeName, origin: &str, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.clone(),
            member: None,
            severity: Severity::Warning,
            origin: origin.to_string(),
            message: message.into(),
        }
    }

    pub fn error(type_name: &TypeName, origin: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::warning(type_name, origin, message)
        }
    }

    pub fn on_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(
                f,
                "[{}] {}#{}: {} ({})",
                self.severity, self.type_name, member, self.message, self.origin
            ),
            None => write!(
                f,
                "[{}] {}: {} ({})",
                self.severity, self.type_name, self.message, self.origin
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: ValidationFinding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = ValidationFinding>) {
        self.findings.extend(findings);
    }

    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    pub fn for_type<'a>(
        &'a self,
        type_name: &'a TypeName,
    ) -> impl Iterator<Item = &'a ValidationFinding> + 'a {
        self.findings.iter().filter(move |f| &f.type_name == type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Sort by type, member, then severity (errors last).
    pub fn sort(&mut self) {
        self.findings.sort_by(|a, b| {
            a.type_name
                .cmp(&b.type_name)
                .then_with(|| a.member.cmp(&b.member))
                .then_with(|| a.severity.cmp(&b.severity))
        });
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationFinding;
    type IntoIter = std::vec::IntoIter<ValidationFinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let ty = TypeName::new("Customer");
        let mut report = ValidationReport::new();
        report.push(ValidationFinding::warning(&ty, "layout", "orphan node 'x'"));
        report.push(ValidationFinding::error(&ty, "support-methods", "bad signature").on_member("name"));

        assert_eq!(report.len(), 2);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn display_includes_member() {
        let ty = TypeName::new("Order");
        let finding = ValidationFinding::error(&ty, "support-methods", "boom").on_member("total");
        assert_eq!(finding.to_string(), "[error] Order#total: boom (support-methods)");
    }
}
