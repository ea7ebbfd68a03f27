//! Naming conventions: natural names, plurals and support-method prefixes.

use std::fmt;

/// Turn an identifier into a human-readable name.
///
/// `firstName`, `first_name` and `FirstName` all become `First Name`.
pub fn natural_name(identifier: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in identifier.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// English plural of a (natural) name.
pub fn pluralize(name: &str) -> String {
    let lower = name.to_lowercase();
    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiouAEIOU".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

// ── Support methods ──────────────────────────────────────────────────────────

/// The behaviour a support method contributes to the member it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportPrefix {
    Hide,
    Disable,
    Validate,
    Choices,
    Default,
    AutoComplete,
}

impl SupportPrefix {
    pub const ALL: [SupportPrefix; 6] = [
        Self::Hide,
        Self::Disable,
        Self::Validate,
        Self::Choices,
        Self::Default,
        Self::AutoComplete,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hide => "hide_",
            Self::Disable => "disable_",
            Self::Validate => "validate_",
            Self::Choices => "choices_",
            Self::Default => "default_",
            Self::AutoComplete => "autocomplete_",
        }
    }

    /// Whether the prefix also has a per-parameter form `<prefix><n>_<member>`.
    pub const fn has_parameter_form(&self) -> bool {
        matches!(self, Self::Choices | Self::Default)
    }
}

/// A method recognised as supporting another member by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SupportMethod {
    pub prefix: SupportPrefix,
    /// Zero-based parameter index for the parameter forms.
    pub param_index: Option<usize>,
    pub member: String,
}

impl SupportMethod {
    /// Recognise `name` as a support method, if it follows a convention.
    pub fn parse(name: &str) -> Option<Self> {
        SupportPrefix::ALL.iter().find_map(|prefix| {
            let rest = name.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                return None;
            }
            if prefix.has_parameter_form() {
                if let Some((index, member)) = rest.split_once('_') {
                    if !member.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                        if let Ok(index) = index.parse::<usize>() {
                            return Some(Self {
                                prefix: *prefix,
                                param_index: Some(index),
                                member: member.to_string(),
                            });
                        }
                    }
                }
            }
            Some(Self {
                prefix: *prefix,
                param_index: None,
                member: rest.to_string(),
            })
        })
    }
}

impl fmt::Display for SupportMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param_index {
            Some(index) => write!(f, "{}{}_{}", self.prefix.as_str(), index, self.member),
            None => write!(f, "{}{}", self.prefix.as_str(), self.member),
        }
    }
}
