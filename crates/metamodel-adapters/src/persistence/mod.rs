//! Persistence filter adapters.
//!
//! Bytecode enhancers add proxy subclasses (`Customer$$Enhanced`) and
//! synthetic members (`dn_stateManager`, `jdo_flags`) that must not show up
//! in the metamodel. [`EnhancementFilter`] strips both; [`NoopFilter`] is for
//! class sources that never contain them.

use std::sync::Arc;

use tracing::debug;

use metamodel_core::{
    application::ports::PersistenceFilter,
    domain::{RawMember, TypeName},
    error::{MetamodelError, MetamodelResult},
};

pub const DEFAULT_MEMBER_PREFIXES: [&str; 2] = ["dn_", "jdo_"];
pub const DEFAULT_PROXY_SUFFIXES: [&str; 2] = ["$$Enhanced", "$$Proxy"];

/// Mechanisms [`from_mechanism`] knows.
pub const MECHANISMS: [&str; 2] = ["enhancement", "none"];

#[derive(Debug, Clone, Default)]
pub struct NoopFilter;

impl PersistenceFilter for NoopFilter {
    fn substitute(&self, type_name: &TypeName) -> TypeName {
        type_name.clone()
    }

    fn ignores_member(&self, _member: &RawMember) -> bool {
        false
    }

    fn ignores_type(&self, _type_name: &TypeName) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct EnhancementFilter {
    member_prefixes: Vec<String>,
    proxy_suffixes: Vec<String>,
}

impl Default for EnhancementFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MEMBER_PREFIXES, DEFAULT_PROXY_SUFFIXES)
    }
}

impl EnhancementFilter {
    pub fn new<P, S>(
        member_prefixes: impl IntoIterator<Item = P>,
        proxy_suffixes: impl IntoIterator<Item = S>,
    ) -> Self
    where
        P: Into<String>,
        S: Into<String>,
    {
        Self {
            member_prefixes: member_prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
            proxy_suffixes: proxy_suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    fn is_synthetic(&self, name: &str) -> bool {
        self.member_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl PersistenceFilter for EnhancementFilter {
    fn substitute(&self, type_name: &TypeName) -> TypeName {
        let name = type_name.as_str();
        for suffix in &self.proxy_suffixes {
            if let Some(real) = name.strip_suffix(suffix.as_str()) {
                debug!(proxy = %type_name, real, "substituting enhanced class");
                return TypeName::new(real);
            }
        }
        type_name.clone()
    }

    fn ignores_member(&self, member: &RawMember) -> bool {
        self.is_synthetic(&member.name)
    }

    /// Helper types the enhancer generates carry the synthetic prefix in
    /// their simple name.
    fn ignores_type(&self, type_name: &TypeName) -> bool {
        self.is_synthetic(type_name.simple_name())
    }
}

/// Build the filter a configuration names.
///
/// # Errors
///
/// An empty or unknown mechanism is a configuration error.
pub fn from_mechanism(
    mechanism: &str,
    member_prefixes: &[String],
    proxy_suffixes: &[String],
) -> MetamodelResult<Arc<dyn PersistenceFilter>> {
    match mechanism.trim().to_ascii_lowercase().as_str() {
        "enhancement" => {
            if member_prefixes.is_empty() && proxy_suffixes.is_empty() {
                Ok(Arc::new(EnhancementFilter::default()))
            } else {
                Ok(Arc::new(EnhancementFilter::new(
                    member_prefixes.iter().cloned(),
                    proxy_suffixes.iter().cloned(),
                )))
            }
        }
        "none" => Ok(Arc::new(NoopFilter)),
        "" => Err(MetamodelError::configuration(format!(
            "persistence.mechanism is not set (expected one of: {})",
            MECHANISMS.join(", ")
        ))),
        other => Err(MetamodelError::configuration(format!(
            "unknown persistence mechanism '{other}' (expected one of: {})",
            MECHANISMS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamodel_core::domain::TypeRef;

    #[test]
    fn enhancement_filter_strips_proxies_and_synthetic_members() {
        let filter = EnhancementFilter::default();

        assert_eq!(
            filter.substitute(&TypeName::new("crm.Customer$$Enhanced")),
            TypeName::new("crm.Customer")
        );
        assert_eq!(
            filter.substitute(&TypeName::new("crm.Customer")),
            TypeName::new("crm.Customer")
        );
        assert!(filter.ignores_member(&RawMember::field("dn_stateManager", TypeRef::scalar("string"))));
        assert!(!filter.ignores_member(&RawMember::field("name", TypeRef::scalar("string"))));
        assert!(filter.ignores_type(&TypeName::new("crm.dn_Helper")));
    }

    #[test]
    fn configured_prefixes_replace_defaults() {
        let filter = from_mechanism("Enhancement", &["ebean_".to_string()], &[]).unwrap();
        assert!(filter.ignores_member(&RawMember::field("ebean_intercept", TypeRef::scalar("string"))));
        assert!(!filter.ignores_member(&RawMember::field("dn_flags", TypeRef::scalar("string"))));
    }

    #[test]
    fn unknown_or_missing_mechanism_is_a_configuration_error() {
        for mechanism in ["", "hibernate"] {
            let err = from_mechanism(mechanism, &[], &[]).err().unwrap();
            assert!(matches!(err, MetamodelError::Configuration { .. }));
        }
        assert!(from_mechanism("none", &[], &[]).is_ok());
    }
}
