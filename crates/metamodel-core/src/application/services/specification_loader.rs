//! Specification loader - the cache and entry point of the metamodel.
//!
//! Specifications are built lazily on first request and cached by type name.
//! Concurrent first requests for the same type are serialised on a per-type
//! slot so the programming model runs exactly once; requests for other
//! types proceed in parallel. Published entries are read under a shared lock.
//!
//! Build order for one type:
//! 1. superclass chain (checked for cycles, superclass specs loaded first)
//! 2. introspection of the effective class
//! 3. layout overlay
//! 4. publish to the cache
//! 5. referenced types (association, return and parameter types)

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::ports::{ClassSource, PersistenceFilter};
use crate::application::services::introspector::{self, builtin_specification, is_builtin};
use crate::application::services::layout_overlay::LayoutOverlay;
use crate::domain::{
    ObjectSpecification, ProgrammingModel, RawClass, TypeName, ValidationFinding,
    ValidationReport,
};
use crate::error::{MetamodelError, MetamodelResult};

const ORIGIN: &str = "loader";

type Slot = Arc<Mutex<()>>;

fn poisoned(resource: &'static str) -> MetamodelError {
    ApplicationError::LockPoisoned { resource }.into()
}

pub struct SpecificationLoader {
    source: Arc<dyn ClassSource>,
    filter: Arc<dyn PersistenceFilter>,
    model: Arc<ProgrammingModel>,
    overlay: LayoutOverlay,
    cache: RwLock<HashMap<TypeName, Arc<ObjectSpecification>>>,
    in_flight: Mutex<HashMap<TypeName, Slot>>,
    findings: Mutex<Vec<ValidationFinding>>,
}

impl SpecificationLoader {
    pub fn new(
        source: Arc<dyn ClassSource>,
        filter: Arc<dyn PersistenceFilter>,
        model: Arc<ProgrammingModel>,
        overlay: LayoutOverlay,
    ) -> Self {
        Self {
            source,
            filter,
            model,
            overlay,
            cache: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            findings: Mutex::new(Vec::new()),
        }
    }

    pub fn model(&self) -> &ProgrammingModel {
        &self.model
    }

    pub fn overlay(&self) -> &LayoutOverlay {
        &self.overlay
    }

    /// The cached specification of `type_name`, building it on first request.
    #[instrument(skip_all, fields(type_name = %type_name))]
    pub fn load_specification(
        &self,
        type_name: &TypeName,
    ) -> MetamodelResult<Arc<ObjectSpecification>> {
        let type_name = self.filter.substitute(type_name);
        if self.filter.ignores_type(&type_name) {
            return Err(ApplicationError::IgnoredType {
                type_name: type_name.to_string(),
            }
            .into());
        }
        if let Some(spec) = self.cached(&type_name)? {
            return Ok(spec);
        }

        let (spec, built) = self.build_once(&type_name)?;
        if built {
            self.load_referenced(&spec)?;
        }
        Ok(spec)
    }

    /// The cached specification, without building.
    pub fn cached(&self, type_name: &TypeName) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        let cache = self.cache.read().map_err(|_| poisoned("specification cache"))?;
        Ok(cache.get(type_name).cloned())
    }

    /// Snapshot of every published specification, ordered by type name.
    pub fn all_specifications(&self) -> MetamodelResult<Vec<Arc<ObjectSpecification>>> {
        let cache = self.cache.read().map_err(|_| poisoned("specification cache"))?;
        let mut specs: Vec<_> = cache.values().cloned().collect();
        specs.sort_by(|a, b| a.type_name().cmp(b.type_name()));
        Ok(specs)
    }

    /// Published specifications whose direct superclass is `type_name`.
    pub fn subclasses(&self, type_name: &TypeName) -> MetamodelResult<Vec<Arc<ObjectSpecification>>> {
        Ok(self
            .all_specifications()?
            .into_iter()
            .filter(|spec| {
                spec.superclass()
                    .is_some_and(|parent| parent.type_name() == type_name)
            })
            .collect())
    }

    /// Findings accumulated by every build so far.
    pub fn report(&self) -> MetamodelResult<ValidationReport> {
        let findings = self.findings.lock().map_err(|_| poisoned("validation findings"))?;
        let mut report = ValidationReport::new();
        report.extend(findings.iter().cloned());
        Ok(report)
    }

    /// Drop every cached specification, finding and remembered layout absence.
    pub fn clear(&self) -> MetamodelResult<()> {
        self.cache
            .write()
            .map_err(|_| poisoned("specification cache"))?
            .clear();
        self.findings
            .lock()
            .map_err(|_| poisoned("validation findings"))?
            .clear();
        self.overlay.clear()?;
        info!("specification cache cleared");
        Ok(())
    }

    // ── Building ─────────────────────────────────────────────────────────────

    fn slot(&self, type_name: &TypeName) -> MetamodelResult<Slot> {
        let mut in_flight = self.in_flight.lock().map_err(|_| poisoned("in-flight builds"))?;
        Ok(in_flight.entry(type_name.clone()).or_default().clone())
    }

    fn release(&self, type_name: &TypeName) -> MetamodelResult<()> {
        self.in_flight
            .lock()
            .map_err(|_| poisoned("in-flight builds"))?
            .remove(type_name);
        Ok(())
    }

    /// Build and publish under the type's slot. `true` when this call built it.
    fn build_once(&self, type_name: &TypeName) -> MetamodelResult<(Arc<ObjectSpecification>, bool)> {
        let slot = self.slot(type_name)?;
        let _guard = slot.lock().map_err(|_| poisoned("in-flight builds"))?;

        if let Some(spec) = self.cached(type_name)? {
            debug!(%type_name, "built by a concurrent request");
            return Ok((spec, false));
        }

        let result = self.build(type_name).and_then(|(spec, findings)| {
            let spec = Arc::new(spec);
            self.cache
                .write()
                .map_err(|_| poisoned("specification cache"))?
                .insert(type_name.clone(), Arc::clone(&spec));
            self.findings
                .lock()
                .map_err(|_| poisoned("validation findings"))?
                .extend(findings);
            Ok(spec)
        });
        self.release(type_name)?;

        let spec = result?;
        info!(
            %type_name,
            associations = spec.associations(Default::default()).count(),
            actions = spec.object_actions(Default::default()).count(),
            "specification published"
        );
        Ok((spec, true))
    }

    fn build(&self, type_name: &TypeName) -> MetamodelResult<(ObjectSpecification, Vec<ValidationFinding>)> {
        if is_builtin(type_name) {
            return Ok((builtin_specification(type_name).publish(), Vec::new()));
        }

        let class = self.describe(type_name)?;
        let ancestors = self.ancestors(&class)?;
        let superclass = match &class.superclass {
            Some(parent) => Some(self.load_superclass(parent)?),
            None => None,
        };

        let effective = introspector::flatten(&class, &ancestors);
        let (mut staged, mut findings) =
            introspector::introspect(&self.model, self.filter.as_ref(), &effective);
        staged.superclass = superclass;
        self.overlay.apply(&mut staged, &mut findings)?;

        Ok((staged.publish(), findings))
    }

    fn describe(&self, type_name: &TypeName) -> MetamodelResult<RawClass> {
        self.source
            .describe(type_name)?
            .ok_or_else(|| {
                ApplicationError::ClassNotFound {
                    type_name: type_name.to_string(),
                }
                .into()
            })
    }

    /// Raw superclass chain of `class`, nearest first.
    fn ancestors(&self, class: &RawClass) -> MetamodelResult<Vec<RawClass>> {
        let mut seen = HashSet::from([class.name.clone()]);
        let mut chain = vec![class.name.to_string()];
        let mut ancestors = Vec::new();
        let mut next = class.superclass.clone();

        while let Some(parent) = next {
            let parent = self.filter.substitute(&parent);
            chain.push(parent.to_string());
            if !seen.insert(parent.clone()) {
                return Err(ApplicationError::HierarchyCycle {
                    type_name: class.name.to_string(),
                    chain: chain.join(" -> "),
                }
                .into());
            }
            let raw = self.describe(&parent)?;
            next = raw.superclass.clone();
            ancestors.push(raw);
        }
        Ok(ancestors)
    }

    fn load_superclass(&self, parent: &TypeName) -> MetamodelResult<Arc<ObjectSpecification>> {
        let parent = self.filter.substitute(parent);
        if let Some(spec) = self.cached(&parent)? {
            return Ok(spec);
        }
        let (spec, _) = self.build_once(&parent)?;
        Ok(spec)
    }

    /// Load the types `spec` and its ancestors refer to. Unknown types are
    /// reported, not fatal.
    fn load_referenced(&self, spec: &ObjectSpecification) -> MetamodelResult<()> {
        let mut missing = Vec::new();
        let mut level = Some(spec);
        while let Some(current) = level {
            for referenced in current.referenced_types() {
                match self.load_specification(&referenced) {
                    Ok(_) => {}
                    Err(MetamodelError::Application(
                        ApplicationError::ClassNotFound { .. }
                        | ApplicationError::IgnoredType { .. },
                    )) => missing.push((current.type_name().clone(), referenced)),
                    Err(e) => return Err(e),
                }
            }
            level = current.superclass().map(|parent| &**parent);
        }

        if missing.is_empty() {
            return Ok(());
        }
        let mut findings = self.findings.lock().map_err(|_| poisoned("validation findings"))?;
        for (owner, referenced) in missing {
            let finding = ValidationFinding::warning(
                &owner,
                ORIGIN,
                format!("referenced type '{referenced}' has no class description"),
            );
            if !findings.contains(&finding) {
                warn!(type_name = %owner, %referenced, "referenced type has no description");
                findings.push(finding);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockClassSource, MockPersistenceFilter};
    use crate::application::services::layout_overlay::NoLayoutResources;
    use crate::domain::{RawMember, TypeRef};

    fn passthrough() -> MockPersistenceFilter {
        let mut filter = MockPersistenceFilter::new();
        filter.expect_substitute().returning(|t| t.clone());
        filter.expect_ignores_type().returning(|_| false);
        filter.expect_ignores_member().returning(|_| false);
        filter
    }

    fn loader(source: MockClassSource) -> SpecificationLoader {
        SpecificationLoader::new(
            Arc::new(source),
            Arc::new(passthrough()),
            Arc::new(ProgrammingModel::default_model()),
            LayoutOverlay::new(Arc::new(NoLayoutResources)),
        )
    }

    #[test]
    fn sequential_loads_hit_the_cache() {
        let mut source = MockClassSource::new();
        source
            .expect_describe()
            .times(1)
            .returning(|t| Ok(Some(RawClass::new(t.clone()))));
        let loader = loader(source);
        let name = TypeName::new("Invoice");

        let first = loader.load_specification(&name).unwrap();
        let second = loader.load_specification(&name).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_type_is_not_found() {
        let mut source = MockClassSource::new();
        source.expect_describe().returning(|_| Ok(None));
        let loader = loader(source);

        let err = loader.load_specification(&TypeName::new("Ghost")).unwrap_err();
        assert!(matches!(
            err,
            MetamodelError::Application(ApplicationError::ClassNotFound { .. })
        ));
        assert!(loader.all_specifications().unwrap().is_empty());
    }

    #[test]
    fn superclass_cycle_is_rejected() {
        let mut source = MockClassSource::new();
        source.expect_describe().returning(|t| {
            Ok(Some(match t.as_str() {
                "A" => RawClass::new("A").extends("B"),
                _ => RawClass::new("B").extends("A"),
            }))
        });
        let loader = loader(source);

        let err = loader.load_specification(&TypeName::new("A")).unwrap_err();
        assert!(matches!(
            err,
            MetamodelError::Application(ApplicationError::HierarchyCycle { .. })
        ));
    }

    #[test]
    fn referenced_types_are_loaded_and_missing_ones_reported() {
        let mut source = MockClassSource::new();
        source.expect_describe().returning(|t| {
            Ok(match t.as_str() {
                "Order" => Some(
                    RawClass::new("Order")
                        .with_member(RawMember::field("customer", TypeRef::scalar("Customer")))
                        .with_member(RawMember::field("total", TypeRef::scalar("decimal")))
                        .with_member(RawMember::field("coupon", TypeRef::scalar("Coupon"))),
                ),
                "Customer" => Some(
                    RawClass::new("Customer")
                        .with_member(RawMember::field("orders", "list<Order>".parse().unwrap())),
                ),
                _ => None,
            })
        });
        let loader = loader(source);
        loader.load_specification(&TypeName::new("Order")).unwrap();

        let names: Vec<_> = loader
            .all_specifications()
            .unwrap()
            .iter()
            .map(|s| s.type_name().to_string())
            .collect();
        assert_eq!(names, ["Customer", "Order", "decimal"]);

        let report = loader.report().unwrap();
        assert_eq!(report.warning_count(), 1);
        assert!(report.findings()[0].message.contains("Coupon"));
    }

    #[test]
    fn subclasses_are_enumerated() {
        let mut source = MockClassSource::new();
        source.expect_describe().returning(|t| {
            Ok(Some(match t.as_str() {
                "Customer" => RawClass::new("Customer").extends("Party"),
                "Supplier" => RawClass::new("Supplier").extends("Party"),
                _ => RawClass::new("Party"),
            }))
        });
        let loader = loader(source);
        loader.load_specification(&TypeName::new("Customer")).unwrap();
        loader.load_specification(&TypeName::new("Supplier")).unwrap();

        let subclasses = loader.subclasses(&TypeName::new("Party")).unwrap();
        assert_eq!(subclasses.len(), 2);

        loader.clear().unwrap();
        assert!(loader.all_specifications().unwrap().is_empty());
    }
}
