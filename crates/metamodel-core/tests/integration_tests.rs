//! Integration tests for metamodel-core.
//!
//! These drive the public API end to end with small in-file port
//! implementations; the adapters crate is not involved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use metamodel_core::domain::facet::{Facet, FacetKind, FacetType};
use metamodel_core::domain::programming_model::ClassContext;
use metamodel_core::domain::{
    FacetFactory, FacetedElement, FeatureTypes, ProgrammingModel, RawClass, RawMember, TypeName,
    TypeRef,
};
use metamodel_core::error::MetamodelResult;
use metamodel_core::prelude::*;

// ============================================================================
// Fake ports
// ============================================================================

struct Classes(Vec<RawClass>);

impl ClassSource for Classes {
    fn describe(&self, type_name: &TypeName) -> MetamodelResult<Option<RawClass>> {
        Ok(self.0.iter().find(|c| &c.name == type_name).cloned())
    }

    fn type_names(&self) -> MetamodelResult<Vec<TypeName>> {
        Ok(self.0.iter().map(|c| c.name.clone()).collect())
    }
}

/// Layout documents that can be edited between builds.
#[derive(Default)]
struct Layouts {
    documents: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
}

impl Layouts {
    fn put(&self, type_name: &str, json: &str) {
        self.documents
            .lock()
            .unwrap()
            .insert(type_name.to_string(), json.to_string());
    }
}

impl LayoutResourceProvider for Layouts {
    fn load(&self, type_name: &TypeName) -> MetamodelResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.lock().unwrap().get(type_name.as_str()).cloned())
    }
}

struct Passthrough;

impl PersistenceFilter for Passthrough {
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

/// Counts how often the class-level pipeline runs.
struct CountingFactory(Arc<AtomicUsize>);

impl FacetFactory for CountingFactory {
    fn id(&self) -> &'static str {
        "counting"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        if ctx.class.name.as_str() == "Invoice" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn context(classes: Vec<RawClass>, layouts: Arc<Layouts>) -> (MetamodelContext, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut model = ProgrammingModel::default_model();
    model.push(Box::new(CountingFactory(Arc::clone(&runs)))).unwrap();

    let context = MetamodelContext::builder()
        .class_source(Arc::new(Classes(classes)))
        .persistence_filter(Arc::new(Passthrough))
        .layout_provider(layouts)
        .programming_model(model)
        .build()
        .unwrap();
    (context, runs)
}

fn invoice() -> RawClass {
    RawClass::new("Invoice")
        .with_member(RawMember::field("number", TypeRef::scalar("string")))
        .with_member(RawMember::field("amount", TypeRef::scalar("decimal")))
}

fn member_order(element: &impl FacetedElement) -> (String, String) {
    match element.facet(FacetType::MemberOrder).map(Facet::kind) {
        Some(FacetKind::MemberOrder { name, sequence }) => (name.clone(), sequence.clone()),
        other => panic!("expected a member order facet, got {other:?}"),
    }
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn sequential_loads_share_one_specification() {
    let (context, runs) = context(vec![invoice()], Arc::default());
    let name = TypeName::new("Invoice");

    let specs: Vec<_> = (0..5)
        .map(|_| context.loader().load_specification(&name).unwrap())
        .collect();

    assert!(specs.iter().all(|s| Arc::ptr_eq(s, &specs[0])));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_loads_run_the_pipeline_once() {
    let (context, runs) = context(vec![invoice()], Arc::default());
    let context = Arc::new(context);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context
                    .loader()
                    .load_specification(&TypeName::new("Invoice"))
                    .unwrap()
            })
        })
        .collect();
    let specs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(specs.iter().all(|s| Arc::ptr_eq(s, &specs[0])));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn clear_forces_a_rebuild() {
    let (context, runs) = context(vec![invoice()], Arc::default());
    let name = TypeName::new("Invoice");

    let before = context.loader().load_specification(&name).unwrap();
    context.clear().unwrap();
    let after = context.loader().load_specification(&name).unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn generated_layout_places_properties_in_general_group() {
    let customer = RawClass::new("Customer")
        .with_member(RawMember::field("name", TypeRef::scalar("string")))
        .with_member(RawMember::field("age", TypeRef::scalar("int")));
    let (context, _) = context(vec![customer], Arc::default());

    let spec = context
        .loader()
        .load_specification(&TypeName::new("Customer"))
        .unwrap();

    let layout = spec.layout().expect("layout facet");
    let group = &layout.tab_groups[0].tabs[0].columns[0].property_groups[0];
    assert_eq!(group.name, "General");
    let ids: Vec<_> = group.properties.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["name", "age"]);

    assert_eq!(
        member_order(spec.association("name").unwrap()),
        ("General".to_string(), "1".to_string())
    );
    assert_eq!(
        member_order(spec.association("age").unwrap()),
        ("General".to_string(), "2".to_string())
    );
}

#[test]
fn unplaced_collection_gets_its_own_tab_group() {
    let customer = RawClass::new("Customer")
        .with_member(RawMember::field("name", TypeRef::scalar("string")))
        .with_member(RawMember::field("orders", "list<Order>".parse().unwrap()));
    let order = RawClass::new("Order");
    let layouts = Arc::new(Layouts::default());
    layouts.put(
        "Customer",
        r#"{ "tabGroups": [ { "tabs": [ { "name": "Main", "columns": [ { "span": 12,
             "propertyGroups": [ { "name": "General", "properties": [ { "id": "name" } ] } ] } ] } ] } ] }"#,
    );
    let (context, _) = context(vec![customer, order], layouts);

    let spec = context
        .loader()
        .load_specification(&TypeName::new("Customer"))
        .unwrap();
    let layout = spec.layout().unwrap();

    assert_eq!(layout.tab_groups.len(), 2);
    let tab = &layout.tab_groups[1].tabs[0];
    assert_eq!(tab.columns.len(), 1);
    assert_eq!(tab.columns[0].span, 12);
    assert_eq!(tab.columns[0].collections[0].id, "orders");
    assert_eq!(tab.name, "orders");
}

#[test]
fn authored_layout_decides_member_order() {
    let customer = RawClass::new("Customer")
        .with_member(RawMember::field("a", TypeRef::scalar("string")))
        .with_member(RawMember::field("b", TypeRef::scalar("string")))
        .with_member(RawMember::field("c", TypeRef::scalar("string")))
        .with_member(RawMember::field("d", TypeRef::scalar("string")))
        .with_member(RawMember::field("invoices", "list<Order>".parse().unwrap()))
        .with_member(RawMember::field("orders", "list<Order>".parse().unwrap()));
    let layouts = Arc::new(Layouts::default());
    layouts.put(
        "Customer",
        r#"{ "tabGroups": [
             { "tabs": [ { "name": "Main", "columns": [ { "span": 12, "propertyGroups": [
                 { "name": "Details", "properties": [ { "id": "d" }, { "id": "c" } ] },
                 { "name": "General", "properties": [ { "id": "b" }, { "id": "a" } ] } ] } ] } ] },
             { "tabs": [
                 { "name": "Orders", "columns": [ { "span": 12, "collections": [ { "id": "orders" } ] } ] },
                 { "name": "Invoices", "columns": [ { "span": 12, "collections": [ { "id": "invoices" } ] } ] } ] } ] }"#,
    );
    let (context, _) = context(vec![customer, RawClass::new("Order")], layouts);

    let spec = context
        .loader()
        .load_specification(&TypeName::new("Customer"))
        .unwrap();

    let properties: Vec<_> = spec.properties().map(|p| p.id()).collect();
    assert_eq!(properties, ["d", "c", "b", "a"]);
    let collections: Vec<_> = spec.collections().map(|c| c.id()).collect();
    assert_eq!(collections, ["orders", "invoices"]);
    let all: Vec<_> = spec.associations(Default::default()).map(|a| a.id()).collect();
    assert_eq!(all, ["d", "c", "b", "a", "orders", "invoices"]);
    assert_eq!(
        member_order(spec.association("a").unwrap()),
        ("General".to_string(), "2".to_string())
    );
}

#[test]
fn malformed_layout_is_retried_while_missing_layout_is_remembered() {
    let layouts = Arc::new(Layouts::default());
    layouts.put("Invoice", "{ \"tabGroups\": [");
    let (context, _) = context(vec![invoice(), RawClass::new("Note")], Arc::clone(&layouts));
    let invoice_name = TypeName::new("Invoice");

    let spec = context.loader().load_specification(&invoice_name).unwrap();
    assert!(!spec.contains_facet(FacetType::Layout));
    assert_eq!(context.loader().report().unwrap().warning_count(), 1);
    assert!(!context.loader().overlay().is_blacklisted(&invoice_name).unwrap());

    layouts.put(
        "Invoice",
        r#"{ "tabGroups": [ { "tabs": [ { "name": "Details", "columns": [ { "span": 12 } ] } ] } ] }"#,
    );
    context.clear().unwrap();
    let spec = context.loader().load_specification(&invoice_name).unwrap();
    assert_eq!(spec.layout().unwrap().tab_groups[0].tabs[0].name, "Details");

    let note = TypeName::new("Note");
    let reads_before = layouts.reads.load(Ordering::SeqCst);
    context.loader().load_specification(&note).unwrap();
    assert!(context.loader().overlay().is_blacklisted(&note).unwrap());
    assert_eq!(layouts.reads.load(Ordering::SeqCst), reads_before + 1);
}

// ============================================================================
// Programming model ordering
// ============================================================================

struct FixedTitle(&'static str, &'static str);

impl FacetFactory for FixedTitle {
    fn id(&self) -> &'static str {
        self.0
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        ctx.holder.add_facet(Facet::new(FacetKind::DescribedAs {
            text: self.1.to_string(),
        }));
    }
}

/// Installs a protected description that later factories cannot replace.
struct LockedTitle(&'static str);

impl FacetFactory for LockedTitle {
    fn id(&self) -> &'static str {
        "locked-title"
    }

    fn feature_types(&self) -> FeatureTypes {
        FeatureTypes::OBJECT
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) {
        ctx.holder.add_facet(Facet::protected(FacetKind::DescribedAs {
            text: self.0.to_string(),
        }));
    }
}

#[test]
fn later_factory_wins_unless_protected() {
    let describe = |model: ProgrammingModel| {
        let context = MetamodelContext::builder()
            .class_source(Arc::new(Classes(vec![RawClass::new("Invoice")])))
            .persistence_filter(Arc::new(Passthrough))
            .programming_model(model)
            .build()
            .unwrap();
        let spec = context
            .loader()
            .load_specification(&TypeName::new("Invoice"))
            .unwrap();
        spec.facet(FacetType::DescribedAs)
            .and_then(Facet::text)
            .map(str::to_string)
    };

    let forward = ProgrammingModel::new()
        .add_factory(FixedTitle("f1", "first"))
        .unwrap()
        .add_factory(FixedTitle("f2", "second"))
        .unwrap();
    let backward = ProgrammingModel::new()
        .add_factory(FixedTitle("f2", "second"))
        .unwrap()
        .add_factory(FixedTitle("f1", "first"))
        .unwrap();

    assert_eq!(describe(forward).as_deref(), Some("second"));
    assert_eq!(describe(backward).as_deref(), Some("first"));

    let locked = ProgrammingModel::new()
        .add_factory(LockedTitle("locked"))
        .unwrap()
        .add_factory(FixedTitle("f2", "second"))
        .unwrap();
    assert_eq!(describe(locked).as_deref(), Some("locked"));
}

#[test]
fn subclass_inherits_and_overrides_members() {
    let party = RawClass::new("Party")
        .abstract_class()
        .with_member(RawMember::field("name", TypeRef::scalar("string")));
    let customer = RawClass::new("Customer")
        .extends("Party")
        .with_member(RawMember::field("rating", TypeRef::scalar("int")));
    let (context, _) = context(vec![party, customer], Arc::default());

    let spec = context
        .loader()
        .load_specification(&TypeName::new("Customer"))
        .unwrap();
    let ids: Vec<_> = spec.properties().map(|p| p.id().to_string()).collect();
    assert_eq!(ids, ["name", "rating"]);
    assert!(spec.is_of_type(&TypeName::new("Party")));
    assert!(spec.superclass().unwrap().is_abstract());
}
