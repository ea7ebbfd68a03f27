//! Builds a metamodel from manifests and layout files on disk.

use std::{fs, path::Path, sync::Arc};

use metamodel_adapters::{DirectoryClassSource, EnhancementFilter, FsLayoutProvider};
use metamodel_core::prelude::*;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "classes/crm.toml",
        r#"
[[class]]
name = "crm.Customer"

[class.attributes]
object_type = "crm.Customer"
persistable = true

[[class.members]]
name = "name"
type = "string"
attributes = { max_length = 80 }

[[class.members]]
name = "dn_stateManager"
type = "string"

[[class.members]]
name = "orders"
type = "list<crm.Order>"

[[class]]
name = "crm.Order"

[[class.members]]
name = "total"
type = "decimal"
"#,
    );
    write(
        temp.path(),
        "layouts/crm.Customer.layout.json",
        r#"{ "tabGroups": [ { "tabs": [ { "name": "Customer", "columns": [ { "span": 8,
             "propertyGroups": [ { "name": "Identity", "properties": [ { "id": "name" } ] } ] } ] } ] } ] }"#,
    );
    temp
}

fn service(root: &Path) -> MetamodelService {
    let context = MetamodelContext::builder()
        .class_source(Arc::new(DirectoryClassSource::open(root.join("classes")).unwrap()))
        .layout_provider(Arc::new(FsLayoutProvider::new(root.join("layouts"))))
        .persistence_filter(Arc::new(EnhancementFilter::default()))
        .build()
        .unwrap();
    MetamodelService::new(Arc::new(context))
}

#[test]
fn proxy_names_resolve_to_the_enhanced_class() {
    let temp = fixture();
    let service = service(temp.path());

    let real = service.specification("crm.Customer").unwrap();
    let proxy = service.specification("crm.Customer$$Enhanced").unwrap();
    assert!(Arc::ptr_eq(&real, &proxy));

    let ids: Vec<_> = real.associations(Default::default()).map(|a| a.id()).collect();
    assert_eq!(ids, ["name", "orders"]);
}

#[test]
fn authored_layout_is_kept_and_completed() {
    let temp = fixture();
    let service = service(temp.path());

    let spec = service.specification("crm.Customer").unwrap();
    let layout = spec.layout().unwrap();
    assert_eq!(layout.tab_groups[0].tabs[0].columns[0].property_groups[0].name, "Identity");
    assert_eq!(layout.tab_groups[1].tabs[0].columns[0].collections[0].id, "orders");

    let info = service.describe("crm.Customer").unwrap();
    assert!(info.layout_orphans.is_empty());
}

#[test]
fn validation_runs_over_every_manifest() {
    let temp = fixture();
    let service = service(temp.path());

    let report = service.validate().unwrap();
    assert!(!report.has_errors(), "{:?}", report.findings());

    let listed: Vec<_> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|s| s.type_name)
        .collect();
    assert_eq!(listed, ["crm.Customer", "crm.Order"]);
}
