//! Tests for archive upload and transformation through the platform.
mod common;
use common::*;
use std::fs;
use std::sync::Arc;
use topospec::prelude::*;

fn platform_with_catalog() -> (Platform, Arc<InMemoryCatalog>) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let platform = Platform::new(
        catalog.clone(),
        catalog.clone(),
        Arc::new(DeclaredAttributeResolver),
    )
    .expect("failed to create platform");
    (platform, catalog)
}

#[test]
fn test_upload_then_transform() {
    let (platform, catalog) = platform_with_catalog();
    let admin = ActingIdentity::admin("alice");

    let result = platform
        .upload_single_document(&admin, TWO_NODE_TOPOLOGY_JSON.as_bytes(), "shop.json")
        .expect("upload failed");
    assert_eq!(result.topology.as_deref(), Some("shop"));
    assert!(catalog.contains("shop", "1.0.0"));

    let app = platform
        .transform(&ActingIdentity::operator("bob"), "shop")
        .expect("transform failed");
    let web = find_child_by_plan_id(&app.root, "n1", "test").unwrap();
    assert_eq!(web.policies().count(), 1);
    assert_eq!(app.stats.decorations, 1);
}

#[test]
fn test_platform_type_mappings_apply_to_transformations() {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.register(create_two_node_topology());
    let platform = Platform::new(
        catalog.clone(),
        catalog,
        Arc::new(DeclaredAttributeResolver),
    )
    .unwrap()
    .with_type_mapping("tosca.nodes.Database", "org.example.Postgres");

    let app = platform
        .transform(&ActingIdentity::operator("bob"), "shop")
        .unwrap();
    let db = find_child_by_plan_id(&app.root, "n2", "test").unwrap();
    assert_eq!(db.entity_type(), "org.example.Postgres");
}

#[test]
fn test_parse_errors_are_reported_with_diagnostics() {
    let (platform, _) = platform_with_catalog();
    let err = platform
        .upload_single_document(&ActingIdentity::admin("alice"), "{not json".as_bytes(), "broken")
        .unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Could not parse broken:"), "{message}");
    assert!(message.contains("[ERROR]"), "{message}");
    match err {
        TransformError::ParseDiagnostic { diagnostics, .. } => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].level, ParseLevel::Error);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_latest_version_is_transformed() {
    let (platform, _) = platform_with_catalog();
    let admin = ActingIdentity::admin("alice");
    platform
        .upload_single_document(&admin, TWO_NODE_TOPOLOGY_JSON.as_bytes(), "shop.json")
        .unwrap();
    let newer = TWO_NODE_TOPOLOGY_JSON.replace("\"1.0.0\"", "\"1.2.0\"");
    platform
        .upload_single_document(&admin, newer.as_bytes(), "shop.json")
        .unwrap();

    let app = platform.transform(&admin, "shop").unwrap();
    assert_eq!(app.version, "1.2.0");
}

#[test]
fn test_load_types_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("shop.json"), TWO_NODE_TOPOLOGY_JSON).unwrap();
    let (platform, catalog) = platform_with_catalog();

    platform
        .load_types_from_path(&ActingIdentity::admin("alice"), dir.path())
        .unwrap();

    assert!(catalog.contains("shop", "1.0.0"));
    assert!(dir.path().join("shop.json").exists());
}

#[test]
fn test_operators_cannot_load_types() {
    let dir = tempfile::tempdir().unwrap();
    let (platform, _) = platform_with_catalog();

    assert!(matches!(
        platform.load_types_from_path(&ActingIdentity::operator("bob"), dir.path()),
        Err(TransformError::PermissionDenied { .. })
    ));
}

#[test]
fn test_blueprint_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.blueprint");
    let path = path.to_string_lossy();

    let (platform, catalog) = platform_with_catalog();
    catalog.register(create_two_node_topology());
    let blueprint = platform
        .transform(&ActingIdentity::operator("bob"), "shop")
        .unwrap()
        .into_blueprint();

    blueprint.save(&path).unwrap();
    let loaded = Blueprint::from_file(&path).unwrap();
    assert_eq!(loaded, blueprint);
}

#[test]
fn test_type_bundle_loads_members_independently() {
    let bundle = tempfile::tempdir().unwrap();
    fs::create_dir_all(bundle.path().join("a-broken")).unwrap();
    fs::write(bundle.path().join("a-broken/types.json"), "{oops").unwrap();
    fs::create_dir_all(bundle.path().join("b-shop")).unwrap();
    fs::write(bundle.path().join("b-shop/shop.json"), TWO_NODE_TOPOLOGY_JSON).unwrap();
    fs::write(bundle.path().join("notes.json"), "{}").unwrap();
    let (platform, catalog) = platform_with_catalog();

    let members = platform
        .load_type_bundle(&ActingIdentity::admin("alice"), bundle.path())
        .expect("bundle load failed");

    let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a-broken", "b-shop"]);
    assert!(matches!(
        &members[0].result,
        Err(TransformError::ParseDiagnostic { archive, .. }) if archive == "a-broken"
    ));
    assert!(members[1].result.is_ok());
    assert!(catalog.contains("shop", "1.0.0"));
}

#[test]
fn test_type_bundle_requires_admin() {
    let bundle = tempfile::tempdir().unwrap();
    let (platform, _) = platform_with_catalog();

    assert!(matches!(
        platform.load_type_bundle(&ActingIdentity::operator("bob"), bundle.path()),
        Err(TransformError::PermissionDenied { .. })
    ));
}
