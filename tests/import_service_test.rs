//! End-to-end tests for ImportService over real TOML files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use lfmerge::application::services::ImportService;
use lfmerge::application::ApplicationError;
use lfmerge::config::Settings;
use lfmerge::domain::{FilterKind, UnresolvedMembers};
use lfmerge::infrastructure::document::TomlDocumentStore;
use lfmerge::infrastructure::traits::DocumentStore;

fn create_document(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write document file");
    path
}

fn service(policy: UnresolvedMembers) -> ImportService {
    ImportService::new(Arc::new(TomlDocumentStore), policy)
}

fn load(path: &Path) -> lfmerge::domain::Document {
    TomlDocumentStore.load(path).unwrap()
}

const SOURCE_WITH_GROUP: &str = r#"name = "template"

[[layers]]
handle = 1
name = "D1"
color = 1

[[layers]]
handle = 2
name = "D2"
color = 2

[[filters]]
name = "Doors"
layers = [1, 2]
"#;

#[test]
fn given_group_filter_when_importing_then_layers_cloned_and_remapped() {
    // Arrange - destination already holds an unrelated layer at handle 1
    let temp = TempDir::new().unwrap();
    let source = create_document(&temp, "template.toml", SOURCE_WITH_GROUP);
    let dest = create_document(
        &temp,
        "site.toml",
        r#"[[layers]]
handle = 1
name = "EXISTING"
"#,
    );

    // Act
    let report = service(UnresolvedMembers::Drop)
        .import(&dest, &source)
        .unwrap();

    // Assert - both source layers arrived under fresh handles
    let merged = load(&dest);
    assert_eq!(merged.layers.len(), 3);
    let group = merged.filters.find("Doors").unwrap();
    let FilterKind::Group(members) = &group.kind else {
        panic!("Doors should be a group");
    };
    assert_eq!(members.len(), 2);
    let mut names: Vec<_> = members
        .iter()
        .map(|id| merged.layers.get(*id).unwrap().name.clone())
        .collect();
    names.sort();
    assert_eq!(names, ["D1", "D2"]);
    // no member points back at a source handle by accident
    assert!(members
        .iter()
        .all(|id| merged.layers.get(*id).unwrap().name != "EXISTING"));

    assert_eq!(report.stats.groups_created, 1);
    assert_eq!(report.stats.members_mapped, 2);
    assert_eq!(report.stats.members_dropped, 0);
}

#[test]
fn given_same_named_layer_when_importing_then_record_is_replaced_in_place() {
    // Arrange - destination has D1 too, with different properties
    let temp = TempDir::new().unwrap();
    let source = create_document(&temp, "template.toml", SOURCE_WITH_GROUP);
    let dest = create_document(
        &temp,
        "site.toml",
        r#"[[layers]]
handle = 9
name = "D1"
color = 250
frozen = true
"#,
    );

    // Act
    service(UnresolvedMembers::Drop)
        .import(&dest, &source)
        .unwrap();

    // Assert - the handle survives, the content comes from the source
    let merged = load(&dest);
    let d1 = merged.layers.get(lfmerge::domain::LayerId(9)).unwrap();
    assert_eq!(d1.color, 1);
    assert!(!d1.frozen);
    // D2 had no name match and was created fresh
    assert!(merged.layers.find_by_name("D2").is_some());
}

#[test]
fn given_existing_filter_when_importing_then_it_keeps_its_expression_and_gains_children() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let source = create_document(
        &temp,
        "template.toml",
        r#"[[filters]]
name = "Walls"
expression = 'NAME == "A-WALL*"'

  [[filters.filters]]
  name = "Interior"
  expression = 'NAME == "*INTR*"'
"#,
    );
    let dest = create_document(
        &temp,
        "site.toml",
        r#"[[filters]]
name = "Walls"
expression = 'NAME == "W*"'

[[filters]]
name = "Local"
expression = 'FROZEN == "true"'
"#,
    );

    // Act
    let report = service(UnresolvedMembers::Drop)
        .import(&dest, &source)
        .unwrap();

    // Assert - pre-existing nodes untouched, missing child appended
    let merged = load(&dest);
    let walls = merged.filters.find("Walls").unwrap();
    assert_eq!(walls.kind, FilterKind::Expression("NAME == \"W*\"".into()));
    assert!(walls.find_child("Interior").is_some());
    assert!(merged.filters.find("Local").is_some());
    assert_eq!(report.stats.filters_created, 1);
}

#[test]
fn given_expression_filter_when_importing_then_matching_layers_are_cloned() {
    // Arrange - the expression selects two of the three source layers
    let temp = TempDir::new().unwrap();
    let source = create_document(
        &temp,
        "template.toml",
        r#"[[layers]]
handle = 1
name = "A-WALL-FULL"

[[layers]]
handle = 2
name = "A-WALL-PRHT"

[[layers]]
handle = 3
name = "A-DOOR"

[[filters]]
name = "Walls"
expression = 'NAME == "A-WALL*"'
"#,
    );
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");

    // Act
    service(UnresolvedMembers::Drop)
        .import(&dest, &source)
        .unwrap();

    // Assert
    let merged = load(&dest);
    assert!(merged.layers.find_by_name("A-WALL-FULL").is_some());
    assert!(merged.layers.find_by_name("A-WALL-PRHT").is_some());
    assert!(merged.layers.find_by_name("A-DOOR").is_none());
}

#[test]
fn given_merged_destination_when_importing_again_then_file_unchanged() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let source = create_document(&temp, "template.toml", SOURCE_WITH_GROUP);
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");
    let svc = service(UnresolvedMembers::Drop);

    // Act
    svc.import(&dest, &source).unwrap();
    let after_first = std::fs::read_to_string(&dest).unwrap();
    let report = svc.import(&dest, &source).unwrap();
    let after_second = std::fs::read_to_string(&dest).unwrap();

    // Assert
    assert_eq!(after_first, after_second);
    assert_eq!(report.stats.groups_created, 0);
    assert_eq!(report.stats.filters_created, 0);
}

#[test]
fn given_dangling_group_member_when_failing_then_destination_untouched() {
    // Arrange - the group references a handle with no layer record
    let temp = TempDir::new().unwrap();
    let source = create_document(
        &temp,
        "template.toml",
        r#"[[layers]]
handle = 1
name = "D1"

[[filters]]
name = "Doors"
layers = [1, 99]
"#,
    );
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");
    let before = std::fs::read_to_string(&dest).unwrap();

    // Act
    let result = service(UnresolvedMembers::Fail).import(&dest, &source);

    // Assert - the import aborted and nothing was written
    assert!(matches!(
        result,
        Err(ApplicationError::UnresolvedMember { .. })
    ));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), before);
}

#[test]
fn given_dangling_group_member_when_dropping_then_member_is_omitted() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let source = create_document(
        &temp,
        "template.toml",
        r#"[[layers]]
handle = 1
name = "D1"

[[filters]]
name = "Doors"
layers = [1, 99]
"#,
    );
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");

    // Act
    let report = service(UnresolvedMembers::Drop)
        .import(&dest, &source)
        .unwrap();

    // Assert
    let merged = load(&dest);
    let doors = merged.filters.find("Doors").unwrap();
    let FilterKind::Group(members) = &doors.kind else {
        panic!("Doors should be a group");
    };
    assert_eq!(members.len(), 1);
    assert_eq!(report.stats.members_dropped, 1);
}

#[test]
fn given_invalid_source_expression_when_importing_then_destination_untouched() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let source = create_document(
        &temp,
        "template.toml",
        r#"[[filters]]
name = "Broken"
expression = 'NAME === "X"'
"#,
    );
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");
    let before = std::fs::read_to_string(&dest).unwrap();

    // Act
    let result = service(UnresolvedMembers::Drop).import(&dest, &source);

    // Assert
    assert!(matches!(result, Err(ApplicationError::Domain(_))));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), before);
}

#[test]
fn given_no_template_configured_when_importing_template_then_reported() {
    let temp = TempDir::new().unwrap();
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");
    let settings = Settings::default();

    let result = service(UnresolvedMembers::Drop).import_default_template(&dest, &settings);

    assert!(matches!(
        result,
        Err(ApplicationError::TemplateNotConfigured)
    ));
}

#[test]
fn given_missing_template_file_when_importing_template_then_reported() {
    let temp = TempDir::new().unwrap();
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");
    let settings = Settings {
        default_template: Some(temp.path().join("gone.toml")),
        ..Settings::default()
    };

    let result = service(UnresolvedMembers::Drop).import_default_template(&dest, &settings);

    assert!(matches!(result, Err(ApplicationError::TemplateMissing(_))));
}

#[test]
fn given_configured_template_when_importing_template_then_merged() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let template = create_document(&temp, "template.toml", SOURCE_WITH_GROUP);
    let dest = create_document(&temp, "site.toml", "name = \"site\"\n");
    let settings = Settings {
        default_template: Some(template.clone()),
        ..Settings::default()
    };

    // Act
    let report = service(UnresolvedMembers::Drop)
        .import_default_template(&dest, &settings)
        .unwrap();

    // Assert
    assert_eq!(report.source, template);
    assert!(load(&dest).filters.find("Doors").is_some());
}
