use std::fs;

use dbmlgen::{Artifacts, compile, write_artifacts};

const SCENARIO: &str = "\
Table team {
  id int [pk, increment]
  name string [not null, unique]
  headquarters string [not null]
}

Table hero {
  id int [pk, increment]
  name string [not null]
  secret_name string [not null]
  age int
  team_id int [ref: > team.id]
}
";

#[test]
fn end_to_end_scenario() {
    let artifacts = compile(SCENARIO).unwrap();

    // Data model: both classes, the scalar and the collection accessor
    assert!(artifacts.model.contains("class Team(SQLModel, table=True):"));
    assert!(artifacts.model.contains("class Hero(SQLModel, table=True):"));
    assert!(
        artifacts
            .model
            .contains("team: Team | None = Relationship(back_populates=\"heroes\")")
    );
    assert!(
        artifacts
            .model
            .contains("heroes: list[\"Hero\"] = Relationship(back_populates=\"team\")")
    );
    assert!(
        artifacts
            .model
            .contains("team_id: int | None = Field(default=None, foreign_key=\"team.id\")")
    );

    // ER document: one edge between hero and team, plus both doc tables
    assert_eq!(artifacts.diagram.matches("}o--||").count(), 1);
    assert!(artifacts.diagram.contains("hero }o--|| team : \"team_id\""));
    assert!(artifacts.diagram.contains("## team"));
    assert!(artifacts.diagram.contains("## hero"));
}

#[test]
fn compilation_is_idempotent() {
    let first = compile(SCENARIO).unwrap();
    let second = compile(SCENARIO).unwrap();
    assert_eq!(first, second);
}

#[test]
fn forward_reference_follows_declaration_order() {
    let artifacts = compile(SCENARIO).unwrap();
    // team comes first, so Hero references Team directly while Team's
    // back-accessor must quote the not-yet-declared Hero
    assert!(artifacts.model.contains("team: Team | None"));
    assert!(artifacts.model.contains("heroes: list[\"Hero\"]"));

    let reversed = compile(
        "Table hero {\n  id int [pk]\n  team_id int [ref: > team.id]\n}\nTable team {\n  id int [pk]\n}\n",
    )
    .unwrap();
    assert!(reversed.model.contains("team: \"Team | None\""));
    assert!(reversed.model.contains("heroes: list[Hero]"));
}

#[test]
fn unresolved_reference_aborts_compilation() {
    let err = compile("Table hero {\n  team_id int [ref: > team.id]\n}\n").unwrap_err();
    assert!(err.to_string().contains("team.id"));
}

#[test]
fn structural_error_reports_line() {
    let err = compile("Table a {\n  id int\n  broken\n}\n").unwrap_err();
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn artifacts_are_written_to_both_paths() {
    let artifacts = compile(SCENARIO).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models.py");
    let diagram = dir.path().join("schema.md");

    write_artifacts(&artifacts, &models, &diagram).unwrap();

    assert_eq!(fs::read_to_string(&models).unwrap(), artifacts.model);
    assert_eq!(fs::read_to_string(&diagram).unwrap(), artifacts.diagram);
}

#[test]
fn existing_output_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("models.py");
    let diagram = dir.path().join("schema.md");
    fs::write(&models, "stale").unwrap();
    fs::write(&diagram, "stale").unwrap();

    let artifacts = compile(SCENARIO).unwrap();
    write_artifacts(&artifacts, &models, &diagram).unwrap();

    assert_eq!(fs::read_to_string(&models).unwrap(), artifacts.model);
    assert_eq!(fs::read_to_string(&diagram).unwrap(), artifacts.diagram);
}

#[test]
fn write_failure_reports_path() {
    let artifacts = Artifacts {
        model: String::new(),
        diagram: String::new(),
    };
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no/such/dir/models.py");
    let diagram = dir.path().join("schema.md");

    let err = write_artifacts(&artifacts, &missing, &diagram).unwrap_err();
    assert!(err.path.contains("models.py"));
    // the first write failed, so the second file was never created
    assert!(!diagram.exists());
}
