use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const ROAD: &str = r#"<?xml version="1.0"?>
<LandXML>
  <Alignments>
    <Alignment name="Main St" desc="Centerline" staStart="0">
      <CoordGeom>
        <Line>
          <Start>0 0</Start>
          <End>500 0</End>
        </Line>
        <Curve rot="cw" radius="300" length="200">
          <Start>500 0</Start>
          <Center>500 300</Center>
          <End>685.510941 64.233822</End>
        </Curve>
      </CoordGeom>
      <Profile>
        <ProfAlign name="FG">
          <PVI>0 100</PVI>
          <ParaCurve length="40">100 110</ParaCurve>
          <PVI>200 105</PVI>
        </ProfAlign>
      </Profile>
    </Alignment>
  </Alignments>
</LandXML>"#;

#[test]
fn station_command() {
    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args(["station", "2567.894"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25+67.89"));
}

#[test]
fn bearing_command() {
    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args(["bearing", "225"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S 45\u{00B0}00'00.00\" W"));
}

#[test]
fn horizontal_text_to_stdout() {
    let file = assert_fs::NamedTempFile::new("road.xml").unwrap();
    file.write_str(ROAD).unwrap();

    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args(["horizontal", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("GeoTable Horizontal Report"))
        .stdout(predicate::str::contains("Alignment: Main St"))
        .stdout(predicate::str::contains("Element: Circular"))
        .stdout(predicate::str::contains("Curve No.: 1-R"));
}

#[test]
fn vertical_xml_to_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("road.xml");
    input.write_str(ROAD).unwrap();
    let output = dir.child("profile.xml");

    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args([
            "vertical",
            input.path().to_str().unwrap(),
            "--format",
            "xml",
            "--output",
            output.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    output.assert(predicate::str::contains("<GeoTableReport Type=\"Vertical\">"));
    output.assert(predicate::str::contains("Label=\"PVI\""));
    dir.close().unwrap();
}

#[test]
fn settings_file_sets_project() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("road.xml");
    input.write_str(ROAD).unwrap();
    let settings = dir.child("settings.json");
    settings
        .write_str(r#"{"project_name": "Route 9", "linear_precision": 2}"#)
        .unwrap();

    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args([
            "horizontal",
            input.path().to_str().unwrap(),
            "--settings",
            settings.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: Route 9"))
        .stdout(predicate::str::contains("Radius: 300.0000"))
        .stdout(predicate::str::contains("Length: 500.00\n"));
}

#[test]
fn batch_writes_both_reports() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("road.xml");
    input.write_str(ROAD).unwrap();
    let out = dir.child("out");

    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args([
            "batch",
            input.path().to_str().unwrap(),
            "--out-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    out.child("Main_St_horizontal.txt")
        .assert(predicate::str::contains("Element: Linear"));
    out.child("Main_St_vertical.txt")
        .assert(predicate::str::contains("Element: Parabola"));
    dir.close().unwrap();
}

#[test]
fn batch_skips_unreadable_input() {
    let dir = assert_fs::TempDir::new().unwrap();
    let broken = dir.child("broken.xml");
    broken.write_str("<LandXML><Alignments>").unwrap();
    let input = dir.child("road.xml");
    input.write_str(ROAD).unwrap();
    let out = dir.child("out");

    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args([
            "batch",
            broken.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "--out-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 batch item(s) failed"));

    out.child("Main_St_horizontal.txt")
        .assert(predicate::str::contains("Element: Linear"));
    out.child("broken_horizontal.txt").assert(predicate::path::missing());
    dir.close().unwrap();
}

#[test]
fn unknown_alignment_fails() {
    let file = assert_fs::NamedTempFile::new("road.xml").unwrap();
    file.write_str(ROAD).unwrap();

    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args(["horizontal", file.path().to_str().unwrap(), "--alignment", "Elm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Elm"));
}

#[test]
fn missing_input_fails() {
    Command::cargo_bin("geotable_cli")
        .unwrap()
        .args(["horizontal", "does_not_exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
