use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pinaudit_cmd() -> Command {
    Command::cargo_bin("pinaudit").unwrap()
}

fn write_fixture(dir: &Path) {
    fs::write(dir.join("roots.txt"), "App\n# retired: OldApp\nTool\n").unwrap();
    fs::write(
        dir.join("Packages.props"),
        r#"<Project>
  <ItemGroup>
    <PackageVersion Include="App" Version="1.0.0" />
    <PackageVersion Include="Tool" Version="4.2.0" />
    <PackageVersion Include="Lib" Version="2.0.0" />
  </ItemGroup>
</Project>
"#,
    )
    .unwrap();
    fs::write(
        dir.join("metadata.json"),
        r#"{
  "dependencies": [
    {"name": "App", "version": "1.0.0", "targetFramework": "net8.0",
     "dependencyName": "Lib", "dependencyVersionRange": "[2.1.0, 3.0.0)"},
    {"name": "Tool", "version": "4.2.0", "targetFramework": "net8.0",
     "dependencyName": "Lib", "dependencyVersionRange": "[2.0.0, )"},
    {"name": "Tool", "version": "4.2.0", "targetFramework": "net8.0",
     "dependencyName": "Extra", "dependencyVersionRange": "[1.0.0, )"}
  ],
  "assemblies": [
    {"name": "Lib", "version": "2.0.0", "assemblyName": "Lib.dll",
     "assemblyVersion": "2.0.0.0", "libraryDirectoryPath": "lib/net8.0"}
  ]
}"#,
    )
    .unwrap();
}

#[test]
fn test_audit_writes_reports() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());

    pinaudit_cmd()
        .current_dir(tmp.path())
        .args(["audit"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Auditing"))
        .stderr(predicate::str::contains("Unpinned"));

    let packages = fs::read_to_string(tmp.path().join("Packages.csv")).unwrap();
    assert!(packages.contains("Lib,2.0.0,\"App, Tool\""), "{packages}");
    let conflicts = fs::read_to_string(tmp.path().join("VersionConflicts.csv")).unwrap();
    assert!(conflicts.contains("net8.0,App,1.0.0,Lib,\"[2.1.0, 3.0.0)\",2.0.0"), "{conflicts}");
    let missing = fs::read_to_string(tmp.path().join("MissingVersions.csv")).unwrap();
    assert_eq!(missing, "PackageName\nExtra\n");
    assert!(tmp.path().join("DllInfo.csv").is_file());
    assert!(tmp.path().join("InvalidRanges.csv").is_file());
}

#[test]
fn test_audit_fail_on_conflict_exits_nonzero() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());

    pinaudit_cmd()
        .current_dir(tmp.path())
        .args(["audit", "--fail-on-conflict", "--out-dir", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("version conflict"));

    assert!(tmp.path().join("out").join("VersionConflicts.csv").is_file());
}

#[test]
fn test_audit_strict_aborts_on_malformed_range() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());
    let metadata = fs::read_to_string(tmp.path().join("metadata.json"))
        .unwrap()
        .replace("[2.0.0, )", "2.0.0");
    fs::write(tmp.path().join("metadata.json"), metadata).unwrap();

    pinaudit_cmd()
        .current_dir(tmp.path())
        .args(["audit", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed version range"));

    assert!(!tmp.path().join("Packages.csv").exists());
}

#[test]
fn test_audit_missing_inputs_fails() {
    let tmp = TempDir::new().unwrap();

    pinaudit_cmd()
        .current_dir(tmp.path())
        .args(["audit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root list"));
}

#[test]
fn test_audit_with_explicit_paths_and_config() {
    let tmp = TempDir::new().unwrap();
    let inputs = tmp.path().join("inputs");
    fs::create_dir(&inputs).unwrap();
    write_fixture(&inputs);
    fs::write(
        tmp.path().join("audit.toml"),
        "[output]\ndir = \"reports\"\npackages = \"closure.csv\"\n",
    )
    .unwrap();

    pinaudit_cmd()
        .current_dir(tmp.path())
        .args([
            "--config",
            "audit.toml",
            "audit",
            "--roots",
            "inputs/roots.txt",
            "--manifest",
            "inputs/Packages.props",
            "--snapshot",
            "inputs/metadata.json",
            "--no-assemblies",
        ])
        .assert()
        .success();

    assert!(tmp.path().join("reports").join("closure.csv").is_file());
    assert!(!tmp.path().join("reports").join("DllInfo.csv").exists());
}
