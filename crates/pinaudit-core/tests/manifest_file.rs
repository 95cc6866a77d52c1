use pinaudit_core::manifest::PinManifest;
use pinaudit_core::roots::RootList;
use tempfile::TempDir;

#[test]
fn test_manifest_from_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Packages.props");
    std::fs::write(
        &path,
        r#"<Project>
  <PropertyGroup>
    <ManagePackageVersionsCentrally>true</ManagePackageVersionsCentrally>
  </PropertyGroup>
  <ItemGroup>
    <PackageVersion Include="App" Version="1.0.0" />
    <PackageVersion Include="Lib" Version="2.0.0" />
  </ItemGroup>
</Project>
"#,
    )
    .unwrap();

    let manifest = PinManifest::from_path(&path).unwrap();
    assert_eq!(manifest.len(), 2);
    let pins: Vec<_> = manifest.iter().collect();
    assert_eq!(pins, vec![("App", "1.0.0"), ("Lib", "2.0.0")]);
}

#[test]
fn test_missing_manifest_is_input_error() {
    let tmp = TempDir::new().unwrap();
    let err = PinManifest::from_path(&tmp.path().join("Packages.props")).unwrap_err();
    assert!(err.to_string().contains("version manifest"), "got: {err}");
}

#[test]
fn test_root_list_from_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("roots.txt");
    std::fs::write(&path, "App\nWorker\n").unwrap();
    let roots = RootList::from_path(&path).unwrap();
    assert_eq!(roots.names(), ["App", "Worker"]);
}
