// crates/brats/src/manifest/manifest_tests.rs
// ============================================================================
// Module: Manifest Lookup Unit Tests
// Description: Unit coverage for manifest parsing and version filtering.
// Purpose: Ensure the version matrix reflects the shipped manifest.
// Dependencies: brats, tempfile
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::fs;

use tempfile::TempDir;

use super::ManifestLookup;
use super::find_buildpack_dir;
use crate::error::ManifestError;
use crate::types::RuntimeVersion;
use crate::types::Stack;

const MANIFEST: &str = r"---
language: go
url_to_dependency_map:
- match: go(\d+\.\d+(.*))
  name: go
  version: $1
dependencies:
- name: go
  version: 1.8.3
  uri: https://buildpacks.cloudfoundry.org/concourse-binaries/go/go1.8.3.linux-amd64.tar.gz
  md5: 1b3d4a5ee1ac1a7a0d2c9b1ec8e0f0f6
  cf_stacks:
  - cflinuxfs2
- name: go
  version: 1.10.1
  uri: https://buildpacks.cloudfoundry.org/concourse-binaries/go/go1.10.1.linux-amd64.tar.gz
  cf_stacks:
  - cflinuxfs2
  - cflinuxfs3
- name: go
  version: 1.7.6
  uri: https://buildpacks.cloudfoundry.org/concourse-binaries/go/go1.7.6.linux-amd64.tar.gz
  cf_stacks:
  - cflinuxfs2
- name: godep
  version: '80'
  uri: https://buildpacks.cloudfoundry.org/dependencies/godep/godep-v80-linux-x64.tgz
  cf_stacks:
  - cflinuxfs2
";

fn buildpack(manifest: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("manifest.yml"), manifest).unwrap();
    dir
}

#[test]
fn versions_are_filtered_by_name_and_stack_and_sorted() {
    let dir = buildpack(MANIFEST);
    let lookup = ManifestLookup::new(dir.path());
    let versions = lookup.dependency_versions("go", "go", &Stack::new("cflinuxfs2")).unwrap();
    let tokens: Vec<&str> = versions.iter().map(RuntimeVersion::as_str).collect();
    assert_eq!(tokens, vec!["1.7.6", "1.8.3", "1.10.1"]);

    let versions = lookup.dependency_versions("go", "go", &Stack::new("cflinuxfs3")).unwrap();
    assert_eq!(versions, vec![RuntimeVersion::parse("1.10.1").unwrap()]);

    let versions = lookup.dependency_versions("go", "go", &Stack::new("windows2012R2")).unwrap();
    assert!(versions.is_empty());
}

#[test]
fn dependency_uri_resolves_exact_version() {
    let dir = buildpack(MANIFEST);
    let lookup = ManifestLookup::new(dir.path());
    let version = RuntimeVersion::parse("1.8.3").unwrap();
    assert_eq!(
        lookup.dependency_uri("go", &version, &Stack::new("cflinuxfs2")).unwrap(),
        "https://buildpacks.cloudfoundry.org/concourse-binaries/go/go1.8.3.linux-amd64.tar.gz"
    );
    let unknown = RuntimeVersion::parse("1.2.3").unwrap();
    assert!(matches!(
        lookup.dependency_uri("go", &unknown, &Stack::new("cflinuxfs2")),
        Err(ManifestError::UnknownDependency { .. })
    ));
    assert!(matches!(
        lookup.dependency_uri("go", &version, &Stack::new("cflinuxfs3")),
        Err(ManifestError::UnknownDependency { .. })
    ));
}

#[test]
fn dependency_uri_picks_the_entry_for_the_stack() {
    let dir = buildpack(
        "\
language: go
dependencies:
- name: go
  version: 1.10.1
  uri: https://example.org/go/go1.10.1.linux-amd64-cflinuxfs3.tgz
  cf_stacks:
  - cflinuxfs3
- name: go
  version: 1.10.1
  uri: https://example.org/go/go1.10.1.linux-amd64-cflinuxfs2.tgz
  cf_stacks:
  - cflinuxfs2
",
    );
    let lookup = ManifestLookup::new(dir.path());
    let version = RuntimeVersion::parse("1.10.1").unwrap();
    assert_eq!(
        lookup.dependency_uri("go", &version, &Stack::new("cflinuxfs2")).unwrap(),
        "https://example.org/go/go1.10.1.linux-amd64-cflinuxfs2.tgz"
    );
    assert_eq!(
        lookup.dependency_uri("go", &version, &Stack::new("cflinuxfs3")).unwrap(),
        "https://example.org/go/go1.10.1.linux-amd64-cflinuxfs3.tgz"
    );
}

#[test]
fn manifest_for_another_language_is_rejected() {
    let dir = buildpack(MANIFEST);
    let lookup = ManifestLookup::new(dir.path());
    let err = lookup.dependency_versions("ruby", "ruby", &Stack::new("cflinuxfs2")).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[test]
fn missing_and_malformed_manifests_fail() {
    let empty = tempfile::tempdir().unwrap();
    let lookup = ManifestLookup::new(empty.path());
    assert!(matches!(
        lookup.dependency_versions("go", "go", &Stack::new("cflinuxfs2")),
        Err(ManifestError::Read { .. })
    ));

    let dir = buildpack("dependencies: [not, a, mapping");
    let lookup = ManifestLookup::new(dir.path());
    assert!(matches!(
        lookup.dependency_versions("go", "go", &Stack::new("cflinuxfs2")),
        Err(ManifestError::Parse { .. })
    ));
}

#[test]
fn buildpack_dir_is_found_in_ancestors() {
    let root = tempfile::tempdir().unwrap();
    let buildpack = root.path().join("go-buildpack");
    let nested = root.path().join("brats/src/go");
    fs::create_dir_all(&buildpack).unwrap();
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_buildpack_dir(&nested, "go").unwrap(), buildpack);
    assert!(matches!(
        find_buildpack_dir(&nested, "ruby"),
        Err(ManifestError::BuildpackDirNotFound(language)) if language == "ruby"
    ));
}
