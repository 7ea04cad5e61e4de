//! End-to-end upload pipeline tests: archive in, queryable catalog out.

use std::io::Write;

use gallery_store::{GalleryOptions, PackageStore, search};
use tempfile::TempDir;

fn manifest(id: &str, name: &str, version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<PackageManifest Version="2.0.0" xmlns="http://schemas.microsoft.com/developer/vsx-schema/2011">
  <Metadata>
    <Identity Id="{id}" Version="{version}" Language="en-US" Publisher="Jane Doe" />
    <DisplayName>{name}</DisplayName>
    <Description>An integration-test extension with a useful description.</Description>
    <Tags>testing, tools</Tags>
    <Icon>icon.png</Icon>
    <License>LICENSE.txt</License>
  </Metadata>
  <Installation>
    <InstallationTarget Id="Microsoft.VisualStudio.Community" Version="[17.0,)" />
  </Installation>
</PackageManifest>"#
    )
}

fn build_vsix(id: &str, name: &str, version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (file, bytes) in [
        (
            "extension.vsixmanifest",
            manifest(id, name, version).into_bytes(),
        ),
        ("LICENSE.txt", b"MIT License text".to_vec()),
        ("icon.png", b"fake-png-bytes".to_vec()),
    ] {
        writer.start_file(file, options).unwrap();
        writer.write_all(&bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn upload_then_query_round_trip() {
    let root = TempDir::new().unwrap();
    let store = PackageStore::open(GalleryOptions::rooted(root.path()));

    let uploaded = store
        .ingest(
            build_vsix("pipeline.ext", "Pipeline Tools", "1.0").as_slice(),
            Some("https://github.com/jane/pipeline"),
            Some("https://github.com/jane/pipeline/issues"),
            None,
        )
        .unwrap();

    let fetched = store.get("pipeline.ext").unwrap();
    assert_eq!(fetched.id, uploaded.id);
    assert_eq!(fetched.version, "1.0");
    assert_eq!(
        fetched.readme_url.as_deref(),
        Some("https://raw.githubusercontent.com/jane/pipeline/master/README.md")
    );
    assert_eq!(fetched.friendly_targets(), vec![
        "Visual Studio 2022",
        "Visual Studio 2026"
    ]);

    let listing = store.packages();
    assert_eq!(listing.len(), 1);

    let hits = search("pipeline", &listing);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "pipeline.ext");
}

#[test]
fn catalog_survives_restart() {
    let root = TempDir::new().unwrap();

    {
        let store = PackageStore::open(GalleryOptions::rooted(root.path()));
        store
            .ingest(
                build_vsix("persist.ext", "Persist Tools", "2.1").as_slice(),
                None,
                None,
                None,
            )
            .unwrap();
    }

    // A fresh store over the same root rebuilds the cache from disk
    let reopened = PackageStore::open(GalleryOptions::rooted(root.path()));
    let packages = reopened.packages();
    assert_eq!(packages.len(), 1);

    let package = &packages[0];
    assert_eq!(package.id, "persist.ext");
    assert_eq!(package.version, "2.1");
    assert_eq!(package.license.as_deref(), Some("MIT License text"));
    assert_eq!(
        package.icon.as_deref(),
        Some("/extensions/persist.ext/icon-2.1.png")
    );
}

#[test]
fn search_excludes_unlisted_when_caller_filters() {
    let root = TempDir::new().unwrap();
    let store = PackageStore::open(GalleryOptions::rooted(root.path()));

    store
        .ingest(
            build_vsix("public.ext", "Search Target", "1.0").as_slice(),
            None,
            None,
            None,
        )
        .unwrap();

    // Second package tagged unlisted
    let unlisted = {
        let manifest =
            manifest("hidden.ext", "Search Target Two", "1.0").replace("testing, tools", "unlisted");
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer
            .start_file("extension.vsixmanifest", options)
            .unwrap();
        writer.write_all(manifest.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    };
    store.ingest(unlisted.as_slice(), None, None, None).unwrap();

    // The presentation layer filters unlisted packages before searching
    let listed: Vec<_> = store
        .packages()
        .into_iter()
        .filter(|p| !p.unlisted())
        .collect();
    let hits = search("search target", &listed);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "public.ext");
}
