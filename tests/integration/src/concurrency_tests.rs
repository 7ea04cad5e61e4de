//! Concurrent ingest tests.
//!
//! The store is one shared instance hit by many request-handling threads;
//! these tests drive it the same way: distinct ids uploaded in parallel
//! must all land, and racing uploads of one id must leave exactly one
//! consistent entry and directory.

use std::io::Write;
use std::sync::{Arc, Barrier};
use std::thread;

use gallery_manifest::Package;
use gallery_store::{GalleryOptions, PackageStore};
use tempfile::TempDir;

fn manifest(id: &str, version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<PackageManifest Version="2.0.0" xmlns="http://schemas.microsoft.com/developer/vsx-schema/2011">
  <Metadata>
    <Identity Id="{id}" Version="{version}" Language="en-US" Publisher="Jane Doe" />
    <DisplayName>Concurrent {id}</DisplayName>
    <Description>A concurrency-test extension with a useful description.</Description>
    <Icon>icon.png</Icon>
    <License>LICENSE.txt</License>
  </Metadata>
</PackageManifest>"#
    )
}

fn build_vsix(id: &str, version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (file, bytes) in [
        ("extension.vsixmanifest", manifest(id, version).into_bytes()),
        ("LICENSE.txt", b"MIT License text".to_vec()),
        ("icon.png", b"fake-png-bytes".to_vec()),
    ] {
        writer.start_file(file, options).unwrap();
        writer.write_all(&bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn concurrent_ingest_distinct_ids_all_land() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(PackageStore::open(GalleryOptions::rooted(root.path())));

    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let id = format!("distinct{i}.ext");
                store
                    .ingest(build_vsix(&id, "1.0").as_slice(), None, None, None)
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("ingest thread should not panic");
    }

    let packages = store.packages();
    assert_eq!(packages.len(), num_threads);

    for i in 0..num_threads {
        let id = format!("distinct{i}.ext");
        let package = store.get(&id).unwrap();
        assert_eq!(package.name, format!("Concurrent {id}"));
        assert!(root.path().join(&id).join("extension.vsix").is_file());
        assert!(root.path().join(&id).join("extension.json").is_file());
    }
}

#[test]
fn concurrent_ingest_same_id_leaves_one_consistent_entry() {
    let root = TempDir::new().unwrap();
    let store = Arc::new(PackageStore::open(GalleryOptions::rooted(root.path())));

    let num_threads = 6;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let version = format!("1.{i}");
                store
                    .ingest(
                        build_vsix("racy.ext", &version).as_slice(),
                        None,
                        None,
                        None,
                    )
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("ingest thread should not panic");
    }

    // Exactly one cache entry for the id
    let packages = store.packages();
    assert_eq!(packages.len(), 1);
    let winner = &packages[0];
    assert_eq!(winner.id, "racy.ext");

    // The directory matches the winning upload exactly: its metadata, its
    // archive, its icon, nothing from the losers
    let dir = root.path().join("racy.ext");
    let json = std::fs::read_to_string(dir.join("extension.json")).unwrap();
    let stored: Package = serde_json::from_str(&json).unwrap();
    assert_eq!(stored.version, winner.version);

    let icons: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("icon-"))
        .collect();
    assert_eq!(icons, vec![format!("icon-{}.png", winner.version)]);
}
