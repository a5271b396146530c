//! Integration tests for the garden store.
//!
//! Run with:
//!   cargo test --test test_store

use std::fs;

use tempfile::TempDir;

use indigo::memory::store::GardenStore;
use indigo::memory::{Anchor, GardenMemory, LogEntry, ReviewRecord};

// ── helpers ──────────────────────────────────────────────────────────────────

fn gardens_dir() -> (TempDir, GardenStore) {
    let tmp = TempDir::new().expect("tempdir");
    let store = GardenStore::new(tmp.path().join("gardens"));
    (tmp, store)
}

fn sample(name: &str) -> GardenMemory {
    let mut mem = GardenMemory::new(
        name,
        Anchor {
            principles: vec!["Observe before intervening".into(), "Build soil".into()],
            location: "Asheville, NC".into(),
            zone: "7a".into(),
            style: "forest garden".into(),
        },
    );
    mem.log.push(LogEntry {
        date: "2026-05-14".into(),
        entry: "Transplanted pepper seedlings".into(),
        tags: vec!["peppers".into(), "transplanting".into()],
    });
    mem.log.push(LogEntry {
        date: "2026-06-02".into(),
        entry: "First aphids on the broad beans".into(),
        tags: vec!["aphids".into(), "pests".into()],
    });
    mem.review.push(ReviewRecord {
        period: "Spring 2026".into(),
        summary: "Cool, late start".into(),
        lessons_learned: vec!["Start peppers indoors two weeks earlier".into()],
    });
    mem
}

// ── load / save ──────────────────────────────────────────────────────────────

#[test]
fn save_then_load_roundtrips_logically() {
    let (_tmp, store) = gardens_dir();
    let mem = sample("backyard");
    store.save("backyard", &mem).expect("save should succeed");

    let loaded = store.load("backyard").unwrap().expect("garden should exist");
    assert_eq!(loaded, mem);
    // Entry order survives persistence.
    assert_eq!(loaded.log[0].entry, "Transplanted pepper seedlings");
    assert_eq!(loaded.log[1].entry, "First aphids on the broad beans");
}

#[test]
fn save_creates_the_gardens_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("deep").join("gardens");
    let store = GardenStore::new(&dir);
    store.save("patio", &sample("patio")).unwrap();
    assert!(dir.join("patio.json").exists());
}

#[test]
fn load_absent_garden_is_none() {
    let (_tmp, store) = gardens_dir();
    assert!(store.load("no-such-garden").unwrap().is_none());
}

#[test]
fn corrupt_file_reads_as_absent() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("gardens");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("broken.json"), "{ not json").unwrap();

    let store = GardenStore::new(&dir);
    // Deliberately indistinguishable from true absence.
    assert!(store.load("broken").unwrap().is_none());
}

#[test]
fn save_overwrites_previous_record() {
    let (_tmp, store) = gardens_dir();
    let mut mem = sample("backyard");
    store.save("backyard", &mem).unwrap();

    mem.log.push(LogEntry {
        date: "2026-06-10".into(),
        entry: "Released ladybirds".into(),
        tags: vec!["pests".into()],
    });
    store.save("backyard", &mem).unwrap();

    let loaded = store.load("backyard").unwrap().unwrap();
    assert_eq!(loaded.log.len(), 3);
}

// ── list ─────────────────────────────────────────────────────────────────────

#[test]
fn list_returns_sorted_names() {
    let (_tmp, store) = gardens_dir();
    for name in ["zinnia-bed", "allotment", "patio"] {
        store.save(name, &sample(name)).unwrap();
    }
    assert_eq!(store.list().unwrap(), vec!["allotment", "patio", "zinnia-bed"]);
}

#[test]
fn list_missing_directory_is_empty() {
    let tmp = TempDir::new().unwrap();
    let store = GardenStore::new(tmp.path().join("never-created"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn list_ignores_non_json_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("gardens");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("notes.txt"), "scratch").unwrap();

    let store = GardenStore::new(&dir);
    store.save("backyard", &sample("backyard")).unwrap();
    assert_eq!(store.list().unwrap(), vec!["backyard"]);
}
