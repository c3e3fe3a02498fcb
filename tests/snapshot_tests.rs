//! Snapshot persistence integration tests

use std::fs;

use tempfile::TempDir;

use libris::{Borrower, Catalog, Item, SnapshotStore};

fn store_in(dir: &TempDir) -> SnapshotStore {
    SnapshotStore::new(
        dir.path().join("items.tsv"),
        dir.path().join("borrowers.tsv"),
    )
}

#[test]
fn partially_loaned_item_survives_a_save_load_cycle() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut item = Item::new(1, "Dune", "Frank Herbert", "ISBN-001", "SF", 3);
    item.loan().unwrap();
    item.loan().unwrap();
    assert_eq!(item.available_copies(), 1);

    store.save_items(&[item.clone()]).unwrap();
    let loaded = store.load_items().unwrap();
    assert_eq!(loaded, vec![item]);
    assert_eq!(loaded[0].available_copies(), 1);
    assert_eq!(loaded[0].total_copies(), 3);
}

#[test]
fn save_load_save_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut catalog = Catalog::new("Test Library", "Integration");
    catalog.seed_sample_catalog();
    catalog.add_borrower(Borrower::standard("2023001", "Ada Lovelace", "Mathematics", "Analysis"));
    catalog.add_borrower(Borrower::privileged("T-17", "Grace Hopper", "Navy", "Rear Admiral"));
    assert!(catalog.loan(1, "2023001"));
    assert!(catalog.loan(8, "T-17"));

    store.save_snapshot(&catalog).unwrap();
    let first_items = fs::read(store.items_path()).unwrap();
    let first_borrowers = fs::read(store.borrowers_path()).unwrap();

    let mut reloaded = Catalog::new("Test Library", "Integration");
    store.load_snapshot(&mut reloaded).unwrap();
    store.save_snapshot(&reloaded).unwrap();

    assert_eq!(fs::read(store.items_path()).unwrap(), first_items);
    assert_eq!(fs::read(store.borrowers_path()).unwrap(), first_borrowers);
}

#[test]
fn malformed_item_record_is_skipped_and_load_succeeds() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    fs::write(
        store.items_path(),
        "1\tDune\tFrank Herbert\tISBN-001\tSF\t3\t2\n\
         2\tOnly\tFive\tFields\tHere\n\
         3\tSolaris\tStanislaw Lem\tISBN-002\tSF\t2\t2\n",
    )
    .unwrap();

    let loaded = store.load_items().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id(), 1);
    assert_eq!(loaded[0].available_copies(), 2);
    assert_eq!(loaded[1].id(), 3);
}

#[test]
fn unrecognized_role_tag_and_bad_integers_are_skipped() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    fs::write(
        store.borrowers_path(),
        "standard\tS1\tAda\tEng\t5\tSoftware\n\
         guest\tG1\tEve\tEng\t5\tNone\n\
         privileged\tT1\tGrace\tNavy\tten\tAdmiral\n\
         privileged\tT2\tAlan\tMaths\t10\tFellow\n",
    )
    .unwrap();

    let loaded = store.load_borrowers().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id(), "S1");
    assert_eq!(loaded[0].role_label(), "Standard");
    assert_eq!(loaded[1].id(), "T2");
    assert_eq!(loaded[1].limit(), 10);
}

#[test]
fn blank_lines_are_discarded() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    fs::write(
        store.items_path(),
        "\n1\tDune\tFrank Herbert\tISBN-001\tSF\t3\t3\n\n",
    )
    .unwrap();

    assert_eq!(store.load_items().unwrap().len(), 1);
}

#[test]
fn failed_save_leaves_previous_file_untouched() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let item = Item::new(1, "Dune", "Frank Herbert", "ISBN-001", "SF", 3);
    store.save_items(&[item]).unwrap();
    let before = fs::read(store.items_path()).unwrap();

    // Occupy the temporary sibling with a directory so the next write fails.
    let temp_path = dir.path().join("items.tsv.tmp");
    fs::create_dir(&temp_path).unwrap();

    let other = Item::new(2, "Solaris", "Stanislaw Lem", "ISBN-002", "SF", 2);
    assert!(store.save_items(&[other]).is_err());
    assert_eq!(fs::read(store.items_path()).unwrap(), before);
}

#[test]
fn open_failure_aborts_the_load() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.load_items().is_err());
}

#[test]
fn partial_snapshot_failure_leaves_the_catalog_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    // Items file present, borrowers file missing.
    fs::write(store.items_path(), "1\tDune\tFrank Herbert\tISBN-001\tSF\t3\t3\n").unwrap();

    let mut catalog = Catalog::new("Live", "Main Street");
    catalog.add_item(Item::new(9, "Ubik", "Philip K. Dick", "ISBN-009", "SF", 1));
    catalog.add_borrower(Borrower::standard("S1", "Ada", "Eng", "SW"));

    assert!(store.load_snapshot(&mut catalog).is_err());
    assert_eq!(catalog.total_items(), 1);
    assert_eq!(catalog.find_by_id(9).unwrap().title(), "Ubik");
    assert_eq!(catalog.borrowers().len(), 1);
}

#[test]
fn fields_with_escape_set_characters_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let item = Item::new(1, "Tab\there", "New\nline", "CODE", "Cat\tegory", 2);
    let borrower = Borrower::standard("S\t1", "Multi\nline", "Eng", "SW");

    store.save_items(std::slice::from_ref(&item)).unwrap();
    store.save_borrowers(std::slice::from_ref(&borrower)).unwrap();

    assert_eq!(store.load_items().unwrap(), vec![item]);
    assert_eq!(store.load_borrowers().unwrap(), vec![borrower]);
}
