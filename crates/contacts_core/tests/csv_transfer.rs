use contacts_core::transfer::csv::{export_to_path, import_from_path};
use contacts_core::{
    ContactDraft, ContactRepository, ConnectionSettings, SqliteContactRepository, TransferError,
    CSV_HEADER,
};

fn open_store() -> SqliteContactRepository {
    let mut repo = SqliteContactRepository::connect(&ConnectionSettings::in_memory()).unwrap();
    repo.ensure_schema().unwrap();
    repo
}

#[test]
fn export_then_import_reproduces_field_values() {
    let mut source = open_store();
    for draft in [
        ContactDraft::new("Ada", "Lovelace", "ada@x.io", "+44 1"),
        ContactDraft::new("", "Turing", "", "0161"),
        ContactDraft::new("Grace", "", "grace@navy.mil", ""),
    ] {
        source.insert_contact(&draft).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.csv");
    let exported = source.list_contacts().unwrap();
    assert_eq!(export_to_path(&path, &exported).unwrap(), 3);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(CSV_HEADER));

    let mut target = open_store();
    let drafts = import_from_path(&path).unwrap();
    assert!(target.import_contacts(&drafts).unwrap().is_committed());

    let original: Vec<ContactDraft> = exported.iter().map(|c| c.to_draft()).collect();
    let restored: Vec<ContactDraft> = target
        .list_contacts()
        .unwrap()
        .iter()
        .map(|c| c.to_draft())
        .collect();
    assert_eq!(restored, original);
}

#[test]
fn export_of_empty_store_writes_header_only() {
    let repo = open_store();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    assert_eq!(export_to_path(&path, &repo.list_contacts().unwrap()).unwrap(), 0);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        format!("{CSV_HEADER}\n")
    );
}

#[test]
fn import_from_file_without_named_rows_is_empty_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nameless.csv");
    std::fs::write(&path, format!("{CSV_HEADER}\n,,x@y.io,1\n")).unwrap();

    assert!(matches!(import_from_path(&path), Err(TransferError::Empty)));
}

#[test]
fn import_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        import_from_path(dir.path().join("absent.csv")),
        Err(TransferError::Io(_))
    ));
}
