use super::rec;
use crate::{open_store, FileStore, Format, JsonStore, MemStore};
use bdixdir_base::Result;
use bdixdir_rank::{ServerRecord, Store};
use test_log::test;

fn collection() -> Vec<ServerRecord> {
    vec![
        rec(1, "Circle FTP", &["movies", "tv"], 2),
        rec(2, "ICC FTP", &["software"], 1),
    ]
}

#[test]
fn test_file_store_save_load() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("servers.bdixdir");
    let mut store = FileStore::new(&path);
    assert!(store.load()?.is_empty());

    store.save(&collection())?;
    assert!(path.exists());
    assert!(!crate::file::tmp_path_for(&path).exists());
    assert_eq!(store.load()?, collection());

    let fewer = &collection()[..1];
    store.save(fewer)?;
    assert_eq!(FileStore::new(&path).load()?, fewer.to_vec());
    Ok(())
}

#[test]
fn test_file_header_checks() -> Result<()> {
    let buf = FileStore::encode(&collection())?;
    assert_eq!(&buf[..8], FileStore::MAGIC);

    let mut bad_magic = buf.clone();
    bad_magic[0] = b'x';
    assert!(FileStore::decode(&bad_magic, "others").is_err());
    assert!(FileStore::decode(b"bdix", "others").is_err());

    let mut future = Vec::new();
    future.extend_from_slice(FileStore::MAGIC);
    rmp::encode::write_u32(&mut future, FileStore::VERS + 1)?;
    assert!(FileStore::decode(&future, "others").is_err());
    Ok(())
}

#[test]
fn test_json_store_save_load() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("servers.json");
    let mut store = open_store(Format::Json, &path, "others");
    assert!(store.load()?.is_empty());
    store.save(&collection())?;

    let text = std::fs::read_to_string(&path)?;
    assert!(text.contains("\"uptimePercent\""));
    assert!(text.contains("\"type\": \"non-bdix\""));
    assert_eq!(JsonStore::new(&path).load()?, collection());
    Ok(())
}

#[test]
fn test_corrupt_file_is_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("servers.json");
    std::fs::write(&path, "{not json")?;
    assert!(JsonStore::new(&path).load().is_err());
    Ok(())
}

#[test]
fn test_mem_store() -> Result<()> {
    let mut store = MemStore::new(collection());
    assert_eq!(store.load()?, collection());
    store.save(&[])?;
    assert_eq!(store.saves(), 1);
    assert!(store.records().is_empty());
    store.set_fail_saves(true);
    assert!(store.save(&collection()).is_err());
    assert_eq!(store.saves(), 1);
    Ok(())
}
