use filetree_core::{
    Account, EntryKind, EntryState, FileMode, ScanConfig, ScanRecord, SecurityCapability,
    SecurityContext,
};
use serde_json::{Value, json};
use std::path::PathBuf;

fn sample(kind: EntryKind, security: Option<SecurityContext>) -> ScanRecord {
    ScanRecord {
        root: PathBuf::from("/srv/files/web"),
        path: PathBuf::from("conf/app.ini"),
        kind,
        mode: FileMode::from_raw(0o100640),
        owner: Account::Name("www".into()),
        group: Account::Id(4242),
        uid: 1001,
        gid: 4242,
        size: 120,
        mtime: 1_700_000_000.25,
        ctime: 1_700_000_001.5,
        security,
    }
}

#[test]
fn test_file_record_serialization() {
    let record = sample(
        EntryKind::File {
            src: PathBuf::from("/srv/files/web/conf/app.ini"),
        },
        None,
    );
    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["state"], "file");
    assert_eq!(value["src"], "/srv/files/web/conf/app.ini");
    assert_eq!(value["root"], "/srv/files/web");
    assert_eq!(value["path"], "conf/app.ini");
    assert_eq!(value["mode"], "0640");
    assert_eq!(value["owner"], "www");
    // unresolved group is the number itself, not a string
    assert_eq!(value["group"], json!(4242));
    assert_eq!(value["uid"], json!(1001));
    assert_eq!(value["mtime"], json!(1_700_000_000.25));
}

#[test]
fn test_directory_record_has_no_src() {
    let record = sample(EntryKind::Directory, None);
    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["state"], "directory");
    assert!(value.get("src").is_none());
    assert_eq!(record.state(), EntryState::Directory);
    assert!(record.src().is_none());
}

#[test]
fn test_context_fields_absent_when_disabled() {
    let record = sample(EntryKind::Link { src: "../shared".into() }, None);
    let value = serde_json::to_value(&record).unwrap();

    for field in ["seuser", "serole", "setype", "selevel"] {
        assert!(value.get(field).is_none(), "{field} should be absent");
    }
    assert_eq!(value["src"], "../shared");
}

#[test]
fn test_context_fields_null_when_unknown() {
    let record = sample(EntryKind::Directory, Some(SecurityContext::unknown()));
    let value = serde_json::to_value(&record).unwrap();

    for field in ["seuser", "serole", "setype", "selevel"] {
        assert_eq!(value.get(field), Some(&Value::Null), "{field} should be null");
    }
}

#[test]
fn test_context_fields_populated() {
    let ctx = SecurityContext::parse("system_u:object_r:httpd_sys_content_t:s0");
    let record = sample(EntryKind::Directory, Some(ctx));
    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["seuser"], "system_u");
    assert_eq!(value["serole"], "object_r");
    assert_eq!(value["setype"], "httpd_sys_content_t");
    assert_eq!(value["selevel"], "s0");
}

#[test]
fn test_record_deserialization() {
    let value = json!({
        "root": "/srv",
        "path": "bin/tool",
        "state": "link",
        "src": "/usr/bin/tool",
        "mode": "0777",
        "owner": "root",
        "group": 0,
        "uid": 0,
        "gid": 0,
        "size": 13,
        "mtime": 1.0,
        "ctime": 2.0
    });
    let record: ScanRecord = serde_json::from_value(value).unwrap();

    assert_eq!(
        record.kind,
        EntryKind::Link {
            src: PathBuf::from("/usr/bin/tool")
        }
    );
    assert_eq!(record.mode.bits(), 0o777);
    assert_eq!(record.owner, Account::Name("root".into()));
    assert_eq!(record.group, Account::Id(0));
    assert_eq!(record.abs_path(), PathBuf::from("/srv/bin/tool"));
    assert!(record.security.is_none());
}

#[test]
fn test_record_without_context_survives_round_trip() {
    let record = sample(
        EntryKind::File {
            src: PathBuf::from("/srv/files/web/conf/app.ini"),
        },
        None,
    );
    let first = serde_json::to_value(&record).unwrap();
    let decoded: ScanRecord = serde_json::from_value(first.clone()).unwrap();
    let second = serde_json::to_value(&decoded).unwrap();

    assert!(decoded.security.is_none());
    assert_eq!(decoded, record);
    assert_eq!(first, second);
    assert!(second.get("seuser").is_none());
}

#[test]
fn test_record_with_context_survives_round_trip() {
    for ctx in [
        SecurityContext::unknown(),
        SecurityContext::parse("system_u:object_r:etc_t:s0:c0.c1023"),
    ] {
        let record = sample(EntryKind::Directory, Some(ctx));
        let first = serde_json::to_value(&record).unwrap();
        let decoded: ScanRecord = serde_json::from_value(first.clone()).unwrap();

        assert_eq!(decoded, record);
        assert_eq!(serde_json::to_value(&decoded).unwrap(), first);
    }
}

#[test]
fn test_scan_config_serde_defaults() {
    let config: ScanConfig = serde_json::from_value(json!({ "roots": ["a", "b"] })).unwrap();

    assert_eq!(config.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
    assert_eq!(config.threads, 1);
    assert!(!config.sort);
    assert_eq!(config.security, SecurityCapability::Disabled);
    assert!(config.base_dir.is_none());
}
