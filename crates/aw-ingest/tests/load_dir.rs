//! Loading extract directories from disk.

use aw_core::{DateField, SystemName};
use aw_ingest::{IngestError, IngestionConfig, SnapshotLoader};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HR: &str = "Official Email ID,Date Of Joining,Date Of Exit,Employment Status,Employee Type\n\
                  jane.doe@example.com,10-01-2024,,Active,Full Time\n\
                  john.smith@example.com,01-05-2019,02-05-2024,Resigned,Full Time\n\
                  ,01-05-2019,,Active,Intern\n";

const OKTA: &str = "user.email,user.created,user.lastLogin,user.status\n\
                    jane.doe@example.com,2024-01-20T09:00:00.000Z,2024-05-30T10:00:00.000Z,ACTIVE\n\
                    john.smith@example.com,2019-05-01T09:00:00.000Z,2024-05-01T10:00:00.000Z,ACTIVE\n";

const SLACK: &str = "Email,Account created (UTC),Last active (UTC),Deactivated date (UTC),Account type\n\
                     jane.doe@example.com,2024-01-10,2024-05-30,,Member\n\
                     deploybot@example.com,2022-01-10,Never logged in,,Bot\n";

const GWS: &str = "Email Address [Required],Last Sign In [READ ONLY],Status [READ ONLY]\n\
                   jane.doe@example.com,2024/05/30 14:05:33,Active\n\
                   john.smith@example.com,2024/05/01 09:00:00,Active\n";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn full_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "darwinbox.csv", HR);
    write(dir.path(), "okta.csv", OKTA);
    write(dir.path(), "slack.csv", SLACK);
    write(dir.path(), "gws.csv", GWS);
    dir
}

#[test]
fn test_load_full_directory() {
    let dir = full_dir();
    let loader = SnapshotLoader::new(IngestionConfig::default()).unwrap();
    let snapshot = loader.load_dir(dir.path()).unwrap();

    assert_eq!(snapshot.hr_records().len(), 2);
    assert_eq!(snapshot.accounts(SystemName::IdentityProvider).len(), 2);
    assert_eq!(snapshot.accounts(SystemName::ChatPlatform).len(), 2);
    assert_eq!(snapshot.accounts(SystemName::ProductivitySuite).len(), 2);
    assert_eq!(snapshot.loaded_it_systems().len(), 3);

    // The HR row without an e-mail is skipped and reported.
    assert_eq!(snapshot.issues().len(), 1);
    assert_eq!(snapshot.issues()[0].system, SystemName::HrSource);
    assert_eq!(snapshot.issues()[0].row, 4);

    let bot = snapshot
        .accounts(SystemName::ChatPlatform)
        .iter()
        .find(|a| a.identity_key.as_str() == "deploybot@example.com")
        .unwrap();
    assert!(bot.is_system_account);
}

#[test]
fn test_missing_required_extract_is_fatal() {
    let dir = full_dir();
    fs::remove_file(dir.path().join("gws.csv")).unwrap();

    let loader = SnapshotLoader::new(IngestionConfig::default()).unwrap();
    let err = loader.load_dir(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::MissingFile {
            system: SystemName::ProductivitySuite,
            ..
        }
    ));
}

#[test]
fn test_optional_extract_is_skipped() {
    let dir = full_dir();
    fs::remove_file(dir.path().join("gws.csv")).unwrap();

    let config = IngestionConfig {
        optional_systems: vec![SystemName::ProductivitySuite],
        ..Default::default()
    };
    let snapshot = SnapshotLoader::new(config)
        .unwrap()
        .load_dir(dir.path())
        .unwrap();

    assert!(!snapshot.is_loaded(SystemName::ProductivitySuite));
    assert!(snapshot.is_loaded(SystemName::ChatPlatform));
}

#[test]
fn test_missing_column_is_fatal() {
    let dir = full_dir();
    write(
        dir.path(),
        "okta.csv",
        "user.email,user.created,user.status\njane.doe@example.com,2024-01-20,ACTIVE\n",
    );

    let err = SnapshotLoader::new(IngestionConfig::default())
        .unwrap()
        .load_dir(dir.path())
        .unwrap_err();
    match err {
        IngestError::MissingColumn { system, column } => {
            assert_eq!(system, SystemName::IdentityProvider);
            assert_eq!(column, "user.lastLogin");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_directory() {
    let dir = TempDir::new().unwrap();
    let err = SnapshotLoader::new(IngestionConfig::default())
        .unwrap()
        .load_dir(&dir.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
}

#[test]
fn test_unreadable_dates_survive_loading() {
    let dir = full_dir();
    write(
        dir.path(),
        "okta.csv",
        "user.email,user.created,user.lastLogin,user.status\n\
         jane.doe@example.com,2024-01-20,garbage-login,ACTIVE\n",
    );

    let snapshot = SnapshotLoader::new(IngestionConfig::default())
        .unwrap()
        .load_dir(dir.path())
        .unwrap();

    let jane = &snapshot.accounts(SystemName::IdentityProvider)[0];
    assert_eq!(jane.last_login_date, None);
    assert!(jane.is_unreadable(DateField::LastLoginDate));
    assert!(snapshot
        .issues()
        .iter()
        .any(|i| i.system == SystemName::IdentityProvider && i.raw_value == "garbage-login"));
}
