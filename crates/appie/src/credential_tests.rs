// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn creds(expires_at: u64) -> Credentials {
    Credentials {
        access_token: "access-123".to_owned(),
        refresh_token: Some("refresh-456".to_owned()),
        expires_at,
    }
}

#[test]
fn load_missing_file_is_none() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(dir.path().join("appie.json"));
    assert_eq!(store.load()?, None);
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    Ok(())
}

#[test]
fn save_then_load_returns_same_credentials() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(dir.path().join("nested").join("appie.json"));
    let saved = creds(epoch_secs() + 3600);
    store.save(&saved)?;

    assert_eq!(store.load()?, Some(saved));
    assert!(store.is_authenticated());
    assert_eq!(store.access_token().as_deref(), Some("access-123"));
    Ok(())
}

#[test]
fn save_leaves_no_temp_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(dir.path().join("appie.json"));
    store.save(&creds(10))?;
    store.save(&creds(20))?;

    let names: Vec<String> = std::fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["appie.json".to_owned()]);
    assert_eq!(store.load()?.map(|c| c.expires_at), Some(20));
    Ok(())
}

#[cfg(unix)]
#[test]
fn saved_file_is_owner_only() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(dir.path().join("appie.json"));
    store.save(&creds(10))?;
    let mode = std::fs::metadata(store.path())?.permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    Ok(())
}

#[test]
fn expired_credentials_are_not_authenticated() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(dir.path().join("appie.json"));
    store.save(&creds(epoch_secs().saturating_sub(1)))?;

    assert!(store.load()?.is_some());
    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    Ok(())
}

#[test]
fn malformed_file_is_an_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("appie.json");
    std::fs::write(&path, "not json")?;
    let store = CredentialStore::new(&path);

    crate::assert_err_contains!(store.load(), "parsing");
    assert!(!store.is_authenticated());
    Ok(())
}

#[test]
fn missing_optional_fields_default() -> anyhow::Result<()> {
    let parsed: Credentials = serde_json::from_str(r#"{"access_token":"tok"}"#)?;
    assert_eq!(parsed.refresh_token, None);
    assert_eq!(parsed.expires_at, 0);
    assert!(!parsed.can_refresh());
    Ok(())
}

#[test]
fn save_fails_when_parent_is_a_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x")?;
    let store = CredentialStore::new(blocker.join("appie.json"));

    assert!(store.save(&creds(10)).is_err());
    Ok(())
}

#[test]
fn clear_removes_file_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(dir.path().join("appie.json"));
    store.save(&creds(10))?;

    assert!(store.clear()?);
    assert!(!store.clear()?);
    assert_eq!(store.load()?, None);
    Ok(())
}

#[yare::parameterized(
    future      = { 200, 100, true },
    now         = { 100, 100, false },
    past        = { 50, 100, false },
)]
fn validity_depends_on_expiry(expires_at: u64, now: u64, valid: bool) {
    assert_eq!(creds(expires_at).is_valid_at(now), valid);
}

#[test]
fn empty_access_token_is_never_valid() -> anyhow::Result<()> {
    let c = Credentials { access_token: String::new(), refresh_token: None, expires_at: u64::MAX };
    assert!(!c.is_valid_at(0));
    Ok(())
}
