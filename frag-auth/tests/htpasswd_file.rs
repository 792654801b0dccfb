use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use frag_auth::{hash_owner, AuthError, BasicAuth, HtpasswdFile};

fn write_htpasswd(dir: &tempfile::TempDir, lines: &[String]) -> std::path::PathBuf {
    let path = dir.path().join(".htpasswd");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

#[test]
fn loads_credentials_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let hash = bcrypt::hash("password1", 4).unwrap();
    let path = write_htpasswd(&dir, &[format!("user1@email.com:{hash}")]);

    let auth = BasicAuth::from_file(&path).unwrap();
    let header = format!("Basic {}", STANDARD.encode("user1@email.com:password1"));
    let user = auth.authenticate(Some(&header)).unwrap();
    assert_eq!(user.owner_id, hash_owner("user1@email.com"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = HtpasswdFile::load(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, AuthError::Io { .. }));
}

#[test]
fn malformed_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_htpasswd(&dir, &["user:plaintext".to_string()]);
    let err = HtpasswdFile::load(&path).unwrap_err();
    assert!(matches!(err, AuthError::InvalidEntry { line: 1, .. }));
}
