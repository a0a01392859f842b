use falbench::{client::CREDENTIAL_KEY, error::Error, prelude::*};

// Single test so environment changes don't race with each other
#[test]
fn credential_sources() {
    // `.env` is looked up from the working directory, so start from an empty one
    let cwd = tempfile::tempdir().unwrap();
    std::env::set_current_dir(cwd.path()).unwrap();
    assert!(!cwd.path().join(".env").exists());

    std::env::remove_var(CREDENTIAL_KEY);
    assert!(matches!(Client::new(None), Err(Error::MissingCredential)));

    let dir = tempfile::tempdir().unwrap();
    let err = Client::new(None)
        .and_then(|client| Generator::with_output_dir(client, dir.path().join("out")))
        .unwrap_err();
    assert!(err.to_string().contains("no credential available"));
    assert!(!dir.path().join("out").exists());

    assert!(Client::new(Some("explicit")).is_ok());

    std::env::set_var(CREDENTIAL_KEY, "from-env");
    assert!(Client::new(None).is_ok());
    std::env::remove_var(CREDENTIAL_KEY);
}
