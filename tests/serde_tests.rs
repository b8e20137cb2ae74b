use keylocator::{KeyLocator, LocatorType, Role};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct EncryptedDisk {
    name: String,
    key: KeyLocator,
    fallback: Option<KeyLocator>,
}

#[test]
fn test_locator_serializes_as_token() {
    let locator = KeyLocator::fqid("unique-123", "server1", "key-abc");
    let json = serde_json::to_string(&locator).unwrap();
    assert_eq!(json, r#""vmware:key/fqid/unique%2d123/server1/key%2dabc""#);

    let back: KeyLocator = serde_json::from_str(&json).unwrap();
    assert_eq!(back, locator);
}

#[test]
fn test_locator_inside_struct() {
    let disk = EncryptedDisk {
        name: "disk-0".to_string(),
        key: KeyLocator::pair(
            KeyLocator::role("", Role::Server),
            "HMAC-SHA-256",
            b"wrapped".to_vec(),
        ),
        fallback: None,
    };

    let json = serde_json::to_string(&disk).unwrap();
    assert!(json.contains(r#""key":"vmware:key/pair/(role/<VMWARE-NULL>/server,"#));

    let back: EncryptedDisk = serde_json::from_str(&json).unwrap();
    assert_eq!(back, disk);
}

#[test]
fn test_invalid_token_fails_deserialization() {
    let err = serde_json::from_str::<KeyLocator>(r#""vmware:key/unknown/data""#).unwrap_err();
    assert!(err.to_string().contains("unknown"), "error {err}");

    assert!(serde_json::from_str::<KeyLocator>("42").is_err());
}

#[test]
fn test_unencodable_locator_fails_serialization() {
    let locator = KeyLocator::pair(KeyLocator::Null, "HMAC", Vec::new());
    assert!(serde_json::to_string(&locator).is_err());
}

#[test]
fn test_type_and_role_names() {
    assert_eq!(serde_json::to_string(&LocatorType::Key).unwrap(), r#""rawkey""#);
    assert_eq!(serde_json::to_string(&Role::AdminIdent).unwrap(), r#""adminIdent""#);

    let locator_type: LocatorType = serde_json::from_str(r#""FQID""#).unwrap();
    assert_eq!(locator_type, LocatorType::Fqid);
    let role: Role = serde_json::from_str(r#""adminrecovery""#).unwrap();
    assert_eq!(role, Role::AdminRecovery);

    assert!(serde_json::from_str::<LocatorType>(r#""bogus""#).is_err());
    assert!(serde_json::from_str::<Role>(r#""bogus""#).is_err());
}
