use keylocator::{
    from_str, to_string, Error, ErrorKind, KeyLocator, LdapLocator, LocatorClass, LocatorType,
    PassphraseLocator, Role,
};

const SAMPLE_TOKEN: &str = "vmware:key/list/(pair/(fqid/<VMWARE-NULL>/local/ASEAAgEAIexBYS7MTFOGo6XyS0PZfQEIAAwAEAAgAAQAQUVTLTI1NgCmT8mZIAuAGqLaFVU3pBlaT7%2fzDJm3%2fy%2f05n9y9%2bxv1aVSfBY9e6rBrhvKIkB2G%2fsvF7L%2bLGpoojr136%2bghgEA,HMAC%2dSHA%2d256,kIc7z%2fJowrpzVUAand6fC4ixT5BY6KwNTbAPFQErmxFRkmhJNOTp1VyQFnkn5kLgvKpt7KJKlm%2fvLkO6YxkVe61EMdtdsR2nL9DWMsDWov9syEh%2ftVED%2fzCct1fFpUaqSa29J%2fFk9%2bD22HiA0%2flumBPwt9M5aW0HB9T9lEMxNEVpSOBPmOW63DzLzAq1EC7%2fIWuCimTL%2b15%2be4uwDvxEYI5RDofZ2fm9oyM9MLHDTYPo%2fsFo8GU1LK%2frLsQcj20XijOe%2bfLnDlbJcH1nCmyoO8tweHwDs%2fmwhbpQudvXbGVM3jboiXoPj9rki%2boGeE8clTcBUyRxHE6n56MuZ6HmH1GHt9tBLyAHvk4oj2wNGGc%3d))";

#[test]
fn test_sample_token_decodes() {
    let locator = from_str(SAMPLE_TOKEN).unwrap();
    assert_eq!(locator.locator_type(), LocatorType::List);

    let elements = locator.as_list().unwrap();
    assert_eq!(elements.len(), 1);

    let pair = elements[0].as_pair().expect("Expected pair locator");
    assert_eq!(pair.crypto_mac, "HMAC-SHA-256");
    assert_eq!(pair.locked_data.len(), 272);

    let KeyLocator::Fqid(fqid) = pair.locker.as_ref() else {
        panic!("Expected FQID locker, got {:?}", pair.locker);
    };
    assert!(fqid.unique_id.is_empty());
    assert_eq!(fqid.key_server_id, "local");
    assert_eq!(fqid.key_id.len(), 140);
    assert!(fqid.key_id.starts_with("ASEAAgEAIexBYS7M"));
    assert!(fqid.key_id.ends_with("+ghgEA"));
}

#[test]
fn test_sample_token_reencodes_identically() {
    let locator = from_str(SAMPLE_TOKEN).unwrap();
    assert_eq!(to_string(&locator).unwrap(), SAMPLE_TOKEN);
}

#[test]
fn test_fqid_reencodes_with_escapes() {
    let locator = from_str("vmware:key/fqid/unique-123/server1/key-abc").unwrap();
    assert_eq!(locator, KeyLocator::fqid("unique-123", "server1", "key-abc"));
    assert_eq!(
        to_string(&locator).unwrap(),
        "vmware:key/fqid/unique%2d123/server1/key%2dabc"
    );
}

#[test]
fn test_case_variant_prefixes() {
    for token in [
        "VMWARE:KEY/null/%3cVMWARE%2dEMPTYSTRING%3e",
        "VMware:Key/null/%3cVMWARE%2dEMPTYSTRING%3e",
        "vmware%3akey/null/%3cVMWARE%2dEMPTYSTRING%3e",
        "VMWARE:KEY/NULL/<vmware-emptystring>",
    ] {
        assert_eq!(from_str(token).unwrap(), KeyLocator::Null, "token {token}");
    }
}

#[test]
fn test_null_canonical_form() {
    let token = to_string(&KeyLocator::Null).unwrap();
    assert_eq!(token, "vmware:key/null/%3cVMWARE%2dEMPTYSTRING%3e");
    assert_eq!(from_str("VMWARE:KEY/NULL/<vmware-emptystring>").unwrap(), KeyLocator::Null);
}

#[test]
fn test_every_type_has_its_class() {
    let cases = [
        ("vmware:key/null/<VMWARE-EMPTYSTRING>", LocatorClass::Atomic),
        ("vmware:key/rawkey/k", LocatorClass::Atomic),
        ("vmware:key/phrase/id/salt", LocatorClass::Indirect),
        ("vmware:key/ldap/id/s/d/389/true/p", LocatorClass::Indirect),
        ("vmware:key/script/id/p/sig", LocatorClass::Indirect),
        ("vmware:key/role/id/server", LocatorClass::Indirect),
        ("vmware:key/fqid/id/s/k", LocatorClass::Indirect),
        ("vmware:key/list/()", LocatorClass::Compound),
        ("vmware:key/pair/(list/(),HMAC,YmFzZTY0)", LocatorClass::Compound),
    ];

    for (token, class) in cases {
        let locator = from_str(token).unwrap();
        assert_eq!(locator.class(), class, "token {token}");
        assert_eq!(
            locator.unique_id().is_some(),
            class == LocatorClass::Indirect,
            "token {token}"
        );
    }
}

#[test]
fn test_ldap_tokens() {
    let locator = from_str(
        "vmware:key/ldap/ldap%2did/ldap%2eexample%2ecom/example%2ecom/389/true/cn%3dkeys",
    )
    .unwrap();
    assert_eq!(
        locator,
        KeyLocator::Ldap(LdapLocator {
            unique_id: "ldap-id".to_string(),
            server: "ldap.example.com".to_string(),
            domain: "example.com".to_string(),
            port: 389,
            use_ssl: true,
            path: "cn=keys".to_string(),
        })
    );

    let locator =
        from_str("vmware:key/ldap/id/%3cVMWARE%2dNULL%3e/%3cVMWARE%2dNULL%3e/389/false/path")
            .unwrap();
    let KeyLocator::Ldap(ldap) = &locator else {
        panic!("Expected LDAP locator");
    };
    assert!(ldap.server.is_empty());
    assert!(ldap.domain.is_empty());
    assert_eq!(
        to_string(&locator).unwrap(),
        "vmware:key/ldap/id/<VMWARE-NULL>/<VMWARE-NULL>/389/FALSE/path"
    );
}

#[test]
fn test_compound_tokens() {
    assert_eq!(from_str("vmware:key/list/()").unwrap(), KeyLocator::list([]));

    let pair = from_str("vmware:key/pair/(list/(),HMAC,YmFzZTY0)").unwrap();
    assert_eq!(pair, KeyLocator::pair(KeyLocator::list([]), "HMAC", b"base64".to_vec()));

    let pair = from_str("vmware:key/pair/(null/%3cVMWARE%2dEMPTYSTRING%3e,HMAC,data)").unwrap();
    let pair = pair.as_pair().unwrap();
    assert!(pair.locker.is_null());
    assert_eq!(pair.locked_data, [0x75, 0xab, 0x5a]);

    let nested = from_str("vmware:key/list/(list/(list/(null/%3cVMWARE%2dEMPTYSTRING%3e)))").unwrap();
    assert_eq!(
        nested,
        KeyLocator::list([KeyLocator::list([KeyLocator::list([KeyLocator::Null])])])
    );
}

#[test]
fn test_list_preserves_order() {
    let locator = KeyLocator::list([
        KeyLocator::role("", Role::Obfuscation),
        KeyLocator::role("", Role::AdminIdent),
        KeyLocator::role("", Role::AdminRecovery),
        KeyLocator::role("", Role::Server),
    ]);
    let token = to_string(&locator).unwrap();
    assert_eq!(
        token,
        "vmware:key/list/(role/<VMWARE-NULL>/obfuscation,role/<VMWARE-NULL>/adminIdent,\
role/<VMWARE-NULL>/adminRecovery,role/<VMWARE-NULL>/server)"
    );
    assert_eq!(from_str(&token).unwrap(), locator);
}

#[test]
fn test_passphrase_requires_unique_id() {
    let err = from_str("vmware:key/phrase/<VMWARE-NULL>/salt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullNotAllowed);
    assert_eq!(err.path(), vec!["phrase", "unique ID"]);

    let locator = from_str("vmware:key/phrase/<VMWARE-EMPTYSTRING>/salt").unwrap();
    assert_eq!(
        locator,
        KeyLocator::Passphrase(PassphraseLocator {
            unique_id: String::new(),
            key_gen_data: b"salt".to_vec(),
        })
    );
}

#[test]
fn test_malformed_tokens() {
    let cases = [
        ("vmware:key/list/(null/data", ErrorKind::UnmatchedLeftDelimiter),
        ("vmware:key/list/(list/(null/data", ErrorKind::UnmatchedLeftDelimiter),
        ("vmware:key/list/]test)", ErrorKind::ExpectedLeftDelimiter),
        ("vmware:key/list/null/data", ErrorKind::ExpectedLeftDelimiter),
        ("vmware:key/phrase/id//data", ErrorKind::NoCharactersConsumed),
        ("vmware:key/script/id/path", ErrorKind::EmptyInput),
        ("vmware:key/role/id/", ErrorKind::EmptyInput),
        ("vmware:key/fqid/(test)", ErrorKind::EmptyInput),
        (
            "vmware:key/pair/(null/%3cVMWARE%2dEMPTYSTRING%3e,HMAC,)",
            ErrorKind::EmptyLockedData,
        ),
        (
            "vmware:key/pair/(null/%3cVMWARE%2dNULL%3e,HMAC,data)",
            ErrorKind::NullNotAllowed,
        ),
        (
            "vmware:key/pair/(null/%3cVMWARE%2dEMPTYSTRING%3e,HMAC,!!!invalid-base64!!!)",
            ErrorKind::InvalidBase64,
        ),
        ("vmware%ZZ:key/null/data", ErrorKind::InvalidHexDigit),
        ("vmware:/null/data", ErrorKind::InvalidPrefix),
        ("vmware:notkey/null/data", ErrorKind::InvalidPrefix),
        ("vmwarekeytest", ErrorKind::InvalidPrefix),
        ("invalid:key/test", ErrorKind::InvalidPrefix),
        ("vmware:key/unknown/data", ErrorKind::UnknownType),
        ("vmware:key/ldap/id/server/domain/389/notabool/path", ErrorKind::InvalidBoolean),
        ("vmware:key/ldap/id/server/domain/notaport/1/path", ErrorKind::InvalidPort),
        ("", ErrorKind::EmptyInput),
    ];

    for (token, kind) in cases {
        let err = from_str(token).expect_err(token);
        assert_eq!(err.kind(), kind, "token {token}: {err}");
    }
}

#[test]
fn test_malformed_escape_kinds() {
    for token in ["vmware:key/rawkey/a%2", "vmware:key/rawkey/a%zz"] {
        let err = from_str(token).unwrap_err();
        assert!(err.kind().is_malformed_escape(), "token {token}: {err}");
    }
}

#[test]
fn test_error_positions_are_absolute() {
    let err = from_str("vmware:key/list/(rawkey/a,rawkey/%zz)").unwrap_err();
    match err.root() {
        Error::InvalidHexDigit { digits, position } => {
            assert_eq!(digits, "zz");
            assert_eq!(*position, 33);
        }
        other => panic!("Expected InvalidHexDigit, got {other:?}"),
    }
}

#[test]
fn test_error_messages_name_the_field() {
    let err = from_str("vmware:key/pair/(null/<VMWARE-EMPTYSTRING>,HMAC,%2a%2a)").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("pair: locked data: "), "message {message}");
}

#[test]
fn test_deep_nesting_is_rejected_not_overflowed() {
    let depth = 100_000;
    let token = format!(
        "vmware:key/{}null/<VMWARE-EMPTYSTRING>{}",
        "list/(".repeat(depth),
        ")".repeat(depth)
    );
    let err = from_str(&token).unwrap_err();
    assert!(matches!(err.root(), Error::NestingTooDeep { limit: 64 }));
}
