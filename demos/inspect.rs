//! Decode key-locator tokens and print their structure.
//!
//! Run with: cargo run --example inspect -- '<token>' ...
//! Without arguments a few sample tokens are inspected.

use keylocator::{from_str, KeyLocator};
use std::error::Error;

const SAMPLES: &[&str] = &[
    "vmware:key/fqid/unique%2d123/server1/key%2dabc",
    "vmware:key/list/(role/<VMWARE-NULL>/server,pair/(list/(),HMAC,YmFzZTY0))",
    "vmware:key/ldap/id/ldap%2eexample%2ecom/<VMWARE-NULL>/636/true/cn%3dkeys",
    "vmware:key/ldap/id/server/domain/notaport/true/path",
];

fn describe(locator: &KeyLocator, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = locator.locator_type().name();

    match locator {
        KeyLocator::Null => println!("{indent}{name}"),
        KeyLocator::Key(key) => println!("{indent}{name} ({} bytes)", key.len()),
        KeyLocator::Passphrase(p) => println!(
            "{indent}{name} id={:?} ({} bytes of key generation data)",
            p.unique_id,
            p.key_gen_data.len()
        ),
        KeyLocator::Ldap(l) => println!(
            "{indent}{name} id={:?} server={:?} domain={:?} port={} ssl={} path={:?}",
            l.unique_id, l.server, l.domain, l.port, l.use_ssl, l.path
        ),
        KeyLocator::Script(s) => println!(
            "{indent}{name} id={:?} path={:?} ({} byte signature)",
            s.unique_id,
            s.rel_path,
            s.signature.len()
        ),
        KeyLocator::Role(r) => println!("{indent}{name} id={:?} role={}", r.unique_id, r.role),
        KeyLocator::Fqid(f) => println!(
            "{indent}{name} id={:?} server={:?} key={:?}",
            f.unique_id, f.key_server_id, f.key_id
        ),
        KeyLocator::List(elements) => {
            println!("{indent}{name} ({} elements)", elements.len());
            for element in elements {
                describe(element, depth + 1);
            }
        }
        KeyLocator::Pair(pair) => {
            println!(
                "{indent}{name} mac={:?} ({} bytes locked)",
                pair.crypto_mac,
                pair.locked_data.len()
            );
            describe(&pair.locker, depth + 1);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let tokens: Vec<&str> = if args.is_empty() {
        SAMPLES.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    for token in tokens {
        println!("{token}");
        match from_str(token) {
            Ok(locator) => {
                describe(&locator, 1);
                println!("  re-encoded: {}", locator.to_token()?);
            }
            Err(err) => println!("  error ({:?}): {err}", err.kind()),
        }
        println!();
    }

    Ok(())
}
