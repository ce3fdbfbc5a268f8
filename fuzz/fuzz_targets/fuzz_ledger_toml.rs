#![no_main]

use libfuzzer_sys::fuzz_target;
use pactline::domain::ports::StorageGateway;
use pactline::TomlLedgerGateway;

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let path = dir.path().join("ledger.toml");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    // Loading an arbitrary ledger must fail cleanly, never panic
    let gateway = TomlLedgerGateway::new(&path);
    if let Ok(records) = gateway.list_contracts() {
        for record in records {
            let _ = gateway.get_milestones(record.id());
        }
    }
});
