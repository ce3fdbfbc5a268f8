#![no_main]

use libfuzzer_sys::fuzz_target;
use pactline::{ContractId, MilestoneStatus};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(status) = content.parse::<MilestoneStatus>() {
            assert_eq!(status.as_str().parse::<MilestoneStatus>(), Ok(status));
        }
        let _ = content.parse::<ContractId>();
        let _ = serde_json::from_str::<MilestoneStatus>(content);
    }
});
