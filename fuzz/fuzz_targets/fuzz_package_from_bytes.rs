#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;

use cprs_opc::{Package, PackageLimits};

/// Keep inflation well below the production caps so pathological archives
/// cannot drive huge allocations while fuzzing.
const MAX_FUZZ_PART_BYTES: u64 = 1 << 20;
const MAX_FUZZ_TOTAL_BYTES: u64 = 4 << 20;

fuzz_target!(|data: &[u8]| {
    let limits = PackageLimits {
        max_part_bytes: MAX_FUZZ_PART_BYTES,
        max_total_bytes: MAX_FUZZ_TOTAL_BYTES,
    };
    let Ok(package) = Package::from_bytes_limited(data, limits) else {
        return;
    };

    // Anything that opened must answer lookups consistently.
    for name in package.part_names() {
        assert!(package.has_part(name));
        assert!(package.part(name).is_some());
    }

    // The filtered copy of an opened package must reopen with the same
    // entries and bytes.
    let Ok(copy_bytes) = package.write_filtered_to_bytes(&BTreeMap::new()) else {
        return;
    };
    let copy = Package::from_bytes_limited(&copy_bytes, limits)
        .expect("filtered copy of a readable package must be readable");
    assert_eq!(package.len(), copy.len());
    for ((name_a, bytes_a), (name_b, bytes_b)) in package.parts().zip(copy.parts()) {
        assert_eq!(name_a, name_b);
        assert_eq!(bytes_a, bytes_b);
    }
});
