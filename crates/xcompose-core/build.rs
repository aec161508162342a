use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const KEYSYM_DATA: &str = "data/keysyms.txt";

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("keysym_tables.rs");
    let data = fs::read_to_string(KEYSYM_DATA).unwrap();

    let mut entries: Vec<(String, u32)> = Vec::new();
    for (lineno, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            panic!("{}:{}: expected `name value`", KEYSYM_DATA, lineno + 1);
        };
        let value = u32::from_str_radix(value.trim_start_matches("0x"), 16)
            .unwrap_or_else(|e| panic!("{}:{}: bad value: {}", KEYSYM_DATA, lineno + 1, e));
        entries.push((name.to_string(), value));
    }

    // Lookup by name: binary search over names.
    let mut by_name = entries.clone();
    by_name.sort_by(|a, b| a.0.cmp(&b.0));
    for pair in by_name.windows(2) {
        assert!(pair[0].0 != pair[1].0, "duplicate keysym name {}", pair[0].0);
    }

    // Lookup by value: the first name listed in the data file is canonical.
    let mut by_value = entries;
    by_value.sort_by_key(|(_, value)| *value);
    by_value.dedup_by_key(|(_, value)| *value);

    let mut f = File::create(&dest_path).unwrap();
    writeln!(f, "/// Keysym names sorted by name.").unwrap();
    writeln!(f, "pub(crate) static KEYSYMS_BY_NAME: &[(&str, u32)] = &[").unwrap();
    for (name, value) in &by_name {
        writeln!(f, "    ({:?}, {:#x}),", name, value).unwrap();
    }
    writeln!(f, "];").unwrap();
    writeln!(f).unwrap();
    writeln!(f, "/// Canonical keysym names sorted by value.").unwrap();
    writeln!(f, "pub(crate) static KEYSYMS_BY_VALUE: &[(u32, &str)] = &[").unwrap();
    for (name, value) in &by_value {
        writeln!(f, "    ({:#x}, {:?}),", value, name).unwrap();
    }
    writeln!(f, "];").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", KEYSYM_DATA);
}
