// XCompose Table Dump
// Serializes a compiled table back into Compose file syntax

use std::io::Write;

use crate::error::ComposeResult;
use crate::escape::{self, CodecError};
use crate::keysym::KeysymResolver;

use super::{ComposeTable, Entry};

/// Format one entry as a Compose line, newline included
fn format_entry(entry: &Entry<'_>, keysyms: &dyn KeysymResolver, line: &mut String) -> Result<(), CodecError> {
    for &keysym in &entry.sequence {
        line.push('<');
        line.push_str(&keysyms.keysym_name(keysym));
        line.push_str("> ");
    }
    line.push(':');
    if !entry.text.is_empty() {
        line.push_str(" \"");
        line.push_str(&escape::encode(entry.text)?);
        line.push('"');
    }
    if let Some(keysym) = entry.keysym {
        line.push(' ');
        line.push_str(&keysyms.keysym_name(keysym));
    }
    line.push('\n');
    Ok(())
}

/// Write every entry of `table` to `out`, one line per entry, in sequence
/// order. Parsing the output yields an identical table.
pub fn dump<W: Write>(table: &ComposeTable, keysyms: &dyn KeysymResolver, mut out: W) -> ComposeResult<()> {
    let mut line = String::new();
    for entry in table {
        line.clear();
        format_entry(&entry, keysyms, &mut line)?;
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Dump `table` into a string
pub fn dump_to_string(table: &ComposeTable, keysyms: &dyn KeysymResolver) -> ComposeResult<String> {
    let mut out = String::new();
    for entry in table {
        format_entry(&entry, keysyms, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::BuiltinKeysyms;

    #[test]
    fn test_dump_format() {
        let table: ComposeTable = "<Multi_key> <o> <c> : \"©\" copyright\n\
                                   <dead_acute> <a> : \"á\"\n\
                                   <dead_tilde> <space> : asciitilde\n"
            .parse()
            .unwrap();
        assert_eq!(
            dump_to_string(&table, &BuiltinKeysyms).unwrap(),
            "<dead_acute> <a> : \"á\"\n\
             <dead_tilde> <space> : asciitilde\n\
             <Multi_key> <o> <c> : \"©\" copyright\n"
        );
    }

    #[test]
    fn test_dump_escapes_text() {
        let table: ComposeTable = r#"<a> : "\"\\\x01" A"#.parse().unwrap();
        assert_eq!(
            dump_to_string(&table, &BuiltinKeysyms).unwrap(),
            "<a> : \"\\\"\\\\\\x01\" A\n"
        );
    }

    #[test]
    fn test_dump_to_writer() {
        let table: ComposeTable = "<a> : \"x\"\n<b> : \"y\"\n".parse().unwrap();
        let mut out = Vec::new();
        dump(&table, &BuiltinKeysyms, &mut out).unwrap();
        assert_eq!(out, b"<a> : \"x\"\n<b> : \"y\"\n");
    }

    #[test]
    fn test_dump_empty() {
        assert_eq!(dump_to_string(&ComposeTable::empty(), &BuiltinKeysyms).unwrap(), "");
    }

    #[test]
    fn test_dump_reparses() {
        let table: ComposeTable = "<a> <b> : \"\\x0abc\" X\n<U20AC> : \"€\" EuroSign\n".parse().unwrap();
        let text = dump_to_string(&table, &BuiltinKeysyms).unwrap();
        let reparsed: ComposeTable = text.parse().unwrap();
        assert!(table.iter().eq(reparsed.iter()));
    }
}
