//! Human readable rendering of NBT, one tag per line.
//!
//! ```text
//! TAG_Compound({
//! 	'name': TAG_String("Steve"),
//! 	'pos': TAG_List<TAG_Int>({
//! 		TAG_Int(1),
//! 	}),
//! })
//! ```

use std::fmt::Write;

use crate::{from_bytes_named, tag_name, Encoding, NbtTag, Result};

/// Decodes `data` with `encoding` and renders the root tag.
pub fn dump<E: Encoding>(data: &[u8], encoding: E) -> Result<String> {
    let (_, tag) = from_bytes_named::<NbtTag, E>(data, encoding)?;
    Ok(dump_tag(&tag))
}

/// Renders an already decoded tag.
pub fn dump_tag(tag: &NbtTag) -> String {
    let mut out = String::new();
    write_tag(&mut out, tag, 0);
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push('\t');
    }
}

fn write_tag(out: &mut String, tag: &NbtTag, level: usize) {
    let name = tag_name(tag.get_type_id());
    // Writing into a String cannot fail.
    let _ = match tag {
        NbtTag::Byte(v) => write!(out, "{name}({v})"),
        NbtTag::Short(v) => write!(out, "{name}({v})"),
        NbtTag::Int(v) => write!(out, "{name}({v})"),
        NbtTag::Long(v) => write!(out, "{name}({v})"),
        NbtTag::Float(v) => write!(out, "{name}({v})"),
        NbtTag::Double(v) => write!(out, "{name}({v})"),
        NbtTag::String(v) => write!(out, "{name}({v:?})"),
        NbtTag::ByteArray(v) => {
            let hex: Vec<String> = v.iter().map(|b| format!("{b:02x}")).collect();
            write!(out, "{name}([{}])", hex.join(" "))
        }
        NbtTag::IntArray(v) => write!(out, "{name}({v:?})"),
        NbtTag::LongArray(v) => write!(out, "{name}({v:?})"),
        NbtTag::List(list) => {
            let element = list.first().map_or(tag_name(0), |t| tag_name(t.get_type_id()));
            let _ = write!(out, "{name}<{element}>(");
            write_block(out, list.iter().map(|t| (None, t)), level);
            Ok(())
        }
        NbtTag::Compound(compound) => {
            out.push_str(name);
            out.push('(');
            write_block(
                out,
                compound.child_tags.iter().map(|(k, t)| (Some(k.as_str()), t)),
                level,
            );
            Ok(())
        }
    };
}

fn write_block<'a>(
    out: &mut String,
    entries: impl ExactSizeIterator<Item = (Option<&'a str>, &'a NbtTag)>,
    level: usize,
) {
    if entries.len() == 0 {
        out.push_str("{})");
        return;
    }
    out.push_str("{\n");
    for (key, tag) in entries {
        indent(out, level + 1);
        if let Some(key) = key {
            let _ = write!(out, "'{key}': ");
        }
        write_tag(out, tag, level + 1);
        out.push_str(",\n");
    }
    indent(out, level);
    out.push_str("})");
}
