//! Parser for the "self" netlist file format (spec format used by the
//! ISCAS-85 translator): whitespace-separated integer records, one per line.
//!
//! ```text
//! kind  label  op  fanout_count  fanin_count  fanin_labels...
//! ```
//!
//! `kind`: 0 = internal gate, 1 = primary input, 2 = fanout branch,
//! 3 = primary output. `op`: 0=IPT, 1=BRCH, 2=XOR, 3=OR, 4=NOR, 5=NOT,
//! 6=NAND, 7=AND.

use std::path::Path;

use fs_err as fs;

use super::{Kind, LineRecord, Op};
use crate::error::{FsimError, Result};

fn input_error(path: &str, line_no: usize, raw: &str, message: impl Into<String>) -> FsimError {
    FsimError::Input {
        path: path.to_string(),
        line_no,
        raw: raw.to_string(),
        message: message.into(),
    }
}

fn parse_kind(path: &str, line_no: usize, raw: &str, token: &str) -> Result<Kind> {
    match token {
        "0" => Ok(Kind::Gate),
        "1" => Ok(Kind::PrimaryInput),
        "2" => Ok(Kind::Branch),
        "3" => Ok(Kind::PrimaryOutput),
        other => Err(input_error(
            path,
            line_no,
            raw,
            format!("unknown line kind code {:?}", other),
        )),
    }
}

fn parse_op(path: &str, line_no: usize, raw: &str, token: &str) -> Result<Op> {
    match token {
        "0" => Ok(Op::Ipt),
        "1" => Ok(Op::Brch),
        "2" => Ok(Op::Xor),
        "3" => Ok(Op::Or),
        "4" => Ok(Op::Nor),
        "5" => Ok(Op::Not),
        "6" => Ok(Op::Nand),
        "7" => Ok(Op::And),
        other => Err(input_error(
            path,
            line_no,
            raw,
            format!("unknown gate operator code {:?}", other),
        )),
    }
}

fn parse_int(path: &str, line_no: usize, raw: &str, token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| input_error(path, line_no, raw, format!("not an integer: {:?}", token)))
}

/// Parses the contents of a "self"-format netlist file already read into
/// memory. Kept separate from [`read_self_format`] so tests can exercise
/// the parser without touching the filesystem.
pub fn parse_self_format(path: &str, contents: &str) -> Result<Vec<LineRecord>> {
    let mut records = Vec::new();
    for (line_no, raw) in contents.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 5 {
            return Err(input_error(
                path,
                line_no,
                raw,
                "expected at least 5 columns: kind label op fanout_count fanin_count",
            ));
        }
        let kind = parse_kind(path, line_no, raw, tokens[0])?;
        let label = parse_int(path, line_no, raw, tokens[1])?;
        let op = parse_op(path, line_no, raw, tokens[2])?;
        // tokens[3] is the fanout count, recomputed from the fanout
        // inversion in `Netlist::build` rather than trusted from the file.
        let fanin_count: usize = tokens[4]
            .parse()
            .map_err(|_| input_error(path, line_no, raw, "fanin count is not an integer"))?;
        let fanin_tokens = &tokens[5..];
        if fanin_tokens.len() != fanin_count {
            return Err(input_error(
                path,
                line_no,
                raw,
                format!(
                    "fanin count {} does not match {} listed fanin label(s)",
                    fanin_count,
                    fanin_tokens.len()
                ),
            ));
        }
        let mut fanin_labels = Vec::with_capacity(fanin_count);
        for token in fanin_tokens {
            fanin_labels.push(parse_int(path, line_no, raw, token)?);
        }
        records.push(LineRecord {
            label,
            kind,
            op,
            fanin_labels,
        });
    }
    Ok(records)
}

/// Reads and parses a "self"-format netlist file from disk.
///
/// # Errors
///
/// Returns [`FsimError::Input`] if the file cannot be read or a record is
/// malformed per the column layout above.
pub fn read_self_format(path: impl AsRef<Path>) -> Result<Vec<LineRecord>> {
    let path_ref = path.as_ref();
    let path_str = path_ref.display().to_string();
    let contents = fs::read_to_string(path_ref).map_err(|e| {
        input_error(&path_str, 0, "", format!("could not read file: {}", e))
    })?;
    parse_self_format(&path_str, &contents)
}
