//! The kludge extractor.
//!
//! Scans a decoded message body from the first line forward. Recognition is
//! prefix-based, on purpose: a line is a kludge iff it begins with `@` (a
//! Synchronet `@`-kludge) or its colon-separated key is exactly `To`,
//! `From` or `Subject` (a QWKE long header, matched case-insensitively).
//! The looser "any colon-bearing first word" heuristic strips real body
//! text and is not used.
//!
//! The scan stops at the first non-kludge line; that line and everything
//! after it stays in the body. A blank separator line is consumed only when
//! at least one kludge was collected; a blank line before any kludge is
//! ordinary formatting.

use qwk_types::{
    kludge::Kludge,
    report::{Anomaly, AnomalyKind, Location},
};

/// The result of a body scan.
///
/// Warnings carry only a line number; the store walker fills in the rest
/// of the location.
#[derive(Debug, Default)]
pub struct KludgeScan {
    pub kludges: Vec<Kludge>,
    /// Body lines with kludges (and the separator, if any) removed.
    pub body: Vec<String>,
    pub extended_to: Option<String>,
    pub extended_from: Option<String>,
    pub extended_subject: Option<String>,
    pub warnings: Vec<Anomaly>,
}

/// Scans body lines for kludges.
pub fn scan(lines: &[String]) -> KludgeScan {
    let mut scan = KludgeScan::default();
    let mut cursor = 0;

    while let Some(line) = lines.get(cursor) {
        let Some(kludge) = parse_kludge_line(line) else {
            break;
        };

        if kludge.is_qwke_header() {
            let extended = if kludge.key.eq_ignore_ascii_case("to") {
                &mut scan.extended_to
            } else if kludge.key.eq_ignore_ascii_case("from") {
                &mut scan.extended_from
            } else {
                &mut scan.extended_subject
            };

            // First occurrence wins.
            if extended.is_none() {
                *extended = Some(kludge.value.clone());
            }
        } else {
            scan.warnings.push(Anomaly::new(
                AnomalyKind::UnknownKludge,
                Location {
                    line: Some(cursor),
                    ..Location::default()
                },
                format!("unknown kludge key {:?}", kludge.key),
            ));
        }

        scan.kludges.push(kludge);
        cursor += 1;
    }

    // The separator between kludges and body.
    if !scan.kludges.is_empty() && lines.get(cursor).map_or(false, |line| line.is_empty()) {
        cursor += 1;
    }

    scan.body = lines[cursor..].to_vec();

    scan
}

fn parse_kludge_line(line: &str) -> Option<Kludge> {
    if line.starts_with('@') {
        return Some(match line.split_once(':') {
            Some((key, rest)) => Kludge::new(key.trim_end(), strip_one_space(rest), line),
            None => Kludge::new(line.trim_end(), "", line),
        });
    }

    let (key, rest) = line.split_once(':')?;
    let key = key.trim();

    if ["to", "from", "subject"]
        .iter()
        .any(|qwke| key.eq_ignore_ascii_case(qwke))
    {
        Some(Kludge::new(key, strip_one_space(rest), line))
    } else {
        None
    }
}

fn strip_one_space(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}
