//! The door identity parser.
//!
//! `DOOR.ID` is a `KEY = VALUE` file. The specified form has spaces around
//! the `=`; the bare `KEY=VALUE` form circulates anyway and is accepted
//! outside strict mode. The lone token `RECEIPT` and repeated
//! `CONTROLTYPE` lines each contribute a capability.

use qwk_types::{
    door::{DoorCapabilities, DoorId},
    cp437,
    options::ValidationMode,
    report::{Anomaly, AnomalyKind, Location},
};

use crate::{error::QwkError, text::split_lines, validate::ValidationContext};

/// The canonical archive entry name.
pub const FILE_NAME: &str = "DOOR.ID";

/// Parses the door identity file.
pub fn parse(bytes: &[u8], ctx: &mut ValidationContext) -> Result<DoorId, QwkError> {
    let lines = split_lines(&cp437::decode(bytes));

    let mut door = None;
    let mut version = None;
    let mut system = None;
    let mut capabilities = DoorCapabilities::empty();

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("RECEIPT") {
            capabilities |= DoorCapabilities::RECEIPT;
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            ctx.warn(Anomaly::new(
                AnomalyKind::UnrecognisedControlLine,
                Location::at_line(FILE_NAME, index),
                format!("expected \"KEY = VALUE\", found {trimmed:?}"),
            ));
            continue;
        };

        if ctx.mode() == ValidationMode::Strict && !(key.ends_with(' ') && value.starts_with(' ')) {
            return Err(ctx.fatal(Anomaly::new(
                AnomalyKind::InvalidFieldFormat,
                Location::at_line(FILE_NAME, index),
                format!("missing spaces around \"=\" in {trimmed:?}"),
            )));
        }

        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        match key.as_str() {
            "DOOR" => door = Some(value.to_string()),
            "VERSION" => version = Some(value.to_string()),
            "SYSTEM" => system = Some(value.to_string()),
            "CONTROLTYPE" => match value.to_ascii_uppercase().as_str() {
                "ADD" => capabilities |= DoorCapabilities::CONTROL_ADD,
                "DROP" => capabilities |= DoorCapabilities::CONTROL_DROP,
                "REQUEST" => capabilities |= DoorCapabilities::CONTROL_REQUEST,
                "RESET" => capabilities |= DoorCapabilities::CONTROL_RESET,
                other => {
                    ctx.warn(Anomaly::new(
                        AnomalyKind::UnrecognisedControlLine,
                        Location::at_line(FILE_NAME, index),
                        format!("unknown CONTROLTYPE {other:?}"),
                    ));
                }
            },
            "MIXEDCASE" => {
                if value.eq_ignore_ascii_case("YES") {
                    capabilities |= DoorCapabilities::MIXED_CASE;
                }
            }
            "FIDOTAG" => {
                if value.eq_ignore_ascii_case("YES") {
                    capabilities |= DoorCapabilities::FIDO_TAG;
                }
            }
            _ => {
                ctx.warn(Anomaly::new(
                    AnomalyKind::UnrecognisedControlLine,
                    Location::at_line(FILE_NAME, index),
                    format!("unknown key {key:?}"),
                ));
            }
        }
    }

    if door.is_none() {
        ctx.error(Anomaly::new(
            AnomalyKind::MissingRequiredField,
            Location::in_file(FILE_NAME),
            "required key DOOR is missing",
        ))?;
    }

    if version.is_none() {
        ctx.error(Anomaly::new(
            AnomalyKind::MissingRequiredField,
            Location::in_file(FILE_NAME),
            "required key VERSION is missing",
        ))?;
    }

    Ok(DoorId {
        door: door.unwrap_or_default(),
        version: version.unwrap_or_default(),
        system,
        capabilities,
        raw_lines: lines,
    })
}
