//! The control manifest parser.
//!
//! `CONTROL.DAT` is positional: eleven fixed header lines, then alternating
//! conference number/name pairs, then up to three optional display-file
//! names (welcome, news, goodbye). Everything is preserved verbatim in
//! `raw_lines` so the manifest can be written back unchanged.

use qwk_types::{
    control::{Conference, ControlDat},
    cp437,
    report::{Anomaly, AnomalyKind, Location},
};

use crate::{datetime::control_timestamp, error::QwkError, text::split_lines, validate::ValidationContext};

/// The canonical archive entry name.
pub const FILE_NAME: &str = "CONTROL.DAT";

/// Parses the control manifest.
pub fn parse(bytes: &[u8], ctx: &mut ValidationContext) -> Result<ControlDat, QwkError> {
    let lines = split_lines(&cp437::decode(bytes));

    let mut control = ControlDat {
        raw_lines: lines.clone(),
        ..ControlDat::default()
    };

    if lines.len() < 11 {
        ctx.error(Anomaly::new(
            AnomalyKind::MissingRequiredField,
            Location::in_file(FILE_NAME),
            format!("expected at least 11 header lines, found {}", lines.len()),
        ))?;
        return Ok(control);
    }

    let field = |index: usize| lines[index].trim().to_string();

    control.bbs_name = field(0);
    control.bbs_city = field(1);
    control.bbs_phone = field(2);
    control.sysop = field(3);

    // Line 5: "registration,bbsid".
    match lines[4].split_once(',') {
        Some((registration, bbs_id)) => {
            control.registration_number = registration.trim().to_string();
            control.bbs_id = bbs_id.trim().to_string();
        }
        None => {
            ctx.warn(Anomaly::new(
                AnomalyKind::InvalidFieldFormat,
                Location::at_line(FILE_NAME, 4),
                format!("expected \"registration,bbsid\", found {:?}", lines[4]),
            ));
            control.registration_number = field(4);
        }
    }

    // Line 6: "MM-DD-YYYY,HH:MM:SS".
    control.created = match control_timestamp(lines[5].trim().as_bytes()) {
        Ok((_, Some(created))) => Some(created),
        _ => {
            ctx.warn(Anomaly::new(
                AnomalyKind::InvalidFieldFormat,
                Location::at_line(FILE_NAME, 5),
                format!("invalid packet timestamp {:?}", lines[5]),
            ));
            None
        }
    };

    control.user_name = field(6);
    control.menu_file = field(7);

    control.netmail_conference = parse_number(&lines, 8, "NetMail conference number", ctx);
    control.total_messages = parse_number(&lines, 9, "total message count", ctx);

    // Line 11: conference count minus one. Without it the conference table
    // can't be located, so a bad value ends the structured parse.
    let Some(count_minus_one) = parse_number::<u32>(&lines, 10, "conference count", ctx) else {
        ctx.error(Anomaly::new(
            AnomalyKind::MissingRequiredField,
            Location::at_line(FILE_NAME, 10),
            "conference count is missing or not numeric",
        ))?;
        return Ok(control);
    };

    let mut cursor = 11;

    for _ in 0..=count_minus_one {
        let (Some(number_line), name_line) = (lines.get(cursor), lines.get(cursor + 1)) else {
            ctx.error(Anomaly::new(
                AnomalyKind::MissingRequiredField,
                Location::at_line(FILE_NAME, cursor),
                "conference table ends before the declared count",
            ))?;
            break;
        };

        match number_line.trim().parse::<u16>() {
            Ok(number) => control.conferences.push(Conference {
                number,
                name: name_line.map_or_else(String::new, |name| name.trim().to_string()),
            }),
            Err(_) => {
                ctx.warn(Anomaly::new(
                    AnomalyKind::InvalidFieldFormat,
                    Location::at_line(FILE_NAME, cursor),
                    format!("conference number {:?} is not numeric", number_line),
                ));
            }
        }

        cursor += 2;
    }

    // Optional display-file names, in welcome/news/goodbye order.
    let optional = |cursor: usize| {
        lines
            .get(cursor)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
    };

    control.welcome_file = optional(cursor);
    control.news_file = optional(cursor + 1);
    control.goodbye_file = optional(cursor + 2);

    for index in cursor + 3..lines.len() {
        if !lines[index].trim().is_empty() {
            ctx.warn(Anomaly::new(
                AnomalyKind::UnrecognisedControlLine,
                Location::at_line(FILE_NAME, index),
                format!("unexpected line {:?}", lines[index]),
            ));
        }
    }

    Ok(control)
}

fn parse_number<T: std::str::FromStr>(
    lines: &[String],
    index: usize,
    what: &str,
    ctx: &mut ValidationContext,
) -> Option<T> {
    let line = lines[index].trim();

    match line.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            ctx.warn(Anomaly::new(
                AnomalyKind::InvalidFieldFormat,
                Location::at_line(FILE_NAME, index),
                format!("{what} {line:?} is not numeric"),
            ));
            None
        }
    }
}

#[cfg(test)]
mod test {
    use qwk_types::options::ValidationMode;

    use super::*;

    const MANIFEST: &[u8] = b"My BBS\r\n\
        Springfield\r\n\
        217-555-1212\r\n\
        Sysop Jones\r\n\
        1001,MYBBS\r\n\
        01-15-1994,20:15:32\r\n\
        JANE DOE\r\n\
        \r\n\
        0\r\n\
        42\r\n\
        1\r\n\
        0\r\n\
        Main Board\r\n\
        7\r\n\
        Rust Lang\r\n\
        WELCOME\r\n\
        NEWS\r\n\
        GOODBYE\r\n";

    #[test]
    fn test_parse_manifest() {
        let mut ctx = ValidationContext::new(ValidationMode::Strict);
        let control = parse(MANIFEST, &mut ctx).unwrap();

        assert_eq!(control.bbs_name, "My BBS");
        assert_eq!(control.bbs_city, "Springfield");
        assert_eq!(control.bbs_phone, "217-555-1212");
        assert_eq!(control.sysop, "Sysop Jones");
        assert_eq!(control.registration_number, "1001");
        assert_eq!(control.bbs_id, "MYBBS");
        assert!(control.created.is_some());
        assert_eq!(control.user_name, "JANE DOE");
        assert_eq!(control.menu_file, "");
        assert_eq!(control.netmail_conference, Some(0));
        assert_eq!(control.total_messages, Some(42));

        assert_eq!(
            control.conferences,
            [
                Conference {
                    number: 0,
                    name: "Main Board".into(),
                },
                Conference {
                    number: 7,
                    name: "Rust Lang".into(),
                },
            ],
        );
        assert_eq!(control.conference(7).unwrap().name, "Rust Lang");

        assert_eq!(control.welcome_file.as_deref(), Some("WELCOME"));
        assert_eq!(control.news_file.as_deref(), Some("NEWS"));
        assert_eq!(control.goodbye_file.as_deref(), Some("GOODBYE"));

        assert_eq!(control.raw_lines.len(), 18);
        assert_eq!(control.raw_lines[0], "My BBS");
        assert!(!ctx.report().has_errors());
        assert!(!ctx.report().has_warnings());
    }

    #[test]
    fn test_bad_timestamp_is_a_warning() {
        let mut manifest = MANIFEST.to_vec();
        let patched = String::from_utf8(manifest.clone())
            .unwrap()
            .replace("01-15-1994,20:15:32", "1994-01-15 20:15:32");
        manifest = patched.into_bytes();

        let mut ctx = ValidationContext::new(ValidationMode::Lenient);
        let control = parse(&manifest, &mut ctx).unwrap();

        assert_eq!(control.created, None);
        assert_eq!(ctx.report().warnings().len(), 1);
        assert_eq!(
            ctx.report().warnings()[0].kind,
            AnomalyKind::InvalidFieldFormat,
        );
    }

    #[test]
    fn test_truncated_manifest() {
        let mut ctx = ValidationContext::new(ValidationMode::Lenient);
        let control = parse(b"My BBS\r\nSpringfield\r\n", &mut ctx).unwrap();

        assert_eq!(control.raw_lines.len(), 2);
        assert!(control.conferences.is_empty());
        assert!(ctx.report().has_errors());
    }

    #[test]
    fn test_extra_lines_are_warned() {
        let mut manifest = MANIFEST.to_vec();
        manifest.extend_from_slice(b"SOMETHING ELSE\r\n");

        let mut ctx = ValidationContext::new(ValidationMode::Lenient);
        parse(&manifest, &mut ctx).unwrap();

        let warnings = ctx.report().warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, AnomalyKind::UnrecognisedControlLine);
        assert_eq!(warnings[0].location.line, Some(18));
    }
}
