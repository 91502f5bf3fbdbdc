//! Parsers for the date and time fields.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use nom::{
    bytes::complete::{tag, take_while_m_n},
    character::is_digit,
    combinator::map_res,
    sequence::tuple,
    IResult,
};

/// `header-date = 2DIGIT "-" 2DIGIT "-" 2DIGIT`
///
/// `MM-DD-YY`. Two-digit years pivot at 80: `94` is 1994, `03` is 2003.
pub fn header_date(input: &[u8]) -> IResult<&[u8], Option<NaiveDate>> {
    let mut parser = tuple((digit_2, tag(b"-"), digit_2, tag(b"-"), digit_2));

    let (remaining, (month, _, day, _, year)) = parser(input)?;

    let year = if year >= 80 { 1900 + year } else { 2000 + year };

    Ok((remaining, NaiveDate::from_ymd_opt(year as i32, month, day)))
}

/// `header-time = 2DIGIT ":" 2DIGIT`
///
/// `HH:MM`. The header has no seconds.
pub fn header_time(input: &[u8]) -> IResult<&[u8], Option<NaiveTime>> {
    let mut parser = tuple((digit_2, tag(b":"), digit_2));

    let (remaining, (hours, _, minutes)) = parser(input)?;

    Ok((remaining, NaiveTime::from_hms_opt(hours, minutes, 0)))
}

/// `control-timestamp = 2DIGIT "-" 2DIGIT "-" 4DIGIT "," 2DIGIT ":" 2DIGIT ":" 2DIGIT`
///
/// `MM-DD-YYYY,HH:MM:SS`, line 6 of the control manifest.
pub fn control_timestamp(input: &[u8]) -> IResult<&[u8], Option<NaiveDateTime>> {
    let mut parser = tuple((
        digit_2,
        tag(b"-"),
        digit_2,
        tag(b"-"),
        digit_4,
        tag(b","),
        digit_2,
        tag(b":"),
        digit_2,
        tag(b":"),
        digit_2,
    ));

    let (remaining, (month, _, day, _, year, _, hours, _, minutes, _, seconds)) = parser(input)?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day);
    let time = NaiveTime::from_hms_opt(hours, minutes, seconds);

    Ok((
        remaining,
        match (date, time) {
            (Some(date), Some(time)) => Some(NaiveDateTime::new(date, time)),
            _ => None,
        },
    ))
}

fn digit_2(input: &[u8]) -> IResult<&[u8], u32> {
    map_res(take_while_m_n(2, 2, is_digit), |bytes: &[u8]| {
        std::str::from_utf8(bytes).unwrap().parse::<u32>()
    })(input)
}

fn digit_4(input: &[u8]) -> IResult<&[u8], u32> {
    map_res(take_while_m_n(4, 4, is_digit), |bytes: &[u8]| {
        std::str::from_utf8(bytes).unwrap().parse::<u32>()
    })(input)
}
