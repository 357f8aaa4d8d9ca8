//! Query string filter parsing
//!
//! Turns `field=value&field[op]=value` query strings into [`Filter`]s.
//! The whole string is percent-decoded before it is split, so `+` and `%20`
//! both become spaces (and an encoded `&` or `=` acts as a separator).

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::types::{Filter, FilterError, FilterOp};

/// Keys that end filter parsing. The key itself and everything after it is dropped.
pub const CONTROL_KEYS: &[&str] = &["page", "sort", "limit", "fields"];

/// Parse a raw query string (without the leading `?`) into filters
///
/// Filters keep their order of appearance and are meant to be combined with AND.
pub fn parse_query_filters(raw_query: &str) -> Result<Vec<Filter>, FilterError> {
    let decoded = decode_query(raw_query);
    if decoded.is_empty() {
        return Ok(Vec::new());
    }

    let mut filters = Vec::new();
    for pair in decoded.split('&').filter(|p| !p.is_empty()) {
        let mut parts = pair.split('=');
        let (key, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => (key, value),
            _ => return Err(FilterError::MalformedFilter(pair.to_string())),
        };

        if CONTROL_KEYS.contains(&key) {
            break;
        }

        let (field, op) = parse_key(key)?;
        filters.push(Filter::new(field, op, value));
    }

    Ok(filters)
}

/// Split `field[op]` into its field name and operator (default `eq`)
fn parse_key(key: &str) -> Result<(&str, FilterOp), FilterError> {
    match key.split_once('[') {
        Some((field, rest)) if rest.contains(']') => {
            let op = rest
                .strip_suffix(']')
                .ok_or_else(|| FilterError::UnsupportedOperator(rest.to_string()))?;
            Ok((field, op.parse()?))
        }
        _ => Ok((key, FilterOp::Eq)),
    }
}

fn decode_query(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode_str(raw).decode_utf8_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_string() {
        assert_eq!(parse_query_filters("").unwrap(), vec![]);
    }

    #[test]
    fn simple_query_string() {
        assert_eq!(
            parse_query_filters("name=John").unwrap(),
            vec![Filter::new("name", FilterOp::Eq, "John")]
        );
    }

    #[test]
    fn query_string_with_operators() {
        assert_eq!(
            parse_query_filters("age[gt]=30&salary[lt]=5000").unwrap(),
            vec![
                Filter::new("age", FilterOp::Gt, "30"),
                Filter::new("salary", FilterOp::Lt, "5000"),
            ]
        );
    }

    #[test]
    fn explicit_eq_operator() {
        assert_eq!(
            parse_query_filters("abv[eq]=5").unwrap(),
            vec![Filter::new("abv", FilterOp::Eq, "5")]
        );
    }

    #[test]
    fn control_key_stops_parsing() {
        assert_eq!(
            parse_query_filters("name=John&page=2").unwrap(),
            vec![Filter::new("name", FilterOp::Eq, "John")]
        );
    }

    #[test]
    fn control_key_drops_every_later_filter() {
        let filters = parse_query_filters("style=IPA&limit=5&abv[gt]=4&name=Hop").unwrap();
        assert_eq!(filters, vec![Filter::new("style", FilterOp::Eq, "IPA")]);

        for key in CONTROL_KEYS {
            let query = format!("{}=1&name=John", key);
            assert!(parse_query_filters(&query).unwrap().is_empty(), "{}", key);
        }
    }

    #[test]
    fn only_control_keys() {
        assert!(parse_query_filters("page=1&sort=name").unwrap().is_empty());
    }

    #[test]
    fn bracketed_control_key_is_a_filter() {
        assert_eq!(
            parse_query_filters("limit[gt]=3").unwrap(),
            vec![Filter::new("limit", FilterOp::Gt, "3")]
        );
    }

    #[test]
    fn url_encoded_characters() {
        assert_eq!(
            parse_query_filters("name=John+Doe&city=New%20York").unwrap(),
            vec![
                Filter::new("name", FilterOp::Eq, "John Doe"),
                Filter::new("city", FilterOp::Eq, "New York"),
            ]
        );
    }

    #[test]
    fn plus_and_percent_space_decode_identically() {
        assert_eq!(
            parse_query_filters("name=John+Doe").unwrap(),
            parse_query_filters("name=John%20Doe").unwrap()
        );
    }

    #[test]
    fn encoded_brackets() {
        assert_eq!(
            parse_query_filters("price%5Bge%5D=2.5").unwrap(),
            vec![Filter::new("price", FilterOp::Ge, "2.5")]
        );
    }

    #[test]
    fn repeated_field_keeps_both() {
        assert_eq!(
            parse_query_filters("abv[ge]=3&abv[lt]=7").unwrap(),
            vec![
                Filter::new("abv", FilterOp::Ge, "3"),
                Filter::new("abv", FilterOp::Lt, "7"),
            ]
        );
    }

    #[test]
    fn unknown_fields_are_kept() {
        assert_eq!(
            parse_query_filters("not_a_field=x").unwrap(),
            vec![Filter::new("not_a_field", FilterOp::Eq, "x")]
        );
    }

    #[test]
    fn empty_value() {
        assert_eq!(
            parse_query_filters("style=").unwrap(),
            vec![Filter::new("style", FilterOp::Eq, "")]
        );
    }

    #[test]
    fn trailing_ampersand_ignored() {
        assert_eq!(
            parse_query_filters("name=John&").unwrap(),
            vec![Filter::new("name", FilterOp::Eq, "John")]
        );
    }

    #[test]
    fn unsupported_operator() {
        assert_eq!(
            parse_query_filters("abv[ne]=3"),
            Err(FilterError::UnsupportedOperator("ne".to_string()))
        );
    }

    #[test]
    fn trailing_text_after_bracket_is_unsupported() {
        assert!(matches!(
            parse_query_filters("abv[gt]x=3"),
            Err(FilterError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn missing_value_is_malformed() {
        assert_eq!(
            parse_query_filters("name"),
            Err(FilterError::MalformedFilter("name".to_string()))
        );
    }

    #[test]
    fn extra_equals_is_malformed() {
        assert!(matches!(
            parse_query_filters("name=a=b"),
            Err(FilterError::MalformedFilter(_))
        ));
    }

    #[test]
    fn malformed_after_control_key_is_ignored() {
        assert!(parse_query_filters("page=1&garbage").unwrap().is_empty());
    }
}
