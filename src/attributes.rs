//! Conversion of NetCDF CF-1.6 attributes into COG metadata.
//!
//! Everything in here is pure: attribute maps in, metadata maps out. Attributes
//! that cannot be converted, and values kept as they were where a rewrite was
//! expected, are reported back to the caller rather than logged.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::AttributeConversion;
use crate::readers::{AttributeMap, AttributeValue, Number};

pub const PROCESS_DATE_PLACEHOLDER: &str = "<processDateISO>";
pub const VERSION_PLACEHOLDER: &str = "<version>";

/// COG metadata items, ordered by key.
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Attribute {name} cannot be converted to metadata: {reason}")]
pub struct AttributeConversionError {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Conversion {
    pub metadata: Metadata,
    /// Attributes left out of `metadata`
    pub skipped: Vec<AttributeConversionError>,
    /// Attributes written unchanged although a rewrite applies to them
    pub warnings: Vec<String>,
}

/// Converts the global attributes of a product.
///
/// On top of the common rules, `history` gets the rendered history template
/// appended on a new line and `identifier` is rebuilt from
/// `parent_identifier` and the COG file name.
pub fn convert_file_attributes(
    attributes: &AttributeMap,
    rule: &AttributeConversion,
    cog_file: &str,
    process_date: NaiveDate,
) -> Conversion {
    let mut conversion = Conversion::default();

    for (name, value) in attributes {
        if rule.is_removed(name) {
            continue;
        }

        let converted = match name.as_str() {
            "history" => convert_value(name, value, rule).map(|old| {
                if rule.history.is_empty() {
                    old
                } else {
                    format!("{}\n{}", old, render_history(&rule.history, process_date))
                }
            }),
            "identifier" => match attributes.get("parent_identifier") {
                Some(parent) => convert_value("parent_identifier", parent, rule)
                    .map(|parent| format!("{}:{}", parent, product_identifier(cog_file))),
                None => {
                    conversion.warnings.push(format!(
                        "Attribute {}: parent_identifier is missing, value kept unchanged",
                        name
                    ));
                    convert_value(name, value, rule)
                }
            },
            _ => convert_value(name, value, rule),
        };

        match converted {
            Ok(text) => {
                conversion.metadata.insert(name.clone(), text);
            }
            Err(e) => conversion.skipped.push(e),
        }
    }

    conversion
}

/// Converts the attributes of one variable into band metadata.
pub fn convert_band_attributes(
    attributes: &AttributeMap,
    rule: &AttributeConversion,
) -> Conversion {
    let mut conversion = Conversion::default();

    for (name, value) in attributes.iter().filter(|(name, _)| !rule.is_removed(name)) {
        match convert_value(name, value, rule) {
            Ok(text) => {
                conversion.metadata.insert(name.clone(), text);
            }
            Err(e) => conversion.skipped.push(e),
        }
    }

    conversion
}

pub fn render_history(template: &str, process_date: NaiveDate) -> String {
    template
        .replace(PROCESS_DATE_PLACEHOLDER, &process_date.format("%Y-%m-%d").to_string())
        .replace(VERSION_PLACEHOLDER, env!("CARGO_PKG_VERSION"))
}

/// Joins numeric list elements with the separator and wraps the result in the
/// enclosure characters, if any.
pub fn join_list(values: &[Number], rule: &AttributeConversion) -> String {
    let joined = values
        .iter()
        .map(Number::to_string)
        .collect::<Vec<String>>()
        .join(&rule.list_separator);

    match rule.enclosure() {
        Some((open, close)) => format!("{}{}{}", open, joined, close),
        None => joined,
    }
}

/// Inverse of [`join_list`]: strips one leading opening and one trailing
/// closing enclosure character, then splits on the separator.
#[cfg(test)]
pub fn parse_list<'a>(text: &'a str, rule: &AttributeConversion) -> Vec<&'a str> {
    let inner = match rule.enclosure() {
        Some((open, close)) => {
            let text = text.strip_prefix(open).unwrap_or(text);
            text.strip_suffix(close).unwrap_or(text)
        }
        None => text,
    };

    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(rule.list_separator.as_str()).collect()
}

fn convert_value(
    name: &str,
    value: &AttributeValue,
    rule: &AttributeConversion,
) -> Result<String, AttributeConversionError> {
    match value {
        AttributeValue::Text(text) => Ok(text.clone()),
        AttributeValue::Number(number) => Ok(number.to_string()),
        AttributeValue::NumberList(values) => Ok(join_list(values, rule)),
        AttributeValue::TextList(_) => Err(AttributeConversionError {
            name: name.to_string(),
            reason: "only numeric lists can be flattened".to_string(),
        }),
    }
}

// c_gls_NDVI300-NDVI_202404010000_GLOBE_OLCI_V2.0.1.tiff
//   -> NDVI300-NDVI_202404010000_GLOBE_OLCI_V2.0.1
fn product_identifier(cog_file: &str) -> String {
    let stem = match cog_file.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => cog_file,
    };
    stem.replace("c_gls_", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn rule(list_enclosure: &str, list_separator: &str) -> AttributeConversion {
        AttributeConversion {
            history: "<processDateISO> Conversion to COG with version <version>".to_string(),
            list_enclosure: list_enclosure.to_string(),
            list_separator: list_separator.to_string(),
            remove_attribute_lst: BTreeSet::from([
                "_FillValue".to_string(),
                "grid_mapping".to_string(),
            ]),
        }
    }

    fn process_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 4).expect("Invalid date")
    }

    fn convert_globals(attributes: &AttributeMap, rule: &AttributeConversion) -> Conversion {
        convert_file_attributes(attributes, rule, COG_FILE, process_date())
    }

    const COG_FILE: &str = "c_gls_NDVI300-NDVI_202404010000_GLOBE_OLCI_V2.0.1.tiff";

    fn global_attributes() -> AttributeMap {
        AttributeMap::from([
            ("history".to_string(), AttributeValue::from("created by X")),
            (
                "identifier".to_string(),
                AttributeValue::from(
                    "urn:cgls:global:ndvi300_v2_333m:NDVI300_202404010000_GLOBE_OLCI_V2.0.1",
                ),
            ),
            (
                "parent_identifier".to_string(),
                AttributeValue::from("urn:cgls:global:ndvi300_v2_333m"),
            ),
            ("grid_mapping".to_string(), AttributeValue::from("crs")),
            ("orbit_type".to_string(), AttributeValue::from("LEO")),
        ])
    }

    #[test]
    fn test_history_is_appended() {
        let conversion = convert_globals(&global_attributes(), &rule("[]", ","));

        assert_eq!(
            conversion.metadata["history"],
            format!(
                "created by X\n2024-09-04 Conversion to COG with version {}",
                env!("CARGO_PKG_VERSION")
            )
        );
        assert!(conversion.skipped.is_empty());
    }

    #[test]
    fn test_empty_history_template_keeps_history() {
        let mut rule = rule("[]", ",");
        rule.history.clear();
        let conversion = convert_globals(&global_attributes(), &rule);
        assert_eq!(conversion.metadata["history"], "created by X");
    }

    #[test]
    fn test_identifier_is_rebuilt() {
        let conversion = convert_globals(&global_attributes(), &rule("[]", ","));
        assert_eq!(
            conversion.metadata["identifier"],
            "urn:cgls:global:ndvi300_v2_333m:NDVI300-NDVI_202404010000_GLOBE_OLCI_V2.0.1"
        );
    }

    #[test]
    fn test_identifier_without_parent_is_kept() {
        let mut attributes = global_attributes();
        attributes.remove("parent_identifier");
        let conversion = convert_globals(&attributes, &rule("[]", ","));

        assert_eq!(
            conversion.metadata["identifier"],
            "urn:cgls:global:ndvi300_v2_333m:NDVI300_202404010000_GLOBE_OLCI_V2.0.1"
        );
        assert!(conversion.skipped.is_empty());
        assert_eq!(conversion.warnings.len(), 1);
        assert!(conversion.warnings[0].contains("parent_identifier"));

        let only_identifier = AttributeMap::from([(
            "identifier".to_string(),
            AttributeValue::from("urn:orig"),
        )]);
        let conversion = convert_globals(&only_identifier, &rule("", " "));
        assert_eq!(conversion.metadata.get("identifier").map(String::as_str), Some("urn:orig"));
    }

    #[test]
    fn test_removed_attributes_never_appear() {
        let rule = rule("[]", ",");
        let mut attributes = global_attributes();
        attributes.insert("_FillValue".to_string(), AttributeValue::Number(Number::Float(-1.0)));

        let file = convert_globals(&attributes, &rule);
        let band = convert_band_attributes(&attributes, &rule);

        for removed in &rule.remove_attribute_lst {
            assert!(!file.metadata.contains_key(removed));
            assert!(!band.metadata.contains_key(removed));
        }
        assert_eq!(file.metadata["orbit_type"], "LEO");
    }

    #[test]
    fn test_band_attributes() {
        let attributes = AttributeMap::from([
            (
                "long_name".to_string(),
                AttributeValue::from("Normalized Difference Vegetation Index"),
            ),
            ("scale_factor".to_string(), AttributeValue::Number(Number::Double(0.004))),
            ("add_offset".to_string(), AttributeValue::Number(Number::Double(-0.08))),
            ("missing_value".to_string(), AttributeValue::Number(Number::UInt(255))),
            (
                "valid_range".to_string(),
                AttributeValue::NumberList(vec![Number::UInt(0), Number::UInt(250)]),
            ),
            (
                "flag_meanings".to_string(),
                AttributeValue::TextList(vec!["sea".to_string(), "no_data".to_string()]),
            ),
        ]);

        let conversion = convert_band_attributes(&attributes, &rule("[]", ", "));

        assert_eq!(conversion.metadata["long_name"], "Normalized Difference Vegetation Index");
        assert_eq!(conversion.metadata["scale_factor"], "0.004");
        assert_eq!(conversion.metadata["add_offset"], "-0.08");
        assert_eq!(conversion.metadata["missing_value"], "255");
        assert_eq!(conversion.metadata["valid_range"], "[0, 250]");
        assert!(!conversion.metadata.contains_key("flag_meanings"));
        assert_eq!(
            conversion.skipped,
            vec![AttributeConversionError {
                name: "flag_meanings".to_string(),
                reason: "only numeric lists can be flattened".to_string(),
            }]
        );
    }

    #[test]
    fn test_join_list_without_enclosure() {
        let values = [Number::Int(251), Number::Int(252), Number::Int(253)];
        assert_eq!(join_list(&values, &rule("", " ")), "251 252 253");
        assert_eq!(join_list(&values, &rule("()", ";")), "(251;252;253)");
        assert_eq!(join_list(&[], &rule("[]", ",")), "[]");
        assert_eq!(join_list(&values, &rule("", "")), "251252253");
    }

    #[test]
    fn test_list_round_trip() {
        let lists = [
            vec![Number::Double(-0.08), Number::Double(0.92)],
            vec![Number::Double(1e20), Number::Double(-3.5), Number::Double(0.0)],
            vec![Number::Int(-1)],
            vec![],
        ];

        // an empty separator concatenates elements and cannot be split back
        for (enclosure, separator) in [("[]", ","), ("", ", "), ("{}", "|"), ("", " ")] {
            let rule = rule(enclosure, separator);
            for values in &lists {
                let text = join_list(values, &rule);
                let parsed: Vec<f64> = parse_list(&text, &rule)
                    .iter()
                    .map(|item| item.trim().parse::<f64>().unwrap())
                    .collect();
                let expected: Vec<f64> = values.iter().map(Number::as_f64).collect();
                assert_eq!(parsed, expected, "{} with {:?}/{:?}", text, enclosure, separator);
            }
        }
    }

    #[test]
    fn test_render_history() {
        assert_eq!(
            render_history("<processDateISO>: <version>", process_date()),
            format!("2024-09-04: {}", env!("CARGO_PKG_VERSION"))
        );
        assert_eq!(render_history("no placeholders", process_date()), "no placeholders");
    }
}
