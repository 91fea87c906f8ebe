//! Relax per-waypoint query parameters down to their endpoints.
//!
//! A ground-truth request carries one value per waypoint for a handful of
//! backend options, e.g. `bearings=10,45;20,45;30,45`. Once the waypoints are
//! stripped only the start and destination remain, so each of those lists is
//! reduced to its first and last entry. Every other parameter passes through
//! untouched.
//!
//! The output is in decoded form. Parameters keep the order of their first
//! appearance, and repeated names are grouped behind that first occurrence.
//!
//! Input is decoded twice: once over the whole string, then once more per
//! name and value while splitting pairs. The few characters that would read
//! differently after that double decode (`%`, `&`, `+`, and `=` inside a
//! name) are written back escaped, so relaxed output always parses to the
//! parameters it was written from.

use std::fmt::{self, Write as _};

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::form_urlencoded;

/// Separator between per-waypoint values inside a single parameter.
pub const WAYPOINT_DELIMITER: char = ';';

/// Backend options whose value holds one entry per waypoint.
///
/// # Examples
///
/// ```
/// use relaxroute_core::PerWaypointParam;
///
/// assert_eq!(PerWaypointParam::from_name("bearings"), Some(PerWaypointParam::Bearings));
/// assert_eq!(PerWaypointParam::from_name("overview"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerWaypointParam {
    /// `snapping_include_closures`
    SnappingIncludeClosures,
    /// `snapping_include_static_closures`
    SnappingIncludeStaticClosures,
    /// `bearings`
    Bearings,
    /// `layers`
    Layers,
    /// `waypoint_names`
    WaypointNames,
    /// `waypoint_targets`
    WaypointTargets,
    /// `approaches`
    Approaches,
}

impl PerWaypointParam {
    /// Every per-waypoint parameter, in a fixed order.
    pub const ALL: [Self; 7] = [
        Self::SnappingIncludeClosures,
        Self::SnappingIncludeStaticClosures,
        Self::Bearings,
        Self::Layers,
        Self::WaypointNames,
        Self::WaypointTargets,
        Self::Approaches,
    ];

    /// Query parameter name as the backend spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SnappingIncludeClosures => "snapping_include_closures",
            Self::SnappingIncludeStaticClosures => "snapping_include_static_closures",
            Self::Bearings => "bearings",
            Self::Layers => "layers",
            Self::WaypointNames => "waypoint_names",
            Self::WaypointTargets => "waypoint_targets",
            Self::Approaches => "approaches",
        }
    }

    /// Look up a parameter by its query name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|param| param.as_str() == name)
    }
}

impl fmt::Display for PerWaypointParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when a query string cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryRelaxError {
    /// Percent-escapes decode to bytes that are not UTF-8.
    #[error("query string does not decode to UTF-8")]
    InvalidEncoding,
    /// A non-empty `&`-separated segment carries no `=`.
    #[error("query segment {segment:?} is not a name=value pair")]
    MissingSeparator {
        /// The offending segment, decoded.
        segment: String,
    },
}

/// Query parameters in first-appearance order, values grouped by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Decode a query string in either encoded or decoded form.
    ///
    /// The string is percent-decoded as a whole, then split into
    /// `&`-separated pairs whose names and values are form-decoded again, so
    /// `+` stands for a space. Empty segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`QueryRelaxError`] when the decoded bytes are not UTF-8 or a
    /// segment has no `=`.
    pub fn parse(query: &str) -> Result<Self, QueryRelaxError> {
        let decoded = percent_decode_str(query)
            .decode_utf8()
            .map_err(|_| QueryRelaxError::InvalidEncoding)?;
        if let Some(segment) = decoded
            .split('&')
            .find(|segment| !segment.is_empty() && !segment.contains('='))
        {
            return Err(QueryRelaxError::MissingSeparator {
                segment: segment.to_owned(),
            });
        }
        let mut params = Self::default();
        for (name, value) in form_urlencoded::parse(decoded.as_bytes()) {
            params.push(name.into_owned(), value.into_owned());
        }
        Ok(params)
    }

    fn push(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// All values recorded for `name`, in order of appearance.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Number of distinct parameter names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reduce the first value of every per-waypoint parameter to its
    /// endpoints.
    #[must_use]
    pub fn relaxed(mut self) -> Self {
        for (name, values) in &mut self.entries {
            if PerWaypointParam::from_name(name).is_none() {
                continue;
            }
            if let Some(first) = values.first_mut() {
                *first = endpoints(first);
            }
        }
        self
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for (name, values) in &self.entries {
            for value in values {
                f.write_str(separator)?;
                write_component(f, name, true)?;
                f.write_char('=')?;
                write_component(f, value, false)?;
                separator = "&";
            }
        }
        Ok(())
    }
}

/// Write `text` decoded, escaping what a second parse would misread.
///
/// Escapes are doubled because [`QueryParams::parse`] decodes twice.
fn write_component(f: &mut fmt::Formatter<'_>, text: &str, is_name: bool) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            ' ' => f.write_char('+')?,
            '%' => f.write_str("%2525")?,
            '&' => f.write_str("%2526")?,
            '+' => f.write_str("%252B")?,
            '=' if is_name => f.write_str("%253D")?,
            other => f.write_char(other)?,
        }
    }
    Ok(())
}

/// Keep only the first and last entries of a `;`-delimited list.
///
/// A list with a single entry is returned unchanged.
fn endpoints(values: &str) -> String {
    let mut parts = values.split(WAYPOINT_DELIMITER);
    let first = parts.next().unwrap_or_default();
    match parts.next_back() {
        Some(last) => format!("{first}{WAYPOINT_DELIMITER}{last}"),
        None => first.to_owned(),
    }
}

/// Transform a ground-truth query string into its relaxed form.
///
/// An empty string is returned unchanged.
///
/// # Examples
///
/// ```
/// use relaxroute_core::relax_query;
///
/// let relaxed = relax_query("bearings=10;20;30&layers=0")?;
/// assert_eq!(relaxed, "bearings=10;30&layers=0");
/// # Ok::<(), relaxroute_core::QueryRelaxError>(())
/// ```
///
/// # Errors
///
/// Returns [`QueryRelaxError`] when the query string cannot be decoded.
pub fn relax_query(query: &str) -> Result<String, QueryRelaxError> {
    if query.is_empty() {
        return Ok(String::new());
    }
    Ok(QueryParams::parse(query)?.relaxed().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a;b;c;d", "a;d")]
    #[case("a", "a")]
    #[case("a;b", "a;b")]
    #[case("", "")]
    #[case(";", ";")]
    #[case("10,45;;30,90", "10,45;30,90")]
    fn endpoints_keep_first_and_last(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(endpoints(input), expected);
    }

    #[rstest]
    #[case("bearings=10;20;30&layers=0", "bearings=10;30&layers=0")]
    #[case(
        "approaches=curb;unrestricted;curb&alternatives=true",
        "approaches=curb;curb&alternatives=true"
    )]
    #[case(
        "waypoint_names=Home;Shop;Work&waypoint_targets=1,2;3,4;5,6",
        "waypoint_names=Home;Work&waypoint_targets=1,2;5,6"
    )]
    #[case(
        "snapping_include_closures=true;false;true&snapping_include_static_closures=false;true;true",
        "snapping_include_closures=true;true&snapping_include_static_closures=false;true"
    )]
    fn relaxes_per_waypoint_parameters(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(relax_query(input).expect("decodable query"), expected);
    }

    #[rstest]
    fn empty_query_is_unchanged() {
        assert_eq!(relax_query("").expect("empty query"), "");
    }

    #[rstest]
    fn encoded_input_yields_decoded_output() {
        let relaxed = relax_query("bearings=10%2C45%3B20%2C45%3B30%2C45&overview=full")
            .expect("encoded query");
        assert_eq!(relaxed, "bearings=10,45;30,45&overview=full");
    }

    #[rstest]
    fn unknown_parameters_pass_through_in_order() {
        let query = "overview=full&geometries=polyline6&steps=true";
        assert_eq!(relax_query(query).expect("plain query"), query);
    }

    #[rstest]
    fn only_the_first_occurrence_is_relaxed() {
        let relaxed = relax_query("bearings=1;2;3&layers=0&bearings=4;5;6").expect("query");
        assert_eq!(relaxed, "bearings=1;3&bearings=4;5;6&layers=0");
    }

    #[rstest]
    fn spaces_are_emitted_as_plus() {
        let relaxed = relax_query("waypoint_names=Main%20St;Side;High+St").expect("query");
        assert_eq!(relaxed, "waypoint_names=Main+St;High+St");
    }

    #[rstest]
    #[case("layers=%2541&bearings=1;2;3", "layers=A&bearings=1;3")]
    #[case("waypoint_names=A%2526B;C;D", "waypoint_names=A%2526B;D")]
    #[case("exclude=100%2525&layers=0", "exclude=100%2525&layers=0")]
    #[case("waypoint_names=A%252BB;C;D", "waypoint_names=A%252BB;D")]
    fn escapes_survive_a_second_pass(#[case] input: &str, #[case] expected: &str) {
        let once = relax_query(input).expect("query");
        assert_eq!(once, expected);
        assert_eq!(relax_query(&once).expect("relaxed query"), once);
    }

    #[rstest]
    fn nested_escapes_decode_to_their_values() {
        let params = QueryParams::parse("waypoint_names=A%2526B;D&x%253Dy=1").expect("query");
        assert_eq!(params.get("waypoint_names"), Some(["A&B;D".to_owned()].as_slice()));
        assert_eq!(params.get("x=y"), Some(["1".to_owned()].as_slice()));
        let reparsed = QueryParams::parse(&params.to_string()).expect("emitted query");
        assert_eq!(reparsed, params);
    }

    #[rstest]
    fn blank_values_are_preserved() {
        assert_eq!(relax_query("exclude=&layers=0").expect("query"), "exclude=&layers=0");
    }

    #[rstest]
    fn segment_without_separator_is_rejected() {
        let err = relax_query("bearings=1;2&steps").expect_err("malformed query");
        assert_eq!(
            err,
            QueryRelaxError::MissingSeparator {
                segment: "steps".to_owned(),
            }
        );
    }

    #[rstest]
    fn invalid_utf8_is_rejected() {
        let err = relax_query("waypoint_names=%FF%FE").expect_err("invalid utf-8");
        assert_eq!(err, QueryRelaxError::InvalidEncoding);
    }

    #[rstest]
    fn params_expose_grouped_values() {
        let params = QueryParams::parse("a=1&b=2&a=3").expect("query");
        assert_eq!(params.len(), 2);
        assert_eq!(
            params.get("a"),
            Some(["1".to_owned(), "3".to_owned()].as_slice())
        );
        assert!(params.get("c").is_none());
    }

    #[rstest]
    fn every_parameter_round_trips_through_its_name() {
        for param in PerWaypointParam::ALL {
            assert_eq!(PerWaypointParam::from_name(param.as_str()), Some(param));
        }
    }
}
