//! Search request validation and the seam to the external competitor search.
//!
//! [`validate`] is the only way to obtain a [`SearchRequest`]. Each field is run
//! through its own predicate chain (presence, type, bounds, content) and every
//! failing field contributes exactly one [`Violation`], so a client sees all of
//! its mistakes in a single response.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geo::{Competitor, GeoPoint};
use crate::map::MapViewModel;

pub const ADDRESS_MIN_CHARS: usize = 5;
pub const ADDRESS_MAX_CHARS: usize = 200;
pub const RADIUS_MIN_MILES: f64 = 1.0;
pub const RADIUS_MAX_MILES: f64 = 50.0;
pub const COMPETITOR_COUNT_MIN: u8 = 1;
pub const COMPETITOR_COUNT_MAX: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Address,
    Radius,
    CompetitorCount,
}

impl Field {
    /// Wire name of the field, as it appears in request bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Address => "address",
            Field::Radius => "radius",
            Field::CompetitorCount => "competitorCount",
        }
    }

    fn expected_type(self) -> &'static str {
        match self {
            Field::Address => "string",
            Field::Radius | Field::CompetitorCount => "number",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    TypeMismatch,
    TooShort,
    TooLong,
    NoLetters,
    NotInteger,
    OutOfRange,
}

/// A single field-level rule failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub kind: ViolationKind,
}

impl Violation {
    fn new(field: Field, kind: ViolationKind) -> Self {
        Self { field, kind }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = self.field;
        match self.kind {
            ViolationKind::Missing => write!(f, "{field} is required"),
            ViolationKind::TypeMismatch => {
                write!(f, "{field} must be a {}", field.expected_type())
            }
            ViolationKind::TooShort => write!(f, "{field} too short"),
            ViolationKind::TooLong => write!(f, "{field} too long"),
            ViolationKind::NoLetters => write!(f, "{field} must contain at least one letter"),
            ViolationKind::NotInteger => write!(f, "{field} must be a whole number"),
            ViolationKind::OutOfRange => write!(f, "{field} out of range"),
        }
    }
}

/// All violations found in one search request, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("search request has {} invalid field(s)", .violations.len())]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&Violation> {
        self.violations.iter().find(|v| v.field == field)
    }

    /// Messages keyed by wire field name, for response bodies.
    #[must_use]
    pub fn field_messages(&self) -> BTreeMap<&'static str, String> {
        self.violations
            .iter()
            .map(|v| (v.field.as_str(), v.to_string()))
            .collect()
    }
}

/// A validated search request. Only [`validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    address: String,
    radius: f64,
    competitor_count: u8,
}

impl SearchRequest {
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Search radius in miles.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn competitor_count(&self) -> u8 {
        self.competitor_count
    }
}

/// Validate raw client input into a [`SearchRequest`].
///
/// A non-object input is treated as every field missing. `null` counts as
/// missing. Numeric strings such as `"10"` are type mismatches.
///
/// # Errors
///
/// Returns [`ValidationError`] listing one violation for each invalid field.
pub fn validate(raw: &Value) -> Result<SearchRequest, ValidationError> {
    let address = check_address(raw.get(Field::Address.as_str()));
    let radius = check_radius(raw.get(Field::Radius.as_str()));
    let competitor_count = check_competitor_count(raw.get(Field::CompetitorCount.as_str()));

    match (address, radius, competitor_count) {
        (Ok(address), Ok(radius), Ok(competitor_count)) => Ok(SearchRequest {
            address,
            radius,
            competitor_count,
        }),
        (address, radius, competitor_count) => Err(ValidationError {
            violations: [address.err(), radius.err(), competitor_count.err()]
                .into_iter()
                .flatten()
                .collect(),
        }),
    }
}

fn present(field: Field, value: Option<&Value>) -> Result<&Value, Violation> {
    match value {
        None | Some(Value::Null) => Err(Violation::new(field, ViolationKind::Missing)),
        Some(value) => Ok(value),
    }
}

fn number(field: Field, value: &Value) -> Result<f64, Violation> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or(Violation::new(field, ViolationKind::TypeMismatch))
}

fn check_address(value: Option<&Value>) -> Result<String, Violation> {
    let field = Field::Address;
    let text = present(field, value)?
        .as_str()
        .ok_or(Violation::new(field, ViolationKind::TypeMismatch))?;

    let len = text.chars().count();
    if len < ADDRESS_MIN_CHARS {
        return Err(Violation::new(field, ViolationKind::TooShort));
    }
    if len > ADDRESS_MAX_CHARS {
        return Err(Violation::new(field, ViolationKind::TooLong));
    }
    if !text.chars().any(char::is_alphabetic) {
        return Err(Violation::new(field, ViolationKind::NoLetters));
    }
    Ok(text.to_string())
}

fn check_radius(value: Option<&Value>) -> Result<f64, Violation> {
    let field = Field::Radius;
    let radius = number(field, present(field, value)?)?;
    if !(RADIUS_MIN_MILES..=RADIUS_MAX_MILES).contains(&radius) {
        return Err(Violation::new(field, ViolationKind::OutOfRange));
    }
    Ok(radius)
}

fn check_competitor_count(value: Option<&Value>) -> Result<u8, Violation> {
    let field = Field::CompetitorCount;
    let count = number(field, present(field, value)?)?;
    if count.fract() != 0.0 {
        return Err(Violation::new(field, ViolationKind::NotInteger));
    }
    if !(f64::from(COMPETITOR_COUNT_MIN)..=f64::from(COMPETITOR_COUNT_MAX)).contains(&count) {
        return Err(Violation::new(field, ViolationKind::OutOfRange));
    }
    // Whole number within 1..=20, so the cast is exact.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(count as u8)
}

/// What the external geocoding/competitor collaborator hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub center: GeoPoint,
    pub competitors: Vec<Competitor>,
}

impl SearchResult {
    /// Build the map view for this result, keeping at most
    /// `request.competitor_count()` competitors in upstream order.
    #[must_use]
    pub fn into_view(mut self, request: &SearchRequest) -> MapViewModel {
        self.competitors
            .truncate(usize::from(request.competitor_count()));
        MapViewModel::new(self.center, self.competitors)
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("address could not be geocoded: {0}")]
    Geocoding(String),
    #[error("competitor lookup failed: {0}")]
    Upstream(String),
}

/// Geocoding plus competitor discovery, provided from outside this workspace.
#[async_trait]
pub trait CompetitorSearch: Send + Sync {
    /// Resolve the request's address to a center and return nearby competitors,
    /// already ranked.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn address_of_len(len: usize) -> String {
        let mut s = "a".repeat(len);
        s.replace_range(0..1, "1");
        s
    }

    #[test]
    fn accepts_typical_request_unchanged() {
        let raw = json!({"address": "123 Main St, Springfield", "radius": 10, "competitorCount": 5});
        let request = validate(&raw).expect("valid request");
        assert_eq!(request.address(), "123 Main St, Springfield");
        assert!((request.radius() - 10.0).abs() < f64::EPSILON);
        assert_eq!(request.competitor_count(), 5);
    }

    #[test]
    fn digits_only_address_fails_with_single_letter_violation() {
        let raw = json!({"address": "12345", "radius": 10, "competitorCount": 5});
        let err = validate(&raw).expect_err("no letters");
        assert_eq!(
            err.violations(),
            &[Violation::new(Field::Address, ViolationKind::NoLetters)]
        );
    }

    #[test]
    fn address_length_bounds_are_inclusive() {
        for len in [ADDRESS_MIN_CHARS, ADDRESS_MAX_CHARS] {
            let raw = json!({"address": address_of_len(len), "radius": 5, "competitorCount": 3});
            assert!(validate(&raw).is_ok(), "length {len} should be valid");
        }
    }

    #[test]
    fn address_outside_length_bounds_is_rejected() {
        let short = json!({"address": "ab c", "radius": 5, "competitorCount": 3});
        let err = validate(&short).expect_err("too short");
        assert_eq!(err.get(Field::Address).map(|v| v.kind), Some(ViolationKind::TooShort));

        let long = json!({"address": address_of_len(ADDRESS_MAX_CHARS + 1), "radius": 5, "competitorCount": 3});
        let err = validate(&long).expect_err("too long");
        assert_eq!(err.get(Field::Address).map(|v| v.kind), Some(ViolationKind::TooLong));
    }

    #[test]
    fn address_length_counts_characters_not_bytes() {
        // Five characters, ten bytes.
        let raw = json!({"address": "ÉÉÉÉÉ", "radius": 5, "competitorCount": 3});
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn radius_bounds_are_inclusive() {
        for radius in [1.0, 50.0, 2.5] {
            let raw = json!({"address": "10 Elm Road", "radius": radius, "competitorCount": 3});
            assert!(validate(&raw).is_ok(), "radius {radius} should be valid");
        }
    }

    #[test]
    fn radius_out_of_range_is_rejected() {
        for radius in [0.0, 0.99, 50.01, -3.0] {
            let raw = json!({"address": "10 Elm Road", "radius": radius, "competitorCount": 3});
            let err = validate(&raw).expect_err("out of range");
            assert_eq!(
                err.violations(),
                &[Violation::new(Field::Radius, ViolationKind::OutOfRange)],
                "radius {radius}"
            );
        }
    }

    #[test]
    fn non_numeric_radius_is_type_mismatch_not_range() {
        let raw = json!({"address": "10 Elm Road", "radius": "10", "competitorCount": 3});
        let err = validate(&raw).expect_err("string radius");
        let violation = err.get(Field::Radius).expect("radius violation");
        assert_eq!(violation.kind, ViolationKind::TypeMismatch);
        assert_eq!(violation.to_string(), "radius must be a number");
    }

    #[test]
    fn competitor_count_bounds_are_inclusive() {
        for count in [1, 20] {
            let raw = json!({"address": "10 Elm Road", "radius": 5, "competitorCount": count});
            assert!(validate(&raw).is_ok(), "count {count} should be valid");
        }
    }

    #[test]
    fn competitor_count_out_of_range_or_fractional_is_rejected() {
        let cases = [
            (json!(0), ViolationKind::OutOfRange),
            (json!(21), ViolationKind::OutOfRange),
            (json!(-1), ViolationKind::OutOfRange),
            (json!(2.5), ViolationKind::NotInteger),
            (json!(true), ViolationKind::TypeMismatch),
        ];
        for (count, kind) in cases {
            let raw = json!({"address": "10 Elm Road", "radius": 5, "competitorCount": count});
            let err = validate(&raw).expect_err("invalid count");
            assert_eq!(
                err.get(Field::CompetitorCount).map(|v| v.kind),
                Some(kind),
                "count {count}"
            );
        }
    }

    #[test]
    fn whole_float_competitor_count_is_accepted() {
        let raw = json!({"address": "10 Elm Road", "radius": 5, "competitorCount": 5.0});
        assert_eq!(validate(&raw).expect("valid").competitor_count(), 5);
    }

    #[test]
    fn reports_every_invalid_field_together() {
        let raw = json!({"address": "12", "radius": 99, "competitorCount": 0});
        let err = validate(&raw).expect_err("all invalid");
        let messages = err.field_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages["address"], "address too short");
        assert_eq!(messages["radius"], "radius out of range");
        assert_eq!(messages["competitorCount"], "competitorCount out of range");
    }

    #[test]
    fn non_object_input_reports_all_fields_missing() {
        let err = validate(&json!("123 Main St")).expect_err("not an object");
        assert_eq!(err.violations().len(), 3);
        assert!(err
            .violations()
            .iter()
            .all(|v| v.kind == ViolationKind::Missing));
    }

    #[test]
    fn null_field_counts_as_missing() {
        let raw = json!({"address": null, "radius": 5, "competitorCount": 3});
        let err = validate(&raw).expect_err("null address");
        assert_eq!(err.field_messages()["address"], "address is required");
    }

    #[test]
    fn validation_is_idempotent() {
        let raw = json!({"address": "742 Evergreen Terrace", "radius": 12.5, "competitorCount": 7});
        assert_eq!(validate(&raw).unwrap(), validate(&raw).unwrap());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let raw = json!({"address": "742 Evergreen Terrace", "radius": 3, "competitorCount": 4});
        let json = serde_json::to_value(validate(&raw).unwrap()).unwrap();
        assert_eq!(json["competitorCount"].as_u64(), Some(4));
        assert_eq!(json["address"], "742 Evergreen Terrace");
    }

    #[test]
    fn into_view_bounds_competitors_to_requested_count() {
        let raw = json!({"address": "742 Evergreen Terrace", "radius": 3, "competitorCount": 2});
        let request = validate(&raw).unwrap();
        let center = GeoPoint::new(40.0, -75.0).unwrap();
        let competitors = (0..4)
            .map(|i| Competitor {
                id: format!("c-{i}"),
                name: format!("Shop {i}"),
                location: center,
                rating: None,
                distance_miles: None,
            })
            .collect();

        let view = SearchResult {
            center,
            competitors,
        }
        .into_view(&request);

        let ids: Vec<_> = view.competitors.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c-0", "c-1"]);
        assert_eq!(view.your_location, center);
    }
}
