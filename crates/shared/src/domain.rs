use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a draft field is typed on the wire and parsed from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Decimal,
    Flag,
}

/// Advisory bounds for a field. Only the input layer consults these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
}

impl FieldSpec {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Integer(v) => v as f64,
            FieldValue::Decimal(v) => v,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

trait FromFieldValue {
    fn from_field_value(value: FieldValue) -> Self;
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> Self {
        match value {
            FieldValue::Integer(v) => v,
            FieldValue::Decimal(v) => v.trunc() as i64,
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Self {
        value.as_f64()
    }
}

impl FromFieldValue for u8 {
    fn from_field_value(value: FieldValue) -> Self {
        u8::from(value.as_f64() != 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldEditError {
    #[error("{field} expects a number, got {raw:?}")]
    Unparseable { field: &'static str, raw: String },
    #[error("unknown property field {0:?}")]
    UnknownField(String),
}

macro_rules! property_fields {
    ($(
        $variant:ident => $name:ident: $ty:ty, $kind:ident, $label:literal,
        $min:literal ..= $max:literal, default $default:literal;
    )+) => {
        /// Every attribute the prediction endpoint accepts, in wire order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PropertyField {
            $($variant,)+
        }

        impl PropertyField {
            pub const ALL: &'static [PropertyField] = &[$(PropertyField::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $(PropertyField::$variant => stringify!($name),)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(PropertyField::$variant => $label,)+
                }
            }

            pub fn spec(self) -> FieldSpec {
                match self {
                    $(PropertyField::$variant => FieldSpec {
                        kind: FieldKind::$kind,
                        min: $min as f64,
                        max: $max as f64,
                    },)+
                }
            }
        }

        /// The in-progress set of property attributes. Serializes to the
        /// exact body the prediction endpoint expects.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct PropertyDraft {
            $(pub $name: $ty,)+
        }

        impl Default for PropertyDraft {
            fn default() -> Self {
                Self {
                    $($name: $default,)+
                }
            }
        }

        impl PropertyDraft {
            pub fn get(&self, field: PropertyField) -> FieldValue {
                match field {
                    $(PropertyField::$variant => FieldValue::from(self.$name),)+
                }
            }

            fn store(&mut self, field: PropertyField, value: FieldValue) {
                match field {
                    $(PropertyField::$variant => {
                        self.$name = <$ty as FromFieldValue>::from_field_value(value)
                    })+
                }
            }
        }
    };
}

property_fields! {
    SquareFeet => square_feet: i64, Integer, "Square feet", 100 ..= 10000, default 2500;
    Bedrooms => bedrooms: i64, Integer, "Bedrooms", 1 ..= 10, default 4;
    Bathrooms => bathrooms: i64, Integer, "Bathrooms", 1 ..= 10, default 3;
    AgeYears => age_years: i64, Integer, "Age (years)", 0 ..= 150, default 10;
    GarageSpaces => garage_spaces: i64, Integer, "Garage spaces", 0 ..= 5, default 2;
    LotSizeSqft => lot_size_sqft: i64, Integer, "Lot size (sq ft)", 500 ..= 50000, default 8000;
    Floors => floors: i64, Integer, "Floors", 1 ..= 5, default 2;
    CrimeRate => crime_rate: f64, Decimal, "Crime rate", 0.0 ..= 20.0, default 3.5;
    SchoolRating => school_rating: i64, Integer, "School rating", 1 ..= 10, default 8;
    DistanceToCityMiles => distance_to_city_miles: f64, Decimal, "Distance to city (miles)", 0.0 ..= 100.0, default 15.0;
    HasPool => has_pool: u8, Flag, "Pool", 0 ..= 1, default 1;
    HasFireplace => has_fireplace: u8, Flag, "Fireplace", 0 ..= 1, default 1;
    HasRenovated => has_renovated: u8, Flag, "Renovated", 0 ..= 1, default 1;
    NeighborhoodQuality => neighborhood_quality: i64, Integer, "Neighborhood quality", 1 ..= 5, default 4;
}

impl PropertyField {
    pub fn kind(self) -> FieldKind {
        self.spec().kind
    }

    /// Fields edited through a numeric text input (everything except the amenity flags).
    pub fn numeric() -> impl Iterator<Item = PropertyField> {
        Self::ALL
            .iter()
            .copied()
            .filter(|field| field.kind() != FieldKind::Flag)
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyField {
    type Err = FieldEditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name() == wanted)
            .ok_or_else(|| FieldEditError::UnknownField(wanted.to_string()))
    }
}

/// Boolean amenities. Stored as `0`/`1` so the outbound body needs no translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amenity {
    Pool,
    Fireplace,
    Renovated,
}

impl Amenity {
    pub const ALL: [Amenity; 3] = [Amenity::Pool, Amenity::Fireplace, Amenity::Renovated];

    pub fn field(self) -> PropertyField {
        match self {
            Amenity::Pool => PropertyField::HasPool,
            Amenity::Fireplace => PropertyField::HasFireplace,
            Amenity::Renovated => PropertyField::HasRenovated,
        }
    }

    pub fn label(self) -> &'static str {
        self.field().label()
    }
}

impl PropertyDraft {
    /// Coerces raw input text for one field and stores it, leaving every other
    /// field untouched. Ranges are not checked here.
    pub fn apply_raw(&mut self, field: PropertyField, raw: &str) -> Result<FieldValue, FieldEditError> {
        let trimmed = raw.trim();
        let parsed = match field.kind() {
            FieldKind::Decimal => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Decimal),
            FieldKind::Integer => parse_leading_integer(trimmed).map(FieldValue::Integer),
            FieldKind::Flag => match trimmed {
                "0" => Some(FieldValue::Integer(0)),
                "1" => Some(FieldValue::Integer(1)),
                _ => None,
            },
        };

        let value = parsed.ok_or_else(|| FieldEditError::Unparseable {
            field: field.name(),
            raw: trimmed.to_string(),
        })?;
        self.store(field, value);
        Ok(value)
    }

    pub fn set_amenity(&mut self, amenity: Amenity, checked: bool) {
        self.store(amenity.field(), FieldValue::Integer(i64::from(checked)));
    }

    pub fn has_amenity(&self, amenity: Amenity) -> bool {
        self.get(amenity.field()) == FieldValue::Integer(1)
    }
}

/// Integer parsing that accepts a leading signed run of digits and ignores the
/// rest, so `"12.7"` yields 12.
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let (sign_len, rest) = match raw.as_bytes().first().copied() {
        Some(b'-') | Some(b'+') => (1, &raw[1..]),
        _ => (0, raw),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    raw[..sign_len + digits].parse().ok()
}
