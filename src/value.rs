//! Value coercion: turning raw text into typed field values.
//!
//! Every leaf field of a configuration structure implements [`FieldValue`].
//! Scalars parse directly; `Vec<T>` and maps split the text on the field's
//! separator and coerce each element with the same rules, recursively.
//!
//! Types with their own textual format implement [`Setter`] and opt in with
//! [`setter_field!`](crate::setter_field), which routes coercion entirely
//! through `Setter::set_value`.

use crate::error::{BoxError, CoerceError};
use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::path::PathBuf;

/// Default separator for sequences and maps.
pub const DEFAULT_SEPARATOR: &str = ",";

/// A settable leaf field.
pub trait FieldValue {
    /// Replace the value with the one parsed from `raw`.
    ///
    /// `separator` splits composite values (sequences and maps).
    fn set_text(&mut self, raw: &str, separator: &str) -> Result<(), CoerceError>;

    /// Whether the value equals the type's empty state.
    fn is_zero(&self) -> bool;

    /// Textual form of the current value, in the format `set_text` accepts.
    fn to_text(&self, separator: &str) -> String;
}

/// Custom value setter.
///
/// ```
/// use tierconf::{Setter, setter_field};
/// use std::fmt;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(String);
///
/// impl Setter for Level {
///     fn set_value(&mut self, raw: &str) -> Result<(), tierconf::BoxError> {
///         if raw.is_empty() {
///             return Err("level can't be empty".into());
///         }
///         self.0 = raw.to_uppercase();
///         Ok(())
///     }
/// }
///
/// impl fmt::Display for Level {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(&self.0)
///     }
/// }
///
/// setter_field!(Level);
/// ```
pub trait Setter {
    fn set_value(&mut self, raw: &str) -> Result<(), BoxError>;
}

/// Implement [`FieldValue`] for a type through its [`Setter`] impl.
///
/// The type must also implement `Default`, `PartialEq` and `Display`:
/// zero means equal to `Default::default()`, and `Display` renders the value.
#[macro_export]
macro_rules! setter_field {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::FieldValue for $ty {
                fn set_text(
                    &mut self,
                    raw: &str,
                    _separator: &str,
                ) -> ::std::result::Result<(), $crate::CoerceError> {
                    $crate::Setter::set_value(self, raw).map_err(|source| {
                        $crate::CoerceError::Setter {
                            value: raw.to_string(),
                            type_name: ::std::any::type_name::<$ty>(),
                            source,
                        }
                    })
                }

                fn is_zero(&self) -> bool {
                    *self == <$ty as ::std::default::Default>::default()
                }

                fn to_text(&self, _separator: &str) -> ::std::string::String {
                    ::std::string::ToString::to_string(self)
                }
            }
        )+
    };
}

impl FieldValue for String {
    fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
        raw.clone_into(self);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn to_text(&self, _separator: &str) -> String {
        self.clone()
    }
}

impl FieldValue for PathBuf {
    fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
        *self = PathBuf::from(raw);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }

    fn to_text(&self, _separator: &str) -> String {
        self.to_string_lossy().into_owned()
    }
}

impl FieldValue for bool {
    fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
        *self = parse_bool(raw)?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn to_text(&self, _separator: &str) -> String {
        self.to_string()
    }
}

impl FieldValue for char {
    fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                *self = c;
                Ok(())
            }
            _ => Err(CoerceError::Char {
                value: raw.to_string(),
            }),
        }
    }

    fn is_zero(&self) -> bool {
        *self == '\0'
    }

    fn to_text(&self, _separator: &str) -> String {
        self.to_string()
    }
}

/// Parse a boolean using the `1/t/T/TRUE/true/True` lexicon and its negations.
pub fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::Bool {
            value: raw.to_string(),
        }),
    }
}

/// Split an integer literal into its radix and a signed digit string.
///
/// Accepts `0x`, `0o` and `0b` prefixes and a bare leading `0` for octal.
/// Underscores may separate digits, or follow a base prefix.
fn int_literal(raw: &str) -> (u32, String) {
    let (sign, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => ("-", &raw[1..]),
        Some(b'+') => ("", &raw[1..]),
        _ => ("", raw),
    };

    let lower = unsigned.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits, prefixed) = match lower.as_deref() {
        Some("0x") => (16, &unsigned[2..], true),
        Some("0o") => (8, &unsigned[2..], true),
        Some("0b") => (2, &unsigned[2..], true),
        _ if unsigned.len() > 1 && unsigned.starts_with('0') => (8, &unsigned[1..], true),
        _ => (10, unsigned, false),
    };

    // A second sign must reach from_str_radix unchanged so that it fails
    if digits.starts_with(['+', '-']) {
        return (radix, raw.to_string());
    }

    let digits = match strip_underscores(digits, prefixed) {
        Some(digits) => digits,
        None => digits.to_string(),
    };
    (radix, format!("{sign}{digits}"))
}

fn strip_underscores(digits: &str, prefixed: bool) -> Option<String> {
    if !digits.contains('_') {
        return Some(digits.to_string());
    }
    let valid = (prefixed || !digits.starts_with('_'))
        && !digits.ends_with('_')
        && !digits.contains("__");
    valid.then(|| digits.replace('_', ""))
}

fn parse_signed(raw: &str, type_name: &'static str) -> Result<i128, CoerceError> {
    let (radix, literal) = int_literal(raw);
    i128::from_str_radix(&literal, radix).map_err(|source| CoerceError::Int {
        value: raw.to_string(),
        type_name,
        source,
    })
}

fn parse_unsigned(raw: &str, type_name: &'static str) -> Result<u128, CoerceError> {
    let (radix, literal) = int_literal(raw);
    u128::from_str_radix(&literal, radix).map_err(|source| CoerceError::Int {
        value: raw.to_string(),
        type_name,
        source,
    })
}

macro_rules! int_field {
    ($parse:ident => $($ty:ty),+) => {
        $(
            impl FieldValue for $ty {
                fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
                    let wide = $parse(raw, type_name::<$ty>())?;
                    *self = <$ty>::try_from(wide).map_err(|source| CoerceError::IntRange {
                        value: raw.to_string(),
                        type_name: type_name::<$ty>(),
                        source,
                    })?;
                    Ok(())
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn to_text(&self, _separator: &str) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

int_field!(parse_signed => i8, i16, i32, i64, isize);
int_field!(parse_unsigned => u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
        *self = raw.parse().map_err(|source| CoerceError::Float {
            value: raw.to_string(),
            type_name: "f64",
            source,
        })?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.to_bits() == 0
    }

    fn to_text(&self, _separator: &str) -> String {
        self.to_string()
    }
}

impl FieldValue for f32 {
    fn set_text(&mut self, raw: &str, _separator: &str) -> Result<(), CoerceError> {
        let wide: f64 = raw.parse().map_err(|source| CoerceError::Float {
            value: raw.to_string(),
            type_name: "f32",
            source,
        })?;
        let narrow = wide as f32;
        if wide.is_finite() && narrow.is_infinite() {
            return Err(CoerceError::FloatRange {
                value: raw.to_string(),
                type_name: "f32",
            });
        }
        *self = narrow;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.to_bits() == 0
    }

    fn to_text(&self, _separator: &str) -> String {
        self.to_string()
    }
}

impl<T: FieldValue + Default> FieldValue for Option<T> {
    fn set_text(&mut self, raw: &str, separator: &str) -> Result<(), CoerceError> {
        let mut value = T::default();
        value.set_text(raw, separator)?;
        *self = Some(value);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn to_text(&self, separator: &str) -> String {
        self.as_ref()
            .map(|value| value.to_text(separator))
            .unwrap_or_default()
    }
}

/// Element type of a `Vec<T>` field.
///
/// The default methods split on the separator; `u8` overrides them so that
/// `Vec<u8>` holds the raw bytes of the text.
pub trait SequenceElement: FieldValue + Default + Sized {
    fn parse_sequence(raw: &str, separator: &str) -> Result<Vec<Self>, CoerceError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        raw.split(separator)
            .map(|item| {
                let mut value = Self::default();
                value.set_text(item, separator)?;
                Ok(value)
            })
            .collect()
    }

    fn render_sequence(items: &[Self], separator: &str) -> String {
        items
            .iter()
            .map(|item| item.to_text(separator))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl SequenceElement for u8 {
    fn parse_sequence(raw: &str, _separator: &str) -> Result<Vec<Self>, CoerceError> {
        Ok(raw.as_bytes().to_vec())
    }

    fn render_sequence(items: &[Self], _separator: &str) -> String {
        String::from_utf8_lossy(items).into_owned()
    }
}

impl SequenceElement for i8 {}
impl SequenceElement for i16 {}
impl SequenceElement for i32 {}
impl SequenceElement for i64 {}
impl SequenceElement for isize {}
impl SequenceElement for u16 {}
impl SequenceElement for u32 {}
impl SequenceElement for u64 {}
impl SequenceElement for usize {}
impl SequenceElement for f32 {}
impl SequenceElement for f64 {}
impl SequenceElement for bool {}
impl SequenceElement for char {}
impl SequenceElement for String {}
impl SequenceElement for PathBuf {}

impl<T: SequenceElement> FieldValue for Vec<T> {
    fn set_text(&mut self, raw: &str, separator: &str) -> Result<(), CoerceError> {
        *self = T::parse_sequence(raw, separator)?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn to_text(&self, separator: &str) -> String {
        T::render_sequence(self, separator)
    }
}

/// Split `raw` into coerced key/value pairs.
///
/// Each item is split on its first `:` only, so values may contain colons.
fn parse_pairs<K, V>(raw: &str, separator: &str) -> Result<Vec<(K, V)>, CoerceError>
where
    K: FieldValue + Default,
    V: FieldValue + Default,
{
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(separator)
        .map(|pair| {
            let (raw_key, raw_value) = pair.split_once(':').ok_or_else(|| CoerceError::MapItem {
                pair: pair.to_string(),
            })?;
            let mut key = K::default();
            key.set_text(raw_key, separator)?;
            let mut value = V::default();
            value.set_text(raw_value, separator)?;
            Ok((key, value))
        })
        .collect()
}

fn render_pairs<'a, K, V>(pairs: impl Iterator<Item = (&'a K, &'a V)>, separator: &str) -> String
where
    K: FieldValue + 'a,
    V: FieldValue + 'a,
{
    pairs
        .map(|(key, value)| format!("{}:{}", key.to_text(separator), value.to_text(separator)))
        .collect::<Vec<_>>()
        .join(separator)
}

impl<K, V, S> FieldValue for HashMap<K, V, S>
where
    K: FieldValue + Default + Eq + Hash,
    V: FieldValue + Default,
    S: BuildHasher + Default,
{
    fn set_text(&mut self, raw: &str, separator: &str) -> Result<(), CoerceError> {
        *self = parse_pairs(raw, separator)?.into_iter().collect();
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn to_text(&self, separator: &str) -> String {
        render_pairs(self.iter(), separator)
    }
}

impl<K, V> FieldValue for BTreeMap<K, V>
where
    K: FieldValue + Default + Ord,
    V: FieldValue + Default,
{
    fn set_text(&mut self, raw: &str, separator: &str) -> Result<(), CoerceError> {
        *self = parse_pairs(raw, separator)?.into_iter().collect();
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn to_text(&self, separator: &str) -> String {
        render_pairs(self.iter(), separator)
    }
}
