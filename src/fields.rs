//! Dynamic field access by name
//!
//! Sorting, filtering and header capture assignment are all driven by field
//! names that come from configuration (`"Type"`, `"Hash.Short"`,
//! `"Author.Time"`). Instead of runtime reflection every record type exposes
//! an explicit accessor table through the [`Fields`] trait, and records that
//! can be populated from regex captures implement [`AssignFields`].
//!
//! Name lookup is case-insensitive and ignores underscores, so `"RawTitle"`,
//! `"raw_title"` and `"rawtitle"` all resolve to the same field.

use crate::error::{ChangelogError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// A value read from a record by name.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Int(i64),
    Time(DateTime<Utc>),
    /// A nested record that further path segments can descend into
    Record(&'a dyn Fields),
}

impl<'a> FieldValue<'a> {
    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "string",
            FieldValue::Int(_) => "int",
            FieldValue::Time(_) => "time",
            FieldValue::Record(_) => "record",
        }
    }

    /// The value as a string slice, if it is one
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::Str(s) => Some(*s),
            _ => None,
        }
    }
}

/// Read access to a record's fields by normalized name.
///
/// Implementors receive names already passed through [`normalize_field_name`].
pub trait Fields: fmt::Debug {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Write access used to materialize regex captures into a record.
pub trait AssignFields {
    /// Set the field called `name` from `value`.
    ///
    /// Returns `false` when the record has no such field and the value was
    /// dropped.
    fn assign_field(&mut self, name: &str, value: String) -> bool;
}

/// Comparison operators supported by [`compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    Greater,
}

/// Lowercase a field name and strip underscores and surrounding whitespace.
pub fn normalize_field_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve a dot-separated path such as `"Author.Name"` against a record.
///
/// Returns `None` when the path is empty, when any segment is unknown, or
/// when an intermediate segment is not a nested record.
pub fn dot_get<'a, T: Fields + ?Sized>(record: &'a T, path: &str) -> Option<FieldValue<'a>> {
    let mut segments = path.split('.');

    let first = normalize_field_name(segments.next()?);
    if first.is_empty() {
        return None;
    }

    let mut value = record.field(&first)?;

    for segment in segments {
        let key = normalize_field_name(segment);
        if key.is_empty() {
            return None;
        }

        value = match value {
            FieldValue::Record(inner) => inner.field(&key)?,
            _ => return None,
        };
    }

    Some(value)
}

/// Compare two values of the same type.
///
/// Only strings, integers and timestamps are comparable. For timestamps
/// `Less` also holds for equal instants.
pub fn compare(a: &FieldValue<'_>, op: CompareOp, b: &FieldValue<'_>) -> Result<bool> {
    match (a, b) {
        (FieldValue::Str(a), FieldValue::Str(b)) => Ok(match op {
            CompareOp::Less => a < b,
            CompareOp::Greater => a > b,
        }),
        (FieldValue::Int(a), FieldValue::Int(b)) => Ok(match op {
            CompareOp::Less => a < b,
            CompareOp::Greater => a > b,
        }),
        (FieldValue::Time(a), FieldValue::Time(b)) => Ok(match op {
            CompareOp::Less => a <= b,
            CompareOp::Greater => a > b,
        }),
        _ => Err(ChangelogError::compare(format!(
            "\"{}\" and \"{}\" can not be compared",
            a.kind(),
            b.kind()
        ))),
    }
}

/// Assign captured values to the fields named in `names`, pairwise.
///
/// Names the record does not know are skipped.
pub fn assign_by_name<T: AssignFields + ?Sized>(record: &mut T, names: &[String], values: &[String]) {
    for (name, value) in names.iter().zip(values) {
        if !record.assign_field(name, value.clone()) {
            tracing::debug!(field = %name, "capture has no matching field, skipped");
        }
    }
}

/// Total order derived from [compare]; equal values compare `Equal`.
fn ordering(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Result<Ordering> {
    if compare(a, CompareOp::Greater, b)? {
        Ok(Ordering::Greater)
    } else if compare(b, CompareOp::Greater, a)? {
        Ok(Ordering::Less)
    } else {
        Ok(Ordering::Equal)
    }
}

/// Stable ascending sort of `items` by the field at `path`.
///
/// If any element fails to resolve the field, or the resolved values are not
/// all of one comparable type, the slice is left in its current order.
pub fn sort_by_field<T: Fields>(items: &mut Vec<T>, path: &str) {
    let values: Option<Vec<FieldValue<'_>>> = items.iter().map(|item| dot_get(item, path)).collect();

    let Some(values) = values else {
        tracing::debug!(field = %path, "sort field did not resolve, keeping order");
        return;
    };

    if values.windows(2).any(|pair| ordering(&pair[0], &pair[1]).is_err()) {
        tracing::debug!(field = %path, "sort field has mixed types, keeping order");
        return;
    }

    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| ordering(&values[a], &values[b]).unwrap_or(Ordering::Equal));

    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(indices.into_iter().filter_map(|i| slots[i].take()));
}

/// Uppercase the first letter of every word.
///
/// A word starts after any character that is not a letter, digit or
/// underscore, so `"bug fixes"` becomes `"Bug Fixes"` and `"ci-build"`
/// becomes `"Ci-Build"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for c in input.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Inner {
        label: String,
    }

    impl Fields for Inner {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "label" => Some(FieldValue::Str(&self.label)),
                _ => None,
            }
        }
    }

    #[derive(Debug, Default)]
    struct Record {
        name: String,
        count: i64,
        time: DateTime<Utc>,
        inner: Inner,
    }

    impl Fields for Record {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::Str(&self.name)),
                "count" => Some(FieldValue::Int(self.count)),
                "time" => Some(FieldValue::Time(self.time)),
                "inner" => Some(FieldValue::Record(&self.inner)),
                _ => None,
            }
        }
    }

    impl AssignFields for Record {
        fn assign_field(&mut self, name: &str, value: String) -> bool {
            match normalize_field_name(name).as_str() {
                "name" => {
                    self.name = value;
                    true
                }
                _ => false,
            }
        }
    }

    fn record(name: &str, count: i64) -> Record {
        Record {
            name: name.to_string(),
            count,
            time: DateTime::<Utc>::from_timestamp(count * 100, 0).unwrap(),
            inner: Inner {
                label: format!("{}-label", name),
            },
        }
    }

    #[test]
    fn test_dot_get_is_case_insensitive() {
        let r = record("alpha", 1);
        assert_eq!(dot_get(&r, "Name").and_then(|v| v.as_str()), Some("alpha"));
        assert_eq!(dot_get(&r, "NAME").and_then(|v| v.as_str()), Some("alpha"));
    }

    #[test]
    fn test_dot_get_nested_path() {
        let r = record("alpha", 1);
        assert_eq!(
            dot_get(&r, "Inner.Label").and_then(|v| v.as_str()),
            Some("alpha-label")
        );
    }

    #[test]
    fn test_dot_get_missing_segments() {
        let r = record("alpha", 1);
        assert!(dot_get(&r, "").is_none());
        assert!(dot_get(&r, "Unknown").is_none());
        assert!(dot_get(&r, "Inner.Unknown").is_none());
        assert!(dot_get(&r, "Name.Label").is_none());
        assert!(dot_get(&r, "Inner.").is_none());
    }

    #[test]
    fn test_compare_same_types() {
        assert!(compare(&FieldValue::Str("a"), CompareOp::Less, &FieldValue::Str("b")).unwrap());
        assert!(compare(&FieldValue::Int(3), CompareOp::Greater, &FieldValue::Int(2)).unwrap());

        let earlier = DateTime::<Utc>::from_timestamp(100, 0).unwrap();
        let later = DateTime::<Utc>::from_timestamp(200, 0).unwrap();
        assert!(compare(&FieldValue::Time(earlier), CompareOp::Less, &FieldValue::Time(later)).unwrap());
        assert!(compare(&FieldValue::Time(earlier), CompareOp::Less, &FieldValue::Time(earlier)).unwrap());
        assert!(!compare(&FieldValue::Time(earlier), CompareOp::Greater, &FieldValue::Time(later)).unwrap());
    }

    #[test]
    fn test_compare_mismatched_types_is_error() {
        let result = compare(&FieldValue::Str("1"), CompareOp::Less, &FieldValue::Int(1));
        assert!(matches!(result, Err(ChangelogError::Compare(_))));
    }

    #[test]
    fn test_assign_by_name_skips_unknown() {
        let mut r = Record::default();
        assign_by_name(
            &mut r,
            &["Name".to_string(), "Missing".to_string()],
            &["beta".to_string(), "ignored".to_string()],
        );
        assert_eq!(r.name, "beta");
    }

    #[test]
    fn test_sort_by_field_ascending_and_stable() {
        let mut items = vec![record("c", 2), record("a", 1), record("b", 2)];
        sort_by_field(&mut items, "Count");
        let names: Vec<_> = items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);

        sort_by_field(&mut items, "name");
        let names: Vec<_> = items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_time_keeps_equal_instants_in_order() {
        let mut items = vec![record("c", 2), record("a", 1), record("b", 2), record("d", 1)];
        sort_by_field(&mut items, "Time");
        let names: Vec<_> = items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_sort_by_unresolvable_field_keeps_order() {
        let mut items = vec![record("c", 2), record("a", 1)];
        sort_by_field(&mut items, "Nope");
        let names: Vec<_> = items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);

        sort_by_field(&mut items, "Inner");
        let names: Vec<_> = items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("fix"), "Fix");
        assert_eq!(title_case("bug fixes"), "Bug Fixes");
        assert_eq!(title_case("ci-build"), "Ci-Build");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_normalize_field_name() {
        assert_eq!(normalize_field_name("RawTitle"), "rawtitle");
        assert_eq!(normalize_field_name(" raw_title "), "rawtitle");
    }
}
