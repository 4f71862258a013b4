//! Validators and the factories that build them.
//!
//! A validator inspects a value on behalf of a named attribute and fails with
//! a typed [`DescriptorError`] if the value is unacceptable. Validators are
//! stored in an ordered list on a descriptor and run in that order.

use crate::core::error::{DescriptorError, DescriptorResult};
use crate::core::types::{TypeSpec, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Boolean predicate used by [`value_check`].
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Full validation function used by [`Validator::custom`].
///
/// Receives the attribute name and the value.
pub type CheckFn = Arc<dyn Fn(&str, &Value) -> DescriptorResult<()> + Send + Sync>;

/// A check applied to every value written through a descriptor.
#[derive(Clone)]
pub enum Validator {
    /// Value must be a member of the type
    TypeCheck(TypeSpec),
    /// Real number > 0
    Positive,
    /// Real number >= 0
    NonNegative,
    /// Value must be truthy
    NonEmpty,
    /// Real number within [min, max]
    Range {
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
    /// Real number >= min
    MinValue(f64),
    /// Real number <= max
    MaxValue(f64),
    /// String/array/map must have at least this many members
    MinLength(usize),
    /// String/array/map must have at most this many members
    MaxLength(usize),
    /// Value must equal one of the options
    OneOf(Vec<Value>),
    /// String must match the regular expression
    Pattern(Regex),
    /// Predicate with a human-readable description of what it requires
    Predicate {
        /// Completes "must be ..." in the error message
        description: String,
        /// Returns true for acceptable values
        predicate: Predicate,
    },
    /// Arbitrary check producing its own error
    Custom {
        /// Name used as the validator's description
        name: String,
        /// The check itself
        check: CheckFn,
    },
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::TypeCheck(spec) => f.debug_tuple("TypeCheck").field(spec).finish(),
            Validator::Positive => write!(f, "Positive"),
            Validator::NonNegative => write!(f, "NonNegative"),
            Validator::NonEmpty => write!(f, "NonEmpty"),
            Validator::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Validator::MinValue(v) => f.debug_tuple("MinValue").field(v).finish(),
            Validator::MaxValue(v) => f.debug_tuple("MaxValue").field(v).finish(),
            Validator::MinLength(v) => f.debug_tuple("MinLength").field(v).finish(),
            Validator::MaxLength(v) => f.debug_tuple("MaxLength").field(v).finish(),
            Validator::OneOf(v) => f.debug_tuple("OneOf").field(v).finish(),
            Validator::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Validator::Predicate { description, .. } => f
                .debug_struct("Predicate")
                .field("description", description)
                .field("predicate", &"<closure>")
                .finish(),
            Validator::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("check", &"<closure>")
                .finish(),
        }
    }
}

// ============================================================================
// Factories
// ============================================================================

/// Build a validator that fails with a type mismatch unless the value is a
/// member of `type_spec`.
///
/// The spec is checked eagerly; an unbound placeholder is a configuration
/// error here rather than on first use.
pub fn type_check(type_spec: TypeSpec) -> DescriptorResult<Validator> {
    type_spec.ensure_checkable()?;
    Ok(Validator::TypeCheck(type_spec))
}

/// Build a validator that fails with `"<attribute> must be <description>"`
/// whenever `predicate` returns false.
pub fn value_check<F>(predicate: F, description: impl Into<String>) -> Validator
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Validator::Predicate {
        description: description.into(),
        predicate: Arc::new(predicate),
    }
}

/// Value must be an integer.
pub fn is_integer() -> Validator {
    Validator::TypeCheck(TypeSpec::Integer)
}

/// Value must be a real number (integer or float).
pub fn is_real() -> Validator {
    Validator::TypeCheck(TypeSpec::Real)
}

/// Value must be a string.
pub fn is_string() -> Validator {
    Validator::TypeCheck(TypeSpec::String)
}

/// Value must be a boolean.
pub fn is_bool() -> Validator {
    Validator::TypeCheck(TypeSpec::Boolean)
}

/// Value must be a real number greater than zero.
pub fn is_positive() -> Validator {
    Validator::Positive
}

/// Value must be a real number greater than or equal to zero.
pub fn is_non_negative() -> Validator {
    Validator::NonNegative
}

/// Value must be truthy; meant to be paired with a container or string type.
pub fn is_non_empty() -> Validator {
    Validator::NonEmpty
}

// ============================================================================
// Validator Construction
// ============================================================================

impl Validator {
    /// Real number within `[min, max]`.
    pub fn range(min: f64, max: f64) -> Self {
        Validator::Range { min, max }
    }

    /// Real number no smaller than `min`.
    pub fn min_value(min: f64) -> Self {
        Validator::MinValue(min)
    }

    /// Real number no larger than `max`.
    pub fn max_value(max: f64) -> Self {
        Validator::MaxValue(max)
    }

    /// At least `min` members.
    pub fn min_length(min: usize) -> Self {
        Validator::MinLength(min)
    }

    /// At most `max` members.
    pub fn max_length(max: usize) -> Self {
        Validator::MaxLength(max)
    }

    /// Equal to one of `options`.
    pub fn one_of(options: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Validator::OneOf(options.into_iter().map(Into::into).collect())
    }

    /// String matching the regular expression `pattern`.
    ///
    /// An invalid expression is a configuration error.
    pub fn pattern(pattern: &str) -> DescriptorResult<Self> {
        Regex::new(pattern)
            .map(Validator::Pattern)
            .map_err(|e| DescriptorError::Configuration {
                type_spec: format!("pattern /{}/", pattern),
                reason: e.to_string(),
            })
    }

    /// Verify that this validator can run at all.
    ///
    /// Only type checks carry a spec that may be unusable; building one
    /// through the variant bypasses [`type_check`], so descriptors call this
    /// on every validator they are given.
    pub fn ensure_checkable(&self) -> DescriptorResult<()> {
        match self {
            Validator::TypeCheck(spec) => spec.ensure_checkable(),
            _ => Ok(()),
        }
    }

    /// Arbitrary check with full control over the error it returns.
    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, &Value) -> DescriptorResult<()> + Send + Sync + 'static,
    {
        Validator::Custom {
            name: name.into(),
            check: Arc::new(check),
        }
    }
}

// ============================================================================
// Validator Checks
// ============================================================================

fn sized() -> TypeSpec {
    TypeSpec::union([TypeSpec::String, TypeSpec::array(), TypeSpec::map()])
}

/// 2^63, the smallest float above every `i64`.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Compare a real-number value against a float bound.
///
/// Integers are compared exactly rather than widened to `f64`, which would
/// round values beyond 2^53. `None` means the pair is unordered (NaN).
fn compare_real(
    attribute: &str,
    value: &Value,
    bound: f64,
) -> DescriptorResult<Option<Ordering>> {
    match value {
        Value::Float(f) => Ok(f.partial_cmp(&bound)),
        Value::Integer(i) => Ok(compare_integer(*i, bound)),
        _ => Err(DescriptorError::type_mismatch(attribute, TypeSpec::Real, value.kind())),
    }
}

fn compare_integer(i: i64, bound: f64) -> Option<Ordering> {
    if bound.is_nan() {
        return None;
    }
    if bound >= I64_UPPER {
        return Some(Ordering::Less);
    }
    if bound < -I64_UPPER {
        return Some(Ordering::Greater);
    }
    let floor = bound.floor();
    match i.cmp(&(floor as i64)) {
        Ordering::Equal if bound > floor => Some(Ordering::Less),
        ordering => Some(ordering),
    }
}

fn at_least(attribute: &str, value: &Value, min: f64) -> DescriptorResult<bool> {
    Ok(matches!(
        compare_real(attribute, value, min)?,
        Some(Ordering::Greater | Ordering::Equal)
    ))
}

fn at_most(attribute: &str, value: &Value, max: f64) -> DescriptorResult<bool> {
    Ok(matches!(
        compare_real(attribute, value, max)?,
        Some(Ordering::Less | Ordering::Equal)
    ))
}

fn require_sized(attribute: &str, value: &Value) -> DescriptorResult<usize> {
    value
        .member_count()
        .ok_or_else(|| DescriptorError::type_mismatch(attribute, sized(), value.kind()))
}

impl Validator {
    /// Check a value on behalf of `attribute`.
    ///
    /// Numeric validators first require a real number and report a type
    /// mismatch otherwise; NaN satisfies no numeric bound.
    pub fn check(&self, attribute: &str, value: &Value) -> DescriptorResult<()> {
        let satisfied = match self {
            Validator::TypeCheck(spec) => {
                if spec.matches(value) {
                    return Ok(());
                }
                return Err(DescriptorError::type_mismatch(attribute, spec, value.kind()));
            }
            Validator::Positive => compare_real(attribute, value, 0.0)? == Some(Ordering::Greater),
            Validator::NonNegative => at_least(attribute, value, 0.0)?,
            Validator::NonEmpty => value.is_truthy(),
            Validator::Range { min, max } => {
                at_least(attribute, value, *min)? && at_most(attribute, value, *max)?
            }
            Validator::MinValue(min) => at_least(attribute, value, *min)?,
            Validator::MaxValue(max) => at_most(attribute, value, *max)?,
            Validator::MinLength(min) => require_sized(attribute, value)? >= *min,
            Validator::MaxLength(max) => require_sized(attribute, value)? <= *max,
            Validator::OneOf(options) => options.contains(value),
            Validator::Pattern(re) => match value.as_str() {
                Some(s) => re.is_match(s),
                None => {
                    return Err(DescriptorError::type_mismatch(
                        attribute,
                        TypeSpec::String,
                        value.kind(),
                    ))
                }
            },
            Validator::Predicate { predicate, .. } => predicate(value),
            Validator::Custom { check, .. } => return check(attribute, value),
        };

        if satisfied {
            Ok(())
        } else {
            Err(DescriptorError::value_constraint(attribute, self.description()))
        }
    }

    /// Get a human-readable description of what this validator requires.
    ///
    /// Phrased to follow "must be", e.g. "age must be positive".
    pub fn description(&self) -> String {
        match self {
            Validator::TypeCheck(spec) => format!("of type {}", spec),
            Validator::Positive => "positive".to_string(),
            Validator::NonNegative => "non-negative".to_string(),
            Validator::NonEmpty => "non-empty".to_string(),
            Validator::Range { min, max } => format!("between {} and {}", min, max),
            Validator::MinValue(min) => format!("at least {}", min),
            Validator::MaxValue(max) => format!("at most {}", max),
            Validator::MinLength(len) => format!("at least {} long", len),
            Validator::MaxLength(len) => format!("at most {} long", len),
            Validator::OneOf(options) => format!(
                "one of {}",
                options
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Validator::Pattern(re) => format!("matching /{}/", re.as_str()),
            Validator::Predicate { description, .. } => description.clone(),
            Validator::Custom { name, .. } => name.clone(),
        }
    }
}
