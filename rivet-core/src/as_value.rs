use crate::{Error, Result, Value, truncate_long};
use atoi::FromRadix10SignedChecked;
use std::{any, borrow::Cow};

/// Conversion between native Rust types and the dynamically typed [`Value`] that backs
/// query parameters, attribute maps and row decoding.
///
/// # Examples
/// ```rust
/// use rivet_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int64(Some(42)));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed null for this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    /// Convert a [`Value`] back into `Self`.
    ///
    /// Besides the canonical variant, text is parsed when it represents the type, this
    /// covers backends that hand back numbers stored in a `TEXT` column.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_integer(value: &str) -> Result<i64> {
    let trimmed = value.trim();
    match i64::from_radix_10_signed_checked(trimmed.as_bytes()) {
        (Some(v), len) if len == trimmed.len() && len > 0 => Ok(v),
        _ => Err(Error::msg(format!(
            "Cannot parse `{}` as i64",
            truncate_long!(value)
        ))),
    }
}

fn parse_float(value: &str) -> Result<f64> {
    fast_float::parse(value.trim()).map_err(|_| {
        Error::msg(format!("Cannot parse `{}` as f64", truncate_long!(value)))
    })
}

macro_rules! impl_as_value_integer {
    ($source:ty) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                Value::Int64(None)
            }
            fn as_value(self) -> Value {
                Value::Int64(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let v = match value {
                    Value::Int64(Some(v)) => v,
                    Value::Boolean(Some(v)) => v as i64,
                    Value::Varchar(Some(ref v)) => parse_integer(v)?,
                    _ => return Err(conversion_error::<Self>(&value)),
                };
                <$source>::try_from(v).map_err(|_| {
                    Error::msg(format!(
                        "Value {v}: i64 is out of range for {}",
                        any::type_name::<Self>(),
                    ))
                })
            }
        }
    };
}
impl_as_value_integer!(i8);
impl_as_value_integer!(i16);
impl_as_value_integer!(i32);
impl_as_value_integer!(i64);
impl_as_value_integer!(u8);
impl_as_value_integer!(u16);
impl_as_value_integer!(u32);

macro_rules! impl_as_value_float {
    ($source:ty) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                Value::Float64(None)
            }
            fn as_value(self) -> Value {
                Value::Float64(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::Varchar(Some(ref v)) => Ok(parse_float(v)? as _),
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_float!(f32);
impl_as_value_float!(f64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int64(Some(v)) => Ok(v != 0),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Int64(Some(v)) => Ok(itoa::Buffer::new().format(v).into()),
            Value::Float64(Some(v)) => Ok(ryu::Buffer::new().format(v).into()),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .map_err(|e| Error::new(e).context("Blob is not a valid UTF-8 string")),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Cow<'static, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}
