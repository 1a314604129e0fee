use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::Value;

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $conv:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )+
    };
}

impl_from! {
    () => |_u| Self::None,
    bool => |b| Self::Bool(b),
    u8 => |i| Self::Integer(i64::from(i)),
    u16 => |i| Self::Integer(i64::from(i)),
    u32 => |i| Self::Integer(i64::from(i)),
    i8 => |i| Self::Integer(i64::from(i)),
    i16 => |i| Self::Integer(i64::from(i)),
    i32 => |i| Self::Integer(i64::from(i)),
    i64 => |i| Self::Integer(i),
    f32 => |f| Self::Float(f64::from(f)),
    f64 => |f| Self::Float(f),
    String => |s| Self::String(s),
    &str => |s| Self::String(s.to_owned()),
    Cow<'_, str> => |s| Self::String(s.into_owned()),
}

impl From<usize> for Value {
    /// Lengths and indexes that do not fit in an `i64` become floats.
    fn from(n: usize) -> Self {
        match i64::try_from(n) {
            Ok(i) => Self::Integer(i),
            Err(_) => Self::Float(n as f64),
        }
    }
}

impl<V> From<Option<V>> for Value
where
    V: Into<Value>,
{
    fn from(opt: Option<V>) -> Self {
        opt.map(Into::into).unwrap_or(Self::None)
    }
}

impl<V> From<Vec<V>> for Value
where
    V: Into<Value>,
{
    fn from(list: Vec<V>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

impl<V, const N: usize> From<[V; N]> for Value
where
    V: Into<Value>,
{
    fn from(list: [V; N]) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: [(K, V); N]) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> From<BTreeMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> From<HashMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: HashMap<K, V>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<V> FromIterator<V> for Value
where
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
