/// Convenient macro for constructing a [`Value`][crate::Value] map.
///
/// Keys are identifiers. Values can be `None`, nested lists `[...]`, nested
/// maps `{...}` or any expression that implements
/// `Into<`[`Value`][crate::Value]`>`.
///
/// # Examples
///
/// ```
/// let ctx = scriptlet::value! {
///     user: { name: "John Smith", age: 42 },
///     tags: ["a", "b"],
///     note: None,
/// };
/// ```
#[macro_export]
macro_rules! value {
    ($($tt:tt)*) => {{
        #[allow(unused_mut)]
        let mut map = ::std::collections::BTreeMap::new();
        $crate::_value_map!(map; $($tt)*);
        $crate::Value::Map(map)
    }};
}

// TT muncher for the entries of a map. Each entry is inserted into the given
// map variable.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_map {
    ($map:ident;) => {};

    ($map:ident; $key:ident : $($rest:tt)*) => {
        $crate::_value_entry!($map; $key; [] $($rest)*);
    };
}

// Collects the tokens of a single map value up to the next comma.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_entry {
    ($map:ident; $key:ident; [$($val:tt)+]) => {
        let _ = $map.insert(
            ::std::string::String::from(stringify!($key)),
            $crate::_value!($($val)+),
        );
    };

    ($map:ident; $key:ident; [$($val:tt)+] , $($rest:tt)*) => {
        let _ = $map.insert(
            ::std::string::String::from(stringify!($key)),
            $crate::_value!($($val)+),
        );
        $crate::_value_map!($map; $($rest)*);
    };

    ($map:ident; $key:ident; [$($val:tt)*] $next:tt $($rest:tt)*) => {
        $crate::_value_entry!($map; $key; [$($val)* $next] $($rest)*);
    };
}

// TT muncher for the elements of a list.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_list {
    ([$($elems:expr,)*]) => {
        ::std::vec![$($elems,)*]
    };

    ([$($elems:expr,)*] $($rest:tt)+) => {
        $crate::_value_elem!([$($elems,)*] [] $($rest)+)
    };
}

// Collects the tokens of a single list element up to the next comma.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_elem {
    // A stray trailing comma, e.g. `[,]`.
    ([$($elems:expr,)*] [] , $($rest:tt)*) => {
        $crate::_value_list!([$($elems,)*] $($rest)*)
    };

    ([$($elems:expr,)*] [$($val:tt)+]) => {
        $crate::_value_list!([$($elems,)* $crate::_value!($($val)+),])
    };

    ([$($elems:expr,)*] [$($val:tt)+] , $($rest:tt)*) => {
        $crate::_value_list!([$($elems,)* $crate::_value!($($val)+),] $($rest)*)
    };

    ([$($elems:expr,)*] [$($val:tt)*] $next:tt $($rest:tt)*) => {
        $crate::_value_elem!([$($elems,)*] [$($val)* $next] $($rest)*)
    };
}

// Converts a single value.
#[macro_export]
#[doc(hidden)]
macro_rules! _value {
    (None) => {
        $crate::Value::None
    };

    ([ $($tt:tt)* ]) => {
        $crate::Value::List($crate::_value_list!([] $($tt)*))
    };

    ({ $($tt:tt)* }) => {
        $crate::value!($($tt)*)
    };

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
