//! Static-to-runtime shape bridge.
//!
//! [`Describe`] lets a Rust type state its [`Shape`] so that contracts can be
//! declared from types (`InputContract::typed::<CreatePost>(..)`,
//! `ctx.json_t(reply)`) instead of being written out by hand. Structs usually
//! get it through `#[derive(Describe)]`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::shape::Shape;

/// A type with a known runtime [`Shape`].
///
/// # Example
///
/// ```
/// use hestia_core::{Describe, Shape};
///
/// struct Greeting {
///     message: String,
/// }
///
/// impl Describe for Greeting {
///     fn shape() -> Shape {
///         Shape::object().field("message", String::shape())
///     }
/// }
///
/// assert_eq!(Greeting::shape().to_string(), "{ message: string }");
/// ```
pub trait Describe {
    /// The structural description of `Self`.
    fn shape() -> Shape;

    /// Whether a struct field of this type may be omitted.
    ///
    /// Only `Option<T>` overrides this.
    fn optional() -> bool {
        false
    }
}

macro_rules! describe_as {
    ($shape:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> Shape {
                    $shape
                }
            }
        )+
    };
}

describe_as!(Shape::String => String, str, char);
describe_as!(Shape::Boolean => bool);
describe_as!(Shape::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_as!(Shape::Number => f32, f64);
describe_as!(Shape::Null => ());
describe_as!(Shape::Unknown => serde_json::Value, serde_json::Map<String, serde_json::Value>);

impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn optional() -> bool {
        true
    }
}

macro_rules! describe_wrapper {
    ($($wrapper:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $wrapper<T> {
                fn shape() -> Shape {
                    T::shape()
                }

                fn optional() -> bool {
                    T::optional()
                }
            }
        )+
    };
}

describe_wrapper!(Box, Arc, Rc);

impl<T: Describe + ?Sized> Describe for &T {
    fn shape() -> Shape {
        T::shape()
    }

    fn optional() -> bool {
        T::optional()
    }
}

macro_rules! describe_sequence {
    ($($seq:ident),+) => {
        $(
            impl<T: Describe> Describe for $seq<T> {
                fn shape() -> Shape {
                    Shape::array(T::shape())
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }
}

impl<T: Describe> Describe for [T] {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }
}

// Map keys are only known at runtime.
impl<K, V, S> Describe for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Unknown
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Unknown
    }
}
