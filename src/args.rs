//! Positional argument lists.
//!
//! A decorated method takes its arguments as one value: a tuple for fixed
//! arity, a `Vec` for variadic methods. [`Arguments`] exposes that value as
//! the positional array the interceptor filters and logs, without consuming
//! it. The method itself still receives the original, unfiltered value.

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::value::to_loggable;

/// A positional argument list that can be logged.
pub trait Arguments {
    /// The arguments in positional order, as JSON values.
    fn to_values(&self) -> Result<Vec<Value>, Error>;
}

impl<T: Serialize> Arguments for Vec<T> {
    fn to_values(&self) -> Result<Vec<Value>, Error> {
        self.iter()
            .map(to_loggable)
            .collect()
    }
}

impl<T: Serialize, const N: usize> Arguments for [T; N] {
    fn to_values(&self) -> Result<Vec<Value>, Error> {
        self.iter()
            .map(to_loggable)
            .collect()
    }
}

impl Arguments for () {
    fn to_values(&self) -> Result<Vec<Value>, Error> {
        Ok(Vec::new())
    }
}

macro_rules! impl_arguments_for_tuple {
    ($($ty:ident . $idx:tt),+) => {
        impl<$($ty: Serialize),+> Arguments for ($($ty,)+) {
            fn to_values(&self) -> Result<Vec<Value>, Error> {
                Ok(vec![$(to_loggable(&self.$idx)?),+])
            }
        }
    };
}

impl_arguments_for_tuple!(A.0);
impl_arguments_for_tuple!(A.0, B.1);
impl_arguments_for_tuple!(A.0, B.1, C.2);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10);
impl_arguments_for_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10, L.11);
