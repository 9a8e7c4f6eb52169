//! Type-erased values for chains whose version set is only known at runtime.
//!
//! Prefer a per-version enum implementing [`Versioned`] when the versions are
//! fixed at compile time. [`ErasedValue`] trades those compile-time checks for
//! a downcast at every step boundary.

use alloc::boxed::Box;
use core::any::{type_name, Any};
use core::fmt;
use core::marker::PhantomData;

use crate::chain::Step;
use crate::error::{Error, Result};
use crate::versioned::Versioned;

/// A value of some schema version, with its concrete type erased.
///
/// `L` is the latest representation that application code works with.
pub struct ErasedValue<L> {
    version: u16,
    value: Box<dyn Any + Send>,
    _latest: PhantomData<fn() -> L>,
}

impl<L> ErasedValue<L> {
    /// Erase `value`, tagging it with `version`.
    pub fn new<T: Any + Send>(version: u16, value: T) -> Self {
        Self {
            version,
            value: Box::new(value),
            _latest: PhantomData,
        }
    }

    /// True if the erased value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrow the erased value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the erased value out as a `T`.
    pub fn downcast<T: Any>(self) -> Result<T> {
        let version = self.version;
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::TypeMismatch {
                version,
                expected: type_name::<T>(),
            })
    }
}

impl<L: Any + Send> Versioned for ErasedValue<L> {
    type Latest = L;

    fn version(&self) -> u16 {
        self.version
    }

    fn from_latest(latest: L, latest_version: u16) -> Self {
        Self::new(latest_version, latest)
    }

    fn into_latest(self) -> core::result::Result<L, Self> {
        let Self { version, value, .. } = self;
        match value.downcast::<L>() {
            Ok(latest) => Ok(*latest),
            Err(value) => Err(Self {
                version,
                value,
                _latest: PhantomData,
            }),
        }
    }
}

impl<L> fmt::Debug for ErasedValue<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedValue")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Wrap a typed `A -> B` transform as an upgrade step over erased values.
///
/// The produced value is tagged one version above its input.
///
/// ```
/// use verchain::erased::{self, ErasedValue};
///
/// let step = erased::upgrade::<String, _, _>(|count: u32| Ok(count.to_string()));
/// let v2 = step(ErasedValue::new(1, 7u32)).unwrap();
/// assert_eq!(v2.downcast_ref::<String>().map(String::as_str), Some("7"));
/// ```
pub fn upgrade<L, A, B>(
    f: impl Fn(A) -> Result<B> + Send + Sync + 'static,
) -> Step<ErasedValue<L>>
where
    L: 'static,
    A: Any + Send,
    B: Any + Send,
{
    typed_step(f, |version| version.saturating_add(1))
}

/// Wrap a typed `A -> B` transform as a downgrade step over erased values.
///
/// The produced value is tagged one version below its input.
pub fn downgrade<L, A, B>(
    f: impl Fn(A) -> Result<B> + Send + Sync + 'static,
) -> Step<ErasedValue<L>>
where
    L: 'static,
    A: Any + Send,
    B: Any + Send,
{
    typed_step(f, |version| version.saturating_sub(1))
}

fn typed_step<L, A, B>(
    f: impl Fn(A) -> Result<B> + Send + Sync + 'static,
    next_version: fn(u16) -> u16,
) -> Step<ErasedValue<L>>
where
    L: 'static,
    A: Any + Send,
    B: Any + Send,
{
    Box::new(move |value: ErasedValue<L>| {
        let version = value.version;
        let input = value.downcast::<A>()?;
        Ok(ErasedValue::new(next_version(version), f(input)?))
    })
}
