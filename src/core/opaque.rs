//! Type-erased keys and values carried by value scopes
//!
//! Bindings are chosen by unrelated callers, so the chain stores them behind a
//! shared, immutable, type-erased handle. Each handle remembers whether its
//! concrete type supports structural equality; the comparator in
//! [`crate::core::compare`] uses that to pick between structural and identity
//! comparison.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use super::compare::safe_equal;

/// Object-safe view over a stored value
pub(crate) trait ErasedValue: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn value_type_id(&self) -> TypeId;

    fn type_name(&self) -> &'static str;

    fn is_comparable(&self) -> bool;

    /// Structural equality against a value already known to have the same type.
    fn structural_eq(&self, other: &dyn Any) -> bool;

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

struct Comparable<T>(T);

impl<T> ErasedValue for Comparable<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn is_comparable(&self) -> bool {
        true
    }

    fn structural_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self.0 == *other)
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

struct Handle<T>(T);

impl<T> ErasedValue for Handle<T>
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn is_comparable(&self) -> bool {
        false
    }

    fn structural_eq(&self, _other: &dyn Any) -> bool {
        false
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Shared, immutable, type-erased value
///
/// Cloning an `Opaque` clones the handle, not the value: the clone is the
/// *same* stored value and therefore always equal to the original, even for
/// types without structural equality.
///
/// # Examples
///
/// ```rust
/// use ctxchain::Opaque;
///
/// let key = Opaque::from("request-id");
/// assert_eq!(key, Opaque::from(String::from("request-id")));
///
/// // Identity-only handles compare equal only to their own clones
/// let a = Opaque::handle(vec![1.0_f64]);
/// let b = Opaque::handle(vec![1.0_f64]);
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// ```
#[derive(Clone)]
pub struct Opaque {
    inner: Arc<dyn ErasedValue>,
}

impl Opaque {
    /// Wrap a structurally comparable value
    pub fn new<T>(value: T) -> Self
    where
        T: PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Comparable(value)),
        }
    }

    /// Wrap a value that only compares by identity
    ///
    /// Use this for key types whose equality is undefined or meaningless, or
    /// to mint a private key that no other caller can reproduce.
    pub fn handle<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Handle(value)),
        }
    }

    /// Borrow the stored value if it has type `T`
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Whether the stored value has type `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.value_type_id() == TypeId::of::<T>()
    }

    /// Name of the stored value's concrete type
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Whether the stored value was wrapped with structural equality
    pub fn is_comparable(&self) -> bool {
        self.inner.is_comparable()
    }

    /// Whether both handles point at the same stored value
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    pub(crate) fn erased(&self) -> &dyn ErasedValue {
        self.inner.as_ref()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        safe_equal(self, other)
    }
}

impl Eq for Opaque {}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_debug(f)
    }
}

macro_rules! impl_from_comparable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Opaque {
                fn from(value: $ty) -> Self {
                    Opaque::new(value)
                }
            }
        )*
    };
}

impl_from_comparable!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

// String slices are stored owned so `"k"` and `String::from("k")` bind the same key.
impl From<&str> for Opaque {
    fn from(value: &str) -> Self {
        Opaque::new(value.to_owned())
    }
}

impl From<&Opaque> for Opaque {
    fn from(value: &Opaque) -> Self {
        value.clone()
    }
}
