//! Selective overlay of partial updates onto stored records.
//!
//! Scalars and sequences follow zero-as-unset: an update value replaces the
//! existing one only when it is not the zero value of its type (`""`, `0`,
//! `false`, an empty vec). Records and nested structures list their settable
//! fields with [`merge_fields!`](crate::merge_fields) and are merged field by
//! field, so a nested partial update only touches what it sets. `Option`
//! carries explicit presence: `None` never overrides, `Some` into `Some`
//! descends into the pointee.
//!
//! An empty vec or zero scalar can never clear a field. Types that need an
//! explicit clear should use an `Option`.

use chrono::{DateTime, NaiveDate, Utc};

pub trait Merge {
    /// Overlay the non-zero parts of `update` onto `self`
    fn merge(&mut self, update: Self);
}

/// Merge into a copy of `existing`
pub fn merged<T: Merge + Clone>(existing: &T, update: T) -> T {
    let mut result = existing.clone();
    result.merge(update);
    result
}

/// Implement [`Merge`] for a struct by merging the listed fields in order.
///
/// Fields left out of the list are not settable through a merge.
///
/// ```ignore
/// merge_fields!(Bio { address, phone, postal_code });
/// ```
#[macro_export]
macro_rules! merge_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::database::merge::Merge for $ty {
            fn merge(&mut self, update: Self) {
                $( $crate::database::merge::Merge::merge(&mut self.$field, update.$field); )*
            }
        }
    };
}

macro_rules! merge_unless_zero {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl Merge for $ty {
                fn merge(&mut self, update: Self) {
                    if update != $zero {
                        *self = update;
                    }
                }
            }
        )*
    };
}

merge_unless_zero! {
    i32 => 0,
    i64 => 0,
    u32 => 0,
    u64 => 0,
    usize => 0,
    f64 => 0.0,
    bool => false,
}

/// Values without a meaningful zero; reachable through `Option`
macro_rules! merge_replace {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Merge for $ty {
                fn merge(&mut self, update: Self) {
                    *self = update;
                }
            }
        )*
    };
}

merge_replace!(NaiveDate, DateTime<Utc>);

impl Merge for String {
    fn merge(&mut self, update: Self) {
        if !update.is_empty() {
            *self = update;
        }
    }
}

impl<T> Merge for Vec<T> {
    fn merge(&mut self, update: Self) {
        if !update.is_empty() {
            *self = update;
        }
    }
}

impl<T: Merge> Merge for Option<T> {
    fn merge(&mut self, update: Self) {
        let Some(update) = update else {
            return;
        };
        match self {
            Some(existing) => existing.merge(update),
            None => *self = Some(update),
        }
    }
}

impl<T: Merge> Merge for Box<T> {
    fn merge(&mut self, update: Self) {
        (**self).merge(*update);
    }
}
