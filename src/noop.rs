//! Zero-cost stand-ins used when the crate is built with the `noop` feature.
//!
//! Same constructors and accessors as the real timers, no fields, no `Drop`.
//! No clock, environment variable, allocation or file is ever touched.

use std::marker::PhantomData;
use std::time::Duration;

use crate::label::IntoLabel;

#[must_use = "a timer measures nothing unless it is bound to a scope"]
pub struct ScopeTimer<'a> {
    _location: PhantomData<&'a str>,
}

impl<'a> ScopeTimer<'a> {
    #[inline(always)]
    pub fn new(_location: &'a str) -> Self {
        Self { _location: PhantomData }
    }

    /// The label is dropped unread.
    #[inline(always)]
    pub fn with_label<L>(_location: &'a str, _label: L) -> Self
    where
        L: IntoLabel<'a>,
    {
        Self { _location: PhantomData }
    }

    /// The closure is never called.
    #[inline(always)]
    pub fn with_label_fn<F, L>(_location: &'a str, _make_label: F) -> Self
    where
        F: FnOnce() -> L,
        L: IntoLabel<'a>,
    {
        Self { _location: PhantomData }
    }

    #[inline(always)]
    pub fn is_disabled(&self) -> bool {
        true
    }

    #[inline(always)]
    pub fn label(&self) -> Option<&str> {
        None
    }

    #[inline(always)]
    pub fn owns_label(&self) -> bool {
        false
    }

    #[inline(always)]
    pub fn location(&self) -> Option<&str> {
        None
    }

    #[inline(always)]
    pub fn thread_id(&self) -> Option<u32> {
        None
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}

#[must_use = "a timer measures nothing unless it is bound to a scope"]
pub struct ConditionalScopeTimer<'a> {
    _location: PhantomData<&'a str>,
}

impl<'a> ConditionalScopeTimer<'a> {
    #[inline(always)]
    pub fn new<F, L>(_enabled: bool, _location: &'a str, _make_label: F) -> Self
    where
        F: FnOnce() -> L,
        L: IntoLabel<'a>,
    {
        Self { _location: PhantomData }
    }

    #[inline(always)]
    pub fn timer(&self) -> Option<&ScopeTimer<'a>> {
        None
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        false
    }
}
