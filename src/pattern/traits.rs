//! Core traits for pattern matching

use std::fmt::Debug;

/// Trait for string pattern matchers
pub trait StringMatcher: Debug + Send + Sync {
    /// Match a string value against this pattern
    fn string_match(&self, value: &str) -> bool;
}

impl<T: StringMatcher + ?Sized> StringMatcher for Box<T> {
    fn string_match(&self, value: &str) -> bool {
        (**self).string_match(value)
    }
}
