//! value holders
//!
//! A [Holder] remembers three things about a configuration value:
//! - the value itself (the zero value of `T` until something assigns it)
//! - whether it was ever assigned ([Holder::is_set])
//! - where in a document the value came from ([Holder::source])
//!
//! `is_set` is independent of the value: a document saying `likes_dogs = false` leaves the value at its zero value
//! but marks the holder as set.
use crate::position::Position;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Holder<T> {
    value: T,
    is_set: bool,
    source: Position,
}

pub type StringValue = Holder<String>;
pub type BoolValue = Holder<bool>;
pub type Int64Value = Holder<i64>;
pub type StringSliceValue = Holder<Vec<String>>;

impl<T> Holder<T> {
    /// Assign a value and mark the holder as set
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.is_set = true;
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn source(&self) -> &Position {
        &self.source
    }

    pub fn set_source(&mut self, source: Position) {
        self.source = source;
    }
}

impl<T: Clone> Holder<T> {
    /// Independent copy of value, `is_set` and source
    pub fn duplicate(&self) -> Self {
        self.clone()
    }
}

impl<T: Copy> Holder<T> {
    pub fn get(&self) -> T {
        self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_until_set() {
        let holder = StringValue::default();
        assert_eq!(holder.value(), "");
        assert!(!holder.is_set());
        assert!(!holder.source().is_valid());
    }

    #[test]
    fn explicit_zero_value_is_set() {
        let mut holder = BoolValue::default();
        holder.set(false);
        assert!(!holder.get());
        assert!(holder.is_set());
    }

    #[test]
    fn duplicate_is_independent() {
        let mut original = StringSliceValue::default();
        original.set(vec!["alice".to_string()]);
        original.set_source(Position {
            line: 4,
            column: 2,
            ..Default::default()
        });

        let mut copy = original.duplicate();
        assert_eq!(copy, original);

        copy.set(vec!["bob".to_string()]);
        assert_eq!(original.value(), &["alice".to_string()]);
        assert_eq!(copy.source().line, 4);
    }
}
