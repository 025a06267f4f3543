//! Dependency predicates between task metadata

use std::sync::Arc;

/// Decides whether one task must finish before another may start.
///
/// The queue calls [`is_dependency`](DependencyTracker::is_dependency) with a
/// currently pending task as `self` and the newly submitted task as `other`.
/// Returning `true` makes the new task wait for the pending one.
///
/// The relation does not need to be symmetric or transitive. It is evaluated
/// while the queue's registry lock is held, so it must be cheap, must not
/// block, and must not touch shared state.
pub trait DependencyTracker {
    /// Returns `true` if `self` must finish before `other` starts.
    fn is_dependency(&self, other: &Self) -> bool;
}

/// Metadata that makes every task depend on every task still pending.
///
/// A queue using `Serial` runs its operations one at a time in submission
/// order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Serial;

impl DependencyTracker for Serial {
    fn is_dependency(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: DependencyTracker> DependencyTracker for Arc<T> {
    fn is_dependency(&self, other: &Self) -> bool {
        (**self).is_dependency(&**other)
    }
}

impl<T: DependencyTracker> DependencyTracker for Box<T> {
    fn is_dependency(&self, other: &Self) -> bool {
        (**self).is_dependency(&**other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Writer {
        key: &'static str,
        exclusive: bool,
    }

    // Exclusive writers wait for everything on their key, readers only wait
    // for exclusive writers.
    impl DependencyTracker for Writer {
        fn is_dependency(&self, other: &Self) -> bool {
            self.key == other.key && (self.exclusive || other.exclusive)
        }
    }

    #[test]
    fn test_serial_always_depends() {
        assert!(Serial.is_dependency(&Serial));
    }

    #[test]
    fn test_custom_tracker_readers_share_writers_exclude() {
        let reader = Writer {
            key: "a",
            exclusive: false,
        };
        let other_reader = Writer {
            key: "a",
            exclusive: false,
        };
        let writer = Writer {
            key: "a",
            exclusive: true,
        };
        let unrelated = Writer {
            key: "b",
            exclusive: true,
        };

        assert!(!reader.is_dependency(&other_reader));
        assert!(reader.is_dependency(&writer));
        assert!(writer.is_dependency(&reader));
        assert!(!writer.is_dependency(&unrelated));
    }

    #[test]
    fn test_smart_pointer_delegation() {
        let a = Arc::new(Serial);
        let b = Arc::new(Serial);
        assert!(a.is_dependency(&b));

        let a: Box<Serial> = Box::new(Serial);
        let b: Box<Serial> = Box::new(Serial);
        assert!(a.is_dependency(&b));
    }
}
