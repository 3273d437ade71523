use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw surrogate key.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw surrogate key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id!(
    /// Surrogate key of a student, assigned by the store on creation.
    StudentId
);

record_id!(
    /// Surrogate key of a lecturer, assigned by the store on creation.
    LecturerId
);

record_id!(
    /// Surrogate key of a course, assigned by the store on creation.
    ///
    /// A course that was assembled but not yet persisted has no id.
    CourseId
);
