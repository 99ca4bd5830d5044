//! Store-issued declaration handles

use serde::Serialize;
use std::fmt;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(usize);

        impl $name {
            /// Raw slot index
            pub fn index(self) -> usize {
                self.0
            }

            /// Convert a raw integer handle; negative values mean "no handle"
            pub fn from_raw(raw: i64) -> Option<Self> {
                usize::try_from(raw).ok().map(Self)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

handle_type!(
    /// Handle of an element declaration
    ElementDeclIndex
);
handle_type!(
    /// Handle of an attribute declaration
    AttributeDeclIndex
);
handle_type!(
    /// Handle of a content-spec node
    ContentSpecIndex
);
