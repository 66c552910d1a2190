//! Typed identifier newtypes backed by the vendor's opaque strings.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a vendor-provided identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is blank (the default value).
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a vendor device (the `deviceId` field of inventory and reports).
    DeviceId
);

define_id!(
    /// Identifier of the vendor home whose reports the bridge subscribes to.
    HomeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_raw_identifier() {
        let id = DeviceId::new("d88b4c0100000001");
        assert_eq!(id.to_string(), "d88b4c0100000001");
        assert_eq!(id.as_str(), "d88b4c0100000001");
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = DeviceId::from("d1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"d1\"");
        let parsed: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_default_to_empty_identifier() {
        assert!(HomeId::default().is_empty());
        assert!(HomeId::new("  ").is_empty());
        assert!(!HomeId::new("h1").is_empty());
    }

    #[test]
    fn should_compare_equal_when_wrapping_same_value() {
        assert_eq!(HomeId::from("h1".to_string()), HomeId::new("h1"));
        assert_ne!(DeviceId::new("a"), DeviceId::new("b"));
    }
}
