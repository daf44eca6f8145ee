//! Generates the error enums shared by the snapshot ports.
//!
//! Every variant carries a single human-readable `message: String`. The
//! macro derives `thiserror::Error`, one snake-case constructor per variant
//! accepting `impl Into<String>`, and a `message()` accessor.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $field:ident : String } => $display:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant { $field: String },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Build a `" $variant "` error."]
                    pub fn [<$variant:snake>]($field: impl Into<String>) -> Self {
                        Self::$variant { $field: $field.into() }
                    }
                }
            )+

            /// Detail carried by the error, without the variant prefix.
            #[must_use]
            pub fn message(&self) -> &str {
                match self {
                    $(Self::$variant { $field } => $field.as_str(),)+
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::ports::{SnapshotCacheError, SnapshotClientError, SnapshotSourceError};
    use rstest::rstest;

    #[rstest]
    #[case(
        SnapshotSourceError::not_found("bucket-a").to_string(),
        "export not found: bucket-a"
    )]
    #[case(
        SnapshotSourceError::timeout(String::from("5s elapsed")).to_string(),
        "object store timeout: 5s elapsed"
    )]
    #[case(
        SnapshotClientError::decode("eof").to_string(),
        "explorer api response decode failed: eof"
    )]
    fn constructors_accept_str_and_string(#[case] rendered: String, #[case] expected: &str) {
        assert_eq!(rendered, expected);
    }

    #[rstest]
    fn constructors_select_the_named_variant() {
        assert!(matches!(
            SnapshotSourceError::status("403"),
            SnapshotSourceError::Status { .. }
        ));
        assert!(matches!(
            SnapshotClientError::api("boom"),
            SnapshotClientError::Api { .. }
        ));
    }

    #[rstest]
    fn message_strips_the_display_prefix() {
        assert_eq!(SnapshotSourceError::decode("bad json").message(), "bad json");
        assert_eq!(SnapshotCacheError::backend("poisoned").message(), "poisoned");
    }
}
