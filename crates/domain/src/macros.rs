//! Macro for implementing Display and FromStr for wire-named enums
//!
//! The hosted auth service names its events in SCREAMING_SNAKE_CASE
//! (`SIGNED_IN`, `TOKEN_REFRESHED`, ...). This macro keeps the mapping between
//! enum variants and their wire names in one place. Parsing is
//! case-insensitive; output always uses the canonical spelling.
//!
//! # Example
//!
//! ```rust
//! use studyhub_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Grant {
//!     Password,
//!     RefreshToken,
//! }
//!
//! impl_wire_name_conversions!(Grant {
//!     Password => "password",
//!     RefreshToken => "refresh_token",
//! });
//!
//! assert_eq!(Grant::RefreshToken.to_string(), "refresh_token");
//! assert_eq!("PASSWORD".parse::<Grant>().unwrap(), Grant::Password);
//! ```

/// Implements Display and FromStr traits for enums with fixed wire names
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire name of this variant.
            #[must_use]
            pub const fn as_wire_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_wire_name())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
