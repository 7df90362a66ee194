//! Backend identifiers.
//!
//! Every backend entity is addressed by a positive integer. Each kind gets its
//! own newtype so a [`ProductId`] is never accepted where a [`CartLineId`] is
//! expected, even though both are plain numbers on the wire.

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The number the backend uses for this entity.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        /// Parses surrounding whitespace away, so CLI and path input both work.
        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

backend_id!(
    /// A catalog item.
    ProductId
);
backend_id!(
    /// The backend's own row id for a cart line (`cartId` on the wire).
    CartLineId
);
backend_id!(
    /// A placed order.
    OrderId
);
backend_id!(
    /// A registered shopper.
    UserId
);
