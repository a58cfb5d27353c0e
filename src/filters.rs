//! Which new listings are worth an email.

use crate::models::Listing;
use std::str::FromStr;

/// Predicate deciding whether a new listing triggers a notification.
pub trait Relevance {
    fn is_relevant(&self, listing: &Listing) -> bool;
}

impl<F> Relevance for F
where
    F: Fn(&Listing) -> bool,
{
    fn is_relevant(&self, listing: &Listing) -> bool {
        self(listing)
    }
}

/// The two built-in relevance policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevancePolicy {
    /// One-room apartments larger than [`MIN_STRICT_SQUARE_METERS`],
    /// never corridor rooms.
    Strict,
    /// Anything that is not a corridor room.
    Loose,
}

/// Listings at or below this area are dropped by [`RelevancePolicy::Strict`].
pub const MIN_STRICT_SQUARE_METERS: u64 = 25;

impl Relevance for RelevancePolicy {
    fn is_relevant(&self, listing: &Listing) -> bool {
        let kind = listing.apartment_type.to_lowercase();
        if kind.contains("korridor") {
            return false;
        }
        match self {
            Self::Loose => true,
            Self::Strict => {
                listing.square_meters > MIN_STRICT_SQUARE_METERS && kind.contains("1 rum")
            }
        }
    }
}

impl FromStr for RelevancePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            _ => Err(()),
        }
    }
}
