// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Update offers and highest-version selection.

use crate::version::Version;
use serde::{Deserialize, Serialize};

/// What a distribution source answers to a discovery query.
///
/// `source` is the identity the source *declares* for itself. It is
/// attacker-controllable metadata: the adversarial source claims the trusted
/// identity, and the agent resolves its download endpoint from this field.
/// Nothing in the protocol authenticates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOffer {
    pub version: Version,
    pub filename: String,
    pub checksum: Option<String>,
    pub source: String,
}

/// Pick the strictly-highest offer above `current`, or `None` if nothing
/// exceeds it. Ties keep the first offer examined, so callers must list the
/// trusted source before the adversarial one. Version number alone decides;
/// a higher number from a lying source outranks the trusted one.
pub fn select_offer<'a>(current: Version, offers: &'a [UpdateOffer]) -> Option<&'a UpdateOffer> {
    let mut best: Option<&UpdateOffer> = None;
    let mut best_version = current;
    for offer in offers {
        if offer.version > best_version {
            best = Some(offer);
            best_version = offer.version;
        }
    }
    best
}
