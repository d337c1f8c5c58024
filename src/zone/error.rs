// Copyright 2026 the bailiwick authors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the error types for zone-related errors.

use std::fmt;

use crate::rr::rrset::RrsetListAddError;

/// Errors that arise during lookups against a
/// [`Zone`](super::Zone).
///
/// Normal negative answers (NXDOMAIN, no matching RRset, referrals,
/// and so on) are *not* errors; they are reported through
/// [`FindResult`](super::FindResult). These variants cover genuinely
/// exceptional uses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The queried name is outside the zone's authority.
    OutOfZone,

    /// [`Zone::find_nsec3`](super::Zone::find_nsec3) was called on a
    /// zone that is not NSEC3-signed.
    NotNsec3Signed,

    /// A recursive NSEC3 search exhausted every candidate name without
    /// matching, which cannot happen for a correctly signed zone.
    BrokenNsec3Zone,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::OutOfZone => f.write_str("the queried name is not within the zone"),
            Self::NotNsec3Signed => f.write_str("the zone is not NSEC3-signed"),
            Self::BrokenNsec3Zone => {
                f.write_str("recursive NSEC3 search did not stop; the NSEC3 chain is broken")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Errors that arise when adding records to a [`Zone`](super::Zone).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AddError {
    /// The record's owner is not within the zone.
    NotInZone,

    /// The record's class does not match the zone's class.
    ClassMismatch,

    /// The record's TTL does not match the TTL of existing records in
    /// the same RRset.
    TtlMismatch,

    /// An RRSIG record was added, but no RRset of the covered type
    /// exists at its owner.
    OrphanRrsig,

    /// An NSEC3 or NSEC3PARAM record's RDATA could not be understood.
    InvalidRdata,

    /// An NSEC3 record's owner is not one label below the zone origin,
    /// or an NSEC3PARAM record's owner is not the origin.
    MisplacedNsec3,

    /// An NSEC3 or NSEC3PARAM record uses a hash algorithm other than
    /// SHA-1.
    UnsupportedNsec3Algorithm,
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NotInZone => f.write_str("the record's owner is not within the zone"),
            Self::ClassMismatch => {
                f.write_str("the record's class does not match the zone's class")
            }
            Self::TtlMismatch => f.write_str(
                "the record's TTL does not match the TTL of existing records in the same RRset",
            ),
            Self::OrphanRrsig => f.write_str("the RRSIG does not cover any RRset at its owner"),
            Self::InvalidRdata => f.write_str("the record's RDATA could not be understood"),
            Self::MisplacedNsec3 => {
                f.write_str("the NSEC3 or NSEC3PARAM owner is not where the signing chain expects")
            }
            Self::UnsupportedNsec3Algorithm => {
                f.write_str("only the SHA-1 NSEC3 hash algorithm is supported")
            }
        }
    }
}

impl From<RrsetListAddError> for AddError {
    fn from(error: RrsetListAddError) -> Self {
        match error {
            RrsetListAddError::TtlMismatch => Self::TtlMismatch,
            RrsetListAddError::OrphanRrsig => Self::OrphanRrsig,
        }
    }
}

impl std::error::Error for AddError {}
