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

//! Implementation of the [`Rdata`] type.
//!
//! The lookup core treats RDATA as opaque serialized octets. The only
//! structure it ever reads out of them is
//!
//! * the domain names that require additional-section processing
//!   (the NSDNAME of NS, the exchange of MX, and the target of SRV);
//! * the "type covered" field of RRSIG records, so that signatures can
//!   be attached to the RRset they cover; and
//! * the hash parameters of NSEC3 and NSEC3PARAM records.

use std::fmt;

use super::Type;
use crate::name::Name;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// A type for record RDATA.
///
/// The RDATA of a record is limited to 65,535 octets. The `Rdata` type
/// is a wrapper over `[u8]` that can only be constructed if the
/// underlying data has a valid length.
#[repr(transparent)]
pub struct Rdata {
    octets: [u8],
}

impl Rdata {
    /// Converts a `&[u8]` to a `&Rdata`, without checking the length;
    /// for internal use only.
    pub(super) fn from_unchecked(octets: &[u8]) -> &Self {
        unsafe { &*(octets as *const [u8] as *const Self) }
    }

    /// Returns the octets of this `Rdata`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the length of this `Rdata` in octets.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether this `Rdata` is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the domain names embedded in this `Rdata` that are
    /// subject to additional-section processing, assuming the `Rdata`
    /// is of type `rr_type`. For types without such names (or if the
    /// `Rdata` is too short or malformed), this returns no names.
    pub fn referenced_names(&self, rr_type: Type) -> Vec<Name> {
        let name_at = |offset: usize| {
            self.octets
                .get(offset..)
                .and_then(|o| Name::try_from_uncompressed(o).ok())
                .map(|(name, _)| name)
        };
        let name = match rr_type {
            Type::NS => name_at(0),
            Type::MX => name_at(2),
            Type::SRV => name_at(6),
            _ => None,
        };
        name.into_iter().collect()
    }

    /// Returns the "type covered" field of this `Rdata`, assuming it is
    /// of type RRSIG, or `None` if it is too short.
    pub fn rrsig_covered(&self) -> Option<Type> {
        let raw: [u8; 2] = self.octets.get(0..2)?.try_into().ok()?;
        Some(Type::from(u16::from_be_bytes(raw)))
    }

    /// Returns the `(hash algorithm, iterations, salt)` fields of this
    /// `Rdata`, assuming it is of type NSEC3 or NSEC3PARAM (the two
    /// share this prefix layout), or `None` if it is malformed.
    pub fn nsec3_params(&self) -> Option<(u8, u16, &[u8])> {
        let algorithm = *self.octets.first()?;
        let iterations = u16::from_be_bytes(self.octets.get(2..4)?.try_into().ok()?);
        let salt_len = *self.octets.get(4)? as usize;
        let salt = self.octets.get(5..5 + salt_len)?;
        Some((algorithm, iterations, salt))
    }
}

/// An error type used to report invalid RDATA.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RdataError {
    /// The RDATA was longer than 65,535 octets.
    TooLong,
}

impl fmt::Display for RdataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::TooLong => f.write_str("RDATA is longer than 65,535 octets"),
        }
    }
}

impl std::error::Error for RdataError {}

impl<'a> TryFrom<&'a [u8]> for &'a Rdata {
    type Error = RdataError;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > u16::MAX as usize {
            Err(RdataError::TooLong)
        } else {
            Ok(Rdata::from_unchecked(octets))
        }
    }
}

impl fmt::Debug for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for octet in self.octets() {
            write!(f, "{:02x}", octet)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn rdata(octets: &[u8]) -> &Rdata {
        octets.try_into().unwrap()
    }

    #[test]
    fn referenced_names_reads_ns() {
        let names = rdata(b"\x02ns\x04test\x00").referenced_names(Type::NS);
        assert_eq!(names, ["ns.test.".parse().unwrap()]);
    }

    #[test]
    fn referenced_names_reads_mx() {
        let names = rdata(b"\x00\x0a\x04mail\x04test\x00").referenced_names(Type::MX);
        assert_eq!(names, ["mail.test.".parse().unwrap()]);
    }

    #[test]
    fn referenced_names_reads_srv() {
        let names =
            rdata(b"\x00\x01\x00\x02\x00\x35\x03srv\x04test\x00").referenced_names(Type::SRV);
        assert_eq!(names, ["srv.test.".parse().unwrap()]);
    }

    #[test]
    fn referenced_names_skips_other_types_and_garbage() {
        assert!(rdata(b"\x7f\x00\x00\x01").referenced_names(Type::A).is_empty());
        assert!(rdata(b"\xff").referenced_names(Type::NS).is_empty());
    }

    #[test]
    fn rrsig_covered_works() {
        assert_eq!(rdata(b"\x00\x01rest").rrsig_covered(), Some(Type::A));
        assert_eq!(rdata(b"\x00").rrsig_covered(), None);
    }

    #[test]
    fn nsec3_params_works() {
        let (algorithm, iterations, salt) = rdata(b"\x01\x00\x00\x0c\x04\xaa\xbb\xcc\xdd")
            .nsec3_params()
            .unwrap();
        assert_eq!(algorithm, 1);
        assert_eq!(iterations, 12);
        assert_eq!(salt, b"\xaa\xbb\xcc\xdd");
    }

    #[test]
    fn overlong_rdata_is_rejected() {
        let too_long = vec![0; u16::MAX as usize + 1];
        assert!(matches!(
            <&Rdata>::try_from(too_long.as_slice()),
            Err(RdataError::TooLong)
        ));
    }
}
