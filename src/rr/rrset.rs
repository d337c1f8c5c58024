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

//! In-memory storage of the RRsets attached to a node of the DNS tree.

use std::fmt;

use super::{Rdata, RdataSetOwned, Ttl, Type};

/// Stores an RRset in memory.
///
/// This is missing the NAME and CLASS fields. It's not necessary to
/// store these, since that data is maintained by the zone data
/// structure itself. In a signed zone, `sigs` holds the RDATA of the
/// RRSIG records covering this RRset.
#[derive(Clone, Debug)]
pub struct Rrset {
    pub rr_type: Type,
    pub ttl: Ttl,
    pub rdatas: RdataSetOwned,
    pub sigs: RdataSetOwned,
}

/// Stores all of the RRsets at a node in the DNS tree, ordered by RR
/// type.
#[derive(Clone, Debug, Default)]
pub struct RrsetList {
    rrsets: Vec<Rrset>,
}

/// An error type for [`RrsetList::add`] and [`RrsetList::add_sig`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RrsetListAddError {
    /// The record's TTL does not match the TTL of existing records in
    /// the same RRset.
    TtlMismatch,

    /// An RRSIG was added whose covered RRset is not present.
    OrphanRrsig,
}

impl fmt::Display for RrsetListAddError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::TtlMismatch => f.write_str(
                "the record's TTL does not match the TTL of existing records in the same RRset",
            ),
            Self::OrphanRrsig => f.write_str("the RRSIG does not cover any RRset at its owner"),
        }
    }
}

impl std::error::Error for RrsetListAddError {}

impl RrsetList {
    /// Creates a new, empty `RrsetList`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource record to the `RrsetList`.
    ///
    /// This will fail if the [`Ttl`] of the new record does not match
    /// the rest of the records in its [`Rrset`].
    ///
    /// Note that this does not validate the [`Rdata`] with respect to
    /// the [`Type`]. In addition, if the target [`Rrset`] exists and
    /// already contains [`Rdata`] equal to the provided [`Rdata`] (see
    /// [`Rdata::equals`]), then the new [`Rdata`] is silently ignored.
    pub fn add(&mut self, rr_type: Type, ttl: Ttl, rdata: &Rdata) -> Result<(), RrsetListAddError> {
        match self.rrsets.binary_search_by_key(&rr_type, |r| r.rr_type) {
            Ok(index) => {
                let rrset = &mut self.rrsets[index];
                if rrset.ttl != ttl {
                    Err(RrsetListAddError::TtlMismatch)
                } else {
                    rrset.rdatas.insert(rr_type, rdata);
                    Ok(())
                }
            }
            Err(index) => {
                let mut rdatas = RdataSetOwned::new();
                rdatas.insert(rr_type, rdata);
                let rrset = Rrset {
                    rr_type,
                    ttl,
                    rdatas,
                    sigs: RdataSetOwned::new(),
                };
                self.rrsets.insert(index, rrset);
                Ok(())
            }
        }
    }

    /// Attaches RRSIG RDATA to the RRset of the covered type. This will
    /// fail if no RRset of that type is present. RRSIG postdates
    /// RFC 3597, so the signatures themselves are deduplicated bitwise.
    pub fn add_sig(&mut self, covered: Type, rdata: &Rdata) -> Result<(), RrsetListAddError> {
        match self.rrsets.binary_search_by_key(&covered, |r| r.rr_type) {
            Ok(index) => {
                self.rrsets[index].sigs.insert(Type::RRSIG, rdata);
                Ok(())
            }
            Err(_) => Err(RrsetListAddError::OrphanRrsig),
        }
    }

    /// Looks up the [`Rrset`] of type `rr_type` in the `RrsetList`.
    pub fn lookup(&self, rr_type: Type) -> Option<&Rrset> {
        self.rrsets
            .binary_search_by_key(&rr_type, |r| r.rr_type)
            .map(|index| &self.rrsets[index])
            .ok()
    }

    /// Returns an iterator over the [`Rrset`]s of the `RrsetList`.
    pub fn iter(&self) -> std::slice::Iter<Rrset> {
        self.rrsets.iter()
    }

    /// Returns whether the `RrsetList` contains no RRsets.
    pub fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::Rdata;

    fn rdata(octets: &[u8]) -> &Rdata {
        octets.try_into().unwrap()
    }

    #[test]
    fn rrsetlist_works() {
        let loopback1 = rdata(&[127, 0, 0, 1]);
        let loopback2 = rdata(&[127, 0, 0, 2]);
        let domain = rdata(b"\x04test\x00");
        let mut rrsets = RrsetList::new();
        rrsets.add(Type::A, Ttl::from(3600), loopback1).unwrap();
        rrsets.add(Type::A, Ttl::from(3600), loopback2).unwrap();
        rrsets.add(Type::CNAME, Ttl::from(7200), domain).unwrap();

        let a_rrset = rrsets.lookup(Type::A).unwrap();
        assert_eq!(
            a_rrset.rdatas.iter().map(Rdata::octets).collect::<Vec<_>>(),
            [loopback1.octets(), loopback2.octets()],
        );
        let cname_rrset = rrsets.lookup(Type::CNAME).unwrap();
        assert_eq!(
            cname_rrset
                .rdatas
                .iter()
                .map(Rdata::octets)
                .collect::<Vec<_>>(),
            [domain.octets()],
        );
        assert!(rrsets.lookup(Type::AAAA).is_none());
    }

    #[test]
    fn rrsetlist_deduplicates_case_variant_names() {
        // Per RFC 3597 § 6, CNAME RDATA that differ only in the ASCII
        // case of the embedded name are the same record.
        let mut rrsets = RrsetList::new();
        rrsets
            .add(Type::CNAME, Ttl::from(3600), rdata(b"\x04test\x00"))
            .unwrap();
        rrsets
            .add(Type::CNAME, Ttl::from(3600), rdata(b"\x04TEST\x00"))
            .unwrap();
        assert_eq!(rrsets.lookup(Type::CNAME).unwrap().rdatas.count(), 1);
    }

    #[test]
    fn rrsetlist_rejects_ttl_mismatch() {
        let domain1 = rdata(b"\x04test\x00");
        let domain2 = rdata(b"\x07invalid\x00");
        let mut rrsets = RrsetList::new();
        rrsets.add(Type::NS, Ttl::from(3600), domain1).unwrap();
        assert_eq!(
            rrsets.add(Type::NS, Ttl::from(7200), domain2),
            Err(RrsetListAddError::TtlMismatch),
        );
    }

    #[test]
    fn add_sig_attaches_to_covered_rrset() {
        let mut rrsets = RrsetList::new();
        rrsets
            .add(Type::A, Ttl::from(3600), rdata(&[127, 0, 0, 1]))
            .unwrap();
        rrsets.add_sig(Type::A, rdata(b"\x00\x01fake-sig")).unwrap();
        assert_eq!(rrsets.lookup(Type::A).unwrap().sigs.count(), 1);
    }

    #[test]
    fn add_sig_rejects_orphans() {
        let mut rrsets = RrsetList::new();
        assert_eq!(
            rrsets.add_sig(Type::A, rdata(b"\x00\x01fake-sig")),
            Err(RrsetListAddError::OrphanRrsig),
        );
    }
}
