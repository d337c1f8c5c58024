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

//! Implementation of DNS zone data structures, for keeping DNS zones
//! loaded in memory and answering authoritative lookups against them.

use crate::class::Class;
use crate::name::Name;
use crate::rr::{Rdata, Rrset, Ttl, Type};

mod additional;
mod error;
mod find;
mod nsec3;
mod tree;

pub use error::{AddError, Error};
pub use find::{AnswerRrset, FindContext, FindOptions, FindResult, ResultFlags};
pub use nsec3::{nsec3_hash, FindNsec3Result};

use tree::NameTree;

/// A DNS zone loaded into memory, with support for authoritative
/// lookup semantics over signed and unsigned data.
///
/// The most important part of a `Zone` is its ordered tree of nodes
/// (see the `tree` module), which own RRsets. [`Zone::find`] and
/// related methods answer queries against the zone's data according to
/// the algorithm specified by [RFC 1034 § 4.3.2], as clarified by
/// [RFC 4592] (wildcards) and extended by [RFC 6672] (DNAME) and the
/// DNSSEC RFCs ([RFC 4035] for NSEC, [RFC 5155] for NSEC3). The `find`
/// module provides the implementation.
///
/// `Zone`s are constructed with [`Zone::new`], which provides an empty
/// structure, and subsequent calls to [`Zone::add`], which adds
/// resource records to the zone. Once loaded, a `Zone` is immutable:
/// lookups take `&self` and may run concurrently from any number of
/// threads.
///
/// [RFC 1034 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-4.3.2
/// [RFC 4035]: https://datatracker.ietf.org/doc/html/rfc4035
/// [RFC 4592]: https://datatracker.ietf.org/doc/html/rfc4592
/// [RFC 5155]: https://datatracker.ietf.org/doc/html/rfc5155
/// [RFC 6672]: https://datatracker.ietf.org/doc/html/rfc6672
#[derive(Debug)]
pub struct Zone {
    class: Class,
    tree: NameTree,
    nsec3: Option<Nsec3Data>,
}

/// The NSEC3 state of an NSEC3-signed zone: the hash parameters and a
/// second tree holding the NSEC3 records, keyed by their base32hex
/// hash labels.
#[derive(Debug)]
pub(crate) struct Nsec3Data {
    pub(crate) iterations: u16,
    pub(crate) salt: Vec<u8>,
    pub(crate) tree: NameTree,
}

/// The SHA-1 NSEC3 hash algorithm number of [RFC 5155 § 11].
///
/// [RFC 5155 § 11]: https://datatracker.ietf.org/doc/html/rfc5155#section-11
const NSEC3_ALGORITHM_SHA1: u8 = 1;

/// How a zone is signed, as derived from its data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Signing {
    /// No DNSSEC records are present.
    Unsigned,

    /// The zone carries an NSEC chain.
    Nsec,

    /// The zone carries an NSEC3 chain.
    Nsec3,
}

impl Zone {
    /// Creates a new `Zone` with the specified origin and class. The
    /// zone is initially empty.
    pub fn new(origin: Name, class: Class) -> Self {
        Self {
            class,
            tree: NameTree::new(origin),
            nsec3: None,
        }
    }

    /// Returns the zone's name (i.e., the domain name of the zone's
    /// origin node).
    pub fn name(&self) -> &Name {
        self.tree.node(self.tree.root()).name()
    }

    /// Returns the zone's class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns how the zone is signed. This is derived from the data:
    /// a zone with NSEC3 records is NSEC3-signed, else a zone with an
    /// NSEC RRset at its apex is NSEC-signed.
    pub fn signing(&self) -> Signing {
        if self.nsec3.is_some() {
            Signing::Nsec3
        } else if self
            .tree
            .node(self.tree.root())
            .rrsets
            .lookup(Type::NSEC)
            .is_some()
        {
            Signing::Nsec
        } else {
            Signing::Unsigned
        }
    }

    /// Looks up the SOA RRset at the zone's apex (for convenience and
    /// performance).
    pub fn soa(&self) -> Option<&Rrset> {
        self.tree.node(self.tree.root()).rrsets.lookup(Type::SOA)
    }

    /// Looks up the NS RRset at the zone's apex (for convenience and
    /// performance).
    pub fn ns(&self) -> Option<&Rrset> {
        self.tree.node(self.tree.root()).rrsets.lookup(Type::NS)
    }

    /// Adds a record to the `Zone`.
    ///
    /// This is designed with the "zone file" paradigm in mind: records
    /// are added in a "flat" manner, one by one. The implementation
    /// takes care of organizing records into RRsets attached to nodes
    /// mirroring the conceptual DNS tree, and of the bookkeeping the
    /// lookup process depends on: marking zone-cut and DNAME nodes,
    /// marking wildcard parents, routing NSEC3 records into the hash
    /// tree, capturing NSEC3 parameters, and attaching RRSIGs to the
    /// RRsets they cover.
    ///
    /// This will fail if the provided owner is not within the zone, if
    /// the record's class does not match the zone, if the record's TTL
    /// does not match other records in its RRset, or if a DNSSEC
    /// record is malformed or misplaced.
    ///
    /// **Warning:** this is currently *not* guaranteed to be an atomic
    /// operation, as it is expected that the caller will abort the
    /// zone load if an error occurs. *Do not* continue to use the
    /// `Zone` if this fails: it may be in an inconsistent state.
    pub fn add(
        &mut self,
        owner: &Name,
        rr_type: Type,
        class: Class,
        ttl: Ttl,
        rdata: &Rdata,
    ) -> Result<(), AddError> {
        if !owner.eq_or_subdomain_of(self.name()) {
            return Err(AddError::NotInZone);
        }
        if class != self.class {
            return Err(AddError::ClassMismatch);
        }
        match rr_type {
            Type::NSEC3 => self.add_nsec3(owner, ttl, rdata),
            Type::NSEC3PARAM => self.add_nsec3param(owner, ttl, rdata),
            Type::RRSIG => self.add_rrsig(owner, rdata),
            _ => {
                self.mark_wildcard_parents(owner);
                let id = self.tree.insert(owner);
                self.tree
                    .node_mut(id)
                    .rrsets
                    .add(rr_type, ttl, rdata)
                    .map_err(AddError::from)?;
                // NS below the apex delegates; DNAME redirects
                // anywhere, the apex included.
                if (rr_type == Type::NS && owner != self.name()) || rr_type == Type::DNAME {
                    self.tree.node_mut(id).callback = true;
                }
                Ok(())
            }
        }
    }

    /// Marks the wildcard parent of every wildcard label in `owner`,
    /// materializing the parent node if necessary.
    fn mark_wildcard_parents(&mut self, owner: &Name) {
        for i in 0..owner.len() - 1 {
            if owner[i].is_asterisk() {
                let parent = owner
                    .superdomain(i + 1)
                    .expect("a wildcard label always has a parent");
                let id = self.tree.insert(&parent);
                self.tree.node_mut(id).wildcard_parent = true;
            }
        }
    }

    /// Adds an NSEC3 record, which lives in the NSEC3 tree rather than
    /// the main tree. The first NSEC3 record fixes the zone's hash
    /// parameters if NSEC3PARAM has not already done so.
    fn add_nsec3(&mut self, owner: &Name, ttl: Ttl, rdata: &Rdata) -> Result<(), AddError> {
        if owner.len() != self.name().len() + 1 {
            return Err(AddError::MisplacedNsec3);
        }
        let (algorithm, iterations, salt) = rdata.nsec3_params().ok_or(AddError::InvalidRdata)?;
        if algorithm != NSEC3_ALGORITHM_SHA1 {
            return Err(AddError::UnsupportedNsec3Algorithm);
        }
        let origin = self.tree.node(self.tree.root()).name().clone();
        let nsec3 = self.nsec3.get_or_insert_with(|| Nsec3Data {
            iterations,
            salt: salt.to_vec(),
            tree: NameTree::new(origin),
        });
        let id = nsec3.tree.insert(owner);
        nsec3
            .tree
            .node_mut(id)
            .rrsets
            .add(Type::NSEC3, ttl, rdata)
            .map_err(AddError::from)
    }

    /// Adds an NSEC3PARAM record, which must live at the apex. Its
    /// parameters take precedence over those inferred from NSEC3
    /// records.
    fn add_nsec3param(&mut self, owner: &Name, ttl: Ttl, rdata: &Rdata) -> Result<(), AddError> {
        if owner != self.name() {
            return Err(AddError::MisplacedNsec3);
        }
        let (algorithm, iterations, salt) = rdata.nsec3_params().ok_or(AddError::InvalidRdata)?;
        if algorithm != NSEC3_ALGORITHM_SHA1 {
            return Err(AddError::UnsupportedNsec3Algorithm);
        }
        match self.nsec3 {
            Some(ref mut nsec3) => {
                nsec3.iterations = iterations;
                nsec3.salt = salt.to_vec();
            }
            None => {
                let origin = self.tree.node(self.tree.root()).name().clone();
                self.nsec3 = Some(Nsec3Data {
                    iterations,
                    salt: salt.to_vec(),
                    tree: NameTree::new(origin),
                });
            }
        }
        let root = self.tree.root();
        self.tree
            .node_mut(root)
            .rrsets
            .add(Type::NSEC3PARAM, ttl, rdata)
            .map_err(AddError::from)
    }

    /// Adds an RRSIG record, attaching it to the RRset it covers
    /// (which must already be present).
    fn add_rrsig(&mut self, owner: &Name, rdata: &Rdata) -> Result<(), AddError> {
        let covered = rdata.rrsig_covered().ok_or(AddError::InvalidRdata)?;
        if covered == Type::NSEC3 {
            if owner.len() != self.name().len() + 1 {
                return Err(AddError::MisplacedNsec3);
            }
            let nsec3 = self.nsec3.as_mut().ok_or(AddError::OrphanRrsig)?;
            let id = nsec3.tree.insert(owner);
            nsec3
                .tree
                .node_mut(id)
                .rrsets
                .add_sig(covered, rdata)
                .map_err(AddError::from)
        } else {
            let id = self.tree.insert(owner);
            self.tree
                .node_mut(id)
                .rrsets
                .add_sig(covered, rdata)
                .map_err(AddError::from)
        }
    }

    /// Provides the lookup implementation with the zone's tree.
    pub(crate) fn tree(&self) -> &NameTree {
        &self.tree
    }

    /// Provides the NSEC3 implementation with the zone's NSEC3 state.
    pub(crate) fn nsec3_data(&self) -> Option<&Nsec3Data> {
        self.nsec3.as_ref()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::*;
    use crate::rr::Rdata;

    lazy_static! {
        static ref NAME: Name = "bailiwick.test.".parse().unwrap();
        static ref OUTSIDE: Name = "other.test.".parse().unwrap();
    }

    fn rdata(octets: &[u8]) -> &Rdata {
        octets.try_into().unwrap()
    }

    fn localhost() -> &'static Rdata {
        rdata(&[127, 0, 0, 1])
    }

    fn new_zone() -> Zone {
        Zone::new(NAME.clone(), Class::IN)
    }

    #[test]
    fn add_rejects_mismatched_class() {
        let mut zone = new_zone();
        assert_eq!(
            zone.add(&NAME, Type::A, Class::CH, Ttl::from(3600), localhost()),
            Err(AddError::ClassMismatch),
        );
    }

    #[test]
    fn add_rejects_mismatched_ttl() {
        let mut zone = new_zone();
        zone.add(&NAME, Type::A, Class::IN, Ttl::from(3600), localhost())
            .unwrap();
        assert_eq!(
            zone.add(&NAME, Type::A, Class::IN, Ttl::from(7200), localhost()),
            Err(AddError::TtlMismatch),
        );
    }

    #[test]
    fn add_rejects_owner_outside_of_zone() {
        let mut zone = new_zone();
        assert_eq!(
            zone.add(&OUTSIDE, Type::A, Class::IN, Ttl::from(3600), localhost()),
            Err(AddError::NotInZone),
        );
    }

    #[test]
    fn add_rejects_orphan_rrsig() {
        let mut zone = new_zone();
        assert_eq!(
            zone.add(
                &NAME,
                Type::RRSIG,
                Class::IN,
                Ttl::from(3600),
                rdata(b"\x00\x01rest-of-rrsig"),
            ),
            Err(AddError::OrphanRrsig),
        );
    }

    #[test]
    fn add_attaches_rrsig_to_covered_rrset() {
        let mut zone = new_zone();
        zone.add(&NAME, Type::A, Class::IN, Ttl::from(3600), localhost())
            .unwrap();
        zone.add(
            &NAME,
            Type::RRSIG,
            Class::IN,
            Ttl::from(3600),
            rdata(b"\x00\x01rest-of-rrsig"),
        )
        .unwrap();
        let apex = zone.tree.node(zone.tree.root());
        assert_eq!(apex.rrsets.lookup(Type::A).unwrap().sigs.count(), 1);
    }

    #[test]
    fn signing_is_derived_from_data() {
        let mut zone = new_zone();
        assert_eq!(zone.signing(), Signing::Unsigned);

        zone.add(
            &NAME,
            Type::NSEC,
            Class::IN,
            Ttl::from(3600),
            rdata(b"\x01a\x09bailiwick\x04test\x00\x00\x01\x40"),
        )
        .unwrap();
        assert_eq!(zone.signing(), Signing::Nsec);
    }

    #[test]
    fn nsec3_records_fix_parameters_and_mode() {
        let mut zone = new_zone();
        let owner: Name = "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom.bailiwick.test."
            .parse()
            .unwrap();
        zone.add(
            &owner,
            Type::NSEC3,
            Class::IN,
            Ttl::from(3600),
            rdata(b"\x01\x00\x00\x0c\x04\xaa\xbb\xcc\xdd\x14AAAAAAAAAAAAAAAAAAAA\x00"),
        )
        .unwrap();
        assert_eq!(zone.signing(), Signing::Nsec3);
        let nsec3 = zone.nsec3_data().unwrap();
        assert_eq!(nsec3.iterations, 12);
        assert_eq!(nsec3.salt, b"\xaa\xbb\xcc\xdd");
    }

    #[test]
    fn nsec3_rejects_bad_owners_and_algorithms() {
        let mut zone = new_zone();
        let deep: Name = "a.b.bailiwick.test.".parse().unwrap();
        assert_eq!(
            zone.add(
                &deep,
                Type::NSEC3,
                Class::IN,
                Ttl::from(3600),
                rdata(b"\x01\x00\x00\x0c\x00\x14AAAAAAAAAAAAAAAAAAAA\x00"),
            ),
            Err(AddError::MisplacedNsec3),
        );

        let hash_owner: Name = "hash.bailiwick.test.".parse().unwrap();
        assert_eq!(
            zone.add(
                &hash_owner,
                Type::NSEC3,
                Class::IN,
                Ttl::from(3600),
                rdata(b"\x02\x00\x00\x0c\x00\x14AAAAAAAAAAAAAAAAAAAA\x00"),
            ),
            Err(AddError::UnsupportedNsec3Algorithm),
        );
    }

    #[test]
    fn nsec3param_must_live_at_the_apex() {
        let mut zone = new_zone();
        let sub: Name = "sub.bailiwick.test.".parse().unwrap();
        assert_eq!(
            zone.add(
                &sub,
                Type::NSEC3PARAM,
                Class::IN,
                Ttl::from(0),
                rdata(b"\x01\x00\x00\x0c\x00"),
            ),
            Err(AddError::MisplacedNsec3),
        );
        zone.add(
            &NAME,
            Type::NSEC3PARAM,
            Class::IN,
            Ttl::from(0),
            rdata(b"\x01\x00\x00\x0c\x00"),
        )
        .unwrap();
        assert_eq!(zone.signing(), Signing::Nsec3);
        assert!(zone.nsec3_data().unwrap().salt.is_empty());
    }

    #[test]
    fn apex_accessors_work() {
        let mut zone = new_zone();
        assert!(zone.soa().is_none());
        zone.add(
            &NAME,
            Type::SOA,
            Class::IN,
            Ttl::from(3600),
            rdata(b"fake-soa-rdata"),
        )
        .unwrap();
        zone.add(
            &NAME,
            Type::NS,
            Class::IN,
            Ttl::from(3600),
            rdata(b"\x02ns\x04test\x00"),
        )
        .unwrap();
        assert!(zone.soa().is_some());
        assert!(zone.ns().is_some());
    }
}
