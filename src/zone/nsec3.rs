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

//! NSEC3 hashing and proof selection, per [RFC 5155].
//!
//! An NSEC3-signed zone proves the nonexistence of a name by covering
//! the *hash* of the name: [`Zone::find_nsec3`] hashes successively
//! shorter suffixes of the query name, looking each hash up in the
//! zone's NSEC3 tree, and reports the closest encloser it finds
//! together with the NSEC3 record covering the next closer name. The
//! hash ordering wraps around: a hash sorting before the smallest (or
//! after the largest) stored hash is covered by the largest one.
//!
//! [RFC 5155]: https://datatracker.ietf.org/doc/html/rfc5155

use std::cmp::Ordering;

use data_encoding::BASE32_DNSSEC;
use log::debug;
use sha1::{Digest, Sha1};

use crate::name::{Label, Name, NameRelation};
use crate::rr::Type;

use super::find::{materialize_rrset, AnswerRrset};
use super::tree::{SearchPath, TreeFindResult};
use super::{Error, Zone};

////////////////////////////////////////////////////////////////////////
// THE NSEC3 HASH                                                     //
////////////////////////////////////////////////////////////////////////

/// Computes the base32hex-encoded NSEC3 hash of `name` with the given
/// iteration count and salt, per [RFC 5155 § 5].
///
/// The name is first normalized to the lowercase wire format of
/// RFC 4034 § 6.2. SHA-1 is then applied `iterations + 1` times: the
/// first round hashes the wire-format name, each subsequent round
/// hashes the previous digest, and the salt is appended to the input
/// of every round.
///
/// [RFC 5155 § 5]: https://datatracker.ietf.org/doc/html/rfc5155#section-5
pub fn nsec3_hash(name: &Name, iterations: u16, salt: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(name.lowercase_wire_repr());
    hasher.update(salt);
    let mut digest = hasher.finalize();
    for _ in 0..iterations {
        let mut hasher = Sha1::new();
        hasher.update(digest.as_slice());
        hasher.update(salt);
        digest = hasher.finalize();
    }
    BASE32_DNSSEC.encode(digest.as_slice())
}

////////////////////////////////////////////////////////////////////////
// NSEC3 PROOF SELECTION                                              //
////////////////////////////////////////////////////////////////////////

/// The result of [`Zone::find_nsec3`].
#[derive(Debug)]
pub struct FindNsec3Result<'a> {
    /// Whether a name was found whose hash matches exactly (the
    /// closest encloser).
    pub matched: bool,

    /// The label count of the deepest suffix of the query name that
    /// was examined — on a match, the closest encloser's label count.
    pub closest_labels: u8,

    /// The matching NSEC3 RRset on a match, or the covering NSEC3
    /// RRset on a miss.
    pub closest_proof: Option<AnswerRrset<'a>>,

    /// On a recursive match below the query name, the NSEC3 RRset
    /// covering the next closer name.
    pub next_proof: Option<AnswerRrset<'a>>,
}

impl Zone {
    /// Searches the zone's NSEC3 tree for the query name's closest
    /// encloser and covering proof.
    ///
    /// Suffixes of `name` are hashed and looked up one by one, deepest
    /// first. In non-recursive mode only the full name is examined and
    /// the covering NSEC3 (if any) is returned; in recursive mode the
    /// search continues toward the origin until a hash matches, which
    /// must eventually happen in a correctly signed zone (the origin
    /// itself has an NSEC3).
    ///
    /// Fails with [`Error::NotNsec3Signed`] if the zone is not
    /// NSEC3-signed, and with [`Error::OutOfZone`] if `name` is not at
    /// or below the origin.
    pub fn find_nsec3(&self, name: &Name, recursive: bool) -> Result<FindNsec3Result, Error> {
        debug!(
            "find_nsec3 for {} ({})",
            name,
            if recursive { "recursive" } else { "non-recursive" },
        );
        let nsec3 = self.nsec3_data().ok_or(Error::NotNsec3Signed)?;

        let relation = name.compare(self.name()).relation;
        if relation != NameRelation::Equal && relation != NameRelation::Subdomain {
            return Err(Error::OutOfZone);
        }

        let olabels = self.name().len();
        let qlabels = name.len();
        let tree = &nsec3.tree;

        // Placeholder of the next closer proof. Examine all names from
        // the query name to the origin, stripping the deepest label
        // one by one, until a name with a matching NSEC3 hash is
        // found.
        let mut covering_node = None;
        for labels in (olabels..=qlabels).rev() {
            let stripped;
            let target = if labels == qlabels {
                name
            } else {
                stripped = name
                    .superdomain(qlabels - labels)
                    .expect("stripping toward the origin stays within the name");
                &stripped
            };
            let hashed = nsec3_hash(target, nsec3.iterations, &nsec3.salt);
            debug!("NSEC3 probe for {} at {} labels: {}", name, labels, hashed);

            let hash_label = <&Label>::try_from(hashed.as_bytes())
                .expect("a base32hex SHA-1 digest fits in a label");
            let hash_name = self
                .name()
                .child(hash_label)
                .expect("a hash label fits below the origin of a signed zone");

            let mut chain = SearchPath::new();
            match tree.find_with(&hash_name, &mut chain, |_, _| false) {
                TreeFindResult::Exact(node) => {
                    let closest = materialize_rrset(
                        tree,
                        Some(node),
                        tree.node(node).rrsets.lookup(Type::NSEC3),
                        true,
                        None,
                    );
                    let next = covering_node.and_then(|covering| {
                        materialize_rrset(
                            tree,
                            Some(covering),
                            tree.node(covering).rrsets.lookup(Type::NSEC3),
                            true,
                            None,
                        )
                    });
                    debug!("NSEC3 match for {} at {} labels", name, labels);
                    return Ok(FindNsec3Result {
                        matched: true,
                        closest_labels: labels as u8,
                        closest_proof: closest,
                        next_proof: next,
                    });
                }
                TreeFindResult::Partial(_) => {
                    let last_cmp = chain
                        .last_comparison()
                        .expect("a failed hash search records its final comparison");
                    let last_node = chain
                        .last_compared()
                        .expect("a failed hash search records its stop node");
                    assert!(last_cmp.order != Ordering::Equal);

                    // The hash ordering wraps: a hash sorting before
                    // the smallest stored hash (or after the largest)
                    // is covered by the largest node. Otherwise
                    // H(stop - 1) < hash < H(stop), and the stop
                    // node's predecessor covers.
                    let previous_node = tree.previous_sibling(last_node);
                    let next_node = tree.next_sibling(last_node);
                    covering_node = if (last_cmp.order == Ordering::Less
                        && previous_node.is_none())
                        || (last_cmp.order == Ordering::Greater && next_node.is_none())
                    {
                        Some(tree.last_in_subtree(tree.root()))
                    } else {
                        previous_node
                    };

                    if !recursive {
                        // In non-recursive mode, we are done.
                        let closest = covering_node.and_then(|covering| {
                            materialize_rrset(
                                tree,
                                Some(covering),
                                tree.node(covering).rrsets.lookup(Type::NSEC3),
                                true,
                                None,
                            )
                        });
                        return Ok(FindNsec3Result {
                            matched: false,
                            closest_labels: labels as u8,
                            closest_proof: closest,
                            next_proof: None,
                        });
                    }
                }
                TreeFindResult::NotFound => {
                    unreachable!("hash names are always within the NSEC3 tree's bailiwick")
                }
            }
        }

        // The recursive mode didn't stop, likely a broken NSEC3 zone.
        Err(Error::BrokenNsec3Zone)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::rr::{Rdata, Ttl};

    fn name(from: &str) -> Name {
        from.parse().unwrap()
    }

    // The salt and iteration count of the RFC 5155 Appendix A example
    // zone.
    static SALT: &[u8] = b"\xaa\xbb\xcc\xdd";
    const ITERATIONS: u16 = 12;

    #[test]
    fn hash_matches_the_rfc_5155_vectors() {
        // Expected values from RFC 5155 Appendix A.
        for (input, expected) in [
            ("example.", "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom"),
            ("a.example.", "35mthgpgcu1qg68fab165klnsnk3dpvl"),
            ("ai.example.", "gjeqe526plbf1g8mklp59enfd789njgi"),
            ("ns1.example.", "2t7b4g4vsa5smi47k61mv5bv1a22bojr"),
            ("w.example.", "k8udemvp1j2f7eg6jebps17vp3n8i58h"),
            ("*.w.example.", "r53bq7cc2uvmubfu5ocmm6pers9tk9en"),
            ("x.w.example.", "b4um86eghhds6nea196smvmlo4ors995"),
        ] {
            assert_eq!(nsec3_hash(&name(input), ITERATIONS, SALT), expected);
        }
    }

    #[test]
    fn hash_downcases_its_input() {
        assert_eq!(
            nsec3_hash(&name("A.Example."), ITERATIONS, SALT),
            nsec3_hash(&name("a.example."), ITERATIONS, SALT),
        );
    }

    #[test]
    fn hash_without_salt_differs() {
        assert_ne!(
            nsec3_hash(&name("example."), ITERATIONS, b""),
            nsec3_hash(&name("example."), ITERATIONS, SALT),
        );
    }

    /// Builds an NSEC3-signed zone whose NSEC3 records sit at the
    /// hashes of the given names (using the RFC 5155 example
    /// parameters).
    fn nsec3_zone(hashed_names: &[&str]) -> Zone {
        let mut zone = Zone::new(name("example."), Class::IN);
        zone.add(
            &name("example."),
            Type::SOA,
            Class::IN,
            Ttl::from(3600),
            <&Rdata>::try_from(b"fake-soa-rdata".as_slice()).unwrap(),
        )
        .unwrap();
        for hashed_name in hashed_names {
            let hash = nsec3_hash(&name(hashed_name), ITERATIONS, SALT);
            let owner = name(&format!("{}.example.", hash));
            // NSEC3 RDATA: SHA-1, no flags, 12 iterations, salt
            // AABBCCDD; the next-hash and bitmap tail is opaque to the
            // lookup core.
            let mut rdata = b"\x01\x00\x00\x0c\x04\xaa\xbb\xcc\xdd".to_vec();
            rdata.extend_from_slice(b"\x14AAAAAAAAAAAAAAAAAAAA\x00");
            zone.add(
                &owner,
                Type::NSEC3,
                Class::IN,
                Ttl::from(3600),
                <&Rdata>::try_from(rdata.as_slice()).unwrap(),
            )
            .unwrap();
        }
        zone
    }

    fn proof_owner(proof: &AnswerRrset) -> Name {
        proof.owner.as_ref().clone()
    }

    fn hash_owner(of: &str) -> Name {
        name(&format!(
            "{}.example.",
            nsec3_hash(&name(of), ITERATIONS, SALT),
        ))
    }

    #[test]
    fn find_nsec3_requires_an_nsec3_zone() {
        let zone = Zone::new(name("example."), Class::IN);
        assert!(matches!(
            zone.find_nsec3(&name("a.example."), true),
            Err(Error::NotNsec3Signed),
        ));
    }

    #[test]
    fn find_nsec3_rejects_out_of_zone_names() {
        let zone = nsec3_zone(&["example."]);
        assert!(matches!(
            zone.find_nsec3(&name("other."), true),
            Err(Error::OutOfZone),
        ));
    }

    #[test]
    fn exact_match_on_the_first_probe_has_no_next_proof() {
        let zone = nsec3_zone(&["example.", "a.example."]);
        let result = zone.find_nsec3(&name("a.example."), true).unwrap();
        assert!(result.matched);
        assert_eq!(result.closest_labels, 3);
        assert_eq!(
            proof_owner(&result.closest_proof.unwrap()),
            hash_owner("a.example."),
        );
        assert!(result.next_proof.is_none());
    }

    #[test]
    fn recursive_search_finds_the_closest_encloser() {
        // From RFC 5155 Appendix B.2.1: for a query below
        // x.w.example., the closest encloser is x.w.example. and the
        // next closer name c.x.w.example. hashes between the hashes of
        // example. and ns1.example., so the covering NSEC3 is the one
        // at example.'s hash.
        let zone = nsec3_zone(&["example.", "ns1.example.", "x.w.example."]);
        let result = zone.find_nsec3(&name("a.c.x.w.example."), true).unwrap();
        assert!(result.matched);
        assert_eq!(result.closest_labels, name("x.w.example.").len() as u8);
        assert_eq!(
            proof_owner(&result.closest_proof.unwrap()),
            hash_owner("x.w.example."),
        );
        assert_eq!(
            proof_owner(&result.next_proof.unwrap()),
            hash_owner("example."),
        );
    }

    #[test]
    fn non_recursive_search_returns_the_covering_proof() {
        let zone = nsec3_zone(&["example.", "ns1.example.", "x.w.example."]);
        let result = zone.find_nsec3(&name("c.x.w.example."), false).unwrap();
        assert!(!result.matched);
        assert_eq!(result.closest_labels, name("c.x.w.example.").len() as u8);
        assert_eq!(
            proof_owner(&result.closest_proof.unwrap()),
            hash_owner("example."),
        );
        assert!(result.next_proof.is_none());
    }

    #[test]
    fn covering_wraps_in_both_directions() {
        // Store two hashes and probe names whose hashes sort before
        // the smallest, between the two, and after the largest. The
        // candidates are found by hashing; the hash function itself is
        // verified against the RFC vectors above.
        let stored = ["a.example.", "ai.example."];
        let zone = nsec3_zone(&stored);
        let low = nsec3_hash(&name(stored[0]), ITERATIONS, SALT);
        let high = nsec3_hash(&name(stored[1]), ITERATIONS, SALT);
        assert!(low < high);

        let mut before = None;
        let mut between = None;
        let mut after = None;
        for i in 0.. {
            let candidate = format!("candidate{}.example.", i);
            let hash = nsec3_hash(&name(&candidate), ITERATIONS, SALT);
            if hash < low {
                before.get_or_insert(candidate);
            } else if hash > low && hash < high {
                between.get_or_insert(candidate);
            } else if hash > high {
                after.get_or_insert(candidate);
            }
            if before.is_some() && between.is_some() && after.is_some() {
                break;
            }
        }

        // Sorting before everything wraps to the largest hash.
        let result = zone.find_nsec3(&name(&before.unwrap()), false).unwrap();
        assert_eq!(
            proof_owner(&result.closest_proof.unwrap()),
            hash_owner(stored[1]),
        );

        // Sorting after everything also wraps to the largest hash.
        let result = zone.find_nsec3(&name(&after.unwrap()), false).unwrap();
        assert_eq!(
            proof_owner(&result.closest_proof.unwrap()),
            hash_owner(stored[1]),
        );

        // In between, the smaller neighbour covers.
        let result = zone.find_nsec3(&name(&between.unwrap()), false).unwrap();
        assert_eq!(
            proof_owner(&result.closest_proof.unwrap()),
            hash_owner(stored[0]),
        );
    }

    #[test]
    fn a_missing_origin_hash_is_a_broken_zone() {
        // The origin's own hash is absent, so a recursive search can
        // never terminate with a match.
        let zone = nsec3_zone(&["a.example."]);
        assert!(matches!(
            zone.find_nsec3(&name("b.example."), true),
            Err(Error::BrokenNsec3Zone),
        ));
    }
}
