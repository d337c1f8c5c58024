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

//! Implementation of authoritative lookups, as described in
//! [RFC 1034 § 4.3.2] and clarified by [RFC 4592].
//!
//! [`Zone::find`] searches a zone for a (name, type) pair and
//! classifies the outcome: a plain success, a delegation toward a
//! child zone, a CNAME or DNAME redirection, a name that exists
//! without the requested type, or a name that does not exist at all.
//! The search must reconcile, in a single pass over the zone's tree,
//! wildcards and their cancellation by empty non-terminals, zone cuts
//! (with an escape hatch for glue lookups), DNAME precedence over NS
//! at the apex, and DS queries that must not be treated as
//! delegations. For signed zones, negative answers additionally carry
//! the NSEC record that proves them (NSEC3 proofs are produced
//! separately; see [`Zone::find_nsec3`]).
//!
//! The work splits into two stages, mirroring the tree/classifier
//! split. `find_node` drives the tree search with a callback that
//! watches for delegation points and classifies the stop reason;
//! `find_internal` turns the stopped search plus the query type into
//! the final [`FindContext`].
//!
//! [RFC 1034 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-4.3.2
//! [RFC 4592]: https://datatracker.ietf.org/doc/html/rfc4592

use std::borrow::Cow;

use log::debug;

use crate::name::{Label, Name, NameRelation};
use crate::rr::{RdataSet, Rrset, Ttl, Type};

use super::tree::{NameTree, NodeId, SearchPath, TreeFindResult, TreeNode};
use super::{Error, Signing, Zone};

////////////////////////////////////////////////////////////////////////
// OPTIONS, RESULT CODES, AND FLAGS                                   //
////////////////////////////////////////////////////////////////////////

/// Options provided to [`Zone::find`], [`Zone::find_all`], and
/// [`FindContext::get_additional`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FindOptions {
    /// Do not treat zone cuts as delegations; descend below them. Use
    /// this to search for glue records.
    pub glue_ok: bool,

    /// Populate NSEC witnesses (and include RRSIGs in materialized
    /// RRsets) for DNSSEC-aware responses.
    pub dnssec: bool,

    /// Suppress wildcard synthesis.
    pub no_wildcard: bool,
}

/// The classification of a lookup's outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FindResult {
    /// The desired node (and, for [`Zone::find`], RRset) was found.
    Success,

    /// The looked-up name is at or below a zone cut; the answer is the
    /// cut's NS RRset.
    Delegation,

    /// The looked-up name does not exist in the zone.
    NxDomain,

    /// The looked-up name exists, but it has no RRset of the desired
    /// type.
    NxRrset,

    /// No RRset of the desired type was found, but the name has a
    /// CNAME.
    Cname,

    /// An ancestor of the looked-up name bears a DNAME redirection.
    Dname,
}

/// Supplemental information attached to a [`FindContext`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResultFlags {
    /// The answer was synthesized from a wildcard.
    pub wildcard: bool,

    /// The zone is NSEC-signed (attached to negative and wildcard
    /// results).
    pub nsec_signed: bool,

    /// The zone is NSEC3-signed (attached to negative and wildcard
    /// results).
    pub nsec3_signed: bool,
}

////////////////////////////////////////////////////////////////////////
// MATERIALIZED RRSETS                                                //
////////////////////////////////////////////////////////////////////////

/// An RRset materialized from a zone for inclusion in a response.
///
/// The owner is borrowed from the zone when it is the owning node's
/// name, and owned when wildcard substitution renamed it to the query
/// name. `sigs` carries the covering RRSIG RDATA when the lookup was
/// DNSSEC-aware and the RRset is signed.
#[derive(Clone, Debug)]
pub struct AnswerRrset<'a> {
    pub owner: Cow<'a, Name>,
    pub rr_type: Type,
    pub ttl: Ttl,
    pub rdatas: &'a RdataSet,
    pub sigs: Option<&'a RdataSet>,
}

/// Creates an [`AnswerRrset`] for the given RRset at the given node.
///
/// If `realname` is given, the RRset is created with that owner (e.g.
/// for wildcard substitution). Returns `None` if node or RRset is
/// absent.
pub(super) fn materialize_rrset<'a>(
    tree: &'a NameTree,
    node: Option<NodeId>,
    rrset: Option<&'a Rrset>,
    dnssec: bool,
    realname: Option<&Name>,
) -> Option<AnswerRrset<'a>> {
    let node = node?;
    let rrset = rrset?;
    let owner = match realname {
        Some(realname) => Cow::Owned(realname.clone()),
        None => Cow::Borrowed(tree.node(node).name()),
    };
    let sigs = if dnssec && !rrset.sigs.is_empty() {
        Some(rrset.sigs.as_ref())
    } else {
        None
    };
    Some(AnswerRrset {
        owner,
        rr_type: rrset.rr_type,
        ttl: rrset.ttl,
        rdatas: &rrset.rdatas,
        sigs,
    })
}

////////////////////////////////////////////////////////////////////////
// FIND CONTEXTS                                                      //
////////////////////////////////////////////////////////////////////////

/// The result of a lookup: the outcome classification, the answer
/// RRset (when one applies — for negative DNSSEC-aware results this is
/// the NSEC witness), and the result flags.
///
/// A `FindContext` borrows the zone it was produced from, keeping a
/// reference to the found node so that additional-section data can be
/// gathered after the fact with [`FindContext::get_additional`].
#[derive(Debug)]
pub struct FindContext<'a> {
    pub result: FindResult,
    pub answer: Option<AnswerRrset<'a>>,
    pub flags: ResultFlags,
    pub(super) zone: &'a Zone,
    pub(super) options: FindOptions,
    pub(super) found_node: Option<NodeId>,
    pub(super) found_rrset: Option<&'a Rrset>,
}

/// Assembles a [`FindContext`], attaching wildcard and signing flags.
///
/// The signing flags are set on negative and wildcard results
/// regardless of whether DNSSEC data was requested; callers that did
/// not ask for it simply ignore them. If `wild` is set and `qname` is
/// given, the answer RRset is materialized under the query name
/// instead of the matched node's name.
fn create_find_result<'a>(
    zone: &'a Zone,
    code: FindResult,
    rrset: Option<&'a Rrset>,
    node: Option<NodeId>,
    options: FindOptions,
    wild: bool,
    qname: Option<&Name>,
) -> FindContext<'a> {
    let mut flags = ResultFlags {
        wildcard: wild,
        ..ResultFlags::default()
    };
    if code == FindResult::NxRrset || code == FindResult::NxDomain || wild {
        match zone.signing() {
            Signing::Nsec3 => flags.nsec3_signed = true,
            Signing::Nsec => flags.nsec_signed = true,
            Signing::Unsigned => (),
        }
    }
    // Only rename to the query name for wildcard substitution.
    let rename = if wild { qname } else { None };
    let answer = materialize_rrset(zone.tree(), node, rrset, options.dnssec, rename);
    FindContext {
        result: code,
        answer,
        flags,
        zone,
        options,
        found_node: node,
        found_rrset: rrset,
    }
}

////////////////////////////////////////////////////////////////////////
// NSEC WITNESS SELECTION                                             //
////////////////////////////////////////////////////////////////////////

/// Searches the zone for the "closest" NSEC corresponding to the
/// search context stored in `path` (which identifies the previous name
/// of the query name in the zone). The immediate closest name may not
/// have NSEC (e.g. glue under a zone cut), so the search continues
/// backward until a name that has NSEC is found.
///
/// If the zone is not NSEC-signed or DNSSEC records were not requested,
/// this doesn't bother to find NSEC and simply returns nothing. So, by
/// definition of "NSEC-signed", when it really tries to find an NSEC
/// it must succeed: there is one at least at the zone origin.
fn closest_nsec<'a>(
    zone: &'a Zone,
    path: &mut SearchPath,
    options: FindOptions,
) -> (Option<NodeId>, Option<&'a Rrset>) {
    if zone.signing() != Signing::Nsec || !options.dnssec {
        return (None, None);
    }
    while let Some(prev) = zone.tree().previous_node(path) {
        let node = zone.tree().node(prev);
        if !node.is_empty() {
            if let Some(found) = node.rrsets.lookup(Type::NSEC) {
                return (Some(prev), Some(found));
            }
        }
    }
    unreachable!("an NSEC-signed zone carries an NSEC RRset at its apex");
}

/// For the NXRRSET case: if the zone is NSEC-signed and DNSSEC records
/// are requested, returns the NSEC RRset on the given node, if any.
fn nsec_for_nxrrset<'a>(zone: &'a Zone, options: FindOptions, node: NodeId) -> Option<&'a Rrset> {
    if zone.signing() == Signing::Nsec && options.dnssec {
        zone.tree().node(node).rrsets.lookup(Type::NSEC)
    } else {
        None
    }
}

////////////////////////////////////////////////////////////////////////
// TREE SEARCH AND STOP CLASSIFICATION                                //
////////////////////////////////////////////////////////////////////////

/// Intermediate search state recorded by the cut callback: the highest
/// zone cut and/or DNAME node seen during descent.
#[derive(Default)]
struct FindState {
    zonecut: Option<NodeId>,
    dname: Option<NodeId>,
}

/// The callback invoked on delegation-point candidates during descent.
/// The search state is passed explicitly; a `true` return stops the
/// descent.
fn cut_callback(id: NodeId, node: &TreeNode, state: &mut FindState, glue_ok: bool) -> bool {
    // DNAME first: there's an allowed case where DNAME and NS coexist
    // in the apex, and the DNAME is the one to notice (the NS is
    // authoritative, not delegation).
    if node.rrsets.lookup(Type::DNAME).is_some() {
        debug!("encountered a DNAME during descent");
        state.dname = Some(id);
        return true;
    }
    if node.rrsets.lookup(Type::NS).is_some() {
        // Only the highest zone cut counts in the rare case of nested
        // zone cuts.
        if state.zonecut.is_some() {
            return false;
        }
        debug!("encountered a zone cut during descent");
        state.zonecut = Some(id);
        // Unless glue is allowed, the search stops here.
        return !glue_ok;
    }
    unreachable!("search callback fired on a node with neither NS nor DNAME");
}

/// The result of `find_node`, handed off to `find_internal`.
pub(super) struct FindNodeResult<'a> {
    pub(super) code: FindResult,
    pub(super) node: Option<NodeId>,
    pub(super) rrset: Option<&'a Rrset>,
    /// The search resulted in a wildcard match.
    pub(super) wildcard: bool,
    /// The search encountered a zone cut due to NS but continued to
    /// look for glue.
    pub(super) zonecut: bool,
}

/// Identifies the node that best matches `name` in terms of DNS query
/// handling.
///
/// An exact match is obviously the best one. The partial-match case is
/// a priority ladder, and the order is load-bearing:
///
/// 1. A DNAME seen during descent wins, even over a zone cut seen in
///    glue-OK mode (and over NS at the apex, the corner case of
///    [RFC 6672 § 2.4]).
/// 2. A zone cut seen during descent produces a delegation.
/// 3. If the search stopped at a node *below* the target name (the
///    last comparison is `Superdomain`), the target exists as an empty
///    non-terminal: it has no data, but it must not fall through to
///    the wildcard check, per RFC 1034 § 4.3.3.
/// 4. If the stop node is a wildcard parent (and wildcards are not
///    disabled): a stop that shares a label run with an existing name
///    below the stop node (a `CommonAncestor` comparison with common
///    labels) means an empty non-terminal between the wildcard and the
///    query exists, which *cancels* the wildcard ([RFC 4592]); any
///    other stop synthesizes the wildcard by looking up
///    `*.<stop node>`, which must exist.
/// 5. Otherwise the name does not exist.
///
/// [RFC 4592]: https://datatracker.ietf.org/doc/html/rfc4592
/// [RFC 6672 § 2.4]: https://datatracker.ietf.org/doc/html/rfc6672#section-2.4
pub(super) fn find_node<'a>(
    zone: &'a Zone,
    name: &Name,
    path: &mut SearchPath,
    options: FindOptions,
) -> Result<FindNodeResult<'a>, Error> {
    let tree = zone.tree();
    let mut state = FindState::default();
    let glue_ok = options.glue_ok;

    let result = tree.find_with(name, path, |id, node| {
        cut_callback(id, node, &mut state, glue_ok)
    });
    match result {
        TreeFindResult::Exact(node) => Ok(FindNodeResult {
            code: FindResult::Success,
            node: Some(node),
            rrset: None,
            wildcard: false,
            zonecut: state.zonecut.is_some(),
        }),
        TreeFindResult::Partial(stop) => {
            if let Some(dname_node) = state.dname {
                debug!("DNAME at {} redirects {}", tree.node(dname_node).name(), name);
                return Ok(FindNodeResult {
                    code: FindResult::Dname,
                    node: Some(dname_node),
                    rrset: tree.node(dname_node).rrsets.lookup(Type::DNAME),
                    wildcard: false,
                    zonecut: false,
                });
            }
            if let Some(cut_node) = state.zonecut {
                debug!(
                    "zone cut at {} delegates {}",
                    tree.node(cut_node).name(),
                    name,
                );
                return Ok(FindNodeResult {
                    code: FindResult::Delegation,
                    node: Some(cut_node),
                    rrset: tree.node(cut_node).rrsets.lookup(Type::NS),
                    wildcard: false,
                    zonecut: false,
                });
            }
            let cmp = path
                .last_comparison()
                .expect("a partial match records its final comparison");
            if cmp.relation == NameRelation::Superdomain {
                // The search stopped below the target: the target is
                // an empty non-terminal.
                debug!("{} exists as an empty non-terminal", name);
                let (nsec_node, nsec_rrset) = closest_nsec(zone, path, options);
                return Ok(FindNodeResult {
                    code: FindResult::NxRrset,
                    node: nsec_node,
                    rrset: nsec_rrset,
                    wildcard: false,
                    zonecut: false,
                });
            }

            // Nothing really matched. May be a wildcard, but check
            // only if not disabled.
            if tree.node(stop).wildcard_parent && !options.no_wildcard {
                if cmp.relation == NameRelation::CommonAncestor && cmp.common_labels > 0 {
                    // E.g. we have *.wild.example and bar.foo.wild.example
                    // and are looking for baz.foo.wild.example: the
                    // common ancestor foo.wild.example exists, which
                    // cancels the wildcard. Treat it as NXDOMAIN.
                    debug!("wildcard match for {} cancelled by an existing name", name);
                    let (nsec_node, nsec_rrset) = closest_nsec(zone, path, options);
                    return Ok(FindNodeResult {
                        code: FindResult::NxDomain,
                        node: nsec_node,
                        rrset: nsec_rrset,
                        wildcard: false,
                        zonecut: false,
                    });
                }
                let wildcard_name = tree
                    .node(stop)
                    .name()
                    .child(Label::asterisk())
                    .expect("a wildcard name fits within the name limits");
                // Clear the path so that we don't keep incorrect
                // (NSEC) context from the aborted search.
                path.clear();
                let result = tree.find_with(&wildcard_name, path, |id, node| {
                    cut_callback(id, node, &mut state, glue_ok)
                });
                let node = match result {
                    TreeFindResult::Exact(node) => node,
                    _ => unreachable!("a wildcard parent has a wildcard child"),
                };
                return Ok(FindNodeResult {
                    code: FindResult::Success,
                    node: Some(node),
                    rrset: None,
                    wildcard: true,
                    zonecut: state.zonecut.is_some(),
                });
            }

            debug!("{} does not exist in the zone", name);
            let (nsec_node, nsec_rrset) = closest_nsec(zone, path, options);
            Ok(FindNodeResult {
                code: FindResult::NxDomain,
                node: nsec_node,
                rrset: nsec_rrset,
                wildcard: false,
                zonecut: false,
            })
        }
        TreeFindResult::NotFound => Err(Error::OutOfZone),
    }
}

////////////////////////////////////////////////////////////////////////
// THE ANSWER CLASSIFIER                                              //
////////////////////////////////////////////////////////////////////////

/// Converts a `find_node` outcome plus the query type into the final
/// result. All non-success outcomes pass through unchanged; an exact
/// (or wildcard) match is classified against the node's data.
pub(super) fn find_internal<'a>(
    zone: &'a Zone,
    name: &Name,
    rr_type: Type,
    target: Option<&mut Vec<AnswerRrset<'a>>>,
    options: FindOptions,
) -> Result<FindContext<'a>, Error> {
    let mut path = SearchPath::new();
    let node_result = find_node(zone, name, &mut path, options)?;
    if node_result.code != FindResult::Success {
        return Ok(create_find_result(
            zone,
            node_result.code,
            node_result.rrset,
            node_result.node,
            options,
            false,
            None,
        ));
    }

    let node_id = node_result.node.expect("a successful search has a node");
    let wild = node_result.wildcard;
    if node_result.zonecut {
        debug!("{} matched below a zone cut (glue search)", name);
    }
    let node = zone.tree().node(node_id);

    // An exact match at an empty node is equivalent to NXRRSET.
    if node.is_empty() {
        debug!("{} exists but has no data", name);
        let (nsec_node, nsec_rrset) = closest_nsec(zone, &mut path, options);
        return Ok(create_find_result(
            zone,
            FindResult::NxRrset,
            nsec_rrset,
            nsec_node,
            options,
            wild,
            None,
        ));
    }

    // If the node callback is enabled, this may be a zone cut, and a
    // direct query for the cut name is a delegation like any other.
    // There are three exceptions: the apex (its NS is authoritative),
    // DS queries (which belong to the parent side of the cut), and
    // glue searches.
    if node.callback
        && !options.glue_ok
        && node_id != zone.tree().root()
        && rr_type != Type::DS
    {
        if let Some(found) = node.rrsets.lookup(Type::NS) {
            debug!("{} is a delegation point", name);
            return Ok(create_find_result(
                zone,
                FindResult::Delegation,
                Some(found),
                Some(node_id),
                options,
                wild,
                Some(name),
            ));
        }
    }

    // Handle type-ANY queries: push every RRset of the node into the
    // target. The answer RRset of the context itself stays empty; the
    // found node reference remains valid for additional processing.
    if let Some(target) = target {
        for rrset in node.rrsets.iter() {
            let answer =
                materialize_rrset(zone.tree(), Some(node_id), Some(rrset), options.dnssec, Some(name))
                    .expect("node and RRset are present");
            target.push(answer);
        }
        debug!("{} answered with all of its RRsets", name);
        return Ok(create_find_result(
            zone,
            FindResult::Success,
            None,
            Some(node_id),
            options,
            wild,
            Some(name),
        ));
    }

    if let Some(found) = node.rrsets.lookup(rr_type) {
        debug!("{} {} found", name, rr_type);
        return Ok(create_find_result(
            zone,
            FindResult::Success,
            Some(found),
            Some(node_id),
            options,
            wild,
            Some(name),
        ));
    }

    // Next, try CNAME.
    if let Some(found) = node.rrsets.lookup(Type::CNAME) {
        debug!("{} answered with a CNAME", name);
        return Ok(create_find_result(
            zone,
            FindResult::Cname,
            Some(found),
            Some(node_id),
            options,
            wild,
            Some(name),
        ));
    }

    // No exact match or CNAME. Get NSEC if necessary and return
    // NXRRSET.
    Ok(create_find_result(
        zone,
        FindResult::NxRrset,
        nsec_for_nxrrset(zone, options, node_id),
        Some(node_id),
        options,
        wild,
        Some(name),
    ))
}

////////////////////////////////////////////////////////////////////////
// PUBLIC LOOKUP METHODS                                              //
////////////////////////////////////////////////////////////////////////

impl Zone {
    /// Looks up records of the given type at the provided domain name.
    ///
    /// Fails with [`Error::OutOfZone`] if `name` is not within the
    /// zone; every other outcome (including negative answers) is a
    /// normal [`FindContext`].
    pub fn find<'a>(
        &'a self,
        name: &Name,
        rr_type: Type,
        options: FindOptions,
    ) -> Result<FindContext<'a>, Error> {
        find_internal(self, name, rr_type, None, options)
    }

    /// Looks up *all* records at the provided domain name, pushing
    /// each of the node's RRsets into `target`. The returned context
    /// has an empty answer but retains the found node, so additional
    /// data can still be gathered from it.
    pub fn find_all<'a>(
        &'a self,
        name: &Name,
        target: &mut Vec<AnswerRrset<'a>>,
        options: FindOptions,
    ) -> Result<FindContext<'a>, Error> {
        find_internal(self, name, Type::ANY, Some(target), options)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
