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

//! Deferred additional-section processing.
//!
//! The names embedded in an answer's RDATA (nameserver names, mail
//! exchanges, service targets) often have address records in the same
//! zone that belong in a response's additional section. A
//! [`FindContext`] keeps a reference to the node and RRset it found so
//! this data can be gathered lazily, after the primary lookup, with
//! [`FindContext::get_additional`]. Gathering it never changes the
//! primary answer.

use crate::name::Name;
use crate::rr::{Rrset, Type};

use super::find::{find_node, materialize_rrset, AnswerRrset, FindContext, FindOptions, FindResult};
use super::tree::SearchPath;

impl<'a> FindContext<'a> {
    /// Looks up the additional data for this context's answer: for
    /// every name in the answer RRset's RDATA that is subject to
    /// additional processing, the RRsets of the requested types at
    /// that name. For a type-ANY answer, every RRset of the found node
    /// is processed.
    ///
    /// Names outside the zone are skipped, as are names at or below
    /// zone cuts — except that nameserver addresses for a delegation
    /// are looked up in glue mode, so glue below the cut is found. A
    /// name matched through a wildcard yields RRsets under the name
    /// actually looked up.
    pub fn get_additional(&self, requested_types: &[Type]) -> Vec<AnswerRrset<'a>> {
        let mut result = Vec::new();
        if let Some(rrset) = self.found_rrset {
            // Normal query with a successful (or delegation) result.
            self.additional_for_rrset(rrset, requested_types, &mut result);
        } else if self.result == FindResult::Success {
            // Successful type-ANY query result: process each RRset of
            // the node.
            if let Some(node) = self.found_node {
                for rrset in self.zone.tree().node(node).rrsets.iter() {
                    self.additional_for_rrset(rrset, requested_types, &mut result);
                }
            }
        }
        result
    }

    fn additional_for_rrset(
        &self,
        rrset: &'a Rrset,
        requested_types: &[Type],
        result: &mut Vec<AnswerRrset<'a>>,
    ) {
        let options = FindOptions {
            dnssec: self.options.dnssec,
            // For NS records we need to be able to find glue below the
            // cut the records themselves create.
            glue_ok: rrset.rr_type == Type::NS,
            no_wildcard: false,
        };
        for rdata in rrset.rdatas.iter() {
            for additional_name in rdata.referenced_names(rrset.rr_type) {
                self.find_additional(&additional_name, requested_types, options, result);
            }
        }
    }

    fn find_additional(
        &self,
        additional_name: &Name,
        requested_types: &[Type],
        options: FindOptions,
        result: &mut Vec<AnswerRrset<'a>>,
    ) {
        // Ignore out-of-zone names.
        if !additional_name.eq_or_subdomain_of(self.zone.name()) {
            return;
        }

        // We only need non-empty exact matches.
        let mut path = SearchPath::new();
        let node_result = match find_node(self.zone, additional_name, &mut path, options) {
            Ok(node_result) if node_result.code == FindResult::Success => node_result,
            _ => return,
        };
        let node_id = node_result.node.expect("a successful search has a node");
        let node = self.zone.tree().node(node_id);

        // Ignore data at a zone cut unless glue is allowed.
        if !options.glue_ok && node.callback && node_id != self.zone.tree().root() {
            return;
        }

        // If the additional name was matched through a wildcard, the
        // RRsets are materialized under the name actually looked up.
        let realname = if node_result.wildcard {
            Some(additional_name)
        } else {
            None
        };
        for rrset in node.rrsets.iter() {
            if requested_types.contains(&rrset.rr_type) {
                if let Some(answer) = materialize_rrset(
                    self.zone.tree(),
                    Some(node_id),
                    Some(rrset),
                    options.dnssec,
                    realname,
                ) {
                    result.push(answer);
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
