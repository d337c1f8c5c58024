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

//! An authoritative in-memory DNS zone lookup core.
//!
//! A nameserver answers a query in two conceptual steps ([RFC 1034
//! § 4.3.2]): first it selects the zone that is the nearest ancestor
//! of the query name, then it searches that zone for the query name
//! and type. This crate implements the second step. Given a
//! pre-loaded [`Zone`](zone::Zone), [`Zone::find`](zone::Zone::find)
//! classifies a query as a success, a CNAME or DNAME redirection, a
//! delegation toward a child zone, or one of the negative outcomes,
//! honoring wildcard semantics ([RFC 4592]) along the way. For signed
//! zones it also selects the denial-of-existence proofs: NSEC
//! witnesses ([RFC 4035]) are attached to negative answers, and
//! [`Zone::find_nsec3`](zone::Zone::find_nsec3) performs the hashed
//! closest-encloser search of [RFC 5155].
//!
//! The crate is a library with no network surface: zone selection,
//! message parsing and construction, and transports are the calling
//! server's business. A loaded [`Zone`](zone::Zone) is immutable and
//! lookups take shared references, so any number of worker threads
//! may query the same zone concurrently without coordination.
//!
//! [RFC 1034 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-4.3.2
//! [RFC 4035]: https://datatracker.ietf.org/doc/html/rfc4035
//! [RFC 4592]: https://datatracker.ietf.org/doc/html/rfc4592
//! [RFC 5155]: https://datatracker.ietf.org/doc/html/rfc5155

pub mod class;
pub mod name;
pub mod rr;
pub mod zone;
