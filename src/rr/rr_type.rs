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

//! Provides the [`Type`] structure for DNS RR types.

use std::fmt;

/// Represents the RR type of a DNS record.
///
/// An RR type is represented on the wire as an unsigned 16-bit integer.
/// Hence this is basically a wrapper around `u16` with nice
/// [`Debug`](fmt::Debug) and [`Display`](fmt::Display) implementations
/// for working with the common textual representations of RR types. In
/// addition, constants for the RR types the lookup process treats
/// specially (e.g. [`Type::NS`]) are provided.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

impl Type {
    pub const A: Type = Type(1);
    pub const NS: Type = Type(2);
    pub const MD: Type = Type(3);
    pub const MF: Type = Type(4);
    pub const CNAME: Type = Type(5);
    pub const SOA: Type = Type(6);
    pub const MB: Type = Type(7);
    pub const MG: Type = Type(8);
    pub const MR: Type = Type(9);
    pub const PTR: Type = Type(12);
    pub const HINFO: Type = Type(13);
    pub const MINFO: Type = Type(14);
    pub const MX: Type = Type(15);
    pub const TXT: Type = Type(16);
    pub const AAAA: Type = Type(28);
    pub const SRV: Type = Type(33);
    pub const DNAME: Type = Type(39);
    pub const DS: Type = Type(43);
    pub const RRSIG: Type = Type(46);
    pub const NSEC: Type = Type(47);
    pub const DNSKEY: Type = Type(48);
    pub const NSEC3: Type = Type(50);
    pub const NSEC3PARAM: Type = Type(51);

    /// The `*` QTYPE of [RFC 1035 § 3.2.3], requesting all records.
    /// This is a question-only type; no RRset ever bears it.
    ///
    /// [RFC 1035 § 3.2.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.3
    pub const ANY: Type = Type(255);
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

/// Types are displayed using their IANA mnemonics when known, and with
/// the generic `TYPEn` notation of [RFC 3597 § 5] otherwise.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::A => f.write_str("A"),
            Self::NS => f.write_str("NS"),
            Self::MD => f.write_str("MD"),
            Self::MF => f.write_str("MF"),
            Self::CNAME => f.write_str("CNAME"),
            Self::SOA => f.write_str("SOA"),
            Self::MB => f.write_str("MB"),
            Self::MG => f.write_str("MG"),
            Self::MR => f.write_str("MR"),
            Self::PTR => f.write_str("PTR"),
            Self::HINFO => f.write_str("HINFO"),
            Self::MINFO => f.write_str("MINFO"),
            Self::MX => f.write_str("MX"),
            Self::TXT => f.write_str("TXT"),
            Self::AAAA => f.write_str("AAAA"),
            Self::SRV => f.write_str("SRV"),
            Self::DNAME => f.write_str("DNAME"),
            Self::DS => f.write_str("DS"),
            Self::RRSIG => f.write_str("RRSIG"),
            Self::NSEC => f.write_str("NSEC"),
            Self::DNSKEY => f.write_str("DNSKEY"),
            Self::NSEC3 => f.write_str("NSEC3"),
            Self::NSEC3PARAM => f.write_str("NSEC3PARAM"),
            Self::ANY => f.write_str("ANY"),
            Self(value) => write!(f, "TYPE{}", value),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
