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

//! Implementation of the [`Class`] type for DNS classes.

use std::fmt;

/// Represents a class in the DNS.
///
/// A class is represented on the wire as an unsigned 16-bit integer, so
/// this is basically a wrapper around [`u16`] with nice
/// [`Debug`](fmt::Debug) and [`Display`](fmt::Display) implementations,
/// as well as constants for the defined classes. The only class in
/// common use is [`IN`](Class::IN).
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Class(u16);

impl Class {
    // RFC 1035. We don't include CS because it's no longer listed by
    // the IANA.
    pub const IN: Self = Self(1);
    pub const CH: Self = Self(3);
    pub const HS: Self = Self(4);
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class(value)
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        class.0
    }
}

/// Classes are displayed using their IANA mnemonics when defined, and
/// with the generic `CLASSn` notation of [RFC 3597 § 5] otherwise.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::IN => f.write_str("IN"),
            Self::CH => f.write_str("CH"),
            Self::HS => f.write_str("HS"),
            Self(value) => write!(f, "CLASS{}", value),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_mnemonics() {
        assert_eq!(Class::IN.to_string(), "IN");
        assert_eq!(Class::CH.to_string(), "CH");
    }

    #[test]
    fn display_falls_back_to_rfc_3597() {
        assert_eq!(Class::from(65280).to_string(), "CLASS65280");
    }
}
