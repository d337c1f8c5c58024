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

//! Implementation of data structures related to domain names.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::str::FromStr;

use arrayvec::ArrayVec;

mod error;
mod label;
pub use error::Error;
pub use label::{Label, LabelBuf};

/// The maximum number of labels in a domain name.
const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A structure to represent an absolute domain name.
///
/// A `Name` owns its labels, stored leftmost (deepest) first; the final
/// label is always the null (root) label. `Name`s can be constructed
///
/// * through the [`FromStr`] implementation (presentation format with
///   [RFC 4343 § 2.1] escape sequences); and
/// * from uncompressed on-the-wire names through
///   [`Name::try_from_uncompressed`].
///
/// Comparisons between `Name`s are ASCII-case-insensitive, and the
/// [`Ord`] implementation employs the canonical ordering of
/// [RFC 4034 § 6.1]. In addition to the plain ordering, [`Name::compare`]
/// reports the hierarchical *relation* between two names (ancestor,
/// descendant, or diverging), which the zone lookup process depends on.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
#[derive(Clone)]
pub struct Name {
    labels: Box<[LabelBuf]>,
}

/// Private construction helpers.
impl Name {
    /// Builds a `Name` from accumulated labels, enforcing the RFC 1035
    /// size limits. The caller must supply at least the null root label
    /// in the final position.
    fn from_label_bufs(labels: Vec<LabelBuf>) -> Result<Self, Error> {
        assert!(matches!(labels.last(), Some(l) if l.is_null()));
        if labels.len() > MAX_N_LABELS {
            return Err(Error::NameTooLong);
        }
        let wire_len: usize = labels.iter().map(|l| l.len() + 1).sum();
        if wire_len > MAX_WIRE_LEN {
            return Err(Error::NameTooLong);
        }
        Ok(Self {
            labels: labels.into_boxed_slice(),
        })
    }
}

////////////////////////////////////////////////////////////////////////
// NAME PUBLIC API                                                    //
////////////////////////////////////////////////////////////////////////

#[allow(clippy::len_without_is_empty)] // A domain name is never empty!
impl Name {
    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        self.len() >= other.len()
            && self
                .labels()
                .rev()
                .zip(other.labels().rev())
                .all(|(a, b)| a == b)
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.labels.len() == 1
    }

    /// Returns whether the `Name` is a wildcard domain name (i.e.,
    /// whether its first label is `*`).
    pub fn is_wildcard(&self) -> bool {
        self[0].is_asterisk()
    }

    /// Returns an iterator over labels in this `Name`.
    pub fn labels(&self) -> impl DoubleEndedIterator<Item = &Label> + ExactSizeIterator {
        self.labels.iter().map(|l| -> &Label { l })
    }

    /// Returns the number of labels in this `Name` (the root label
    /// included).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns a `Name` representing the DNS root, `.`.
    pub fn root() -> Self {
        Self {
            labels: vec![Label::null().to_owned()].into_boxed_slice(),
        }
    }

    /// Returns the superdomain obtained by skipping the first `skip`
    /// labels of the `Name`, or `None` if there aren't enough labels.
    pub fn superdomain(&self, skip: usize) -> Option<Self> {
        if skip < self.len() {
            Some(Self {
                labels: self.labels[skip..].to_vec().into_boxed_slice(),
            })
        } else {
            None
        }
    }

    /// Returns the domain name one level below this one, produced by
    /// prepending `label`. This fails if the resulting name would
    /// exceed the RFC 1035 size limits.
    pub fn child(&self, label: &Label) -> Result<Self, Error> {
        if label.is_null() {
            return Err(Error::NullNonTerminal);
        }
        let mut labels = Vec::with_capacity(self.len() + 1);
        labels.push(label.to_owned());
        labels.extend(self.labels.iter().cloned());
        Self::from_label_bufs(labels)
    }

    /// Tries to parse an uncompressed name present at the start of the
    /// provided buffer. The name need not occupy the entire buffer;
    /// extra data is ignored. If the name is valid, a new `Name` is
    /// returned along with the length of the name in octets.
    pub fn try_from_uncompressed(octets: &[u8]) -> Result<(Self, usize), Error> {
        let mut labels = ArrayVec::<LabelBuf, MAX_N_LABELS>::new();
        let mut offset = 0;
        loop {
            let label_len = *octets.get(offset).ok_or(Error::UnexpectedEom)? as usize;
            if label_len > MAX_LABEL_LEN {
                return Err(Error::LabelTooLong);
            }
            let end = offset + 1 + label_len;
            if end > MAX_WIRE_LEN {
                return Err(Error::NameTooLong);
            }
            let label_octets = octets.get(offset + 1..end).ok_or(Error::UnexpectedEom)?;
            labels
                .try_push(LabelBuf::try_from(label_octets)?)
                .map_err(|_| Error::NameTooLong)?;
            offset = end;
            if label_len == 0 {
                break;
            }
        }
        let name = Self::from_label_bufs(labels.to_vec())?;
        Ok((name, offset))
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.wire_len());
        for label in self.labels.iter() {
            wire.push(label.len() as u8);
            wire.extend_from_slice(label.octets());
        }
        wire
    }

    /// Returns the on-the-wire representation of the `Name` with all
    /// ASCII letters made lowercase. This is the canonical form of
    /// [RFC 4034 § 6.2], used when computing NSEC3 hashes.
    ///
    /// [RFC 4034 § 6.2]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.2
    pub fn lowercase_wire_repr(&self) -> Vec<u8> {
        let mut wire = self.wire_repr();
        // Length octets are at most 63, below the ASCII uppercase
        // range, so lowercasing the whole buffer only touches label
        // octets.
        wire.make_ascii_lowercase();
        wire
    }

    /// Returns the length (in octets) of the on-the-wire representation
    /// of the `Name`.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum()
    }

    /// Compares this `Name` with `other`, reporting both the canonical
    /// ordering and the hierarchical relation between the two names.
    pub fn compare(&self, other: &Name) -> NameComparison {
        let mut common_labels = 0;
        for (a, b) in self.labels().rev().zip(other.labels().rev()) {
            match a.cmp(b) {
                Ordering::Equal => common_labels += 1,
                order => {
                    return NameComparison {
                        relation: NameRelation::CommonAncestor,
                        order,
                        common_labels,
                    }
                }
            }
        }
        let order = self.len().cmp(&other.len());
        let relation = match order {
            Ordering::Equal => NameRelation::Equal,
            Ordering::Less => NameRelation::Superdomain,
            Ordering::Greater => NameRelation::Subdomain,
        };
        NameComparison {
            relation,
            order,
            common_labels,
        }
    }

    /// Provides slice access to the `Name`'s labels for the zone tree.
    pub(crate) fn as_label_slice(&self) -> &[LabelBuf] {
        &self.labels
    }
}

impl Index<usize> for Name {
    type Output = Label;

    fn index(&self, index: usize) -> &Self::Output {
        &self.labels[index]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.len() <= 1 {
            f.write_str(".")
        } else {
            // NOTE: the unwrap() is okay, since we never construct
            // Names with no labels. The trailing null label prints as
            // the final dot.
            let mut labels = self.labels();
            write!(f, "{}", labels.next().unwrap())?;
            for label in labels {
                write!(f, ".{}", label)?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.labels().zip(other.labels()).all(|(a, b)| a == b)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The [`Ord`] implementation for `Name` employs DNSSEC's canonical
/// ordering of domain names. Per [RFC 4034 § 6.1], `Name`s are ordered
/// as strings of labels read from right to left.
///
/// [RFC 4034 § 6.1]: https://datatracker.ietf.org/doc/html/rfc4034#section-6.1
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.labels()
            .rev()
            .zip(other.labels().rev())
            .find_map(|(a, b)| Some(a.cmp(b)).filter(|ordering| ordering.is_ne()))
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            label.hash(state);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// NAME COMPARISON RESULTS                                            //
////////////////////////////////////////////////////////////////////////

/// The hierarchical relation between two domain names, as reported by
/// [`Name::compare`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameRelation {
    /// The names are equal.
    Equal,

    /// The first name is a proper ancestor of the second.
    Superdomain,

    /// The first name is a proper descendant of the second.
    Subdomain,

    /// The names diverge below a (possibly trivial) common ancestor.
    CommonAncestor,
}

/// The result of [`Name::compare`]: the relation between the names, the
/// canonical ordering between them, and the number of labels they share
/// (counted from the root).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NameComparison {
    pub relation: NameRelation,
    pub order: Ordering,
    pub common_labels: usize,
}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Allows for conversion of a Rust [`str`] into a [`Name`]. The passed
/// string must be strictly ASCII. Escape sequences as defined by
/// [RFC 4343 § 2.1] are supported.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root());
        }

        let mut remaining_octets: &[u8] = s.as_ref();
        let mut labels = Vec::new();
        let mut current = ArrayVec::<u8, MAX_LABEL_LEN>::new();

        // NOTE: to check that the string is ASCII, it suffices to check
        // that each octet is ASCII as we go. This is because all
        // multi-byte characters start with an octet that is not ASCII.
        while let Some(&octet) = remaining_octets.first() {
            if octet == b'.' {
                if current.is_empty() {
                    return Err(Error::NullNonTerminal);
                }
                labels.push(LabelBuf::try_from(current.as_slice())?);
                current.clear();
                remaining_octets = &remaining_octets[1..];
            } else {
                let (value, consumed) = if octet == b'\\' {
                    let (value, consumed) = parse_escape(&remaining_octets[1..])?;
                    (value, consumed + 1)
                } else if !octet.is_ascii() {
                    return Err(Error::StrNotAscii);
                } else {
                    (octet, 1)
                };
                current.try_push(value).map_err(|_| Error::LabelTooLong)?;
                remaining_octets = &remaining_octets[consumed..];
            }
        }
        if !current.is_empty() {
            return Err(Error::NonNullTerminal);
        }
        labels.push(Label::null().to_owned());
        Self::from_label_bufs(labels)
    }
}

/// Parses an escape sequence. We expect `remaining_octets` to start
/// with the octet immediately *after* the backslash that introduces the
/// escape sequence.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    if remaining_octets.is_empty() {
        Err(Error::InvalidEscape)
    } else if remaining_octets[0].is_ascii_digit() {
        if remaining_octets.len() < 3
            || !remaining_octets[1].is_ascii_digit()
            || !remaining_octets[2].is_ascii_digit()
        {
            Err(Error::InvalidEscape)
        } else {
            let hundreds = (remaining_octets[0] - b'0') as usize;
            let tens = (remaining_octets[1] - b'0') as usize;
            let ones = (remaining_octets[2] - b'0') as usize;
            let value = 100 * hundreds + 10 * tens + ones;
            if value > 255 {
                Err(Error::InvalidEscape)
            } else {
                Ok((value as u8, 3))
            }
        }
    } else {
        Ok((remaining_octets[0], 1))
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn name(from: &str) -> Name {
        from.parse().unwrap()
    }

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 1);
        assert_eq!(root.wire_repr(), &[0]);
    }

    #[test]
    fn is_wildcard_works() {
        assert!(name("*.bailiwick.test.").is_wildcard());
        assert!(!name("bailiwick.test.").is_wildcard());
        assert!(name("*.*.bailiwick.test.").is_wildcard());
        assert!(!name("x.*.bailiwick.test.").is_wildcard());
    }

    #[test]
    fn superdomain_works() {
        let subdomain = name("subdomain.example.test.");
        assert_eq!(subdomain.superdomain(0), Some(subdomain.clone()));
        assert_eq!(subdomain.superdomain(1), Some(name("example.test.")));
        assert_eq!(subdomain.superdomain(2), Some(name("test.")));
        assert_eq!(subdomain.superdomain(3), Some(Name::root()));
        assert_eq!(subdomain.superdomain(4), None);
    }

    #[test]
    fn child_works() {
        let parent = name("example.test.");
        let label: &Label = b"www".as_slice().try_into().unwrap();
        assert_eq!(parent.child(label).unwrap(), name("www.example.test."));
        assert_eq!(
            parent.child(Label::asterisk()).unwrap(),
            name("*.example.test."),
        );
    }

    #[test]
    fn child_rejects_overlong_names() {
        let long: Name = "x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x."
            .parse()
            .unwrap();
        let label: &Label = b"x".as_slice().try_into().unwrap();
        assert_eq!(long.child(label), Err(Error::NameTooLong));
    }

    #[test]
    fn labels_iterator_works() {
        let name = name("a.b.example.test.");
        let mut labels = name.labels();
        assert_eq!(labels.next().unwrap().octets(), b"a");
        assert_eq!(labels.next().unwrap().octets(), b"b");
        assert_eq!(labels.next().unwrap().octets(), b"example");
        assert_eq!(labels.next().unwrap().octets(), b"test");
        assert_eq!(labels.next(), Some(Label::null()));
        assert_eq!(labels.next(), None);
    }

    #[test]
    fn eq_or_subdomain_of_works() {
        let subdomain = name("subdomain.example.test.");
        let domain = name("example.test.");
        let tld = name("test.");
        let root = Name::root();
        assert!(subdomain.eq_or_subdomain_of(&subdomain));
        assert!(subdomain.eq_or_subdomain_of(&domain));
        assert!(subdomain.eq_or_subdomain_of(&tld));
        assert!(subdomain.eq_or_subdomain_of(&root));
        assert!(!domain.eq_or_subdomain_of(&subdomain));
        assert!(domain.eq_or_subdomain_of(&domain));
        assert!(!root.eq_or_subdomain_of(&tld));

        let other_test = name("other.test.");
        assert!(!domain.eq_or_subdomain_of(&other_test));
        assert!(!other_test.eq_or_subdomain_of(&domain));
    }

    #[test]
    fn wire_repr_works() {
        assert_eq!(name("a.bb.ccc.").wire_repr(), b"\x01a\x02bb\x03ccc\x00");
    }

    #[test]
    fn lowercase_wire_repr_works() {
        assert_eq!(
            name("UPPERCASE.Domain.Test.").lowercase_wire_repr(),
            b"\x09uppercase\x06domain\x04test\x00",
        );
    }

    #[test]
    fn try_from_uncompressed_works() {
        let (parsed, len) = Name::try_from_uncompressed(b"\x03www\x04test\x00trailing").unwrap();
        assert_eq!(parsed, name("www.test."));
        assert_eq!(len, 10);
    }

    #[test]
    fn try_from_uncompressed_rejects_truncation() {
        assert_eq!(
            Name::try_from_uncompressed(b"\x03www\x04te"),
            Err(Error::UnexpectedEom),
        );
    }

    #[test]
    fn ord_works() {
        // This ordered list is from RFC 4034 § 6.1, which defines the
        // canonical ordering of domain names.
        let names: Vec<Name> = [
            "example.",
            "a.example.",
            "yljkjljk.a.example.",
            "Z.a.example.",
            "zABC.a.EXAMPLE.",
            "z.example.",
            "\\001.z.example.",
            "*.z.example.",
            "\\200.z.example.",
        ]
        .into_iter()
        .map(|n| n.parse().unwrap())
        .collect();

        for (i, ni) in names.iter().enumerate() {
            for (j, nj) in names.iter().enumerate() {
                assert_eq!(i.cmp(&j), ni.cmp(nj));
            }
        }
    }

    #[test]
    fn compare_reports_relations() {
        let apex = name("example.");
        let www = name("www.example.");
        let deep = name("a.www.example.");
        let sibling = name("mail.example.");

        let cmp = apex.compare(&apex);
        assert_eq!(cmp.relation, NameRelation::Equal);
        assert_eq!(cmp.order, Ordering::Equal);
        assert_eq!(cmp.common_labels, 2);

        let cmp = apex.compare(&www);
        assert_eq!(cmp.relation, NameRelation::Superdomain);
        assert_eq!(cmp.order, Ordering::Less);
        assert_eq!(cmp.common_labels, 2);

        let cmp = deep.compare(&www);
        assert_eq!(cmp.relation, NameRelation::Subdomain);
        assert_eq!(cmp.order, Ordering::Greater);
        assert_eq!(cmp.common_labels, 3);

        let cmp = www.compare(&sibling);
        assert_eq!(cmp.relation, NameRelation::CommonAncestor);
        assert_eq!(cmp.common_labels, 2);
        assert_eq!(cmp.order, Ordering::Greater); // www > mail
    }

    #[test]
    fn fromstr_works() {
        assert_eq!(name("example.test.").wire_repr(), b"\x07example\x04test\x00");
    }

    #[test]
    fn fromstr_works_for_root() {
        assert_eq!(name("."), Name::root());
    }

    #[test]
    fn fromstr_rejects_empty() {
        assert_eq!("".parse::<Name>(), Err(Error::StrEmpty));
    }

    #[test]
    fn fromstr_rejects_non_ascii() {
        assert_eq!("✈.aero.".parse::<Name>(), Err(Error::StrNotAscii));
    }

    #[test]
    fn fromstr_rejects_non_fqdn() {
        assert_eq!("non.fqdn".parse::<Name>(), Err(Error::NonNullTerminal));
    }

    #[test]
    fn fromstr_rejects_long_label() {
        assert_eq!(
            "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx."
                .parse::<Name>(),
            Err(Error::LabelTooLong)
        );
    }

    #[test]
    fn fromstr_rejects_long_name() {
        assert_eq!(
            "x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.\
             x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x.x."
                .parse::<Name>(),
            Err(Error::NameTooLong)
        );
    }

    #[test]
    fn fromstr_rejects_null_non_terminal() {
        assert_eq!("a.b..c.".parse::<Name>(), Err(Error::NullNonTerminal));
    }

    #[test]
    fn fromstr_escaping_works() {
        let escaped = name("\\000.\\\\\\..");
        assert_eq!(escaped.wire_repr(), b"\x01\x00\x02\\.\x00");
    }

    #[test]
    fn fromstr_rejects_invalid_escapes() {
        assert_eq!("\\00".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\00x.".parse::<Name>(), Err(Error::InvalidEscape));
        assert_eq!("\\256.".parse::<Name>(), Err(Error::InvalidEscape));
    }

    #[test]
    fn display_round_trips() {
        for text in ["example.test.", "*.wild.example.", "."] {
            assert_eq!(name(text).to_string(), text);
        }
    }
}
