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

//! The [`RdataSet`] and [`RdataSetOwned`] structures.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Deref;

use super::{Rdata, Type};

////////////////////////////////////////////////////////////////////////
// RDATASET STRUCTURE                                                 //
////////////////////////////////////////////////////////////////////////

/// Stores the RDATA for an RRset in a contiguous memory region.
///
/// This is designed to make it efficient to serve an RRset. In
/// particular, it allows many small RDATA (e.g. for an A RRset) to
/// reside in the same cache line.
///
/// The `RdataSet` structure is the borrowed view of stored RDATA and
/// can only be produced from the owned variant, [`RdataSetOwned`].
#[repr(transparent)]
pub struct RdataSet {
    inner: [u8],
}

impl RdataSet {
    /// Returns an iterator over the [`Rdata`] of this `RdataSet`.
    pub fn iter(&self) -> Iter {
        Iter {
            cursor: &self.inner,
        }
    }

    /// Returns the number of [`Rdata`] in this `RdataSet`.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Returns whether this `RdataSet` contains no [`Rdata`].
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ToOwned for RdataSet {
    type Owned = RdataSetOwned;

    fn to_owned(&self) -> Self::Owned {
        RdataSetOwned {
            inner: self.inner.into(),
        }
    }
}

impl fmt::Debug for RdataSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut list = f.debug_list();
        for rdata in self.iter() {
            list.entry(&format_args!("{:?}", rdata));
        }
        list.finish()
    }
}

////////////////////////////////////////////////////////////////////////
// RDATASET ITERATION                                                 //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Rdata`] of an [`RdataSet`].
pub struct Iter<'a> {
    cursor: &'a [u8],
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Rdata;

    fn next(&mut self) -> Option<Self::Item> {
        let len_octets: &[u8; 2] = self.cursor.get(0..2)?.try_into().ok()?;
        let len = u16::from_ne_bytes(*len_octets) as usize;
        if let Some(rdata) = self.cursor.get(2..len + 2) {
            self.cursor = &self.cursor[len + 2..];
            Some(Rdata::from_unchecked(rdata))
        } else {
            None
        }
    }
}

impl FusedIterator for Iter<'_> {}

////////////////////////////////////////////////////////////////////////
// OWNED RDATASET                                                     //
////////////////////////////////////////////////////////////////////////

/// The owned variant of [`RdataSet`].
#[derive(Clone, Default)]
pub struct RdataSetOwned {
    inner: Vec<u8>,
}

impl RdataSetOwned {
    /// Creates a new set initially containing no [`Rdata`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies an [`Rdata`] into this [`RdataSetOwned`]. The new
    /// [`Rdata`] is compared to the existing [`Rdata`] as if it were of
    /// the provided type (see [`Rdata::equals`]) and is not inserted if
    /// identical [`Rdata`] is already present. Returns whether the
    /// [`Rdata`] was inserted.
    pub fn insert(&mut self, rr_type: Type, rdata: &Rdata) -> bool {
        for existing_rdata in self.iter() {
            if rdata.equals(existing_rdata, rr_type) {
                return false;
            }
        }
        self.inner.reserve(2 + rdata.len());
        self.inner
            .extend_from_slice(&(rdata.len() as u16).to_ne_bytes());
        self.inner.extend_from_slice(rdata.octets());
        true
    }
}

impl Deref for RdataSetOwned {
    type Target = RdataSet;

    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.inner.as_slice() as *const [u8] as *const RdataSet) }
    }
}

impl Borrow<RdataSet> for RdataSetOwned {
    fn borrow(&self) -> &RdataSet {
        self.deref()
    }
}

impl AsRef<RdataSet> for RdataSetOwned {
    fn as_ref(&self) -> &RdataSet {
        self.deref()
    }
}

impl fmt::Debug for RdataSetOwned {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.deref().fmt(f)
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
    fn insert_and_iterate_work() {
        let mut set = RdataSetOwned::new();
        assert!(set.insert(Type::A, rdata(&[127, 0, 0, 1])));
        assert!(set.insert(Type::A, rdata(&[127, 0, 0, 2])));

        let octets: Vec<_> = set.iter().map(Rdata::octets).collect();
        assert_eq!(octets, [&[127, 0, 0, 1], &[127, 0, 0, 2]]);
        assert_eq!(set.count(), 2);
        assert!(!set.is_empty());
    }

    #[test]
    fn insert_ignores_duplicates() {
        let mut set = RdataSetOwned::new();
        assert!(set.insert(Type::A, rdata(&[127, 0, 0, 1])));
        assert!(!set.insert(Type::A, rdata(&[127, 0, 0, 1])));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn insert_compares_rdata_by_type() {
        // NS predates RFC 3597 and embeds a name, so the comparison is
        // case-insensitive; TXT carries no names and stays bitwise.
        let mut set = RdataSetOwned::new();
        assert!(set.insert(Type::NS, rdata(b"\x02ns\x04test\x00")));
        assert!(!set.insert(Type::NS, rdata(b"\x02NS\x04TEST\x00")));
        assert_eq!(set.count(), 1);

        let mut set = RdataSetOwned::new();
        assert!(set.insert(Type::TXT, rdata(b"\x04text")));
        assert!(set.insert(Type::TXT, rdata(b"\x04TEXT")));
        assert_eq!(set.count(), 2);
    }

    #[test]
    fn empty_set_is_empty() {
        let set = RdataSetOwned::new();
        assert!(set.is_empty());
        assert_eq!(set.iter().next().map(Rdata::octets), None);
    }
}
