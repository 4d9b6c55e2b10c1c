use crate::ChainSpec;
use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use tree_hash_derive::TreeHash;

macro_rules! new_type_u64 {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            Encode,
            Decode,
            TreeHash,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(n: u64) -> Self {
                $name(n)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }

            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n)
            }
        }

        impl From<$name> for u64 {
            fn from(n: $name) -> Self {
                n.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Add<u64> for $name {
            type Output = $name;
            fn add(self, rhs: u64) -> Self::Output {
                $name(self.0 + rhs)
            }
        }

        impl AddAssign<u64> for $name {
            fn add_assign(&mut self, rhs: u64) {
                self.0 += rhs;
            }
        }

        impl Sub<u64> for $name {
            type Output = $name;
            fn sub(self, rhs: u64) -> Self::Output {
                $name(self.0 - rhs)
            }
        }

        impl SubAssign<u64> for $name {
            fn sub_assign(&mut self, rhs: u64) {
                self.0 -= rhs;
            }
        }

        impl Sub<$name> for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> Self::Output {
                $name(self.0 - rhs.0)
            }
        }
    };
}

new_type_u64!(Slot);
new_type_u64!(Epoch);

impl Slot {
    /// Returns the epoch containing this slot.
    pub fn epoch(&self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0 / slots_per_epoch)
    }

    pub fn saturating_sub(&self, other: impl Into<Slot>) -> Slot {
        Slot::new(self.0.saturating_sub(other.into().0))
    }
}

impl Epoch {
    /// Returns the first slot in this epoch.
    pub fn start_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0 * slots_per_epoch)
    }

    /// Returns the slot one past the end of this epoch.
    pub fn end_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new((self.0 + 1) * slots_per_epoch - 1)
    }

    pub fn saturating_sub(&self, other: impl Into<Epoch>) -> Epoch {
        Epoch::new(self.0.saturating_sub(other.into().0))
    }

    pub fn saturating_add(&self, other: impl Into<Epoch>) -> Epoch {
        Epoch::new(self.0.saturating_add(other.into().0))
    }
}

impl ChainSpec {
    pub fn far_future_epoch_value() -> Epoch {
        Epoch::new(u64::max_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_round_trip() {
        let slot = Slot::new(130);
        assert_eq!(slot.epoch(32), Epoch::new(4));
        assert_eq!(Epoch::new(4).start_slot(32), Slot::new(128));
        assert_eq!(Epoch::new(4).end_slot(32), Slot::new(159));
    }
}
