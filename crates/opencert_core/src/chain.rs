//! Merkle path reconstruction.
//!
//! A chain runs from the certificate's target hash (the leaf) through every
//! intermediate parent to the Merkle root.

use crate::error::CoreError;
use crate::hash::Hash;
use serde::{Deserialize, Serialize};

/// Ordered hashes from leaf to root. Never empty.
///
/// Serializes as a plain array; deserializing an empty array fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Hash>", into = "Vec<Hash>")]
pub struct HashChain {
    hashes: Vec<Hash>,
}

/// Rebuild the path from `target` through `proof` to the root.
///
/// Each sibling in `proof` is combined with the running hash and the result
/// appended, so the chain has `proof.len() + 1` entries.
#[must_use]
pub fn build_chain(target: Hash, proof: &[Hash]) -> HashChain {
    let mut hashes = Vec::with_capacity(proof.len() + 1);
    hashes.push(target);

    let mut current = target;
    for sibling in proof {
        current = current.combine(sibling);
        hashes.push(current);
    }

    HashChain { hashes }
}

impl HashChain {
    /// The leaf (target) hash
    #[must_use]
    pub fn leaf(&self) -> Hash {
        self.hashes[0]
    }

    /// The reconstructed root
    #[must_use]
    pub fn root(&self) -> Hash {
        self.hashes[self.hashes.len() - 1]
    }

    /// Check the reconstructed root against a declared one
    #[must_use]
    pub fn reaches(&self, merkle_root: &Hash) -> bool {
        self.root() == *merkle_root
    }

    /// Get all hashes in the chain
    #[must_use]
    pub fn as_slice(&self) -> &[Hash] {
        &self.hashes
    }

    /// Iterate leaf to root
    pub fn iter(&self) -> std::slice::Iter<'_, Hash> {
        self.hashes.iter()
    }

    /// Get length of chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Always false; a chain holds at least its leaf
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl TryFrom<Vec<Hash>> for HashChain {
    type Error = CoreError;

    fn try_from(hashes: Vec<Hash>) -> Result<Self, Self::Error> {
        if hashes.is_empty() {
            return Err(CoreError::EmptyChain);
        }
        Ok(Self { hashes })
    }
}

impl From<HashChain> for Vec<Hash> {
    fn from(chain: HashChain) -> Self {
        chain.hashes
    }
}

impl IntoIterator for HashChain {
    type Item = Hash;
    type IntoIter = std::vec::IntoIter<Hash>;

    fn into_iter(self) -> Self::IntoIter {
        self.hashes.into_iter()
    }
}

impl<'a> IntoIterator for &'a HashChain {
    type Item = &'a Hash;
    type IntoIter = std::slice::Iter<'a, Hash>;

    fn into_iter(self) -> Self::IntoIter {
        self.hashes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_proof_is_target_only() {
        let target = Hash::compute(b"document");
        let chain = build_chain(target, &[]);
        assert_eq!(chain.as_slice(), &[target]);
        assert_eq!(chain.leaf(), target);
        assert_eq!(chain.root(), target);
        assert!(!chain.is_empty());
    }

    #[test]
    fn test_two_step_proof() {
        let target = Hash::compute(b"document");
        let proof0 = Hash::compute(b"sibling-0");
        let proof1 = Hash::compute(b"sibling-1");

        let chain = build_chain(target, &[proof0, proof1]);
        let intermediate = target.combine(&proof0);
        let root = intermediate.combine(&proof1);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.as_slice(), &[target, intermediate, root]);
        assert!(chain.reaches(&root));
        assert!(!chain.reaches(&intermediate));
    }

    #[test]
    fn test_chain_iterates_leaf_to_root() {
        let target = Hash::compute(b"a");
        let chain = build_chain(target, &[Hash::compute(b"b")]);
        let collected: Vec<Hash> = chain.iter().copied().collect();
        assert_eq!(collected.first(), Some(&target));
        assert_eq!(collected.last(), Some(&chain.root()));
        assert_eq!(chain.clone().into_iter().count(), 2);
    }

    #[test]
    fn test_deserialize_rejects_empty_chain() {
        let err = serde_json::from_str::<HashChain>("[]").unwrap_err();
        assert!(err.to_string().contains("at least its leaf"));

        let chain = build_chain(Hash::compute(b"leaf"), &[Hash::compute(b"sibling")]);
        let json = serde_json::to_string(&chain).unwrap();
        let restored: HashChain = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.root(), chain.root());
        assert_eq!(restored, chain);
    }

    proptest! {
        #[test]
        fn prop_chain_length_and_leaf(
            target in any::<[u8; 32]>(),
            proof in proptest::collection::vec(any::<[u8; 32]>(), 0..12)
        ) {
            let target = Hash::from_bytes(target);
            let proof: Vec<Hash> = proof.into_iter().map(Hash::from_bytes).collect();
            let chain = build_chain(target, &proof);
            prop_assert_eq!(chain.len(), proof.len() + 1);
            prop_assert_eq!(chain.leaf(), target);
        }

        #[test]
        fn prop_combine_swap_invariant(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let a = Hash::from_bytes(a);
            let b = Hash::from_bytes(b);
            prop_assert_eq!(a.combine(&b), b.combine(&a));
        }

        #[test]
        fn prop_chain_deterministic(
            target in any::<[u8; 32]>(),
            proof in proptest::collection::vec(any::<[u8; 32]>(), 0..8)
        ) {
            let target = Hash::from_bytes(target);
            let proof: Vec<Hash> = proof.into_iter().map(Hash::from_bytes).collect();
            prop_assert_eq!(build_chain(target, &proof), build_chain(target, &proof));
        }
    }
}
