use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a generated world entity (structure, settlement, marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Stable id derived from a generator-provided number. Generated foundations
    /// are deterministic for a seed, so their ids must be too.
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// First eight hex digits, for log lines and overlays.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A handle referencing a renderable mesh owned by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// Hands out sequential mesh handles. The host maps them to GPU resources.
#[derive(Debug, Clone, Default)]
pub struct MeshHandleAllocator {
    next: u64,
}

impl MeshHandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> MeshHandle {
        let handle = MeshHandle(self.next);
        self.next += 1;
        handle
    }

    /// Number of handles issued so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn entity_id_from_u128_is_stable() {
        assert_eq!(EntityId::from_u128(7), EntityId::from_u128(7));
        assert_ne!(EntityId::from_u128(7), EntityId::from_u128(8));
        assert_eq!(EntityId::from_u128(0xabcd_ef01 << 96).short(), "abcdef01");
    }

    #[test]
    fn mesh_handles_are_sequential() {
        let mut alloc = MeshHandleAllocator::new();
        assert_eq!(alloc.allocate(), MeshHandle(0));
        assert_eq!(alloc.allocate(), MeshHandle(1));
        assert_eq!(alloc.issued(), 2);
    }
}
