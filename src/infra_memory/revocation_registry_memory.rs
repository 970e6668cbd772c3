use crate::domain_port::*;
use dashmap::DashSet;

/// Process-wide revoked `jti` set. Each shard of the `DashSet` has its own lock,
/// so concurrent revocations of different identifiers never lose an update and
/// a completed `revoke` is seen by every later `is_revoked`.
#[derive(Debug, Default)]
pub struct MemoryRevocationRegistry {
    revoked: DashSet<String>,
}

impl MemoryRevocationRegistry {
    pub fn new() -> Self {
        Self {
            revoked: DashSet::new(),
        }
    }
}

impl RevocationCheck for MemoryRevocationRegistry {
    fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains(jti)
    }
}

impl RevocationRegistry for MemoryRevocationRegistry {
    fn revoke(&self, jti: &str) -> bool {
        self.revoked.insert(jti.to_string())
    }

    fn len(&self) -> usize {
        self.revoked.len()
    }
}
