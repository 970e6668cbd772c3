/// Read side of the revoked-token set. This is all the token codec gets.
pub trait RevocationCheck: Send + Sync {
    fn is_revoked(&self, jti: &str) -> bool;
}

/// Revoked token identifiers. Entries are permanent for the lifetime of the
/// registry; a token past its expiry is rejected anyway, so nothing is pruned.
pub trait RevocationRegistry: RevocationCheck {
    /// Mark `jti` as revoked. Returns `false` if it already was.
    fn revoke(&self, jti: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
