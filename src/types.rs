/// Raw key bytes. Ordered byte-lexicographically.
pub type Key = Vec<u8>;

/// Raw value bytes. An empty value is a present value, not a deletion.
pub type Value = Vec<u8>;
