/// A resident value with its weight and strategy metadata.
///
/// The key is duplicated here so that eviction, which starts from a bucket
/// rather than from a key, can unlink the index entry.
#[derive(Debug)]
pub(crate) struct Entry<K, V, M> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) weight: usize,
    pub(crate) meta: M,
}
