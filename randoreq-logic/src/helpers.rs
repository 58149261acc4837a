use crate::IndividualRequirement;

/// Bit assigned to a requirement in a conjunction's signature. Distinct requirements may share
/// a bit, so signatures can only prove that one conjunction is *not* a subset of another.
pub fn signature_bit(req: &IndividualRequirement) -> u64 {
    let resource = req.resource();
    let mut x = (resource.kind as u64) << 56;
    x ^= (resource.index as u64) << 24;
    x ^= (req.amount() as u32 as u64) << 1;
    x ^= req.negate() as u64;

    // splitmix64 finalizer
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    1 << (x & 63)
}

pub fn signature<'a>(reqs: impl IntoIterator<Item = &'a IndividualRequirement>) -> u64 {
    reqs.into_iter().fold(0, |sig, req| sig | signature_bit(req))
}

/// Whether sorted, deduplicated `small` is contained in sorted, deduplicated `large`.
pub fn sorted_is_subset<T: Ord>(small: &[T], large: &[T]) -> bool {
    if small.len() > large.len() {
        return false;
    }
    let mut rest = large;
    for x in small {
        loop {
            match rest.split_first() {
                None => return false,
                Some((y, tail)) => {
                    rest = tail;
                    match y.cmp(x) {
                        std::cmp::Ordering::Less => continue,
                        std::cmp::Ordering::Equal => break,
                        std::cmp::Ordering::Greater => return false,
                    }
                }
            }
        }
    }
    true
}
