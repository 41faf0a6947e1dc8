use crate::models::notification::MULTICAST_TOKEN_LIMIT;

/// Splits `items` into consecutive groups of at most `size`, preserving order.
/// A zero `size` is treated as one.
pub fn partition<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

pub fn multicast_batches(tokens: &[String]) -> Vec<&[String]> {
    partition(tokens, MULTICAST_TOKEN_LIMIT)
}
