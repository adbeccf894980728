//! Partitioning of messages and receipt ids into request-sized batches.
//!
//! The service counts every (message, recipient) pair against its per-request
//! limit, but a single message's recipient list can never be split across
//! requests. Chunking is greedy and order preserving:
//!
//! - messages without recipients are dropped (they would produce no tickets);
//! - a message whose recipients alone reach the limit is sent on its own;
//! - otherwise messages accumulate until the next one would overflow.

use tracing::debug;

use crate::message::PushItem;

/// Group message positions into batches whose recipient counts fit `limit`.
///
/// Returned indices point into `items`. A batch holding a single index may
/// exceed `limit` when that message alone is larger than the limit.
pub fn chunk_message_indices<M: PushItem>(items: &[M], limit: usize) -> Vec<Vec<usize>> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut current_recipients = 0;

    for (index, item) in items.iter().enumerate() {
        let recipients = item.recipient_count();

        if recipients == 0 {
            debug!(index, "Skipping push message without recipients");
            continue;
        }

        if recipients >= limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_recipients = 0;
            }
            chunks.push(vec![index]);
            continue;
        }

        if current_recipients + recipients > limit {
            chunks.push(std::mem::take(&mut current));
            current_recipients = 0;
        }

        current.push(index);
        current_recipients += recipients;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Group messages into batches whose recipient counts fit `limit`.
pub fn chunk_push_messages<M: PushItem>(items: &[M], limit: usize) -> Vec<Vec<&M>> {
    chunk_message_indices(items, limit)
        .into_iter()
        .map(|chunk| chunk.into_iter().map(|index| &items[index]).collect())
        .collect()
}

/// Split receipt ids into contiguous windows of at most `limit` ids.
pub fn chunk_receipt_ids<S: AsRef<str>>(ids: &[S], limit: usize) -> Vec<Vec<&str>> {
    ids.chunks(limit.max(1))
        .map(|chunk| chunk.iter().map(|id| id.as_ref()).collect())
        .collect()
}

/// Total recipients across a batch of messages.
pub fn batch_recipient_count<M: PushItem>(batch: &[M]) -> usize {
    batch.iter().map(PushItem::recipient_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::PushMessage;

    const LIMIT: usize = 100;

    fn single() -> PushMessage {
        PushMessage::new("?")
    }

    fn many(count: usize) -> PushMessage {
        PushMessage::to_many(std::iter::repeat("?").take(count))
    }

    /// Sum recipients per chunk, checking the size invariant on the way.
    fn count_and_validate(chunks: &[Vec<&PushMessage>]) -> usize {
        chunks
            .iter()
            .map(|chunk| {
                let count = batch_recipient_count(chunk);
                assert!(!chunk.is_empty());
                assert!(count <= LIMIT || chunk.len() == 1);
                count
            })
            .sum()
    }

    #[test]
    fn test_chunk_many_single_recipient_messages() {
        let messages = vec![single(); 999];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 10);
        assert!(chunks[..9].iter().all(|c| c.len() == 100));
        assert_eq!(chunks[9].len(), 99);
        assert_eq!(count_and_validate(&chunks), 999);
    }

    #[test]
    fn test_chunk_small_list_fits_one_batch() {
        let messages = vec![single(); 10];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 10);
    }

    #[test]
    fn test_large_recipient_list_is_never_split() {
        let messages = vec![many(999)];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[0][0].recipient_count(), 999);
        assert_eq!(count_and_validate(&chunks), 999);
    }

    #[test]
    fn test_small_recipient_list_stays_in_one_batch() {
        let messages = vec![many(10)];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0][0].to.len(), 10);
    }

    #[test]
    fn test_mixed_lists_and_single_recipients() {
        let mut messages = vec![many(888)];
        messages.extend(vec![single(); 999]);
        messages.push(many(90));
        messages.extend(vec![single(); 10]);

        let chunks = chunk_push_messages(&messages, LIMIT);
        assert_eq!(count_and_validate(&chunks), 888 + 999 + 90 + 10);
        // The oversized list goes alone, ahead of everything else.
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[0][0].recipient_count(), 888);
    }

    #[test]
    fn test_message_without_recipients_is_dropped() {
        let mut messages = vec![single(); 2];
        messages.push(PushMessage::to_many(Vec::<String>::new()));

        let chunks = chunk_push_messages(&messages, LIMIT);
        assert_eq!(chunks.len(), 1);
        assert_eq!(count_and_validate(&chunks), 2);
    }

    #[test]
    fn test_exactly_limit_recipients_forms_its_own_batch() {
        let messages = vec![many(100)];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0][0].to.len(), 100);
    }

    #[test]
    fn test_limit_sized_message_flushes_pending_batch() {
        let messages = vec![single(), many(100), single()];
        let indices = chunk_message_indices(&messages, LIMIT);

        assert_eq!(indices, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_over_limit_message_goes_alone() {
        let messages = vec![many(101)];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 1);
        assert_eq!(count_and_validate(&chunks), 101);
    }

    #[test]
    fn test_99_recipient_list_then_two_singles() {
        let messages = vec![many(99), single(), single()];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[1].len(), 1);
        assert_eq!(count_and_validate(&chunks), 101);
    }

    #[test]
    fn test_100_recipient_list_then_two_singles() {
        let messages = vec![many(100), single(), single()];
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[1].len(), 2);
        assert_eq!(count_and_validate(&chunks), 102);
    }

    #[test]
    fn test_99_singles_then_two_recipient_message() {
        let mut messages = vec![single(); 99];
        messages.push(many(2));
        let chunks = chunk_push_messages(&messages, LIMIT);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 99);
        assert_eq!(batch_recipient_count(&chunks[0]), 99);
        assert_eq!(chunks[1].len(), 1);
        assert_eq!(batch_recipient_count(&chunks[1]), 2);
    }

    #[test]
    fn test_no_messages() {
        let messages: Vec<PushMessage> = Vec::new();
        assert!(chunk_push_messages(&messages, LIMIT).is_empty());
    }

    #[test]
    fn test_single_message_without_recipients() {
        let messages = vec![PushMessage::default()];
        assert!(chunk_push_messages(&messages, LIMIT).is_empty());
    }

    #[test]
    fn test_order_is_preserved_and_chunking_is_deterministic() {
        let messages: Vec<PushMessage> = (0..250)
            .map(|i| match i % 7 {
                0 => many(i % 13),
                3 => many(120),
                _ => single(),
            })
            .collect();

        let first = chunk_message_indices(&messages, LIMIT);
        let second = chunk_message_indices(&messages, LIMIT);
        assert_eq!(first, second);

        let flattened: Vec<usize> = first.into_iter().flatten().collect();
        let expected: Vec<usize> = (0..messages.len())
            .filter(|&i| messages[i].recipient_count() > 0)
            .collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_chunk_receipt_ids() {
        let ids = vec!["F5741A13-BCDA-434B-A316-5DC0E6FFA94F".to_string(); 60];
        let chunks = chunk_receipt_ids(&ids, 25);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(Vec::len).collect::<Vec<_>>(), vec![25, 25, 10]);
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), ids.len());
    }

    #[test]
    fn test_chunk_receipt_ids_empty() {
        let ids: [&str; 0] = [];
        assert!(chunk_receipt_ids(&ids, 300).is_empty());
    }
}
