//! Channel router — picks the delivery channel for a record.

use herald_common::types::{Channel, RecipientRecord};

/// Stateless channel router.
pub struct ChannelRouter;

impl ChannelRouter {
    /// Resolve the record's declared channel.
    ///
    /// Never fails: unknown tags come back as [`Channel::Unsupported`] and are
    /// rejected by the dispatch loop.
    pub fn route(record: &RecipientRecord) -> Channel {
        Channel::from_tag(record.channel.as_deref())
    }
}
