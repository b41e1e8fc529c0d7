//! Record validator — checks the field a channel needs is present.

use herald_common::types::{Channel, RecipientRecord};

/// Stateless record validator.
pub struct RecordValidator;

impl RecordValidator {
    /// Delivery target for `channel`: the email address for Email, the phone
    /// number for Chat. `None` when the field is missing or blank, or the
    /// channel is unsupported.
    pub fn target<'a>(record: &'a RecipientRecord, channel: &Channel) -> Option<&'a str> {
        let field = match channel {
            Channel::Email => record.email_address.as_deref(),
            Channel::Chat => record.phone_number.as_deref(),
            Channel::Unsupported(_) => None,
        };

        field.map(str::trim).filter(|value| !value.is_empty())
    }
}
