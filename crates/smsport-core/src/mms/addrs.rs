//! Android MMS address list derivation.

use tracing::warn;

use crate::android::{AddrRole, AndroidAddr, SELF_ADDRESS_TOKEN};
use crate::wp::WpMessage;

/// The flattened `address` attribute and the `addrs` children of an MMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmsAddresses {
    pub address: String,
    pub addrs: Vec<AndroidAddr>,
}

/// Derive the address data for a message.
///
/// The device owner never has a number in WP backups, so the self side of
/// the conversation is written as [`SELF_ADDRESS_TOKEN`]. `From` entries
/// always precede `To` entries.
pub fn build_addresses(message: &WpMessage) -> MmsAddresses {
    if message.is_incoming {
        return MmsAddresses {
            address: message.sender.clone(),
            addrs: vec![
                AndroidAddr::new(message.sender.as_str(), AddrRole::From),
                AndroidAddr::new(SELF_ADDRESS_TOKEN, AddrRole::To),
            ],
        };
    }

    if message.recipients.is_empty() {
        warn!("outgoing MMS has no recipients");
    }
    let addrs = std::iter::once(AndroidAddr::new(SELF_ADDRESS_TOKEN, AddrRole::From))
        .chain(
            message
                .recipients
                .iter()
                .map(|r| AndroidAddr::new(r.as_str(), AddrRole::To)),
        )
        .collect();
    MmsAddresses {
        address: message.recipients.join("~"),
        addrs,
    }
}
