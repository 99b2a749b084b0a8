use crate::blockchain::models::RawTransaction;
use crate::models::Target;

/// Check if a transaction is one of the watched calls.
///
/// The address and the method signature are matched independently against
/// the whole target list: the transaction qualifies when some target has its
/// `to` address and some (possibly different) target's signature prefixes
/// its input. Contract creations (no `to`) never match.
pub fn matches(tx: &RawTransaction, targets: &[Target]) -> bool {
    let Some(to) = tx.to.as_deref() else {
        return false;
    };
    let to = to.to_lowercase();
    let input = tx.input.to_lowercase();

    let address_watched = targets.iter().any(|t| t.address.to_lowercase() == to);
    if !address_watched {
        return false;
    }

    targets.iter().any(|t| {
        let signature = t.method_signature.to_lowercase();
        !signature.is_empty() && input.starts_with(&signature)
    })
}
