use super::models::MessageModel;

/// Whether `requester` may see `message`.
///
/// Public and status messages are visible to everyone. Private messages are
/// visible only to their sender and recipient; an anonymous requester sees none.
pub fn visible(message: &MessageModel, requester: Option<&str>) -> bool {
    if !message.is_private() {
        return true;
    }

    match requester {
        Some(name) if !name.is_empty() => message.from == name || message.to == name,
        _ => false,
    }
}

/// Messages visible to `requester`, in their original order
pub fn filter_visible(messages: Vec<MessageModel>, requester: Option<&str>) -> Vec<MessageModel> {
    messages
        .into_iter()
        .filter(|message| visible(message, requester))
        .collect()
}

/// The last `limit` items, or all of them when there is no limit
pub fn trailing_window<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) if items.len() > limit => items.split_off(items.len() - limit),
        _ => items,
    }
}
