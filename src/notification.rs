//! Load diagnostics
//!
//! A load aborts only on broken structure. Everything it can recover from is
//! recorded as a [`Notification`] naming the entity concerned, collected in
//! [`DxfDocument::notifications`].
//!
//! [`DxfDocument::notifications`]: crate::document::DxfDocument::notifications

use std::fmt;

use crate::types::Handle;

/// What a load diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// Entity type without a schema, loaded as raw tags
    StoredAsTags,
    /// Entity without subclass markers, loaded from the flat layout
    MissingSubclassMarkers,
    /// Owner or extension dictionary handle without entity
    DanglingReference,
    /// Header variable with an unusable value, a default was used
    InvalidHeaderVar,
}

impl NotificationType {
    /// Stored-as-tags is expected for most files, everything else means
    /// the input was not as written by a conforming application.
    pub fn is_warning(self) -> bool {
        self != NotificationType::StoredAsTags
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StoredAsTags => "stored as tags",
            Self::MissingSubclassMarkers => "missing subclass markers",
            Self::DanglingReference => "dangling reference",
            Self::InvalidHeaderVar => "invalid header variable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub notification_type: NotificationType,
    /// Entity concerned, `None` for header findings
    pub handle: Option<Handle>,
    pub message: String,
}

impl Notification {
    pub fn new(notification_type: NotificationType, handle: Option<Handle>, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            handle,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle {
            Some(handle) => write!(f, "[{}] #{}: {}", self.notification_type, handle, self.message),
            None => write!(f, "[{}] {}", self.notification_type, self.message),
        }
    }
}

/// Diagnostics of one load, in the order they occurred
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn notify(
        &mut self,
        notification_type: NotificationType,
        handle: Option<Handle>,
        message: impl Into<String>,
    ) {
        self.items.push(Notification::new(notification_type, handle, message));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Findings about the entity `handle`
    pub fn for_handle(&self, handle: Handle) -> impl Iterator<Item = &Notification> + '_ {
        self.items.iter().filter(move |n| n.handle == Some(handle))
    }

    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|n| n.notification_type.is_warning())
    }

    /// Append all notifications of `other`
    pub fn extend(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
