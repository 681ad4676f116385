use crate::model::ids::NotificationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Announcement,
    File,
    Alert,
    Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub sender: String,
    pub date: String,
    pub kind: NotificationKind,
    /// Module to open when the notification is clicked.
    pub module_id: Option<String>,
    pub link: Option<String>,
    pub read: bool,
}

/// Read/unread bookkeeping for the header bell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationInbox {
    items: Vec<Notification>,
}

impl NotificationInbox {
    #[must_use]
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Returns false when no notification has that id.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        self.set_read(id, |_| true)
    }

    pub fn toggle_read(&mut self, id: NotificationId) -> bool {
        self.set_read(id, |read| !read)
    }

    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
    }

    pub fn filter(&self, kind: NotificationKind) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| n.kind == kind)
    }

    fn set_read(&mut self, id: NotificationId, f: impl FnOnce(bool) -> bool) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(item) => {
                item.read = f(item.read);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: u64, kind: NotificationKind, read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id),
            title: format!("n{id}"),
            message: String::new(),
            sender: "Registry".into(),
            date: "Today".into(),
            kind,
            module_id: None,
            link: None,
            read,
        }
    }

    #[test]
    fn unread_bookkeeping() {
        let mut inbox = NotificationInbox::new(vec![
            note(1, NotificationKind::Alert, false),
            note(2, NotificationKind::File, false),
            note(3, NotificationKind::Alert, true),
        ]);
        assert_eq!(inbox.unread_count(), 2);

        assert!(inbox.mark_read(NotificationId::new(1)));
        assert_eq!(inbox.unread_count(), 1);

        assert!(inbox.toggle_read(NotificationId::new(3)));
        assert_eq!(inbox.unread_count(), 2);

        assert!(!inbox.mark_read(NotificationId::new(99)));

        inbox.mark_all_read();
        assert_eq!(inbox.unread_count(), 0);
    }

    #[test]
    fn filter_by_kind() {
        let inbox = NotificationInbox::new(vec![
            note(1, NotificationKind::Alert, false),
            note(2, NotificationKind::File, false),
        ]);
        let ids: Vec<_> = inbox
            .filter(NotificationKind::File)
            .map(|n| n.id.value())
            .collect();
        assert_eq!(ids, vec![2]);
    }
}
