use athena_core::model::{Notification, NotificationId, NotificationInbox, NotificationKind};

#[allow(clippy::too_many_arguments)]
fn notice(
    id: u64,
    title: &str,
    message: &str,
    sender: &str,
    date: &str,
    kind: NotificationKind,
    module_id: Option<&str>,
    read: bool,
) -> Notification {
    Notification {
        id: NotificationId::new(id),
        title: title.into(),
        message: message.into(),
        sender: sender.into(),
        date: date.into(),
        kind,
        module_id: module_id.map(Into::into),
        link: None,
        read,
    }
}

/// Inbox contents shown under the header bell on first launch.
#[must_use]
pub fn seeded_inbox() -> NotificationInbox {
    let mut wifi = notice(
        5,
        "Campus WiFi Maintenance",
        "Eduroam will be down for maintenance on Saturday from 2am to 6am. Please plan your study time accordingly.",
        "IT Services",
        "4 days ago",
        NotificationKind::Announcement,
        None,
        true,
    );
    wifi.link = Some("https://it.leeds.ac.uk/it?id=services_status".into());

    NotificationInbox::new(vec![
        notice(
            1,
            "Lecture Cancelled",
            "The lecture for CS101 tomorrow is cancelled due to illness. Please check the learning materials for recorded content.",
            "Dr. Alan Turing",
            "2 hours ago",
            NotificationKind::Alert,
            Some("m1"),
            false,
        ),
        notice(
            2,
            "New Assignment Uploaded",
            "Assignment 2: Genetic Algorithms has been uploaded. Please review the requirements carefully.",
            "Dr. Dijkstra",
            "1 day ago",
            NotificationKind::Assignment,
            Some("m9"),
            false,
        ),
        notice(
            3,
            "Library Overdue Notice",
            "You have a book overdue: \"Clean Code\". Please return it to the Brotherton Library to avoid fines.",
            "Library Services",
            "2 days ago",
            NotificationKind::Alert,
            None,
            true,
        ),
        notice(
            4,
            "Week 5 Slides Available",
            "The slides for Week 5 have been uploaded to the module resources. It covers the new topics on Data Structures.",
            "Dr. Ada Lovelace",
            "3 days ago",
            NotificationKind::File,
            Some("m2"),
            true,
        ),
        wifi,
    ])
}
