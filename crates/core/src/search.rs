//! Header search box: one flat index over pages, modules, assignments and
//! external service links.

use crate::model::ModuleCatalog;

/// At most this many suggestions are shown under the search box.
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// In-app route such as `/timetable`.
    Page(String),
    /// Modules page with this module pre-selected.
    Module(String),
    External(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub sub: String,
    pub target: SearchTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLink {
    pub label: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceGroup {
    pub title: &'static str,
    pub links: &'static [ServiceLink],
}

const fn link(label: &'static str, url: &'static str) -> ServiceLink {
    ServiceLink { label, url }
}

const PAGES: &[(&str, &str, &str)] = &[
    ("Dashboard", "/", "Home"),
    ("Modules", "/modules", "Courses"),
    ("Learning", "/learning", "AI Tutor"),
    ("Timetable", "/timetable", "Schedule"),
    ("Services & Tools", "/services", "Resources"),
    ("Profile", "/profile", "Account"),
    ("Shop", "/shop", "Customization"),
];

pub const SERVICE_GROUPS: &[ServiceGroup] = &[
    ServiceGroup {
        title: "Tools & University Systems",
        links: &[
            link("Student Services", "https://prod.banner.leeds.ac.uk/ssb/twbkwbis.P_GenMenu?name=bmenu.P_MainMnu"),
            link("University Email", "https://outlook.office365.com/mail/?wa=wsignin1.0"),
            link("My Timetable", "#"),
            link("OneDrive", "https://leeds365-my.sharepoint.com/?wa=wsignin1%2E0"),
            link("PebblePad", "https://v3.pebblepad.co.uk/login/leeds"),
            link("LinkedIn Learning", "https://www.linkedin.com/learning/?u=57895809"),
            link("FutureLearn Campus", "https://www.futurelearn.com/campus/university-of-leeds"),
            link("Coursera", "https://www.coursera.org/programs/university-of-leeds-on-coursera-6er00?authProvider=c4c-leeds-university"),
            link("Digital Education Help", "https://desystemshelp.leeds.ac.uk/student-guides/"),
        ],
    },
    ServiceGroup {
        title: "Students",
        links: &[
            link("Students Website", "https://students.leeds.ac.uk/"),
            link("Leeds University Union", "https://www.luu.ac.uk/"),
            link("Student Wellbeing", "https://students.leeds.ac.uk/counselling-wellbeing-support"),
            link("Disability Services", "https://students.leeds.ac.uk/support-disabled-students/doc/disability-services"),
            link("Report + Support", "https://reportandsupport.leeds.ac.uk/"),
            link("Academic Integrity", "https://desystemshelp.leeds.ac.uk/student-guides/assessment/the-academic-integrity-tutorial-and-test/"),
            link("The Language Zone", "https://leeds365.sharepoint.com/sites/TheLanguageZone"),
        ],
    },
    ServiceGroup {
        title: "Library",
        links: &[
            link("Library Search", "https://library.leeds.ac.uk/"),
            link("My Library Account", "https://leeds.primo.exlibrisgroup.com/discovery/login?vid=44LEE_INST:VU1"),
            link("Book a Study Space", "https://library.leeds.ac.uk/info/1200/library_services/198/study_space"),
            link("Resources for My Subject", "https://library.leeds.ac.uk/subjects"),
            link("Opening Hours", "https://library.leeds.ac.uk/locations"),
            link("Academic Skills", "https://library.leeds.ac.uk/info/1401/academic_skills"),
            link("Referencing", "https://library.leeds.ac.uk/info/1402/referencing"),
        ],
    },
    ServiceGroup {
        title: "IT Help & Services",
        links: &[
            link("Report a Problem", "https://it.leeds.ac.uk/it?id=sc_cat_item&sys_id=3f1dd0320a0a0b99000a53f7604a2ef9"),
            link("Service Status", "https://it.leeds.ac.uk/it?id=services_status"),
            link("Campus Map", "https://www.leeds.ac.uk/campusmap"),
            link("Computer Clusters", "https://it.leeds.ac.uk/it?id=clusters"),
            link("MyPrint Account", "https://myprint.leeds.ac.uk/app?service=page/Home"),
            link("Software for Home Use", "https://it.leeds.ac.uk/it?id=kb_article&sysparm_article=KB0011862"),
            link("IT Help Articles", "https://it.leeds.ac.uk/it?id=kb_view2"),
            link("Minerva Help Guides", "https://desystemshelp.leeds.ac.uk/student-guides/"),
            link("Working Off-Campus", "https://it.leeds.ac.uk/it?id=kb_article_view&sysparm_article=KB0013832"),
        ],
    },
];

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<Suggestion>,
}

impl SearchIndex {
    /// Pages first, then modules, assignments and service links, in catalog order.
    #[must_use]
    pub fn build(catalog: &ModuleCatalog, groups: &[ServiceGroup]) -> Self {
        let pages = PAGES.iter().map(|&(label, path, sub)| Suggestion {
            label: label.into(),
            sub: sub.into(),
            target: SearchTarget::Page(path.into()),
        });
        let modules = catalog.modules().iter().map(|m| Suggestion {
            label: m.name.clone(),
            sub: m.code.clone(),
            target: SearchTarget::Module(m.id.clone()),
        });
        let assignments = catalog.assignments().iter().map(|a| Suggestion {
            label: a.title.clone(),
            sub: "Assignment".into(),
            target: SearchTarget::Module(a.module_id.clone()),
        });
        let links = groups.iter().flat_map(|g| {
            g.links.iter().map(move |l| Suggestion {
                label: l.label.into(),
                sub: g.title.into(),
                target: SearchTarget::External(l.url.into()),
            })
        });

        Self {
            entries: pages.chain(modules).chain(assignments).chain(links).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on label or sub, capped at
    /// [`MAX_SUGGESTIONS`]. A blank query suggests nothing.
    #[must_use]
    pub fn suggest(&self, query: &str) -> Vec<&Suggestion> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|s| {
                s.label.to_lowercase().contains(&needle) || s.sub.to_lowercase().contains(&needle)
            })
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SearchIndex {
        SearchIndex::build(&ModuleCatalog::seeded(), SERVICE_GROUPS)
    }

    #[test]
    fn index_covers_every_source() {
        let links: usize = SERVICE_GROUPS.iter().map(|g| g.links.len()).sum();
        assert_eq!(index().len(), PAGES.len() + 12 + 5 + links);
    }

    #[test]
    fn matches_label_or_sub_ignoring_case() {
        let index = index();

        let hits = index.suggest("TIMETABLE");
        assert_eq!(hits[0].target, SearchTarget::Page("/timetable".into()));
        assert!(hits.iter().any(|s| s.label == "My Timetable"));

        let by_code = index.suggest("phys101");
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].label, "Mechanics");
        assert_eq!(by_code[0].target, SearchTarget::Module("m3".into()));

        let essay = index.suggest("essay");
        assert_eq!(essay[0].sub, "Assignment");
        assert_eq!(essay[0].target, SearchTarget::Module("m1".into()));

        let library = index.suggest("library");
        assert!(library.iter().all(|s| matches!(s.target, SearchTarget::External(_))));
        assert!(library.iter().any(|s| s.label == "Opening Hours"));
    }

    #[test]
    fn blank_query_is_silent_and_results_are_capped() {
        let index = index();
        assert!(index.suggest("   ").is_empty());
        assert_eq!(index.suggest("e").len(), MAX_SUGGESTIONS);
        assert!(index.suggest("zzzz").is_empty());
    }
}
