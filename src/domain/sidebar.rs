use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidebarIcon {
    Home,
    Search,
    Notifications,
    Mail,
    Bookmark,
    List,
    Person,
    More,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarOption {
    pub text: String,
    pub icon: SidebarIcon,
    pub active: bool,
}

impl SidebarOption {
    pub fn new(text: impl Into<String>, icon: SidebarIcon) -> Self {
        Self {
            text: text.into(),
            icon,
            active: false,
        }
    }

    pub fn class_name(&self) -> &'static str {
        if self.active {
            "sidebarOption sidebarOption_active"
        } else {
            "sidebarOption"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidebar {
    options: Vec<SidebarOption>,
}

impl Default for Sidebar {
    fn default() -> Self {
        let mut sidebar = Self::new(vec![
            SidebarOption::new("Home", SidebarIcon::Home),
            SidebarOption::new("Explore", SidebarIcon::Search),
            SidebarOption::new("Notifications", SidebarIcon::Notifications),
            SidebarOption::new("Messages", SidebarIcon::Mail),
            SidebarOption::new("Bookmarks", SidebarIcon::Bookmark),
            SidebarOption::new("Lists", SidebarIcon::List),
            SidebarOption::new("Profile", SidebarIcon::Person),
            SidebarOption::new("More", SidebarIcon::More),
        ]);
        sidebar.activate("Home");
        sidebar
    }
}

impl Sidebar {
    /// Only the first option passed in as active stays active.
    pub fn new(mut options: Vec<SidebarOption>) -> Self {
        let mut seen_active = false;
        for option in &mut options {
            if option.active && seen_active {
                option.active = false;
            }
            seen_active |= option.active;
        }
        Self { options }
    }

    pub fn options(&self) -> &[SidebarOption] {
        &self.options
    }

    /// Marks the first option labelled `text` active and every other one
    /// inactive. Returns false, leaving the sidebar unchanged, when no option matches.
    pub fn activate(&mut self, text: &str) -> bool {
        let Some(index) = self.options.iter().position(|option| option.text == text) else {
            return false;
        };
        for (i, option) in self.options.iter_mut().enumerate() {
            option.active = i == index;
        }
        true
    }

    pub fn active(&self) -> Option<&SidebarOption> {
        self.options.iter().find(|option| option.active)
    }
}
