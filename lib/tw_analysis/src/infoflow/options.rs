use serde::Deserialize;

/// Package prefixes of the Android platform and Java runtime classes.
const SYSTEM_PACKAGES: &[&str] = &[
    "android.",
    "androidx.",
    "com.android.",
    "com.google.android.",
    "dalvik.",
    "java.",
    "javax.",
    "junit.",
    "kotlin.",
    "org.apache.http.",
    "org.json.",
    "org.w3c.dom.",
    "org.xml.sax.",
    "sun.",
];

/// Options of the summary taint wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WrapperOptions {
    /// Logs a warning for each call to a system class without summary.
    pub report_missing_summaries: bool,
    /// Upper bound on the number of work items processed by one summary
    /// application; unbounded when `None`.
    pub max_steps: Option<usize>,
    /// Package prefixes identifying system classes.
    pub system_packages: Vec<String>,
}

/// Default values disable missing summaries reports and do not bound
/// summary application.
impl Default for WrapperOptions {
    fn default() -> Self {
        Self {
            report_missing_summaries: false,
            max_steps: None,
            system_packages: SYSTEM_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl WrapperOptions {
    /// Reports missing summaries of system classes.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            report_missing_summaries: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    #[must_use]
    pub fn is_system_class(&self, class_name: &str) -> bool {
        self.system_packages
            .iter()
            .any(|prefix| class_name.starts_with(prefix.as_str()))
    }
}
