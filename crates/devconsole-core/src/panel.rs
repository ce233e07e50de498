//! Panel names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The built-in panel categories.
///
/// Panels outside this list are still legal in configuration: they name
/// envelope types whose latest payload is retained verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Requests,
    Sql,
    Logs,
    Routes,
    Template,
    Session,
    Config,
    Custom,
}

/// Default panel list, in display order
pub const BUILTIN_PANELS: [PanelKind; 8] = [
    PanelKind::Requests,
    PanelKind::Sql,
    PanelKind::Logs,
    PanelKind::Routes,
    PanelKind::Template,
    PanelKind::Session,
    PanelKind::Config,
    PanelKind::Custom,
];

impl PanelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requests => "requests",
            Self::Sql => "sql",
            Self::Logs => "logs",
            Self::Routes => "routes",
            Self::Template => "template",
            Self::Session => "session",
            Self::Config => "config",
            Self::Custom => "custom",
        }
    }

    /// Whether the panel stores a bounded list (as opposed to a singleton value)
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Requests | Self::Sql | Self::Logs)
    }

    /// Built-in panel names as owned strings (config default)
    pub fn builtin_names() -> Vec<String> {
        BUILTIN_PANELS.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BUILTIN_PANELS
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown panel '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrips_every_builtin() {
        for panel in BUILTIN_PANELS {
            assert_eq!(panel.as_str().parse::<PanelKind>(), Ok(panel));
        }
    }

    #[test]
    fn test_unknown_panel_is_not_builtin() {
        assert!("metrics".parse::<PanelKind>().is_err());
    }

    #[test]
    fn test_builtin_names_order() {
        let names = PanelKind::builtin_names();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "requests");
        assert_eq!(names[7], "custom");
    }
}
