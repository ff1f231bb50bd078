use time::OffsetDateTime;

use super::ProjectId;
use crate::domain::ProjectError;

pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";
const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 1000;

/// A named, colored grouping for schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Project {
    /// Apply a partial update, returning the merged project.
    pub fn merged(&self, update: &ProjectUpdate) -> Project {
        let mut merged = self.clone();
        if let Some(name) = &update.name {
            merged.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            merged.description = normalize_description(description.clone());
        }
        if let Some(color) = &update.color {
            merged.color = color.trim().to_string();
        }
        merged
    }
}

/// Data for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: DEFAULT_PROJECT_COLOR.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Trim input and check it against the project rules.
    pub fn normalized(self) -> Result<NewProject, ProjectError> {
        let project = NewProject {
            name: self.name.trim().to_string(),
            description: normalize_description(self.description),
            color: self.color.trim().to_string(),
        };
        validate_name(&project.name)?;
        validate_description(project.description.as_deref())?;
        validate_color(&project.color)?;
        Ok(project)
    }
}

/// Partial project update. `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.color.is_none()
    }
}

/// Validate a merged project before it is written back.
pub fn validate_project(project: &Project) -> Result<(), ProjectError> {
    validate_name(&project.name)?;
    validate_description(project.description.as_deref())?;
    validate_color(&project.color)
}

/// Key used for case-insensitive name uniqueness.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn validate_name(name: &str) -> Result<(), ProjectError> {
    if name.is_empty() {
        return Err(ProjectError::Validation("project name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProjectError::Validation(format!(
            "project name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), ProjectError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(ProjectError::Validation(
            format!("project description must be at most {MAX_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

/// Accepts `#RGB` and `#RRGGBB`.
fn validate_color(color: &str) -> Result<(), ProjectError> {
    let valid = color
        .strip_prefix('#')
        .filter(|hex| hex.len() == 3 || hex.len() == 6)
        .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()));

    if valid {
        Ok(())
    } else {
        Err(ProjectError::Validation(format!(
            "invalid color '{color}', expected a hex color like #3B82F6"
        )))
    }
}
