//! Project catalog for the folio site.
//!
//! Each project page shows a long hero image in the preview frame next to a
//! column of sections. Info points map the preview's scroll percent to a
//! caption.
//!
//! # File Format
//!
//! ```json
//! [
//!   {
//!     "slug": "sara",
//!     "title": "Sara",
//!     "hero": "https://example.com/sara.jpg",
//!     "sections": [{ "id": "overview", "title": "", "text": "..." }],
//!     "infoPoints": [{ "percent": 0, "text": "..." }, { "percent": 30, "text": "..." }]
//!   }
//! ]
//! ```
//!
//! `hero` is either a URL or an ordered list of `{ "type": "image" | "video", "src": ... }`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Catalog bundled with the site.
const BUNDLED_CATALOG: &str = include_str!("../assets/projects.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroMedia {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hero {
    Url(String),
    Media(Vec<HeroMedia>),
}

impl Default for Hero {
    fn default() -> Self {
        Hero::Url(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
}

/// Caption shown once the preview is scrolled past `percent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPoint {
    pub percent: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub info_points: Vec<InfoPoint>,
}

impl Project {
    /// First image in the hero, if any.
    pub fn hero_image(&self) -> Option<&str> {
        match &self.hero {
            Hero::Url(url) if !url.is_empty() => Some(url.as_str()),
            Hero::Url(_) => None,
            Hero::Media(media) => media
                .iter()
                .find(|m| m.kind == MediaKind::Image)
                .map(|m| m.src.as_str()),
        }
    }

    /// Last info point whose percent is at or below `percent`.
    pub fn active_info_point(&self, percent: u8) -> Option<&InfoPoint> {
        self.info_points
            .iter()
            .take_while(|p| p.percent <= percent)
            .last()
    }
}

/// A resolved project page with its neighbours.
#[derive(Debug, Clone, Copy)]
pub struct ProjectPage<'a> {
    pub index: usize,
    pub project: &'a Project,
    pub prev: Option<&'a Project>,
    pub next: Option<&'a Project>,
}

/// Ordered, validated list of projects. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Result<Self, CatalogError> {
        if projects.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for project in &projects {
            if !seen.insert(project.slug.as_str()) {
                return Err(CatalogError::DuplicateSlug(project.slug.clone()));
            }
            let ordered = project
                .info_points
                .windows(2)
                .all(|w| w[0].percent <= w[1].percent);
            if !ordered {
                return Err(CatalogError::UnorderedInfoPoints(project.slug.clone()));
            }
        }

        Ok(Self { projects })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let projects: Vec<Project> = serde_json::from_str(json)?;
        Self::new(projects)
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} projects from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn position(&self, slug: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.slug == slug)
    }

    /// Page for `slug`, falling back to the first project.
    pub fn page(&self, slug: Option<&str>) -> ProjectPage<'_> {
        let index = match slug.and_then(|s| self.position(s)) {
            Some(index) => index,
            None => {
                if let Some(slug) = slug {
                    log::debug!("Unknown project {:?}, showing the first one", slug);
                }
                0
            }
        };
        ProjectPage {
            index,
            project: &self.projects[index],
            prev: index.checked_sub(1).and_then(|i| self.projects.get(i)),
            next: self.projects.get(index + 1),
        }
    }
}

/// Errors that can occur when loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse project catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Project catalog is empty")]
    Empty,

    #[error("Info points of project '{0}' are not in ascending order")]
    UnorderedInfoPoints(String),

    #[error("Duplicate project slug '{0}'")]
    DuplicateSlug(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
