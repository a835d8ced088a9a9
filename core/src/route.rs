//! The single navigational route: `/store/<slug>`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Store { slug: String },
    /// Unmatched path; navigate to the default store instead.
    Redirect { to: String },
}

impl Route {
    pub fn resolve(path: &str, default_slug: &str) -> Self {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        let mut segments = trimmed.strip_prefix('/').unwrap_or(trimmed).split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some("store"), Some(slug), None) if !slug.is_empty() => Route::Store {
                slug: slug.to_string(),
            },
            _ => Route::Redirect {
                to: store_path(default_slug),
            },
        }
    }

    /// Resolve, following a redirect once, and return the store slug.
    pub fn slug_for(path: &str, default_slug: &str) -> String {
        match Self::resolve(path, default_slug) {
            Route::Store { slug } => slug,
            Route::Redirect { .. } => default_slug.to_string(),
        }
    }
}

pub fn store_path(slug: &str) -> String {
    format!("/store/{slug}")
}
