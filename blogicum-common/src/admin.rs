//! Registration table for the admin interface.
//!
//! The server builds one [`AdminSite`] at startup and hands it to the admin
//! routes through router state.

use serde::Serialize;

pub const DEFAULT_LIST_PER_PAGE: u32 = 10;

/// How one model is presented in the admin listings.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct ModelAdmin {
    pub model: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub list_editable: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub list_per_page: u32,
}

pub const POST_ADMIN: ModelAdmin = ModelAdmin {
    model: "posts",
    verbose_name: "post",
    verbose_name_plural: "posts",
    list_display: &[
        "title",
        "text_short",
        "location",
        "category",
        "pub_date",
        "is_published",
    ],
    list_editable: &["location", "category", "pub_date", "is_published"],
    search_fields: &["title", "text", "location"],
    list_filter: &[],
    list_per_page: DEFAULT_LIST_PER_PAGE,
};

pub const CATEGORY_ADMIN: ModelAdmin = ModelAdmin {
    model: "categories",
    verbose_name: "category",
    verbose_name_plural: "categories",
    list_display: &[
        "title",
        "description_short",
        "slug",
        "is_published",
        "created_at",
    ],
    list_editable: &["slug"],
    search_fields: &[],
    list_filter: &["title", "description"],
    list_per_page: DEFAULT_LIST_PER_PAGE,
};

pub const LOCATION_ADMIN: ModelAdmin = ModelAdmin {
    model: "locations",
    verbose_name: "location",
    verbose_name_plural: "locations",
    list_display: &["name", "is_published", "created_at"],
    list_editable: &["is_published"],
    search_fields: &[],
    list_filter: &["name"],
    list_per_page: DEFAULT_LIST_PER_PAGE,
};

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
pub struct AdminSite {
    models: Vec<ModelAdmin>,
}

impl AdminSite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The site with the post, category and location admins registered.
    #[must_use]
    pub fn blog() -> Self {
        Self::new()
            .register(POST_ADMIN)
            .register(CATEGORY_ADMIN)
            .register(LOCATION_ADMIN)
    }

    /// Registers `model_admin`, replacing an earlier entry for the same model.
    #[must_use]
    pub fn register(mut self, model_admin: ModelAdmin) -> Self {
        self.models.retain(|registered| registered.model != model_admin.model);
        self.models.push(model_admin);
        self
    }

    #[must_use]
    pub fn get(&self, model: &str) -> Option<&ModelAdmin> {
        self.models.iter().find(|registered| registered.model == model)
    }

    #[must_use]
    pub fn models(&self) -> &[ModelAdmin] {
        &self.models
    }
}

impl ModelAdmin {
    /// Whether `field` is shown as a column of the listing.
    #[must_use]
    pub fn displays(&self, field: &str) -> bool {
        field == "id" || self.list_display.contains(&field)
    }

    /// Fields a listing search matches against.
    #[must_use]
    pub fn searchable_fields(&self) -> &'static [&'static str] {
        if self.search_fields.is_empty() {
            self.list_filter
        } else {
            self.search_fields
        }
    }

    /// Row offset of the one-based `page`.
    #[must_use]
    pub fn offset(&self, page: u32) -> u32 {
        page.saturating_sub(1).saturating_mul(self.list_per_page)
    }
}
