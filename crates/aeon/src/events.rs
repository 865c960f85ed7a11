use orrery::{Category, CategoryId};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Select(CategoryId),
    Close,
    ConfigReload,
    CatalogLoaded(Vec<Category>),
}
