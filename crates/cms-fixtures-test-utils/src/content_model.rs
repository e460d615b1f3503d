//! A small CMS content model on top of the in-memory backend.
//!
//! Kinds: node (article, page), file, taxonomy_term (tags), paragraph
//! (text, image) and menu_link_content.

use cms_fixtures_core::memory::InMemoryEntityStorage;
use cms_fixtures_core::{
    Entity, EntityKeys, EntityStorage, FieldDefinition, FieldValue, Fields, FixtureConfig,
    FixtureManager, StorageRegistry,
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ContentModel {
    pub node: Arc<InMemoryEntityStorage>,
    pub file: Arc<InMemoryEntityStorage>,
    pub taxonomy_term: Arc<InMemoryEntityStorage>,
    pub paragraph: Arc<InMemoryEntityStorage>,
    pub menu_link_content: Arc<InMemoryEntityStorage>,
    registry: StorageRegistry,
}

impl ContentModel {
    pub fn standard() -> Self {
        let node = Arc::new(
            InMemoryEntityStorage::new(
                "node",
                EntityKeys::new("nid").with_bundle("type").with_label("title"),
            )
            .with_bundle("article")
            .with_bundle("page")
            .with_field("title", FieldDefinition::plain())
            .with_field("body", FieldDefinition::plain())
            .with_field("image", FieldDefinition::file_reference())
            .with_field("field_tags", FieldDefinition::entity_reference("taxonomy_term"))
            .with_field("field_paragraphs", FieldDefinition::entity_reference("paragraph")),
        );
        let file = Arc::new(
            InMemoryEntityStorage::new("file", EntityKeys::new("fid").with_label("filename"))
                .with_field("uri", FieldDefinition::plain()),
        );
        let taxonomy_term = Arc::new(
            InMemoryEntityStorage::new(
                "taxonomy_term",
                EntityKeys::new("tid").with_bundle("vid").with_label("name"),
            )
            .with_bundle("tags")
            .with_field("description", FieldDefinition::plain()),
        );
        let paragraph = Arc::new(
            InMemoryEntityStorage::new("paragraph", EntityKeys::new("id").with_bundle("type"))
                .with_bundle("text")
                .with_bundle("image")
                .with_field("field_text", FieldDefinition::plain())
                .with_field("field_image", FieldDefinition::file_reference()),
        );
        let menu_link_content = Arc::new(
            InMemoryEntityStorage::new(
                "menu_link_content",
                EntityKeys::new("id").with_bundle("bundle").with_label("title"),
            )
            .with_bundle("menu_link_content")
            .with_field("link", FieldDefinition::plain())
            .with_field("menu_name", FieldDefinition::plain())
            .with_field("expanded", FieldDefinition::plain()),
        );

        let registry = StorageRegistry::new()
            .with_storage("node", node.clone())
            .with_storage("file", file.clone())
            .with_storage("taxonomy_term", taxonomy_term.clone())
            .with_storage("paragraph", paragraph.clone())
            .with_storage("menu_link_content", menu_link_content.clone());

        Self {
            node,
            file,
            taxonomy_term,
            paragraph,
            menu_link_content,
            registry,
        }
    }

    /// The in-memory backend for `kind`
    pub fn storage(&self, kind: &str) -> Option<&Arc<InMemoryEntityStorage>> {
        self.storages()
            .into_iter()
            .find(|storage| storage.kind().as_str() == kind)
    }

    pub fn storages(&self) -> [&Arc<InMemoryEntityStorage>; 5] {
        [
            &self.node,
            &self.file,
            &self.taxonomy_term,
            &self.paragraph,
            &self.menu_link_content,
        ]
    }

    /// Route a kind through another storage, e.g. a failing wrapper
    pub fn register(&mut self, kind: &str, storage: Arc<dyn EntityStorage>) {
        self.registry.register(kind, storage);
    }

    /// A fresh manager over this model
    pub fn manager(&self) -> FixtureManager {
        FixtureManager::new(Arc::new(self.registry.clone()))
    }

    pub fn manager_with_config(&self, config: FixtureConfig) -> FixtureManager {
        FixtureManager::with_config(Arc::new(self.registry.clone()), config)
    }

    /// A file that exists before the scenario starts
    pub async fn seed_file(&self, uri: &str) -> Entity {
        let filename = uri.rsplit('/').next().unwrap_or(uri);
        self.file
            .seed(Fields::from([
                ("uri".to_string(), FieldValue::from(uri)),
                ("filename".to_string(), FieldValue::from(filename)),
            ]))
            .await
    }

    /// A tag term that exists before the scenario starts
    pub async fn seed_term(&self, name: &str) -> Entity {
        self.taxonomy_term
            .seed(Fields::from([
                ("vid".to_string(), FieldValue::from("tags")),
                ("name".to_string(), FieldValue::from(name)),
            ]))
            .await
    }

    /// Entities currently stored across all kinds
    pub async fn stored_count(&self) -> usize {
        let mut total = 0;
        for storage in self.storages() {
            total += storage.count().await;
        }
        total
    }
}

impl Default for ContentModel {
    fn default() -> Self {
        Self::standard()
    }
}
