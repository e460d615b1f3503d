use cms_fixtures_core::{
    ChildFixture, CleanupSummary, Entity, EntityKind, FixtureConfig, FixtureError, FixtureManager,
};
use cms_fixtures_test_utils::{ContentModel, FailableEntityStorage};
use cucumber::World;
use std::collections::HashMap;
use std::sync::Arc;

/// World struct that holds state across step definitions
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct FixtureWorld {
    /// Backing in-memory storages, one per entity kind
    pub model: ContentModel,
    pub manager: FixtureManager,
    /// Failure switches wrapping every kind of the model
    pub failing: HashMap<String, Arc<FailableEntityStorage>>,

    /// Error of the last step that was allowed to fail
    pub last_error: Option<FixtureError>,
    pub viewing: Option<Entity>,
    pub last_cleanup: Option<CleanupSummary>,
}

impl FixtureWorld {
    pub fn new() -> Self {
        let mut model = ContentModel::standard();
        let mut failing = HashMap::new();

        let storages: Vec<_> = model.storages().into_iter().cloned().collect();
        for storage in storages {
            let kind = storage.kind().to_string();
            let wrapper = Arc::new(FailableEntityStorage::new(storage));
            model.register(&kind, wrapper.clone());
            failing.insert(kind, wrapper);
        }

        let manager = model.manager_with_config(FixtureConfig::load());
        Self {
            model,
            manager,
            failing,
            last_error: None,
            viewing: None,
            last_cleanup: None,
        }
    }

    pub fn failable(&self, kind: &str) -> &Arc<FailableEntityStorage> {
        self.failing
            .get(kind)
            .unwrap_or_else(|| panic!("No storage for entity kind {}", kind))
    }

    /// A paragraph-style child of the configured child kind
    pub fn child(&self, child_type: String, field: String) -> ChildFixture {
        ChildFixture::new(self.manager.config().child_kind.clone(), child_type, field)
    }

    /// The `index`-th tracked entity of `kind`, counted from 0
    pub fn tracked(&self, kind: &str, index: usize) -> &Entity {
        self.manager
            .tracked_entity(&EntityKind::from(kind), index)
            .unwrap_or_else(|err| panic!("{}", err))
    }

    /// Scenario teardown; runs at most once per scenario
    pub async fn clean_up(&mut self) {
        if self.last_cleanup.is_none() {
            self.last_cleanup = Some(self.manager.cleanup().await);
        }
    }
}
