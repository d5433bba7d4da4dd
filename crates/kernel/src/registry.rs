use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Migration, Module};

/// Core modules in boot order. The HTTP server is started separately once
/// every module is up.
const CORE_MODULE_ORDER: &[&str] = &["db"];

/// Module registry for managing module lifecycle with core/domain separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    domain_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            domain_modules: Vec::new(),
        }
    }

    /// Register an infrastructure module (database, ...)
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    /// Register a domain module (books, users, ...)
    pub fn register_domain(&mut self, module: Arc<dyn Module>) {
        self.domain_modules.push(module);
    }

    /// All registered modules, core first, in boot order
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        let mut all = self.ordered_core();
        all.extend(self.domain_modules.iter());
        all
    }

    /// Core modules sorted by `CORE_MODULE_ORDER`; unknown core modules go last.
    fn ordered_core(&self) -> Vec<&Arc<dyn Module>> {
        let mut core: Vec<_> = self.core_modules.iter().collect();
        core.sort_by_key(|module| {
            CORE_MODULE_ORDER
                .iter()
                .position(|name| *name == module.name())
                .unwrap_or(CORE_MODULE_ORDER.len())
        });
        core
    }

    /// Initialize every module, core first
    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "initializing module");
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Start every module, core first
    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.modules() {
            tracing::info!(module = module.name(), "starting module");
            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Stop every module in reverse boot order, so domain modules stop
    /// before the infrastructure they depend on
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        for module in self.modules().into_iter().rev() {
            tracing::info!(module = module.name(), "stopping module");
            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Collect migrations from all modules, sorted by module name then id
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<(String, Migration)> = self
            .modules()
            .into_iter()
            .flat_map(|module| {
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (module.name().to_string(), migration))
            })
            .collect();

        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));
        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::sync::Mutex;

    struct TestModule {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push(format!("init:{}", self.name));
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.journal.lock().unwrap().push(format!("stop:{}", self.name));
            Ok(())
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX t_idx ON t (id);",
                },
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE t (id INTEGER);",
                },
            ]
        }
    }

    fn module(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Module> {
        Arc::new(TestModule {
            name,
            journal: journal.clone(),
        })
    }

    #[test]
    fn empty_registry_has_no_modules_or_migrations() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn migrations_are_sorted_by_module_then_id() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_domain(module("users", &journal));
        registry.register_domain(module("books", &journal));

        let order: Vec<_> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| format!("{module}/{}", migration.id))
            .collect();

        assert_eq!(
            order,
            vec![
                "books/001_init",
                "books/002_index",
                "users/001_init",
                "users/002_index"
            ]
        );
    }

    #[tokio::test]
    async fn lifecycle_runs_core_first_and_stops_in_reverse() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_domain(module("books", &journal));
        registry.register_core(module("db", &journal));

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["init:db", "init:books", "stop:books", "stop:db"]
        );
    }
}
