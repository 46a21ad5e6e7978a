//! Entity name resolution across the current module, sibling modules and the
//! application-wide models directory.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::naming;

/// Root namespace of the modules when the project does not configure one.
pub const DEFAULT_MODULES_NAMESPACE: &str = "Modules";

/// Where a resolved entity was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Declared in the module being generated.
    CurrentModule,
    /// Declared in another module under the modules directory.
    OtherModule(String),
    /// Found in the application's global models directory.
    Global,
    /// Given as a fully-qualified class name.
    Qualified,
}

/// Outcome of resolving an entity reference.
///
/// Unresolved references do not fail compilation; the generated code uses the
/// bare name and a reviewable placeholder note instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Resolution {
    Resolved {
        /// Short class name, as used in `Target::class`.
        class: String,
        /// Fully-qualified class name, without a leading backslash.
        fqcn: String,
        tier: Tier,
    },
    Placeholder {
        class: String,
        reason: String,
    },
}

impl Resolution {
    pub fn class(&self) -> &str {
        match self {
            Resolution::Resolved { class, .. } | Resolution::Placeholder { class, .. } => class,
        }
    }

    pub fn fqcn(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { fqcn, .. } => Some(fqcn),
            Resolution::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Resolution::Placeholder { .. })
    }
}

/// The entities known to one compilation run.
///
/// Built fresh per run, so references left as placeholders are retried on the
/// next run once the target exists.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    module: String,
    local: Vec<String>,
    modules: BTreeMap<String, Vec<String>>,
    global: Vec<String>,
    global_namespace: String,
    modules_namespace: String,
}

impl EntityRegistry {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            local: Vec::new(),
            modules: BTreeMap::new(),
            global: Vec::new(),
            global_namespace: "App\\Models".to_string(),
            modules_namespace: DEFAULT_MODULES_NAMESPACE.to_string(),
        }
    }

    /// Root namespace the modules live under, `Modules` unless configured.
    pub fn with_modules_namespace(mut self, namespace: &str) -> Self {
        self.modules_namespace = namespace.trim_matches('\\').to_string();
        self
    }

    pub fn modules_namespace(&self) -> &str {
        &self.modules_namespace
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Entities of the current module (component list plus existing models).
    pub fn with_local<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for e in entities {
            push_unique(&mut self.local, e.into());
        }
        self
    }

    /// Entities of another module. Entries for the current module are merged
    /// into the local tier.
    pub fn with_module<I, S>(mut self, module: &str, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if module == self.module {
            return self.with_local(entities);
        }
        let slot = self.modules.entry(module.to_string()).or_default();
        for e in entities {
            push_unique(slot, e.into());
        }
        self
    }

    pub fn with_global<I, S>(mut self, namespace: &str, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_namespace = namespace.trim_matches('\\').to_string();
        for e in entities {
            push_unique(&mut self.global, e.into());
        }
        self
    }

    /// Namespace models of `module` live in.
    pub fn models_namespace_of(&self, module: &str) -> String {
        format!("{}\\{module}\\Models", self.modules_namespace)
    }

    /// Namespace of the current module's models.
    pub fn model_namespace(&self) -> String {
        self.models_namespace_of(&self.module)
    }

    /// Three-tier lookup, first match wins.
    pub fn resolve(&self, reference: &str) -> Resolution {
        let reference = reference.trim();
        if reference.contains('\\') {
            let fqcn = reference.trim_start_matches('\\').to_string();
            let class = fqcn.rsplit('\\').next().unwrap_or(&fqcn).to_string();
            return Resolution::Resolved {
                class,
                fqcn,
                tier: Tier::Qualified,
            };
        }

        let class = naming::studly(reference);
        if self.local.contains(&class) {
            return Resolution::Resolved {
                fqcn: format!("{}\\{class}", self.model_namespace()),
                class,
                tier: Tier::CurrentModule,
            };
        }
        if let Some((module, _)) = self.modules.iter().find(|(_, es)| es.contains(&class)) {
            return Resolution::Resolved {
                fqcn: format!("{}\\{class}", self.models_namespace_of(module)),
                class,
                tier: Tier::OtherModule(module.clone()),
            };
        }
        if self.global.contains(&class) {
            return Resolution::Resolved {
                fqcn: format!("{}\\{class}", self.global_namespace),
                class,
                tier: Tier::Global,
            };
        }
        Resolution::Placeholder {
            reason: format!(
                "no entity '{class}' in module '{}', other modules or {}",
                self.module, self.global_namespace
            ),
            class,
        }
    }

    /// The import a file in the current model namespace needs for `resolution`.
    pub fn model_import(&self, resolution: &Resolution) -> Option<String> {
        let fqcn = resolution.fqcn()?;
        let in_namespace = fqcn
            .rsplit_once('\\')
            .is_some_and(|(ns, _)| ns == self.model_namespace());
        (!in_namespace).then(|| fqcn.to_string())
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EntityRegistry {
        EntityRegistry::new("Blog")
            .with_local(["Post", "Comment"])
            .with_module("Auth", ["User", "Role"])
            .with_module("Billing", ["User", "Invoice"])
            .with_global("App\\Models", ["User", "Team"])
    }

    #[test]
    fn test_first_tier_wins() {
        let r = registry().with_local(["User"]);
        assert_eq!(r.resolve("User").fqcn(), Some("Modules\\Blog\\Models\\User"));
    }

    #[test]
    fn test_other_modules_before_global() {
        let r = registry();
        match r.resolve("User") {
            Resolution::Resolved { fqcn, tier, .. } => {
                assert_eq!(fqcn, "Modules\\Auth\\Models\\User");
                assert_eq!(tier, Tier::OtherModule("Auth".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(r.resolve("Team").fqcn(), Some("App\\Models\\Team"));
    }

    #[test]
    fn test_qualified_names_are_verbatim() {
        let r = registry();
        let res = r.resolve("\\Vendor\\Package\\Thing");
        assert_eq!(res.class(), "Thing");
        assert_eq!(res.fqcn(), Some("Vendor\\Package\\Thing"));
    }

    #[test]
    fn test_unknown_is_placeholder() {
        let res = registry().resolve("Tag");
        assert!(res.is_placeholder());
        assert_eq!(res.class(), "Tag");
        assert_eq!(res.fqcn(), None);
    }

    #[test]
    fn test_imports_only_outside_model_namespace() {
        let r = registry();
        assert_eq!(r.model_import(&r.resolve("Comment")), None);
        assert_eq!(
            r.model_import(&r.resolve("Role")).as_deref(),
            Some("Modules\\Auth\\Models\\Role")
        );
        assert_eq!(r.model_import(&r.resolve("Tag")), None);
    }

    #[test]
    fn test_configured_modules_namespace() {
        let r = registry().with_modules_namespace("\\Domain\\");
        assert_eq!(r.modules_namespace(), "Domain");
        assert_eq!(r.model_namespace(), "Domain\\Blog\\Models");
        assert_eq!(r.resolve("Role").fqcn(), Some("Domain\\Auth\\Models\\Role"));
        assert_eq!(r.model_import(&r.resolve("Comment")), None);
    }

    #[test]
    fn test_current_module_entries_merge_into_local() {
        let r = EntityRegistry::new("Blog").with_module("Blog", ["Post"]);
        assert!(matches!(
            r.resolve("Post"),
            Resolution::Resolved {
                tier: Tier::CurrentModule,
                ..
            }
        ));
    }
}
