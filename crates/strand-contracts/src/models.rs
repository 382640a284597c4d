use indexmap::IndexMap;

/// Capabilities used when resolving a model for an operation.
pub const CAP_STRUCTURED: &str = "structured";
pub const CAP_IMAGE: &str = "image";
pub const CAP_VIDEO: &str = "video";
pub const CAP_GROUNDED: &str = "grounded";
pub const CAP_TEXT: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub capabilities: Vec<String>,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    /// First registered model carrying `capability`, in declaration order.
    pub fn default_for(&self, capability: &str) -> Option<&ModelSpec> {
        self.models.values().find(|model| model.supports(capability))
    }

    /// Resolves `requested` when given and capable, otherwise falls back to
    /// the registry default for the capability.
    pub fn resolve(&self, requested: Option<&str>, capability: &str) -> Result<ModelSpec, String> {
        if let Some(name) = requested {
            match self.get(name) {
                Some(model) if model.supports(capability) => return Ok(model.clone()),
                Some(_) => {
                    return Err(format!(
                        "model '{name}' does not support capability '{capability}'"
                    ))
                }
                None => return Err(format!("unknown model '{name}'")),
            }
        }
        self.default_for(capability)
            .cloned()
            .ok_or_else(|| format!("no models available for capability '{capability}'"))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, capabilities: &[&str]| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                capabilities: capabilities
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
            },
        );
    };

    insert("gemini-3-pro-preview", &[CAP_TEXT, "vision", CAP_STRUCTURED]);
    insert("gemini-2.5-flash-image", &[CAP_IMAGE, "edit"]);
    insert("veo-3.1-fast-generate-preview", &[CAP_VIDEO]);
    insert("gemini-2.5-flash", &[CAP_TEXT, CAP_GROUNDED]);
    insert("gemini-flash-lite-latest", &[CAP_TEXT]);

    map
}
