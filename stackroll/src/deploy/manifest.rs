//! Image rewriting of compose manifests

use serde_yaml::Value;
use tracing::{debug, info};

use crate::errors::DeployError;

/// How the images of the selected services change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    /// Keep the repository, replace the tag
    Tag(String),
    /// Replace the whole image reference
    Image(String),
}

/// Replace the tag of an image reference
///
/// A registry port (`registry:5000/app`) is not a tag and a digest is
/// dropped, since it would pin the old image.
pub fn replace_tag(image: &str, tag: &str) -> String {
    let repository = image.split('@').next().unwrap_or(image);
    let name_start = repository.rfind('/').map(|i| i + 1).unwrap_or(0);
    let repository = match repository[name_start..].rfind(':') {
        Some(i) => &repository[..name_start + i],
        None => repository,
    };
    format!("{}:{}", repository, tag)
}

/// Apply `change` to every service with an image, or only to `service`
pub fn rewrite_images(
    content: &str,
    change: &ImageChange,
    service: Option<&str>,
) -> Result<String, DeployError> {
    let mut doc: Value = serde_yaml::from_str(content)?;

    let services = doc
        .get_mut("services")
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| DeployError::ManifestError("Manifest has no services section".to_string()))?;

    if let Some(name) = service {
        if !services.contains_key(name) {
            return Err(DeployError::ManifestError(format!(
                "Service {} is not defined in the manifest",
                name
            )));
        }
    }

    let mut rewritten = 0;
    for (name, definition) in services.iter_mut() {
        let name = name.as_str().unwrap_or_default();
        if service.is_some_and(|s| s != name) {
            continue;
        }
        let Some(image) = definition.get_mut("image") else {
            debug!("Service {} builds its image, skipping", name);
            continue;
        };
        let Some(current) = image.as_str() else {
            continue;
        };

        let updated = match change {
            ImageChange::Tag(tag) => replace_tag(current, tag),
            ImageChange::Image(reference) => reference.clone(),
        };
        info!("Service {}: {} -> {}", name, current, updated);
        *image = Value::String(updated);
        rewritten += 1;
    }

    if rewritten == 0 {
        return Err(DeployError::ManifestError(
            "No service image to update in the manifest".to_string(),
        ));
    }

    Ok(serde_yaml::to_string(&doc)?)
}
