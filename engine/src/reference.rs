//! Image reference parsing.
//!
//! Parses compact references like `jupyterhub/jupyterhub:3.1` into structured
//! components following the `[namespace/]name[:tag|@digest]` grammar.

use monodef_core::error::{MonodefError, Result};

/// Default tag when none is specified.
const DEFAULT_TAG: &str = "latest";

/// Namespace the Docker Hub web routes use for official images.
const HUB_DEFAULT_NAMESPACE: &str = "_";

/// Namespace the registry v2 API uses for official images.
const REGISTRY_DEFAULT_NAMESPACE: &str = "library";

/// Parsed image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Publisher namespace (e.g., "jupyterhub"); absent for official images
    pub namespace: Option<String>,
    /// Image name (e.g., "jupyterhub")
    pub name: String,
    /// Tag (e.g., "latest", "3.1")
    pub tag: Option<String>,
    /// Digest (e.g., "sha256:abc123...")
    pub digest: Option<String>,
}

impl ImageReference {
    /// Parse an image reference string.
    ///
    /// Supports formats:
    /// - `nginx` → nginx:latest
    /// - `nginx:1.25` → nginx:1.25
    /// - `myuser/myimage` → myuser/myimage:latest
    /// - `myuser/myimage@sha256:abc...` → digest-addressed
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MonodefError::MalformedImageReference(
                "empty reference".to_string(),
            ));
        }

        // Split off digest first (@ separator)
        let (name_part, digest) = if let Some(at_pos) = reference.find('@') {
            let digest_part = &reference[at_pos + 1..];
            if !digest_part.contains(':') {
                return Err(MonodefError::MalformedImageReference(format!(
                    "invalid digest in '{}': expected algorithm:hex",
                    reference
                )));
            }
            (&reference[..at_pos], Some(digest_part.to_string()))
        } else {
            (reference, None)
        };

        // Tag is everything after the first colon; it may itself contain
        // colons (sloppy digest-as-tag references are tolerated).
        let (name_part, tag) = if let Some(colon_pos) = name_part.find(':') {
            let tag = &name_part[colon_pos + 1..];
            if tag.is_empty() || !is_tag(tag) {
                return Err(MonodefError::MalformedImageReference(format!(
                    "invalid tag in '{}'",
                    reference
                )));
            }
            (&name_part[..colon_pos], Some(tag.to_string()))
        } else {
            (name_part, None)
        };

        // Namespace is the single path component before the name
        let (namespace, name) = if let Some(slash_pos) = name_part.find('/') {
            (
                Some(name_part[..slash_pos].to_string()),
                &name_part[slash_pos + 1..],
            )
        } else {
            (None, name_part)
        };

        if let Some(ref ns) = namespace {
            if !is_name_component(ns) {
                return Err(MonodefError::MalformedImageReference(format!(
                    "invalid namespace in '{}'",
                    reference
                )));
            }
        }
        if !is_name_component(name) {
            return Err(MonodefError::MalformedImageReference(format!(
                "invalid name in '{}'",
                reference
            )));
        }

        // Apply default tag if no tag and no digest
        let tag = if tag.is_none() && digest.is_none() {
            Some(DEFAULT_TAG.to_string())
        } else {
            tag
        };

        Ok(ImageReference {
            namespace,
            name: name.to_string(),
            tag,
            digest,
        })
    }

    /// Repository path for the Docker Hub web routes
    /// (`_/nginx` for official images).
    pub fn hub_repository(&self) -> String {
        format!(
            "{}/{}",
            self.namespace.as_deref().unwrap_or(HUB_DEFAULT_NAMESPACE),
            self.name
        )
    }

    /// Repository path for the registry v2 API
    /// (`library/nginx` for official images).
    pub fn registry_repository(&self) -> String {
        format!(
            "{}/{}",
            self.namespace
                .as_deref()
                .unwrap_or(REGISTRY_DEFAULT_NAMESPACE),
            self.name
        )
    }

    /// Tag or digest used when addressing a manifest.
    pub fn manifest_reference(&self) -> &str {
        if let Some(ref digest) = self.digest {
            digest
        } else if let Some(ref tag) = self.tag {
            tag
        } else {
            DEFAULT_TAG
        }
    }

    /// Get the full reference string.
    pub fn full_reference(&self) -> String {
        let mut s = String::new();
        if let Some(ref ns) = self.namespace {
            s.push_str(ns);
            s.push('/');
        }
        s.push_str(&self.name);
        if let Some(ref tag) = self.tag {
            s.push(':');
            s.push_str(tag);
        }
        if let Some(ref digest) = self.digest {
            s.push('@');
            s.push_str(digest);
        }
        s
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_reference())
    }
}

/// Namespace and name components: letters, digits, `_`, `-`, `.`.
fn is_name_component(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Tags additionally allow `:` (digest-as-tag tolerance).
fn is_tag(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}
