//! Docker Hub clients.
//!
//! Two collaborators live here: the build-script source that reads an
//! image's published Dockerfile page on the Hub, and the registry v2
//! client that resolves an image to its manifest digest (token auth per
//! the registry's Bearer challenge).

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use monodef_core::config::ConvertConfig;
use monodef_core::error::{MonodefError, Result};

use crate::reference::ImageReference;

/// Marker the Hub serves (with a 200) instead of a 404 for unknown pages.
const NOT_FOUND_MARKER: &str = "RouteNotFound404Page";

/// Accept header for v2 image manifests; the digest header is only
/// correct against the v2 manifest.
const MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Source of raw build-script text for an image.
#[async_trait]
pub trait BuildScriptSource: Send + Sync {
    /// Fetch the build script an image was built from.
    ///
    /// Fails with `NotFound` when the image has no published build
    /// script and `Transport` on network failure.
    async fn fetch_build_script(&self, image: &ImageReference) -> Result<String>;
}

/// Build-script and digest access backed by Docker Hub.
pub struct DockerHub {
    http: reqwest::Client,
    hub_url: String,
    registry_url: String,
}

/// Token endpoint response for the registry auth flow.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

impl DockerHub {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            hub_url: config.hub_url.trim_end_matches('/').to_string(),
            registry_url: config.registry_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the Hub page that carries an image's Dockerfile.
    fn dockerfile_url(&self, image: &ImageReference) -> String {
        format!("{}/r/{}/~/dockerfile/", self.hub_url, image.hub_repository())
    }

    /// Resolve the manifest digest for an image via the registry v2 API.
    ///
    /// The registry root answers 401 with the token endpoint in its
    /// `Www-Authenticate` header; a pull-scoped bearer token is then
    /// requested and the digest read off a HEAD of the manifest.
    pub async fn resolve_digest(&self, image: &ImageReference) -> Result<String> {
        let root_url = format!("{}/", self.registry_url);
        let root = self
            .http
            .get(&root_url)
            .send()
            .await
            .map_err(|e| transport(&root_url, &e.to_string()))?;
        let challenge = root
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| transport(&root_url, "missing Www-Authenticate header"))?;
        let (realm, service) = parse_www_authenticate(challenge)?;

        let token_url = format!(
            "{}?service={}{}",
            realm,
            service,
            pull_scope(&image.registry_repository())
        );
        tracing::debug!(url = %token_url, "requesting registry token");
        let token: TokenResponse = self
            .http
            .get(&token_url)
            .send()
            .await
            .map_err(|e| transport(&token_url, &e.to_string()))?
            .json()
            .await
            .map_err(|e| transport(&token_url, &e.to_string()))?;

        let manifest_url = format!(
            "{}/{}/manifests/{}",
            self.registry_url,
            image.registry_repository(),
            image.manifest_reference()
        );
        tracing::debug!(url = %manifest_url, "resolving manifest digest");
        let response = self
            .http
            .head(&manifest_url)
            .bearer_auth(&token.token)
            .header("Accept", MANIFEST_V2)
            .send()
            .await
            .map_err(|e| transport(&manifest_url, &e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MonodefError::NotFound(image.to_string()));
        }
        if !response.status().is_success() {
            return Err(transport(
                &manifest_url,
                &format!("registry returned {}", response.status()),
            ));
        }
        response
            .headers()
            .get("docker-content-digest")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| transport(&manifest_url, "missing Docker-Content-Digest header"))
    }
}

#[async_trait]
impl BuildScriptSource for DockerHub {
    async fn fetch_build_script(&self, image: &ImageReference) -> Result<String> {
        let url = self.dockerfile_url(image);
        tracing::debug!(url = %url, "fetching build script page");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, &e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| transport(&url, &e.to_string()))?;

        if body.contains(NOT_FOUND_MARKER) {
            return Err(MonodefError::NotFound(image.to_string()));
        }
        match extract_script_block(&body)? {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(MonodefError::NotFound(image.to_string())),
        }
    }
}

/// Scope query fragment for a pull-only token request.
fn pull_scope(repository: &str) -> String {
    format!("&scope=repository:{}:pull", repository)
}

/// Parse the realm and service out of a Bearer challenge header.
fn parse_www_authenticate(header: &str) -> Result<(String, String)> {
    let re = Regex::new(r#"realm="([^"]*)",service="([^"]*)""#)
        .map_err(|e| MonodefError::Other(e.to_string()))?;
    let caps = re
        .captures(header)
        .ok_or_else(|| MonodefError::Other(format!("unrecognized auth challenge: {}", header)))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Pull the text out of the first highlight block on a Hub page.
///
/// Tags are stripped and basic HTML entities unescaped. Multiple blocks
/// are unexpected; the first wins.
fn extract_script_block(html: &str) -> Result<Option<String>> {
    let block_re = Regex::new(r#"(?s)<div[^>]*class="[^"]*hljs[^"]*"[^>]*>(.*?)</div>"#)
        .map_err(|e| MonodefError::Other(e.to_string()))?;
    let mut blocks = block_re.captures_iter(html);
    let first = match blocks.next() {
        Some(captures) => captures,
        None => return Ok(None),
    };
    if blocks.next().is_some() {
        tracing::warn!("multiple highlight blocks on page; using the first");
    }

    let tag_re = Regex::new(r"<[^>]+>").map_err(|e| MonodefError::Other(e.to_string()))?;
    let text = tag_re.replace_all(&first[1], "");
    Ok(Some(unescape_entities(&text)))
}

/// Undo the HTML entity escaping the Hub applies to script text.
fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn transport(endpoint: &str, message: &str) -> MonodefError {
    MonodefError::Transport {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> DockerHub {
        DockerHub::new(&ConvertConfig::default())
    }

    #[test]
    fn test_dockerfile_url_official_image() {
        let image = ImageReference::parse("nginx").unwrap();
        assert_eq!(
            hub().dockerfile_url(&image),
            "https://hub.docker.com/r/_/nginx/~/dockerfile/"
        );
    }

    #[test]
    fn test_dockerfile_url_namespaced_image() {
        let image = ImageReference::parse("jupyterhub/jupyterhub:3.1").unwrap();
        assert_eq!(
            hub().dockerfile_url(&image),
            "https://hub.docker.com/r/jupyterhub/jupyterhub/~/dockerfile/"
        );
    }

    #[test]
    fn test_pull_scope() {
        assert_eq!(
            pull_scope("library/nginx"),
            "&scope=repository:library/nginx:pull"
        );
    }

    #[test]
    fn test_parse_www_authenticate() {
        let header = r#"Bearer realm="https://auth.docker.io/token",service="registry.docker.io""#;
        let (realm, service) = parse_www_authenticate(header).unwrap();
        assert_eq!(realm, "https://auth.docker.io/token");
        assert_eq!(service, "registry.docker.io");
    }

    #[test]
    fn test_parse_www_authenticate_rejects_garbage() {
        assert!(parse_www_authenticate("Basic realm=nope").is_err());
    }

    #[test]
    fn test_extract_script_block() {
        let html = concat!(
            "<html><body>",
            r#"<div class="styles_codeBlock hljs language-dockerfile">"#,
            "<span>FROM</span> alpine:3.19\n<span>RUN</span> apk add curl\n",
            "</div></body></html>"
        );
        let text = extract_script_block(html).unwrap().unwrap();
        assert_eq!(text, "FROM alpine:3.19\nRUN apk add curl\n");
    }

    #[test]
    fn test_extract_script_block_unescapes_entities() {
        let html = r#"<div class="hljs">RUN echo &quot;a &amp; b&quot; &gt; /out</div>"#;
        let text = extract_script_block(html).unwrap().unwrap();
        assert_eq!(text, "RUN echo \"a & b\" > /out");
    }

    #[test]
    fn test_extract_script_block_missing() {
        assert_eq!(extract_script_block("<html><body>nothing</body></html>").unwrap(), None);
    }

    #[test]
    fn test_extract_script_block_takes_first() {
        let html = r#"<div class="hljs">FROM a</div><div class="hljs">FROM b</div>"#;
        let text = extract_script_block(html).unwrap().unwrap();
        assert_eq!(text, "FROM a");
    }
}
