//! Best-effort lookups against Maven Central.
//!
//! Both queries are read-only and bounded by a client timeout. `exists`
//! never fails: an unreachable index is reported as "not confirmed".

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::CoreError;

pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2";
pub const PLUGIN_PATH: &str = "org/eolang/eo-maven-plugin";

const TIMEOUT: Duration = Duration::from_secs(10);

pub struct MavenCentral {
    client: Client,
    base: String,
    latest: OnceLock<String>,
}

impl MavenCentral {
    pub fn new() -> Result<Self, CoreError> {
        Self::with_base(MAVEN_CENTRAL)
    }

    pub fn with_base(base: impl Into<String>) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("eoc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            latest: OnceLock::new(),
        })
    }

    /// Latest released plugin version, fetched once per client.
    pub async fn latest(&self) -> Result<String, CoreError> {
        if let Some(version) = self.latest.get() {
            return Ok(version.clone());
        }
        let url = format!("{}/{}/maven-metadata.xml", self.base, PLUGIN_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("{url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Network(format!(
                "invalid response status #{} from {url}",
                status.as_u16()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("{url}: {e}")))?;
        let version = release_of(&body)
            .ok_or_else(|| CoreError::Network(format!("no <release> in {url}")))?;
        info!("The latest version of {PLUGIN_PATH} at {url} is {version}");
        Ok(self.latest.get_or_init(|| version).clone())
    }

    /// Whether the given plugin version is published.
    pub async fn exists(&self, version: Option<&str>) -> bool {
        let Some(version) = version.map(str::trim).filter(|v| is_meaningful(v)) else {
            return false;
        };
        let url = format!(
            "{}/{}/{version}/eo-maven-plugin-{version}.pom",
            self.base, PLUGIN_PATH
        );
        match self.client.head(&url).send().await {
            Ok(response) => {
                debug!("HEAD {url} -> {}", response.status());
                response.status().is_success()
            }
            Err(e) => {
                warn!("cannot check {url}: {e}");
                false
            }
        }
    }
}

fn is_meaningful(version: &str) -> bool {
    !version.is_empty() && version != "undefined" && version != "null"
}

/// Extracts `<versioning><release>` from a maven-metadata.xml document.
fn release_of(metadata: &str) -> Option<String> {
    let metadata = without_comments(metadata);
    let versioning = element(&metadata, "versioning")?;
    let release = element(versioning, "release")?.trim();
    (!release.is_empty()).then(|| release.to_string())
}

/// Inner text of the first `<name>..</name>` in `xml`.
fn element<'a>(xml: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    Some(&xml[start..end])
}

fn without_comments(xml: &str) -> String {
    let mut kept = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find("<!--") {
        kept.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + "-->".len()..],
            None => return kept,
        }
    }
    kept.push_str(rest);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_release_from_metadata() {
        let xml = r#"<?xml version="1.0"?>
<metadata>
  <groupId>org.eolang</groupId>
  <versioning>
    <latest>0.59.1</latest>
    <release> 0.59.0 </release>
  </versioning>
</metadata>"#;
        assert_eq!(release_of(xml).as_deref(), Some("0.59.0"));
        assert_eq!(release_of("<metadata/>"), None);
        assert_eq!(release_of("<versioning><release></release></versioning>"), None);
    }

    #[test]
    fn ignores_release_outside_versioning() {
        let xml = r#"<metadata>
  <!-- <versioning><release>0.0.1</release></versioning> -->
  <plugin><release>0.0.2</release></plugin>
  <versioning>
    <release>0.59.0</release>
  </versioning>
</metadata>"#;
        assert_eq!(release_of(xml).as_deref(), Some("0.59.0"));
        assert_eq!(release_of("<release>0.1.0</release>"), None);
        assert_eq!(release_of("<!-- <versioning><release>0.1.0</release>"), None);
    }

    /// Answers a single HTTP request with `body`, then closes.
    async fn serve_once(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn latest_is_fetched_once_and_cached() {
        let base = serve_once(
            "<metadata><versioning><release>0.60.1</release></versioning></metadata>",
        )
        .await;
        let central = MavenCentral::with_base(base).expect("client");
        assert_eq!(central.latest().await.expect("latest"), "0.60.1");
        assert_eq!(central.latest().await.expect("cached"), "0.60.1");
    }

    #[tokio::test]
    async fn malformed_versions_do_not_exist() {
        let central = MavenCentral::with_base("http://127.0.0.1:9").expect("client");
        assert!(!central.exists(None).await);
        assert!(!central.exists(Some("")).await);
        assert!(!central.exists(Some("undefined")).await);
        assert!(!central.exists(Some("null")).await);
    }

    #[tokio::test]
    async fn unreachable_index_degrades_to_false() {
        let central = MavenCentral::with_base("http://127.0.0.1:9").expect("client");
        assert!(!central.exists(Some("0.28.11")).await);
        assert!(central.latest().await.is_err());
    }
}
