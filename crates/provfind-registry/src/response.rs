//! Wire format of provider registry responses.

use serde::Deserialize;

/// Body of `GET {namespace}/{type}/versions`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionsResponse {
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformEntry {
    pub os: String,
    pub arch: String,
}

/// Body of `GET {namespace}/{type}/{version}/download/{os}/{arch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadResponse {
    #[serde(default)]
    pub protocols: Vec<String>,
    pub os: String,
    pub arch: String,
    pub filename: String,
    pub download_url: String,
    pub shasums_url: Option<String>,
    pub shasums_signature_url: Option<String>,
    pub shasum: Option<String>,
    #[serde(default)]
    pub signing_keys: SigningKeys,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigningKeys {
    #[serde(default)]
    pub gpg_public_keys: Vec<GpgPublicKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GpgPublicKey {
    pub key_id: String,
    pub ascii_armor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_response() {
        let body = r#"{
            "id": "hashicorp/random",
            "versions": [
                {"version": "2.0.0", "protocols": ["4.0", "5.1"], "platforms": [{"os": "linux", "arch": "amd64"}]},
                {"version": "2.0.1"}
            ],
            "warnings": null
        }"#;

        let resp: VersionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.versions.len(), 2);
        assert_eq!(resp.versions[0].protocols, ["4.0", "5.1"]);
        assert_eq!(resp.versions[0].platforms[0].arch, "amd64");
        assert!(resp.versions[1].platforms.is_empty());
    }

    #[test]
    fn test_download_response_minimal() {
        let body = r#"{
            "os": "linux",
            "arch": "amd64",
            "filename": "p.zip",
            "download_url": "https://example.com/p.zip"
        }"#;

        let resp: DownloadResponse = serde_json::from_str(body).unwrap();
        assert!(resp.shasum.is_none());
        assert!(resp.signing_keys.gpg_public_keys.is_empty());
    }
}
