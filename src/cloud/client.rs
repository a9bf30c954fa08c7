use anyhow::{Context, Result};
use log::warn;
use rusoto_core::{HttpClient, Region};
use rusoto_credential::{ChainProvider, ProfileProvider};
use rusoto_s3::S3Client;

/// Resolve a region name, optionally pointing at an S3-compatible endpoint.
pub fn resolve_region(region_name: Option<&str>, endpoint: Option<&str>) -> Region {
    if let Some(endpoint) = endpoint {
        return Region::Custom {
            name: region_name.unwrap_or("us-east-1").to_string(),
            endpoint: endpoint.to_string(),
        };
    }

    match region_name {
        Some(name) => match name.parse::<Region>() {
            Ok(r) => r,
            Err(_) => {
                warn!("Invalid region '{}', using default", name);
                Region::default()
            }
        },
        None => Region::default(),
    }
}

/// Create an S3 client with the specified region and profile
pub fn create_s3_client(region: Region, profile: Option<&str>) -> Result<S3Client> {
    let http_client = HttpClient::new().context("Failed to create HTTP client")?;

    let s3_client = match profile {
        Some(profile_name) => {
            let mut provider =
                ProfileProvider::new().context("Failed to create AWS profile provider")?;
            provider.set_profile(profile_name);
            S3Client::new_with(http_client, provider, region)
        }
        None => S3Client::new_with(http_client, ChainProvider::new(), region),
    };

    Ok(s3_client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_region_by_name() {
        assert_eq!(resolve_region(Some("eu-west-1"), None).name(), "eu-west-1");
    }

    #[test]
    fn test_resolve_region_invalid_falls_back() {
        assert_eq!(
            resolve_region(Some("invalid-region"), None).name(),
            Region::default().name()
        );
    }

    #[test]
    fn test_resolve_region_custom_endpoint() {
        match resolve_region(None, Some("http://localhost:9000")) {
            Region::Custom { name, endpoint } => {
                assert_eq!(name, "us-east-1");
                assert_eq!(endpoint, "http://localhost:9000");
            }
            other => panic!("Expected custom region, got {:?}", other),
        }
    }
}
