use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use rusoto_core::{ByteStream, Region, RusotoError};
use rusoto_s3::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompletedMultipartUpload,
    CompletedPart, CreateMultipartUploadRequest, HeadObjectError, HeadObjectRequest,
    ListObjectsV2Request, PutObjectRequest, S3Client, UploadPartRequest, S3,
};
use tokio::runtime::Runtime;

use crate::cloud::backend::{object_key, parse_location, StorageBackend};
use crate::cloud::client::create_s3_client;
use crate::cloud::block_on_runtime;
use crate::constants::{LARGE_FILE_THRESHOLD, S3_UPLOAD_CHUNK_SIZE};

/// Amazon S3 backend scoped to one bucket.
///
/// Uploads below [`LARGE_FILE_THRESHOLD`] use a single `PutObject`; larger
/// files go through a multipart upload whose parts are sent one after the
/// other. A failed multipart upload is aborted so no orphaned parts remain.
pub struct S3Backend {
    bucket: String,
    client: S3Client,
    runtime: Runtime,
}

impl S3Backend {
    /// Create a backend for `bucket` in the given region.
    pub fn new(bucket: &str, region: Region, profile: Option<&str>) -> Result<Self> {
        let runtime = block_on_runtime()?;
        let client = {
            let _guard = runtime.enter();
            create_s3_client(region, profile)?
        };

        Ok(Self {
            bucket: bucket.to_string(),
            client,
            runtime,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Reduce a destination key to an object key inside this bucket.
    fn key_in_bucket<'a>(&self, destination_key: &'a str) -> Result<&'a str> {
        if let Some(location) = parse_location(destination_key) {
            if location.authority != self.bucket {
                bail!(
                    "Destination {} is outside of bucket {}",
                    destination_key,
                    self.bucket
                );
            }
        }
        Ok(object_key(destination_key))
    }

    async fn head_exists(&self, key: &str) -> Result<bool> {
        let request = HeadObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            ..Default::default()
        };

        match self.client.head_object(request).await {
            Ok(_) => Ok(true),
            Err(RusotoError::Service(HeadObjectError::NoSuchKey(_))) => Ok(false),
            Err(RusotoError::Unknown(response)) if response.status.as_u16() == 404 => Ok(false),
            Err(e) => Err(anyhow!(
                "Failed to check s3://{}/{}: {}",
                self.bucket,
                key,
                e
            )),
        }
    }

    async fn prefix_exists(&self, prefix: &str) -> Result<bool> {
        let request = ListObjectsV2Request {
            bucket: self.bucket.clone(),
            prefix: Some(format!("{}/", prefix)),
            max_keys: Some(1),
            ..Default::default()
        };

        let output = self
            .client
            .list_objects_v2(request)
            .await
            .context(format!("Failed to list s3://{}/{}", self.bucket, prefix))?;

        Ok(output.contents.map_or(false, |objects| !objects.is_empty()))
    }

    /// Upload a small file using PutObject
    async fn upload_small_file(&self, file_path: &Path, key: &str) -> Result<u64> {
        let contents = fs::read(file_path)
            .context(format!("Failed to read {} for S3 upload", file_path.display()))?;
        let size = contents.len() as u64;

        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            content_length: Some(size as i64),
            body: Some(ByteStream::from(contents)),
            ..Default::default()
        };

        self.client
            .put_object(request)
            .await
            .map_err(|e| anyhow!("Failed to upload {} to s3://{}/{}: {}", file_path.display(), self.bucket, key, e))?;

        Ok(size)
    }

    /// Upload a large file using multipart upload
    async fn upload_large_file(&self, file_path: &Path, key: &str, file_size: u64) -> Result<u64> {
        let create_result = self
            .client
            .create_multipart_upload(CreateMultipartUploadRequest {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                ..Default::default()
            })
            .await
            .context("Failed to initialize multipart upload")?;

        let upload_id = create_result
            .upload_id
            .ok_or_else(|| anyhow!("No upload ID returned from S3"))?;

        debug!("Started multipart upload with ID: {} for {}", upload_id, file_path.display());

        match self.upload_parts(file_path, key, &upload_id, file_size).await {
            Ok(completed_parts) => {
                let complete_request = CompleteMultipartUploadRequest {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    upload_id: upload_id.clone(),
                    multipart_upload: Some(CompletedMultipartUpload {
                        parts: Some(completed_parts),
                    }),
                    ..Default::default()
                };

                self.client
                    .complete_multipart_upload(complete_request)
                    .await
                    .context("Failed to complete multipart upload")?;

                debug!("Completed multipart upload for {}", file_path.display());
                Ok(file_size)
            }
            Err(e) => {
                let _ = self
                    .client
                    .abort_multipart_upload(AbortMultipartUploadRequest {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                        upload_id,
                        ..Default::default()
                    })
                    .await;

                Err(anyhow!("Part upload failed, aborting multipart upload: {}", e))
            }
        }
    }

    async fn upload_parts(
        &self,
        file_path: &Path,
        key: &str,
        upload_id: &str,
        file_size: u64,
    ) -> Result<Vec<CompletedPart>> {
        let chunk_size = S3_UPLOAD_CHUNK_SIZE as u64;
        let num_parts = (file_size + chunk_size - 1) / chunk_size;
        debug!("Uploading {} parts for {}", num_parts, file_path.display());

        let mut file = fs::File::open(file_path)
            .context(format!("Failed to open file for multipart upload: {}", file_path.display()))?;
        let mut completed_parts = Vec::with_capacity(num_parts as usize);

        for part_number in 1..=num_parts {
            let start_byte = (part_number - 1) * chunk_size;
            let end_byte = std::cmp::min(part_number * chunk_size, file_size);

            let mut buffer = vec![0u8; (end_byte - start_byte) as usize];
            file.seek(SeekFrom::Start(start_byte))?;
            file.read_exact(&mut buffer)
                .context(format!("Failed to read part {} of {}", part_number, file_path.display()))?;

            let output = self
                .client
                .upload_part(UploadPartRequest {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    upload_id: upload_id.to_string(),
                    part_number: part_number as i64,
                    body: Some(ByteStream::from(buffer)),
                    ..Default::default()
                })
                .await
                .map_err(|e| anyhow!("Failed to upload part {}: {}", part_number, e))?;

            let e_tag = output
                .e_tag
                .ok_or_else(|| anyhow!("No ETag in upload part response"))?;

            completed_parts.push(CompletedPart {
                e_tag: Some(e_tag),
                part_number: Some(part_number as i64),
            });
        }

        Ok(completed_parts)
    }
}

impl StorageBackend for S3Backend {
    fn upload_file(&self, local_path: &Path, destination_key: &str, overwrite: bool) -> Result<u64> {
        let key = self.key_in_bucket(destination_key)?;
        let file_size = fs::metadata(local_path)
            .context(format!("Failed to get metadata for {}", local_path.display()))?
            .len();

        self.runtime.block_on(async {
            if !overwrite && self.head_exists(key).await? {
                bail!("The key s3://{}/{} already exists", self.bucket, key);
            }

            debug!(
                "Starting upload of {} ({} bytes) to s3://{}/{}",
                local_path.display(),
                file_size,
                self.bucket,
                key
            );

            if file_size > LARGE_FILE_THRESHOLD {
                self.upload_large_file(local_path, key, file_size).await
            } else {
                self.upload_small_file(local_path, key).await
            }
        })
    }

    fn object_exists(&self, path: &str) -> Result<bool> {
        let key = self.key_in_bucket(path)?;
        if key.is_empty() {
            // The bucket root always exists for a reachable bucket
            return Ok(true);
        }

        self.runtime.block_on(async {
            if self.head_exists(key).await? {
                return Ok(true);
            }
            self.prefix_exists(key).await
        })
    }

    fn ensure_directory(&self, path: &str) -> Result<()> {
        // S3 has no directories; prefixes appear with the first object
        info!("Using s3://{}/{} as destination prefix", self.bucket, self.key_in_bucket(path)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> S3Backend {
        S3Backend::new("test-bucket", Region::UsEast1, None).unwrap()
    }

    #[test]
    fn test_backend_new() {
        assert_eq!(backend().bucket(), "test-bucket");
    }

    #[test]
    fn test_key_in_bucket() {
        let backend = backend();
        assert_eq!(backend.key_in_bucket("d1/r1/t1/1/a.json").unwrap(), "d1/r1/t1/1/a.json");
        assert_eq!(
            backend.key_in_bucket("s3://test-bucket/root/d1/a.json").unwrap(),
            "root/d1/a.json"
        );
        assert!(backend.key_in_bucket("s3://other-bucket/a.json").is_err());
    }

    #[test]
    fn test_upload_nonexistent_file() {
        let result = backend().upload_file(Path::new("/nonexistent/file.txt"), "a.txt", true);
        assert!(result.unwrap_err().to_string().contains("Failed to get metadata"));
    }

    #[test]
    fn test_multipart_upload_calculation() {
        let chunk = S3_UPLOAD_CHUNK_SIZE as u64;
        let file_sizes = vec![
            (chunk - 1, 1),   // Just under chunk size = 1 part
            (chunk, 1),       // Exactly chunk size = 1 part
            (chunk + 1, 2),   // Just over chunk size = 2 parts
            (chunk * 10, 10), // 10 chunks = 10 parts
        ];

        for (file_size, expected_parts) in file_sizes {
            let num_parts = (file_size + chunk - 1) / chunk;
            assert_eq!(num_parts, expected_parts, "File size {} should have {} parts", file_size, expected_parts);
        }
    }
}
