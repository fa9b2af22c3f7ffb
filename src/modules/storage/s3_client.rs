//! S3-compatible storage client
//!
//! Uses rust-s3 with path-style addressing so it works against MinIO
//! as well as hosted S3. Object URLs are handed to browsers directly, so the
//! bucket gets an anonymous read policy at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::ObjectStorage;
use crate::core::config::ObjectStorageConfig;
use crate::core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// S3-compatible storage client bound to a single bucket
pub struct S3Client {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    /// Signs the bucket policy request, which rust-s3 does not cover
    signer: PolicySigner,
    http_client: Client,
}

impl S3Client {
    /// Create a client for `bucket_name`
    ///
    /// Creates the bucket if it is missing, then grants anonymous read on its
    /// objects so the returned URLs resolve in a browser.
    pub async fn new(config: ObjectStorageConfig, bucket_name: &str) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(bucket_name, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Use path-style URLs (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            signer: PolicySigner {
                access_key: config.access_key,
                secret_key: config.secret_key,
                region: config.region,
            },
            http_client,
        };

        client.ensure_bucket_exists().await?;
        client.set_public_read_policy().await?;

        info!(
            "Storage client initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(response) if (200..300).contains(&response.response_code) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Ok(response) => {
                if is_already_exists(&response.response_text) {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}' (status {}). Assuming it exists.",
                        self.bucket.name(),
                        response.response_code
                    );
                }
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if is_already_exists(&error_str) {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    /// Allow anonymous `s3:GetObject` on every object in the bucket
    ///
    /// A rejected policy is logged rather than fatal: some providers block
    /// public policies and expect them to be set by an administrator.
    pub async fn set_public_read_policy(&self) -> Result<(), AppError> {
        let bucket_name = self.bucket.name();
        let policy = public_read_policy(&bucket_name);

        let request = self
            .signer
            .sign_policy_request(&self.endpoint, &bucket_name, &policy, Utc::now())?;

        match put_bucket_policy(&self.http_client, &request, &policy).await {
            Ok(()) => {
                info!("Set public read policy for {}/*", bucket_name);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Failed to set bucket policy for '{}': {}. Object URLs will not be \
                    readable until it is set manually, e.g. `mc anonymous set download minio/{}`",
                    bucket_name, e, bucket_name
                );
                Ok(())
            }
        }
    }

    /// Resolvable URL for an object key, built from the public endpoint
    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.public_endpoint, &self.bucket.name(), key)
    }
}

#[async_trait]
impl ObjectStorage for S3Client {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to upload file '{}': storage responded with status {}",
                key, status
            )));
        }

        debug!(
            "Uploaded file '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(self.object_url(key))
    }

    fn container_name(&self) -> String {
        self.bucket.name()
    }
}

/// Credentials for AWS Signature v4
#[derive(Clone)]
struct PolicySigner {
    access_key: String,
    secret_key: String,
    region: String,
}

/// A `PUT ?policy` request with its SigV4 headers computed
#[derive(Debug)]
struct SignedPolicyRequest {
    url: String,
    host: String,
    amz_date: String,
    payload_hash: String,
    authorization: String,
}

impl PolicySigner {
    fn sign_policy_request(
        &self,
        endpoint: &str,
        bucket_name: &str,
        policy: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedPolicyRequest, AppError> {
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let endpoint_url = Url::parse(endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Internal("Endpoint URL has no host".to_string()))?;
        let host = match endpoint_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));

        let canonical_request = format!(
            "PUT\n/{}\npolicy=\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
            bucket_name, host, payload_hash, amz_date, SIGNED_HEADERS, payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            SIGNING_ALGORITHM,
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(&self.secret_key, &date_stamp, &self.region, "s3")?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(SignedPolicyRequest {
            url: format!("{}/{}?policy", endpoint.trim_end_matches('/'), bucket_name),
            host,
            amz_date,
            payload_hash,
            authorization: format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                SIGNING_ALGORITHM, self.access_key, credential_scope, SIGNED_HEADERS, signature
            ),
        })
    }
}

/// Derive the SigV4 signing key for one day, region and service
fn signing_key(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, AppError> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn public_read_policy(bucket_name: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": {"AWS": "*"},
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket_name}/*")]
            }
        ]
    })
    .to_string()
}

async fn put_bucket_policy(
    http_client: &Client,
    request: &SignedPolicyRequest,
    policy: &str,
) -> Result<(), AppError> {
    let response = http_client
        .put(&request.url)
        .header("Host", &request.host)
        .header("x-amz-date", &request.amz_date)
        .header("x-amz-content-sha256", &request.payload_hash)
        .header("Authorization", &request.authorization)
        .header("Content-Type", "application/json")
        .body(policy.to_string())
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to send policy request: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AppError::Internal(format!(
        "Failed to set bucket policy: {} - {}",
        status, body
    )))
}

fn is_already_exists(message: &str) -> bool {
    message.contains("BucketAlreadyOwnedByYou")
        || message.contains("BucketAlreadyExists")
        || message.contains("already own it")
}

/// `{endpoint}/{bucket}/{key}` with the key percent-encoded as a single path segment
fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        endpoint.trim_end_matches('/'),
        bucket,
        urlencoding::encode(key)
    )
}
