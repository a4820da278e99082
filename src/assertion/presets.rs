//! Built-in expectation sets.

use crate::error::{ConfigError, Result};

use super::expectation::Expectation;

/// Names of the available presets.
pub const PRESET_NAMES: &[&str] = &["secure-bucket"];

/// Returns the expectations of a named preset.
///
/// # Errors
///
/// Returns an error if no preset has that name.
pub fn preset(name: &str) -> Result<Vec<Expectation>> {
    match name {
        "secure-bucket" => Ok(secure_bucket()),
        _ => Err(ConfigError::UnknownPreset {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Storage bucket hardening checks for an AWS S3 module with an OIDC role.
///
/// The encryption algorithm and the role trust policy are only known after
/// apply, so those two checks assert that the resource carries an `after`
/// field and nothing more. Even a `null` snapshot passes.
#[must_use]
pub fn secure_bucket() -> Vec<Expectation> {
    vec![
        Expectation::present("aws_s3_bucket").describe("bucket is declared"),
        Expectation::present("aws_iam_role")
            .with_after_defined()
            .describe("OIDC role is declared (trust policy known after apply)"),
        Expectation::present("aws_s3_bucket_versioning")
            .expect_equals("versioning_configuration.status", "Enabled")
            .describe("bucket versioning enabled"),
        Expectation::present("aws_s3_bucket_server_side_encryption_configuration")
            .with_after_defined()
            .describe("bucket SSE configured (algorithm known after apply)"),
        Expectation::present("aws_s3_bucket_public_access_block")
            .expect_equals("block_public_acls", true)
            .expect_equals("block_public_policy", true)
            .expect_equals("ignore_public_acls", true)
            .expect_equals("restrict_public_buckets", true)
            .describe("public access fully blocked"),
    ]
}
