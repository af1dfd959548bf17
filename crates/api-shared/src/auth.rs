/// Compares a provided API key with the key configured at startup.
///
/// Returns `Ok(())` if the key matches, `unauthenticated` if it does not, and `internal` if no
/// key was configured.
#[allow(clippy::result_large_err)]
pub fn validate_api_key(provided_key: &str, expected_key: Option<&str>) -> Result<(), tonic::Status> {
    let expected_key =
        expected_key.ok_or_else(|| tonic::Status::internal("API_KEY not set in environment"))?;

    if provided_key == expected_key {
        Ok(())
    } else {
        Err(tonic::Status::unauthenticated("Invalid API key"))
    }
}
