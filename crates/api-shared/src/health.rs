use crate::pb::HealthRes;

/// Simple health service that can be used by both gRPC and REST APIs
///
/// This service provides a standardised way to check the health status of the portal.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "MediChain is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_healthy() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "MediChain is alive");
    }
}
