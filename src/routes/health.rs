/// Liveness probe. The body is a fixed literal that existing deployment
/// checks match on, so it must not change.
pub async fn health_check() -> &'static str {
    "Grievance Backend is Running"
}
