pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_report_serializes_camel_case() {
        let h = types::HealthReport::healthy("1.2.3", "memory", "dapr");
        let v = serde_json::to_value(&h).unwrap();
        assert_eq!(v["status"], "Healthy");
        assert_eq!(v["version"], "1.2.3");
        assert_eq!(v["services"]["database"], "memory");
        assert_eq!(v["services"]["imageStore"], "dapr");
        assert!(v["timestamp"].is_string());
    }
}
