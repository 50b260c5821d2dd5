use serde::Deserialize;

/// The union of the body fields Shopify sends across the four compliance topics. Only the fields relevant to a
/// given topic are populated. Nothing here drives a side effect; the values are extracted for logging only.
#[derive(Debug, Clone, Deserialize)]
pub struct CompliancePayload {
    #[serde(default)]
    pub shop_domain: String,
    pub shop_id: Option<i64>,
    pub customer: Option<CustomerIdentity>,
    #[serde(default)]
    pub orders_requested: Vec<i64>,
    #[serde(default)]
    pub orders_to_redact: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerIdentity {
    pub id: Option<i64>,
    pub email: Option<String>,
}

impl CompliancePayload {
    pub fn customer_email(&self) -> &str {
        self.customer.as_ref().and_then(|c| c.email.as_deref()).unwrap_or("<unknown>")
    }
}

#[cfg(test)]
mod test {
    use super::CompliancePayload;

    #[test]
    fn data_request_payload_parses() {
        let body = r#"{
            "shop_id": 954889,
            "shop_domain": "acme.myshopify.com",
            "customer": { "id": 191167, "email": "jane@example.com" },
            "orders_requested": [299938, 280263]
        }"#;
        let payload: CompliancePayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.shop_domain, "acme.myshopify.com");
        assert_eq!(payload.customer_email(), "jane@example.com");
        assert_eq!(payload.orders_requested.len(), 2);
        assert!(payload.orders_to_redact.is_empty());
    }

    #[test]
    fn uninstall_payload_has_only_the_shop() {
        let payload: CompliancePayload = serde_json::from_str(r#"{"shop_domain":"acme.myshopify.com"}"#).unwrap();
        assert_eq!(payload.shop_domain, "acme.myshopify.com");
        assert!(payload.customer.is_none());
        assert_eq!(payload.customer_email(), "<unknown>");
    }
}
